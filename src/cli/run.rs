//! Run command implementation.

use super::output::{format_text, JsonSimResult};
use super::{resolve_config, seed_or_clock, CliError, OutputFormat};
use dicewalk::game::EventLog;
use dicewalk::sim::{run_session_logged, Recording, SimResult};
use std::path::Path;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the session fails.
pub(crate) fn execute(
    config: Option<&Path>,
    seed: Option<u64>,
    turns: Option<u32>,
    max_time: Option<f64>,
    format: OutputFormat,
    save: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = resolve_config(config, turns, max_time)?;
    let seed = seed_or_clock(seed);
    let chatty = !quiet && format == OutputFormat::Text;

    if chatty {
        println!("Running session with seed {seed}...");
        println!();
    }

    let (result, log) = run_session_logged(seed, &config)?;

    if let Some(save_path) = save {
        Recording::new(seed, config)
            .save(save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if chatty {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    print_result(&result, &log, format)
}

/// Print a finished session in the requested format.
pub(super) fn print_result(
    result: &SimResult,
    log: &EventLog,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            print!("{}", format_text(result));
        }
        OutputFormat::Json => {
            let json_result = JsonSimResult::from_sim_result(result);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Events => {
            let lines = log
                .to_json_lines()
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            print!("{lines}");
        }
    }
    Ok(())
}
