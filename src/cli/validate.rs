//! Config validation command implementation.

use super::{read_config, CliError};
use dicewalk::game::{ConfigError, Session};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or fails a check.
pub(crate) fn execute(config: &Path) -> Result<(), CliError> {
    println!("Validating: {}", config.display());
    println!();

    let loaded = match read_config(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            print_check("File readable", !matches!(e, ConfigError::Io(_)));
            let parsed = !matches!(e, ConfigError::Io(_) | ConfigError::Parse(_));
            print_check("JSON well-formed", parsed);
            print_check("Rules consistent", false);
            return Err(e.into());
        }
    };
    print_check("File readable", true);
    print_check("JSON well-formed", true);
    print_check("Rules consistent", true);

    let session = Session::new(loaded.session.clone(), 0)
        .map_err(|e| CliError::new(format!("Session construction failed: {e}")))?;
    print_check("Session starts", true);

    let rules = session.config();
    println!();
    println!("Summary:");
    println!("  Path nodes:     {}", session.walker().path().len());
    println!("  Dice:           {}", rules.dice_count);
    println!("  Roll cost:      {} of {} stamina", rules.roll_cost, rules.stamina_max);
    println!("  Starting gold:  {}", rules.starting_gold);
    println!(
        "  Upgrade cost:   {} (+{} per upgrade)",
        rules.upgrade_cost, rules.upgrade_cost_increment
    );
    println!("  Max turns:      {}", loaded.max_turns);
    println!("  Max time:       {:.0}s", loaded.max_time);
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    println!("  {name:<20} {status}");
}
