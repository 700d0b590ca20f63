//! Batch command implementation.

use super::output::{format_batch_csv, format_batch_text, BatchStats, JsonBatchResult};
use super::{resolve_config, seed_or_clock, BatchFormat, CliError};
use dicewalk::sim::run_session;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the config is invalid or output fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    config: Option<&Path>,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    turns: Option<u32>,
    max_time: Option<f64>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = resolve_config(config, turns, max_time)?;

    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // already initialized is fine
    }

    let base_seed = seed_or_clock(seed);

    let pb = if progress {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Bad progress template: {e}")))?
            .progress_chars("=>-");
        let pb = ProgressBar::new(games);
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Per-thread stats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(BatchStats::new, |mut local, i| {
            match run_session(base_seed.wrapping_add(i), &config) {
                Ok(result) => local.add_result(&result),
                Err(_) => local.add_failure(),
            }
            local
        })
        .reduce(BatchStats::new, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.set_position(stats.games_played + stats.failures);
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    #[allow(clippy::cast_precision_loss)]
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Base seed: {base_seed}");
            println!("Duration: {:.2}s ({games_per_sec:.0} games/sec)", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
