//! Replay command implementation.

use super::run::print_result;
use super::{CliError, OutputFormat};
use dicewalk::sim::Recording;
use std::path::Path;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or replayed.
pub(crate) fn execute(recording: &Path, format: OutputFormat) -> Result<(), CliError> {
    let loaded = Recording::load(recording).map_err(|e| {
        CliError::new(format!("Failed to load {}: {e}", recording.display()))
    })?;

    if format == OutputFormat::Text {
        println!("Replaying {} (seed {})", recording.display(), loaded.seed);
        println!();
    }

    let (result, log) = loaded.replay_logged()?;
    print_result(&result, &log, format)
}
