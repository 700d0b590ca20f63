//! CLI command implementations for dicewalk.

pub(crate) mod batch;
pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use dicewalk::game::{ConfigError, SessionConfig};
use dicewalk::sim::{SimConfig, SimError};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` and `replay` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// Event journal as JSON lines.
    Events,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

/// Read a configuration file.
///
/// Accepts either a full simulator config or a bare session config; the
/// latter runs with the default autoplayer settings.
pub(crate) fn read_config(path: &Path) -> Result<SimConfig, ConfigError> {
    match SimConfig::load(path) {
        Err(ConfigError::Parse(sim_err)) => match SessionConfig::load(path) {
            Ok(session) => Ok(SimConfig {
                session,
                ..SimConfig::default()
            }),
            Err(ConfigError::Parse(_)) => Err(ConfigError::Parse(sim_err)),
            Err(e) => Err(e),
        },
        other => other,
    }
}

/// Load the config file if given, then apply command-line overrides.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    turns: Option<u32>,
    max_time: Option<f64>,
) -> Result<SimConfig, CliError> {
    let mut config = match path {
        Some(path) => read_config(path).map_err(|e| {
            CliError::new(format!("Failed to load {}: {e}", path.display()))
        })?,
        None => SimConfig::default(),
    };
    if let Some(turns) = turns {
        config.max_turns = turns;
    }
    if let Some(max_time) = max_time {
        config.max_time = max_time;
    }
    config
        .validate()
        .map_err(|e| CliError::new(e.to_string()))?;
    Ok(config)
}

/// Use the given seed, or derive one from the clock.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_only_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "roll_cost": 20 }"#).unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.session.roll_cost, 20);
        assert_eq!(config.max_turns, SimConfig::default().max_turns);
    }

    #[test]
    fn test_sim_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(&path, r#"{ "max_turns": 7, "session": { "dice_count": 3 } }"#).unwrap();

        let config = resolve_config(Some(&path), None, Some(60.0)).unwrap();
        assert_eq!(config.max_turns, 7);
        assert_eq!(config.session.dice_count, 3);
        assert!((config.max_time - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_garbage_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_override_is_validated() {
        assert!(resolve_config(None, None, Some(-1.0)).is_err());
    }
}
