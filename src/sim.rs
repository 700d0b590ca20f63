//! Headless simulation, batch runs and replays.
//!
//! Provides a pure function interface: `(seed, config) -> SimResult`.
//!
//! The autoplayer:
//! - spends all gold on random upgrades whenever it is idle
//! - starts a turn whenever stamina covers the roll
//! - spawns an enemy every `spawn_every_turns` finished turns
//! - strikes the oldest enemy `clicks_per_second` times per second
//!
//! Dice come from a [`SeededDice`] stream derived from the seed, so a seed
//! plus a [`SimConfig`] is all a replay needs.

use std::fmt;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CoreError};
use crate::game::invariants::assert_invariants;
use crate::game::{
    ConfigError, Discard, EventLog, EventSink, Session, SessionConfig, SessionTally, SeededDice,
    StatsRecord, StrikeOutcome, TurnPhase, UpgradeKind,
};

/// Most frames a single session may step through.
pub const MAX_FRAMES: f64 = 10_000_000.0;

/// Mixed into the seed for the dice stream so dice and upgrades differ.
const DICE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configuration for the autoplayer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Rules of the simulated session.
    pub session: SessionConfig,
    /// Stop after this many finished walks.
    pub max_turns: u32,
    /// Stop after this many simulated seconds.
    pub max_time: f64,
    /// Seconds per frame.
    pub time_step: f64,
    /// Spawn an enemy every n finished turns; zero disables spawning.
    pub spawn_every_turns: u32,
    /// Strikes per second against the oldest enemy.
    pub clicks_per_second: f64,
    /// Spend gold on upgrades when idle.
    pub upgrade: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            max_turns: 100,
            max_time: 3600.0,
            time_step: 0.05,
            spawn_every_turns: 5,
            clicks_per_second: 2.0,
            upgrade: true,
        }
    }
}

impl SimConfig {
    /// Check every field, including the session rules.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] or
    /// [`CoreError::InvalidAmount`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.session.validate()?;
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(CoreError::InvalidConfiguration(
                "time_step must be positive".to_string(),
            ));
        }
        ensure_non_negative(self.max_time)?;
        if self.max_time / self.time_step > MAX_FRAMES {
            return Err(CoreError::InvalidConfiguration(format!(
                "max_time / time_step exceeds {MAX_FRAMES} frames"
            )));
        }
        ensure_non_negative(self.clicks_per_second)?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }
}

/// Final result of a simulated session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimResult {
    /// The seed used for this session.
    pub seed: u64,
    /// Simulated seconds.
    pub elapsed: f64,
    /// Session counters.
    pub tally: SessionTally,
    /// Enemies defeated.
    pub kills: u32,
    /// Gold left at the end.
    pub final_gold: u32,
    /// Stamina left at the end.
    pub final_stamina: u32,
    /// Stamina capacity at the end.
    pub final_stamina_max: u32,
    /// Hero stats at the end.
    pub stats: StatsRecord,
    /// Upgrades bought, indexed like [`UpgradeKind::ALL`].
    pub upgrades_by_kind: [u32; 7],
}

/// Error type for simulation operations.
#[derive(Debug)]
pub enum SimError {
    /// The configuration describes an impossible game.
    Config(CoreError),
    /// A session operation failed mid-run.
    Session(CoreError),
    /// A recording could not be read or written.
    Io(std::io::Error),
    /// A recording is not valid JSON for this schema.
    Parse(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Invalid simulation config: {e}"),
            Self::Session(e) => write!(f, "Session failed: {e}"),
            Self::Io(e) => write!(f, "Recording I/O failed: {e}"),
            Self::Parse(e) => write!(f, "Recording is malformed: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) | Self::Session(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        Self::Session(e)
    }
}

/// Run one session to completion without recording events.
///
/// # Errors
///
/// Returns [`SimError::Config`] if `config` fails validation.
pub fn run_session(seed: u64, config: &SimConfig) -> Result<SimResult, SimError> {
    config.validate().map_err(SimError::Config)?;
    let session = Session::with_sink(config.session.clone(), seed, Discard)
        .map_err(SimError::Config)?;
    let (result, _) = drive(seed, session, config)?;
    Ok(result)
}

/// Run one session to completion, keeping the event journal.
///
/// # Errors
///
/// Returns [`SimError::Config`] if `config` fails validation.
pub fn run_session_logged(
    seed: u64,
    config: &SimConfig,
) -> Result<(SimResult, EventLog), SimError> {
    config.validate().map_err(SimError::Config)?;
    let session = Session::new(config.session.clone(), seed).map_err(SimError::Config)?;
    drive(seed, session, config)
}

/// Run `games` independent sessions in parallel, seeded
/// `base_seed, base_seed + 1, ...`. Results keep seed order.
#[must_use]
pub fn run_batch(
    base_seed: u64,
    games: u64,
    config: &SimConfig,
) -> Vec<Result<SimResult, SimError>> {
    (0..games)
        .into_par_iter()
        .map(|i| run_session(base_seed.wrapping_add(i), config))
        .collect()
}

/// Autoplay `session` until a turn or time limit is hit.
fn drive<S: EventSink>(
    seed: u64,
    mut session: Session<S>,
    config: &SimConfig,
) -> Result<(SimResult, S), SimError> {
    let mut dice = SeededDice::new(seed ^ DICE_SEED_SALT);
    let mut upgrades_by_kind = [0u32; 7];
    let mut next_spawn = config.spawn_every_turns;
    let mut strike_budget = 0.0;
    let roll_cost = config.session.roll_cost;

    while session.tally().turns_completed < config.max_turns && session.clock() < config.max_time {
        match session.phase() {
            TurnPhase::Idle => {
                if config.upgrade {
                    for applied in session.upgrade_all() {
                        upgrades_by_kind[applied.kind.index()] += 1;
                    }
                }
                if session.stamina().can_afford(roll_cost) {
                    session.begin_turn()?;
                }
            }
            TurnPhase::Rolling => {
                session.roll(&mut dice)?;
            }
            _ => {}
        }

        if next_spawn > 0 && session.tally().turns_completed >= next_spawn {
            next_spawn = next_spawn.saturating_add(config.spawn_every_turns);
            let path = session.walker().path();
            let across = (session.walker().current_index() + path.len() / 2) % path.len();
            let position = path.nodes()[across].position;
            session.spawn_default_enemy(position)?;
        }

        if let Some(target) = session.enemies().oldest() {
            strike_budget += config.clicks_per_second * config.time_step;
            while strike_budget >= 1.0 {
                strike_budget -= 1.0;
                if let StrikeOutcome::Defeated(_) = session.strike_enemy(target)? {
                    break;
                }
            }
        } else {
            strike_budget = 0.0;
        }

        session.update(config.time_step)?;
        assert_invariants(&session);
    }

    let result = SimResult {
        seed,
        elapsed: session.clock(),
        tally: session.tally(),
        kills: session.enemies().kills(),
        final_gold: session.gold().current(),
        final_stamina: session.stamina().current(),
        final_stamina_max: session.stamina().max(),
        stats: *session.stats(),
        upgrades_by_kind,
    };
    Ok((result, session.into_sink()))
}

/// Minimal recording: seed and config.
///
/// Because sessions are deterministic, this is all a replay needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Session seed.
    pub seed: u64,
    /// Autoplayer and session configuration.
    pub config: SimConfig,
}

impl Recording {
    /// Create a recording.
    #[must_use]
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self { seed, config }
    }

    /// Save as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self).map_err(SimError::Parse)?;
        std::fs::write(path, json).map_err(SimError::Io)
    }

    /// Load and validate a recording.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`], [`SimError::Parse`] or [`SimError::Config`].
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path).map_err(SimError::Io)?;
        let recording: Self = serde_json::from_str(&text).map_err(SimError::Parse)?;
        recording.config.validate().map_err(SimError::Config)?;
        Ok(recording)
    }

    /// Re-run the recorded session.
    ///
    /// # Errors
    ///
    /// As [`run_session`].
    pub fn replay(&self) -> Result<SimResult, SimError> {
        run_session(self.seed, &self.config)
    }

    /// Re-run the recorded session, keeping the event journal.
    ///
    /// # Errors
    ///
    /// As [`run_session`].
    pub fn replay_logged(&self) -> Result<(SimResult, EventLog), SimError> {
        run_session_logged(self.seed, &self.config)
    }
}

/// Upgrade counts paired with their kinds.
#[must_use]
pub fn upgrade_breakdown(result: &SimResult) -> Vec<(UpgradeKind, u32)> {
    UpgradeKind::ALL
        .iter()
        .zip(result.upgrades_by_kind)
        .map(|(&kind, count)| (kind, count))
        .collect()
}
