//! Game layer for dicewalk.
//!
//! Implements the board rules:
//! - Dice resolution and the double bonus
//! - A token walking a closed node path
//! - Bounded resource pools (stamina, gold, enemy stamina)
//! - Randomized, self-reinforcing stat upgrades
//! - Enemies and strikes
//! - The session turn machine and its event stream

mod config;
mod dice;
mod enemy;
mod events;
mod path;
mod resource;
mod session;
mod stats;
mod upgrade;

pub mod invariants;

pub use config::{ConfigError, PathLayout, SessionConfig};
pub use dice::{DiceSource, RollOutcome, ScriptedDice, SeededDice, DIE_SIDES};
pub use enemy::{
    Behavior, Enemy, EnemyConfig, EnemyId, EnemyRoster, StrikeOutcome, PATROL_ARRIVAL_RADIUS,
    PATROL_HOME_RADIUS,
};
pub use events::{Discard, EventLog, EventSink, GameEvent, LogEntry};
pub use path::{NodeArrival, Path, PathNode, PathWalker, Position};
pub use resource::{PoolId, ResourceChange, ResourcePool, MIN_CAPACITY};
pub use session::{Session, SessionTally, TurnPhase};
pub use stats::{Attribute, StatsRecord, MIN_MOVEMENT_SPEED, RUN_MULTIPLIER};
pub use upgrade::{UpgradeApplied, UpgradeKind, UpgradeSelector, UpgradeTargets, UpgradeTrack};
