// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Dicewalk: a deterministic core for dice-driven board roguelites.
//!
//! A hero walks a closed path of nodes, paying stamina for each dice roll,
//! picking up gold on the way, spending gold on randomized stat upgrades,
//! and wearing down enemies by draining their stamina. Rendering, dice
//! physics and audio live outside this crate; it consumes settled die faces
//! and reports every state change as a [`GameEvent`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Simulator / Replay / Batch (sim)  │
//! ├─────────────────────────────────────┤
//! │   Session turn machine (game)       │
//! ├─────────────────────────────────────┤
//! │ Dice │ Path │ Pools │ Upgrades │ AI │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod sim;

pub use error::{Activity, CoreError, CoreResult};

// Re-export key game types at crate root for convenience
pub use game::{
    EventLog, EventSink, GameEvent, Path, PathWalker, ResourcePool, RollOutcome, Session,
    SessionConfig, UpgradeSelector,
};
