//! Structured game events and the sinks that receive them.
//!
//! Every state change the presentation layer might react to (floating text,
//! coin sounds, slider updates) is reported as a [`GameEvent`]. The default
//! sink, [`EventLog`], keeps a timestamped journal that serializes to JSON
//! lines.

use serde::Serialize;

use crate::game::{EnemyId, PoolId, ResourceChange, UpgradeKind};

/// Something that happened during play.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// Dice settled and were resolved.
    RollResolved {
        /// Faces in roll order.
        faces: Vec<u8>,
        /// Steps to walk.
        total: u32,
        /// Whether the roll earns a bonus roll.
        is_double: bool,
    },
    /// The hero stepped onto a node.
    NodeArrived {
        /// Node index.
        node: usize,
        /// Steps left in the walk.
        remaining: u32,
    },
    /// A pool value moved.
    ResourceChanged {
        /// Pool that moved.
        pool: PoolId,
        /// Value before.
        old: u32,
        /// Value after.
        new: u32,
    },
    /// A stat upgrade was bought.
    UpgradeApplied {
        /// Upgraded stat.
        stat: UpgradeKind,
        /// Amount added.
        amount: f64,
        /// Gold paid.
        cost: u32,
    },
    /// A walk finished.
    TurnComplete {
        /// Whether a bonus roll follows.
        bonus: bool,
    },
    /// A bonus roll was earned but stamina could not pay for it.
    BonusForfeited,
    /// An enemy entered play.
    EnemySpawned {
        /// New enemy.
        enemy: EnemyId,
    },
    /// An enemy's stamina reached zero.
    EnemyDefeated {
        /// Defeated enemy.
        enemy: EnemyId,
    },
}

impl From<ResourceChange> for GameEvent {
    fn from(change: ResourceChange) -> Self {
        GameEvent::ResourceChanged {
            pool: change.pool,
            old: change.old,
            new: change.new,
        }
    }
}

/// Receiver of game events.
pub trait EventSink {
    /// Record one event.
    fn emit(&mut self, event: GameEvent);

    /// Session clock, called before each batch of events. Optional.
    fn set_time(&mut self, _time: f64) {}
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: GameEvent) {}
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Session time in seconds when the event happened.
    pub time: f64,
    /// The event.
    #[serde(flatten)]
    pub event: GameEvent,
}

/// Timestamped event journal.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    time: f64,
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Events without timestamps.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Render the journal as one JSON object per line.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry fails to serialize.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut output = String::new();
        for entry in &self.entries {
            output.push_str(&serde_json::to_string(entry)?);
            output.push('\n');
        }
        Ok(output)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GameEvent) {
        self.entries.push(LogEntry {
            time: self.time,
            event,
        });
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}
