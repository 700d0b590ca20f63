//! Hero attributes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Movement speed never drops below this.
pub const MIN_MOVEMENT_SPEED: f64 = 1.0;

/// Run speed as a multiple of walk speed.
pub const RUN_MULTIPLIER: f64 = 1.5;

/// Integer hero attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Strength.
    Strength,
    /// Intelligence.
    Intelligence,
    /// Willpower.
    Willpower,
    /// Dexterity.
    Dexterity,
}

/// The hero's stat block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    /// Strength.
    pub strength: i32,
    /// Intelligence.
    pub intelligence: i32,
    /// Willpower.
    pub willpower: i32,
    /// Dexterity.
    pub dexterity: i32,
    /// Walk speed in units per second.
    pub movement_speed: f64,
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            willpower: 10,
            dexterity: 10,
            movement_speed: 3.0,
        }
    }
}

impl StatsRecord {
    /// Current value of an attribute.
    #[must_use]
    pub const fn attribute(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Intelligence => self.intelligence,
            Attribute::Willpower => self.willpower,
            Attribute::Dexterity => self.dexterity,
        }
    }

    /// Add `delta` to an attribute, flooring at zero. Returns the new value.
    pub fn modify_attribute(&mut self, attribute: Attribute, delta: i32) -> i32 {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Willpower => &mut self.willpower,
            Attribute::Dexterity => &mut self.dexterity,
        };
        *slot = slot.saturating_add(delta).max(0);
        *slot
    }

    /// Add `delta` to movement speed, flooring at [`MIN_MOVEMENT_SPEED`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a non-finite delta.
    pub fn modify_movement_speed(&mut self, delta: f64) -> CoreResult<f64> {
        if !delta.is_finite() {
            return Err(CoreError::InvalidAmount(delta));
        }
        self.movement_speed = (self.movement_speed + delta).max(MIN_MOVEMENT_SPEED);
        Ok(self.movement_speed)
    }

    /// Speed for short steps.
    #[must_use]
    pub fn walk_speed(&self) -> f64 {
        self.movement_speed.max(MIN_MOVEMENT_SPEED)
    }

    /// Speed for long steps.
    #[must_use]
    pub fn run_speed(&self) -> f64 {
        self.walk_speed() * RUN_MULTIPLIER
    }
}
