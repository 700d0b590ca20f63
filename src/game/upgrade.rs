//! Gold-for-stats upgrades.
//!
//! Every purchase costs the current price, then the price rises by a fixed
//! step. The upgraded action is picked uniformly at random, and each action
//! grows its own increment after use, so repeated upgrades of the same stat
//! get stronger.
//!
//! | Action           | Starting increment | Growth per use |
//! |------------------|--------------------|----------------|
//! | Strength         | 1.0                | 0.1            |
//! | Intelligence     | 1.0                | 0.1            |
//! | Willpower        | 1.0                | 0.1            |
//! | Dexterity        | 1.0                | 0.1            |
//! | Movement speed   | 0.5                | 0.01           |
//! | Max stamina      | 5.0                | 1.0            |
//! | Stamina regen    | 0.5                | 0.05           |
//!
//! Integer targets (the four attributes and max stamina) receive the
//! truncated increment.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::game::{Attribute, ResourceChange, ResourcePool, StatsRecord};

/// An upgradeable stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Hero strength.
    Strength,
    /// Hero intelligence.
    Intelligence,
    /// Hero willpower.
    Willpower,
    /// Hero dexterity.
    Dexterity,
    /// Hero walk/run speed.
    MovementSpeed,
    /// Stamina capacity.
    MaxStamina,
    /// Stamina regenerated per interval.
    StaminaRegen,
}

impl UpgradeKind {
    /// Every action, in selection order.
    pub const ALL: [UpgradeKind; 7] = [
        UpgradeKind::Strength,
        UpgradeKind::Intelligence,
        UpgradeKind::Willpower,
        UpgradeKind::Dexterity,
        UpgradeKind::MovementSpeed,
        UpgradeKind::MaxStamina,
        UpgradeKind::StaminaRegen,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UpgradeKind::Strength => "Strength",
            UpgradeKind::Intelligence => "Intelligence",
            UpgradeKind::Willpower => "Willpower",
            UpgradeKind::Dexterity => "Dexterity",
            UpgradeKind::MovementSpeed => "Speed",
            UpgradeKind::MaxStamina => "Max Stamina",
            UpgradeKind::StaminaRegen => "Stamina Recharge",
        }
    }

    /// Position in [`UpgradeKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn default_track(self) -> UpgradeTrack {
        match self {
            UpgradeKind::Strength
            | UpgradeKind::Intelligence
            | UpgradeKind::Willpower
            | UpgradeKind::Dexterity => UpgradeTrack::new(1.0, 0.1),
            UpgradeKind::MovementSpeed => UpgradeTrack::new(0.5, 0.01),
            UpgradeKind::MaxStamina => UpgradeTrack::new(5.0, 1.0),
            UpgradeKind::StaminaRegen => UpgradeTrack::new(0.5, 0.05),
        }
    }

    const fn attribute(self) -> Option<Attribute> {
        match self {
            UpgradeKind::Strength => Some(Attribute::Strength),
            UpgradeKind::Intelligence => Some(Attribute::Intelligence),
            UpgradeKind::Willpower => Some(Attribute::Willpower),
            UpgradeKind::Dexterity => Some(Attribute::Dexterity),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current increment of one action and how much it grows per use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTrack {
    /// Amount the next upgrade applies.
    pub increment: f64,
    /// Added to `increment` after each use.
    pub growth: f64,
}

impl UpgradeTrack {
    const fn new(increment: f64, growth: f64) -> Self {
        Self { increment, growth }
    }
}

/// Mutable handles an upgrade writes through.
#[derive(Debug)]
pub struct UpgradeTargets<'a> {
    /// Pays for upgrades.
    pub gold: &'a mut ResourcePool,
    /// Receives max-stamina and regen upgrades.
    pub stamina: &'a mut ResourcePool,
    /// Receives attribute and speed upgrades.
    pub stats: &'a mut StatsRecord,
}

/// Outcome of one purchased upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeApplied {
    /// Action that was applied.
    pub kind: UpgradeKind,
    /// Amount actually added to the target.
    pub amount: f64,
    /// Gold paid.
    pub cost: u32,
    /// Gold pool movement.
    pub gold: ResourceChange,
    /// Stamina movement caused by a capacity change, if any.
    pub stamina: Option<ResourceChange>,
}

/// Prices and per-action increments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeSelector {
    cost: u32,
    cost_increment: u32,
    tracks: [UpgradeTrack; 7],
}

impl UpgradeSelector {
    /// Start at `cost`, rising by `cost_increment` after every purchase.
    #[must_use]
    pub fn new(cost: u32, cost_increment: u32) -> Self {
        Self {
            cost,
            cost_increment,
            tracks: UpgradeKind::ALL.map(UpgradeKind::default_track),
        }
    }

    /// Price of the next upgrade.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Price rise per purchase.
    #[must_use]
    pub const fn cost_increment(&self) -> u32 {
        self.cost_increment
    }

    /// Increment state for `kind`.
    #[must_use]
    pub const fn track(&self, kind: UpgradeKind) -> UpgradeTrack {
        self.tracks[kind.index()]
    }

    /// Whether the gold pool covers the next upgrade.
    #[must_use]
    pub const fn is_affordable(&self, gold: &ResourcePool) -> bool {
        gold.can_afford(self.cost)
    }

    /// Buy one upgrade of a uniformly random action.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientResource`] if gold is short; nothing
    /// changes in that case.
    pub fn roll_upgrade<R: Rng + ?Sized>(
        &mut self,
        targets: &mut UpgradeTargets<'_>,
        rng: &mut R,
    ) -> CoreResult<UpgradeApplied> {
        // Check first so a failed purchase leaves the rng untouched.
        if !self.is_affordable(targets.gold) {
            return Err(CoreError::InsufficientResource {
                pool: targets.gold.id(),
                required: self.cost,
                available: targets.gold.current(),
            });
        }
        let kind = UpgradeKind::ALL[rng.random_range(0..UpgradeKind::ALL.len())];
        self.purchase(kind, targets)
    }

    /// Keep rolling upgrades until gold no longer covers the price.
    pub fn roll_upgrade_repeatedly<R: Rng + ?Sized>(
        &mut self,
        targets: &mut UpgradeTargets<'_>,
        rng: &mut R,
    ) -> Vec<UpgradeApplied> {
        let mut applied = Vec::new();
        while let Ok(upgrade) = self.roll_upgrade(targets, rng) {
            applied.push(upgrade);
            // A price that stops rising would never exhaust the gold.
            if self.cost <= upgrade.cost {
                break;
            }
        }
        applied
    }

    /// Buy one upgrade of a chosen action.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientResource`] if gold is short and
    /// [`CoreError::InvalidAmount`] if the action's increment is not finite.
    /// Nothing changes on error.
    pub fn purchase(
        &mut self,
        kind: UpgradeKind,
        targets: &mut UpgradeTargets<'_>,
    ) -> CoreResult<UpgradeApplied> {
        let track = &mut self.tracks[kind.index()];
        let increment = track.increment;
        if !increment.is_finite() {
            return Err(CoreError::InvalidAmount(increment));
        }

        let cost = self.cost;
        let gold = targets.gold.spend(cost)?;
        let mut stamina = None;

        #[allow(clippy::cast_possible_truncation)]
        let amount = if let Some(attribute) = kind.attribute() {
            let whole = increment.trunc() as i32;
            targets.stats.modify_attribute(attribute, whole);
            f64::from(whole)
        } else {
            match kind {
                UpgradeKind::MovementSpeed => {
                    targets.stats.modify_movement_speed(increment)?;
                    increment
                }
                UpgradeKind::MaxStamina => {
                    let whole = increment.trunc() as i32;
                    stamina = Some(targets.stamina.modify_max(i64::from(whole)));
                    f64::from(whole)
                }
                _ => {
                    targets.stamina.modify_regen_rate(increment)?;
                    increment
                }
            }
        };

        track.increment += track.growth;
        self.cost = self.cost.saturating_add(self.cost_increment);

        Ok(UpgradeApplied {
            kind,
            amount,
            cost,
            gold,
            stamina,
        })
    }
}
