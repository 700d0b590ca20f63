//! Bounded integer resources: hero stamina, gold, and enemy stamina.
//!
//! A pool holds `0 <= current <= max`. Spending is all-or-nothing, gains are
//! capped at `max`, and regeneration is applied in whole rounded chunks once
//! per `regen_interval` of accumulated time.
//!
//! # Regeneration
//!
//! ```text
//! timer += dt (only after `regen_delay` seconds without a spend/drain)
//! while timer >= interval and current < max:
//!     timer -= interval
//!     current += round(regen_rate)      (capped at max)
//! ```
//!
//! A full pool keeps its timer at zero, so a pool that was just spent from
//! waits a whole interval before its first regen chunk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CoreError, CoreResult};
use crate::game::EnemyId;

/// Smallest capacity `modify_max` can shrink a pool to.
pub const MIN_CAPACITY: u32 = 10;

/// Identifies which pool a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolId {
    /// The hero's stamina, paid per roll.
    Stamina,
    /// The hero's gold, paid per upgrade.
    Gold,
    /// An enemy's stamina, drained by strikes.
    Enemy(EnemyId),
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolId::Stamina => write!(f, "stamina"),
            PoolId::Gold => write!(f, "gold"),
            PoolId::Enemy(id) => write!(f, "enemy {id} stamina"),
        }
    }
}

/// Before/after values of a pool mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Pool that changed.
    pub pool: PoolId,
    /// Value before the mutation.
    pub old: u32,
    /// Value after the mutation.
    pub new: u32,
}

impl ResourceChange {
    /// Signed difference `new - old`.
    #[must_use]
    pub fn delta(&self) -> i64 {
        i64::from(self.new) - i64::from(self.old)
    }

    /// Whether the value actually moved.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.old != self.new
    }
}

/// A bounded integer resource with spend/gain/regen semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourcePool {
    id: PoolId,
    current: u32,
    max: u32,
    regen_rate: f64,
    regen_interval: f64,
    regen_delay: f64,
    regen_timer: f64,
    idle_time: f64,
}

impl ResourcePool {
    /// Create a full pool with no regeneration.
    #[must_use]
    pub fn new(id: PoolId, max: u32) -> Self {
        Self {
            id,
            current: max,
            max,
            regen_rate: 0.0,
            regen_interval: 1.0,
            regen_delay: 0.0,
            regen_timer: 0.0,
            idle_time: 0.0,
        }
    }

    /// Create a pool with no practical cap (gold).
    #[must_use]
    pub fn unbounded(id: PoolId, current: u32) -> Self {
        Self::new(id, u32::MAX).with_current(current)
    }

    /// Set the starting value, clamped to `max`.
    #[must_use]
    pub fn with_current(mut self, current: u32) -> Self {
        self.current = current.min(self.max);
        self
    }

    /// Enable regeneration of `rate` units every `interval` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite rate,
    /// and [`CoreError::InvalidConfiguration`] for a non-positive interval.
    pub fn with_regen(mut self, rate: f64, interval: f64) -> CoreResult<Self> {
        self.regen_rate = ensure_non_negative(rate)?;
        if !(interval.is_finite() && interval > 0.0) {
            return Err(CoreError::InvalidConfiguration(format!(
                "regen interval must be positive, got {interval}"
            )));
        }
        self.regen_interval = interval;
        Ok(self)
    }

    /// Pause regeneration for `delay` seconds after every spend or drain.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite delay.
    pub fn with_regen_delay(mut self, delay: f64) -> CoreResult<Self> {
        self.regen_delay = ensure_non_negative(delay)?;
        self.idle_time = self.regen_delay;
        Ok(self)
    }

    /// Pool identifier.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Current value.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Capacity.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Units restored per regen application.
    #[must_use]
    pub const fn regen_rate(&self) -> f64 {
        self.regen_rate
    }

    /// Seconds between regen applications.
    #[must_use]
    pub const fn regen_interval(&self) -> f64 {
        self.regen_interval
    }

    /// Seconds of quiet required after a spend before regen resumes.
    #[must_use]
    pub const fn regen_delay(&self) -> f64 {
        self.regen_delay
    }

    /// Whether the pool is at capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Whether the pool is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Whether `amount` could be spent right now.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        self.current >= amount
    }

    /// Spend `amount`, or fail without touching the pool.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientResource`] when `current < amount`.
    pub fn spend(&mut self, amount: u32) -> CoreResult<ResourceChange> {
        if !self.can_afford(amount) {
            return Err(CoreError::InsufficientResource {
                pool: self.id,
                required: amount,
                available: self.current,
            });
        }
        let old = self.current;
        self.current -= amount;
        self.idle_time = 0.0;
        Ok(self.change(old))
    }

    /// Add `amount`, capped at `max`.
    pub fn gain(&mut self, amount: u32) -> ResourceChange {
        let old = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.change(old)
    }

    /// Remove up to `amount`, stopping at zero. Always succeeds.
    pub fn drain(&mut self, amount: u32) -> ResourceChange {
        let old = self.current;
        self.current = self.current.saturating_sub(amount);
        self.idle_time = 0.0;
        self.change(old)
    }

    /// Advance regeneration by `dt` seconds.
    ///
    /// Returns one change per regen application that moved the value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite `dt`.
    pub fn tick(&mut self, dt: f64) -> CoreResult<Vec<ResourceChange>> {
        let dt = ensure_non_negative(dt)?;
        let mut changes = Vec::new();

        let before = self.idle_time;
        self.idle_time += dt;
        let effective = if before >= self.regen_delay {
            dt
        } else {
            (self.idle_time - self.regen_delay).max(0.0)
        };

        if self.is_full() {
            self.regen_timer = 0.0;
            return Ok(changes);
        }

        self.regen_timer += effective;
        let amount = self.regen_amount();
        while self.regen_timer >= self.regen_interval && !self.is_full() {
            if amount == 0 {
                self.regen_timer %= self.regen_interval;
                break;
            }
            self.regen_timer -= self.regen_interval;
            changes.push(self.gain(amount));
        }

        if self.is_full() {
            self.regen_timer = 0.0;
        }
        Ok(changes)
    }

    /// Change the capacity by `delta`, never shrinking below
    /// [`MIN_CAPACITY`]. A pool built smaller than the floor is never
    /// raised by a shrink, and `delta == 0` changes nothing.
    ///
    /// `current` is clamped to the new capacity. The returned change
    /// describes `current`.
    pub fn modify_max(&mut self, delta: i64) -> ResourceChange {
        let old = self.current;
        if delta == 0 {
            return self.change(old);
        }
        let floor = i64::from(MIN_CAPACITY.min(self.max));
        let target = (i64::from(self.max) + delta).clamp(floor, i64::from(u32::MAX));
        self.max = u32::try_from(target).unwrap_or(u32::MAX);
        self.current = self.current.min(self.max);
        self.change(old)
    }

    /// Change the regen rate by `delta`, never below zero.
    ///
    /// Returns the new rate.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a non-finite delta.
    pub fn modify_regen_rate(&mut self, delta: f64) -> CoreResult<f64> {
        if !delta.is_finite() {
            return Err(CoreError::InvalidAmount(delta));
        }
        self.regen_rate = (self.regen_rate + delta).max(0.0);
        Ok(self.regen_rate)
    }

    /// Whole units one regen application restores.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn regen_amount(&self) -> u32 {
        self.regen_rate.round_ties_even() as u32
    }

    fn change(&self, old: u32) -> ResourceChange {
        ResourceChange {
            pool: self.id,
            old,
            new: self.current,
        }
    }
}
