//! Error types for the game core.

use std::fmt;

use crate::game::{EnemyId, PoolId};

/// Long-running activity that can only have one instance in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// A roll/resolve/walk turn.
    Turn,
    /// A path walk.
    Walk,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Turn => write!(f, "turn"),
            Activity::Walk => write!(f, "walk"),
        }
    }
}

/// Recoverable failures reported by core operations.
///
/// None of these are fatal: the caller may retry, no-op, or surface a
/// message such as "not enough stamina".
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A pool could not cover a spend.
    InsufficientResource {
        /// Pool that was asked to pay.
        pool: PoolId,
        /// Amount requested.
        required: u32,
        /// Amount the pool held.
        available: u32,
    },
    /// A turn or walk was started while another one is in flight.
    AlreadyInProgress(Activity),
    /// Setup data or an operation argument describes an impossible game.
    InvalidConfiguration(String),
    /// A fractional quantity was negative or not finite.
    InvalidAmount(f64),
    /// An operation was called in the wrong turn phase.
    OutOfPhase {
        /// Phase the operation requires.
        expected: &'static str,
        /// Phase the session was in.
        actual: &'static str,
    },
    /// The targeted enemy was defeated or never existed.
    EnemyGone(EnemyId),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InsufficientResource {
                pool,
                required,
                available,
            } => write!(f, "not enough {pool}: need {required}, have {available}"),
            CoreError::AlreadyInProgress(activity) => write!(f, "{activity} already in progress"),
            CoreError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {message}")
            }
            CoreError::InvalidAmount(amount) => write!(f, "invalid amount: {amount}"),
            CoreError::OutOfPhase { expected, actual } => {
                write!(f, "expected phase {expected}, session is {actual}")
            }
            CoreError::EnemyGone(id) => write!(f, "enemy {id} is gone"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Reject negative, NaN and infinite quantities.
///
/// # Errors
///
/// Returns [`CoreError::InvalidAmount`] for anything but a finite value `>= 0`.
pub fn ensure_non_negative(amount: f64) -> CoreResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(CoreError::InvalidAmount(amount))
    }
}
