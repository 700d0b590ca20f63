//! Session invariants - sanity checks that detect bugs.
//!
//! None of these can trigger through the public API of a correctly
//! implemented session. The simulator checks them every frame in debug
//! builds.

use crate::game::{EventSink, ResourcePool, Session, TurnPhase, MIN_MOVEMENT_SPEED};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn check_pool(pool: &ResourcePool, violations: &mut Vec<InvariantViolation>) {
    if pool.current() > pool.max() {
        violations.push(InvariantViolation {
            message: format!(
                "{} holds {} above its max {}",
                pool.id(),
                pool.current(),
                pool.max()
            ),
        });
    }
    if !(pool.regen_rate().is_finite() && pool.regen_rate() >= 0.0) {
        violations.push(InvariantViolation {
            message: format!("{} has regen rate {}", pool.id(), pool.regen_rate()),
        });
    }
}

/// Check all session invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants<S: EventSink>(session: &Session<S>) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    check_pool(session.stamina(), &mut violations);
    check_pool(session.gold(), &mut violations);

    // Stats floors
    let stats = session.stats();
    if stats.movement_speed < MIN_MOVEMENT_SPEED || !stats.movement_speed.is_finite() {
        violations.push(InvariantViolation {
            message: format!("Movement speed {} below floor", stats.movement_speed),
        });
    }
    for (name, value) in [
        ("strength", stats.strength),
        ("intelligence", stats.intelligence),
        ("willpower", stats.willpower),
        ("dexterity", stats.dexterity),
    ] {
        if value < 0 {
            violations.push(InvariantViolation {
                message: format!("Attribute {name} is negative ({value})"),
            });
        }
    }

    // Token placement and walk/phase consistency
    let walker = session.walker();
    if walker.current_index() >= walker.path().len() {
        violations.push(InvariantViolation {
            message: format!(
                "Token on node {} of a {}-node path",
                walker.current_index(),
                walker.path().len()
            ),
        });
    }
    let walking = matches!(session.phase(), TurnPhase::Walking { .. });
    if walker.is_moving() != walking {
        violations.push(InvariantViolation {
            message: format!(
                "Walker moving={} during phase {}",
                walker.is_moving(),
                session.phase().name()
            ),
        });
    }
    if let TurnPhase::Walking {
        elapsed, duration, ..
    } = session.phase()
    {
        if elapsed < 0.0 || elapsed > duration {
            violations.push(InvariantViolation {
                message: format!("Step progress {elapsed} outside 0..={duration}"),
            });
        }
    }

    // Upgrade price only rises
    if session.upgrades().cost() < session.config().upgrade_cost {
        violations.push(InvariantViolation {
            message: format!(
                "Upgrade cost {} fell below starting cost {}",
                session.upgrades().cost(),
                session.config().upgrade_cost
            ),
        });
    }

    // Roster holds only live enemies
    for enemy in session.enemies().iter() {
        if !enemy.is_alive() || enemy.stamina().is_empty() {
            violations.push(InvariantViolation {
                message: format!("Defeated enemy {} still on the roster", enemy.id()),
            });
        }
        check_pool(enemy.stamina(), &mut violations);
    }

    violations
}

/// Assert all session invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants<S: EventSink>(session: &Session<S>) {
    let violations = check_invariants(session);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Session invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants<S: EventSink>(_session: &Session<S>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{RollOutcome, SessionConfig};

    #[test]
    fn test_fresh_session_passes() {
        let session = Session::new(SessionConfig::default(), 1).unwrap();
        assert!(check_invariants(&session).is_empty());
    }

    #[test]
    fn test_invariants_hold_through_a_turn() {
        let mut session = Session::new(SessionConfig::default(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[5, 5])).unwrap();
        for _ in 0..200 {
            session.update(0.05).unwrap();
            let violations = check_invariants(&session);
            assert!(violations.is_empty(), "{violations:?}");
        }
        session.upgrade_all();
        assert_invariants(&session);
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation {
            message: "gold holds 5 above its max 4".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "Invariant violation: gold holds 5 above its max 4"
        );
    }
}
