#![no_main]

//! Session fuzzer.
//!
//! Drives a session with an arbitrary mix of turns, rolls, upgrades,
//! enemy spawns, strikes, aborts and frame steps, checking invariants
//! after every action. Out-of-phase calls must fail cleanly.

use arbitrary::Arbitrary;
use dicewalk::game::invariants::check_invariants;
use dicewalk::game::{EnemyConfig, Position, RollOutcome, Session, SessionConfig, UpgradeKind};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated player action.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzAction {
    /// Pay for and start a turn.
    BeginTurn,
    /// Submit settled faces.
    Roll { faces: Vec<u8> },
    /// Advance time by `millis` milliseconds.
    Update { millis: u16 },
    /// Spend all gold on random upgrades.
    UpgradeAll,
    /// Buy one upgrade of the given stat.
    Purchase { stat: u8 },
    /// Spawn an enemy at a point.
    Spawn { x: i8, z: i8 },
    /// Strike an enemy by id.
    Strike { id: u8 },
    /// Cancel the walk in flight.
    Abort,
}

/// Structured input for session fuzzing.
#[derive(Arbitrary, Debug)]
struct SessionInput {
    /// Seed for upgrades and patrols.
    seed: u64,
    /// Dice per roll.
    dice_count: u8,
    /// Stamina per roll.
    roll_cost: u8,
    /// Actions to apply in order.
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: SessionInput| {
    let config = SessionConfig {
        dice_count: usize::from(input.dice_count % 4) + 1,
        roll_cost: u32::from(input.roll_cost % 50),
        ..SessionConfig::default()
    };
    let mut session = match Session::new(config, input.seed) {
        Ok(session) => session,
        Err(_) => return,
    };
    let enemy = EnemyConfig::default();

    for action in input.actions.into_iter().take(200) {
        match action {
            FuzzAction::BeginTurn => {
                let _ = session.begin_turn();
            }
            FuzzAction::Roll { faces } => {
                let faces: Vec<u8> = faces.iter().take(4).map(|f| f % 6 + 1).collect();
                let _ = session.submit_roll(RollOutcome::resolve(&faces));
            }
            FuzzAction::Update { millis } => {
                session
                    .update(f64::from(millis) / 1000.0)
                    .expect("non-negative frame must succeed");
            }
            FuzzAction::UpgradeAll => {
                session.upgrade_all();
            }
            FuzzAction::Purchase { stat } => {
                let kind = UpgradeKind::ALL[usize::from(stat) % UpgradeKind::ALL.len()];
                let _ = session.purchase_upgrade(kind);
            }
            FuzzAction::Spawn { x, z } => {
                let position = Position::new(f64::from(x), 0.0, f64::from(z));
                let _ = session.spawn_enemy(&enemy, position);
            }
            FuzzAction::Strike { id } => {
                let _ = session.strike_enemy(u32::from(id));
            }
            FuzzAction::Abort => {
                session.abort_turn();
            }
        }

        let violations = check_invariants(&session);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
