//! End-to-end tests for sessions, the simulator and recordings.
//!
//! Run with: cargo test --release session_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use dicewalk::game::{
    GameEvent, Path, PathLayout, PathNode, PathWalker, PoolId, Position, ResourcePool,
    RollOutcome, Session, SessionConfig, StatsRecord, TurnPhase, UpgradeSelector, UpgradeTargets,
};
use dicewalk::sim::{run_batch, run_session, run_session_logged, Recording, SimConfig};
use dicewalk::CoreError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn square_nodes() -> Vec<PathNode> {
    vec![
        PathNode::plain(Position::new(0.0, 0.0, 0.0)),
        PathNode::plain(Position::new(1.0, 0.0, 0.0)),
        PathNode::with_gold(Position::new(1.0, 0.0, 1.0), 7),
        PathNode::plain(Position::new(0.0, 0.0, 1.0)),
    ]
}

fn square_config() -> SessionConfig {
    SessionConfig {
        path: PathLayout::Custom {
            nodes: square_nodes(),
        },
        stats: StatsRecord {
            movement_speed: 1.0,
            ..StatsRecord::default()
        },
        ..SessionConfig::default()
    }
}

fn quick_sim() -> SimConfig {
    SimConfig {
        max_turns: 15,
        ..SimConfig::default()
    }
}

/// Step until the session reaches `phase`, giving up after `limit` frames.
fn run_until(session: &mut Session, phase: TurnPhase, limit: usize) {
    for _ in 0..limit {
        if session.phase() == phase {
            return;
        }
        session.update(0.25).unwrap();
    }
    panic!("session stuck in {}", session.phase().name());
}

#[test]
fn test_advance_six_on_four_nodes() {
    let mut walker = PathWalker::new(Path::new(square_nodes()).unwrap());
    let mut visited = Vec::new();

    walker.advance(6, |arrival| visited.push(arrival.index)).unwrap();

    assert_eq!(visited, vec![1, 2, 3, 0, 1, 2]);
    assert_eq!(walker.current_index(), 2);
}

#[test]
fn test_overspend_keeps_pool() {
    let mut pool = ResourcePool::new(PoolId::Stamina, 100).with_current(5);

    let err = pool.spend(10).unwrap_err();

    assert_eq!(
        err,
        CoreError::InsufficientResource {
            pool: PoolId::Stamina,
            required: 10,
            available: 5,
        }
    );
    assert_eq!(pool.current(), 5);
}

#[test]
fn test_twenty_five_gold_buys_one_upgrade() {
    let mut selector = UpgradeSelector::new(20, 10);
    let mut gold = ResourcePool::unbounded(PoolId::Gold, 25);
    let mut stamina = ResourcePool::new(PoolId::Stamina, 100);
    let mut stats = StatsRecord::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let applied = selector.roll_upgrade_repeatedly(
        &mut UpgradeTargets {
            gold: &mut gold,
            stamina: &mut stamina,
            stats: &mut stats,
        },
        &mut rng,
    );

    assert_eq!(applied.len(), 1);
    assert_eq!(gold.current(), 5);
    assert_eq!(selector.cost(), 30);
}

#[test]
fn test_double_three() {
    let outcome = RollOutcome::resolve(&[3, 3]);
    assert_eq!(outcome.total, 6);
    assert!(outcome.is_double);
}

#[test]
fn test_double_earns_paid_bonus_walk() {
    let config = SessionConfig {
        stamina_regen_rate: 0.0,
        ..square_config()
    };
    let mut session = Session::new(config, 3).unwrap();

    session.begin_turn().unwrap();
    session.submit_roll(RollOutcome::resolve(&[3, 3])).unwrap();
    run_until(&mut session, TurnPhase::Rolling, 100);

    // Two walks through node 2, then the bonus roll is charged.
    assert_eq!(session.walker().current_index(), 2);
    assert_eq!(session.gold().current(), 114);
    assert_eq!(session.stamina().current(), 80);

    session.submit_roll(RollOutcome::resolve(&[1, 2])).unwrap();
    run_until(&mut session, TurnPhase::Idle, 100);

    assert_eq!(session.walker().current_index(), 1);
    let tally = session.tally();
    assert_eq!(tally.rolls, 2);
    assert_eq!(tally.doubles, 1);
    assert_eq!(tally.turns_completed, 2);
    assert_eq!(tally.nodes_visited, 9);

    let completions: Vec<bool> = session
        .sink()
        .events()
        .filter_map(|event| match event {
            GameEvent::TurnComplete { bonus } => Some(*bonus),
            _ => None,
        })
        .collect();
    assert_eq!(completions, vec![true, false]);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.json");
    std::fs::write(&path, serde_json::to_string_pretty(&square_config()).unwrap()).unwrap();

    let loaded = SessionConfig::load(&path).unwrap();

    assert_eq!(loaded, square_config());
    let session = Session::new(loaded, 1).unwrap();
    assert_eq!(session.walker().path().len(), 4);
}

#[test]
fn test_simulation_is_deterministic() {
    let config = quick_sim();
    let a = run_session(99, &config).unwrap();
    let b = run_session(99, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.tally.turns_completed, 15);
}

#[test]
fn test_recording_replays_identically() {
    let config = quick_sim();
    let original = run_session(2024, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    Recording::new(2024, config).save(&path).unwrap();

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.replay().unwrap(), original);
}

#[test]
fn test_batch_matches_single_runs() {
    let config = quick_sim();
    let results = run_batch(500, 4, &config);

    assert_eq!(results.len(), 4);
    for (offset, result) in results.into_iter().enumerate() {
        let seed = 500 + offset as u64;
        assert_eq!(result.unwrap(), run_session(seed, &config).unwrap());
    }
}

#[test]
fn test_event_journal_is_json_lines() {
    let (result, log) = run_session_logged(5, &quick_sim()).unwrap();
    let text = log.to_json_lines().unwrap();

    assert_eq!(text.lines().count(), log.len());
    let mut completions = 0;
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["time"].is_number());
        if value["event"] == "turn_complete" {
            completions += 1;
        }
    }
    assert_eq!(completions, u64::from(result.tally.turns_completed));
}
