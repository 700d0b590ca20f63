//! Session state: the turn machine that wires dice, path, pools, upgrades
//! and enemies together.
//!
//! A session is a plain value driven by [`Session::update`]. Each call
//! advances regen, enemy behaviour and the current turn by `dt` seconds:
//!
//! ```text
//! Idle --begin_turn--> Rolling --submit_roll--> Resolving(steps)
//!   ^                     ^                          |
//!   |                     |                       update
//!   |                 (bonus paid)                   v
//!   +---(no double)--- BonusRoll <--(double)--- Walking (one node per step)
//! ```
//!
//! Every observable change is reported to the session's [`EventSink`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, Activity, CoreError, CoreResult};
use crate::game::{
    DiceSource, EnemyConfig, EnemyId, EnemyRoster, EventLog, EventSink, GameEvent, NodeArrival,
    PathWalker, PoolId, Position, ResourceChange, ResourcePool, RollOutcome, SessionConfig,
    StatsRecord, StrikeOutcome, UpgradeApplied, UpgradeKind, UpgradeSelector, UpgradeTargets,
};

/// Where the current turn stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnPhase {
    /// Waiting for the player to start a turn.
    Idle,
    /// Stamina paid; waiting for the dice to settle.
    Rolling,
    /// Dice settled; the walk starts on the next update.
    Resolving {
        /// Steps to walk.
        steps: u32,
        /// Whether the roll was a double.
        bonus: bool,
    },
    /// Moving toward the next node.
    Walking {
        /// Seconds spent on the current step.
        elapsed: f64,
        /// Seconds the current step takes.
        duration: f64,
        /// Whether a bonus roll follows the walk.
        bonus: bool,
    },
    /// Waiting to throw the bonus roll.
    BonusRoll {
        /// Seconds left before the roll.
        wait: f64,
    },
}

impl TurnPhase {
    /// Short lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Rolling => "rolling",
            TurnPhase::Resolving { .. } => "resolving",
            TurnPhase::Walking { .. } => "walking",
            TurnPhase::BonusRoll { .. } => "bonus_roll",
        }
    }

    /// Whether a turn is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !matches!(self, TurnPhase::Idle)
    }
}

/// Running counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTally {
    /// Rolls resolved, bonus rolls included.
    pub rolls: u32,
    /// Rolls that were doubles.
    pub doubles: u32,
    /// Walks that finished.
    pub turns_completed: u32,
    /// Bonus rolls lost to low stamina.
    pub bonus_forfeited: u32,
    /// Turns cancelled with `abort_turn`.
    pub turns_aborted: u32,
    /// Node arrivals.
    pub nodes_visited: u64,
    /// Gold picked up from nodes.
    pub gold_collected: u64,
    /// Upgrades bought.
    pub upgrades: u32,
    /// Enemies spawned.
    pub enemies_spawned: u32,
    /// Strikes that landed.
    pub strikes: u32,
}

/// One hero on one board.
#[derive(Debug, Clone)]
pub struct Session<S = EventLog> {
    config: SessionConfig,
    phase: TurnPhase,
    walker: PathWalker,
    hero: Position,
    stamina: ResourcePool,
    gold: ResourcePool,
    stats: StatsRecord,
    upgrades: UpgradeSelector,
    enemies: EnemyRoster,
    rng: ChaCha8Rng,
    clock: f64,
    tally: SessionTally,
    sink: S,
}

impl Session<EventLog> {
    /// Start a session that journals into an [`EventLog`].
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`SessionConfig::validate`].
    pub fn new(config: SessionConfig, seed: u64) -> CoreResult<Self> {
        Self::with_sink(config, seed, EventLog::new())
    }
}

impl<S: EventSink> Session<S> {
    /// Start a session reporting to `sink`. `seed` drives upgrade picks and
    /// random patrols.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`SessionConfig::validate`].
    pub fn with_sink(config: SessionConfig, seed: u64, sink: S) -> CoreResult<Self> {
        config.validate()?;
        let walker = PathWalker::starting_at(config.path.build()?, config.start_node)?;
        let hero = walker.current_node().position;
        let stamina = ResourcePool::new(PoolId::Stamina, config.stamina_max)
            .with_regen(config.stamina_regen_rate, config.stamina_regen_interval)?;
        let gold = ResourcePool::unbounded(PoolId::Gold, config.starting_gold);
        let upgrades = UpgradeSelector::new(config.upgrade_cost, config.upgrade_cost_increment);

        Ok(Self {
            stats: config.stats,
            config,
            phase: TurnPhase::Idle,
            walker,
            hero,
            stamina,
            gold,
            upgrades,
            enemies: EnemyRoster::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: 0.0,
            tally: SessionTally::default(),
            sink,
        })
    }

    /// Pay the roll cost and wait for dice.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyInProgress`] unless idle, and
    /// [`CoreError::InsufficientResource`] if stamina is short. The phase
    /// is unchanged on error.
    pub fn begin_turn(&mut self) -> CoreResult<ResourceChange> {
        if self.phase.is_busy() {
            return Err(CoreError::AlreadyInProgress(Activity::Turn));
        }
        let change = self.stamina.spend(self.config.roll_cost)?;
        self.sink.emit(change.into());
        self.phase = TurnPhase::Rolling;
        Ok(change)
    }

    /// Feed the settled dice of the pending roll.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfPhase`] unless rolling, and
    /// [`CoreError::InvalidConfiguration`] for a roll of zero steps.
    pub fn submit_roll(&mut self, outcome: RollOutcome) -> CoreResult<()> {
        self.expect_phase(TurnPhase::Rolling)?;
        if outcome.total == 0 {
            return Err(CoreError::InvalidConfiguration(
                "roll must move at least one step".to_string(),
            ));
        }
        self.tally.rolls += 1;
        if outcome.is_double {
            self.tally.doubles += 1;
        }
        self.phase = TurnPhase::Resolving {
            steps: outcome.total,
            bonus: outcome.is_double,
        };
        self.sink.emit(GameEvent::RollResolved {
            faces: outcome.faces,
            total: outcome.total,
            is_double: outcome.is_double,
        });
        Ok(())
    }

    /// Throw the configured number of dice from `dice` and submit them.
    ///
    /// # Errors
    ///
    /// As [`Self::submit_roll`]. Dice are only thrown when rolling.
    pub fn roll(&mut self, dice: &mut impl DiceSource) -> CoreResult<RollOutcome> {
        self.expect_phase(TurnPhase::Rolling)?;
        let outcome = RollOutcome::resolve(&dice.roll(self.config.dice_count));
        self.submit_roll(outcome.clone())?;
        Ok(outcome)
    }

    /// Advance the session by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite `dt`.
    pub fn update(&mut self, dt: f64) -> CoreResult<()> {
        let dt = ensure_non_negative(dt)?;
        self.clock += dt;
        self.sink.set_time(self.clock);

        for change in self.stamina.tick(dt)? {
            self.sink.emit(change.into());
        }
        for change in self.enemies.update(dt, self.hero, &mut self.rng)? {
            self.sink.emit(change.into());
        }
        self.advance_turn(dt)
    }

    /// Cancel the turn in flight. Paid stamina is not refunded.
    ///
    /// Returns the walk steps that were dropped.
    pub fn abort_turn(&mut self) -> u32 {
        if self.phase.is_busy() {
            self.tally.turns_aborted += 1;
        }
        let dropped = self.walker.halt();
        self.hero = self.walker.current_node().position;
        self.phase = TurnPhase::Idle;
        dropped
    }

    /// Buy one random upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientResource`] if gold is short.
    pub fn upgrade_once(&mut self) -> CoreResult<UpgradeApplied> {
        let mut targets = UpgradeTargets {
            gold: &mut self.gold,
            stamina: &mut self.stamina,
            stats: &mut self.stats,
        };
        let applied = self.upgrades.roll_upgrade(&mut targets, &mut self.rng)?;
        self.report_upgrade(&applied);
        Ok(applied)
    }

    /// Buy random upgrades until gold runs short.
    pub fn upgrade_all(&mut self) -> Vec<UpgradeApplied> {
        let mut targets = UpgradeTargets {
            gold: &mut self.gold,
            stamina: &mut self.stamina,
            stats: &mut self.stats,
        };
        let applied = self
            .upgrades
            .roll_upgrade_repeatedly(&mut targets, &mut self.rng);
        for upgrade in &applied {
            self.report_upgrade(upgrade);
        }
        applied
    }

    /// Buy one upgrade of a chosen stat.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientResource`] if gold is short.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> CoreResult<UpgradeApplied> {
        let mut targets = UpgradeTargets {
            gold: &mut self.gold,
            stamina: &mut self.stamina,
            stats: &mut self.stats,
        };
        let applied = self.upgrades.purchase(kind, &mut targets)?;
        self.report_upgrade(&applied);
        Ok(applied)
    }

    /// Spawn an enemy from `config` at `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EnemyConfig::validate`].
    pub fn spawn_enemy(&mut self, config: &EnemyConfig, position: Position) -> CoreResult<EnemyId> {
        let id = self.enemies.spawn(config, position)?;
        self.tally.enemies_spawned += 1;
        self.sink.emit(GameEvent::EnemySpawned { enemy: id });
        Ok(id)
    }

    /// Spawn an enemy from the session's enemy template.
    ///
    /// # Errors
    ///
    /// As [`Self::spawn_enemy`].
    pub fn spawn_default_enemy(&mut self, position: Position) -> CoreResult<EnemyId> {
        let config = self.config.enemy;
        self.spawn_enemy(&config, position)
    }

    /// Hit enemy `id` for the configured click damage.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EnemyGone`] if the enemy is defeated or unknown.
    pub fn strike_enemy(&mut self, id: EnemyId) -> CoreResult<StrikeOutcome> {
        let outcome = self.enemies.strike(id, self.config.click_damage)?;
        self.tally.strikes += 1;
        self.sink.emit(outcome.change().into());
        if let StrikeOutcome::Defeated(_) = outcome {
            self.sink.emit(GameEvent::EnemyDefeated { enemy: id });
        }
        Ok(outcome)
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current turn phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The hero's token on the path.
    #[must_use]
    pub fn walker(&self) -> &PathWalker {
        &self.walker
    }

    /// The hero's position, interpolated while walking.
    #[must_use]
    pub const fn hero_position(&self) -> Position {
        self.hero
    }

    /// Hero stamina.
    #[must_use]
    pub const fn stamina(&self) -> &ResourcePool {
        &self.stamina
    }

    /// Hero gold.
    #[must_use]
    pub const fn gold(&self) -> &ResourcePool {
        &self.gold
    }

    /// Hero stats.
    #[must_use]
    pub const fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    /// Upgrade prices and increments.
    #[must_use]
    pub const fn upgrades(&self) -> &UpgradeSelector {
        &self.upgrades
    }

    /// Live enemies and the kill count.
    #[must_use]
    pub const fn enemies(&self) -> &EnemyRoster {
        &self.enemies
    }

    /// Seconds simulated so far.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Running counters.
    #[must_use]
    pub const fn tally(&self) -> SessionTally {
        self.tally
    }

    /// The event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The event sink, mutably (for draining).
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the session, keeping its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn expect_phase(&self, expected: TurnPhase) -> CoreResult<()> {
        if std::mem::discriminant(&self.phase) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(CoreError::OutOfPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            })
        }
    }

    /// Run the turn machine for `budget` seconds.
    fn advance_turn(&mut self, mut budget: f64) -> CoreResult<()> {
        loop {
            match self.phase {
                TurnPhase::Idle | TurnPhase::Rolling => return Ok(()),
                TurnPhase::Resolving { steps, bonus } => {
                    self.walker.begin(steps)?;
                    self.phase = TurnPhase::Walking {
                        elapsed: 0.0,
                        duration: self.step_duration(),
                        bonus,
                    };
                }
                TurnPhase::Walking {
                    elapsed,
                    duration,
                    bonus,
                } => {
                    if elapsed + budget < duration {
                        let elapsed = elapsed + budget;
                        let (from, to, _) = self.step_geometry();
                        self.hero = from.move_towards(to, from.distance(to) * elapsed / duration);
                        self.phase = TurnPhase::Walking {
                            elapsed,
                            duration,
                            bonus,
                        };
                        return Ok(());
                    }
                    budget = (budget - (duration - elapsed)).max(0.0);
                    if let Some(arrival) = self.walker.step() {
                        self.arrive(&arrival);
                    }
                    if self.walker.is_moving() {
                        self.phase = TurnPhase::Walking {
                            elapsed: 0.0,
                            duration: self.step_duration(),
                            bonus,
                        };
                    } else {
                        self.finish_walk(bonus);
                    }
                }
                TurnPhase::BonusRoll { wait } => {
                    if wait > budget {
                        self.phase = TurnPhase::BonusRoll {
                            wait: wait - budget,
                        };
                        return Ok(());
                    }
                    budget -= wait;
                    match self.stamina.spend(self.config.roll_cost) {
                        Ok(change) => {
                            self.sink.emit(change.into());
                            self.phase = TurnPhase::Rolling;
                        }
                        Err(_) => {
                            self.tally.bonus_forfeited += 1;
                            self.sink.emit(GameEvent::BonusForfeited);
                            self.phase = TurnPhase::Idle;
                        }
                    }
                }
            }
        }
    }

    fn report_upgrade(&mut self, applied: &UpgradeApplied) {
        self.tally.upgrades += 1;
        self.sink.emit(applied.gold.into());
        if let Some(change) = applied.stamina.filter(ResourceChange::is_change) {
            self.sink.emit(change.into());
        }
        self.sink.emit(GameEvent::UpgradeApplied {
            stat: applied.kind,
            amount: applied.amount,
            cost: applied.cost,
        });
    }

    fn arrive(&mut self, arrival: &NodeArrival) {
        self.hero = arrival.position;
        self.tally.nodes_visited += 1;
        self.sink.emit(GameEvent::NodeArrived {
            node: arrival.index,
            remaining: arrival.remaining,
        });
        if let Some(amount) = arrival.gold {
            let change = self.gold.gain(amount);
            self.tally.gold_collected += u64::from(amount);
            self.sink.emit(change.into());
        }
    }

    fn finish_walk(&mut self, bonus: bool) {
        self.tally.turns_completed += 1;
        self.sink.emit(GameEvent::TurnComplete { bonus });
        self.phase = if bonus {
            TurnPhase::BonusRoll {
                wait: self.config.bonus_roll_delay,
            }
        } else {
            TurnPhase::Idle
        };
    }

    /// Start, end and speed of the next step.
    fn step_geometry(&self) -> (Position, Position, f64) {
        let from = self.walker.current_node().position;
        let to = self.walker.next_node().position;
        let speed = if from.distance(to) > self.config.run_distance_threshold {
            self.stats.run_speed()
        } else {
            self.stats.walk_speed()
        };
        (from, to, speed)
    }

    fn step_duration(&self) -> f64 {
        let (from, to, speed) = self.step_geometry();
        from.distance(to) / speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PathLayout, PathNode, ScriptedDice};

    /// Unit square, one second per step, gold on node 2.
    fn square_config() -> SessionConfig {
        SessionConfig {
            path: PathLayout::Custom {
                nodes: vec![
                    PathNode::plain(Position::new(0.0, 0.0, 0.0)),
                    PathNode::plain(Position::new(1.0, 0.0, 0.0)),
                    PathNode::with_gold(Position::new(1.0, 0.0, 1.0), 7),
                    PathNode::plain(Position::new(0.0, 0.0, 1.0)),
                ],
            },
            stats: StatsRecord {
                movement_speed: 1.0,
                ..StatsRecord::default()
            },
            ..SessionConfig::default()
        }
    }

    fn arrivals(session: &Session) -> Vec<usize> {
        session
            .sink()
            .events()
            .filter_map(|event| match event {
                GameEvent::NodeArrived { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_turn() {
        let mut session = Session::new(square_config(), 1).unwrap();
        let paid = session.begin_turn().unwrap();
        assert_eq!(paid.new, 90);

        session.submit_roll(RollOutcome::resolve(&[1, 2])).unwrap();
        assert_eq!(
            session.phase(),
            TurnPhase::Resolving {
                steps: 3,
                bonus: false
            }
        );

        session.update(0.0).unwrap();
        assert_eq!(session.walker().remaining_steps(), 3);

        session.update(1.0).unwrap();
        assert_eq!(arrivals(&session), vec![1]);

        session.update(2.0).unwrap();
        assert_eq!(arrivals(&session), vec![1, 2, 3]);
        assert_eq!(session.phase(), TurnPhase::Idle);
        assert_eq!(session.gold().current(), 107);
        assert_eq!(session.walker().current_index(), 3);
        assert_eq!(session.tally().turns_completed, 1);
        assert!(session
            .sink()
            .events()
            .any(|e| *e == GameEvent::TurnComplete { bonus: false }));
    }

    #[test]
    fn test_gold_event_follows_arrival() {
        let mut session = Session::new(square_config(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[1, 1])).unwrap();
        session.update(2.0).unwrap();

        let events: Vec<&GameEvent> = session.sink().events().collect();
        let at = events
            .iter()
            .position(|e| matches!(e, GameEvent::NodeArrived { node: 2, .. }))
            .unwrap();
        assert_eq!(
            *events[at + 1],
            GameEvent::ResourceChanged {
                pool: PoolId::Gold,
                old: 100,
                new: 107
            }
        );
    }

    #[test]
    fn test_double_earns_paid_bonus_roll() {
        let mut session = Session::new(square_config(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[2, 2])).unwrap();
        session.update(4.0).unwrap();

        assert_eq!(arrivals(&session), vec![1, 2, 3, 0]);
        assert_eq!(session.phase(), TurnPhase::BonusRoll { wait: 0.5 });
        assert_eq!(session.stamina().current(), 100);

        session.update(0.25).unwrap();
        assert!(matches!(session.phase(), TurnPhase::BonusRoll { .. }));
        session.update(0.25).unwrap();
        assert_eq!(session.phase(), TurnPhase::Rolling);
        assert_eq!(session.stamina().current(), 90);

        let mut dice = ScriptedDice::new(vec![vec![1, 2]]);
        let outcome = session.roll(&mut dice).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!(session.tally().rolls, 2);
        assert_eq!(session.tally().doubles, 1);
    }

    #[test]
    fn test_bonus_forfeited_without_stamina() {
        let config = SessionConfig {
            roll_cost: 60,
            stamina_regen_rate: 0.0,
            ..square_config()
        };
        let mut session = Session::new(config, 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[1, 1])).unwrap();
        session.update(2.0).unwrap();
        session.update(0.5).unwrap();

        assert_eq!(session.phase(), TurnPhase::Idle);
        assert_eq!(session.stamina().current(), 40);
        assert_eq!(session.tally().bonus_forfeited, 1);
        assert!(session
            .sink()
            .events()
            .any(|e| *e == GameEvent::BonusForfeited));
    }

    #[test]
    fn test_long_steps_are_run() {
        let config = SessionConfig {
            path: PathLayout::Custom {
                nodes: vec![
                    PathNode::plain(Position::new(0.0, 0.0, 0.0)),
                    PathNode::plain(Position::new(6.0, 0.0, 0.0)),
                ],
            },
            ..square_config()
        };
        let mut session = Session::new(config, 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[1])).unwrap();

        // 6 units at run speed 1.5 takes 4 seconds.
        session.update(3.5).unwrap();
        assert!(arrivals(&session).is_empty());
        assert!((session.hero_position().x - 5.25).abs() < 1e-9);

        session.update(0.5).unwrap();
        assert_eq!(arrivals(&session), vec![1]);
        assert_eq!(session.hero_position(), Position::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn test_speed_upgrade_mid_step_keeps_position() {
        let mut session = Session::new(square_config(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[1, 2])).unwrap();
        session.update(0.5).unwrap();
        assert!((session.hero_position().x - 0.5).abs() < 1e-9);

        session.purchase_upgrade(UpgradeKind::MovementSpeed).unwrap();
        assert!((session.hero_position().x - 0.5).abs() < 1e-9);

        // The step in flight keeps its duration; the next one is faster.
        session.update(0.25).unwrap();
        assert!((session.hero_position().x - 0.75).abs() < 1e-9);
        session.update(0.25).unwrap();
        assert_eq!(arrivals(&session), vec![1]);
    }

    #[test]
    fn test_update_reports_stamina_regen() {
        let mut session = Session::new(square_config(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[1, 2])).unwrap();
        for _ in 0..3 {
            session.update(1.0).unwrap();
        }

        let regen: Vec<(u32, u32)> = session
            .sink()
            .events()
            .filter_map(|event| match event {
                GameEvent::ResourceChanged {
                    pool: PoolId::Stamina,
                    old,
                    new,
                } if new > old => Some((*old, *new)),
                _ => None,
            })
            .collect();
        assert_eq!(regen, vec![(90, 95), (95, 100)]);
        assert_eq!(session.stamina().current(), 100);
    }

    #[test]
    fn test_abort_stops_arrivals() {
        let mut session = Session::new(square_config(), 1).unwrap();
        session.begin_turn().unwrap();
        session.submit_roll(RollOutcome::resolve(&[3, 4])).unwrap();
        session.update(1.5).unwrap();

        assert_eq!(session.abort_turn(), 6);
        assert_eq!(session.phase(), TurnPhase::Idle);
        session.update(10.0).unwrap();

        assert_eq!(arrivals(&session), vec![1]);
        assert_eq!(session.hero_position(), Position::new(1.0, 0.0, 0.0));
        assert_eq!(session.tally().turns_aborted, 1);
    }

    #[test]
    fn test_phase_guards() {
        let mut session = Session::new(square_config(), 1).unwrap();
        assert_eq!(
            session.submit_roll(RollOutcome::resolve(&[1, 2])),
            Err(CoreError::OutOfPhase {
                expected: "rolling",
                actual: "idle"
            })
        );

        session.begin_turn().unwrap();
        assert_eq!(
            session.begin_turn(),
            Err(CoreError::AlreadyInProgress(Activity::Turn))
        );
        assert_eq!(session.stamina().current(), 90);

        assert!(matches!(
            session.submit_roll(RollOutcome::resolve(&[])),
            Err(CoreError::InvalidConfiguration(_))
        ));
        assert_eq!(session.phase(), TurnPhase::Rolling);
    }

    #[test]
    fn test_begin_turn_without_stamina() {
        let config = SessionConfig {
            stamina_regen_rate: 0.0,
            ..square_config()
        };
        let mut session = Session::new(config, 1).unwrap();
        for _ in 0..10 {
            session.begin_turn().unwrap();
            session.abort_turn();
        }
        assert_eq!(
            session.begin_turn(),
            Err(CoreError::InsufficientResource {
                pool: PoolId::Stamina,
                required: 10,
                available: 0
            })
        );
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_negative_dt_rejected() {
        let mut session = Session::new(square_config(), 1).unwrap();
        assert_eq!(session.update(-1.0), Err(CoreError::InvalidAmount(-1.0)));
        assert!(session.clock().abs() < f64::EPSILON);
    }

    #[test]
    fn test_upgrade_all_spends_down() {
        let mut session = Session::new(square_config(), 9).unwrap();
        let applied = session.upgrade_all();
        // 20 + 30 + 40 out of 100.
        assert_eq!(applied.len(), 3);
        assert_eq!(session.gold().current(), 10);
        assert_eq!(session.upgrades().cost(), 50);
        assert_eq!(
            session
                .sink()
                .events()
                .filter(|e| matches!(e, GameEvent::UpgradeApplied { .. }))
                .count(),
            3
        );
        assert!(session.upgrade_once().is_err());
    }

    #[test]
    fn test_purchase_max_stamina_reports_capacity() {
        let mut session = Session::new(square_config(), 9).unwrap();
        let applied = session.purchase_upgrade(UpgradeKind::MaxStamina).unwrap();
        assert!((applied.amount - 5.0).abs() < f64::EPSILON);
        assert_eq!(session.stamina().max(), 105);
    }

    #[test]
    fn test_enemy_lifecycle() {
        let mut session = Session::with_sink(square_config(), 1, Vec::new()).unwrap();
        let id = session.spawn_default_enemy(Position::new(5.0, 0.0, 5.0)).unwrap();
        for _ in 0..10 {
            session.strike_enemy(id).unwrap();
        }
        assert_eq!(session.enemies().kills(), 1);
        assert_eq!(session.strike_enemy(id), Err(CoreError::EnemyGone(id)));

        let events = session.into_sink();
        assert_eq!(events.first(), Some(&GameEvent::EnemySpawned { enemy: id }));
        assert_eq!(events.last(), Some(&GameEvent::EnemyDefeated { enemy: id }));
    }
}
