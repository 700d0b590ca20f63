//! Enemies: a stamina pool that strikes drain, plus a movement behaviour.
//!
//! An enemy is defeated the moment its stamina reaches zero. Defeated enemies
//! are removed from the [`EnemyRoster`] and never move or regenerate again;
//! strikes against them report [`CoreError::EnemyGone`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CoreError, CoreResult};
use crate::game::{PoolId, Position, ResourceChange, ResourcePool};

/// Roster-assigned enemy handle.
pub type EnemyId = u32;

/// Distance at which a patrol leg counts as finished.
pub const PATROL_ARRIVAL_RADIUS: f64 = 0.2;

/// Distance from spawn under which a patrol heads out to its target.
pub const PATROL_HOME_RADIUS: f64 = 1.0;

/// How an enemy moves between strikes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Behavior {
    /// Stand still.
    #[default]
    Idle,
    /// Walk straight at the hero.
    Follow,
    /// Walk back and forth at half speed, pausing between legs.
    Patrol {
        /// Fixed far end of the patrol. Without one, each leg picks a random
        /// point within `radius` of the spawn point.
        #[serde(default)]
        target: Option<Position>,
        /// Half-width of the random patrol square.
        #[serde(default = "default_patrol_radius")]
        radius: f64,
        /// Seconds to wait at the end of each leg.
        #[serde(default = "default_patrol_wait")]
        wait: f64,
    },
}

fn default_patrol_radius() -> f64 {
    5.0
}

fn default_patrol_wait() -> f64 {
    2.0
}

/// Enemy template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Starting and maximum stamina.
    pub max_stamina: u32,
    /// Stamina regenerated per second once recovering.
    pub recharge_rate: f64,
    /// Seconds without a strike before stamina regenerates.
    pub recharge_delay: f64,
    /// Movement speed in units per second.
    pub speed: f64,
    /// Movement behaviour.
    pub behavior: Behavior,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_stamina: 100,
            recharge_rate: 5.0,
            recharge_delay: 2.0,
            speed: 2.0,
            behavior: Behavior::Idle,
        }
    }
}

impl EnemyConfig {
    /// Check that the template describes a spawnable enemy.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] or
    /// [`CoreError::InvalidAmount`] naming the first bad field.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_stamina == 0 {
            return Err(CoreError::InvalidConfiguration(
                "enemy max_stamina must be positive".to_string(),
            ));
        }
        ensure_non_negative(self.recharge_rate)?;
        ensure_non_negative(self.recharge_delay)?;
        ensure_non_negative(self.speed)?;
        if let Behavior::Patrol { radius, wait, .. } = self.behavior {
            ensure_non_negative(radius)?;
            ensure_non_negative(wait)?;
        }
        Ok(())
    }
}

/// Result of a strike that landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// The enemy survived.
    Hit(ResourceChange),
    /// The enemy's stamina reached zero.
    Defeated(ResourceChange),
}

impl StrikeOutcome {
    /// Stamina movement caused by the strike.
    #[must_use]
    pub const fn change(&self) -> ResourceChange {
        match self {
            StrikeOutcome::Hit(change) | StrikeOutcome::Defeated(change) => *change,
        }
    }
}

/// Where a patrol is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PatrolLeg {
    Moving(Position),
    Waiting(f64),
}

/// A live enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    stamina: ResourcePool,
    position: Position,
    spawn: Position,
    speed: f64,
    behavior: Behavior,
    leg: Option<PatrolLeg>,
    alive: bool,
}

impl Enemy {
    /// Build an enemy from a template at `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails [`EnemyConfig::validate`].
    pub fn new(id: EnemyId, config: &EnemyConfig, position: Position) -> CoreResult<Self> {
        config.validate()?;
        let stamina = ResourcePool::new(PoolId::Enemy(id), config.max_stamina)
            .with_regen(config.recharge_rate, 1.0)?
            .with_regen_delay(config.recharge_delay)?;
        Ok(Self {
            id,
            stamina,
            position,
            spawn: position,
            speed: config.speed,
            behavior: config.behavior,
            leg: None,
            alive: true,
        })
    }

    /// Roster handle.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Stamina pool.
    #[must_use]
    pub const fn stamina(&self) -> &ResourcePool {
        &self.stamina
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Where the enemy spawned.
    #[must_use]
    pub const fn spawn_point(&self) -> Position {
        self.spawn
    }

    /// Movement behaviour.
    #[must_use]
    pub const fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Whether the enemy still has stamina.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Drain `damage` stamina.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EnemyGone`] if the enemy was already defeated.
    pub fn strike(&mut self, damage: u32) -> CoreResult<StrikeOutcome> {
        if !self.alive {
            return Err(CoreError::EnemyGone(self.id));
        }
        let change = self.stamina.drain(damage);
        if self.stamina.is_empty() {
            self.alive = false;
            Ok(StrikeOutcome::Defeated(change))
        } else {
            Ok(StrikeOutcome::Hit(change))
        }
    }

    /// Advance regen and movement by `dt` seconds.
    ///
    /// Defeated enemies are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite `dt`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        hero: Position,
        rng: &mut R,
    ) -> CoreResult<Vec<ResourceChange>> {
        let dt = ensure_non_negative(dt)?;
        if !self.alive {
            return Ok(Vec::new());
        }
        let changes = self.stamina.tick(dt)?;

        match self.behavior {
            Behavior::Idle => {}
            Behavior::Follow => {
                self.position = self.position.move_towards(hero, self.speed * dt);
            }
            Behavior::Patrol {
                target,
                radius,
                wait,
            } => self.patrol(dt, target, radius, wait, rng),
        }
        Ok(changes)
    }

    fn patrol<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        target: Option<Position>,
        radius: f64,
        wait: f64,
        rng: &mut R,
    ) {
        let mut budget = dt;
        // Each pass either finishes a wait, finishes a leg, or spends the budget.
        while budget > 0.0 {
            let leg = match self.leg {
                Some(leg) => leg,
                None => PatrolLeg::Moving(self.next_patrol_point(target, radius, rng)),
            };
            match leg {
                PatrolLeg::Waiting(left) => {
                    if left > budget {
                        self.leg = Some(PatrolLeg::Waiting(left - budget));
                        return;
                    }
                    budget -= left;
                    self.leg = None;
                }
                PatrolLeg::Moving(point) => {
                    let speed = self.speed / 2.0;
                    if speed <= 0.0 {
                        self.leg = Some(leg);
                        return;
                    }
                    let distance = (self.position.distance(point) - PATROL_ARRIVAL_RADIUS).max(0.0);
                    let travel = speed * budget;
                    if travel < distance {
                        self.position = self.position.move_towards(point, travel);
                        self.leg = Some(leg);
                        return;
                    }
                    self.position = self.position.move_towards(point, distance);
                    budget -= distance / speed;
                    self.leg = Some(PatrolLeg::Waiting(wait));
                    if wait <= 0.0 && distance <= 0.0 {
                        // Already standing on the point; avoid spinning.
                        self.leg = None;
                        return;
                    }
                }
            }
        }
    }

    fn next_patrol_point<R: Rng + ?Sized>(
        &self,
        target: Option<Position>,
        radius: f64,
        rng: &mut R,
    ) -> Position {
        match target {
            Some(far) if self.position.distance(self.spawn) < PATROL_HOME_RADIUS => far,
            Some(_) => self.spawn,
            None if radius > 0.0 => Position::new(
                self.spawn.x + rng.random_range(-radius..radius),
                self.spawn.y,
                self.spawn.z + rng.random_range(-radius..radius),
            ),
            None => self.spawn,
        }
    }
}

/// All live enemies, oldest first, plus the kill counter.
#[derive(Debug, Clone, Default)]
pub struct EnemyRoster {
    next_id: EnemyId,
    enemies: Vec<Enemy>,
    kills: u32,
}

impl EnemyRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enemy and return its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails [`EnemyConfig::validate`].
    pub fn spawn(&mut self, config: &EnemyConfig, position: Position) -> CoreResult<EnemyId> {
        let id = self.next_id;
        let enemy = Enemy::new(id, config, position)?;
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(enemy);
        Ok(id)
    }

    /// Strike enemy `id`. A defeated enemy is removed and counted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EnemyGone`] if no live enemy has that handle.
    pub fn strike(&mut self, id: EnemyId, damage: u32) -> CoreResult<StrikeOutcome> {
        let slot = self
            .enemies
            .iter()
            .position(|enemy| enemy.id == id)
            .ok_or(CoreError::EnemyGone(id))?;
        let outcome = self.enemies[slot].strike(damage)?;
        if let StrikeOutcome::Defeated(_) = outcome {
            self.enemies.remove(slot);
            self.kills += 1;
        }
        Ok(outcome)
    }

    /// Advance every enemy by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for a negative or non-finite `dt`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        hero: Position,
        rng: &mut R,
    ) -> CoreResult<Vec<ResourceChange>> {
        let mut changes = Vec::new();
        for enemy in &mut self.enemies {
            changes.extend(enemy.update(dt, hero, rng)?);
        }
        Ok(changes)
    }

    /// Look up a live enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    /// Live enemies, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Oldest live enemy.
    #[must_use]
    pub fn oldest(&self) -> Option<EnemyId> {
        self.enemies.first().map(Enemy::id)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Enemies defeated so far.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(3)
    }

    #[test]
    fn test_ten_strikes_defeat_default_enemy() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(&EnemyConfig::default(), Position::default()).unwrap();

        for _ in 0..9 {
            assert!(matches!(roster.strike(id, 10).unwrap(), StrikeOutcome::Hit(_)));
        }
        let last = roster.strike(id, 10).unwrap();
        assert!(matches!(last, StrikeOutcome::Defeated(_)));
        assert_eq!(last.change().new, 0);
        assert_eq!(roster.kills(), 1);
        assert!(roster.is_empty());
        assert_eq!(roster.strike(id, 10), Err(CoreError::EnemyGone(id)));
    }

    #[test]
    fn test_overkill_saturates() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(&EnemyConfig::default(), Position::default()).unwrap();
        let outcome = roster.strike(id, 1000).unwrap();
        assert_eq!(outcome.change().delta(), -100);
        assert!(matches!(outcome, StrikeOutcome::Defeated(_)));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut roster = EnemyRoster::new();
        let config = EnemyConfig::default();
        let a = roster.spawn(&config, Position::default()).unwrap();
        roster.strike(a, 100).unwrap();
        let b = roster.spawn(&config, Position::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(roster.oldest(), Some(b));
    }

    #[test]
    fn test_regen_waits_for_delay() {
        let mut roster = EnemyRoster::new();
        let id = roster.spawn(&EnemyConfig::default(), Position::default()).unwrap();
        roster.strike(id, 30).unwrap();

        let mut rng = rng();
        assert!(roster.update(2.0, Position::default(), &mut rng).unwrap().is_empty());
        let changes = roster.update(1.0, Position::default(), &mut rng).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(roster.get(id).unwrap().stamina().current(), 75);
    }

    #[test]
    fn test_follow_moves_toward_hero() {
        let config = EnemyConfig {
            behavior: Behavior::Follow,
            ..EnemyConfig::default()
        };
        let mut enemy = Enemy::new(0, &config, Position::default()).unwrap();
        let hero = Position::new(10.0, 0.0, 0.0);

        enemy.update(1.0, hero, &mut rng()).unwrap();
        assert!((enemy.position().x - 2.0).abs() < 1e-9);

        enemy.update(100.0, hero, &mut rng()).unwrap();
        assert_eq!(enemy.position(), hero);
    }

    #[test]
    fn test_defeated_enemy_never_moves() {
        let config = EnemyConfig {
            behavior: Behavior::Follow,
            ..EnemyConfig::default()
        };
        let mut enemy = Enemy::new(0, &config, Position::default()).unwrap();
        enemy.strike(100).unwrap();
        enemy
            .update(5.0, Position::new(10.0, 0.0, 0.0), &mut rng())
            .unwrap();
        assert_eq!(enemy.position(), Position::default());
        assert!(enemy.strike(10).is_err());
    }

    #[test]
    fn test_patrol_alternates_with_target() {
        let far = Position::new(4.0, 0.0, 0.0);
        let config = EnemyConfig {
            speed: 2.0,
            behavior: Behavior::Patrol {
                target: Some(far),
                radius: 5.0,
                wait: 1.0,
            },
            ..EnemyConfig::default()
        };
        let mut enemy = Enemy::new(0, &config, Position::default()).unwrap();
        let mut rng = rng();

        // Half speed: 1 unit/s, so the 3.8 units to the arrival radius take 3.8s.
        enemy.update(3.8, Position::default(), &mut rng).unwrap();
        assert!((enemy.position().x - 3.8).abs() < 1e-9);

        // Wait one second, then head home.
        enemy.update(1.0, Position::default(), &mut rng).unwrap();
        assert!((enemy.position().x - 3.8).abs() < 1e-9);
        enemy.update(1.0, Position::default(), &mut rng).unwrap();
        assert!((enemy.position().x - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_random_patrol_stays_near_spawn() {
        let config = EnemyConfig {
            behavior: Behavior::Patrol {
                target: None,
                radius: 3.0,
                wait: 0.5,
            },
            ..EnemyConfig::default()
        };
        let spawn = Position::new(10.0, 0.0, 10.0);
        let mut enemy = Enemy::new(0, &config, spawn).unwrap();
        let mut rng = rng();
        for _ in 0..500 {
            enemy.update(0.1, Position::default(), &mut rng).unwrap();
            let p = enemy.position();
            assert!((p.x - spawn.x).abs() <= 3.0 + 1e-9);
            assert!((p.z - spawn.z).abs() <= 3.0 + 1e-9);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EnemyConfig {
            max_stamina: 0,
            ..EnemyConfig::default()
        };
        assert!(EnemyRoster::new().spawn(&config, Position::default()).is_err());

        let config = EnemyConfig {
            speed: -1.0,
            ..EnemyConfig::default()
        };
        assert_eq!(config.validate(), Err(CoreError::InvalidAmount(-1.0)));
    }
}
