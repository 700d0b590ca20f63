//! Session configuration.
//!
//! Every field has a default matching the shipped game, so a JSON file only
//! needs the values it changes:
//!
//! ```json
//! { "roll_cost": 15, "path": { "kind": "ring", "nodes": 12 } }
//! ```

use std::fmt;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CoreError, CoreResult};
use crate::game::{EnemyConfig, Path, PathNode, StatsRecord, MIN_CAPACITY};

/// How the board is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathLayout {
    /// Nodes evenly spaced on a circle.
    Ring {
        /// Number of nodes.
        #[serde(default = "default_ring_nodes")]
        nodes: usize,
        /// Circle radius.
        #[serde(default = "default_ring_radius")]
        radius: f64,
        /// Every n-th node grants gold; zero disables gold nodes.
        #[serde(default = "default_gold_every")]
        gold_every: usize,
        /// Gold granted per gold node.
        #[serde(default = "default_gold_amount")]
        gold_amount: u32,
    },
    /// Explicit node list, walked in order.
    Custom {
        /// The nodes.
        nodes: Vec<PathNode>,
    },
}

fn default_ring_nodes() -> usize {
    20
}

fn default_ring_radius() -> f64 {
    10.0
}

fn default_gold_every() -> usize {
    3
}

fn default_gold_amount() -> u32 {
    10
}

impl Default for PathLayout {
    fn default() -> Self {
        PathLayout::Ring {
            nodes: default_ring_nodes(),
            radius: default_ring_radius(),
            gold_every: default_gold_every(),
            gold_amount: default_gold_amount(),
        }
    }
}

impl PathLayout {
    /// Build the path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] for an empty layout and
    /// [`CoreError::InvalidAmount`] for a bad radius.
    pub fn build(&self) -> CoreResult<Path> {
        match self {
            PathLayout::Ring {
                nodes,
                radius,
                gold_every,
                gold_amount,
            } => Path::ring(*nodes, ensure_non_negative(*radius)?, *gold_every, *gold_amount),
            PathLayout::Custom { nodes } => Path::new(nodes.clone()),
        }
    }
}

/// Tunables for one play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Dice thrown per roll.
    pub dice_count: usize,
    /// Stamina paid per roll.
    pub roll_cost: u32,
    /// Stamina capacity at start.
    pub stamina_max: u32,
    /// Stamina restored per regen interval.
    pub stamina_regen_rate: f64,
    /// Seconds between stamina regen applications.
    pub stamina_regen_interval: f64,
    /// Gold at start.
    pub starting_gold: u32,
    /// Price of the first upgrade.
    pub upgrade_cost: u32,
    /// Price rise per upgrade.
    pub upgrade_cost_increment: u32,
    /// Hero stats at start.
    pub stats: StatsRecord,
    /// Steps longer than this are run instead of walked.
    pub run_distance_threshold: f64,
    /// Seconds between a double and the bonus roll.
    pub bonus_roll_delay: f64,
    /// Enemy stamina drained per strike.
    pub click_damage: u32,
    /// Template for spawned enemies.
    pub enemy: EnemyConfig,
    /// Board layout.
    pub path: PathLayout,
    /// Node the hero starts on.
    pub start_node: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dice_count: 2,
            roll_cost: 10,
            stamina_max: 100,
            stamina_regen_rate: 5.0,
            stamina_regen_interval: 1.0,
            starting_gold: 100,
            upgrade_cost: 20,
            upgrade_cost_increment: 10,
            stats: StatsRecord::default(),
            run_distance_threshold: 3.0,
            bonus_roll_delay: 0.5,
            click_damage: 10,
            enemy: EnemyConfig::default(),
            path: PathLayout::default(),
            start_node: 0,
        }
    }
}

impl SessionConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] or
    /// [`CoreError::InvalidAmount`] naming the first bad field.
    pub fn validate(&self) -> CoreResult<()> {
        if self.dice_count == 0 {
            return Err(invalid("dice_count must be at least 1"));
        }
        if self.upgrade_cost_increment == 0 {
            return Err(invalid("upgrade_cost_increment must be at least 1"));
        }
        if self.stamina_max < MIN_CAPACITY {
            return Err(invalid(&format!("stamina_max must be at least {MIN_CAPACITY}")));
        }
        if self.stamina_max < self.roll_cost {
            return Err(invalid("stamina_max must cover at least one roll"));
        }
        ensure_non_negative(self.stamina_regen_rate)?;
        if !(self.stamina_regen_interval.is_finite() && self.stamina_regen_interval > 0.0) {
            return Err(invalid("stamina_regen_interval must be positive"));
        }
        ensure_non_negative(self.run_distance_threshold)?;
        ensure_non_negative(self.bonus_roll_delay)?;
        ensure_non_negative(self.stats.movement_speed)?;
        if [
            self.stats.strength,
            self.stats.intelligence,
            self.stats.willpower,
            self.stats.dexterity,
        ]
        .iter()
        .any(|&value| value < 0)
        {
            return Err(invalid("attributes must not be negative"));
        }
        self.enemy.validate()?;

        let path = self.path.build()?;
        if self.start_node >= path.len() {
            return Err(invalid(&format!(
                "start_node {} outside path of {} nodes",
                self.start_node,
                path.len()
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for values that fail [`Self::validate`].
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&text)
    }
}

fn invalid(message: &str) -> CoreError {
    CoreError::InvalidConfiguration(message.to_string())
}

/// Failure to obtain a usable configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for this schema.
    Parse(serde_json::Error),
    /// The values describe an impossible game.
    Invalid(CoreError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {e}"),
            ConfigError::Parse(e) => write!(f, "cannot parse config: {e}"),
            ConfigError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Behavior;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{ "roll_cost": 15 }"#).unwrap();
        assert_eq!(config.roll_cost, 15);
        assert_eq!(config.starting_gold, 100);
        assert_eq!(config.path, PathLayout::default());
    }

    #[test]
    fn test_custom_path_and_enemy() {
        let json = r#"{
            "path": { "kind": "custom", "nodes": [
                { "position": { "x": 0.0, "y": 0.0, "z": 0.0 } },
                { "position": { "x": 1.0, "y": 0.0, "z": 0.0 }, "gold": 25 }
            ] },
            "enemy": { "speed": 4.0, "behavior": { "mode": "follow" } }
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        let path = config.path.build().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.get(1).unwrap().gold, Some(25));
        assert_eq!(config.enemy.behavior, Behavior::Follow);
        assert_eq!(config.enemy.max_stamina, 100);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SessionConfig {
            upgrade_cost_increment: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));

        let config = SessionConfig {
            stamina_max: 5,
            roll_cost: 5,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfiguration(_))
        ));

        let config = SessionConfig {
            bonus_roll_delay: -1.0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(CoreError::InvalidAmount(-1.0)));

        let config = SessionConfig {
            start_node: 20,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            path: PathLayout::Custom { nodes: Vec::new() },
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_and_unknown_field_errors() {
        assert!(matches!(
            SessionConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "roll_costs": 1 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "dice_count": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("cannot read config"));
    }
}
