use serde::Deserialize;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::grid::PenaltyMode;
use crate::map_file::LayerRules;
use crate::pathfinding::PathOptions;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub pathfinding: PathfindingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_tile_width")]
    pub tile_width: i32,
    #[serde(default = "default_tile_height")]
    pub tile_height: i32,
    /// Tiled JSON map; the built-in layout is used when unset
    #[serde(default)]
    pub map_path: Option<String>,
    #[serde(default = "default_solid_layers")]
    pub solid_layers: Vec<String>,
    #[serde(default = "default_one_way_layers")]
    pub one_way_layers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovementConfig {
    #[serde(default = "default_player_speed")]
    pub player_speed: f64,
    #[serde(default = "default_ai_speed")]
    pub ai_speed: f64,
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold: f64,
    #[serde(default = "default_recalculate_interval")]
    pub recalculate_interval: u32,
    #[serde(default = "default_use_pathfinding")]
    pub use_pathfinding: bool,
    #[serde(default)]
    pub avoid_other_actors: bool,
}

#[derive(Debug, Deserialize)]
pub struct PathfindingConfig {
    /// Extra cost for tiles next to a wall; flat costs when unset
    #[serde(default)]
    pub wall_proximity_penalty: Option<f64>,
    #[serde(default = "default_allow_corner_cutting")]
    pub allow_corner_cutting: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default values
fn default_tile_width() -> i32 { 16 }
fn default_tile_height() -> i32 { 16 }
fn default_solid_layers() -> Vec<String> { vec!["walls".to_string()] }
fn default_one_way_layers() -> Vec<String> { vec!["platforms".to_string()] }
fn default_player_speed() -> f64 { 2.0 }
fn default_ai_speed() -> f64 { 1.0 }
fn default_arrival_threshold() -> f64 { crate::seeking::DEFAULT_ARRIVAL_THRESHOLD }
fn default_recalculate_interval() -> u32 { crate::seeking::DEFAULT_RECALCULATE_INTERVAL }
fn default_use_pathfinding() -> bool { true }
fn default_allow_corner_cutting() -> bool { true }
fn default_log_filter() -> String { "info".to_string() }

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_width(),
            tile_height: default_tile_height(),
            map_path: None,
            solid_layers: default_solid_layers(),
            one_way_layers: default_one_way_layers(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_speed: default_player_speed(),
            ai_speed: default_ai_speed(),
            arrival_threshold: default_arrival_threshold(),
            recalculate_interval: default_recalculate_interval(),
            use_pathfinding: default_use_pathfinding(),
            avoid_other_actors: false,
        }
    }
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            wall_proximity_penalty: None,
            allow_corner_cutting: default_allow_corner_cutting(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            movement: MovementConfig::default(),
            pathfinding: PathfindingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug)]
pub enum ConfigOrigin {
    File,
    /// No config file exists
    Defaults,
    /// The file exists but could not be used
    Fallback(ConfigError),
}

impl ConfigOrigin {
    /// Report the outcome; call once a subscriber is installed
    pub fn log(&self) {
        match self {
            ConfigOrigin::File => info!("loaded configuration from {CONFIG_PATH}"),
            ConfigOrigin::Defaults => info!("no {CONFIG_PATH} found, using default configuration"),
            ConfigOrigin::Fallback(e) => warn!(error = %e, "using default configuration"),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist.
    ///
    /// Nothing is logged here since logging is configured from the result.
    pub fn load() -> (Self, ConfigOrigin) {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> (Self, ConfigOrigin) {
        if !path.as_ref().exists() {
            return (Config::default(), ConfigOrigin::Defaults);
        }

        match Self::from_path(path) {
            Ok(config) => (config, ConfigOrigin::File),
            Err(e) => (Config::default(), ConfigOrigin::Fallback(e)),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn path_options(&self) -> PathOptions {
        let penalty = match self.pathfinding.wall_proximity_penalty {
            Some(extra) if extra > 0.0 => PenaltyMode::WallProximity(extra),
            _ => PenaltyMode::Flat,
        };
        PathOptions {
            penalty,
            allow_corner_cutting: self.pathfinding.allow_corner_cutting,
        }
    }

    pub fn layer_rules(&self) -> LayerRules {
        LayerRules {
            solid_layers: self.world.solid_layers.clone(),
            one_way_layers: self.world.one_way_layers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml("[movement]\nai_speed = 1.5\n").unwrap();

        assert_eq!(config.movement.ai_speed, 1.5);
        assert_eq!(config.movement.player_speed, 2.0);
        assert_eq!(config.movement.recalculate_interval, 30);
        assert_eq!(config.world.tile_width, 16);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_path_options_follow_penalty_setting() {
        let config = Config::from_toml(
            "[pathfinding]\nwall_proximity_penalty = 5.0\nallow_corner_cutting = false\n",
        )
        .unwrap();
        let options = config.path_options();

        assert_eq!(options.penalty, PenaltyMode::WallProximity(5.0));
        assert!(!options.allow_corner_cutting);
        assert_eq!(Config::default().path_options().penalty, PenaltyMode::Flat);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[world]\ntile_width = \"wide\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }
}
