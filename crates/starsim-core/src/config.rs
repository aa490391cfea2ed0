//! Configuration loading and typed config structures for the Starsim
//! simulation.
//!
//! The canonical configuration lives in `starsim-config.yaml` at the project
//! root. Every section and field has a default, so an empty document (or a
//! missing section) yields the reference tuning. Stage tunables are owned by
//! the crates that run those stages and are embedded here unchanged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use starsim_events::EventConfig;
use starsim_factions::FactionConfig;
use starsim_world::TradeConfig;

/// Errors that can occur when loading configuration or scenario data.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A commodity or recipe file was rejected.
    #[error("invalid economy data: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: starsim_economy::EconomyError,
    },

    /// An event file was rejected.
    #[error("invalid event data: {source}")]
    Events {
        /// The underlying event error.
        #[from]
        source: starsim_events::EventError,
    },

    /// A scenario's worlds and lanes do not form a valid galaxy.
    #[error("invalid scenario galaxy: {source}")]
    Galaxy {
        /// The underlying world error.
        #[from]
        source: starsim_world::WorldError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `starsim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run identity and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Locations of the registry files.
    #[serde(default)]
    pub data: DataConfig,

    /// Economy stage toggles.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Trade stage tunables.
    #[serde(default)]
    pub trade: TradeConfig,

    /// Faction action step sizes.
    #[serde(default)]
    pub factions: FactionConfig,

    /// Event roll tunables.
    #[serde(default)]
    pub events: EventConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty string is a valid document and yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Run identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable name for the run.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed from which every tick's random stream is derived.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_world_name() -> String {
    String::from("Starsim")
}

const fn default_seed() -> u64 {
    42
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Paths of the three registry files, relative to the working directory
/// unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Commodity definitions.
    #[serde(default = "default_commodities_path")]
    pub commodities: PathBuf,

    /// Recipe definitions.
    #[serde(default = "default_recipes_path")]
    pub recipes: PathBuf,

    /// Event definitions.
    #[serde(default = "default_events_path")]
    pub events: PathBuf,
}

fn default_commodities_path() -> PathBuf {
    PathBuf::from("data/commodities.yaml")
}

fn default_recipes_path() -> PathBuf {
    PathBuf::from("data/recipes.yaml")
}

fn default_events_path() -> PathBuf {
    PathBuf::from("data/events.yaml")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            commodities: default_commodities_path(),
            recipes: default_recipes_path(),
            events: default_events_path(),
        }
    }
}

impl DataConfig {
    /// The same paths resolved against `root` (absolute paths are kept).
    pub fn relative_to(&self, root: &Path) -> Self {
        Self {
            commodities: root.join(&self.commodities),
            recipes: root.join(&self.recipes),
            events: root.join(&self.events),
        }
    }
}

/// Economy stage toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Run energy upkeep directly after consumption.
    #[serde(default)]
    pub energy_upkeep_enabled: bool,
}
