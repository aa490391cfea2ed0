//! The mutable universe, the scenario it starts from, and the read-only
//! registries it runs against.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use starsim_economy::{CommodityRegistry, RecipeRegistry};
use starsim_events::EventRegistry;
use starsim_types::FactionId;
use starsim_world::{Faction, Galaxy, Lane, Logistics, World};

use crate::config::{ConfigError, DataConfig, SimulationConfig};

/// Shared handles to the three static registries.
///
/// Cloning is cheap; every clone points at the same data.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    /// Commodity definitions.
    pub commodities: Arc<CommodityRegistry>,
    /// Recipe definitions.
    pub recipes: Arc<RecipeRegistry>,
    /// Event definitions.
    pub events: Arc<EventRegistry>,
}

impl Registries {
    /// Wrap already-built registries.
    pub fn new(
        commodities: CommodityRegistry,
        recipes: RecipeRegistry,
        events: EventRegistry,
    ) -> Self {
        Self {
            commodities: Arc::new(commodities),
            recipes: Arc::new(recipes),
            events: Arc::new(events),
        }
    }

    /// Read and parse the registry files named by `data`.
    pub fn load(data: &DataConfig) -> Result<Self, ConfigError> {
        let commodities = CommodityRegistry::parse(&read(&data.commodities)?)?;
        let recipes = RecipeRegistry::parse(&read(&data.recipes)?)?;
        let events = EventRegistry::parse(&read(&data.events)?)?;
        Ok(Self::new(commodities, recipes, events))
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Initial worlds, lanes, and factions, as authored in YAML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Every world.
    #[serde(default)]
    pub worlds: Vec<World>,
    /// Every lane.
    #[serde(default)]
    pub lanes: Vec<Lane>,
    /// Every faction.
    #[serde(default)]
    pub factions: Vec<Faction>,
}

impl Scenario {
    /// Parse a scenario document.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Read and parse a scenario file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::parse(&read(path)?)
    }

    /// Validate the graph and build a state at tick zero.
    pub fn into_state(
        self,
        registries: Registries,
        config: SimulationConfig,
    ) -> Result<UniverseState, ConfigError> {
        let galaxy = Galaxy::from_parts(self.worlds, self.lanes)?;
        Ok(UniverseState::new(galaxy, self.factions, registries, config))
    }
}

/// Everything one simulation run owns.
///
/// Built once from a scenario (or a snapshot) and then advanced in place
/// by [`step`](crate::tick::step). Registries are shared and never
/// mutated during a run.
#[derive(Debug, Clone)]
pub struct UniverseState {
    /// Seed every tick's random stream is derived from.
    pub seed: u64,
    /// Number of completed ticks.
    pub tick: u64,
    /// Worlds, lanes, and adjacency.
    pub galaxy: Galaxy,
    /// Every faction, acting in id order.
    pub factions: BTreeMap<FactionId, Faction>,
    /// Shipments in flight and lane usage.
    pub logistics: Logistics,
    /// Commodity definitions.
    pub commodities: Arc<CommodityRegistry>,
    /// Recipe definitions.
    pub recipes: Arc<RecipeRegistry>,
    /// Event definitions.
    pub events: Arc<EventRegistry>,
    /// Stage tunables.
    pub config: SimulationConfig,
}

impl UniverseState {
    /// A state at tick zero, seeded from `config.world.seed`.
    pub fn new(
        galaxy: Galaxy,
        factions: impl IntoIterator<Item = Faction>,
        registries: Registries,
        config: SimulationConfig,
    ) -> Self {
        Self {
            seed: config.world.seed,
            tick: 0,
            galaxy,
            factions: factions
                .into_iter()
                .map(|faction| (faction.id.clone(), faction))
                .collect(),
            logistics: Logistics::default(),
            commodities: registries.commodities,
            recipes: registries.recipes,
            events: registries.events,
            config,
        }
    }

    /// The registries this state runs against.
    pub fn registries(&self) -> Registries {
        Registries {
            commodities: Arc::clone(&self.commodities),
            recipes: Arc::clone(&self.recipes),
            events: Arc::clone(&self.events),
        }
    }

    /// Look up a faction.
    pub fn faction(&self, id: &str) -> Option<&Faction> {
        self.factions.get(id)
    }
}
