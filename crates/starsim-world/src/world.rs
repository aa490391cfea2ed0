//! Worlds: the nodes of the galaxy graph.
//!
//! A [`World`] always carries its pressures, tags, and coordinates. Its
//! economic and political machinery is optional: a world without a
//! market, population, industry, or faction state simply sits out the
//! stages that need them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use starsim_economy::{Industry, Market, Population, Pressures};
use starsim_types::{CommodityId, FactionId, WorldId};

use crate::error::WorldError;
use crate::faction::WorldFactionState;

/// Tag marking a faction seat of government.
pub const TAG_CAPITAL: &str = "capital";

/// Tag marking a world of religious or cultural significance.
pub const TAG_SACRED: &str = "sacred";

/// A planet within a world's star system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Planet class (`"continental"`, `"desert"`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Suitability for population in `[0, 1]`.
    #[serde(default)]
    pub habitability: f64,
    /// Relative abundance of each commodity.
    #[serde(default)]
    pub resource_potentials: BTreeMap<CommodityId, f64>,
    /// Free-form descriptors.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// A node in the galaxy graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Unique id.
    pub id: WorldId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Pressure scalars and consumption indicators.
    #[serde(flatten)]
    pub pressures: Pressures,
    /// Free-form descriptors (`"capital"`, `"sacred"`, ...).
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Map x coordinate.
    #[serde(default)]
    pub x: f64,
    /// Map y coordinate.
    #[serde(default)]
    pub y: f64,
    /// Planets in the system.
    #[serde(default)]
    pub planets: Vec<Planet>,
    /// Local market, if the world trades.
    #[serde(default)]
    pub market: Option<Market>,
    /// Resident population, if inhabited.
    #[serde(default)]
    pub population: Option<Population>,
    /// Installed industry, if any.
    #[serde(default)]
    pub industry: Option<Industry>,
    /// Faction presence, if contested or held.
    #[serde(default, alias = "factions")]
    pub faction_state: Option<WorldFactionState>,
}

impl World {
    /// Create a bare world with default pressures and no components.
    pub fn new(id: impl Into<WorldId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pressures: Pressures::default(),
            tags: BTreeSet::new(),
            x: 0.0,
            y: 0.0,
            planets: Vec::new(),
            market: None,
            population: None,
            industry: None,
            faction_state: None,
        }
    }

    /// The faction currently in control, if any.
    pub fn controller(&self) -> Option<&FactionId> {
        self.faction_state.as_ref().and_then(|s| s.control.as_ref())
    }

    /// Whether `faction` controls this world.
    pub fn is_controlled_by(&self, faction: &FactionId) -> bool {
        self.controller() == Some(faction)
    }

    /// Whether the world carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Euclidean map distance to `other`.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Check loaded values: pressures in `[0, 1]`, population and faction
    /// presence finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), WorldError> {
        let bad = self
            .pressures
            .out_of_bounds()
            .or_else(|| self.population.as_ref().and_then(Population::invalid_field))
            .or_else(|| {
                self.faction_state
                    .as_ref()
                    .and_then(WorldFactionState::invalid_field)
            });
        match bad {
            Some((field, value)) => Err(WorldError::InvalidValue {
                entity: self.id.to_string(),
                field,
                value,
            }),
            None => Ok(()),
        }
    }

    /// Stock of `commodity` in the local market, or `0.0`.
    pub fn stock(&self, commodity: &str) -> f64 {
        self.market
            .as_ref()
            .map_or(0.0, |m| m.inventory.get(commodity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_world_has_no_components() {
        let world = World::new("sol", "Sol");
        assert!(world.market.is_none());
        assert!(world.population.is_none());
        assert!(world.controller().is_none());
        assert!(world.stock("food").abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_euclidean() {
        let mut a = World::new("a", "A");
        let mut b = World::new("b", "B");
        a.x = 0.0;
        a.y = 0.0;
        b.x = 3.0;
        b.y = 4.0;
        assert!((a.distance_to(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pressures_flatten_into_world_json() {
        let json = r#"{
            "id": "sol",
            "name": "Sol",
            "stability": 0.4,
            "unrest": 0.3,
            "tags": ["capital"],
            "market": { "inventory": { "food": 5.0 } }
        }"#;
        let world: Option<World> = serde_json::from_str(json).ok();
        assert!(world.is_some());
        let world = world.unwrap_or_else(|| World::new("x", "x"));
        assert!((world.pressures.stability - 0.4).abs() < f64::EPSILON);
        assert!((world.pressures.prosperity - 1.0).abs() < f64::EPSILON);
        assert!(world.has_tag(TAG_CAPITAL));
        assert!((world.stock("food") - 5.0).abs() < f64::EPSILON);

        let back = serde_json::to_value(&world).unwrap_or_default();
        assert!(back.get("stability").is_some());
        assert!(back.get("pressures").is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_state() {
        let mut world = World::new("sol", "Sol");
        world.population = Some(Population::with_size(100.0));
        world.faction_state = Some(WorldFactionState::default());
        assert!(world.validate().is_ok());

        world.pressures.stability = 1.7;
        assert!(matches!(
            world.validate(),
            Err(WorldError::InvalidValue { field: "stability", .. })
        ));

        world.pressures.stability = 0.5;
        if let Some(population) = world.population.as_mut() {
            population.size = -1.0;
        }
        assert!(matches!(
            world.validate(),
            Err(WorldError::InvalidValue { field: "size", .. })
        ));

        world.population = None;
        if let Some(state) = world.faction_state.as_mut() {
            state.influence.insert(FactionId::from("red"), -0.2);
        }
        assert!(matches!(
            world.validate(),
            Err(WorldError::InvalidValue { field: "influence", .. })
        ));
    }
}
