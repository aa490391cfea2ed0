//! Commodity definitions and the read-only commodity registry.
//!
//! Commodities are static scenario data: the registry is built once at
//! load time and shared, immutable, for the rest of the run. Lookups that
//! miss are corrupt-scenario errors, not runtime conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::CommodityId;

use crate::error::EconomyError;

/// Ids of the commodities the simulation rules refer to by name.
pub mod well_known {
    /// Consumed by every population each tick.
    pub const FOOD: &str = "food";
    /// Consumed by every population; surplus raises stability.
    pub const CONSUMER_GOODS: &str = "consumer_goods";
    /// Consumed by population and infrastructure upkeep.
    pub const ENERGY: &str = "energy";
    /// Spent on civilian investment.
    pub const MINERALS: &str = "minerals";
    /// Spent on military investment.
    pub const ALLOY: &str = "alloy";
}

/// Broad grouping used by reports and the visualizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommodityCategory {
    /// Agricultural output.
    Food,
    /// Extracted raw material.
    Raw,
    /// Refined industrial material.
    Industrial,
    /// Finished goods for households.
    Consumer,
    /// Power.
    Energy,
    /// Medium of exchange.
    Currency,
    /// Anything else.
    #[default]
    Other,
}

/// A tradeable good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    /// Unique id.
    pub id: CommodityId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Reference price; market prices are bounded by multiples of it.
    pub base_price: f64,
    /// Broad grouping.
    #[serde(default)]
    pub category: CommodityCategory,
    /// Whether the commodity is used as money.
    #[serde(default)]
    pub is_currency: bool,
    /// Fraction lost per tick when stored (informational).
    #[serde(default)]
    pub decay_rate: f64,
}

/// Read-only id-to-commodity lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Commodity>", into = "Vec<Commodity>")]
pub struct CommodityRegistry {
    commodities: BTreeMap<CommodityId, Commodity>,
}

impl CommodityRegistry {
    /// Build a registry from a list, rejecting duplicate ids.
    pub fn from_commodities(
        commodities: impl IntoIterator<Item = Commodity>,
    ) -> Result<Self, EconomyError> {
        let mut map = BTreeMap::new();
        for commodity in commodities {
            if map.contains_key(&commodity.id) {
                return Err(EconomyError::DuplicateCommodity(commodity.id));
            }
            map.insert(commodity.id.clone(), commodity);
        }
        Ok(Self { commodities: map })
    }

    /// Parse a YAML list of commodities.
    pub fn parse(yaml: &str) -> Result<Self, EconomyError> {
        let list: Vec<Commodity> = serde_yml::from_str(yaml)?;
        Self::from_commodities(list)
    }

    /// Look up a commodity by id.
    pub fn get(&self, id: &str) -> Result<&Commodity, EconomyError> {
        self.commodities
            .get(id)
            .ok_or_else(|| EconomyError::UnknownCommodity(CommodityId::from(id)))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.commodities.contains_key(id)
    }

    /// All commodities in id order.
    pub fn all(&self) -> impl Iterator<Item = &Commodity> {
        self.commodities.values()
    }

    /// Number of registered commodities.
    pub fn len(&self) -> usize {
        self.commodities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty()
    }
}

impl TryFrom<Vec<Commodity>> for CommodityRegistry {
    type Error = EconomyError;

    fn try_from(list: Vec<Commodity>) -> Result<Self, Self::Error> {
        Self::from_commodities(list)
    }
}

impl From<CommodityRegistry> for Vec<Commodity> {
    fn from(registry: CommodityRegistry) -> Self {
        registry.commodities.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "
- id: food
  name: Food
  base_price: 10.0
  category: food
- id: minerals
  name: Minerals
  base_price: 8.0
  category: raw
- id: credits
  base_price: 1.0
  category: currency
  is_currency: true
";

    #[test]
    fn parses_yaml_list() {
        let registry = CommodityRegistry::parse(YAML);
        assert!(registry.is_ok());
        let registry = registry.unwrap_or_default();
        assert_eq!(registry.len(), 3);
        let food = registry.get("food").ok();
        assert_eq!(food.map(|c| c.category), Some(CommodityCategory::Food));
        assert!(registry.get("credits").is_ok_and(|c| c.is_currency));
        assert!(registry.get("credits").is_ok_and(|c| c.name.is_empty()));
    }

    #[test]
    fn unknown_lookup_is_an_error() {
        let registry = CommodityRegistry::parse(YAML).unwrap_or_default();
        assert!(matches!(
            registry.get("unobtainium"),
            Err(EconomyError::UnknownCommodity(_))
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let yaml = "
- id: food
  base_price: 10.0
- id: food
  base_price: 12.0
";
        assert!(matches!(
            CommodityRegistry::parse(yaml),
            Err(EconomyError::DuplicateCommodity(_))
        ));
    }

    #[test]
    fn iterates_in_id_order() {
        let registry = CommodityRegistry::parse(YAML).unwrap_or_default();
        let ids: Vec<&str> = registry.all().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["credits", "food", "minerals"]);
    }
}
