//! Production recipes and the read-only recipe registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::{CommodityId, RecipeId};

use crate::error::EconomyError;

/// Ids of the recipes investment can expand.
pub mod well_known {
    /// Food from nothing.
    pub const FARM_FOOD: &str = "farm_food";
    /// Minerals from nothing.
    pub const MINE_MINERALS: &str = "mine_minerals";
    /// Consumer goods from raw inputs.
    pub const REFINE_CONSUMER_GOODS: &str = "refine_consumer_goods";
    /// Alloy from minerals and energy.
    pub const REFINE_ALLOY: &str = "refine_alloy";
    /// Alternate alloy line.
    pub const ASSEMBLE_ALLOYS: &str = "assemble_alloys";
}

/// A fixed conversion of input commodities into output commodities.
///
/// Quantities are per production unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique id.
    pub id: RecipeId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Consumed per unit.
    #[serde(default)]
    pub inputs: BTreeMap<CommodityId, f64>,
    /// Produced per unit.
    #[serde(default)]
    pub outputs: BTreeMap<CommodityId, f64>,
    /// Hard ceiling on units per tick regardless of installed capacity.
    #[serde(default)]
    pub max_production_units_per_tick: f64,
}

/// Read-only id-to-recipe lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Recipe>", into = "Vec<Recipe>")]
pub struct RecipeRegistry {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl RecipeRegistry {
    /// Build a registry from a list, rejecting duplicate ids and negative
    /// per-unit quantities.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Result<Self, EconomyError> {
        let mut map = BTreeMap::new();
        for recipe in recipes {
            for (commodity, qty) in recipe.inputs.iter().chain(recipe.outputs.iter()) {
                if !qty.is_finite() || *qty < 0.0 {
                    return Err(EconomyError::NegativeQuantity {
                        commodity: commodity.to_string(),
                        quantity: *qty,
                    });
                }
            }
            if map.contains_key(&recipe.id) {
                return Err(EconomyError::DuplicateRecipe(recipe.id));
            }
            map.insert(recipe.id.clone(), recipe);
        }
        Ok(Self { recipes: map })
    }

    /// Parse a YAML list of recipes.
    pub fn parse(yaml: &str) -> Result<Self, EconomyError> {
        let list: Vec<Recipe> = serde_yml::from_str(yaml)?;
        Self::from_recipes(list)
    }

    /// Look up a recipe by id.
    pub fn get(&self, id: &str) -> Result<&Recipe, EconomyError> {
        self.recipes
            .get(id)
            .ok_or_else(|| EconomyError::UnknownRecipe(RecipeId::from(id)))
    }

    /// All recipes in id order.
    pub fn all(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Number of registered recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl TryFrom<Vec<Recipe>> for RecipeRegistry {
    type Error = EconomyError;

    fn try_from(list: Vec<Recipe>) -> Result<Self, Self::Error> {
        Self::from_recipes(list)
    }
}

impl From<RecipeRegistry> for Vec<Recipe> {
    fn from(registry: RecipeRegistry) -> Self {
        registry.recipes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inputs_and_outputs() {
        let yaml = "
- id: refine_alloy
  name: Refine Alloy
  inputs: { minerals: 5.0, energy: 2.0 }
  outputs: { alloy: 1.0 }
  max_production_units_per_tick: 50.0
- id: farm_food
  outputs: { food: 2.0 }
  max_production_units_per_tick: 100.0
";
        let registry = RecipeRegistry::parse(yaml).unwrap_or_default();
        assert_eq!(registry.len(), 2);
        let alloy = registry.get("refine_alloy").ok();
        assert!(
            alloy
                .and_then(|r| r.inputs.get("minerals"))
                .is_some_and(|q| (q - 5.0).abs() < f64::EPSILON)
        );
        assert!(registry.get("farm_food").is_ok_and(|r| r.inputs.is_empty()));
    }

    #[test]
    fn unknown_recipe_is_an_error() {
        let registry = RecipeRegistry::default();
        assert!(matches!(
            registry.get("smelt"),
            Err(EconomyError::UnknownRecipe(_))
        ));
    }

    #[test]
    fn negative_recipe_quantity_rejected() {
        let yaml = "
- id: broken
  inputs: { minerals: -1.0 }
";
        assert!(matches!(
            RecipeRegistry::parse(yaml),
            Err(EconomyError::NegativeQuantity { .. })
        ));
    }
}
