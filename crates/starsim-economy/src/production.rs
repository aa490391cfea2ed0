//! Industry and recipe-driven production.
//!
//! Each installed recipe runs as many units as the tightest of three
//! limits allows: the world's installed capacity for it, the recipe's own
//! per-tick ceiling, and the stock of every input. Inputs are removed
//! before outputs are added, so production never consumes more than the
//! market holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use starsim_types::{AuditEntry, CommodityId, RecipeId, WorldId, kinds};
use tracing::debug;

use crate::error::EconomyError;
use crate::market::Market;
use crate::recipe::RecipeRegistry;

/// Installed production capacity on a world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    /// Maximum units per tick for each recipe.
    #[serde(default)]
    pub caps: BTreeMap<RecipeId, f64>,
}

impl Industry {
    /// Create an industry with no installed recipes.
    pub const fn new() -> Self {
        Self {
            caps: BTreeMap::new(),
        }
    }

    /// Installed capacity for `recipe`, or `0.0`.
    pub fn cap(&self, recipe: &str) -> f64 {
        self.caps.get(recipe).copied().unwrap_or(0.0)
    }

    /// Sum of all installed capacity.
    pub fn total_capacity(&self) -> f64 {
        self.caps.values().sum()
    }
}

/// Units run for one recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRun {
    /// The recipe that ran.
    pub recipe_id: RecipeId,
    /// Production units achieved.
    pub units: f64,
}

/// What one call to [`produce`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionReport {
    /// Recipes that produced at least something, in recipe id order.
    pub runs: Vec<RecipeRun>,
    /// Net inventory change per commodity.
    pub net: BTreeMap<CommodityId, f64>,
}

impl ProductionReport {
    /// Whether any recipe ran.
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total production units across recipes.
    pub fn total_units(&self) -> f64 {
        self.runs.iter().map(|r| r.units).sum()
    }

    /// Summarize as an audit entry.
    pub fn audit_entry(&self, tick: u64, world_id: &WorldId) -> AuditEntry {
        let runs: BTreeMap<&str, f64> = self
            .runs
            .iter()
            .map(|r| (r.recipe_id.as_str(), r.units))
            .collect();
        AuditEntry::new(kinds::PRODUCTION_OUTPUT, tick)
            .world(world_id)
            .delta(self.total_units())
            .reason("industry converted inputs to outputs")
            .detail("units", json!(runs))
            .detail("changes", json!(self.net))
    }

    fn record(&mut self, commodity: &CommodityId, change: f64) {
        *self.net.entry(commodity.clone()).or_insert(0.0) += change;
    }
}

/// Run every installed recipe once, in recipe id order.
///
/// An installed recipe missing from the registry is a corrupt-scenario
/// error.
pub fn produce(
    industry: &Industry,
    market: &mut Market,
    recipes: &RecipeRegistry,
) -> Result<ProductionReport, EconomyError> {
    let mut report = ProductionReport::default();

    for (recipe_id, cap) in &industry.caps {
        let recipe = recipes.get(recipe_id.as_str())?;

        let input_bound = recipe
            .inputs
            .iter()
            .filter(|(_, per_unit)| **per_unit > 0.0)
            .map(|(commodity, per_unit)| market.inventory.get(commodity.as_str()) / per_unit)
            .fold(f64::INFINITY, f64::min);
        let units = cap
            .min(recipe.max_production_units_per_tick)
            .min(input_bound);
        if units <= 0.0 {
            continue;
        }

        for (commodity, per_unit) in &recipe.inputs {
            let removed = market
                .inventory
                .remove_clamped(commodity.as_str(), per_unit * units)?;
            report.record(commodity, -removed);
        }
        for (commodity, per_unit) in &recipe.outputs {
            let added = per_unit * units;
            market.inventory.add(commodity.as_str(), added)?;
            report.record(commodity, added);
        }

        debug!(recipe = %recipe_id, units, "recipe ran");
        report.runs.push(RecipeRun {
            recipe_id: recipe_id.clone(),
            units,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipes() -> RecipeRegistry {
        RecipeRegistry::parse(
            "
- id: refine_alloy
  inputs: { minerals: 5.0, energy: 2.0 }
  outputs: { alloy: 1.0 }
  max_production_units_per_tick: 50.0
- id: farm_food
  outputs: { food: 2.0 }
  max_production_units_per_tick: 20.0
",
        )
        .unwrap_or_default()
    }

    #[test]
    fn refine_alloy_bounded_by_cap() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from("refine_alloy"), 10.0);
        let mut market = Market::new();
        assert!(market.inventory.set("minerals", 100.0).is_ok());
        assert!(market.inventory.set("energy", 100.0).is_ok());

        let report = produce(&industry, &mut market, &recipes()).unwrap_or_default();
        assert!((market.inventory.get("minerals") - 50.0).abs() < 1e-9);
        assert!((market.inventory.get("energy") - 80.0).abs() < 1e-9);
        assert!((market.inventory.get("alloy") - 10.0).abs() < 1e-9);
        assert!((report.total_units() - 10.0).abs() < 1e-9);
        assert!(
            report
                .net
                .get("minerals")
                .is_some_and(|d| (d + 50.0).abs() < 1e-9)
        );
    }

    #[test]
    fn inputs_bound_production() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from("refine_alloy"), 10.0);
        let mut market = Market::new();
        assert!(market.inventory.set("minerals", 12.0).is_ok());
        assert!(market.inventory.set("energy", 100.0).is_ok());

        assert!(produce(&industry, &mut market, &recipes()).is_ok());
        // 12 / 5 = 2.4 units
        assert!(market.inventory.get("minerals").abs() < 1e-9);
        assert!((market.inventory.get("alloy") - 2.4).abs() < 1e-9);
        assert!((market.inventory.get("energy") - 95.2).abs() < 1e-9);
    }

    #[test]
    fn recipe_ceiling_bounds_production() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from("farm_food"), 100.0);
        let mut market = Market::new();
        assert!(produce(&industry, &mut market, &recipes()).is_ok());
        assert!((market.inventory.get("food") - 40.0).abs() < 1e-9);
    }

    #[test]
    fn missing_inputs_means_idle() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from("refine_alloy"), 10.0);
        let mut market = Market::new();
        let report = produce(&industry, &mut market, &recipes()).unwrap_or_default();
        assert!(report.is_idle());
        assert!(market.inventory.is_empty());
    }

    #[test]
    fn unknown_recipe_is_fatal() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from("smelt_unobtainium"), 1.0);
        let mut market = Market::new();
        assert!(matches!(
            produce(&industry, &mut market, &recipes()),
            Err(EconomyError::UnknownRecipe(_))
        ));
    }
}
