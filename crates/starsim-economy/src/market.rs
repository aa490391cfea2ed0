//! Per-world markets and price discovery.
//!
//! Prices follow a bounded negative-feedback rule: each tick a price moves
//! by `(1 - stock / target) * price_change_factor` of itself, then is
//! clamped to `[base * min_multiplier, base * max_multiplier]`. Scarcity
//! pushes prices up, gluts push them down, and neither can run away.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::{AuditEntry, CommodityId, WorldId, kinds};

use crate::commodity::CommodityRegistry;
use crate::error::EconomyError;
use crate::inventory::Inventory;

/// Target stock assumed for a commodity the market has never seen.
pub const DEFAULT_TARGET: f64 = 10.0;

/// Stock-to-target ratio used when the target is zero, so any stock reads
/// as a glut.
const ZERO_TARGET_RATIO: f64 = 10.0;

const fn default_price_change_factor() -> f64 {
    0.1
}

const fn default_min_price_multiplier() -> f64 {
    0.5
}

const fn default_max_price_multiplier() -> f64 {
    2.0
}

/// A world's commodity stock together with its local prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Goods held locally.
    #[serde(default)]
    pub inventory: Inventory,
    /// Current local price per commodity.
    #[serde(default)]
    pub prices: BTreeMap<CommodityId, f64>,
    /// Desired stock per commodity.
    #[serde(default)]
    pub targets: BTreeMap<CommodityId, f64>,
    /// How strongly prices react to the stock gap.
    #[serde(default = "default_price_change_factor")]
    pub price_change_factor: f64,
    /// Lower price bound as a multiple of base price.
    #[serde(default = "default_min_price_multiplier")]
    pub min_price_multiplier: f64,
    /// Upper price bound as a multiple of base price.
    #[serde(default = "default_max_price_multiplier")]
    pub max_price_multiplier: f64,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            inventory: Inventory::new(),
            prices: BTreeMap::new(),
            targets: BTreeMap::new(),
            price_change_factor: default_price_change_factor(),
            min_price_multiplier: default_min_price_multiplier(),
            max_price_multiplier: default_max_price_multiplier(),
        }
    }
}

/// One price movement produced by [`Market::update_prices`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    /// The commodity whose price moved.
    pub commodity_id: CommodityId,
    /// Price before the update.
    pub old_price: f64,
    /// Price after the update and clamp.
    pub new_price: f64,
    /// Stock-to-target ratio that drove the move.
    pub ratio: f64,
}

impl PriceChange {
    /// Signed price movement.
    pub fn delta(&self) -> f64 {
        self.new_price - self.old_price
    }

    /// Summarize as an audit entry.
    pub fn audit_entry(&self, tick: u64, world_id: &WorldId) -> AuditEntry {
        AuditEntry::new(kinds::PRICES_UPDATE, tick)
            .world(world_id)
            .delta(self.delta())
            .reason(format!("{} price adjusted", self.commodity_id))
            .detail("commodity_id", self.commodity_id.as_str())
            .detail("old_price", self.old_price)
            .detail("new_price", self.new_price)
            .detail("ratio", self.ratio)
    }
}

impl Market {
    /// Create an empty market with default reaction parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local price of `commodity`, if one has been discovered.
    pub fn price(&self, commodity: &str) -> Option<f64> {
        self.prices.get(commodity).copied()
    }

    /// Desired stock of `commodity`, if set.
    pub fn target(&self, commodity: &str) -> Option<f64> {
        self.targets.get(commodity).copied()
    }

    /// Run one round of price discovery.
    ///
    /// Every registered commodity is given the default target and its base
    /// price if the market does not know it yet. Every targeted commodity
    /// then has its price moved toward equilibrium. A target for a
    /// commodity missing from the registry is a corrupt-scenario error.
    pub fn update_prices(
        &mut self,
        registry: &CommodityRegistry,
    ) -> Result<Vec<PriceChange>, EconomyError> {
        for commodity in registry.all() {
            self.targets
                .entry(commodity.id.clone())
                .or_insert(DEFAULT_TARGET);
            self.prices
                .entry(commodity.id.clone())
                .or_insert(commodity.base_price);
        }

        let mut changes = Vec::with_capacity(self.targets.len());
        for (commodity_id, target) in &self.targets {
            let base_price = registry.get(commodity_id.as_str())?.base_price;
            let old_price = self.prices.get(commodity_id).copied().unwrap_or(base_price);
            let stock = self.inventory.get(commodity_id.as_str());

            let ratio = if *target > 0.0 {
                stock / target
            } else {
                ZERO_TARGET_RATIO
            };
            let adjustment = (1.0 - ratio) * self.price_change_factor;
            let min_bound = base_price * self.min_price_multiplier;
            let max_bound = base_price * self.max_price_multiplier;
            let new_price = (old_price * (1.0 + adjustment)).max(min_bound).min(max_bound);

            changes.push(PriceChange {
                commodity_id: commodity_id.clone(),
                old_price,
                new_price,
                ratio,
            });
        }

        for change in &changes {
            self.prices.insert(change.commodity_id.clone(), change.new_price);
        }
        Ok(changes)
    }
}
