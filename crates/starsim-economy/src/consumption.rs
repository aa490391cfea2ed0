//! Population and its per-tick consumption.
//!
//! A population draws three kinds of goods from its world's market each
//! tick: food, consumer goods, and any extra per-capita needs. Every draw
//! goes through [`Inventory::remove_clamped`](crate::Inventory::remove_clamped),
//! so a shortage is never an error; it becomes a shortage ratio in `[0, 1]`
//! that feeds back into population size and world pressures.
//!
//! All needs are computed from the population size at the start of the
//! tick, so the order in which they are drawn does not matter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use starsim_types::{AuditEntry, CommodityId, WorldId, kinds};
use tracing::debug;

use crate::commodity::well_known::{CONSUMER_GOODS, FOOD};
use crate::error::EconomyError;
use crate::market::Market;
use crate::pressure::{Pressure, Pressures};

/// Shortage ratio below which generic needs leave pressures alone.
const GENERIC_NEED_DEAD_BAND: f64 = 0.1;

/// Guard added before flooring so `1000 * 0.95` lands on 950, not 949.
const FLOOR_GUARD: f64 = 1e-9;

const fn default_size() -> f64 {
    1_000_000.0
}

const fn default_growth_rate() -> f64 {
    0.01
}

const fn default_food_rate() -> f64 {
    0.0001
}

const fn default_consumer_goods_rate() -> f64 {
    0.000_05
}

const fn default_energy_rate() -> f64 {
    0.000_01
}

const fn default_burn_rate() -> f64 {
    0.1
}

/// The people living on a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Headcount; always a non-negative whole number.
    #[serde(default = "default_size")]
    pub size: f64,
    /// Growth per tick when fed, scaled by stability and prosperity.
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    /// Extra per-capita needs beyond food and consumer goods.
    #[serde(default)]
    pub needs: BTreeMap<CommodityId, f64>,
    /// Food drawn per person per tick.
    #[serde(default = "default_food_rate", alias = "food_required_per_capita_per_tick")]
    pub food_required_per_capita: f64,
    /// Consumer goods drawn per person per tick.
    #[serde(
        default = "default_consumer_goods_rate",
        alias = "consumer_goods_required_per_capita_per_tick"
    )]
    pub consumer_goods_required_per_capita: f64,
    /// Energy drawn per person per tick by upkeep.
    #[serde(default = "default_energy_rate", alias = "energy_upkeep_per_capita_per_tick")]
    pub energy_upkeep_per_capita: f64,
    /// Fraction of leftover consumer goods discarded each tick.
    #[serde(default = "default_burn_rate")]
    pub consumer_goods_excess_burn_rate: f64,
}

impl Default for Population {
    fn default() -> Self {
        Self::with_size(default_size())
    }
}

impl Population {
    /// Create a population of `size` with default rates.
    pub fn with_size(size: f64) -> Self {
        Self {
            size: size.max(0.0).floor(),
            growth_rate: default_growth_rate(),
            needs: BTreeMap::new(),
            food_required_per_capita: default_food_rate(),
            consumer_goods_required_per_capita: default_consumer_goods_rate(),
            energy_upkeep_per_capita: default_energy_rate(),
            consumer_goods_excess_burn_rate: default_burn_rate(),
        }
    }

    /// The first field that is negative or not finite, with its value.
    pub fn invalid_field(&self) -> Option<(&'static str, f64)> {
        [
            ("size", self.size),
            ("food_required_per_capita", self.food_required_per_capita),
            (
                "consumer_goods_required_per_capita",
                self.consumer_goods_required_per_capita,
            ),
            ("energy_upkeep_per_capita", self.energy_upkeep_per_capita),
            (
                "consumer_goods_excess_burn_rate",
                self.consumer_goods_excess_burn_rate,
            ),
        ]
        .into_iter()
        .chain(self.needs.values().map(|rate| ("needs", *rate)))
        .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
    }
}

/// How one need was met this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NeedOutcome {
    /// Quantity the population wanted.
    pub needed: f64,
    /// Quantity actually drawn from the market.
    pub consumed: f64,
    /// `(needed - consumed) / needed`, or `0` when nothing was needed.
    pub shortage_ratio: f64,
}

impl NeedOutcome {
    fn draw(market: &mut Market, commodity: &str, needed: f64) -> Result<Self, EconomyError> {
        let needed = needed.max(0.0);
        let consumed = market.inventory.remove_clamped(commodity, needed)?;
        let shortage_ratio = if needed > 0.0 {
            ((needed - consumed) / needed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(Self {
            needed,
            consumed,
            shortage_ratio,
        })
    }

    /// Consumed minus needed.
    pub fn balance(&self) -> f64 {
        self.consumed - self.needed
    }
}

/// What one call to [`consume`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumptionReport {
    /// Headcount before the tick.
    pub size_before: f64,
    /// Headcount after the tick.
    pub size_after: f64,
    /// Food draw.
    pub food: NeedOutcome,
    /// Consumer goods draw.
    pub consumer_goods: NeedOutcome,
    /// Surplus consumer goods discarded.
    pub consumer_goods_burned: f64,
    /// Draws for the remaining per-capita needs.
    pub other: BTreeMap<CommodityId, NeedOutcome>,
}

impl ConsumptionReport {
    /// Change in headcount.
    pub fn population_delta(&self) -> f64 {
        self.size_after - self.size_before
    }

    /// Summarize as an audit entry.
    pub fn audit_entry(&self, tick: u64, world_id: &WorldId) -> AuditEntry {
        let other: BTreeMap<&str, f64> = self
            .other
            .iter()
            .map(|(id, o)| (id.as_str(), o.shortage_ratio))
            .collect();
        AuditEntry::new(kinds::CONSUMPTION_IMPACT, tick)
            .world(world_id)
            .delta(self.population_delta())
            .reason("population consumed goods")
            .detail("population", self.size_after)
            .detail(
                "food",
                json!({
                    "needed": self.food.needed,
                    "consumed": self.food.consumed,
                    "shortage_ratio": self.food.shortage_ratio,
                }),
            )
            .detail(
                "consumer_goods",
                json!({
                    "needed": self.consumer_goods.needed,
                    "consumed": self.consumer_goods.consumed,
                    "shortage_ratio": self.consumer_goods.shortage_ratio,
                    "burned": self.consumer_goods_burned,
                }),
            )
            .detail("other_shortages", json!(other))
    }
}

/// Draw one tick of goods for `population` from `market`.
///
/// Updates population size, the world's pressures, and its balance and
/// shortage indicators.
pub fn consume(
    population: &mut Population,
    market: &mut Market,
    pressures: &mut Pressures,
) -> Result<ConsumptionReport, EconomyError> {
    let size = population.size;

    // Food drives population change.
    let food = NeedOutcome::draw(market, FOOD, size * population.food_required_per_capita)?;
    let next_size = if food.shortage_ratio > 0.0 {
        size * food.shortage_ratio.mul_add(-0.05, 1.0)
    } else {
        let vitality = f64::midpoint(pressures.stability, pressures.prosperity);
        size * population.growth_rate.mul_add(vitality, 1.0)
    };
    population.size = (next_size + FLOOR_GUARD).floor().max(0.0);
    pressures.food_balance = food.balance();
    pressures.starvation_level = food.shortage_ratio;
    if food.shortage_ratio > 0.0 {
        pressures.adjust(Pressure::Scarcity, food.shortage_ratio * 0.02);
        pressures.adjust(Pressure::Unrest, food.shortage_ratio * 0.03);
        pressures.adjust(Pressure::Stability, -food.shortage_ratio * 0.04);
    }

    // Consumer goods: shortages hurt, surplus soothes and partly spoils.
    let consumer_goods = NeedOutcome::draw(
        market,
        CONSUMER_GOODS,
        size * population.consumer_goods_required_per_capita,
    )?;
    let mut consumer_goods_burned = 0.0;
    if consumer_goods.shortage_ratio > 0.0 {
        pressures.adjust(Pressure::Stability, -consumer_goods.shortage_ratio * 0.02);
        pressures.adjust(Pressure::Prosperity, -consumer_goods.shortage_ratio * 0.01);
        pressures.adjust(Pressure::Unrest, consumer_goods.shortage_ratio * 0.01);
    } else {
        let leftover = market.inventory.get(CONSUMER_GOODS);
        if size > 0.0 {
            let per_capita = leftover / size;
            pressures.adjust(Pressure::Stability, per_capita * 100.0 * 0.005);
        }
        let burn = (leftover * population.consumer_goods_excess_burn_rate).max(0.0);
        consumer_goods_burned = market.inventory.remove_clamped(CONSUMER_GOODS, burn)?;
    }
    pressures.consumer_goods_balance = consumer_goods.balance();
    pressures.consumer_goods_shortage_level = consumer_goods.shortage_ratio;

    // Everything else only matters past the dead band.
    let mut other = BTreeMap::new();
    for (commodity, per_capita) in &population.needs {
        if matches!(commodity.as_str(), FOOD | CONSUMER_GOODS) {
            continue;
        }
        let outcome = NeedOutcome::draw(market, commodity.as_str(), size * per_capita)?;
        if outcome.shortage_ratio > GENERIC_NEED_DEAD_BAND {
            pressures.adjust(Pressure::Scarcity, outcome.shortage_ratio * 0.01);
            pressures.adjust(Pressure::Stability, -outcome.shortage_ratio * 0.05);
            pressures.adjust(Pressure::Unrest, outcome.shortage_ratio * 0.05);
        }
        other.insert(commodity.clone(), outcome);
    }

    debug!(
        population = population.size,
        food_shortage = food.shortage_ratio,
        consumer_goods_shortage = consumer_goods.shortage_ratio,
        "consumption resolved"
    );

    Ok(ConsumptionReport {
        size_before: size,
        size_after: population.size,
        food,
        consumer_goods,
        consumer_goods_burned,
        other,
    })
}
