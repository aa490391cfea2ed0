//! Energy upkeep for population and infrastructure.
//!
//! Every person and every unit of installed capacity burns energy. A world
//! that cannot cover its upkeep loses stability and prosperity and has its
//! capacity throttled in proportion to the deficit.

use serde::Serialize;
use starsim_types::{AuditEntry, WorldId, kinds};
use tracing::debug;

use crate::commodity::well_known::ENERGY;
use crate::consumption::Population;
use crate::error::EconomyError;
use crate::market::Market;
use crate::pressure::{Pressure, Pressures};
use crate::production::Industry;

/// Energy burned per unit of installed capacity per tick.
pub const INFRASTRUCTURE_UPKEEP_PER_CAP: f64 = 0.1;

/// What one call to [`apply_upkeep`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UpkeepReport {
    /// Energy required in total.
    pub required: f64,
    /// Energy actually drawn.
    pub consumed: f64,
    /// Unmet fraction of the requirement, in `[0, 1]`.
    pub deficit_ratio: f64,
}

impl UpkeepReport {
    /// Summarize as an audit entry.
    pub fn audit_entry(&self, tick: u64, world_id: &WorldId) -> AuditEntry {
        AuditEntry::new(kinds::UPKEEP, tick)
            .world(world_id)
            .delta(-self.consumed)
            .reason(if self.deficit_ratio > 0.0 {
                "energy deficit throttled industry"
            } else {
                "energy upkeep paid"
            })
            .detail("required", self.required)
            .detail("consumed", self.consumed)
            .detail("deficit_ratio", self.deficit_ratio)
    }
}

/// Charge one tick of energy upkeep.
pub fn apply_upkeep(
    population: &Population,
    industry: &mut Industry,
    market: &mut Market,
    pressures: &mut Pressures,
) -> Result<UpkeepReport, EconomyError> {
    let population_upkeep = population.size * population.energy_upkeep_per_capita;
    let required = industry
        .total_capacity()
        .mul_add(INFRASTRUCTURE_UPKEEP_PER_CAP, population_upkeep)
        .max(0.0);
    let consumed = market.inventory.remove_clamped(ENERGY, required)?;

    let deficit = required - consumed;
    let deficit_ratio = if required > 0.0 && deficit > 0.0 {
        (deficit / required).min(1.0)
    } else {
        0.0
    };

    if deficit_ratio > 0.0 {
        pressures.adjust(Pressure::Stability, -deficit_ratio * 0.05);
        pressures.adjust(Pressure::Prosperity, -deficit_ratio * 0.05);
        let throttle = deficit_ratio.mul_add(-0.1, 1.0);
        for cap in industry.caps.values_mut() {
            *cap = (*cap * throttle).max(0.0);
        }
        debug!(deficit_ratio, "energy deficit");
    }

    Ok(UpkeepReport {
        required,
        consumed,
        deficit_ratio,
    })
}
