//! Shipments in flight and per-tick lane capacity accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::{CommodityId, LaneId, WorldId};

/// Goods travelling along a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// What is being carried.
    pub commodity_id: CommodityId,
    /// How much is being carried.
    pub quantity: f64,
    /// Where it left from.
    pub source_world_id: WorldId,
    /// Where it is going.
    pub destination_world_id: WorldId,
    /// The lane it travels.
    pub lane_id: LaneId,
    /// Tick at or after which it is delivered.
    pub eta_tick: u64,
}

impl Shipment {
    /// Whether the shipment is due at `tick`.
    pub const fn is_due(&self, tick: u64) -> bool {
        self.eta_tick <= tick
    }
}

/// Quantity departed per lane during the current tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneCapacity {
    used: BTreeMap<LaneId, f64>,
}

impl LaneCapacity {
    /// Create an empty tracker.
    pub const fn new() -> Self {
        Self {
            used: BTreeMap::new(),
        }
    }

    /// Forget all usage; called at the start of every trade stage.
    pub fn reset(&mut self) {
        self.used.clear();
    }

    /// Quantity already departed along `lane` this tick.
    pub fn used(&self, lane: &str) -> f64 {
        self.used.get(lane).copied().unwrap_or(0.0)
    }

    /// Record `quantity` departing along `lane`.
    pub fn add_used(&mut self, lane: &LaneId, quantity: f64) {
        *self.used.entry(lane.clone()).or_insert(0.0) += quantity.max(0.0);
    }

    /// Room left on a lane of `capacity`, never negative.
    pub fn remaining(&self, lane: &str, capacity: f64) -> f64 {
        (capacity - self.used(lane)).max(0.0)
    }

    /// Iterate over `(lane, used)` pairs in lane id order.
    pub fn iter(&self) -> impl Iterator<Item = (&LaneId, f64)> {
        self.used.iter().map(|(id, used)| (id, *used))
    }
}

/// Everything the trade stage carries between ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logistics {
    /// Shipments not yet delivered.
    #[serde(default)]
    pub shipments: Vec<Shipment>,
    /// Capacity used during the most recent trade stage.
    #[serde(default)]
    pub lane_capacity: LaneCapacity,
}
