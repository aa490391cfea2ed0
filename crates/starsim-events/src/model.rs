//! Event definitions: weighted, conditional, declarative.
//!
//! An [`EventDef`] is loaded from YAML. Each [`Condition`] that holds for a
//! world scales the event's weight there; conditions that do not hold leave
//! it unchanged. Each [`Effect`] is a typed operation applied in order when
//! the event fires.
//!
//! ```yaml
//! - id: pirate_raid
//!   base_weight: 0.5
//!   conditions:
//!     - type: lane_hazard
//!       min: 0.3
//!       weight_multiplier: 3.0
//!   effects:
//!     - type: remove_inventory
//!       commodity_id: alloy
//!       quantity: 5.0
//!     - type: change_lane_hazard
//!       delta: 0.1
//! ```

use serde::{Deserialize, Serialize};
use starsim_economy::Pressure;
use starsim_types::{CommodityId, EventId, LaneId};

const fn one() -> f64 {
    1.0
}

/// A closed `[min, max]` interval condition on one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower bound, inclusive.
    #[serde(default)]
    pub min: f64,
    /// Upper bound, inclusive.
    #[serde(default = "one")]
    pub max: f64,
    /// Weight factor applied when the value falls in the band.
    #[serde(default = "one")]
    pub weight_multiplier: f64,
}

impl Band {
    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// A predicate on a world that scales an event's weight when it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// World unrest within a band.
    WorldUnrest(Band),
    /// World scarcity within a band.
    WorldScarcity(Band),
    /// World tech within a band.
    WorldTech(Band),
    /// Hazard of any lane touching the world within a band.
    LaneHazard(Band),
    /// World carries a tag.
    WorldTag {
        /// Required tag.
        tag: String,
        /// Weight factor applied when the tag is present.
        #[serde(default = "one")]
        weight_multiplier: f64,
    },
}

impl Condition {
    /// Factor applied to the weight when this condition holds.
    pub const fn weight_multiplier(&self) -> f64 {
        match self {
            Self::WorldUnrest(band)
            | Self::WorldScarcity(band)
            | Self::WorldTech(band)
            | Self::LaneHazard(band) => band.weight_multiplier,
            Self::WorldTag {
                weight_multiplier, ..
            } => *weight_multiplier,
        }
    }
}

/// One operation performed when an event fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Shift the target world's stability.
    ChangeStability {
        /// Amount to add before clamping.
        delta: f64,
    },
    /// Shift the target world's prosperity.
    ChangeProsperity {
        /// Amount to add before clamping.
        delta: f64,
    },
    /// Shift the target world's unrest.
    ChangeUnrest {
        /// Amount to add before clamping.
        delta: f64,
    },
    /// Shift the target world's scarcity.
    ChangeScarcity {
        /// Amount to add before clamping.
        delta: f64,
    },
    /// Add stock to the target world's market.
    AddInventory {
        /// Commodity added.
        commodity_id: CommodityId,
        /// Quantity added.
        quantity: f64,
    },
    /// Remove stock from the target world's market, as much as exists.
    RemoveInventory {
        /// Commodity removed.
        commodity_id: CommodityId,
        /// Quantity requested.
        quantity: f64,
    },
    /// Shift a lane's hazard: the named lane, or a random lane touching
    /// the target world.
    ChangeLaneHazard {
        /// Specific lane, if any.
        #[serde(default)]
        lane_id: Option<LaneId>,
        /// Amount to add before clamping.
        delta: f64,
    },
    /// Remove stock from several randomly chosen worlds anywhere in the
    /// galaxy.
    RemoveInventoryRandomWorlds {
        /// Commodity removed.
        commodity_id: CommodityId,
        /// Quantity requested per world.
        quantity: f64,
        /// How many distinct worlds are hit.
        num_worlds: usize,
    },
}

impl Effect {
    /// Stable effect name used in audit entries.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChangeStability { .. } => "change_stability",
            Self::ChangeProsperity { .. } => "change_prosperity",
            Self::ChangeUnrest { .. } => "change_unrest",
            Self::ChangeScarcity { .. } => "change_scarcity",
            Self::AddInventory { .. } => "add_inventory",
            Self::RemoveInventory { .. } => "remove_inventory",
            Self::ChangeLaneHazard { .. } => "change_lane_hazard",
            Self::RemoveInventoryRandomWorlds { .. } => "remove_inventory_random_worlds",
        }
    }

    /// The pressure and delta for the `change_*` pressure effects.
    pub const fn pressure_change(&self) -> Option<(Pressure, f64)> {
        match *self {
            Self::ChangeStability { delta } => Some((Pressure::Stability, delta)),
            Self::ChangeProsperity { delta } => Some((Pressure::Prosperity, delta)),
            Self::ChangeUnrest { delta } => Some((Pressure::Unrest, delta)),
            Self::ChangeScarcity { delta } => Some((Pressure::Scarcity, delta)),
            _ => None,
        }
    }

    /// Quantity moved by the inventory effects.
    const fn quantity(&self) -> Option<f64> {
        match *self {
            Self::AddInventory { quantity, .. }
            | Self::RemoveInventory { quantity, .. }
            | Self::RemoveInventoryRandomWorlds { quantity, .. } => Some(quantity),
            _ => None,
        }
    }

    /// Why this effect can never apply, if it cannot.
    pub fn invalid_reason(&self) -> Option<String> {
        if let Some(quantity) = self.quantity()
            && !(quantity.is_finite() && quantity >= 0.0)
        {
            return Some(format!(
                "{} quantity must be non-negative, got {quantity}",
                self.name()
            ));
        }
        let delta = match *self {
            Self::ChangeLaneHazard { delta, .. } => Some(delta),
            _ => self.pressure_change().map(|(_, delta)| delta),
        };
        if delta.is_some_and(|d| !d.is_finite()) {
            return Some(format!("{} delta must be finite", self.name()));
        }
        None
    }
}

/// A weighted, conditional event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    /// Unique id.
    pub id: EventId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Weight before conditions apply.
    #[serde(default = "one")]
    pub base_weight: f64,
    /// Weight modifiers.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Operations applied in order when the event fires.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl EventDef {
    /// Create an event with the default weight and nothing attached.
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            base_weight: one(),
            conditions: Vec::new(),
            effects: Vec::new(),
        }
    }
}
