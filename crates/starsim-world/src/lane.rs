//! Lanes: the undirected edges of the galaxy graph.

use serde::{Deserialize, Serialize};
use starsim_types::{LaneId, WorldId, unit_clamp};

use crate::error::WorldError;

const fn default_distance() -> f64 {
    1.0
}

const fn default_capacity() -> f64 {
    1.0
}

/// A travel lane between two worlds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Unique id.
    pub id: LaneId,
    /// First endpoint.
    pub a: WorldId,
    /// Second endpoint.
    pub b: WorldId,
    /// Travel distance; shipments take `round(distance)` ticks.
    #[serde(default = "default_distance")]
    pub distance: f64,
    /// Danger to shipping in `[0, 1]`.
    #[serde(default)]
    pub hazard: f64,
    /// Maximum quantity that may depart along the lane per tick.
    #[serde(default = "default_capacity")]
    pub capacity: f64,
}

impl Lane {
    /// Create a lane with default distance, hazard, and capacity.
    pub fn new(id: impl Into<LaneId>, a: impl Into<WorldId>, b: impl Into<WorldId>) -> Self {
        Self {
            id: id.into(),
            a: a.into(),
            b: b.into(),
            distance: default_distance(),
            hazard: 0.0,
            capacity: default_capacity(),
        }
    }

    /// Whether `world` is one of the endpoints.
    pub fn touches(&self, world: &str) -> bool {
        self.a.as_str() == world || self.b.as_str() == world
    }

    /// The endpoint opposite `world`, if `world` is an endpoint.
    pub fn other_end(&self, world: &str) -> Option<&WorldId> {
        if self.a.as_str() == world {
            Some(&self.b)
        } else if self.b.as_str() == world {
            Some(&self.a)
        } else {
            None
        }
    }

    /// Check loaded values: hazard in `[0, 1]`, distance and capacity
    /// finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), WorldError> {
        let bad = if (0.0..=1.0).contains(&self.hazard) {
            [("distance", self.distance), ("capacity", self.capacity)]
                .into_iter()
                .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        } else {
            Some(("hazard", self.hazard))
        };
        match bad {
            Some((field, value)) => Err(WorldError::InvalidValue {
                entity: self.id.to_string(),
                field,
                value,
            }),
            None => Ok(()),
        }
    }

    /// Shift hazard by `delta`, clamped to `[0, 1]`.
    ///
    /// Returns the change actually applied.
    pub fn adjust_hazard(&mut self, delta: f64) -> f64 {
        let before = self.hazard;
        self.hazard = unit_clamp(before + delta);
        self.hazard - before
    }
}
