//! Factions and their per-world presence.
//!
//! # Control hysteresis
//!
//! A world's controller is derived from influence, but not naively: the
//! leader (strictly highest influence, earliest id on ties) only takes an
//! uncontrolled world once it reaches the gain threshold, an incumbent
//! leader always keeps control, and a challenger only unseats the
//! incumbent when the challenger is past the gain threshold *and* the
//! incumbent has fallen below the loss threshold. Small swings in
//! influence therefore never make control flicker.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use starsim_types::{FactionId, WorldId};

/// Trait favouring food and mineral worlds and civilian investment.
pub const TRAIT_EXPANSIONIST: &str = "expansionist";

/// Trait favouring alloy and energy worlds and military investment.
pub const TRAIT_AGGRESSIVE: &str = "aggressive";

fn default_color() -> String {
    String::from("#CCCCCC")
}

const fn default_resource_desire() -> f64 {
    0.5
}

const fn default_gain_threshold() -> f64 {
    0.7
}

const fn default_loss_threshold() -> f64 {
    0.4
}

/// A political power competing for worlds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    /// Unique id.
    pub id: FactionId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Behavioural traits such as [`TRAIT_EXPANSIONIST`].
    #[serde(default)]
    pub traits: BTreeSet<String>,
    /// Free-form numeric preferences.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    /// Seat of government, if any.
    #[serde(default)]
    pub capital_world_id: Option<WorldId>,
    /// Appetite for resource-rich worlds in `[0, 1]`.
    #[serde(default = "default_resource_desire")]
    pub resource_desire: f64,
}

impl Faction {
    /// Create a faction with no traits and default desire.
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_color(),
            traits: BTreeSet::new(),
            weights: BTreeMap::new(),
            capital_world_id: None,
            resource_desire: default_resource_desire(),
        }
    }

    /// Whether the faction has `name` among its traits.
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }
}

/// A change of controller produced by [`WorldFactionState::resolve_control`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlChange {
    /// Controller before resolution.
    pub from: Option<FactionId>,
    /// Controller after resolution.
    pub to: Option<FactionId>,
}

/// Faction presence in one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFactionState {
    /// Influence per faction, each `>= 0`.
    #[serde(default)]
    pub influence: BTreeMap<FactionId, f64>,
    /// Garrison strength per faction.
    #[serde(default)]
    pub garrison: BTreeMap<FactionId, f64>,
    /// Current controller, derived by [`Self::resolve_control`].
    #[serde(default)]
    pub control: Option<FactionId>,
    /// Influence a leader needs to take control.
    #[serde(default = "default_gain_threshold")]
    pub control_threshold_gain: f64,
    /// Influence below which an incumbent can be unseated.
    #[serde(default = "default_loss_threshold")]
    pub control_threshold_loss: f64,
}

impl Default for WorldFactionState {
    fn default() -> Self {
        Self {
            influence: BTreeMap::new(),
            garrison: BTreeMap::new(),
            control: None,
            control_threshold_gain: default_gain_threshold(),
            control_threshold_loss: default_loss_threshold(),
        }
    }
}

impl WorldFactionState {
    /// Influence held by `faction`, or `0.0`.
    pub fn influence_of(&self, faction: &str) -> f64 {
        self.influence.get(faction).copied().unwrap_or(0.0)
    }

    /// The first influence, garrison, or threshold that is negative or not
    /// finite, with its value.
    pub fn invalid_field(&self) -> Option<(&'static str, f64)> {
        self.influence
            .values()
            .map(|v| ("influence", *v))
            .chain(self.garrison.values().map(|v| ("garrison", *v)))
            .chain([
                ("control_threshold_gain", self.control_threshold_gain),
                ("control_threshold_loss", self.control_threshold_loss),
            ])
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
    }

    /// Garrison held by `faction`, or `0.0`.
    pub fn garrison_of(&self, faction: &str) -> f64 {
        self.garrison.get(faction).copied().unwrap_or(0.0)
    }

    /// Shift `faction`'s influence by `delta`, never below zero.
    pub fn add_influence(&mut self, faction: &FactionId, delta: f64) {
        let next = (self.influence_of(faction.as_str()) + delta).max(0.0);
        self.influence.insert(faction.clone(), next);
    }

    /// Shift `faction`'s garrison by `delta`, never below zero.
    pub fn add_garrison(&mut self, faction: &FactionId, delta: f64) {
        let next = (self.garrison_of(faction.as_str()) + delta).max(0.0);
        self.garrison.insert(faction.clone(), next);
    }

    /// The faction with strictly the highest influence; the earliest id
    /// wins ties.
    pub fn leader(&self) -> Option<(&FactionId, f64)> {
        let mut best: Option<(&FactionId, f64)> = None;
        for (faction, influence) in &self.influence {
            if best.is_none_or(|(_, top)| *influence > top) {
                best = Some((faction, *influence));
            }
        }
        best
    }

    /// Re-derive `control` from influence with hysteresis.
    ///
    /// Returns the change if the controller moved.
    pub fn resolve_control(&mut self) -> Option<ControlChange> {
        let next = match (self.leader(), self.control.as_ref()) {
            (None, _) => None,
            (Some((leader, top)), None) => {
                (top >= self.control_threshold_gain).then(|| leader.clone())
            }
            (Some((leader, _)), Some(current)) if leader == current => Some(current.clone()),
            (Some((leader, top)), Some(current)) => {
                let unseat = top >= self.control_threshold_gain
                    && self.influence_of(current.as_str()) < self.control_threshold_loss;
                Some(if unseat { leader.clone() } else { current.clone() })
            }
        };

        if next == self.control {
            return None;
        }
        let from = core::mem::replace(&mut self.control, next.clone());
        Some(ControlChange { from, to: next })
    }
}
