//! Saving and restoring a universe as JSON.
//!
//! A [`Snapshot`] captures everything a run needs to continue: seed, tick,
//! every world with all of its components, lanes, shipments in flight,
//! lane usage, factions, and the event registry. Commodity and recipe
//! registries are static scenario data and are supplied again on restore.
//! Because each tick's random stream is derived from `(seed, tick)`, a
//! restored state continues exactly as the uninterrupted run would.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use starsim_events::EventRegistry;
use starsim_world::{Faction, Galaxy, Lane, LaneCapacity, Logistics, Shipment, World, WorldError};

use crate::config::SimulationConfig;
use crate::state::{Registries, UniverseState};

/// Errors that can occur when saving or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read or write the snapshot file.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for this shape.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The worlds and lanes do not form a valid galaxy.
    #[error("invalid snapshot galaxy: {source}")]
    Galaxy {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A shipment references a lane or world that does not exist.
    #[error("shipment on lane {lane} references unknown {what}")]
    DanglingShipment {
        /// Lane the shipment travels.
        lane: String,
        /// What was missing.
        what: &'static str,
    },
}

/// A serializable copy of the full simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Run seed.
    pub seed: u64,
    /// Completed ticks.
    pub tick: u64,
    /// Every world, in id order.
    pub worlds: Vec<World>,
    /// Every lane, in id order.
    pub lanes: Vec<Lane>,
    /// Shipments not yet delivered.
    #[serde(default)]
    pub active_shipments: Vec<Shipment>,
    /// Capacity used during the most recent trade stage.
    #[serde(default)]
    pub lane_capacity_tracker: LaneCapacity,
    /// Every faction, in id order.
    #[serde(default)]
    pub factions: Vec<Faction>,
    /// Event definitions in force.
    #[serde(default)]
    pub event_registry: EventRegistry,
}

impl Snapshot {
    /// Copy the state of `state`.
    pub fn capture(state: &UniverseState) -> Self {
        Self {
            seed: state.seed,
            tick: state.tick,
            worlds: state.galaxy.worlds().cloned().collect(),
            lanes: state.galaxy.lanes().cloned().collect(),
            active_shipments: state.logistics.shipments.clone(),
            lane_capacity_tracker: state.logistics.lane_capacity.clone(),
            factions: state.factions.values().cloned().collect(),
            event_registry: EventRegistry::clone(&state.events),
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl UniverseState {
    /// Rebuild a state from `snapshot`.
    ///
    /// Adjacency is derived again from the lanes, which are validated
    /// against the worlds; every shipment must travel a known lane toward
    /// a known world. The snapshot's event registry replaces the one in
    /// `registries`.
    pub fn from_snapshot(
        snapshot: Snapshot,
        registries: Registries,
        config: SimulationConfig,
    ) -> Result<Self, SnapshotError> {
        let Snapshot {
            seed,
            tick,
            worlds,
            lanes,
            active_shipments,
            lane_capacity_tracker,
            factions,
            event_registry,
        } = snapshot;

        let galaxy = Galaxy::from_parts(worlds, lanes)?;
        for shipment in &active_shipments {
            let missing = if galaxy.lane(shipment.lane_id.as_str()).is_none() {
                Some("lane")
            } else if galaxy.world(shipment.destination_world_id.as_str()).is_none() {
                Some("destination world")
            } else {
                None
            };
            if let Some(what) = missing {
                return Err(SnapshotError::DanglingShipment {
                    lane: shipment.lane_id.to_string(),
                    what,
                });
            }
        }

        let mut state = Self::new(
            galaxy,
            factions,
            Registries {
                events: Arc::new(event_registry),
                ..registries
            },
            config,
        );
        state.seed = seed;
        state.tick = tick;
        state.logistics = Logistics {
            shipments: active_shipments,
            lane_capacity: lane_capacity_tracker,
        };
        Ok(state)
    }
}
