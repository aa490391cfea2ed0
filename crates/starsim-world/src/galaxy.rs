//! Galaxy graph: worlds as nodes, lanes as undirected weighted edges.
//!
//! The [`Galaxy`] is the spatial backbone of the simulation. It owns every
//! [`World`] and [`Lane`] and answers neighbor and lane lookups.
//!
//! Internally, an adjacency map indexes the lanes touching each world:
//! `BTreeMap<WorldId, Vec<(WorldId, LaneId)>>`. Adjacency is derived data;
//! it is never serialized and is rebuilt whenever lanes change or a galaxy
//! is deserialized, always in lane id order so neighbor iteration is
//! stable from run to run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::{FactionId, LaneId, WorldId};

use crate::error::WorldError;
use crate::lane::Lane;
use crate::world::World;

/// Serialized form of a [`Galaxy`]: plain lists, no derived indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GalaxyData {
    #[serde(default)]
    worlds: Vec<World>,
    #[serde(default)]
    lanes: Vec<Lane>,
}

/// The galaxy graph holding all worlds and lanes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GalaxyData", into = "GalaxyData")]
pub struct Galaxy {
    /// All worlds indexed by id.
    worlds: BTreeMap<WorldId, World>,
    /// All lanes indexed by id.
    lanes: BTreeMap<LaneId, Lane>,
    /// World -> (neighbor, lane) pairs, in lane id order.
    adjacency: BTreeMap<WorldId, Vec<(WorldId, LaneId)>>,
}

impl Galaxy {
    /// Create an empty galaxy.
    pub const fn new() -> Self {
        Self {
            worlds: BTreeMap::new(),
            lanes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Build a galaxy from lists of worlds and lanes, validating ids and
    /// lane endpoints.
    pub fn from_parts(
        worlds: impl IntoIterator<Item = World>,
        lanes: impl IntoIterator<Item = Lane>,
    ) -> Result<Self, WorldError> {
        let mut galaxy = Self::new();
        for world in worlds {
            galaxy.add_world(world)?;
        }
        for lane in lanes {
            galaxy.insert_lane(lane)?;
        }
        galaxy.rebuild_adjacency();
        Ok(galaxy)
    }

    // -------------------------------------------------------------------
    // World operations
    // -------------------------------------------------------------------

    /// Add a world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateWorld`] if the id is taken, or
    /// [`WorldError::InvalidValue`] if the world fails [`World::validate`].
    pub fn add_world(&mut self, world: World) -> Result<(), WorldError> {
        if self.worlds.contains_key(&world.id) {
            return Err(WorldError::DuplicateWorld(world.id));
        }
        world.validate()?;
        self.adjacency.entry(world.id.clone()).or_default();
        self.worlds.insert(world.id.clone(), world);
        Ok(())
    }

    /// Look up a world.
    pub fn world(&self, id: &str) -> Option<&World> {
        self.worlds.get(id)
    }

    /// Look up a world mutably.
    pub fn world_mut(&mut self, id: &str) -> Option<&mut World> {
        self.worlds.get_mut(id)
    }

    /// Look up a world, failing if absent.
    pub fn require_world(&self, id: &str) -> Result<&World, WorldError> {
        self.worlds
            .get(id)
            .ok_or_else(|| WorldError::WorldNotFound(WorldId::from(id)))
    }

    /// Look up a world mutably, failing if absent.
    pub fn require_world_mut(&mut self, id: &str) -> Result<&mut World, WorldError> {
        self.worlds
            .get_mut(id)
            .ok_or_else(|| WorldError::WorldNotFound(WorldId::from(id)))
    }

    /// Number of worlds.
    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// All world ids in order.
    pub fn world_ids(&self) -> Vec<WorldId> {
        self.worlds.keys().cloned().collect()
    }

    /// Iterate over worlds in id order.
    pub fn worlds(&self) -> impl Iterator<Item = &World> {
        self.worlds.values()
    }

    /// Iterate mutably over worlds in id order.
    pub fn worlds_mut(&mut self) -> impl Iterator<Item = &mut World> {
        self.worlds.values_mut()
    }

    /// Worlds currently controlled by `faction`.
    pub fn controlled_by<'a>(&'a self, faction: &'a FactionId) -> impl Iterator<Item = &'a World> {
        self.worlds.values().filter(move |w| w.is_controlled_by(faction))
    }

    // -------------------------------------------------------------------
    // Lane operations
    // -------------------------------------------------------------------

    /// Add a lane between two existing worlds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DanglingLane`] if an endpoint is missing,
    /// [`WorldError::DuplicateLane`] if the id is taken, or
    /// [`WorldError::InvalidValue`] if the lane fails [`Lane::validate`].
    pub fn add_lane(&mut self, lane: Lane) -> Result<(), WorldError> {
        self.insert_lane(lane)?;
        self.rebuild_adjacency();
        Ok(())
    }

    fn insert_lane(&mut self, lane: Lane) -> Result<(), WorldError> {
        lane.validate()?;
        for end in [&lane.a, &lane.b] {
            if !self.worlds.contains_key(end) {
                return Err(WorldError::DanglingLane {
                    lane: lane.id.clone(),
                    world: end.clone(),
                });
            }
        }
        if self.lanes.contains_key(&lane.id) {
            return Err(WorldError::DuplicateLane(lane.id));
        }
        self.lanes.insert(lane.id.clone(), lane);
        Ok(())
    }

    /// Look up a lane.
    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.get(id)
    }

    /// Look up a lane mutably.
    pub fn lane_mut(&mut self, id: &str) -> Option<&mut Lane> {
        self.lanes.get_mut(id)
    }

    /// Look up a lane mutably, failing if absent.
    pub fn require_lane_mut(&mut self, id: &str) -> Result<&mut Lane, WorldError> {
        self.lanes
            .get_mut(id)
            .ok_or_else(|| WorldError::LaneNotFound(LaneId::from(id)))
    }

    /// Number of lanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Iterate over lanes in id order.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.values()
    }

    // -------------------------------------------------------------------
    // Graph queries
    // -------------------------------------------------------------------

    /// Neighbors of `world` with the connecting lane, in lane id order.
    pub fn neighbors(&self, world: &str) -> &[(WorldId, LaneId)] {
        self.adjacency
            .get(world)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Lanes touching `world`, in lane id order.
    pub fn lanes_of<'a>(&'a self, world: &str) -> impl Iterator<Item = &'a Lane> + use<'a> {
        self.neighbors(world)
            .iter()
            .filter_map(move |(_, lane)| self.lanes.get(lane))
    }

    /// Whether `a` and `b` share a lane.
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.neighbors(a).iter().any(|(n, _)| n.as_str() == b)
    }

    fn rebuild_adjacency(&mut self) {
        let mut adjacency: BTreeMap<WorldId, Vec<(WorldId, LaneId)>> = self
            .worlds
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for lane in self.lanes.values() {
            if let Some(list) = adjacency.get_mut(&lane.a) {
                list.push((lane.b.clone(), lane.id.clone()));
            }
            if lane.a != lane.b
                && let Some(list) = adjacency.get_mut(&lane.b)
            {
                list.push((lane.a.clone(), lane.id.clone()));
            }
        }
        self.adjacency = adjacency;
    }
}

impl TryFrom<GalaxyData> for Galaxy {
    type Error = WorldError;

    fn try_from(data: GalaxyData) -> Result<Self, Self::Error> {
        Self::from_parts(data.worlds, data.lanes)
    }
}

impl From<Galaxy> for GalaxyData {
    fn from(galaxy: Galaxy) -> Self {
        Self {
            worlds: galaxy.worlds.into_values().collect(),
            lanes: galaxy.lanes.into_values().collect(),
        }
    }
}
