//! Error types for the `starsim-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`]. A lookup
//! that misses here means the galaxy itself is inconsistent, which the tick
//! pipeline treats as fatal.

use starsim_economy::EconomyError;
use starsim_types::{LaneId, WorldId};

/// Errors that can occur during galaxy-graph and logistics operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A world was not found in the galaxy.
    #[error("world not found: {0}")]
    WorldNotFound(WorldId),

    /// A lane was not found in the galaxy.
    #[error("lane not found: {0}")]
    LaneNotFound(LaneId),

    /// A world with this id already exists.
    #[error("duplicate world: {0}")]
    DuplicateWorld(WorldId),

    /// A lane with this id already exists.
    #[error("duplicate lane: {0}")]
    DuplicateLane(LaneId),

    /// A lane names an endpoint that is not in the galaxy.
    #[error("lane {lane} references unknown world {world}")]
    DanglingLane {
        /// The offending lane.
        lane: LaneId,
        /// The missing endpoint.
        world: WorldId,
    },

    /// A loaded world or lane carries a value outside its valid range.
    #[error("{entity} has invalid {field}: {value}")]
    InvalidValue {
        /// Id of the offending world or lane.
        entity: String,
        /// Name of the field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An inventory or registry operation failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}
