//! Error types for the `starsim-factions` crate.

use starsim_economy::EconomyError;
use starsim_types::{LaneId, WorldId};

/// Errors that can occur while factions choose and carry out actions.
#[derive(Debug, thiserror::Error)]
pub enum FactionError {
    /// An action targeted a world that is not in the galaxy.
    #[error("world not found: {0}")]
    WorldNotFound(WorldId),

    /// An action targeted a lane that is not in the galaxy.
    #[error("lane not found: {0}")]
    LaneNotFound(LaneId),

    /// An influence or garrison action targeted a world nobody contests.
    #[error("world {0} has no faction state")]
    MissingFactionState(WorldId),

    /// An investment failed at the inventory level.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}
