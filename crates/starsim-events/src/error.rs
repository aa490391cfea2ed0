//! Error types for the `starsim-events` crate.

use starsim_economy::EconomyError;
use starsim_types::EventId;
use starsim_world::WorldError;

/// Errors that can occur while loading or applying events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// An event id was not found in the registry.
    #[error("unknown event: {0}")]
    UnknownEvent(EventId),

    /// Two definitions share an id.
    #[error("duplicate event: {0}")]
    DuplicateEvent(EventId),

    /// A definition carries a weight or effect that can never apply.
    #[error("invalid event {event}: {reason}")]
    InvalidEffect {
        /// The offending event.
        event: EventId,
        /// What is wrong with it.
        reason: String,
    },

    /// The YAML document could not be parsed.
    #[error("event yaml: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// An inventory operation failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// A target world or lane is missing from the galaxy.
    #[error(transparent)]
    World(#[from] WorldError),
}
