//! Random events for the Starsim galaxy simulation.
//!
//! Events are authored as data: each definition carries a base weight,
//! conditions that scale that weight per world, and effects applied when
//! it fires. Conditions and effects are closed tagged unions, so a typo in
//! an event file fails at load time rather than silently doing nothing.
//!
//! # Modules
//!
//! - [`model`] -- Event definitions, conditions, and effects
//! - [`registry`] -- The event registry
//! - [`generator`] -- Condition evaluation and weighted selection
//! - [`effects`] -- Effect application
//! - [`roll`] -- The per-tick event stage
//! - [`config`] -- Roll tunables
//! - [`error`] -- Error types

pub mod config;
pub mod effects;
pub mod error;
pub mod generator;
pub mod model;
pub mod registry;
pub mod roll;

pub use config::EventConfig;
pub use effects::{EffectOutcome, apply_effect};
pub use error::EventError;
pub use generator::{
    Candidate, candidates, condition_holds, condition_multiplier, generate_events, sample_weighted,
    select,
};
pub use model::{Band, Condition, Effect, EventDef};
pub use registry::EventRegistry;
pub use roll::{EventsReport, TriggeredEvent, roll_events};
