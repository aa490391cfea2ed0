//! Faction behaviour for the Starsim galaxy simulation.
//!
//! Factions compete for control of worlds. Each tick every faction scores
//! its options, picks one action, and carries it out against the galaxy.
//! Control of a world follows from influence through the hysteresis rule
//! in [`starsim_world::faction`].
//!
//! # Modules
//!
//! - [`value`] -- The world value heuristic
//! - [`policy`] -- Action selection (`FactionPolicy`, greedy selection)
//! - [`actions`] -- Action definitions and execution
//! - [`stage`] -- The per-tick faction stage and its audit entries
//! - [`config`] -- Action step sizes
//! - [`error`] -- Error types

pub mod actions;
pub mod config;
pub mod error;
pub mod policy;
pub mod stage;
pub mod value;

pub use actions::{ActionOutcome, FactionAction, execute};
pub use config::FactionConfig;
pub use error::FactionError;
pub use policy::{FactionPolicy, GreedyPolicy, ScoredAction, frontier, select_action};
pub use stage::{FactionTurn, FactionsReport, run_factions};
pub use value::{commodity_bias, compute_world_value, world_values};
