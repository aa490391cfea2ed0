//! Universe state, tick orchestration, and snapshots for the Starsim
//! galaxy simulation.
//!
//! This crate owns the fixed per-tick stage sequence that drives the
//! simulation: consumption, optional upkeep, production, trade, prices,
//! faction actions, and events. It holds no I/O inside a tick; loading
//! configuration and registries and saving snapshots happen between ticks.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `starsim-config.yaml` into
//!   strongly-typed structs.
//! - [`rng`] -- Per-tick random streams derived from `(seed, tick)`.
//! - [`state`] -- [`UniverseState`], [`Scenario`] loading, and the shared
//!   [`Registries`].
//! - [`tick`] -- [`step`], the stage sequence for one tick.
//! - [`snapshot`] -- JSON save and restore.

pub mod config;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use config::{ConfigError, DataConfig, EconomyConfig, SimulationConfig, WorldConfig};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::{Registries, Scenario, UniverseState};
pub use tick::{TickError, TickReport, run_ticks, step};
