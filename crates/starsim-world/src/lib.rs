//! The spatial layer of the Starsim galaxy simulation.
//!
//! Worlds sit on a graph connected by lanes. Each world optionally carries
//! the economic components from `starsim-economy` and a record of which
//! factions hold sway there. Goods move between worlds as shipments that
//! travel along lanes and arrive after a delay.
//!
//! # Modules
//!
//! - [`world`] -- Worlds and their planets
//! - [`lane`] -- Lanes between worlds
//! - [`faction`] -- Factions and per-world influence with control hysteresis
//! - [`galaxy`] -- The world/lane graph and its adjacency index
//! - [`logistics`] -- Shipments in flight and lane capacity accounting
//! - [`trade`] -- Arbitrage, dispatch, and delivery
//! - [`error`] -- Error types

pub mod error;
pub mod faction;
pub mod galaxy;
pub mod lane;
pub mod logistics;
pub mod trade;
pub mod world;

pub use error::WorldError;
pub use faction::{ControlChange, Faction, WorldFactionState};
pub use galaxy::Galaxy;
pub use lane::Lane;
pub use logistics::{LaneCapacity, Logistics, Shipment};
pub use trade::{TradeConfig, TradeReport, build_candidate_trades, eta_for, process_trade};
pub use world::{Planet, World};
