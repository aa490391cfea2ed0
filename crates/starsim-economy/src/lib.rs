//! World-level economics for the Starsim galaxy simulation.
//!
//! Everything here operates on one world's components at a time and never
//! touches the galaxy graph: stages in `starsim-core` hand in the pieces
//! of a world they need (market, population, industry, pressures) and
//! collect a report describing what changed.
//!
//! # Modules
//!
//! - [`inventory`] -- Non-negative commodity stockpiles
//! - [`commodity`] -- Commodity definitions and registry
//! - [`recipe`] -- Production recipes and registry
//! - [`market`] -- Local prices and the price-discovery rule
//! - [`pressure`] -- Normalized world pressures and indicators
//! - [`consumption`] -- Population and its per-tick draw on the market
//! - [`production`] -- Installed industry and recipe execution
//! - [`upkeep`] -- Energy upkeep and deficit throttling
//! - [`investment`] -- Civilian and military capital formation
//! - [`error`] -- Error types

pub mod commodity;
pub mod consumption;
pub mod error;
pub mod inventory;
pub mod investment;
pub mod market;
pub mod pressure;
pub mod production;
pub mod recipe;
pub mod upkeep;

pub use commodity::{Commodity, CommodityCategory, CommodityRegistry};
pub use consumption::{ConsumptionReport, NeedOutcome, Population, consume};
pub use error::EconomyError;
pub use inventory::Inventory;
pub use investment::{InvestmentKind, InvestmentOutcome, invest, invest_civilian, invest_military};
pub use market::{Market, PriceChange};
pub use pressure::{Pressure, Pressures};
pub use production::{Industry, ProductionReport, RecipeRun, produce};
pub use recipe::{Recipe, RecipeRegistry};
pub use upkeep::{UpkeepReport, apply_upkeep};
