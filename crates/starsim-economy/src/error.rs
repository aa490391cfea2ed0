//! Error types for the starsim-economy crate.
//!
//! Shortages are never errors: consumption, production, and investment
//! clamp to what is available and report the shortfall. The variants here
//! cover contract violations (negative or non-finite quantities) and
//! corrupt scenario data (unknown or duplicate registry ids).

use starsim_types::{CommodityId, RecipeId};

/// Errors that can occur during inventory, market, and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// A quantity passed to an inventory operation was negative or not finite.
    #[error("invalid quantity {quantity} for commodity {commodity}: must be finite and non-negative")]
    NegativeQuantity {
        /// The commodity the caller tried to modify.
        commodity: String,
        /// The rejected quantity.
        quantity: f64,
    },

    /// A commodity id was not found in the registry.
    #[error("unknown commodity: {0}")]
    UnknownCommodity(CommodityId),

    /// A recipe id was not found in the registry.
    #[error("unknown recipe: {0}")]
    UnknownRecipe(RecipeId),

    /// The same commodity id was registered twice.
    #[error("duplicate commodity: {0}")]
    DuplicateCommodity(CommodityId),

    /// The same recipe id was registered twice.
    #[error("duplicate recipe: {0}")]
    DuplicateRecipe(RecipeId),

    /// Registry data could not be parsed.
    #[error("registry yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),
}
