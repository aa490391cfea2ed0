//! Capital formation: spending stock to grow installed capacity.
//!
//! Civilian investment spends minerals, military investment spends alloy.
//! When the stock meets the threshold it is spent, then one eligible
//! recipe already installed on the world is picked at random and its
//! capacity grows by one unit. Stock is spent even if no eligible recipe
//! is installed.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use starsim_types::RecipeId;
use tracing::debug;

use crate::commodity::well_known::{ALLOY, MINERALS};
use crate::error::EconomyError;
use crate::market::Market;
use crate::production::Industry;
use crate::recipe::well_known::{
    ASSEMBLE_ALLOYS, FARM_FOOD, MINE_MINERALS, REFINE_ALLOY, REFINE_CONSUMER_GOODS,
};

/// Minerals spent per civilian investment.
pub const CIVILIAN_COST: f64 = 10.0;

/// Alloy spent per military investment.
pub const MILITARY_COST: f64 = 5.0;

/// Capacity added per investment.
pub const INVESTMENT_UNITS: f64 = 1.0;

const CIVILIAN_RECIPES: [&str; 3] = [FARM_FOOD, MINE_MINERALS, REFINE_CONSUMER_GOODS];
const MILITARY_RECIPES: [&str; 2] = [REFINE_ALLOY, ASSEMBLE_ALLOYS];

/// Kind of capital investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentKind {
    /// Minerals into food, mining, and consumer goods lines.
    Civilian,
    /// Alloy into alloy lines.
    Military,
}

impl InvestmentKind {
    /// Commodity spent.
    pub const fn currency(self) -> &'static str {
        match self {
            Self::Civilian => MINERALS,
            Self::Military => ALLOY,
        }
    }

    /// Stock required to invest.
    pub const fn cost(self) -> f64 {
        match self {
            Self::Civilian => CIVILIAN_COST,
            Self::Military => MILITARY_COST,
        }
    }

    /// Recipes eligible for expansion, in draw order.
    pub const fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::Civilian => &CIVILIAN_RECIPES,
            Self::Military => &MILITARY_RECIPES,
        }
    }

    /// Whether `market` holds enough stock to invest.
    pub fn affordable(self, market: &Market) -> bool {
        market.inventory.get(self.currency()) >= self.cost()
    }
}

/// Outcome of one investment attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentOutcome {
    /// Which investment ran.
    pub kind: InvestmentKind,
    /// Stock spent (zero when unaffordable).
    pub spent: f64,
    /// The recipe whose capacity grew, if any.
    pub expanded: Option<RecipeId>,
}

/// Attempt one investment of `kind`.
pub fn invest<R: Rng + ?Sized>(
    kind: InvestmentKind,
    industry: &mut Industry,
    market: &mut Market,
    rng: &mut R,
) -> Result<InvestmentOutcome, EconomyError> {
    if !kind.affordable(market) {
        return Ok(InvestmentOutcome {
            kind,
            spent: 0.0,
            expanded: None,
        });
    }
    let spent = market.inventory.remove_clamped(kind.currency(), kind.cost())?;

    let eligible: Vec<&str> = kind
        .candidates()
        .iter()
        .copied()
        .filter(|id| industry.caps.contains_key(*id))
        .collect();
    let expanded = eligible.choose(rng).map(|id| RecipeId::from(*id));
    if let Some(recipe) = &expanded
        && let Some(cap) = industry.caps.get_mut(recipe)
    {
        *cap += INVESTMENT_UNITS;
    }

    debug!(?kind, spent, expanded = ?expanded, "investment made");
    Ok(InvestmentOutcome {
        kind,
        spent,
        expanded,
    })
}

/// Spend minerals to expand a civilian recipe.
pub fn invest_civilian<R: Rng + ?Sized>(
    industry: &mut Industry,
    market: &mut Market,
    rng: &mut R,
) -> Result<InvestmentOutcome, EconomyError> {
    invest(InvestmentKind::Civilian, industry, market, rng)
}

/// Spend alloy to expand a military recipe.
pub fn invest_military<R: Rng + ?Sized>(
    industry: &mut Industry,
    market: &mut Market,
    rng: &mut R,
) -> Result<InvestmentOutcome, EconomyError> {
    invest(InvestmentKind::Military, industry, market, rng)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn civilian_investment_expands_installed_recipe() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from(FARM_FOOD), 5.0);
        industry.caps.insert(RecipeId::from(REFINE_ALLOY), 5.0);
        let mut market = Market::new();
        assert!(market.inventory.set(MINERALS, 15.0).is_ok());
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = invest_civilian(&mut industry, &mut market, &mut rng).ok();
        assert_eq!(
            outcome.and_then(|o| o.expanded),
            Some(RecipeId::from(FARM_FOOD))
        );
        assert!((industry.cap(FARM_FOOD) - 6.0).abs() < f64::EPSILON);
        assert!((industry.cap(REFINE_ALLOY) - 5.0).abs() < f64::EPSILON);
        assert!((market.inventory.get(MINERALS) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unaffordable_investment_spends_nothing() {
        let mut industry = Industry::new();
        industry.caps.insert(RecipeId::from(REFINE_ALLOY), 5.0);
        let mut market = Market::new();
        assert!(market.inventory.set(ALLOY, 4.0).is_ok());
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = invest_military(&mut industry, &mut market, &mut rng).ok();
        assert!(outcome.is_some_and(|o| o.spent.abs() < f64::EPSILON && o.expanded.is_none()));
        assert!((market.inventory.get(ALLOY) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stock_spent_without_eligible_recipe() {
        let mut industry = Industry::new();
        let mut market = Market::new();
        assert!(market.inventory.set(ALLOY, 5.0).is_ok());
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = invest_military(&mut industry, &mut market, &mut rng).ok();
        assert!(outcome.is_some_and(|o| o.expanded.is_none()));
        assert!(market.inventory.is_empty());
    }

    #[test]
    fn military_choice_is_seed_deterministic() {
        let run = |seed| {
            let mut industry = Industry::new();
            industry.caps.insert(RecipeId::from(REFINE_ALLOY), 1.0);
            industry.caps.insert(RecipeId::from(ASSEMBLE_ALLOYS), 1.0);
            let mut market = Market::new();
            let _ = market.inventory.set(ALLOY, 50.0);
            let mut rng = StdRng::seed_from_u64(seed);
            (0..5)
                .filter_map(|_| invest_military(&mut industry, &mut market, &mut rng).ok())
                .filter_map(|o| o.expanded)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
        assert_eq!(run(11).len(), 5);
    }
}
