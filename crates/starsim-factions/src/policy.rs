//! Choosing one action per faction per tick.
//!
//! The [`FactionPolicy`] trait abstracts how a faction decides what to do.
//! The built-in [`GreedyPolicy`] scores a fixed set of candidate actions and
//! keeps the first strictly best one, evaluated in this order:
//!
//! 1. `expand_influence` into every open frontier world, in world id order.
//! 2. `invest_civilian` in every owned world that can afford it, if the
//!    faction is expansionist.
//! 3. `invest_military` in every owned world that can afford it, if the
//!    faction is aggressive.
//!
//! When nothing qualifies the result is `no_action` with a score of
//! negative infinity.

use std::collections::BTreeSet;

use starsim_economy::InvestmentKind;
use starsim_types::WorldId;
use starsim_world::faction::{TRAIT_AGGRESSIVE, TRAIT_EXPANSIONIST};
use starsim_world::{Faction, Galaxy, World};

use crate::actions::FactionAction;
use crate::value::compute_world_value;

/// An action with the score that won it selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAction {
    /// The chosen action.
    pub action: FactionAction,
    /// Its score; negative infinity for `no_action`.
    pub score: f64,
}

impl ScoredAction {
    /// The `no_action` sentinel.
    pub const fn none() -> Self {
        Self {
            action: FactionAction::NoAction,
            score: f64::NEG_INFINITY,
        }
    }

    /// Replace the current choice if `score` is strictly higher.
    pub fn consider(&mut self, action: FactionAction, score: f64) {
        if score > self.score {
            *self = Self { action, score };
        }
    }
}

impl Default for ScoredAction {
    fn default() -> Self {
        Self::none()
    }
}

/// A source of faction decisions.
pub trait FactionPolicy {
    /// Choose what `faction` does this tick. Must not mutate state.
    fn select(&self, faction: &Faction, galaxy: &Galaxy) -> ScoredAction;
}

/// Greedy single-action selection over world values.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPolicy;

impl FactionPolicy for GreedyPolicy {
    fn select(&self, faction: &Faction, galaxy: &Galaxy) -> ScoredAction {
        select_action(faction, galaxy)
    }
}

fn is_open(galaxy: &Galaxy, world: &str) -> bool {
    galaxy
        .world(world)
        .and_then(|w| w.faction_state.as_ref())
        .is_some_and(|state| state.control.is_none())
}

/// Uncontrolled worlds adjacent to any world `faction` controls.
///
/// A faction holding nothing may instead reach for its capital, if that
/// world is uncontrolled.
pub fn frontier(faction: &Faction, galaxy: &Galaxy) -> BTreeSet<WorldId> {
    let mut targets = BTreeSet::new();
    let mut holds_any = false;
    for owned in galaxy.controlled_by(&faction.id) {
        holds_any = true;
        for (neighbor, _) in galaxy.neighbors(owned.id.as_str()) {
            if is_open(galaxy, neighbor.as_str()) {
                targets.insert(neighbor.clone());
            }
        }
    }
    if !holds_any
        && let Some(capital) = &faction.capital_world_id
        && is_open(galaxy, capital.as_str())
    {
        targets.insert(capital.clone());
    }
    targets
}

/// Owned worlds with the market stock and industry to invest.
fn investable<'a>(
    faction: &'a Faction,
    galaxy: &'a Galaxy,
    kind: InvestmentKind,
) -> impl Iterator<Item = &'a World> {
    galaxy.controlled_by(&faction.id).filter(move |world| {
        world.industry.is_some() && world.market.as_ref().is_some_and(|m| kind.affordable(m))
    })
}

/// Pick the best action for `faction` with the greedy rule.
pub fn select_action(faction: &Faction, galaxy: &Galaxy) -> ScoredAction {
    let mut best = ScoredAction::none();

    for world_id in frontier(faction, galaxy) {
        if let Some(world) = galaxy.world(world_id.as_str()) {
            let score = compute_world_value(faction, world, galaxy);
            best.consider(FactionAction::ExpandInfluence { world: world_id }, score);
        }
    }

    if faction.has_trait(TRAIT_EXPANSIONIST) {
        for world in investable(faction, galaxy, InvestmentKind::Civilian) {
            let p = &world.pressures;
            let score = p.prosperity.mul_add(10.0, (1.0 - p.scarcity) * 5.0);
            best.consider(
                FactionAction::InvestCivilian {
                    world: world.id.clone(),
                },
                score,
            );
        }
    }

    if faction.has_trait(TRAIT_AGGRESSIVE) {
        for world in investable(faction, galaxy, InvestmentKind::Military) {
            let p = &world.pressures;
            let score = p.unrest.mul_add(10.0, (1.0 - p.stability) * 5.0);
            best.consider(
                FactionAction::InvestMilitary {
                    world: world.id.clone(),
                },
                score,
            );
        }
    }

    best
}
