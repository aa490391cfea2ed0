//! Deciding which events fire where.
//!
//! Every (world, event) pair gets a weight: the event's base weight times
//! the multiplier of every condition that holds in that world. Pairs with
//! a positive weight are candidates, and up to `max_events_per_tick` of
//! them are drawn by weighted sampling without replacement.

use rand::Rng;
use serde::Serialize;
use starsim_types::{EventId, WorldId};
use starsim_world::{Galaxy, World};

use crate::model::{Condition, EventDef};
use crate::registry::EventRegistry;

/// Whether `condition` holds for `world`.
pub fn condition_holds(condition: &Condition, world: &World, galaxy: &Galaxy) -> bool {
    let pressures = &world.pressures;
    match condition {
        Condition::WorldUnrest(band) => band.contains(pressures.unrest),
        Condition::WorldScarcity(band) => band.contains(pressures.scarcity),
        Condition::WorldTech(band) => band.contains(pressures.tech),
        Condition::LaneHazard(band) => galaxy
            .lanes_of(world.id.as_str())
            .any(|lane| band.contains(lane.hazard)),
        Condition::WorldTag { tag, .. } => world.has_tag(tag),
    }
}

/// Product of the multipliers of every condition of `event` that holds
/// for `world`; `1.0` when none do.
pub fn condition_multiplier(event: &EventDef, world: &World, galaxy: &Galaxy) -> f64 {
    event
        .conditions
        .iter()
        .filter(|condition| condition_holds(condition, world, galaxy))
        .map(Condition::weight_multiplier)
        .product()
}

/// A (world, event) pair eligible to fire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// The event.
    pub event_id: EventId,
    /// The world it would fire in.
    pub world_id: WorldId,
    /// Final sampling weight, always positive.
    pub weight: f64,
}

/// Every positively weighted (world, event) pair, in world then event id
/// order.
pub fn candidates(galaxy: &Galaxy, registry: &EventRegistry) -> Vec<Candidate> {
    let mut out = Vec::new();
    for world in galaxy.worlds() {
        for event in registry.all() {
            let weight = event.base_weight * condition_multiplier(event, world, galaxy);
            if weight > 0.0 && weight.is_finite() {
                out.push(Candidate {
                    event_id: event.id.clone(),
                    world_id: world.id.clone(),
                    weight,
                });
            }
        }
    }
    out
}

/// Draw up to `k` distinct indices into `weights`, each pick proportional
/// to its weight among those not yet drawn.
///
/// Non-positive or non-finite weights are never drawn. Each pick costs one
/// uniform draw from `rng`.
pub fn sample_weighted<R: Rng + ?Sized>(weights: &[f64], k: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<(usize, f64)> = weights
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, w)| w.is_finite() && *w > 0.0)
        .collect();
    let mut picked = Vec::with_capacity(k.min(pool.len()));

    while picked.len() < k && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, w)| w).sum();
        let target = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let slot = pool
            .iter()
            .position(|(_, w)| {
                cumulative += w;
                cumulative > target
            })
            .or_else(|| pool.len().checked_sub(1));
        let Some(slot) = slot else {
            break;
        };
        let (index, _) = pool.remove(slot);
        picked.push(index);
    }
    picked
}

/// Choose which candidates fire this tick.
pub fn generate_events<R: Rng + ?Sized>(
    galaxy: &Galaxy,
    registry: &EventRegistry,
    max_events: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    select(&candidates(galaxy, registry), max_events, rng)
}

/// Draw up to `max_events` distinct entries from `pool` by weight.
pub fn select<R: Rng + ?Sized>(
    pool: &[Candidate],
    max_events: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    if pool.is_empty() || max_events == 0 {
        return Vec::new();
    }
    let weights: Vec<f64> = pool.iter().map(|c| c.weight).collect();
    sample_weighted(&weights, max_events, rng)
        .into_iter()
        .filter_map(|index| pool.get(index).cloned())
        .collect()
}
