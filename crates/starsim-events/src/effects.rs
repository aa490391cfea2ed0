//! Applying event effects to the galaxy.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use starsim_types::{LaneId, WorldId};
use starsim_world::Galaxy;

use crate::error::EventError;
use crate::model::Effect;

/// What one effect changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectOutcome {
    /// Effect name, as in the event definition.
    pub effect: &'static str,
    /// Net change applied after clamping (pressure, hazard, or stock).
    pub delta: f64,
    /// Lane touched by a hazard change.
    pub lane_id: Option<LaneId>,
    /// Worlds touched, in the order they were hit.
    pub worlds: Vec<WorldId>,
}

impl EffectOutcome {
    fn new(effect: &Effect) -> Self {
        Self {
            effect: effect.name(),
            delta: 0.0,
            lane_id: None,
            worlds: Vec::new(),
        }
    }

    /// Whether the effect changed anything.
    pub fn is_noop(&self) -> bool {
        self.delta.abs() < f64::EPSILON && self.worlds.is_empty() && self.lane_id.is_none()
    }
}

/// Apply `effect` with `target` as the event's world.
///
/// Inventory effects on a world without a market do nothing. A hazard
/// change with no lane named picks one of the target's lanes at random,
/// and does nothing if it has none.
pub fn apply_effect<R: Rng + ?Sized>(
    effect: &Effect,
    target: &WorldId,
    galaxy: &mut Galaxy,
    rng: &mut R,
) -> Result<EffectOutcome, EventError> {
    let mut outcome = EffectOutcome::new(effect);

    if let Some((pressure, delta)) = effect.pressure_change() {
        let world = galaxy.require_world_mut(target.as_str())?;
        outcome.delta = world.pressures.adjust(pressure, delta);
        outcome.worlds.push(target.clone());
        return Ok(outcome);
    }

    match effect {
        Effect::AddInventory {
            commodity_id,
            quantity,
        } => {
            let world = galaxy.require_world_mut(target.as_str())?;
            if let Some(market) = world.market.as_mut() {
                market.inventory.add(commodity_id.as_str(), *quantity)?;
                outcome.delta = *quantity;
                outcome.worlds.push(target.clone());
            }
        }
        Effect::RemoveInventory {
            commodity_id,
            quantity,
        } => {
            let world = galaxy.require_world_mut(target.as_str())?;
            if let Some(market) = world.market.as_mut() {
                let removed = market.inventory.remove_clamped(commodity_id.as_str(), *quantity)?;
                outcome.delta = -removed;
                outcome.worlds.push(target.clone());
            }
        }
        Effect::ChangeLaneHazard { lane_id, delta } => {
            let lane_id = match lane_id {
                Some(id) => Some(id.clone()),
                None => {
                    galaxy.require_world(target.as_str())?;
                    let lanes: Vec<LaneId> = galaxy
                        .neighbors(target.as_str())
                        .iter()
                        .map(|(_, lane)| lane.clone())
                        .collect();
                    lanes.choose(rng).cloned()
                }
            };
            if let Some(id) = lane_id {
                outcome.delta = galaxy.require_lane_mut(id.as_str())?.adjust_hazard(*delta);
                outcome.lane_id = Some(id);
            }
        }
        Effect::RemoveInventoryRandomWorlds {
            commodity_id,
            quantity,
            num_worlds,
        } => {
            let ids = galaxy.world_ids();
            let amount = (*num_worlds).min(ids.len());
            for index in rand::seq::index::sample(rng, ids.len(), amount) {
                let Some(id) = ids.get(index) else {
                    continue;
                };
                let world = galaxy.require_world_mut(id.as_str())?;
                if let Some(market) = world.market.as_mut() {
                    let removed =
                        market.inventory.remove_clamped(commodity_id.as_str(), *quantity)?;
                    outcome.delta -= removed;
                }
                outcome.worlds.push(id.clone());
            }
        }
        Effect::ChangeStability { .. }
        | Effect::ChangeProsperity { .. }
        | Effect::ChangeUnrest { .. }
        | Effect::ChangeScarcity { .. } => {}
    }
    Ok(outcome)
}
