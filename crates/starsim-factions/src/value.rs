//! How much a world is worth to a faction.
//!
//! [`compute_world_value`] is an additive score over economic, geographic,
//! symbolic, and political terms, minus penalties for unrest, scarcity,
//! and instability. It reads state only.

use std::collections::BTreeMap;

use starsim_economy::commodity::well_known::{ALLOY, ENERGY, FOOD, MINERALS};
use starsim_types::WorldId;
use starsim_world::faction::{TRAIT_AGGRESSIVE, TRAIT_EXPANSIONIST};
use starsim_world::world::{TAG_CAPITAL, TAG_SACRED};
use starsim_world::{Faction, Galaxy, World};

/// Value per unit of market stock, before trait bias.
const STOCK_WEIGHTS: [(&str, f64); 4] = [
    (FOOD, 0.01),
    (MINERALS, 0.005),
    (ALLOY, 0.005),
    (ENERGY, 0.005),
];

/// Multiplier on commodities a faction's traits favour.
pub const TRAIT_BIAS: f64 = 1.5;

const INDUSTRY_LINE_VALUE: f64 = 10.0;
const POTENTIAL_VALUE: f64 = 10.0;
const NEIGHBOR_VALUE: f64 = 2.0;
const CAPITAL_PROXIMITY_VALUE: f64 = 20.0;
const STABILITY_VALUE: f64 = 5.0;
const PROSPERITY_VALUE: f64 = 5.0;
const PLANET_VALUE: f64 = 1.0;
const CAPITAL_TAG_VALUE: f64 = 50.0;
const SACRED_TAG_VALUE: f64 = 30.0;

const OWN_CONTROL_VALUE: f64 = 20.0;
const UNCONTESTED_VALUE: f64 = 10.0;
const ENEMY_CONTROL_PENALTY: f64 = 5.0;
const ENEMY_INFLUENCE_PENALTY: f64 = 10.0;
const OWN_INFLUENCE_VALUE: f64 = 10.0;

const UNREST_PENALTY: f64 = 10.0;
const SCARCITY_PENALTY: f64 = 5.0;
const INSTABILITY_PENALTY: f64 = 15.0;

/// Weight `faction` puts on `commodity`: [`TRAIT_BIAS`] when a trait
/// favours it, otherwise `1.0`.
///
/// Expansionists favour food and minerals; aggressive factions favour
/// alloy and energy.
pub fn commodity_bias(faction: &Faction, commodity: &str) -> f64 {
    let favoured = (faction.has_trait(TRAIT_EXPANSIONIST) && matches!(commodity, FOOD | MINERALS))
        || (faction.has_trait(TRAIT_AGGRESSIVE) && matches!(commodity, ALLOY | ENERGY));
    if favoured { TRAIT_BIAS } else { 1.0 }
}

fn count(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Score `world` from `faction`'s point of view.
pub fn compute_world_value(faction: &Faction, world: &World, galaxy: &Galaxy) -> f64 {
    let stock = world.market.as_ref().map_or(0.0, |market| {
        STOCK_WEIGHTS
            .iter()
            .map(|&(commodity, weight)| {
                market.inventory.get(commodity) * weight * commodity_bias(faction, commodity)
            })
            .sum::<f64>()
    });
    let industry = world
        .industry
        .as_ref()
        .map_or(0.0, |industry| count(industry.caps.len()) * INDUSTRY_LINE_VALUE);
    let potential = world
        .planets
        .iter()
        .flat_map(|planet| planet.resource_potentials.iter())
        .map(|(commodity, amount)| amount * commodity_bias(faction, commodity.as_str()))
        .sum::<f64>()
        * faction.resource_desire
        * POTENTIAL_VALUE;

    let neighbors = count(galaxy.neighbors(world.id.as_str()).len()) * NEIGHBOR_VALUE;
    let proximity = faction
        .capital_world_id
        .as_ref()
        .and_then(|id| galaxy.world(id.as_str()))
        .map_or(0.0, |capital| {
            (CAPITAL_PROXIMITY_VALUE / (1.0 + world.distance_to(capital))).max(0.0)
        });

    let stability = world.pressures.stability * STABILITY_VALUE;
    let prosperity = world.pressures.prosperity * PROSPERITY_VALUE;
    let planets = count(world.planets.len()) * PLANET_VALUE;
    let symbolic = [(TAG_CAPITAL, CAPITAL_TAG_VALUE), (TAG_SACRED, SACRED_TAG_VALUE)]
        .iter()
        .filter(|(tag, _)| world.has_tag(tag))
        .map(|(_, value)| value)
        .sum::<f64>();
    let control = control_value(faction, world);

    let unrest = world.pressures.unrest * UNREST_PENALTY;
    let scarcity = world.pressures.scarcity * SCARCITY_PENALTY;
    let instability = (1.0 - world.pressures.stability) * INSTABILITY_PENALTY;

    let gains = stock + industry + potential + neighbors + proximity;
    let standing = stability + prosperity + planets + symbolic + control;
    gains + standing - unrest - scarcity - instability
}

fn control_value(faction: &Faction, world: &World) -> f64 {
    let Some(state) = &world.faction_state else {
        return 0.0;
    };
    let own = state.influence_of(faction.id.as_str()) * OWN_INFLUENCE_VALUE;
    let standing = match &state.control {
        Some(controller) if *controller == faction.id => OWN_CONTROL_VALUE,
        None => UNCONTESTED_VALUE,
        Some(controller) => {
            let grip = state.influence_of(controller.as_str()) * ENEMY_INFLUENCE_PENALTY;
            -ENEMY_CONTROL_PENALTY - grip
        }
    };
    standing + own
}

/// Value of every world for `faction`, in world id order.
pub fn world_values(faction: &Faction, galaxy: &Galaxy) -> BTreeMap<WorldId, f64> {
    galaxy
        .worlds()
        .map(|world| (world.id.clone(), compute_world_value(faction, world, galaxy)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starsim_economy::{Industry, Market};
    use starsim_types::FactionId;
    use starsim_world::{Lane, Planet, WorldFactionState};

    use super::*;

    fn galaxy(worlds: Vec<World>) -> Galaxy {
        Galaxy::from_parts(worlds, []).unwrap()
    }

    fn faction(traits: &[&str]) -> Faction {
        let mut faction = Faction::new("red", "Red");
        faction.traits = traits.iter().map(|t| String::from(*t)).collect();
        faction
    }

    fn state(control: Option<&str>, influence: &[(&str, f64)]) -> WorldFactionState {
        let mut state = WorldFactionState {
            control: control.map(FactionId::from),
            ..WorldFactionState::default()
        };
        for (id, amount) in influence {
            state.add_influence(&FactionId::from(*id), *amount);
        }
        state
    }

    #[test]
    fn bare_world_scores_wellbeing_only() {
        let world = World::new("a", "A");
        let g = galaxy(vec![world.clone()]);
        // stability 5 + prosperity 5, no penalties.
        let value = compute_world_value(&faction(&[]), &world, &g);
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn control_ranks_own_over_open_over_enemy() {
        let red = faction(&[]);
        let mut own = World::new("a", "A");
        own.faction_state = Some(state(Some("red"), &[("red", 0.8)]));
        let mut open = World::new("b", "B");
        open.faction_state = Some(state(None, &[]));
        let mut enemy = World::new("c", "C");
        enemy.faction_state = Some(state(Some("blue"), &[("blue", 0.9)]));
        let g = galaxy(vec![own.clone(), open.clone(), enemy.clone()]);

        let own_value = compute_world_value(&red, &own, &g);
        let open_value = compute_world_value(&red, &open, &g);
        let enemy_value = compute_world_value(&red, &enemy, &g);
        assert!(own_value > open_value);
        assert!(open_value > enemy_value);
        // 10 base - 5 - 0.9 * 10
        assert!((enemy_value - -4.0).abs() < 1e-9);
    }

    #[test]
    fn tags_and_unrest_shift_value() {
        let mut capital = World::new("a", "A");
        capital.tags.insert(String::from(TAG_CAPITAL));
        capital.tags.insert(String::from(TAG_SACRED));
        let mut restless = World::new("b", "B");
        restless.pressures.unrest = 1.0;
        restless.pressures.stability = 0.0;
        let g = galaxy(vec![capital.clone(), restless.clone()]);
        let red = faction(&[]);

        assert!((compute_world_value(&red, &capital, &g) - 90.0).abs() < 1e-9);
        // prosperity 5 - unrest 10 - instability 15
        assert!((compute_world_value(&red, &restless, &g) - -20.0).abs() < 1e-9);
    }

    #[test]
    fn traits_favour_matching_resources() {
        let mut world = World::new("a", "A");
        let mut market = Market::new();
        market.inventory.set(FOOD, 100.0).unwrap();
        world.market = Some(market);
        world.planets.push(Planet {
            kind: String::from("terran"),
            habitability: 0.8,
            resource_potentials: BTreeMap::from([(FOOD.into(), 1.0)]),
            tags: std::collections::BTreeSet::new(),
        });
        let g = galaxy(vec![world.clone()]);

        let plain = compute_world_value(&faction(&[]), &world, &g);
        let expansionist = compute_world_value(&faction(&[TRAIT_EXPANSIONIST]), &world, &g);
        let aggressive = compute_world_value(&faction(&[TRAIT_AGGRESSIVE]), &world, &g);
        assert!(expansionist > plain);
        assert!((aggressive - plain).abs() < 1e-9);
    }

    #[test]
    fn neighbors_industry_and_capital_proximity_add_value() {
        let mut near = World::new("a", "A");
        near.industry = Some(Industry::new());
        let mut capital = World::new("cap", "Capital");
        capital.x = 3.0;
        capital.y = 4.0;
        let lone = World::new("z", "Z");
        let mut g = galaxy(vec![near.clone(), capital, lone.clone()]);
        g.add_lane(Lane::new("l1", "a", "cap")).unwrap();

        let mut red = faction(&[]);
        red.capital_world_id = Some(WorldId::from("cap"));
        let near_value = compute_world_value(&red, &near, &g);
        let lone_value = compute_world_value(&red, &lone, &g);
        // One neighbor (2) plus 20 / (1 + 5) for the capital five units away.
        assert!((near_value - (10.0 + 2.0 + 20.0 / 6.0)).abs() < 1e-9);
        assert!(near_value > lone_value);
    }

    #[test]
    fn world_values_cover_every_world() {
        let g = galaxy(vec![World::new("a", "A"), World::new("b", "B")]);
        let values = world_values(&faction(&[]), &g);
        assert_eq!(values.len(), 2);
        assert!(values.contains_key("a"));
    }
}
