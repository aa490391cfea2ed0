//! Faction actions and their effect on the galaxy.
//!
//! Every action a faction can take is a [`FactionAction`] variant naming
//! its target. [`execute`] applies one action and reports what it changed
//! as an [`ActionOutcome`].
//!
//! | Action             | Effect                                              |
//! |--------------------|-----------------------------------------------------|
//! | `expand_influence` | Add influence in a world, then re-resolve control   |
//! | `reinforce`        | Add garrison in a world                             |
//! | `raid_lane`        | Raise a lane's hazard                               |
//! | `patrol_lane`      | Lower a lane's hazard                               |
//! | `aid_world`        | Raise a world's stability and prosperity            |
//! | `invest_civilian`  | Spend minerals to grow a civilian recipe            |
//! | `invest_military`  | Spend alloy to grow a military recipe               |

use rand::Rng;
use serde::{Deserialize, Serialize};
use starsim_economy::{InvestmentKind, InvestmentOutcome, Pressure, invest};
use starsim_types::{FactionId, LaneId, WorldId};
use starsim_world::{ControlChange, Galaxy, World};

use crate::config::FactionConfig;
use crate::error::FactionError;

/// One thing a faction may do in a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactionAction {
    /// Nothing worth doing.
    NoAction,
    /// Grow influence in a world.
    ExpandInfluence {
        /// Target world.
        world: WorldId,
    },
    /// Station troops in a world.
    Reinforce {
        /// Target world.
        world: WorldId,
    },
    /// Make a lane more dangerous.
    RaidLane {
        /// Target lane.
        lane: LaneId,
    },
    /// Make a lane safer.
    PatrolLane {
        /// Target lane.
        lane: LaneId,
    },
    /// Support a world's stability and prosperity.
    AidWorld {
        /// Target world.
        world: WorldId,
    },
    /// Civilian capital formation in an owned world.
    InvestCivilian {
        /// Target world.
        world: WorldId,
    },
    /// Military capital formation in an owned world.
    InvestMilitary {
        /// Target world.
        world: WorldId,
    },
}

impl FactionAction {
    /// Stable action name used in audit entries.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::ExpandInfluence { .. } => "expand_influence",
            Self::Reinforce { .. } => "reinforce",
            Self::RaidLane { .. } => "raid_lane",
            Self::PatrolLane { .. } => "patrol_lane",
            Self::AidWorld { .. } => "aid_world",
            Self::InvestCivilian { .. } => "invest_civilian",
            Self::InvestMilitary { .. } => "invest_military",
        }
    }

    /// The world the action targets, if any.
    pub const fn target_world(&self) -> Option<&WorldId> {
        match self {
            Self::ExpandInfluence { world }
            | Self::Reinforce { world }
            | Self::AidWorld { world }
            | Self::InvestCivilian { world }
            | Self::InvestMilitary { world } => Some(world),
            Self::NoAction | Self::RaidLane { .. } | Self::PatrolLane { .. } => None,
        }
    }

    /// The lane the action targets, if any.
    pub const fn target_lane(&self) -> Option<&LaneId> {
        match self {
            Self::RaidLane { lane } | Self::PatrolLane { lane } => Some(lane),
            _ => None,
        }
    }
}

/// What executing an action changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    /// Whether the action had any effect.
    pub applied: bool,
    /// Size of the primary change (influence, garrison, hazard, stability,
    /// or stock spent).
    pub delta: f64,
    /// Control movement caused by an influence change.
    pub control_change: Option<ControlChange>,
    /// Investment result for `invest_*` actions.
    pub investment: Option<InvestmentOutcome>,
}

impl ActionOutcome {
    const fn applied(delta: f64) -> Self {
        Self {
            applied: true,
            delta,
            control_change: None,
            investment: None,
        }
    }
}

fn world_mut<'a>(galaxy: &'a mut Galaxy, id: &WorldId) -> Result<&'a mut World, FactionError> {
    galaxy
        .world_mut(id.as_str())
        .ok_or_else(|| FactionError::WorldNotFound(id.clone()))
}

/// Apply `action` on behalf of `faction`.
///
/// Investments in a world lacking a market or industry do nothing.
/// Influence and garrison changes require the target world to carry
/// faction state.
pub fn execute<R: Rng + ?Sized>(
    faction: &FactionId,
    action: &FactionAction,
    galaxy: &mut Galaxy,
    config: &FactionConfig,
    rng: &mut R,
) -> Result<ActionOutcome, FactionError> {
    match action {
        FactionAction::NoAction => Ok(ActionOutcome::default()),
        FactionAction::ExpandInfluence { world } => {
            let state = world_mut(galaxy, world)?
                .faction_state
                .as_mut()
                .ok_or_else(|| FactionError::MissingFactionState(world.clone()))?;
            state.add_influence(faction, config.influence_increment);
            Ok(ActionOutcome {
                control_change: state.resolve_control(),
                ..ActionOutcome::applied(config.influence_increment)
            })
        }
        FactionAction::Reinforce { world } => {
            world_mut(galaxy, world)?
                .faction_state
                .as_mut()
                .ok_or_else(|| FactionError::MissingFactionState(world.clone()))?
                .add_garrison(faction, config.reinforce_garrison);
            Ok(ActionOutcome::applied(config.reinforce_garrison))
        }
        FactionAction::RaidLane { lane } | FactionAction::PatrolLane { lane } => {
            let step = if matches!(action, FactionAction::RaidLane { .. }) {
                config.raid_hazard_step
            } else {
                -config.patrol_hazard_step
            };
            let applied = galaxy
                .lane_mut(lane.as_str())
                .ok_or_else(|| FactionError::LaneNotFound(lane.clone()))?
                .adjust_hazard(step);
            Ok(ActionOutcome::applied(applied))
        }
        FactionAction::AidWorld { world } => {
            let pressures = &mut world_mut(galaxy, world)?.pressures;
            let stability = pressures.adjust(Pressure::Stability, config.aid_step);
            pressures.adjust(Pressure::Prosperity, config.aid_step);
            Ok(ActionOutcome::applied(stability))
        }
        FactionAction::InvestCivilian { world } => {
            invest_in(InvestmentKind::Civilian, world_mut(galaxy, world)?, rng)
        }
        FactionAction::InvestMilitary { world } => {
            invest_in(InvestmentKind::Military, world_mut(galaxy, world)?, rng)
        }
    }
}

fn invest_in<R: Rng + ?Sized>(
    kind: InvestmentKind,
    world: &mut World,
    rng: &mut R,
) -> Result<ActionOutcome, FactionError> {
    let (Some(market), Some(industry)) = (world.market.as_mut(), world.industry.as_mut()) else {
        return Ok(ActionOutcome::default());
    };
    let outcome = invest(kind, industry, market, rng)?;
    Ok(ActionOutcome {
        applied: outcome.spent > 0.0,
        delta: -outcome.spent,
        control_change: None,
        investment: Some(outcome),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use starsim_economy::commodity::well_known::{ALLOY, MINERALS};
    use starsim_economy::recipe::well_known::{FARM_FOOD, REFINE_ALLOY};
    use starsim_economy::{Industry, Market};
    use starsim_world::{Lane, WorldFactionState};

    use super::*;

    fn red() -> FactionId {
        FactionId::from("red")
    }

    fn fixture() -> Galaxy {
        let mut contested = World::new("a", "A");
        contested.faction_state = Some(WorldFactionState::default());
        let mut industrial = World::new("b", "B");
        let mut market = Market::new();
        market.inventory.set(MINERALS, 25.0).unwrap();
        market.inventory.set(ALLOY, 2.0).unwrap();
        industrial.market = Some(market);
        let mut industry = Industry::new();
        industry.caps.insert(FARM_FOOD.into(), 3.0);
        industry.caps.insert(REFINE_ALLOY.into(), 1.0);
        industrial.industry = Some(industry);
        Galaxy::from_parts([contested, industrial], [Lane::new("l1", "a", "b")]).unwrap()
    }

    fn run(galaxy: &mut Galaxy, action: &FactionAction) -> Result<ActionOutcome, FactionError> {
        let mut rng = StdRng::seed_from_u64(7);
        execute(&red(), action, galaxy, &FactionConfig::default(), &mut rng)
    }

    #[test]
    fn expand_influence_takes_control_at_threshold() {
        let mut galaxy = fixture();
        let action = FactionAction::ExpandInfluence {
            world: WorldId::from("a"),
        };
        for _ in 0..6 {
            let outcome = run(&mut galaxy, &action).unwrap();
            assert!(outcome.control_change.is_none());
        }
        let outcome = run(&mut galaxy, &action).unwrap();
        assert_eq!(outcome.control_change.and_then(|c| c.to), Some(red()));
        assert_eq!(
            galaxy.world("a").and_then(World::controller),
            Some(&red())
        );
    }

    #[test]
    fn reinforce_adds_garrison() {
        let mut galaxy = fixture();
        let action = FactionAction::Reinforce {
            world: WorldId::from("a"),
        };
        run(&mut galaxy, &action).unwrap();
        let garrison = galaxy
            .world("a")
            .and_then(|w| w.faction_state.as_ref())
            .map_or(0.0, |s| s.garrison_of("red"));
        assert!((garrison - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn influence_needs_faction_state() {
        let mut galaxy = fixture();
        let action = FactionAction::ExpandInfluence {
            world: WorldId::from("b"),
        };
        assert!(matches!(
            run(&mut galaxy, &action),
            Err(FactionError::MissingFactionState(_))
        ));
    }

    #[test]
    fn raid_and_patrol_move_hazard_within_bounds() {
        let mut galaxy = fixture();
        let lane = LaneId::from("l1");
        let patrol = run(&mut galaxy, &FactionAction::PatrolLane { lane: lane.clone() }).unwrap();
        assert!(patrol.delta.abs() < f64::EPSILON);

        run(&mut galaxy, &FactionAction::RaidLane { lane: lane.clone() }).unwrap();
        run(&mut galaxy, &FactionAction::PatrolLane { lane }).unwrap();
        let hazard = galaxy.lane("l1").map_or(0.0, |l| l.hazard);
        assert!((hazard - 0.05).abs() < 1e-9);
    }

    #[test]
    fn unknown_targets_are_errors() {
        let mut galaxy = fixture();
        assert!(matches!(
            run(&mut galaxy, &FactionAction::RaidLane { lane: LaneId::from("nope") }),
            Err(FactionError::LaneNotFound(_))
        ));
        assert!(matches!(
            run(&mut galaxy, &FactionAction::AidWorld { world: WorldId::from("nope") }),
            Err(FactionError::WorldNotFound(_))
        ));
    }

    #[test]
    fn aid_raises_pressures_clamped() {
        let mut galaxy = fixture();
        if let Some(world) = galaxy.world_mut("a") {
            world.pressures.stability = 0.5;
        }
        let outcome = run(&mut galaxy, &FactionAction::AidWorld { world: WorldId::from("a") })
            .unwrap();
        assert!((outcome.delta - 0.05).abs() < 1e-9);
        let pressures = galaxy.world("a").map(|w| w.pressures.clone()).unwrap();
        assert!((pressures.stability - 0.55).abs() < 1e-9);
        assert!((pressures.prosperity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn civilian_investment_spends_minerals() {
        let mut galaxy = fixture();
        let outcome = run(
            &mut galaxy,
            &FactionAction::InvestCivilian {
                world: WorldId::from("b"),
            },
        )
        .unwrap();
        assert!(outcome.applied);
        assert!((outcome.delta - -10.0).abs() < f64::EPSILON);
        let world = galaxy.world("b").unwrap();
        assert!((world.stock(MINERALS) - 15.0).abs() < 1e-9);
        let cap = world.industry.as_ref().map_or(0.0, |i| i.cap(FARM_FOOD));
        assert!((cap - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unaffordable_or_componentless_investment_does_nothing() {
        let mut galaxy = fixture();
        let military = run(
            &mut galaxy,
            &FactionAction::InvestMilitary {
                world: WorldId::from("b"),
            },
        )
        .unwrap();
        assert!(!military.applied);

        let bare = run(
            &mut galaxy,
            &FactionAction::InvestCivilian {
                world: WorldId::from("a"),
            },
        )
        .unwrap();
        assert_eq!(bare, ActionOutcome::default());
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = FactionAction::RaidLane {
            lane: LaneId::from("l1"),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"type":"raid_lane","lane":"l1"}"#);
        assert_eq!(action.name(), "raid_lane");
        assert_eq!(action.target_lane().map(LaneId::as_str), Some("l1"));
        assert!(action.target_world().is_none());
    }
}
