//! The per-tick faction stage.
//!
//! Factions act one at a time in id order. Each selects an action against
//! the galaxy as left by the factions before it, then executes it
//! immediately.

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::json;
use starsim_types::{AuditEntry, FactionId, WorldId, kinds};
use starsim_world::{Faction, Galaxy};
use tracing::debug;

use crate::actions::{ActionOutcome, execute};
use crate::config::FactionConfig;
use crate::error::FactionError;
use crate::policy::{FactionPolicy, ScoredAction};

/// One faction's turn.
#[derive(Debug, Clone, PartialEq)]
pub struct FactionTurn {
    /// Who acted.
    pub faction_id: FactionId,
    /// What they chose.
    pub choice: ScoredAction,
    /// What it did.
    pub outcome: ActionOutcome,
}

impl FactionTurn {
    /// Audit entries for this turn: the action, then any control change.
    pub fn audit_entries(&self, tick: u64) -> Vec<AuditEntry> {
        let action = &self.choice.action;
        let mut entry = AuditEntry::new(kinds::FACTION_ACTION, tick)
            .faction(&self.faction_id)
            .delta(self.outcome.delta)
            .reason(action.name())
            .detail("action", json!(action))
            .detail("applied", self.outcome.applied);
        if let Some(world) = action.target_world() {
            entry = entry.world(world);
        }
        if self.choice.score.is_finite() {
            entry = entry.detail("score", self.choice.score);
        }
        if let Some(investment) = &self.outcome.investment {
            entry = entry.detail("investment", json!(investment));
        }

        let mut entries = vec![entry];
        if let (Some(change), Some(world)) = (&self.outcome.control_change, action.target_world()) {
            let mut changed = AuditEntry::new(kinds::FACTION_CONTROL_CHANGED, tick)
                .world(world)
                .reason(format!(
                    "control {} -> {}",
                    label(change.from.as_ref()),
                    label(change.to.as_ref())
                ))
                .detail("from", json!(change.from))
                .detail("to", json!(change.to));
            if let Some(to) = &change.to {
                changed = changed.faction(to);
            }
            entries.push(changed);
        }
        entries
    }
}

fn label(faction: Option<&FactionId>) -> &str {
    faction.map_or("none", FactionId::as_str)
}

/// Everything the faction stage did in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactionsReport {
    /// Turns in faction id order.
    pub turns: Vec<FactionTurn>,
}

impl FactionsReport {
    /// Worlds whose controller changed this tick, with the new controller.
    pub fn control_changes(&self) -> impl Iterator<Item = (&WorldId, Option<&FactionId>)> {
        self.turns.iter().filter_map(|turn| {
            let change = turn.outcome.control_change.as_ref()?;
            let world = turn.choice.action.target_world()?;
            Some((world, change.to.as_ref()))
        })
    }

    /// Per-turn entries followed by one stage summary.
    pub fn audit_entries(&self, tick: u64) -> Vec<AuditEntry> {
        let mut entries: Vec<AuditEntry> = self
            .turns
            .iter()
            .flat_map(|turn| turn.audit_entries(tick))
            .collect();
        let acted = self.turns.iter().filter(|t| t.outcome.applied).count();
        let reason = if self.turns.is_empty() {
            String::from("no factions")
        } else {
            format!("{acted} of {} faction(s) acted", self.turns.len())
        };
        entries.push(
            AuditEntry::new(kinds::FACTIONS_STEP, tick)
                .reason(reason)
                .detail("factions", self.turns.len())
                .detail("acted", acted)
                .detail("control_changes", self.control_changes().count()),
        );
        entries
    }
}

/// Let every faction choose and execute one action.
pub fn run_factions<P, R>(
    galaxy: &mut Galaxy,
    factions: &BTreeMap<FactionId, Faction>,
    policy: &P,
    config: &FactionConfig,
    rng: &mut R,
    tick: u64,
) -> Result<FactionsReport, FactionError>
where
    P: FactionPolicy + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = FactionsReport::default();
    for faction in factions.values() {
        let choice = policy.select(faction, galaxy);
        let outcome = execute(&faction.id, &choice.action, galaxy, config, rng)?;
        debug!(
            tick,
            faction = %faction.id,
            action = choice.action.name(),
            score = choice.score,
            applied = outcome.applied,
            "faction acted"
        );
        report.turns.push(FactionTurn {
            faction_id: faction.id.clone(),
            choice,
            outcome,
        });
    }
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use starsim_types::LaneId;
    use starsim_world::{Lane, World, WorldFactionState};

    use super::*;
    use crate::actions::FactionAction;
    use crate::policy::GreedyPolicy;

    /// Always raids the first lane.
    struct Raider;

    impl FactionPolicy for Raider {
        fn select(&self, _faction: &Faction, _galaxy: &Galaxy) -> ScoredAction {
            ScoredAction {
                action: FactionAction::RaidLane {
                    lane: LaneId::from("l1"),
                },
                score: 1.0,
            }
        }
    }

    fn galaxy() -> Galaxy {
        let mut home = World::new("home", "Home");
        let mut held = WorldFactionState::default();
        held.add_influence(&FactionId::from("red"), 1.0);
        held.resolve_control();
        home.faction_state = Some(held);
        let mut open = World::new("open", "Open");
        let mut state = WorldFactionState::default();
        state.add_influence(&FactionId::from("red"), 0.65);
        open.faction_state = Some(state);
        Galaxy::from_parts([home, open], [Lane::new("l1", "home", "open")]).unwrap()
    }

    fn factions(ids: &[&str]) -> BTreeMap<FactionId, Faction> {
        ids.iter()
            .map(|id| (FactionId::from(*id), Faction::new(*id, id.to_uppercase())))
            .collect()
    }

    #[test]
    fn greedy_expansion_flips_control_and_is_audited() {
        let mut galaxy = galaxy();
        let mut rng = StdRng::seed_from_u64(1);
        let report = run_factions(
            &mut galaxy,
            &factions(&["red"]),
            &GreedyPolicy,
            &FactionConfig::default(),
            &mut rng,
            4,
        )
        .unwrap();

        assert_eq!(report.turns.len(), 1);
        assert_eq!(
            galaxy.world("open").and_then(World::controller).map(FactionId::as_str),
            Some("red")
        );
        assert_eq!(report.control_changes().count(), 1);

        let entries = report.audit_entries(4);
        let kinds_seen: Vec<&str> = entries.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(
            kinds_seen,
            vec![
                kinds::FACTION_ACTION,
                kinds::FACTION_CONTROL_CHANGED,
                kinds::FACTIONS_STEP
            ]
        );
        assert_eq!(
            entries.first().and_then(|e| e.world_id.as_ref()).map(WorldId::as_str),
            Some("open")
        );
    }

    #[test]
    fn later_factions_see_earlier_actions() {
        let mut galaxy = galaxy();
        let mut rng = StdRng::seed_from_u64(1);
        let report = run_factions(
            &mut galaxy,
            &factions(&["blue", "red"]),
            &Raider,
            &FactionConfig::default(),
            &mut rng,
            0,
        )
        .unwrap();
        let ids: Vec<&str> = report.turns.iter().map(|t| t.faction_id.as_str()).collect();
        assert_eq!(ids, vec!["blue", "red"]);
        let hazard = galaxy.lane("l1").map_or(0.0, |l| l.hazard);
        assert!((hazard - 0.2).abs() < 1e-9);
    }

    #[test]
    fn no_factions_still_summarized() {
        let mut galaxy = galaxy();
        let mut rng = StdRng::seed_from_u64(1);
        let report = run_factions(
            &mut galaxy,
            &BTreeMap::new(),
            &GreedyPolicy,
            &FactionConfig::default(),
            &mut rng,
            0,
        )
        .unwrap();
        let entries = report.audit_entries(0);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries.first().and_then(|e| e.reason.as_deref()),
            Some("no factions")
        );
    }

    #[test]
    fn no_action_has_no_score_detail() {
        let turn = FactionTurn {
            faction_id: FactionId::from("red"),
            choice: ScoredAction::none(),
            outcome: ActionOutcome::default(),
        };
        let entries = turn.audit_entries(0);
        assert_eq!(entries.len(), 1);
        assert!(entries.first().is_some_and(|e| !e.details.contains_key("score")));
    }
}
