//! The per-tick event stage.
//!
//! Selection happens against the galaxy as it stands when the stage
//! starts; effects of every selected event are then applied in selection
//! order.

use rand::Rng;
use serde_json::json;
use starsim_types::{AuditEntry, EventId, WorldId, kinds};
use starsim_world::Galaxy;
use tracing::debug;

use crate::config::EventConfig;
use crate::effects::{EffectOutcome, apply_effect};
use crate::error::EventError;
use crate::generator::{candidates, select};
use crate::registry::EventRegistry;

/// One event that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredEvent {
    /// The event.
    pub event_id: EventId,
    /// The world it fired in.
    pub world_id: WorldId,
    /// Weight it was drawn with.
    pub weight: f64,
    /// Effect outcomes in definition order.
    pub effects: Vec<EffectOutcome>,
}

/// Everything the event stage did in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsReport {
    /// Whether the roll ran.
    pub enabled: bool,
    /// How many (world, event) pairs were eligible.
    pub candidates: usize,
    /// Events that fired, in selection order.
    pub triggered: Vec<TriggeredEvent>,
}

impl EventsReport {
    /// One entry per effect of each fired event, or one summary entry
    /// when nothing fired. Effects that changed nothing carry
    /// `applied: false`.
    pub fn audit_entries(&self, tick: u64) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        for event in &self.triggered {
            let base = AuditEntry::new(kinds::EVENT_TRIGGERED, tick)
                .world(&event.world_id)
                .reason(event.event_id.as_str())
                .detail("event_id", json!(event.event_id))
                .detail("weight", event.weight);
            if event.effects.is_empty() {
                entries.push(base);
                continue;
            }
            for outcome in &event.effects {
                entries.push(
                    base.clone()
                        .delta(outcome.delta)
                        .detail("effect", outcome.effect)
                        .detail("applied", !outcome.is_noop())
                        .detail("lane_id", json!(outcome.lane_id))
                        .detail("worlds", json!(outcome.worlds)),
                );
            }
        }
        if entries.is_empty() {
            let reason = if self.enabled {
                "no events triggered"
            } else {
                "events disabled"
            };
            entries.push(
                AuditEntry::new(kinds::EVENTS_ROLL, tick)
                    .reason(reason)
                    .detail("candidates", self.candidates),
            );
        }
        entries
    }
}

/// Select and apply this tick's events.
pub fn roll_events<R: Rng + ?Sized>(
    galaxy: &mut Galaxy,
    registry: &EventRegistry,
    config: &EventConfig,
    rng: &mut R,
    tick: u64,
) -> Result<EventsReport, EventError> {
    if !config.enabled {
        return Ok(EventsReport::default());
    }

    let pool = candidates(galaxy, registry);
    let selected = select(&pool, config.max_events_per_tick, rng);
    let mut report = EventsReport {
        enabled: true,
        candidates: pool.len(),
        triggered: Vec::with_capacity(selected.len()),
    };

    for candidate in selected {
        let event = registry.get(candidate.event_id.as_str())?;
        let mut effects = Vec::with_capacity(event.effects.len());
        for effect in &event.effects {
            effects.push(apply_effect(effect, &candidate.world_id, galaxy, rng)?);
        }
        debug!(
            tick,
            event = %candidate.event_id,
            world = %candidate.world_id,
            weight = candidate.weight,
            effects = effects.len(),
            "event triggered"
        );
        report.triggered.push(TriggeredEvent {
            event_id: candidate.event_id,
            world_id: candidate.world_id,
            weight: candidate.weight,
            effects,
        });
    }
    Ok(report)
}
