//! Read-only lookup of event definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::EventId;

use crate::error::EventError;
use crate::model::EventDef;

/// Every event that may fire, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EventDef>", into = "Vec<EventDef>")]
pub struct EventRegistry {
    events: BTreeMap<EventId, EventDef>,
}

impl EventRegistry {
    /// Build a registry from a list, rejecting duplicates, negative or
    /// non-finite weights, and effects that can never apply.
    pub fn from_events(events: impl IntoIterator<Item = EventDef>) -> Result<Self, EventError> {
        let mut map = BTreeMap::new();
        for event in events {
            if !(event.base_weight.is_finite() && event.base_weight >= 0.0) {
                return Err(EventError::InvalidEffect {
                    reason: format!("base_weight must be non-negative, got {}", event.base_weight),
                    event: event.id,
                });
            }
            if let Some(reason) = event.effects.iter().find_map(|e| e.invalid_reason()) {
                return Err(EventError::InvalidEffect {
                    event: event.id,
                    reason,
                });
            }
            if map.contains_key(&event.id) {
                return Err(EventError::DuplicateEvent(event.id));
            }
            map.insert(event.id.clone(), event);
        }
        Ok(Self { events: map })
    }

    /// Parse a YAML list of events.
    pub fn parse(yaml: &str) -> Result<Self, EventError> {
        let list: Vec<EventDef> = serde_yml::from_str(yaml)?;
        Self::from_events(list)
    }

    /// Look up an event by id.
    pub fn get(&self, id: &str) -> Result<&EventDef, EventError> {
        self.events
            .get(id)
            .ok_or_else(|| EventError::UnknownEvent(EventId::from(id)))
    }

    /// All events in id order.
    pub fn all(&self) -> impl Iterator<Item = &EventDef> {
        self.events.values()
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TryFrom<Vec<EventDef>> for EventRegistry {
    type Error = EventError;

    fn try_from(list: Vec<EventDef>) -> Result<Self, Self::Error> {
        Self::from_events(list)
    }
}

impl From<EventRegistry> for Vec<EventDef> {
    fn from(registry: EventRegistry) -> Self {
        registry.events.into_values().collect()
    }
}
