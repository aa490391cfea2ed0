//! Tunables for the event roll.

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

const fn default_max_events_per_tick() -> usize {
    1
}

/// How many events may fire per tick, and whether any may.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Whether the event roll runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Upper bound on distinct (event, world) pairs triggered per tick.
    #[serde(default = "default_max_events_per_tick")]
    pub max_events_per_tick: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_events_per_tick: default_max_events_per_tick(),
        }
    }
}
