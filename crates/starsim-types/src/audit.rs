//! The audit trail: an append-only record of everything a tick changed.
//!
//! Every stage of the tick pipeline appends one or more [`AuditEntry`]
//! values to the [`AuditLog`] owned by that tick's report. The log is the
//! only observable record of what happened; report generators and the
//! visualizer format it, persistence serializes it, and the determinism
//! guarantee is stated in terms of it (same seed, same content, same log).
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or removed.
//! - **Flat**: one ordered list per tick, in stage order.
//! - **Structured**: free-form `details` use [`serde_json::Value`] so the
//!   entry shape stays fixed while stages report what is relevant to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{FactionId, WorldId};

/// Entry type strings emitted by the tick pipeline, in stage order.
pub mod kinds {
    /// A world without population or market skipped consumption.
    pub const CONSUMPTION: &str = "economy.consumption";
    /// Consumption outcome for a world with population and market.
    pub const CONSUMPTION_IMPACT: &str = "economy.consumption.impact";
    /// Energy upkeep outcome for a world.
    pub const UPKEEP: &str = "economy.upkeep";
    /// A world without industry or market skipped production.
    pub const PRODUCTION: &str = "economy.production";
    /// Net inventory changes caused by production in a world.
    pub const PRODUCTION_OUTPUT: &str = "economy.production.output";
    /// Trade stage summary when nothing departed or arrived.
    pub const TRADE: &str = "economy.trade";
    /// Shipments that departed this tick.
    pub const TRADE_NEW_SHIPMENTS: &str = "economy.trade.new_shipments";
    /// Shipments that reached their destination this tick.
    pub const TRADE_ARRIVALS: &str = "economy.trade.arrivals";
    /// A candidate shipment dropped because its lane was full.
    pub const TRADE_DROPPED: &str = "economy.trade.dropped";
    /// A world without a market skipped price discovery.
    pub const PRICES: &str = "economy.prices";
    /// One commodity price moved in one world.
    pub const PRICES_UPDATE: &str = "economy.prices.update";
    /// The action a faction chose and executed.
    pub const FACTION_ACTION: &str = "factions.action";
    /// Control of a world changed hands.
    pub const FACTION_CONTROL_CHANGED: &str = "factions.control_changed";
    /// Faction stage summary.
    pub const FACTIONS_STEP: &str = "factions.step";
    /// One effect of a triggered event was applied.
    pub const EVENT_TRIGGERED: &str = "event.triggered";
    /// Event roll summary when nothing triggered.
    pub const EVENTS_ROLL: &str = "events.roll";
}

/// One structured record of something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AuditEntry {
    /// Dotted entry type, one of [`kinds`].
    #[serde(rename = "type")]
    pub kind: String,
    /// The tick during which the entry was recorded.
    pub tick: u64,
    /// The world the entry concerns, if any.
    pub world_id: Option<WorldId>,
    /// The faction the entry concerns, if any.
    pub faction_id: Option<FactionId>,
    /// Primary numeric change (price delta, population delta, ...).
    pub delta: f64,
    /// Human-readable explanation.
    pub reason: Option<String>,
    /// Stage-specific structured payload.
    pub details: BTreeMap<String, serde_json::Value>,
}

impl AuditEntry {
    /// Start a new entry of the given type at the given tick.
    pub fn new(kind: &str, tick: u64) -> Self {
        Self {
            kind: kind.to_owned(),
            tick,
            world_id: None,
            faction_id: None,
            delta: 0.0,
            reason: None,
            details: BTreeMap::new(),
        }
    }

    /// Attach the world this entry concerns.
    #[must_use]
    pub fn world(mut self, world_id: &WorldId) -> Self {
        self.world_id = Some(world_id.clone());
        self
    }

    /// Attach the faction this entry concerns.
    #[must_use]
    pub fn faction(mut self, faction_id: &FactionId) -> Self {
        self.faction_id = Some(faction_id.clone());
        self
    }

    /// Set the primary numeric change.
    #[must_use]
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Set the human-readable explanation.
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Add one structured detail.
    #[must_use]
    pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_owned(), value.into());
        self
    }
}

/// Ordered, append-only list of [`AuditEntry`] values for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AuditLog(Vec<AuditEntry>);

impl AuditLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry.
    pub fn push(&mut self, entry: AuditEntry) {
        self.0.push(entry);
    }

    /// Append every entry from another log, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.0
    }

    /// Return the number of entries.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the log has no entries.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries of one type.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a AuditEntry> + 'a {
        self.0.iter().filter(move |e| e.kind == kind)
    }

    /// Consume the log, returning its entries.
    pub fn into_entries(self) -> Vec<AuditEntry> {
        self.0
    }
}
