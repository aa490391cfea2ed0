//! Tick cycle: the fixed stage sequence that advances the universe.
//!
//! Each call to [`step`] runs these stages in order, every one of them to
//! completion before the next begins:
//!
//! 1. **Consumption** -- every world with a population and a market draws
//!    food, consumer goods, and other needs, updating headcount and
//!    pressures.
//! 2. **Upkeep** -- (only when `economy.energy_upkeep_enabled`) every world
//!    with a population, a market, and industry pays energy for both.
//! 3. **Production** -- every world with industry and a market runs its
//!    recipes.
//! 4. **Trade** -- arbitrage shipments depart under lane capacity, then due
//!    shipments arrive.
//! 5. **Prices** -- every market moves its prices toward equilibrium.
//! 6. **Factions** -- each faction picks and executes one action.
//! 7. **Events** -- weighted events are drawn and their effects applied.
//!
//! The tick counter advances only after the last stage. Every stage appends
//! to the tick's [`AuditLog`], including an explanatory entry for each world
//! that lacks the component a stage needs. All random draws come from one
//! stream derived from `(seed, tick)`, consumed in stage order, so equal
//! states produce equal logs.

use starsim_economy::{
    CommodityRegistry, EconomyError, RecipeRegistry, apply_upkeep, consume, produce,
};
use starsim_events::{EventError, roll_events};
use starsim_factions::{FactionError, GreedyPolicy, run_factions};
use starsim_types::{AuditEntry, AuditLog, WorldId, kinds};
use starsim_world::{Galaxy, World, WorldError, process_trade};
use tracing::{debug, info};

use crate::rng::tick_rng;
use crate::state::UniverseState;

/// Errors that can occur during tick execution.
///
/// Any error is fatal for the tick: the scenario is corrupt and the state
/// may have been partly advanced.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// An economy stage failed (unknown recipe, invalid quantity).
    #[error("economy error: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },

    /// The trade stage failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The faction stage failed.
    #[error("faction error: {source}")]
    Faction {
        /// The underlying faction error.
        #[from]
        source: FactionError,
    },

    /// The event stage failed.
    #[error("event error: {source}")]
    Event {
        /// The underlying event error.
        #[from]
        source: EventError,
    },

    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// The outcome of one [`step`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The tick counter after the step.
    pub tick: u64,
    /// Everything that happened, in stage order.
    pub log: AuditLog,
}

/// Advance `state` by one tick.
///
/// Audit entries carry the tick the stages ran at; the returned report
/// carries the advanced counter.
pub fn step(state: &mut UniverseState) -> Result<TickReport, TickError> {
    let tick = state.tick;
    let next = tick.checked_add(1).ok_or(TickError::TickOverflow)?;
    let mut rng = tick_rng(state.seed, tick);
    let mut log = AuditLog::new();

    consumption_stage(&mut state.galaxy, tick, &mut log)?;
    if state.config.economy.energy_upkeep_enabled {
        upkeep_stage(&mut state.galaxy, tick, &mut log)?;
    }
    production_stage(&mut state.galaxy, &state.recipes, tick, &mut log)?;

    let trade = process_trade(
        &mut state.galaxy,
        &mut state.logistics,
        &state.commodities,
        &state.config.trade,
        tick,
    )?;
    append(&mut log, trade.audit_entries(&state.galaxy, tick));

    price_stage(&mut state.galaxy, &state.commodities, tick, &mut log)?;

    let factions = run_factions(
        &mut state.galaxy,
        &state.factions,
        &GreedyPolicy,
        &state.config.factions,
        &mut rng,
        tick,
    )?;
    append(&mut log, factions.audit_entries(tick));

    let events = roll_events(
        &mut state.galaxy,
        &state.events,
        &state.config.events,
        &mut rng,
        tick,
    )?;
    append(&mut log, events.audit_entries(tick));

    state.tick = next;
    info!(
        tick,
        entries = log.len(),
        shipments_departed = trade.departed.len(),
        shipments_arrived = trade.arrived.len(),
        in_flight = state.logistics.shipments.len(),
        control_changes = factions.control_changes().count(),
        events_triggered = events.triggered.len(),
        "Tick completed"
    );

    Ok(TickReport { tick: next, log })
}

/// Run `ticks` consecutive steps, collecting every report.
///
/// Stops at the first failing tick.
pub fn run_ticks(state: &mut UniverseState, ticks: u64) -> Result<Vec<TickReport>, TickError> {
    (0..ticks).map(|_| step(state)).collect()
}

fn append(log: &mut AuditLog, entries: Vec<AuditEntry>) {
    for entry in entries {
        log.push(entry);
    }
}

fn skipped(kind: &str, tick: u64, world_id: &WorldId, reason: &str) -> AuditEntry {
    AuditEntry::new(kind, tick).world(world_id).reason(reason)
}

fn consumption_stage(galaxy: &mut Galaxy, tick: u64, log: &mut AuditLog) -> Result<(), TickError> {
    for world in galaxy.worlds_mut() {
        let World {
            id,
            pressures,
            market,
            population,
            ..
        } = world;
        let (Some(population), Some(market)) = (population.as_mut(), market.as_mut()) else {
            log.push(skipped(kinds::CONSUMPTION, tick, id, "no population or market"));
            continue;
        };
        let report = consume(population, market, pressures)?;
        debug!(
            tick,
            world = %id,
            population = report.size_after,
            food_shortage = report.food.shortage_ratio,
            consumer_goods_shortage = report.consumer_goods.shortage_ratio,
            "consumption"
        );
        log.push(report.audit_entry(tick, id));
    }
    Ok(())
}

fn upkeep_stage(galaxy: &mut Galaxy, tick: u64, log: &mut AuditLog) -> Result<(), TickError> {
    for world in galaxy.worlds_mut() {
        let World {
            id,
            pressures,
            market,
            population,
            industry,
            ..
        } = world;
        let (Some(population), Some(market), Some(industry)) =
            (population.as_ref(), market.as_mut(), industry.as_mut())
        else {
            log.push(skipped(
                kinds::UPKEEP,
                tick,
                id,
                "no population, market, or industry",
            ));
            continue;
        };
        let report = apply_upkeep(population, industry, market, pressures)?;
        debug!(
            tick,
            world = %id,
            required = report.required,
            deficit_ratio = report.deficit_ratio,
            "upkeep"
        );
        log.push(report.audit_entry(tick, id));
    }
    Ok(())
}

fn production_stage(
    galaxy: &mut Galaxy,
    recipes: &RecipeRegistry,
    tick: u64,
    log: &mut AuditLog,
) -> Result<(), TickError> {
    for world in galaxy.worlds_mut() {
        let World {
            id,
            market,
            industry,
            ..
        } = world;
        let (Some(industry), Some(market)) = (industry.as_ref(), market.as_mut()) else {
            log.push(skipped(kinds::PRODUCTION, tick, id, "no industry or market"));
            continue;
        };
        let report = produce(industry, market, recipes)?;
        debug!(tick, world = %id, units = report.total_units(), "production");
        if report.is_idle() {
            log.push(
                AuditEntry::new(kinds::PRODUCTION, tick)
                    .world(id)
                    .reason("industry idle"),
            );
        } else {
            log.push(report.audit_entry(tick, id));
        }
    }
    Ok(())
}

fn price_stage(
    galaxy: &mut Galaxy,
    commodities: &CommodityRegistry,
    tick: u64,
    log: &mut AuditLog,
) -> Result<(), TickError> {
    for world in galaxy.worlds_mut() {
        let World { id, market, .. } = world;
        let Some(market) = market.as_mut() else {
            log.push(skipped(kinds::PRICES, tick, id, "no market"));
            continue;
        };
        let changes = market.update_prices(commodities)?;
        let mut moved = 0_usize;
        for change in changes.iter().filter(|c| c.delta().abs() > f64::EPSILON) {
            log.push(change.audit_entry(tick, id));
            moved = moved.saturating_add(1);
        }
        if moved == 0 {
            log.push(skipped(kinds::PRICES, tick, id, "prices unchanged"));
        }
    }
    Ok(())
}
