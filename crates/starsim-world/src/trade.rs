//! Inter-world arbitrage and shipment delivery.
//!
//! Each tick the trade stage does three things in order:
//!
//! 1. Reset lane capacity accounting.
//! 2. Scan every lane for price gaps worth shipping across, and dispatch
//!    each candidate that fits the lane's remaining capacity. A candidate
//!    that does not fit is dropped for the tick; it is never split.
//! 3. Deliver every shipment whose ETA has arrived.
//!
//! Goods only move from a world where the commodity trades below its base
//! price to one where it trades above, so trade never drains a scarce
//! source or floods a glutted destination.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use starsim_economy::CommodityRegistry;
use starsim_economy::inventory::EPSILON;
use starsim_economy::market::DEFAULT_TARGET;
use starsim_types::{AuditEntry, CommodityId, WorldId, kinds};
use tracing::{debug, warn};

use crate::error::WorldError;
use crate::galaxy::Galaxy;
use crate::lane::Lane;
use crate::logistics::{Logistics, Shipment};
use crate::world::World;

const fn default_threshold() -> f64 {
    0.1
}

const fn default_batch_size() -> f64 {
    10.0
}

const fn default_distance_cost_factor() -> f64 {
    0.01
}

const fn default_hazard_cost_factor() -> f64 {
    0.05
}

const fn default_allow_new_trades() -> bool {
    true
}

/// Tunables for the trade stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Minimum per-unit profit after shipping cost.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Largest quantity a single shipment may carry.
    #[serde(default = "default_batch_size")]
    pub batch_size: f64,
    /// Shipping cost per unit of distance, as a fraction of base price.
    #[serde(default = "default_distance_cost_factor")]
    pub distance_cost_factor: f64,
    /// Shipping cost per unit of hazard, as a fraction of base price.
    #[serde(default = "default_hazard_cost_factor")]
    pub hazard_cost_factor: f64,
    /// Whether new shipments may be dispatched; arrivals always run.
    #[serde(default = "default_allow_new_trades")]
    pub allow_new_trades: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            batch_size: default_batch_size(),
            distance_cost_factor: default_distance_cost_factor(),
            hazard_cost_factor: default_hazard_cost_factor(),
            allow_new_trades: default_allow_new_trades(),
        }
    }
}

impl TradeConfig {
    /// Per-unit cost of moving goods of `base_price` along `lane`.
    pub fn shipping_cost(&self, base_price: f64, lane: &Lane) -> f64 {
        base_price
            * lane
                .distance
                .mul_add(self.distance_cost_factor, lane.hazard * self.hazard_cost_factor)
    }
}

/// Tick at which a shipment departing at `tick` along `lane` arrives.
pub fn eta_for(tick: u64, lane: &Lane) -> u64 {
    let hops = lane.distance.max(0.0).round();
    // Distances are small positive map units; the float is already integral.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hops = hops as u64;
    tick.saturating_add(hops)
}

/// Quantity of each commodity already heading to each world.
type Incoming = BTreeMap<(WorldId, CommodityId), f64>;

fn incoming_from(shipments: &[Shipment]) -> Incoming {
    let mut incoming = Incoming::new();
    for shipment in shipments {
        reserve(&mut incoming, shipment);
    }
    incoming
}

fn reserve(incoming: &mut Incoming, shipment: &Shipment) {
    *incoming
        .entry((shipment.destination_world_id.clone(), shipment.commodity_id.clone()))
        .or_insert(0.0) += shipment.quantity;
}

/// Target stock of `commodity` at `destination`, less what it holds and
/// what is already on the way. Zero for a world without a market.
fn unmet_demand(destination: &World, commodity: &CommodityId, incoming: &Incoming) -> f64 {
    let Some(market) = destination.market.as_ref() else {
        return 0.0;
    };
    let on_the_way = incoming
        .get(&(destination.id.clone(), commodity.clone()))
        .copied()
        .unwrap_or(0.0);
    let target = market.target(commodity.as_str()).unwrap_or(DEFAULT_TARGET);
    (target - market.inventory.get(commodity.as_str()) - on_the_way).max(0.0)
}

/// Find profitable shipments along every lane, in lane then commodity
/// order.
///
/// Quantity is bounded by source stock, the batch size, and the
/// destination's unmet demand: its target stock minus what it holds and
/// what `in_flight` is already bringing. Candidates do not reserve demand
/// from one another; [`process_trade`] does that as each one departs.
pub fn build_candidate_trades(
    galaxy: &Galaxy,
    in_flight: &[Shipment],
    commodities: &CommodityRegistry,
    config: &TradeConfig,
    tick: u64,
) -> Vec<Shipment> {
    let incoming = incoming_from(in_flight);

    let mut candidates = Vec::new();
    for lane in galaxy.lanes() {
        let (Some(world_a), Some(world_b)) =
            (galaxy.world(lane.a.as_str()), galaxy.world(lane.b.as_str()))
        else {
            continue;
        };
        if world_a.market.is_none() || world_b.market.is_none() {
            continue;
        }

        for commodity in commodities.all() {
            let cost = config.shipping_cost(commodity.base_price, lane);
            for (source, destination) in [(world_a, world_b), (world_b, world_a)] {
                let Some(quantity) = arbitrage(
                    source,
                    destination,
                    &commodity.id,
                    commodity.base_price,
                    cost,
                    &incoming,
                    config,
                ) else {
                    continue;
                };
                candidates.push(Shipment {
                    commodity_id: commodity.id.clone(),
                    quantity,
                    source_world_id: source.id.clone(),
                    destination_world_id: destination.id.clone(),
                    lane_id: lane.id.clone(),
                    eta_tick: eta_for(tick, lane),
                });
            }
        }
    }
    candidates
}

/// Quantity worth shipping from `source` to `destination`, if any.
fn arbitrage(
    source: &World,
    destination: &World,
    commodity: &CommodityId,
    base_price: f64,
    cost: f64,
    incoming: &Incoming,
    config: &TradeConfig,
) -> Option<f64> {
    let from = source.market.as_ref()?;
    let to = destination.market.as_ref()?;
    let source_price = from.price(commodity.as_str())?;
    let destination_price = to.price(commodity.as_str())?;

    let profit = destination_price - source_price - cost;
    if profit <= config.threshold || source_price >= base_price || destination_price <= base_price
    {
        return None;
    }

    let quantity = from
        .inventory
        .get(commodity.as_str())
        .min(config.batch_size)
        .min(unmet_demand(destination, commodity, incoming));
    (quantity > EPSILON).then_some(quantity)
}

/// What one call to [`process_trade`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeReport {
    /// Shipments dispatched this tick, with the quantity actually loaded.
    pub departed: Vec<Shipment>,
    /// Candidates dropped because their lane was full.
    pub dropped: Vec<Shipment>,
    /// Shipments delivered this tick.
    pub arrived: Vec<Shipment>,
    /// Shipments whose destination had no market to receive them.
    pub lost: Vec<Shipment>,
}

impl TradeReport {
    /// One or more audit entries per world, in world id order.
    ///
    /// A world with no departures, arrivals, or drops still gets a summary
    /// entry.
    pub fn audit_entries(&self, galaxy: &Galaxy, tick: u64) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        for world in galaxy.worlds() {
            let id = &world.id;
            let departed: Vec<&Shipment> =
                self.departed.iter().filter(|s| &s.source_world_id == id).collect();
            let arrived: Vec<&Shipment> = self
                .arrived
                .iter()
                .filter(|s| &s.destination_world_id == id)
                .collect();
            let lost: Vec<&Shipment> =
                self.lost.iter().filter(|s| &s.destination_world_id == id).collect();
            let dropped: Vec<&Shipment> =
                self.dropped.iter().filter(|s| &s.source_world_id == id).collect();

            if !departed.is_empty() {
                entries.push(
                    AuditEntry::new(kinds::TRADE_NEW_SHIPMENTS, tick)
                        .world(id)
                        .delta(-departed.iter().map(|s| s.quantity).sum::<f64>())
                        .reason(format!("{} shipment(s) departed", departed.len()))
                        .detail("shipments", shipment_details(&departed)),
                );
            }
            if !arrived.is_empty() || !lost.is_empty() {
                entries.push(
                    AuditEntry::new(kinds::TRADE_ARRIVALS, tick)
                        .world(id)
                        .delta(arrived.iter().map(|s| s.quantity).sum::<f64>())
                        .reason(format!("{} shipment(s) arrived", arrived.len()))
                        .detail("shipments", shipment_details(&arrived))
                        .detail("lost", shipment_details(&lost)),
                );
            }
            for shipment in &dropped {
                entries.push(
                    AuditEntry::new(kinds::TRADE_DROPPED, tick)
                        .world(id)
                        .delta(shipment.quantity)
                        .reason("lane capacity exceeded")
                        .detail("shipments", shipment_details(&[*shipment])),
                );
            }
            if departed.is_empty() && arrived.is_empty() && lost.is_empty() && dropped.is_empty() {
                let reason = if world.market.is_some() {
                    "no trade activity"
                } else {
                    "no market"
                };
                entries.push(AuditEntry::new(kinds::TRADE, tick).world(id).reason(reason));
            }
        }
        entries
    }
}

fn shipment_details(shipments: &[&Shipment]) -> serde_json::Value {
    shipments
        .iter()
        .map(|s| {
            json!({
                "commodity_id": s.commodity_id,
                "quantity": s.quantity,
                "source": s.source_world_id,
                "destination": s.destination_world_id,
                "lane_id": s.lane_id,
                "eta_tick": s.eta_tick,
            })
        })
        .collect()
}

/// Run one tick of trade: dispatch candidates, then deliver arrivals.
pub fn process_trade(
    galaxy: &mut Galaxy,
    logistics: &mut Logistics,
    commodities: &CommodityRegistry,
    config: &TradeConfig,
    tick: u64,
) -> Result<TradeReport, WorldError> {
    let mut report = TradeReport::default();
    logistics.lane_capacity.reset();

    if config.allow_new_trades {
        let candidates =
            build_candidate_trades(galaxy, &logistics.shipments, commodities, config, tick);
        let mut incoming = incoming_from(&logistics.shipments);
        for mut candidate in candidates {
            let destination = galaxy.require_world(candidate.destination_world_id.as_str())?;
            let unmet = unmet_demand(destination, &candidate.commodity_id, &incoming);
            if unmet <= EPSILON {
                continue;
            }
            candidate.quantity = candidate.quantity.min(unmet);

            let capacity = galaxy
                .lane(candidate.lane_id.as_str())
                .map(|lane| lane.capacity)
                .ok_or_else(|| WorldError::LaneNotFound(candidate.lane_id.clone()))?;
            let remaining = logistics
                .lane_capacity
                .remaining(candidate.lane_id.as_str(), capacity);
            if candidate.quantity > remaining {
                warn!(
                    tick,
                    lane = %candidate.lane_id,
                    quantity = candidate.quantity,
                    remaining,
                    "shipment dropped: lane capacity exceeded"
                );
                report.dropped.push(candidate);
                continue;
            }

            let source = galaxy.require_world_mut(candidate.source_world_id.as_str())?;
            let Some(market) = source.market.as_mut() else {
                continue;
            };
            let loaded = market
                .inventory
                .remove_clamped(candidate.commodity_id.as_str(), candidate.quantity)?;
            if loaded <= EPSILON {
                continue;
            }
            candidate.quantity = loaded;
            reserve(&mut incoming, &candidate);
            logistics.lane_capacity.add_used(&candidate.lane_id, loaded);
            logistics.shipments.push(candidate.clone());
            report.departed.push(candidate);
        }
    }

    let (due, pending): (Vec<Shipment>, Vec<Shipment>) = core::mem::take(&mut logistics.shipments)
        .into_iter()
        .partition(|s| s.is_due(tick));
    logistics.shipments = pending;
    for shipment in due {
        let destination = galaxy.require_world_mut(shipment.destination_world_id.as_str())?;
        if let Some(market) = destination.market.as_mut() {
            market
                .inventory
                .add(shipment.commodity_id.as_str(), shipment.quantity)?;
            report.arrived.push(shipment);
        } else {
            warn!(
                tick,
                world = %shipment.destination_world_id,
                commodity = %shipment.commodity_id,
                "shipment lost: destination has no market"
            );
            report.lost.push(shipment);
        }
    }

    debug!(
        tick,
        departed = report.departed.len(),
        dropped = report.dropped.len(),
        arrived = report.arrived.len(),
        in_flight = logistics.shipments.len(),
        "trade resolved"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use starsim_economy::Market;
    use starsim_types::LaneId;

    use super::*;

    fn commodities() -> CommodityRegistry {
        CommodityRegistry::parse(
            "
- id: food
  base_price: 10.0
",
        )
        .unwrap_or_default()
    }

    fn market(price: f64, stock: f64) -> Market {
        let mut market = Market::new();
        market.prices.insert(CommodityId::from("food"), price);
        let _ = market.inventory.set("food", stock);
        market
    }

    fn pair(price_a: f64, stock_a: f64, price_b: f64, stock_b: f64, capacity: f64) -> Galaxy {
        let mut a = World::new("a", "A");
        a.market = Some(market(price_a, stock_a));
        let mut b = World::new("b", "B");
        b.market = Some(market(price_b, stock_b));
        let mut lane = Lane::new("l-ab", "a", "b");
        lane.capacity = capacity;
        Galaxy::from_parts([a, b], [lane]).unwrap_or_default()
    }

    #[test]
    fn cheap_to_dear_yields_one_shipment() {
        let galaxy = pair(8.0, 50.0, 15.0, 0.0, 100.0);
        let candidates =
            build_candidate_trades(&galaxy, &[], &commodities(), &TradeConfig::default(), 3);
        assert_eq!(candidates.len(), 1);
        let shipment = candidates.first();
        assert_eq!(shipment.map(|s| s.source_world_id.as_str()), Some("a"));
        assert_eq!(shipment.map(|s| s.destination_world_id.as_str()), Some("b"));
        assert!(shipment.is_some_and(|s| (s.quantity - 10.0).abs() < f64::EPSILON));
        assert_eq!(shipment.map(|s| s.eta_tick), Some(4));
    }

    #[test]
    fn quantity_bounded_by_source_stock() {
        let galaxy = pair(8.0, 4.0, 15.0, 0.0, 100.0);
        let candidates =
            build_candidate_trades(&galaxy, &[], &commodities(), &TradeConfig::default(), 0);
        assert!(candidates.first().is_some_and(|s| (s.quantity - 4.0).abs() < f64::EPSILON));
    }

    #[test]
    fn quantity_bounded_by_unmet_demand_and_in_flight() {
        let galaxy = pair(8.0, 50.0, 15.0, 3.0, 100.0);
        let in_flight = [Shipment {
            commodity_id: CommodityId::from("food"),
            quantity: 5.0,
            source_world_id: WorldId::from("a"),
            destination_world_id: WorldId::from("b"),
            lane_id: LaneId::from("l-ab"),
            eta_tick: 9,
        }];
        let candidates = build_candidate_trades(
            &galaxy,
            &in_flight,
            &commodities(),
            &TradeConfig::default(),
            0,
        );
        // target 10 - stock 3 - incoming 5
        assert!(candidates.first().is_some_and(|s| (s.quantity - 2.0).abs() < 1e-9));
    }

    #[test]
    fn no_trade_when_both_sides_above_base() {
        let galaxy = pair(12.0, 50.0, 19.0, 0.0, 100.0);
        let candidates =
            build_candidate_trades(&galaxy, &[], &commodities(), &TradeConfig::default(), 0);
        assert!(candidates.is_empty());
    }

    #[test]
    fn no_trade_when_margin_below_threshold() {
        let galaxy = pair(9.95, 50.0, 10.1, 0.0, 100.0);
        let candidates =
            build_candidate_trades(&galaxy, &[], &commodities(), &TradeConfig::default(), 0);
        assert!(candidates.is_empty());
    }

    #[test]
    fn oversized_candidate_is_dropped_not_split() {
        let mut galaxy = pair(8.0, 50.0, 15.0, 0.0, 5.0);
        let mut logistics = Logistics::default();
        let report = process_trade(
            &mut galaxy,
            &mut logistics,
            &commodities(),
            &TradeConfig::default(),
            0,
        )
        .unwrap_or_default();
        assert!(report.departed.is_empty());
        assert_eq!(report.dropped.len(), 1);
        assert!(logistics.shipments.is_empty());
        assert!((galaxy.world("a").map_or(0.0, |w| w.stock("food")) - 50.0).abs() < 1e-9);

        let entries = report.audit_entries(&galaxy, 0);
        assert!(entries.iter().any(|e| e.kind == kinds::TRADE_DROPPED));
    }

    /// `a` and `c` both sell cheap food to `b`; `l-ab` is too narrow for a
    /// batch, `l-cb` is wide.
    fn two_suppliers(narrow: f64) -> Galaxy {
        let mut a = World::new("a", "A");
        a.market = Some(market(8.0, 50.0));
        let mut b = World::new("b", "B");
        b.market = Some(market(15.0, 0.0));
        let mut c = World::new("c", "C");
        c.market = Some(market(8.0, 50.0));
        let mut ab = Lane::new("l-ab", "a", "b");
        ab.capacity = narrow;
        let mut cb = Lane::new("l-cb", "c", "b");
        cb.capacity = 100.0;
        Galaxy::from_parts([a, b, c], [ab, cb]).unwrap_or_default()
    }

    #[test]
    fn candidates_do_not_reserve_demand_from_each_other() {
        let galaxy = two_suppliers(1.0);
        let candidates =
            build_candidate_trades(&galaxy, &[], &commodities(), &TradeConfig::default(), 0);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|s| (s.quantity - 10.0).abs() < 1e-9));
    }

    #[test]
    fn dropped_candidate_leaves_demand_for_another_lane() {
        let mut galaxy = two_suppliers(1.0);
        let mut logistics = Logistics::default();
        let report = process_trade(
            &mut galaxy,
            &mut logistics,
            &commodities(),
            &TradeConfig::default(),
            0,
        )
        .unwrap_or_default();
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.departed.len(), 1);
        let departed = report.departed.first();
        assert_eq!(departed.map(|s| s.lane_id.as_str()), Some("l-cb"));
        assert!(departed.is_some_and(|s| (s.quantity - 10.0).abs() < 1e-9));
        assert!((galaxy.world("c").map_or(0.0, |w| w.stock("food")) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn departed_shipment_reserves_demand_for_later_candidates() {
        let mut galaxy = two_suppliers(100.0);
        let mut logistics = Logistics::default();
        let report = process_trade(
            &mut galaxy,
            &mut logistics,
            &commodities(),
            &TradeConfig::default(),
            0,
        )
        .unwrap_or_default();
        // b wants 10; the l-ab shipment covers it, so c sends nothing.
        assert_eq!(report.departed.len(), 1);
        assert!(report.dropped.is_empty());
        assert_eq!(report.departed.first().map(|s| s.lane_id.as_str()), Some("l-ab"));
        assert!((galaxy.world("c").map_or(0.0, |w| w.stock("food")) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn shipment_departs_then_arrives_at_eta() {
        let mut galaxy = pair(8.0, 50.0, 15.0, 0.0, 100.0);
        let mut logistics = Logistics::default();
        let config = TradeConfig::default();

        let first = process_trade(&mut galaxy, &mut logistics, &commodities(), &config, 0)
            .unwrap_or_default();
        assert_eq!(first.departed.len(), 1);
        assert!(first.arrived.is_empty());
        assert_eq!(logistics.shipments.len(), 1);
        assert!((logistics.lane_capacity.used("l-ab") - 10.0).abs() < 1e-9);
        assert!((galaxy.world("a").map_or(0.0, |w| w.stock("food")) - 40.0).abs() < 1e-9);

        let no_new = TradeConfig {
            allow_new_trades: false,
            ..TradeConfig::default()
        };
        let second = process_trade(&mut galaxy, &mut logistics, &commodities(), &no_new, 1)
            .unwrap_or_default();
        assert_eq!(second.arrived.len(), 1);
        assert!(logistics.shipments.is_empty());
        assert!(logistics.lane_capacity.used("l-ab").abs() < f64::EPSILON);
        assert!((galaxy.world("b").map_or(0.0, |w| w.stock("food")) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_shared_across_commodities_on_a_lane() {
        let commodities = CommodityRegistry::parse(
            "
- id: food
  base_price: 10.0
- id: ore
  base_price: 10.0
",
        )
        .unwrap_or_default();
        let mut galaxy = pair(8.0, 50.0, 15.0, 0.0, 15.0);
        for id in ["a", "b"] {
            if let Some(market) = galaxy.world_mut(id).and_then(|w| w.market.as_mut()) {
                let price = market.price("food").unwrap_or(10.0);
                market.prices.insert(CommodityId::from("ore"), price);
                let stock = market.inventory.get("food");
                let _ = market.inventory.set("ore", stock);
            }
        }
        let mut logistics = Logistics::default();
        let report = process_trade(
            &mut galaxy,
            &mut logistics,
            &commodities,
            &TradeConfig::default(),
            0,
        )
        .unwrap_or_default();
        assert_eq!(report.departed.len(), 1);
        assert_eq!(report.dropped.len(), 1);
        assert!(logistics.lane_capacity.used("l-ab") <= 15.0);
    }

    #[test]
    fn every_world_gets_a_trade_entry() {
        let mut galaxy = pair(10.0, 0.0, 10.0, 0.0, 10.0);
        assert!(galaxy.add_world(World::new("c", "C")).is_ok());
        let mut logistics = Logistics::default();
        let report = process_trade(
            &mut galaxy,
            &mut logistics,
            &commodities(),
            &TradeConfig::default(),
            0,
        )
        .unwrap_or_default();
        let entries = report.audit_entries(&galaxy, 0);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.kind == kinds::TRADE));
        assert_eq!(
            entries.last().and_then(|e| e.reason.as_deref()),
            Some("no market")
        );
    }

    #[test]
    fn delivery_to_marketless_world_is_lost() {
        let mut galaxy = pair(8.0, 50.0, 15.0, 0.0, 100.0);
        let mut logistics = Logistics::default();
        logistics.shipments.push(Shipment {
            commodity_id: CommodityId::from("food"),
            quantity: 2.0,
            source_world_id: WorldId::from("a"),
            destination_world_id: WorldId::from("b"),
            lane_id: LaneId::from("l-ab"),
            eta_tick: 0,
        });
        if let Some(world) = galaxy.world_mut("b") {
            world.market = None;
        }
        let config = TradeConfig {
            allow_new_trades: false,
            ..TradeConfig::default()
        };
        let report = process_trade(&mut galaxy, &mut logistics, &commodities(), &config, 0)
            .unwrap_or_default();
        assert_eq!(report.lost.len(), 1);
        assert!(report.arrived.is_empty());
    }
}
