//! Commodity stockpiles held by a world's market.
//!
//! An [`Inventory`] maps commodity ids to non-negative quantities. The only
//! way to take goods out is [`Inventory::remove_clamped`], which never
//! removes more than is present, so a quantity can never go negative no
//! matter how greedy the caller is. Quantities that fall below
//! [`EPSILON`] are dropped from the map and read back as zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starsim_types::CommodityId;

use crate::error::EconomyError;

/// Quantities below this threshold are treated as absent.
pub const EPSILON: f64 = 1e-9;

/// Reject negative and non-finite quantities at the call boundary.
fn validate(commodity: &str, quantity: f64) -> Result<(), EconomyError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(())
    } else {
        Err(EconomyError::NegativeQuantity {
            commodity: commodity.to_owned(),
            quantity,
        })
    }
}

/// Non-negative commodity quantities, ordered by commodity id.
///
/// Deserializing goes through the same validation as [`Inventory::set`],
/// so a scenario or snapshot cannot smuggle in negative stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<CommodityId, f64>",
    into = "BTreeMap<CommodityId, f64>"
)]
pub struct Inventory {
    items: BTreeMap<CommodityId, f64>,
}

impl Inventory {
    /// Create an empty inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Quantity held of `commodity`, or `0.0` if absent.
    pub fn get(&self, commodity: &str) -> f64 {
        self.items.get(commodity).copied().unwrap_or(0.0)
    }

    /// Add `quantity` units of `commodity`.
    pub fn add(&mut self, commodity: &str, quantity: f64) -> Result<(), EconomyError> {
        validate(commodity, quantity)?;
        let next = self.get(commodity) + quantity;
        self.store(commodity, next);
        Ok(())
    }

    /// Remove up to `quantity` units of `commodity`.
    ///
    /// Returns the amount actually removed, which is `min(quantity, held)`.
    pub fn remove_clamped(&mut self, commodity: &str, quantity: f64) -> Result<f64, EconomyError> {
        validate(commodity, quantity)?;
        let held = self.get(commodity);
        let removed = quantity.min(held);
        self.store(commodity, held - removed);
        Ok(removed)
    }

    /// Overwrite the quantity of `commodity`.
    pub fn set(&mut self, commodity: &str, quantity: f64) -> Result<(), EconomyError> {
        validate(commodity, quantity)?;
        self.store(commodity, quantity);
        Ok(())
    }

    /// Iterate over `(commodity, quantity)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&CommodityId, f64)> {
        self.items.iter().map(|(id, qty)| (id, *qty))
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn store(&mut self, commodity: &str, quantity: f64) {
        if quantity < EPSILON {
            self.items.remove(commodity);
        } else if let Some(slot) = self.items.get_mut(commodity) {
            *slot = quantity;
        } else {
            self.items.insert(CommodityId::from(commodity), quantity);
        }
    }
}

impl TryFrom<BTreeMap<CommodityId, f64>> for Inventory {
    type Error = EconomyError;

    fn try_from(items: BTreeMap<CommodityId, f64>) -> Result<Self, Self::Error> {
        let mut inventory = Self::new();
        for (commodity, quantity) in items {
            inventory.set(commodity.as_str(), quantity)?;
        }
        Ok(inventory)
    }
}

impl From<Inventory> for BTreeMap<CommodityId, f64> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_commodity_reads_zero() {
        let inv = Inventory::new();
        assert!(inv.get("food").abs() < f64::EPSILON);
        assert!(inv.is_empty());
    }

    #[test]
    fn add_accumulates() {
        let mut inv = Inventory::new();
        assert!(inv.add("food", 4.0).is_ok());
        assert!(inv.add("food", 6.0).is_ok());
        assert!((inv.get("food") - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn add_rejects_negative_and_nan() {
        let mut inv = Inventory::new();
        assert!(inv.add("food", -1.0).is_err());
        assert!(inv.add("food", f64::NAN).is_err());
        assert!(inv.add("food", f64::INFINITY).is_err());
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_clamped_never_goes_negative() {
        let mut inv = Inventory::new();
        assert!(inv.add("minerals", 3.0).is_ok());
        let removed = inv.remove_clamped("minerals", 5.0).unwrap_or_default();
        assert!((removed - 3.0).abs() < f64::EPSILON);
        assert!(inv.get("minerals").abs() < f64::EPSILON);
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_clamped_rejects_negative() {
        let mut inv = Inventory::new();
        assert!(inv.add("energy", 1.0).is_ok());
        assert!(inv.remove_clamped("energy", -0.5).is_err());
        assert!((inv.get("energy") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negligible_remainder_is_dropped() {
        let mut inv = Inventory::new();
        assert!(inv.add("alloy", 1.0).is_ok());
        assert!(inv.remove_clamped("alloy", 1.0 - 1e-12).is_ok());
        assert!(inv.is_empty());
    }

    #[test]
    fn set_overwrites_and_validates() {
        let mut inv = Inventory::new();
        assert!(inv.set("food", 7.5).is_ok());
        assert!((inv.get("food") - 7.5).abs() < f64::EPSILON);
        assert!(inv.set("food", -2.0).is_err());
        assert!(inv.set("food", 0.0).is_ok());
        assert!(inv.is_empty());
    }

    #[test]
    fn iterates_in_id_order() {
        let mut inv = Inventory::new();
        assert!(inv.add("minerals", 1.0).is_ok());
        assert!(inv.add("alloy", 2.0).is_ok());
        let ids: Vec<&str> = inv.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["alloy", "minerals"]);
    }

    #[test]
    fn deserialize_validates_quantities() {
        let inv: Inventory = serde_json::from_str(r#"{"food": 4.5, "ore": 0.0}"#).unwrap_or_default();
        assert!((inv.get("food") - 4.5).abs() < f64::EPSILON);
        assert_eq!(inv.iter().count(), 1);

        let negative = serde_json::from_str::<Inventory>(r#"{"food": -50.0}"#);
        assert!(negative.is_err_and(|e| e.to_string().contains("food")));
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let mut inv = Inventory::new();
        assert!(inv.add("food", 2.0).is_ok());
        let json = serde_json::to_string(&inv).unwrap_or_default();
        assert_eq!(json, r#"{"food":2.0}"#);
    }
}
