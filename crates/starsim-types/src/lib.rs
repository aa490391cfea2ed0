//! Shared type definitions for the Starsim galaxy simulation.
//!
//! This crate holds the vocabulary every other crate speaks: typed
//! identifiers and the audit trail. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the web visualizer, which replays audit logs.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for all entity identifiers
//! - [`audit`] -- [`AuditEntry`] and [`AuditLog`], the per-tick record

pub mod audit;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use audit::{AuditEntry, AuditLog, kinds};
pub use ids::{CommodityId, EventId, FactionId, LaneId, RecipeId, WorldId};

/// Clamp a normalized scalar into `[0, 1]`.
///
/// `NaN` collapses to `0.0` so a corrupt value can never leak into the
/// pressure fields.
pub fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    //! Type export tests and shared helper checks.

    use super::unit_clamp;

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings into `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        let _ = crate::ids::WorldId::export_all();
        let _ = crate::ids::LaneId::export_all();
        let _ = crate::ids::FactionId::export_all();
        let _ = crate::ids::CommodityId::export_all();
        let _ = crate::ids::RecipeId::export_all();
        let _ = crate::ids::EventId::export_all();

        let _ = crate::audit::AuditEntry::export_all();
        let _ = crate::audit::AuditLog::export_all();
    }

    #[test]
    fn unit_clamp_bounds() {
        assert!((unit_clamp(1.7) - 1.0).abs() < f64::EPSILON);
        assert!(unit_clamp(-0.2).abs() < f64::EPSILON);
        assert!((unit_clamp(0.25) - 0.25).abs() < f64::EPSILON);
        assert!(unit_clamp(f64::NAN).abs() < f64::EPSILON);
    }
}
