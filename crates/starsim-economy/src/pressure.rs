//! Normalized world pressures and derived economic indicators.
//!
//! Pressures are the scalars every stage reads and nudges: stability,
//! prosperity, tech, scarcity, and unrest. They live in `[0, 1]` and every
//! write goes through [`Pressures::adjust`], which clamps, so no stage can
//! push them out of range. The balance and shortage indicators are written
//! by consumption and read by reports.

use serde::{Deserialize, Serialize};
use starsim_types::unit_clamp;

const fn default_one() -> f64 {
    1.0
}

/// One of the clamped pressure scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pressure {
    /// Political stability.
    Stability,
    /// Economic well-being.
    Prosperity,
    /// Technological level.
    Tech,
    /// Felt shortage of goods.
    Scarcity,
    /// Civil unrest.
    Unrest,
}

/// Pressure scalars and consumption indicators for one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pressures {
    /// Political stability in `[0, 1]`.
    #[serde(default = "default_one")]
    pub stability: f64,
    /// Economic well-being in `[0, 1]`.
    #[serde(default = "default_one")]
    pub prosperity: f64,
    /// Technological level in `[0, 1]`.
    #[serde(default = "default_one")]
    pub tech: f64,
    /// Felt shortage of goods in `[0, 1]`.
    #[serde(default)]
    pub scarcity: f64,
    /// Civil unrest in `[0, 1]`.
    #[serde(default)]
    pub unrest: f64,
    /// Food consumed minus food needed last tick.
    #[serde(default)]
    pub food_balance: f64,
    /// Food shortage ratio last tick, in `[0, 1]`.
    #[serde(default)]
    pub starvation_level: f64,
    /// Consumer goods consumed minus needed last tick.
    #[serde(default)]
    pub consumer_goods_balance: f64,
    /// Consumer goods shortage ratio last tick, in `[0, 1]`.
    #[serde(default)]
    pub consumer_goods_shortage_level: f64,
}

impl Default for Pressures {
    fn default() -> Self {
        Self {
            stability: 1.0,
            prosperity: 1.0,
            tech: 1.0,
            scarcity: 0.0,
            unrest: 0.0,
            food_balance: 0.0,
            starvation_level: 0.0,
            consumer_goods_balance: 0.0,
            consumer_goods_shortage_level: 0.0,
        }
    }
}

impl Pressures {
    /// Read one pressure.
    pub const fn get(&self, pressure: Pressure) -> f64 {
        match pressure {
            Pressure::Stability => self.stability,
            Pressure::Prosperity => self.prosperity,
            Pressure::Tech => self.tech,
            Pressure::Scarcity => self.scarcity,
            Pressure::Unrest => self.unrest,
        }
    }

    /// Shift one pressure by `delta`, clamped to `[0, 1]`.
    ///
    /// Returns the change actually applied after clamping.
    pub fn adjust(&mut self, pressure: Pressure, delta: f64) -> f64 {
        let slot = match pressure {
            Pressure::Stability => &mut self.stability,
            Pressure::Prosperity => &mut self.prosperity,
            Pressure::Tech => &mut self.tech,
            Pressure::Scarcity => &mut self.scarcity,
            Pressure::Unrest => &mut self.unrest,
        };
        let before = *slot;
        *slot = unit_clamp(before + delta);
        *slot - before
    }

    /// Whether every bounded field lies in `[0, 1]`.
    pub fn in_bounds(&self) -> bool {
        self.out_of_bounds().is_none()
    }

    /// The first bounded field outside `[0, 1]` (or NaN), with its value.
    pub fn out_of_bounds(&self) -> Option<(&'static str, f64)> {
        [
            ("stability", self.stability),
            ("prosperity", self.prosperity),
            ("tech", self.tech),
            ("scarcity", self.scarcity),
            ("unrest", self.unrest),
            ("starvation_level", self.starvation_level),
            ("consumer_goods_shortage_level", self.consumer_goods_shortage_level),
        ]
        .into_iter()
        .find(|(_, v)| !(0.0..=1.0).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_and_reports_applied_change() {
        let mut p = Pressures::default();
        let applied = p.adjust(Pressure::Stability, 0.5);
        assert!(applied.abs() < f64::EPSILON);
        assert!((p.stability - 1.0).abs() < f64::EPSILON);

        let applied = p.adjust(Pressure::Unrest, -0.3);
        assert!(applied.abs() < f64::EPSILON);
        assert!(p.unrest.abs() < f64::EPSILON);

        let applied = p.adjust(Pressure::Scarcity, 0.25);
        assert!((applied - 0.25).abs() < f64::EPSILON);
        assert!((p.get(Pressure::Scarcity) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_are_in_bounds() {
        assert!(Pressures::default().in_bounds());
        let mut p = Pressures::default();
        p.starvation_level = 1.5;
        assert!(!p.in_bounds());
        assert_eq!(
            p.out_of_bounds().map(|(field, _)| field),
            Some("starvation_level")
        );
        p.starvation_level = 0.0;
        p.unrest = f64::NAN;
        assert_eq!(p.out_of_bounds().map(|(field, _)| field), Some("unrest"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let p: Pressures = serde_json::from_str("{\"unrest\": 0.2}").unwrap_or_default();
        assert!((p.stability - 1.0).abs() < f64::EPSILON);
        assert!((p.unrest - 0.2).abs() < f64::EPSILON);
    }
}
