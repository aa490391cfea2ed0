//! Tunables for faction actions.

use serde::{Deserialize, Serialize};

const fn default_influence_increment() -> f64 {
    0.1
}

const fn default_reinforce_garrison() -> f64 {
    10.0
}

const fn default_raid_hazard_step() -> f64 {
    0.1
}

const fn default_patrol_hazard_step() -> f64 {
    0.05
}

const fn default_aid_step() -> f64 {
    0.05
}

/// Step sizes applied by each faction action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionConfig {
    /// Influence added by `expand_influence`.
    #[serde(default = "default_influence_increment")]
    pub influence_increment: f64,
    /// Garrison added by `reinforce`.
    #[serde(default = "default_reinforce_garrison")]
    pub reinforce_garrison: f64,
    /// Hazard added by `raid_lane`.
    #[serde(default = "default_raid_hazard_step")]
    pub raid_hazard_step: f64,
    /// Hazard removed by `patrol_lane`.
    #[serde(default = "default_patrol_hazard_step")]
    pub patrol_hazard_step: f64,
    /// Stability and prosperity added by `aid_world`.
    #[serde(default = "default_aid_step")]
    pub aid_step: f64,
}

impl Default for FactionConfig {
    fn default() -> Self {
        Self {
            influence_increment: default_influence_increment(),
            reinforce_garrison: default_reinforce_garrison(),
            raid_hazard_step: default_raid_hazard_step(),
            patrol_hazard_step: default_patrol_hazard_step(),
            aid_step: default_aid_step(),
        }
    }
}
