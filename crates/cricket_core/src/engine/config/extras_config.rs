//! Extras frequencies used when sampling deliveries

use serde::{Deserialize, Serialize};

/// Per-delivery probabilities of each kind of extra.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrasConfig {
    /// Wide rate (default: 0.035)
    pub wide_rate: f32,
    /// No-ball rate (default: 0.008)
    pub no_ball_rate: f32,
    /// Bye rate (default: 0.005)
    pub bye_rate: f32,
    /// Leg-bye rate (default: 0.015)
    pub leg_bye_rate: f32,
}

impl Default for ExtrasConfig {
    fn default() -> Self {
        Self { wide_rate: 0.035, no_ball_rate: 0.008, bye_rate: 0.005, leg_bye_rate: 0.015 }
    }
}

impl ExtrasConfig {
    pub fn none() -> Self {
        Self { wide_rate: 0.0, no_ball_rate: 0.0, bye_rate: 0.0, leg_bye_rate: 0.0 }
    }

    pub fn total(&self) -> f32 {
        self.wide_rate + self.no_ball_rate + self.bye_rate + self.leg_bye_rate
    }
}
