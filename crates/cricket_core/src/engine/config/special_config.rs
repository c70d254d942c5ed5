//! Outcome boosts for marquee players

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialBoostConfig {
    /// Boundary weight multiplier while a special batter is on strike (default: 1.6)
    pub batter_boundary_boost: f32,
    /// Dismissal weight multiplier while a special batter is on strike (default: 0.6)
    pub batter_dismissal_damp: f32,
    /// Wicket weight multiplier for a special bowler (default: 1.5)
    pub bowler_wicket_boost: f32,
    /// Dot-ball weight multiplier for a special bowler (default: 1.2)
    pub bowler_dot_boost: f32,
    /// Boundary weight multiplier against a special bowler (default: 0.7)
    pub bowler_boundary_damp: f32,
}

impl Default for SpecialBoostConfig {
    fn default() -> Self {
        Self {
            batter_boundary_boost: 1.6,
            batter_dismissal_damp: 0.6,
            bowler_wicket_boost: 1.5,
            bowler_dot_boost: 1.2,
            bowler_boundary_damp: 0.7,
        }
    }
}
