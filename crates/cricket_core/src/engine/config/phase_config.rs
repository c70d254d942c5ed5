//! Innings phase boundaries

use serde::{Deserialize, Serialize};

/// Where the powerplay ends and the death overs begin, as fractions of the
/// innings length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Share of overs played as powerplay (default: 0.3, T20 -> overs 1-6)
    pub powerplay_fraction: f32,
    /// Share of overs counted as death overs (default: 0.2, T20 -> overs 17-20)
    pub death_fraction: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self { powerplay_fraction: 0.3, death_fraction: 0.2 }
    }
}

impl PhaseConfig {
    /// First over (0-based) after the powerplay.
    pub fn powerplay_overs(&self, total_overs: u32) -> u32 {
        share_of_overs(total_overs, self.powerplay_fraction)
    }

    /// First over (0-based) of the death phase.
    pub fn death_start(&self, total_overs: u32) -> u32 {
        total_overs.saturating_sub(share_of_overs(total_overs, self.death_fraction))
    }
}

/// `ceil(total * fraction)`, rounded to three decimals first so that
/// 50 * 0.3f32 (15.000001) stays 15.
fn share_of_overs(total_overs: u32, fraction: f32) -> u32 {
    let exact = f64::from(total_overs) * f64::from(fraction.max(0.0));
    ((exact * 1000.0).round() / 1000.0).ceil() as u32
}
