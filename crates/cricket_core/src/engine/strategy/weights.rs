//! Per-delivery outcome weights and sampling.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::outcome::DeliveryOutcome;
use crate::engine::config::ExtrasConfig;
use crate::engine::context::MatchPhase;
use crate::models::WicketKind;

/// Share of each dismissal mode among wickets.
const WICKET_KINDS: [(WicketKind, f32); 6] = [
    (WicketKind::Bowled, 0.20),
    (WicketKind::Caught, 0.50),
    (WicketKind::Lbw, 0.14),
    (WicketKind::RunOut, 0.08),
    (WicketKind::Stumped, 0.05),
    (WicketKind::HitWicket, 0.03),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureBand {
    Low,
    Medium,
    High,
}

impl PressureBand {
    pub fn from_index(pressure: f32) -> Self {
        if pressure < 0.35 {
            PressureBand::Low
        } else if pressure > 0.65 {
            PressureBand::High
        } else {
            PressureBand::Medium
        }
    }
}

/// Relative weights; they need not sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeWeights {
    pub dot: f32,
    pub one: f32,
    pub two: f32,
    pub three: f32,
    pub four: f32,
    pub six: f32,
    pub wicket: f32,
    pub wide: f32,
    pub no_ball: f32,
    pub bye: f32,
    pub leg_bye: f32,
}

impl OutcomeWeights {
    /// Rule table: phase baseline shaped by pressure band.
    pub fn for_phase(phase: MatchPhase, band: PressureBand) -> Self {
        let base = match phase {
            MatchPhase::Powerplay => Self::bat_only(0.40, 0.28, 0.07, 0.01, 0.14, 0.05, 0.05),
            MatchPhase::Middle => Self::bat_only(0.36, 0.38, 0.10, 0.01, 0.08, 0.03, 0.04),
            MatchPhase::Death => Self::bat_only(0.28, 0.30, 0.09, 0.01, 0.15, 0.10, 0.07),
        };
        match band {
            PressureBand::Low => base.scale_wickets(0.8),
            PressureBand::Medium => base,
            PressureBand::High => base.scale_wickets(1.4).scale_boundaries(1.1).scale_dots(1.1),
        }
    }

    pub fn bat_only(
        dot: f32,
        one: f32,
        two: f32,
        three: f32,
        four: f32,
        six: f32,
        wicket: f32,
    ) -> Self {
        Self {
            dot,
            one,
            two,
            three,
            four,
            six,
            wicket,
            wide: 0.0,
            no_ball: 0.0,
            bye: 0.0,
            leg_bye: 0.0,
        }
    }

    fn bat_total(&self) -> f32 {
        self.dot + self.one + self.two + self.three + self.four + self.six + self.wicket
    }

    pub fn scale_boundaries(mut self, factor: f32) -> Self {
        self.four *= factor;
        self.six *= factor;
        self
    }

    pub fn scale_wickets(mut self, factor: f32) -> Self {
        self.wicket *= factor;
        self
    }

    pub fn scale_dots(mut self, factor: f32) -> Self {
        self.dot *= factor;
        self
    }

    /// Shifts weight towards boundaries and risk as aggression (0.0-1.0) rises.
    pub fn with_aggression(self, aggression: f32) -> Self {
        let a = aggression.clamp(0.0, 1.0);
        self.scale_boundaries(0.7 + 0.6 * a)
            .scale_wickets(0.8 + 0.4 * a)
            .scale_dots(1.2 - 0.4 * a)
    }

    /// Rescales bat outcomes so extras occur at the configured per-ball rates.
    pub fn with_extras(mut self, extras: &ExtrasConfig) -> Self {
        let bat = self.bat_total();
        let share = (1.0 - extras.total()).max(0.0);
        if bat > 0.0 {
            let k = share / bat;
            self.dot *= k;
            self.one *= k;
            self.two *= k;
            self.three *= k;
            self.four *= k;
            self.six *= k;
            self.wicket *= k;
        }
        self.wide = extras.wide_rate;
        self.no_ball = extras.no_ball_rate;
        self.bye = extras.bye_rate;
        self.leg_bye = extras.leg_bye_rate;
        self
    }

    fn as_array(&self) -> [f32; 11] {
        [
            self.dot,
            self.one,
            self.two,
            self.three,
            self.four,
            self.six,
            self.wicket,
            self.wide,
            self.no_ball,
            self.bye,
            self.leg_bye,
        ]
    }

    /// Draws one outcome. Degenerate weights yield a dot.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> DeliveryOutcome {
        let weights = self.as_array().map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 });
        let Ok(dist) = WeightedIndex::new(weights) else {
            return DeliveryOutcome::DOT;
        };
        match dist.sample(rng) {
            0 => DeliveryOutcome::DOT,
            1 => DeliveryOutcome::runs(1),
            2 => DeliveryOutcome::runs(2),
            3 => DeliveryOutcome::runs(3),
            4 => DeliveryOutcome::runs(4),
            5 => DeliveryOutcome::runs(6),
            6 => sample_wicket(rng),
            7 => DeliveryOutcome::Wide { extras: if rng.gen_bool(0.05) { 5 } else { 1 } },
            8 => DeliveryOutcome::NoBall { bat_runs: sample_no_ball_runs(rng) },
            9 => DeliveryOutcome::Bye { extras: if rng.gen_bool(0.2) { 4 } else { 1 } },
            _ => DeliveryOutcome::LegBye { extras: if rng.gen_bool(0.15) { 4 } else { 1 } },
        }
    }
}

fn sample_wicket<R: Rng>(rng: &mut R) -> DeliveryOutcome {
    let Ok(dist) = WeightedIndex::new(WICKET_KINDS.map(|(_, w)| w)) else {
        return DeliveryOutcome::wicket(WicketKind::Bowled);
    };
    match WICKET_KINDS[dist.sample(rng)].0 {
        WicketKind::RunOut => DeliveryOutcome::RunOut {
            completed: u8::from(rng.gen_bool(0.4)),
            non_striker: rng.gen_bool(0.35),
        },
        kind => DeliveryOutcome::wicket(kind),
    }
}

fn sample_no_ball_runs<R: Rng>(rng: &mut R) -> u8 {
    match rng.gen_range(0..10) {
        0..=5 => 0,
        6..=7 => 1,
        8 => 4,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pressure_bands() {
        assert_eq!(PressureBand::from_index(0.1), PressureBand::Low);
        assert_eq!(PressureBand::from_index(0.5), PressureBand::Medium);
        assert_eq!(PressureBand::from_index(0.9), PressureBand::High);
    }

    #[test]
    fn test_extras_rates_applied() {
        let extras = ExtrasConfig::default();
        let w = OutcomeWeights::for_phase(MatchPhase::Middle, PressureBand::Medium).with_extras(&extras);
        let total: f32 = w.as_array().iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert_eq!(w.wide, extras.wide_rate);
    }

    #[test]
    fn test_degenerate_weights_give_dot() {
        let w = OutcomeWeights::bat_only(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(w.sample(&mut rng), DeliveryOutcome::DOT);
    }

    #[test]
    fn test_aggression_raises_boundaries() {
        let base = OutcomeWeights::for_phase(MatchPhase::Death, PressureBand::Medium);
        let calm = base.clone().with_aggression(0.0);
        let wild = base.with_aggression(1.0);
        assert!(wild.six > calm.six);
        assert!(wild.dot < calm.dot);
    }

    #[test]
    fn test_sampling_only_produces_weighted_outcomes() {
        let w = OutcomeWeights::bat_only(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let o = w.sample(&mut rng);
            assert!(o == DeliveryOutcome::DOT || o == DeliveryOutcome::runs(4));
        }
    }
}
