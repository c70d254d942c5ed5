//! Weighted sampling from per-player profiles.
//!
//! Batter numbers (strike rate, boundary and dismissal rates) shape the bat
//! outcomes, the bowler's economy and wicket rate pull them back, and a small
//! per-over jitter on form keeps identical profiles from bowling identical
//! overs every time. A side without history falls back to the rule table.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::builder::OverBuilder;
use super::weights::{OutcomeWeights, PressureBand};
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::config::ExtrasConfig;
use crate::engine::context::{BatterSnapshot, BowlerSnapshot, SimulationContext};
use crate::engine::deterministic::{deterministic_seed, subcase};
use crate::error::StrategyError;
use crate::models::PlayerId;

const AVERAGE_ECONOMY: f32 = 7.5;
const AVERAGE_WICKET_RATE: f32 = 0.045;
const FORM_JITTER_SD: f32 = 0.08;

pub struct StatisticalStrategy {
    extras: ExtrasConfig,
}

impl StatisticalStrategy {
    pub fn new(extras: ExtrasConfig) -> Self {
        Self { extras }
    }

    /// Weights for `batter` facing the context's bowler.
    pub fn weights(&self, ctx: &SimulationContext, batter: &BatterSnapshot, jitter: f32) -> OutcomeWeights {
        let band = PressureBand::from_index(ctx.pressure_index);
        let mut w = match &batter.profile {
            Some(profile) => {
                let four = profile.boundary_rate * (1.0 - profile.six_share);
                let six = profile.boundary_rate * profile.six_share;
                let runs_per_ball = profile.strike_rate / 100.0;
                let running = (runs_per_ball - 4.0 * four - 6.0 * six).max(0.1);
                let one = running * 0.75;
                let two = running * 0.20 / 2.0;
                let three = running * 0.05 / 3.0;
                let wicket = profile.dismissal_rate.clamp(0.005, 0.25);
                let dot = (1.0 - (one + two + three + four + six + wicket)).max(0.05);
                OutcomeWeights::bat_only(dot, one, two, three, four, six, wicket)
            }
            None => OutcomeWeights::for_phase(ctx.phase, band),
        };

        w = w.scale_boundaries(0.85 + 0.3 * (batter.form + jitter).clamp(0.0, 1.0));
        w = apply_bowler(w, &ctx.bowler);

        let extras = match &ctx.bowler.profile {
            Some(profile) if self.extras.total() > 0.0 => {
                let mut e = self.extras.clone();
                e.wide_rate = profile.extras_rate * 0.8;
                e.no_ball_rate = profile.extras_rate * 0.2;
                e
            }
            _ => self.extras.clone(),
        };
        w.with_aggression(ctx.effective_aggression).with_extras(&extras)
    }
}

fn apply_bowler(w: OutcomeWeights, bowler: &BowlerSnapshot) -> OutcomeWeights {
    let Some(profile) = &bowler.profile else {
        return w;
    };
    let economy = (profile.economy / AVERAGE_ECONOMY).clamp(0.6, 1.5);
    let wickets = (profile.wicket_rate / AVERAGE_WICKET_RATE).clamp(0.5, 2.0);
    w.scale_boundaries(economy)
        .scale_dots(1.0 / economy)
        .scale_wickets(wickets.sqrt())
}

impl OverStrategy for StatisticalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Statistical
    }

    fn can_handle(&self, ctx: &SimulationContext) -> bool {
        ctx.has_history()
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let over = ctx.over_number;
        let mut rng = ChaCha8Rng::seed_from_u64(deterministic_seed(
            ctx.seed,
            ctx.innings_number,
            over,
            subcase::STATISTICAL,
        ));
        let mut jitter_rng = ChaCha8Rng::seed_from_u64(deterministic_seed(
            ctx.seed,
            ctx.innings_number,
            over,
            subcase::FORM_JITTER,
        ));
        let jitter = Normal::new(0.0, FORM_JITTER_SD)
            .map(|n| n.sample(&mut jitter_rng))
            .unwrap_or(0.0);

        // batters change on wickets, so weights are looked up per delivery
        let mut cache: Vec<(PlayerId, OutcomeWeights)> = Vec::new();
        let mut builder = OverBuilder::new(ctx);
        builder.fill_with(|b| {
            let striker = b.striker();
            let idx = match cache.iter().position(|(id, _)| *id == striker) {
                Some(i) => i,
                None => {
                    let w = match ctx.batter(striker) {
                        Some(batter) => self.weights(ctx, batter, jitter),
                        None => self.weights(ctx, &ctx.striker, jitter),
                    };
                    cache.push((striker, w));
                    cache.len() - 1
                }
            };
            cache[idx].1.sample(&mut rng)
        });
        Ok(builder.finish(self.kind())?)
    }
}
