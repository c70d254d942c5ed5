//! Hand-tuned boosts for flagged standout players.
//!
//! The rule table is the baseline. Each delivery checks who is on strike, so a
//! special non-striker gets the batter boost once the strike rotates to them.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::builder::OverBuilder;
use super::weights::{OutcomeWeights, PressureBand};
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::config::{ExtrasConfig, SpecialBoostConfig};
use crate::engine::context::SimulationContext;
use crate::engine::deterministic::{deterministic_seed, subcase};
use crate::error::StrategyError;

pub struct SpecialPlayerStrategy {
    boosts: SpecialBoostConfig,
    extras: ExtrasConfig,
}

impl SpecialPlayerStrategy {
    pub fn new(boosts: SpecialBoostConfig, extras: ExtrasConfig) -> Self {
        Self { boosts, extras }
    }

    fn weights(&self, ctx: &SimulationContext, special_batter: bool) -> OutcomeWeights {
        let mut w = OutcomeWeights::for_phase(ctx.phase, PressureBand::from_index(ctx.pressure_index))
            .with_aggression(ctx.effective_aggression);
        if special_batter {
            w = w
                .scale_boundaries(self.boosts.batter_boundary_boost)
                .scale_wickets(self.boosts.batter_dismissal_damp);
        }
        if ctx.bowler.is_special {
            w = w
                .scale_wickets(self.boosts.bowler_wicket_boost)
                .scale_dots(self.boosts.bowler_dot_boost)
                .scale_boundaries(self.boosts.bowler_boundary_damp);
        }
        w.with_extras(&self.extras)
    }
}

impl OverStrategy for SpecialPlayerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SpecialPlayer
    }

    fn can_handle(&self, ctx: &SimulationContext) -> bool {
        ctx.has_special()
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let seed =
            deterministic_seed(ctx.seed, ctx.innings_number, ctx.over_number, subcase::SPECIAL_PLAYER);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let boosted = self.weights(ctx, true);
        let plain = self.weights(ctx, false);

        let mut builder = OverBuilder::new(ctx);
        builder.fill_with(|b| {
            if ctx.special_players.contains(&b.striker()) {
                boosted.sample(&mut rng)
            } else {
                plain.sample(&mut rng)
            }
        });
        Ok(builder.finish(self.kind())?)
    }
}
