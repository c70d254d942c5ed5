//! Terminal fallback: phase x pressure rule table. Always produces an over.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::builder::OverBuilder;
use super::weights::{OutcomeWeights, PressureBand};
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::config::ExtrasConfig;
use crate::engine::context::SimulationContext;
use crate::engine::deterministic::{deterministic_seed, subcase};
use crate::error::StrategyError;

pub struct RuleBasedStrategy {
    extras: ExtrasConfig,
}

impl RuleBasedStrategy {
    pub fn new(extras: ExtrasConfig) -> Self {
        Self { extras }
    }

    pub fn weights(&self, ctx: &SimulationContext) -> OutcomeWeights {
        OutcomeWeights::for_phase(ctx.phase, PressureBand::from_index(ctx.pressure_index))
            .with_aggression(ctx.effective_aggression)
            .with_extras(&self.extras)
    }
}

impl OverStrategy for RuleBasedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    fn can_handle(&self, _ctx: &SimulationContext) -> bool {
        true
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let seed = deterministic_seed(ctx.seed, ctx.innings_number, ctx.over_number, subcase::RULE_BASED);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let weights = self.weights(ctx);

        let mut builder = OverBuilder::new(ctx);
        builder.fill_with(|_| weights.sample(&mut rng));
        Ok(builder.finish(self.kind())?)
    }
}
