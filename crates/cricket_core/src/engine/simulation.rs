//! # Simulation Engine
//!
//! Runs the strategy chain for one over. Strategies are tried in priority
//! order; a strategy that declines, errors, or produces an over that fails
//! [`validate_over`] is skipped and the next one is asked. The rule-based
//! strategy at the end of the default chain always produces a legal over.
//!
//! Accepted overs from any generating strategy are remembered in the shared
//! [`OverCache`] so an identical situation later can reuse them.

use std::sync::Arc;

use tracing::{debug, warn};

use super::config::EngineConfig;
use super::context::SimulationContext;
use super::legality::validate_over;
use super::strategy::{
    AiStrategy, CacheStrategy, OverCache, OverModel, OverResult, OverStrategy,
    RuleBasedStrategy, SpecialPlayerStrategy, StatisticalStrategy, StrategyKind,
    TemplateStrategy,
};
use crate::error::EngineError;
use crate::models::BALLS_PER_OVER;

pub struct SimulationEngine {
    strategies: Vec<Box<dyn OverStrategy>>,
    cache: Arc<OverCache>,
    config: EngineConfig,
}

impl SimulationEngine {
    /// Default chain: special player, cache, model, statistical, template,
    /// rule-based. The cache strategy is left out when caching is disabled.
    pub fn new(config: EngineConfig, cache: Arc<OverCache>, model: Option<Arc<dyn OverModel>>) -> Self {
        let mut strategies: Vec<Box<dyn OverStrategy>> = Vec::with_capacity(6);
        strategies.push(Box::new(SpecialPlayerStrategy::new(
            config.special.clone(),
            config.extras.clone(),
        )));
        if config.cache.enabled {
            strategies.push(Box::new(CacheStrategy::new(
                cache.clone(),
                config.cache.rrr_bucket_width,
            )));
        }
        strategies.push(Box::new(AiStrategy::new(model, config.ai.clone())));
        strategies.push(Box::new(StatisticalStrategy::new(config.extras.clone())));
        strategies.push(Box::new(TemplateStrategy::new()));
        strategies.push(Box::new(RuleBasedStrategy::new(config.extras.clone())));
        Self { strategies, cache, config }
    }

    /// Engine with its own private cache.
    pub fn with_config(config: EngineConfig) -> Self {
        let cache = Arc::new(OverCache::new(config.cache.capacity));
        Self::new(config, cache, None)
    }

    /// Custom chain, tried in the given order.
    pub fn with_strategies(
        config: EngineConfig,
        cache: Arc<OverCache>,
        strategies: Vec<Box<dyn OverStrategy>>,
    ) -> Self {
        Self { strategies, cache, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<OverCache> {
        &self.cache
    }

    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Produces the next over for `ctx`. The context must sit at the start
    /// of an over with an innings still open.
    pub fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, EngineError> {
        check_context(ctx)?;

        for strategy in &self.strategies {
            let kind = strategy.kind();
            if !strategy.can_handle(ctx) {
                continue;
            }
            let over = match strategy.simulate_over(ctx) {
                Ok(over) => over,
                Err(e) => {
                    warn!(strategy = %kind, over = ctx.over_number, error = %e, "strategy failed, falling through");
                    continue;
                }
            };
            if let Err(e) = validate_over(ctx, &over) {
                warn!(strategy = %kind, over = ctx.over_number, error = %e, "strategy produced an illegal over");
                continue;
            }

            if kind != StrategyKind::Cache && self.config.cache.enabled {
                let signature = ctx.signature(self.config.cache.rrr_bucket_width);
                self.cache.remember(signature, over.outcomes());
            }
            debug!(
                strategy = %kind,
                innings = ctx.innings_number,
                over = ctx.over_number,
                runs = over.runs(),
                wickets = over.wickets(),
                "over simulated"
            );
            return Ok(over);
        }
        Err(EngineError::ExhaustedChain)
    }
}

fn check_context(ctx: &SimulationContext) -> Result<(), EngineError> {
    if ctx.balls_in_over != 0 {
        return Err(EngineError::InvalidContext(format!(
            "over {} already has {} legal balls",
            ctx.over_number, ctx.balls_in_over
        )));
    }
    if ctx.over_number >= ctx.total_overs {
        return Err(EngineError::InvalidContext(format!(
            "over {} is past the {}-over limit",
            ctx.over_number, ctx.total_overs
        )));
    }
    if ctx.wickets >= ctx.wicket_limit {
        return Err(EngineError::InvalidContext("batting side is all out".to_string()));
    }
    if ctx.target.is_some_and(|t| ctx.score >= t) {
        return Err(EngineError::InvalidContext("target already reached".to_string()));
    }
    if ctx.striker.id == ctx.non_striker.id {
        return Err(EngineError::InvalidContext("striker and non-striker are the same player".to_string()));
    }
    if ctx.legal_balls_remaining < BALLS_PER_OVER {
        return Err(EngineError::InvalidContext("fewer than six legal balls remaining".to_string()));
    }
    Ok(())
}
