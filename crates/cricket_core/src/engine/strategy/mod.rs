//! # Over Strategies
//!
//! Interchangeable producers of one over, tried by the engine in priority
//! order:
//!
//! 1. [`SpecialPlayerStrategy`] - boosts for flagged standout players
//! 2. [`CacheStrategy`] - memoized over for an identical situation
//! 3. [`AiStrategy`] - external generative model behind a timeout
//! 4. [`StatisticalStrategy`] - sampling from player profiles
//! 5. [`TemplateStrategy`] - canned phase patterns
//! 6. [`RuleBasedStrategy`] - phase x pressure table, never fails

pub mod ai;
pub mod builder;
pub mod cache;
pub mod outcome;
pub mod rule_based;
pub mod special_player;
pub mod statistical;
pub mod template;
pub mod weights;

pub use ai::{AiStrategy, ModelRequest, OverModel};
pub use builder::OverBuilder;
pub use cache::{CacheStrategy, OverCache};
pub use outcome::{parse_outcomes, parse_token, DeliveryOutcome};
pub use rule_based::RuleBasedStrategy;
pub use special_player::SpecialPlayerStrategy;
pub use statistical::StatisticalStrategy;
pub use template::TemplateStrategy;
pub use weights::{OutcomeWeights, PressureBand};

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::SimulationContext;
use crate::error::StrategyError;
use crate::models::Ball;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SpecialPlayer,
    Cache,
    Ai,
    Statistical,
    Template,
    RuleBased,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::SpecialPlayer => "special_player",
            StrategyKind::Cache => "cache",
            StrategyKind::Ai => "ai",
            StrategyKind::Statistical => "statistical",
            StrategyKind::Template => "template",
            StrategyKind::RuleBased => "rule_based",
        };
        f.write_str(name)
    }
}

/// One simulated over: six legal balls plus any wides and no-balls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverResult {
    pub deliveries: Vec<Ball>,
    pub strategy: StrategyKind,
    /// Index of the ball that ends the innings, if one does.
    pub closing_delivery: Option<usize>,
}

impl OverResult {
    pub fn legal_count(&self) -> usize {
        self.deliveries.iter().filter(|b| b.is_legal()).count()
    }

    /// Balls that actually get applied: up to and including the closing one.
    pub fn applicable(&self) -> &[Ball] {
        match self.closing_delivery {
            Some(i) if i < self.deliveries.len() => &self.deliveries[..=i],
            _ => &self.deliveries,
        }
    }

    pub fn runs(&self) -> u32 {
        self.applicable().iter().map(Ball::total_runs).sum()
    }

    pub fn wickets(&self) -> u32 {
        self.applicable().iter().filter(|b| b.is_wicket).count() as u32
    }

    pub fn outcomes(&self) -> Vec<DeliveryOutcome> {
        self.deliveries.iter().map(DeliveryOutcome::from_ball).collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.deliveries.iter().map(|b| b.display.clone()).collect()
    }
}

/// A way of producing an over from a context.
pub trait OverStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Cheap check; `false` sends the engine straight to the next strategy.
    fn can_handle(&self, ctx: &SimulationContext) -> bool;

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError>;
}
