pub mod config;
pub mod context;
pub mod deterministic;
pub mod legality; // over-level validation of strategy output
pub mod runner;
pub mod simulation;
pub mod state_machine;
pub mod strategy;
pub mod strike;

#[cfg(test)]
pub mod test_fixtures;

pub use config::EngineConfig;
pub use context::{ContextAnalyzer, ContextSignature, MatchPhase, SimulationContext};
pub use legality::validate_over;
pub use runner::{select_next_bowler, MatchRunner, OverReport};
pub use simulation::SimulationEngine;
pub use state_machine::{apply_ball, ApplyOutcome};
pub use strategy::{DeliveryOutcome, OverModel, OverResult, OverStrategy, StrategyKind};
