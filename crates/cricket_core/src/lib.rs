//! # cricket_core - Limited-Overs Cricket Scoring and Over Simulation
//!
//! This library provides a scoring state machine for T10/T20/ODI matches and
//! an over simulation engine with a JSON API for the web layer.
//!
//! ## Features
//! - Ball-by-ball state machine: rejected deliveries leave the match untouched
//! - Six-strategy over simulation chain ending in a rule table that never fails
//! - Deterministic: same seed, same overs
//! - Shared over cache and per-match sessions for concurrent use

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod state;

// Re-export main API functions
pub use api::{
    apply_ball_json, simulate_match_json, simulate_over_json, ApplyBallResponse, MatchRequest,
    MatchResponse, OverRequest, OverResponse,
};
pub use error::{EngineError, IllegalDelivery, IllegalOver, MatchError, Result, SimulationError};

// Re-export engine entry points
pub use engine::{
    apply_ball, ApplyOutcome, ContextAnalyzer, EngineConfig, MatchRunner, OverResult,
    SimulationContext, SimulationEngine,
};

// Re-export domain model
pub use models::{Ball, EventKind, Match, MatchFormat, MatchSettings, Player, Team, WicketKind};

// Re-export session management
pub use state::{MatchRegistry, MatchSession};
