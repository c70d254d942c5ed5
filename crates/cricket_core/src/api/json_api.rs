use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::context::ContextAnalyzer;
use crate::engine::runner::{select_next_bowler, MatchRunner, OverReport, DEFAULT_AGGRESSION};
use crate::engine::simulation::SimulationEngine;
use crate::engine::state_machine::ApplyOutcome;
use crate::engine::strategy::StrategyKind;
use crate::engine::EngineConfig;
use crate::models::{Ball, Innings, Match, MatchId, MatchOutcome, MatchSettings, PlayerId};

pub const SCHEMA_VERSION: u8 = 1;

fn check_schema(version: u8) -> Result<(), String> {
    if version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", version));
    }
    Ok(())
}

fn default_aggression() -> u8 {
    DEFAULT_AGGRESSION
}

// ============================================================================
// simulate_over_json
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OverRequest {
    pub schema_version: u8,
    #[serde(rename = "match")]
    pub match_state: Match,
    /// Must name the current innings when given.
    #[serde(default)]
    pub innings: Option<u8>,
    #[serde(default = "default_aggression")]
    pub aggression: u8,
    #[serde(default)]
    pub special_players: Vec<PlayerId>,
    /// Bowler for the over when none is set yet; chosen by rotation if absent.
    #[serde(default)]
    pub bowler: Option<PlayerId>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverResponse {
    pub schema_version: u8,
    pub innings: u8,
    pub over_number: u32,
    pub bowler: PlayerId,
    pub strategy: StrategyKind,
    pub deliveries: Vec<Ball>,
    pub closing_delivery: Option<usize>,
    pub runs: u32,
    pub wickets: u32,
}

/// Simulates the next over of the supplied match without applying it.
pub fn simulate_over_json(request_json: &str) -> Result<String, String> {
    let request: OverRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    check_schema(request.schema_version)?;

    let mut m = request.match_state;
    let current = m.current().map_err(|e| e.to_string())?;
    if let Some(number) = request.innings {
        if number != current.number {
            return Err(format!(
                "Innings {} is not the current innings ({})",
                number, current.number
            ));
        }
    }
    if current.current_bowler.is_none() {
        let bowler = match request.bowler {
            Some(id) => id,
            None => select_next_bowler(&m).map_err(|e| e.to_string())?,
        };
        m.set_bowler(bowler).map_err(|e| e.to_string())?;
    }

    let config = request.config.unwrap_or_else(EngineConfig::offline);
    let analyzer = ContextAnalyzer::new(config.phase.clone());
    let engine = SimulationEngine::with_config(config);
    let specials: BTreeSet<PlayerId> = request.special_players.into_iter().collect();

    let ctx = analyzer
        .analyze_current(&m, request.aggression, &specials)
        .map_err(|e| e.to_string())?;
    let over = engine.simulate_over(&ctx).map_err(|e| e.to_string())?;
    debug!(match_id = %m.id, over = ctx.over_number, strategy = %over.strategy, "over simulated via JSON API");

    let response = OverResponse {
        schema_version: SCHEMA_VERSION,
        innings: ctx.innings_number,
        over_number: ctx.over_number,
        bowler: ctx.bowler.id,
        strategy: over.strategy,
        runs: over.runs(),
        wickets: over.wickets(),
        closing_delivery: over.closing_delivery,
        deliveries: over.deliveries,
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize result: {}", e))
}

// ============================================================================
// apply_ball_json
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApplyBallRequest {
    pub schema_version: u8,
    #[serde(rename = "match")]
    pub match_state: Match,
    /// Sets the bowler first when the over has not started.
    #[serde(default)]
    pub bowler: Option<PlayerId>,
    pub ball: Ball,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyBallResponse {
    pub schema_version: u8,
    pub accepted: bool,
    /// Why the ball was rejected.
    pub reason: Option<String>,
    /// The rejection concerns the ball itself; a corrected ball may succeed.
    pub retryable: bool,
    pub outcome: Option<ApplyOutcome>,
    /// Updated match, or the unchanged input on rejection.
    #[serde(rename = "match")]
    pub match_state: Match,
}

/// Applies one ball. Rejections come back as `accepted: false`; only
/// malformed requests are errors.
pub fn apply_ball_json(request_json: &str) -> Result<String, String> {
    let request: ApplyBallRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    check_schema(request.schema_version)?;

    let original = request.match_state;
    let mut m = original.clone();
    let applied = apply_with_bowler(&mut m, request.bowler, request.ball);

    let response = match applied {
        Ok(outcome) => ApplyBallResponse {
            schema_version: SCHEMA_VERSION,
            accepted: true,
            reason: None,
            retryable: false,
            outcome: Some(outcome),
            match_state: m,
        },
        Err(e) => {
            warn!(match_id = %m.id, error = %e, "ball rejected");
            ApplyBallResponse {
                schema_version: SCHEMA_VERSION,
                accepted: false,
                reason: Some(e.to_string()),
                retryable: e.is_delivery_rejection(),
                outcome: None,
                match_state: original,
            }
        }
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize result: {}", e))
}

fn apply_with_bowler(
    m: &mut Match,
    bowler: Option<PlayerId>,
    ball: Ball,
) -> crate::error::Result<ApplyOutcome> {
    if let Some(bowler) = bowler {
        if m.current()?.current_bowler.is_none() {
            m.set_bowler(bowler)?;
        }
    }
    m.apply_ball(ball)
}

// ============================================================================
// simulate_match_json
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub schema_version: u8,
    pub settings: MatchSettings,
    #[serde(default = "default_aggression")]
    pub aggression: u8,
    #[serde(default)]
    pub special_players: Vec<PlayerId>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Include every over in the response.
    #[serde(default)]
    pub include_overs: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub schema_version: u8,
    pub match_id: MatchId,
    pub result: Option<String>,
    pub outcome: Option<MatchOutcome>,
    pub scoreline: Vec<String>,
    pub innings: Vec<Innings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overs: Vec<OverReport>,
}

/// Simulates a whole match from settings.
pub fn simulate_match_json(request_json: &str) -> Result<String, String> {
    let request: MatchRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;
    check_schema(request.schema_version)?;

    let mut m = Match::new(request.settings).map_err(|e| e.to_string())?;
    let config = request.config.unwrap_or_else(EngineConfig::offline);
    let runner = MatchRunner::new(SimulationEngine::with_config(config))
        .with_aggression(request.aggression)
        .with_specials(request.special_players);
    let overs = runner.play_match(&mut m).map_err(|e| e.to_string())?;

    let response = MatchResponse {
        schema_version: SCHEMA_VERSION,
        match_id: m.id,
        scoreline: m.scoreline(),
        result: m.result,
        outcome: m.outcome,
        innings: m.innings,
        overs: if request.include_overs { overs } else { Vec::new() },
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize result: {}", e))
}
