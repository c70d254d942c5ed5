//! Over generation through an external generative model.
//!
//! The model call is the only blocking step in the pipeline. It runs on a
//! worker thread and the strategy waits on a channel with a deadline; a late
//! answer lands in a dropped channel and is discarded, so nothing from a
//! timed-out call can reach match state.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::builder::OverBuilder;
use super::outcome::{parse_outcomes, DeliveryOutcome};
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::config::AiConfig;
use crate::engine::context::SimulationContext;
use crate::error::{IllegalOver, StrategyError};

/// What the model is asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub prompt: String,
    pub lookahead_overs: u32,
    pub aggression: u8,
    pub innings: u8,
    pub over: u32,
    pub score: u32,
    pub wickets: u32,
    pub target: Option<u32>,
}

/// External text generator. Implementations may block.
pub trait OverModel: Send + Sync {
    fn generate(&self, request: &ModelRequest) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    deliveries: Vec<String>,
}

pub struct AiStrategy {
    model: Option<Arc<dyn OverModel>>,
    config: AiConfig,
}

impl AiStrategy {
    pub fn new(model: Option<Arc<dyn OverModel>>, config: AiConfig) -> Self {
        Self { model, config }
    }

    pub fn build_request(&self, ctx: &SimulationContext) -> ModelRequest {
        let chase = match (ctx.runs_needed, ctx.required_run_rate) {
            (Some(needed), Some(rrr)) => {
                format!(" Chasing: {} needed at {:.2} per over.", needed, rrr)
            }
            _ => String::new(),
        };
        let prompt = format!(
            "Limited-overs cricket, innings {}, over {} of {} ({:?} phase). \
             Score {}/{}.{} Pressure {:.2}, batting aggression {}/10. \
             Plan the next {} over(s) and return the next over only as JSON \
             {{\"deliveries\": [..]}} using tokens . 1 2 3 4 6 Wd Nb Nb+4 1B 1Lb \
             W:b W:c W:lbw W:st W:hw W:ro, with exactly six legal deliveries.",
            ctx.innings_number,
            ctx.over_number + 1,
            ctx.total_overs,
            ctx.phase,
            ctx.score,
            ctx.wickets,
            chase,
            ctx.pressure_index,
            ctx.aggression,
            self.config.lookahead_overs.max(1),
        );
        ModelRequest {
            prompt,
            lookahead_overs: self.config.lookahead_overs.max(1),
            aggression: ctx.aggression,
            innings: ctx.innings_number,
            over: ctx.over_number,
            score: ctx.score,
            wickets: ctx.wickets,
            target: ctx.target,
        }
    }

    fn call_model(&self, model: Arc<dyn OverModel>, request: ModelRequest) -> Result<String, StrategyError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let (tx, rx) = crossbeam_channel::bounded(1);
        let over = request.over;
        thread::Builder::new()
            .name(format!("over-model-{}", over))
            .spawn(move || {
                if tx.send(model.generate(&request)).is_err() {
                    debug!(over, "late model response discarded");
                }
            })
            .map_err(|e| StrategyError::Model(format!("failed to start model worker: {}", e)))?;
        match rx.recv_timeout(timeout) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(message)) => Err(StrategyError::Model(message)),
            Err(RecvTimeoutError::Timeout) => Err(StrategyError::Timeout(self.config.timeout_ms)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(StrategyError::Model("model worker exited without a response".to_string()))
            }
        }
    }
}

/// Accepts `{"deliveries": [...]}` or bare tokens.
pub fn parse_response(text: &str) -> Result<Vec<DeliveryOutcome>, StrategyError> {
    let trimmed = text.trim();
    let outcomes = if trimmed.starts_with('{') {
        let response: ModelResponse =
            serde_json::from_str(trimmed).map_err(|e| StrategyError::Parse(e.to_string()))?;
        parse_outcomes(&response.deliveries.join(" "))
    } else {
        parse_outcomes(trimmed)
    }
    .map_err(StrategyError::Parse)?;

    let legal = outcomes.iter().filter(|o| o.is_legal()).count();
    if legal != 6 {
        return Err(IllegalOver::LegalCount(legal).into());
    }
    Ok(outcomes)
}

impl OverStrategy for AiStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ai
    }

    fn can_handle(&self, _ctx: &SimulationContext) -> bool {
        self.config.enabled && self.model.is_some()
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let model = self.model.clone().ok_or(StrategyError::Declined)?;
        let request = self.build_request(ctx);
        let text = self.call_model(model, request).map_err(|e| {
            warn!(over = ctx.over_number, error = %e, "model call failed");
            e
        })?;
        let outcomes = parse_response(&text)?;
        debug!(over = ctx.over_number, deliveries = outcomes.len(), "model over parsed");

        let mut builder = OverBuilder::new(ctx);
        for outcome in outcomes {
            builder.push(outcome);
        }
        Ok(builder.finish(self.kind())?)
    }
}
