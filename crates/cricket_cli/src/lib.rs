//! Cricket CLI Library
//!
//! File loading and output formatting behind the `cricket_cli` binary.

use anyhow::{anyhow, Context, Result};
use cricket_core::api::{simulate_over_json, MatchResponse, OverResponse, SCHEMA_VERSION};
use cricket_core::engine::runner::OverReport;
use cricket_core::models::PlayerId;
use cricket_core::{EngineConfig, Match, MatchRunner, MatchSettings, SimulationEngine};
use std::fs;
use std::path::Path;
use tracing::info;

/// Engine config from a YAML (or `.json`) file, offline defaults otherwise.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config {}", path.display())),
        None => Ok(EngineConfig::offline()),
    }
}

pub fn load_settings(path: &Path) -> Result<MatchSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid match settings in {}", path.display()))
}

/// Plays a full match from a settings file.
pub fn simulate_match_file(
    settings: &Path,
    config: Option<&Path>,
    aggression: u8,
    specials: Vec<PlayerId>,
) -> Result<MatchResponse> {
    let settings = load_settings(settings)?;
    let config = load_engine_config(config)?;

    let mut m = Match::new(settings).context("Match settings rejected")?;
    let runner = MatchRunner::new(SimulationEngine::with_config(config))
        .with_aggression(aggression)
        .with_specials(specials);
    let overs = runner.play_match(&mut m).context("Simulation failed")?;
    info!(match_id = %m.id, overs = overs.len(), "match complete");

    Ok(MatchResponse {
        schema_version: SCHEMA_VERSION,
        match_id: m.id,
        scoreline: m.scoreline(),
        result: m.result,
        outcome: m.outcome,
        innings: m.innings,
        overs,
    })
}

/// Simulates one over from a request file in the JSON API shape. A config
/// file, when given, replaces the request's own `config`.
pub fn simulate_over_file(request: &Path, config: Option<&Path>) -> Result<OverResponse> {
    let text = fs::read_to_string(request)
        .with_context(|| format!("Failed to read request {}", request.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", request.display()))?;

    if config.is_some() {
        let config = serde_json::to_value(load_engine_config(config)?)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| anyhow!("Over request must be a JSON object"))?;
        object.insert("config".to_string(), config);
    }

    let out = simulate_over_json(&value.to_string()).map_err(|e| anyhow!(e))?;
    Ok(serde_json::from_str(&out)?)
}

/// One line per over: `Inns 1 Ov  3  1 . 4 Wd 2 . 1  (8/0)`.
pub fn format_over(report: &OverReport) -> String {
    let tokens: Vec<&str> = report.deliveries.iter().map(|b| b.display.as_str()).collect();
    format!(
        "Inns {} Ov {:>2}  {:<28} ({}/{})",
        report.innings,
        report.over_number + 1,
        tokens.join(" "),
        report.score,
        report.total_wickets
    )
}

pub fn format_summary(response: &MatchResponse) -> String {
    let mut lines = response.scoreline.clone();
    lines.push(response.result.clone().unwrap_or_else(|| "No result".to_string()));
    lines.join("\n")
}
