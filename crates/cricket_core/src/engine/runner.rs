//! Match Runner
//!
//! Drives a match over by over:
//! - picks a bowler when none is set (no consecutive overs, quota respected)
//! - analyzes the situation and asks the engine for an over
//! - applies the balls up to the end of the over or the innings

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::context::ContextAnalyzer;
use super::simulation::SimulationEngine;
use super::strategy::StrategyKind;
use crate::error::{MatchError, Result, SimulationError};
use crate::models::{Ball, CompletionReason, Match, MatchStatus, PlayerId};

pub const DEFAULT_AGGRESSION: u8 = 5;

/// One over as it was applied to the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverReport {
    pub innings: u8,
    pub over_number: u32,
    pub bowler: PlayerId,
    pub strategy: StrategyKind,
    pub deliveries: Vec<Ball>,
    pub runs: u32,
    pub wickets: u32,
    pub score: u32,
    pub total_wickets: u32,
    pub innings_completed: Option<CompletionReason>,
    pub match_finished: bool,
}

/// Bowler for the next over of the current innings.
///
/// Eligible: fielding side, did not bowl the previous over, under quota.
/// Players with a bowling role come first, then the fewest overs bowled;
/// remaining ties go to the player listed later.
pub fn select_next_bowler(m: &Match) -> Result<PlayerId> {
    let innings = m.current()?;
    let team = m.team(innings.bowling_team)?;
    let quota = m.bowler_quota(team.id)?;

    team.players
        .iter()
        .enumerate()
        .filter(|(_, p)| Some(p.id) != innings.previous_bowler)
        .filter(|(_, p)| p.bowling.completed_overs() < quota)
        .min_by_key(|(i, p)| (!p.role.bowls(), p.bowling.completed_overs(), Reverse(*i)))
        .map(|(_, p)| p.id)
        .ok_or(MatchError::NoEligibleBowler(innings.overs))
}

pub struct MatchRunner {
    engine: SimulationEngine,
    analyzer: ContextAnalyzer,
    aggression: u8,
    specials: BTreeSet<PlayerId>,
}

impl MatchRunner {
    pub fn new(engine: SimulationEngine) -> Self {
        let analyzer = ContextAnalyzer::new(engine.config().phase.clone());
        Self { engine, analyzer, aggression: DEFAULT_AGGRESSION, specials: BTreeSet::new() }
    }

    pub fn with_aggression(mut self, aggression: u8) -> Self {
        self.aggression = aggression.min(10);
        self
    }

    pub fn with_specials(mut self, specials: impl IntoIterator<Item = PlayerId>) -> Self {
        self.specials = specials.into_iter().collect();
        self
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Simulates and applies the next over of the current innings.
    pub fn play_over(&self, m: &mut Match) -> std::result::Result<OverReport, SimulationError> {
        if m.status != MatchStatus::InProgress {
            return Err(MatchError::NotInProgress.into());
        }
        if m.current()?.current_bowler.is_none() {
            let bowler = select_next_bowler(m)?;
            m.set_bowler(bowler)?;
        }

        let ctx = self.analyzer.analyze_current(m, self.aggression, &self.specials)?;
        let over = self.engine.simulate_over(&ctx)?;

        let mut report = OverReport {
            innings: ctx.innings_number,
            over_number: ctx.over_number,
            bowler: ctx.bowler.id,
            strategy: over.strategy,
            deliveries: Vec::with_capacity(over.deliveries.len()),
            runs: 0,
            wickets: 0,
            score: ctx.score,
            total_wickets: ctx.wickets,
            innings_completed: None,
            match_finished: false,
        };

        for ball in over.applicable() {
            let applied = m.apply_ball(ball.clone())?;
            report.runs += applied.runs;
            report.wickets += u32::from(applied.wicket);
            report.deliveries.push(ball.clone());
            if applied.innings_completed.is_some() {
                report.innings_completed = applied.innings_completed;
                report.match_finished = applied.match_finished;
                break;
            }
            if applied.over_completed {
                break;
            }
        }
        report.score += report.runs;
        report.total_wickets += report.wickets;

        debug!(
            innings = report.innings,
            over = report.over_number,
            strategy = %report.strategy,
            runs = report.runs,
            wickets = report.wickets,
            "over applied"
        );
        Ok(report)
    }

    /// Plays `m` to a result, starting it first if it is still pending.
    pub fn play_match(&self, m: &mut Match) -> std::result::Result<Vec<OverReport>, SimulationError> {
        if m.status == MatchStatus::Pending {
            m.start()?;
        }
        let mut reports = Vec::with_capacity(m.overs_per_innings() as usize * 2);
        while !m.is_finished() {
            reports.push(self.play_over(m)?);
        }
        info!(
            match_id = %m.id,
            overs = reports.len(),
            result = m.result.as_deref().unwrap_or_default(),
            "match simulated"
        );
        Ok(reports)
    }
}
