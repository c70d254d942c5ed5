//! Context Analyzer
//!
//! Derives the strategy-facing [`SimulationContext`] from raw match state.
//! Strategies and the simulation engine only ever see the context.
//!
//! - Pure: same match state in, same context out
//! - Missing history degrades to neutral values (form 0.5, no profile)
//! - Malformed references (player outside its team, foreign innings) are errors

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::config::PhaseConfig;
use super::deterministic::{deterministic_seed, subcase};
use crate::error::{MatchError, Result};
use crate::models::{Innings, Match, MatchId, Player, PlayerId, Team, BALLS_PER_OVER};

const STRIKE_RATE_BASELINE: f32 = 130.0;
const ECONOMY_BASELINE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Powerplay,
    Middle,
    Death,
}

/// Phase of `over` (0-based) in an innings of `total_overs`.
pub fn classify_phase(over: u32, total_overs: u32, config: &PhaseConfig) -> MatchPhase {
    if over < config.powerplay_overs(total_overs) {
        MatchPhase::Powerplay
    } else if over >= config.death_start(total_overs) {
        MatchPhase::Death
    } else {
        MatchPhase::Middle
    }
}

/// Career plus in-match batting numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingProfile {
    pub strike_rate: f32,
    /// Fours and sixes per ball faced.
    pub boundary_rate: f32,
    /// Share of boundaries that are sixes.
    pub six_share: f32,
    /// Dismissals per ball faced.
    pub dismissal_rate: f32,
    pub balls_sample: u32,
}

/// Career plus in-match bowling numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingProfile {
    pub economy: f32,
    /// Wickets per legal ball.
    pub wicket_rate: f32,
    /// Wides and no-balls per legal ball.
    pub extras_rate: f32,
    pub balls_sample: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterSnapshot {
    pub id: PlayerId,
    pub skill: f32,
    /// 0.0-1.0, 0.5 neutral
    pub form: f32,
    pub profile: Option<BattingProfile>,
    pub runs: u32,
    pub balls: u32,
    pub is_special: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlerSnapshot {
    pub id: PlayerId,
    pub skill: f32,
    /// 0.0-1.0, 0.5 neutral
    pub form: f32,
    pub profile: Option<BowlingProfile>,
    pub overs_bowled: u32,
    pub is_special: bool,
}

/// Read-only snapshot handed to every strategy. Recomputed before each over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationContext {
    pub match_id: MatchId,
    pub innings_number: u8,
    /// 0-based number of the over about to be bowled.
    pub over_number: u32,
    /// Legal balls already bowled in this over.
    pub balls_in_over: u32,
    pub total_overs: u32,
    pub score: u32,
    pub wickets: u32,
    pub wicket_limit: u32,
    pub wickets_in_hand: u32,
    pub legal_balls_remaining: u32,
    pub overs_remaining: f32,
    pub target: Option<u32>,
    pub runs_needed: Option<u32>,
    pub required_run_rate: Option<f32>,
    pub current_run_rate: f32,
    pub phase: MatchPhase,
    pub pressure_index: f32,
    /// 0-10 dial supplied by the caller.
    pub aggression: u8,
    /// Aggression after phase and wickets, 0.0-1.0.
    pub effective_aggression: f32,
    pub free_hit: bool,
    pub striker: BatterSnapshot,
    pub non_striker: BatterSnapshot,
    pub bowler: BowlerSnapshot,
    pub partnership_runs: u32,
    pub partnership_balls: u32,
    /// Batters still to come, in order.
    pub next_batters: Vec<BatterSnapshot>,
    /// Whole fielding side, bowler included.
    pub fielders: Vec<PlayerId>,
    pub keeper: Option<PlayerId>,
    pub special_players: BTreeSet<PlayerId>,
    pub seed: u64,
}

impl SimulationContext {
    pub fn is_chasing(&self) -> bool {
        self.target.is_some()
    }

    /// True when striker or bowler is flagged special.
    pub fn has_special(&self) -> bool {
        self.striker.is_special || self.bowler.is_special
    }

    /// True when either batter or the bowler has any recorded history.
    pub fn has_history(&self) -> bool {
        self.striker.profile.is_some()
            || self.non_striker.profile.is_some()
            || self.bowler.profile.is_some()
    }

    pub fn batter(&self, id: PlayerId) -> Option<&BatterSnapshot> {
        [&self.striker, &self.non_striker]
            .into_iter()
            .chain(&self.next_batters)
            .find(|b| b.id == id)
    }

    /// Key for memoizing overs of materially identical situations.
    pub fn signature(&self, rrr_bucket_width: f32) -> ContextSignature {
        let width = if rrr_bucket_width > 0.0 { rrr_bucket_width } else { 1.0 };
        ContextSignature {
            phase: self.phase,
            innings_number: self.innings_number,
            rrr_bucket: self.required_run_rate.map(|rrr| (rrr / width).floor() as i32),
            wickets_in_hand: self.wickets_in_hand,
            striker: self.striker.id,
            non_striker: self.non_striker.id,
            next_batter: self.next_batters.first().map(|b| b.id),
            bowler: self.bowler.id,
            aggression: self.aggression,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextSignature {
    pub phase: MatchPhase,
    pub innings_number: u8,
    pub rrr_bucket: Option<i32>,
    pub wickets_in_hand: u32,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub next_batter: Option<PlayerId>,
    pub bowler: PlayerId,
    pub aggression: u8,
}

#[derive(Debug, Clone, Default)]
pub struct ContextAnalyzer {
    phase: PhaseConfig,
}

impl ContextAnalyzer {
    pub fn new(phase: PhaseConfig) -> Self {
        Self { phase }
    }

    /// Context for the current innings of `m` with its batters and bowler.
    pub fn analyze_current(
        &self,
        m: &Match,
        aggression: u8,
        specials: &BTreeSet<PlayerId>,
    ) -> Result<SimulationContext> {
        let innings = m.current()?;
        let batting = m.team(innings.batting_team)?;
        let bowling = m.team(innings.bowling_team)?;
        let striker = innings.striker.ok_or(MatchError::InningsCompleted(innings.number))?;
        let non_striker =
            innings.non_striker.ok_or(MatchError::InningsCompleted(innings.number))?;
        let bowler = innings.current_bowler.ok_or(MatchError::NoBowler)?;
        self.analyze(
            m,
            innings,
            batting,
            bowling,
            (striker, non_striker),
            bowler,
            specials,
            aggression,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn analyze(
        &self,
        m: &Match,
        innings: &Innings,
        batting: &Team,
        bowling: &Team,
        (striker, non_striker): (PlayerId, PlayerId),
        bowler: PlayerId,
        specials: &BTreeSet<PlayerId>,
        aggression: u8,
    ) -> Result<SimulationContext> {
        let own = m.innings(innings.number)?;
        if own.batting_team != innings.batting_team {
            return Err(MatchError::UnknownInnings(innings.number));
        }
        if batting.id != innings.batting_team {
            return Err(MatchError::UnknownTeam(batting.id));
        }
        if bowling.id != innings.bowling_team {
            return Err(MatchError::UnknownTeam(bowling.id));
        }

        let striker = batter_snapshot(batting.require(striker)?, specials);
        let non_striker = batter_snapshot(batting.require(non_striker)?, specials);
        let bowler = bowler_snapshot(bowling.require(bowler)?, specials);
        let next_batters =
            batting.yet_to_bat().map(|p| batter_snapshot(p, specials)).collect();

        let aggression = aggression.min(10);
        let total_overs = innings.max_overs;
        let total_balls = (total_overs * BALLS_PER_OVER).max(1);
        let legal_balls_remaining = innings.legal_balls_remaining();
        let overs_remaining = legal_balls_remaining as f32 / BALLS_PER_OVER as f32;
        let runs_needed = innings.runs_needed();
        let required_run_rate = runs_needed
            .filter(|_| legal_balls_remaining > 0)
            .map(|needed| needed as f32 / overs_remaining);
        let current_run_rate = innings.current_run_rate();
        let phase = classify_phase(innings.overs, total_overs, &self.phase);

        let wickets_lost = innings.wickets as f32 / innings.wicket_limit.max(1) as f32;
        let progress = innings.legal_balls() as f32 / total_balls as f32;
        let chase = match required_run_rate {
            Some(rrr) => ((rrr - current_run_rate) / 6.0 + 0.5).clamp(0.0, 1.0),
            None => 0.5 * progress,
        };
        let pressure_index = (0.45 * wickets_lost + 0.20 * progress + 0.35 * chase).clamp(0.0, 1.0);

        let phase_bonus = match phase {
            MatchPhase::Powerplay => 0.05,
            MatchPhase::Middle => 0.0,
            MatchPhase::Death => 0.15,
        };
        let chase_bonus = match required_run_rate {
            Some(rrr) if rrr > current_run_rate + 2.0 => 0.1,
            _ => 0.0,
        };
        let effective_aggression = (aggression as f32 / 10.0 + phase_bonus - 0.25 * wickets_lost
            + chase_bonus)
            .clamp(0.0, 1.0);

        let (partnership_runs, partnership_balls) =
            innings.partnership.as_ref().map(|p| (p.runs, p.balls)).unwrap_or_default();

        Ok(SimulationContext {
            match_id: m.id,
            innings_number: innings.number,
            over_number: innings.overs,
            balls_in_over: innings.balls,
            total_overs,
            score: innings.score,
            wickets: innings.wickets,
            wicket_limit: innings.wicket_limit,
            wickets_in_hand: innings.wickets_in_hand(),
            legal_balls_remaining,
            overs_remaining,
            target: innings.target,
            runs_needed,
            required_run_rate,
            current_run_rate,
            phase,
            pressure_index,
            aggression,
            effective_aggression,
            free_hit: innings.free_hit,
            striker,
            non_striker,
            bowler,
            partnership_runs,
            partnership_balls,
            next_batters,
            fielders: bowling.players.iter().map(|p| p.id).collect(),
            keeper: bowling.keeper(),
            special_players: specials.clone(),
            seed: deterministic_seed(m.seed, innings.number, innings.overs, subcase::OVER),
        })
    }
}

fn batter_snapshot(player: &Player, specials: &BTreeSet<PlayerId>) -> BatterSnapshot {
    let record = &player.batting;
    let form = if record.balls_faced == 0 {
        0.5
    } else {
        (0.5 + (record.strike_rate() - STRIKE_RATE_BASELINE) / 200.0).clamp(0.0, 1.0)
    };
    BatterSnapshot {
        id: player.id,
        skill: player.skill_factor(),
        form,
        profile: batting_profile(player),
        runs: record.runs,
        balls: record.balls_faced,
        is_special: specials.contains(&player.id),
    }
}

fn bowler_snapshot(player: &Player, specials: &BTreeSet<PlayerId>) -> BowlerSnapshot {
    let record = &player.bowling;
    let form = if record.balls_bowled == 0 {
        0.5
    } else {
        (0.5 + (ECONOMY_BASELINE - record.economy()) / 8.0).clamp(0.0, 1.0)
    };
    BowlerSnapshot {
        id: player.id,
        skill: player.skill_factor(),
        form,
        profile: bowling_profile(player),
        overs_bowled: record.completed_overs(),
        is_special: specials.contains(&player.id),
    }
}

fn batting_profile(player: &Player) -> Option<BattingProfile> {
    let record = &player.batting;
    let career = player.career_batting();
    let balls = record.balls_faced + career.map_or(0, |c| c.balls);
    if balls == 0 {
        return None;
    }
    let runs = record.runs + career.map_or(0, |c| c.runs);
    let fours = record.fours + career.map_or(0, |c| c.fours);
    let sixes = record.sixes + career.map_or(0, |c| c.sixes);
    let out_now = u32::from(record.dismissal.is_some());
    let dismissals = out_now + career.map_or(0, |c| c.dismissals);
    let boundaries = fours + sixes;

    Some(BattingProfile {
        strike_rate: runs as f32 * 100.0 / balls as f32,
        boundary_rate: boundaries as f32 / balls as f32,
        six_share: if boundaries == 0 { 0.25 } else { sixes as f32 / boundaries as f32 },
        dismissal_rate: dismissals as f32 / balls as f32,
        balls_sample: balls,
    })
}

fn bowling_profile(player: &Player) -> Option<BowlingProfile> {
    let record = &player.bowling;
    let career = player.career_bowling();
    let balls = record.balls_bowled + career.map_or(0, |c| c.balls);
    if balls == 0 {
        return None;
    }
    let runs = record.runs_conceded + career.map_or(0, |c| c.runs);
    let wickets = record.wickets + career.map_or(0, |c| c.wickets);
    let extras = record.wides + record.no_balls + career.map_or(0, |c| c.wides + c.no_balls);

    Some(BowlingProfile {
        economy: runs as f32 * BALLS_PER_OVER as f32 / balls as f32,
        wicket_rate: wickets as f32 / balls as f32,
        extras_rate: extras as f32 / balls as f32,
        balls_sample: balls,
    })
}
