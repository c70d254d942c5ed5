use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Ball, PlayerId, TeamId, BALLS_PER_OVER};

/// Position in an innings as completed overs plus balls, e.g. 4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct OverMark {
    pub overs: u32,
    pub balls: u32,
}

impl OverMark {
    pub fn from_legal_balls(legal: u32) -> Self {
        Self { overs: legal / BALLS_PER_OVER, balls: legal % BALLS_PER_OVER }
    }

    pub fn legal_balls(self) -> u32 {
        self.overs * BALLS_PER_OVER + self.balls
    }

    /// Overs as a decimal fraction for rate calculations (4.3 -> 4.5).
    pub fn as_overs_f32(self) -> f32 {
        self.legal_balls() as f32 / BALLS_PER_OVER as f32
    }
}

impl fmt::Display for OverMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.overs, self.balls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub wicket_number: u32,
    pub score: u32,
    pub over: OverMark,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    pub batters: [PlayerId; 2],
    pub runs: u32,
    /// Legal deliveries.
    pub balls: u32,
}

impl Partnership {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        Self { batters: [a, b], runs: 0, balls: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Extras {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    AllOut,
    OversExhausted,
    TargetReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum InningsStatus {
    #[default]
    NotStarted,
    Batting,
    Completed(CompletionReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Innings {
    /// 1 or 2
    pub number: u8,
    pub batting_team: TeamId,
    pub bowling_team: TeamId,
    pub score: u32,
    pub wickets: u32,
    pub wicket_limit: u32,
    pub max_overs: u32,
    /// Completed overs.
    pub overs: u32,
    /// Legal balls in the current over (0-5).
    pub balls: u32,
    pub target: Option<u32>,
    pub timeline: Vec<Ball>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub partnership: Option<Partnership>,
    pub partnerships: Vec<Partnership>,
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub current_bowler: Option<PlayerId>,
    pub previous_bowler: Option<PlayerId>,
    pub extras: Extras,
    /// Next legal delivery follows a no-ball.
    pub free_hit: bool,
    /// Runs charged to the bowler in the over in progress, for maidens.
    pub over_bowler_runs: u32,
    pub status: InningsStatus,
}

impl Innings {
    pub fn new(
        number: u8,
        batting_team: TeamId,
        bowling_team: TeamId,
        wicket_limit: u32,
        max_overs: u32,
        target: Option<u32>,
    ) -> Self {
        Self {
            number,
            batting_team,
            bowling_team,
            score: 0,
            wickets: 0,
            wicket_limit,
            max_overs,
            overs: 0,
            balls: 0,
            target,
            timeline: Vec::new(),
            fall_of_wickets: Vec::new(),
            partnership: None,
            partnerships: Vec::new(),
            striker: None,
            non_striker: None,
            current_bowler: None,
            previous_bowler: None,
            extras: Extras::default(),
            free_hit: false,
            over_bowler_runs: 0,
            status: InningsStatus::NotStarted,
        }
    }

    pub fn position(&self) -> OverMark {
        OverMark { overs: self.overs, balls: self.balls }
    }

    pub fn legal_balls(&self) -> u32 {
        self.position().legal_balls()
    }

    pub fn legal_balls_remaining(&self) -> u32 {
        (self.max_overs * BALLS_PER_OVER).saturating_sub(self.legal_balls())
    }

    pub fn wickets_in_hand(&self) -> u32 {
        self.wicket_limit.saturating_sub(self.wickets)
    }

    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.score))
    }

    pub fn current_run_rate(&self) -> f32 {
        let overs = self.position().as_overs_f32();
        if overs <= 0.0 {
            0.0
        } else {
            self.score as f32 / overs
        }
    }

    pub fn is_batting(&self) -> bool {
        self.status == InningsStatus::Batting
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, InningsStatus::Completed(_))
    }

    /// Scoreline such as "51/3 (4.2 ov)".
    pub fn summary(&self) -> String {
        format!("{}/{} ({} ov)", self.score, self.wickets, self.position())
    }

    /// Deliveries of the over in progress.
    pub fn current_over_balls(&self) -> impl Iterator<Item = &Ball> {
        let over = self.overs;
        self.timeline.iter().filter(move |b| b.over_number == over)
    }
}
