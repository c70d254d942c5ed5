use serde::{Deserialize, Serialize};

use super::{PlayerId, WicketKind};

/// Playing role, used when picking bowlers and the wicket-keeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    #[default]
    Batter,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl PlayerRole {
    pub fn bowls(self) -> bool {
        matches!(self, PlayerRole::Bowler | PlayerRole::AllRounder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BattingStatus {
    #[default]
    DidNotBat,
    NotOut,
    Out,
}

/// How a batter was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
    pub kind: WicketKind,
    pub bowler: PlayerId,
    pub fielder: Option<PlayerId>,
}

/// Per-match batting figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BattingRecord {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub status: BattingStatus,
    pub dismissal: Option<Dismissal>,
}

impl BattingRecord {
    /// Runs per hundred balls; 0 before the first ball.
    pub fn strike_rate(&self) -> f32 {
        if self.balls_faced == 0 {
            0.0
        } else {
            self.runs as f32 * 100.0 / self.balls_faced as f32
        }
    }

    pub fn has_batted(&self) -> bool {
        self.status != BattingStatus::DidNotBat
    }
}

/// Per-match bowling figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BowlingRecord {
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub maidens: u32,
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
}

impl BowlingRecord {
    /// Runs per six legal balls; 0 before the first ball.
    pub fn economy(&self) -> f32 {
        if self.balls_bowled == 0 {
            0.0
        } else {
            self.runs_conceded as f32 * 6.0 / self.balls_bowled as f32
        }
    }

    pub fn completed_overs(&self) -> u32 {
        self.balls_bowled / 6
    }

    /// Overs in `overs.balls` notation, e.g. "3.2".
    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.balls_bowled / 6, self.balls_bowled % 6)
    }
}

/// Career batting history supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CareerBatting {
    pub innings: u32,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissals: u32,
}

/// Career bowling history supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CareerBowling {
    pub balls: u32,
    pub runs: u32,
    pub wickets: u32,
    #[serde(default)]
    pub wides: u32,
    #[serde(default)]
    pub no_balls: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CareerStats {
    #[serde(default)]
    pub batting: Option<CareerBatting>,
    #[serde(default)]
    pub bowling: Option<CareerBowling>,
}

pub const MAX_SKILL_RATING: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// 0-100, checked by `Team::validate`
    #[serde(default)]
    pub skill_rating: Option<u8>,
    #[serde(default)]
    pub role: PlayerRole,
    #[serde(default)]
    pub career: Option<CareerStats>,
    #[serde(default)]
    pub batting: BattingRecord,
    #[serde(default)]
    pub bowling: BowlingRecord,
}

impl Player {
    pub fn new(name: impl Into<String>, role: PlayerRole) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            skill_rating: None,
            role,
            career: None,
            batting: BattingRecord::default(),
            bowling: BowlingRecord::default(),
        }
    }

    pub fn with_id(mut self, id: PlayerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_skill(mut self, rating: u8) -> Self {
        self.skill_rating = Some(rating.min(MAX_SKILL_RATING));
        self
    }

    pub fn with_career(mut self, career: CareerStats) -> Self {
        self.career = Some(career);
        self
    }

    /// Skill normalised to 0.0-1.0, 0.5 when unrated.
    pub fn skill_factor(&self) -> f32 {
        self.skill_rating.map(|r| r.min(MAX_SKILL_RATING) as f32 / 100.0).unwrap_or(0.5)
    }

    /// True once the player has batted or bowled in this match.
    pub fn has_participated(&self) -> bool {
        self.batting.has_batted() || self.bowling.balls_bowled > 0
    }

    pub fn career_batting(&self) -> Option<&CareerBatting> {
        self.career.as_ref().and_then(|c| c.batting.as_ref()).filter(|b| b.balls > 0)
    }

    pub fn career_bowling(&self) -> Option<&CareerBowling> {
        self.career.as_ref().and_then(|c| c.bowling.as_ref()).filter(|b| b.balls > 0)
    }

    /// Clear per-match figures before a new match.
    pub fn reset_match_records(&mut self) {
        self.batting = BattingRecord::default();
        self.bowling = BowlingRecord::default();
    }
}
