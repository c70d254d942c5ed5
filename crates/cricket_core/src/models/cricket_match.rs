use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Innings, MatchFormat, MatchId, MatchOutcome, MatchSettings, Player, PlayerId, Team, TeamId, Toss};
use crate::error::{MatchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Finished,
}

/// A match between two teams. State transitions live in
/// [`crate::engine::state_machine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub teams: [Team; 2],
    pub format: MatchFormat,
    pub toss: Toss,
    pub innings: Vec<Innings>,
    /// 1 or 2 once started, 0 while pending.
    pub current_innings: u8,
    pub status: MatchStatus,
    pub result: Option<String>,
    pub outcome: Option<MatchOutcome>,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn new(settings: MatchSettings) -> Result<Self> {
        settings.validate()?;
        let MatchSettings { mut team_a, mut team_b, format, toss, seed } = settings;
        team_a.reset_match_records();
        team_b.reset_match_records();

        Ok(Self {
            id: MatchId::new(),
            teams: [team_a, team_b],
            format,
            toss,
            innings: Vec::with_capacity(2),
            current_innings: 0,
            status: MatchStatus::Pending,
            result: None,
            outcome: None,
            seed,
            created_at: Utc::now(),
            finished_at: None,
        })
    }

    pub fn overs_per_innings(&self) -> u32 {
        self.format.overs()
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.iter().find(|t| t.id == id).ok_or(MatchError::UnknownTeam(id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id).ok_or(MatchError::UnknownTeam(id))
    }

    pub fn opponent(&self, id: TeamId) -> Result<TeamId> {
        match self.teams.iter().position(|t| t.id == id) {
            Some(0) => Ok(self.teams[1].id),
            Some(_) => Ok(self.teams[0].id),
            None => Err(MatchError::UnknownTeam(id)),
        }
    }

    /// Batting and bowling teams of an innings, mutable together.
    pub fn sides_mut(&mut self, batting: TeamId) -> Result<(&mut Team, &mut Team)> {
        let [a, b] = &mut self.teams;
        if a.id == batting {
            Ok((a, b))
        } else if b.id == batting {
            Ok((b, a))
        } else {
            Err(MatchError::UnknownTeam(batting))
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.teams.iter().find_map(|t| t.player(id))
    }

    pub fn innings(&self, number: u8) -> Result<&Innings> {
        self.innings
            .iter()
            .find(|i| i.number == number)
            .ok_or(MatchError::UnknownInnings(number))
    }

    pub fn current(&self) -> Result<&Innings> {
        self.innings(self.current_innings)
    }

    pub fn current_mut(&mut self) -> Result<&mut Innings> {
        let number = self.current_innings;
        self.innings
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(MatchError::UnknownInnings(number))
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Scorecard line per innings, e.g. "Team A 50/4 (5.0 ov)".
    pub fn scoreline(&self) -> Vec<String> {
        self.innings
            .iter()
            .map(|i| {
                let name = self.team(i.batting_team).map(|t| t.name.as_str()).unwrap_or("?");
                format!("{} {}", name, i.summary())
            })
            .collect()
    }
}
