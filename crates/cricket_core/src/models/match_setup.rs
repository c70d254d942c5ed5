//! Validated settings a match is created from.

use serde::{Deserialize, Serialize};

use super::{PlayerId, Team, TeamId};
use crate::error::{MatchError, Result};

pub const MAX_OVERS: u32 = 50;

/// Match length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format", content = "overs")]
pub enum MatchFormat {
    T10,
    T20,
    Odi,
    Custom(u32),
}

impl MatchFormat {
    pub fn overs(self) -> u32 {
        match self {
            MatchFormat::T10 => 10,
            MatchFormat::T20 => 20,
            MatchFormat::Odi => 50,
            MatchFormat::Custom(overs) => overs,
        }
    }

    /// Overs a single bowler may bowl: a fifth of the innings, rounded up.
    pub fn bowler_quota(self) -> u32 {
        self.overs().div_ceil(5).max(1)
    }
}

impl Default for MatchFormat {
    fn default() -> Self {
        MatchFormat::T20
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toss {
    pub winner: TeamId,
    pub decision: TossDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub format: MatchFormat,
    pub toss: Toss,
    #[serde(default)]
    pub seed: u64,
}

impl MatchSettings {
    pub fn validate(&self) -> Result<()> {
        self.team_a.validate().map_err(MatchError::InvalidSettings)?;
        self.team_b.validate().map_err(MatchError::InvalidSettings)?;

        if self.team_a.id == self.team_b.id {
            return Err(MatchError::InvalidSettings("a team cannot play itself".to_string()));
        }
        let listed = |team: &Team| -> Vec<PlayerId> {
            team.players.iter().chain(&team.substitutes).map(|p| p.id).collect()
        };
        let b_ids = listed(&self.team_b);
        if listed(&self.team_a).iter().any(|id| b_ids.contains(id)) {
            return Err(MatchError::InvalidSettings(
                "a player cannot appear for both teams".to_string(),
            ));
        }

        let overs = self.format.overs();
        if overs == 0 || overs > MAX_OVERS {
            return Err(MatchError::InvalidSettings(format!(
                "overs per innings must be 1-{}, found {}",
                MAX_OVERS, overs
            )));
        }

        if self.toss.winner != self.team_a.id && self.toss.winner != self.team_b.id {
            return Err(MatchError::UnknownTeam(self.toss.winner));
        }
        Ok(())
    }

    /// Team batting first, from the toss.
    pub fn batting_first(&self) -> TeamId {
        let loser =
            if self.toss.winner == self.team_a.id { self.team_b.id } else { self.team_a.id };
        match self.toss.decision {
            TossDecision::Bat => self.toss.winner,
            TossDecision::Bowl => loser,
        }
    }
}
