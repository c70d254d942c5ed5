//! Final outcome of a match and its scorecard wording.

use serde::{Deserialize, Serialize};

use super::TeamId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "by", content = "margin")]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchOutcome {
    Won { winner: TeamId, margin: Margin },
    Tied,
    NoResult,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<TeamId> {
        match self {
            MatchOutcome::Won { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    /// "Team B won by 7 wickets", "Team A won by 1 run", "Match tied".
    pub fn describe(&self, winner_name: &str) -> String {
        match self {
            MatchOutcome::Won { margin: Margin::Runs(n), .. } => {
                format!("{} won by {} {}", winner_name, n, plural(*n, "run", "runs"))
            }
            MatchOutcome::Won { margin: Margin::Wickets(n), .. } => {
                format!("{} won by {} {}", winner_name, n, plural(*n, "wicket", "wickets"))
            }
            MatchOutcome::Tied => "Match tied".to_string(),
            MatchOutcome::NoResult => "No result".to_string(),
        }
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
