use serde::{Deserialize, Serialize};

use super::{Player, PlayerId, PlayerRole, TeamId, MAX_SKILL_RATING};
use crate::error::{MatchError, Result};

/// Smallest roster that can bat an innings (two openers).
pub const MIN_TEAM_SIZE: usize = 2;
pub const MAX_TEAM_SIZE: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Playing XI in batting order.
    pub players: Vec<Player>,
    #[serde(default)]
    pub substitutes: Vec<Player>,
    #[serde(default)]
    pub keeper_id: Option<PlayerId>,
    #[serde(default)]
    pub impact_player_used: bool,
}

impl Team {
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        let keeper_id =
            players.iter().find(|p| p.role == PlayerRole::WicketKeeper).map(|p| p.id);
        Self {
            id: TeamId::new(),
            name: name.into(),
            players,
            substitutes: Vec::new(),
            keeper_id,
            impact_player_used: false,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Team name must not be empty".to_string());
        }
        if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&self.players.len()) {
            return Err(format!(
                "Team {} must have {}-{} players, found {}",
                self.name,
                MIN_TEAM_SIZE,
                MAX_TEAM_SIZE,
                self.players.len()
            ));
        }
        let mut ids: Vec<PlayerId> =
            self.players.iter().chain(&self.substitutes).map(|p| p.id).collect();
        ids.sort();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(format!("Team {} lists a player twice", self.name));
        }
        if let Some(p) = self
            .players
            .iter()
            .chain(&self.substitutes)
            .find(|p| p.skill_rating.is_some_and(|r| r > MAX_SKILL_RATING))
        {
            return Err(format!(
                "Player {} skill rating must be 0-{}, found {}",
                p.name,
                MAX_SKILL_RATING,
                p.skill_rating.unwrap_or_default()
            ));
        }
        if let Some(keeper) = self.keeper_id {
            if !self.contains(keeper) {
                return Err(format!("Team {} keeper is not in the playing XI", self.name));
            }
        }
        Ok(())
    }

    /// Wickets that end an innings: one batter is always left not out.
    pub fn wicket_limit(&self) -> u32 {
        self.players.len().saturating_sub(1).max(1) as u32
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn require(&self, id: PlayerId) -> Result<&Player> {
        self.player(id).ok_or(MatchError::WrongTeam { player: id, team: self.id })
    }

    /// Batters still waiting to come in, in batting order.
    pub fn yet_to_bat(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.batting.has_batted())
    }

    /// Fielding keeper: the designated one, else the first listed keeper.
    pub fn keeper(&self) -> Option<PlayerId> {
        self.keeper_id.or_else(|| {
            self.players.iter().find(|p| p.role == PlayerRole::WicketKeeper).map(|p| p.id)
        })
    }

    /// One-time swap of a player who has not yet batted or bowled for a bench
    /// player, who takes the same batting position.
    pub fn substitute_impact_player(&mut self, out: PlayerId, incoming: PlayerId) -> Result<()> {
        if self.impact_player_used {
            return Err(MatchError::ImpactPlayerUsed(self.id));
        }
        let slot = self
            .players
            .iter()
            .position(|p| p.id == out)
            .ok_or(MatchError::WrongTeam { player: out, team: self.id })?;
        if self.players[slot].has_participated() {
            return Err(MatchError::AlreadyParticipated(out));
        }
        let bench = self
            .substitutes
            .iter()
            .position(|p| p.id == incoming)
            .ok_or(MatchError::WrongTeam { player: incoming, team: self.id })?;

        let mut sub = self.substitutes.remove(bench);
        sub.reset_match_records();
        let replaced = std::mem::replace(&mut self.players[slot], sub);
        if self.keeper_id == Some(replaced.id) {
            self.keeper_id = None;
        }
        self.substitutes.push(replaced);
        self.impact_player_used = true;
        Ok(())
    }

    pub fn reset_match_records(&mut self) {
        for player in &mut self.players {
            player.reset_match_records();
        }
        self.impact_player_used = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::create_test_team;

    #[test]
    fn test_wicket_limit_follows_roster_size() {
        let team = create_test_team("Lions", 1);
        assert_eq!(team.wicket_limit(), 10);

        let mut small = create_test_team("Cubs", 2);
        small.players.truncate(6);
        assert_eq!(small.wicket_limit(), 5);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut team = create_test_team("Lions", 1);
        assert!(team.validate().is_ok());
        let dup = team.players[0].clone();
        team.players[1] = dup;
        assert!(team.validate().is_err());
    }

    #[test]
    fn test_impact_player_is_one_time() {
        let mut team = create_test_team("Lions", 1);
        let sub_a = Player::new("Sub A", PlayerRole::Bowler);
        let sub_b = Player::new("Sub B", PlayerRole::Batter);
        let (a, b) = (sub_a.id, sub_b.id);
        team.substitutes = vec![sub_a, sub_b];

        let out = team.players[10].id;
        team.substitute_impact_player(out, a).unwrap();
        assert_eq!(team.players[10].id, a);
        assert!(team.impact_player_used);
        assert!(team.substitutes.iter().any(|p| p.id == out));

        let err = team.substitute_impact_player(team.players[9].id, b).unwrap_err();
        assert_eq!(err, MatchError::ImpactPlayerUsed(team.id));
    }

    #[test]
    fn test_impact_player_rejects_participant() {
        let mut team = create_test_team("Lions", 1);
        let sub = Player::new("Sub", PlayerRole::Bowler);
        let sub_id = sub.id;
        team.substitutes.push(sub);
        team.players[0].batting.status = crate::models::BattingStatus::NotOut;

        let opener = team.players[0].id;
        assert_eq!(
            team.substitute_impact_player(opener, sub_id),
            Err(MatchError::AlreadyParticipated(opener))
        );
        assert!(!team.impact_player_used);
    }
}
