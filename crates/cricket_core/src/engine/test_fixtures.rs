//! Test Fixtures Module
//!
//! Shared helpers for state machine, analyzer and strategy tests.
//!
//! ## Usage
//! ```rust,ignore
//! #[cfg(test)]
//! use crate::engine::test_fixtures::*;
//! ```

use std::collections::BTreeSet;

use super::context::{ContextAnalyzer, SimulationContext};
use super::runner::select_next_bowler;
use crate::engine::config::PhaseConfig;
use crate::models::{
    CareerBatting, CareerBowling, CareerStats, Match, MatchFormat, MatchSettings, Player,
    PlayerId, PlayerRole, Team, TeamId, Toss, TossDecision,
};

// =============================================================================
// Team Creation Helpers
// =============================================================================

/// Batting order: top order, keeper at 3, two all-rounders, four bowlers.
const ROLES: [PlayerRole; 11] = [
    PlayerRole::Batter,
    PlayerRole::Batter,
    PlayerRole::WicketKeeper,
    PlayerRole::Batter,
    PlayerRole::Batter,
    PlayerRole::AllRounder,
    PlayerRole::AllRounder,
    PlayerRole::Bowler,
    PlayerRole::Bowler,
    PlayerRole::Bowler,
    PlayerRole::Bowler,
];

/// Stable player id: `team_no * 100 + slot`.
pub fn test_player_id(team_no: u128, slot: usize) -> PlayerId {
    PlayerId::from_u128(team_no * 100 + slot as u128 + 1)
}

/// Eleven players with stable ids and no career history.
pub fn create_test_team(name: &str, team_no: u128) -> Team {
    let players = ROLES
        .iter()
        .enumerate()
        .map(|(i, &role)| {
            Player::new(format!("{} Player {}", name, i + 1), role)
                .with_id(test_player_id(team_no, i))
                .with_skill(60 + (i as u8 % 4) * 5)
        })
        .collect();
    let mut team = Team::new(name, players);
    team.id = TeamId::from_u128(team_no);
    team
}

/// Same as [`create_test_team`] but every player carries career numbers.
pub fn create_test_team_with_careers(name: &str, team_no: u128) -> Team {
    let mut team = create_test_team(name, team_no);
    for (i, player) in team.players.iter_mut().enumerate() {
        let balls = 400 + i as u32 * 20;
        let batting = CareerBatting {
            innings: 30,
            runs: balls * 13 / 10,
            balls,
            fours: balls / 9,
            sixes: balls / 30,
            dismissals: 25,
        };
        let bowling = player.role.bowls().then_some(CareerBowling {
            balls: 1200,
            runs: 1500,
            wickets: 60,
            wides: 40,
            no_balls: 8,
        });
        player.career = Some(CareerStats { batting: Some(batting), bowling });
    }
    team
}

pub fn create_test_settings(format: MatchFormat) -> MatchSettings {
    let team_a = create_test_team("Team A", 1);
    let team_b = create_test_team("Team B", 2);
    let toss = Toss { winner: team_a.id, decision: TossDecision::Bat };
    MatchSettings { team_a, team_b, format, toss, seed: 42 }
}

pub fn create_started_match(format: MatchFormat) -> Match {
    let mut m = Match::new(create_test_settings(format)).expect("valid settings");
    m.start().expect("pending match starts");
    m
}

// =============================================================================
// Match State Helpers
// =============================================================================

pub fn striker(m: &Match) -> PlayerId {
    m.current().expect("current innings").striker.expect("striker")
}

pub fn current_bowler(m: &Match) -> PlayerId {
    m.current().expect("current innings").current_bowler.expect("bowler set")
}

/// Puts the last-listed bowler of the fielding side on.
pub fn set_first_bowler(m: &mut Match) {
    let bowling = m.current().expect("current innings").bowling_team;
    let id = m.team(bowling).expect("bowling team").players.last().expect("players").id;
    m.set_bowler(id).expect("bowler accepted");
}

/// Rotates to the next eligible bowler.
pub fn set_next_bowler(m: &mut Match) {
    let id = select_next_bowler(m).expect("eligible bowler");
    m.set_bowler(id).expect("bowler accepted");
}

/// Context for the over about to be bowled, with a bowler chosen if needed.
pub fn create_test_context(m: &mut Match, aggression: u8) -> SimulationContext {
    if m.current().expect("current innings").current_bowler.is_none() {
        set_next_bowler(m);
    }
    ContextAnalyzer::new(PhaseConfig::default())
        .analyze_current(m, aggression, &BTreeSet::new())
        .expect("context")
}
