pub mod ball;
pub mod cricket_match;
pub mod ids;
pub mod innings;
pub mod match_result;
pub mod match_setup;
pub mod player;
pub mod team;

pub use ball::{Ball, EventKind, WicketKind, BALLS_PER_OVER, MAX_BAT_RUNS};
pub use cricket_match::{Match, MatchStatus};
pub use ids::{MatchId, PlayerId, TeamId};
pub use innings::{
    CompletionReason, Extras, FallOfWicket, Innings, InningsStatus, OverMark, Partnership,
};
pub use match_result::{Margin, MatchOutcome};
pub use match_setup::{MatchFormat, MatchSettings, Toss, TossDecision, MAX_OVERS};
pub use player::{
    BattingRecord, BattingStatus, BowlingRecord, CareerBatting, CareerBowling, CareerStats,
    Dismissal, Player, PlayerRole, MAX_SKILL_RATING,
};
pub use team::{Team, MAX_TEAM_SIZE, MIN_TEAM_SIZE};
