use thiserror::Error;

use crate::models::{EventKind, MatchId, PlayerId, TeamId, WicketKind};

/// A delivery that breaks one of the shape rules every ball must satisfy,
/// whoever produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalDelivery {
    #[error("runs off the bat must be 0-6, found {0}")]
    RunsOutOfRange(u8),

    #[error("{event:?} cannot carry runs off the bat (found {runs})")]
    RunsOnExtra { event: EventKind, runs: u8 },

    #[error("{0:?} must carry at least one extra run")]
    MissingExtras(EventKind),

    #[error("{event:?} cannot carry extras (found {extras})")]
    UnexpectedExtras { event: EventKind, extras: u8 },

    #[error("wicket delivery without a wicket kind")]
    MissingWicketKind,

    #[error("wicket flag does not match event {0:?}")]
    WicketFlagMismatch(EventKind),

    #[error("wicket kind {0:?} given on a delivery that is not a wicket")]
    UnexpectedWicketKind(WicketKind),

    #[error("{0:?} dismissal requires a fielder")]
    MissingFielder(WicketKind),

    #[error("{0:?} dismissal cannot name a fielder")]
    UnexpectedFielder(WicketKind),

    #[error("only a run out may score runs on a wicket delivery ({kind:?} scored {runs})")]
    RunsOnDismissal { kind: WicketKind, runs: u8 },

    #[error("only a run out may dismiss the non-striker ({0:?})")]
    NonStrikerDismissal(WicketKind),

    #[error("{0:?} is not a legal dismissal on a free hit")]
    FreeHitDismissal(WicketKind),

    #[error("no-ball cannot carry both runs off the bat ({runs}) and byes ({byes})")]
    RunsAndByesOnNoBall { runs: u8, byes: u8 },

    #[error("{0:?} delivery cannot name a fielder")]
    FielderWithoutWicket(EventKind),

    #[error("{0:?} delivery cannot dismiss a player")]
    DismissedWithoutWicket(EventKind),
}

/// Invalid input and state-machine rejections.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid match settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Unknown match: {0}")]
    UnknownMatch(MatchId),

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("Player {player} does not belong to team {team}")]
    WrongTeam { player: PlayerId, team: TeamId },

    #[error("Match is not in progress")]
    NotInProgress,

    #[error("Match has already started")]
    AlreadyStarted,

    #[error("Innings {0} is already completed")]
    InningsCompleted(u8),

    #[error("Innings {0} does not belong to this match")]
    UnknownInnings(u8),

    #[error("No bowler set for the current over")]
    NoBowler,

    #[error("Bowler {0} bowled the previous over")]
    ConsecutiveOvers(PlayerId),

    #[error("Bowler {bowler} has used the full quota of {quota} overs")]
    BowlerQuotaExceeded { bowler: PlayerId, quota: u32 },

    #[error("A bowler is already set for over {0}")]
    OverInProgress(u32),

    #[error("Striker mismatch: expected {expected}, found {found}")]
    StrikerMismatch { expected: PlayerId, found: PlayerId },

    #[error("Bowler mismatch: expected {expected}, found {found}")]
    BowlerMismatch { expected: PlayerId, found: PlayerId },

    #[error("Dismissed player {0} is not at the crease")]
    NotAtCrease(PlayerId),

    #[error("No eligible bowler for over {0}")]
    NoEligibleBowler(u32),

    #[error("Impact player already used by team {0}")]
    ImpactPlayerUsed(TeamId),

    #[error("Player {0} has already taken part and cannot be substituted")]
    AlreadyParticipated(PlayerId),

    #[error("Player {0} is on the field and cannot be substituted")]
    OnField(PlayerId),

    #[error("Illegal delivery: {0}")]
    Illegal(#[from] IllegalDelivery),
}

impl MatchError {
    /// Rejections the caller can fix by supplying a corrected ball.
    pub fn is_delivery_rejection(&self) -> bool {
        matches!(
            self,
            MatchError::Illegal(_)
                | MatchError::StrikerMismatch { .. }
                | MatchError::BowlerMismatch { .. }
                | MatchError::NotAtCrease(_)
                | MatchError::WrongTeam { .. }
        )
    }
}

/// Over-level validation failure of a strategy's output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IllegalOver {
    #[error("over has {0} legal deliveries, expected 6")]
    LegalCount(usize),

    #[error("delivery {index}: {source}")]
    Delivery {
        index: usize,
        #[source]
        source: IllegalDelivery,
    },

    #[error("delivery {index} bowled by {found}, expected {expected}")]
    BowlerChanged {
        index: usize,
        expected: PlayerId,
        found: PlayerId,
    },

    #[error("delivery {index} faced by {found}, expected {expected}")]
    StrikerSequence {
        index: usize,
        expected: PlayerId,
        found: PlayerId,
    },

    #[error("delivery {index} names fielder {fielder} outside the bowling side")]
    UnknownFielder { index: usize, fielder: PlayerId },

    #[error("delivery {index} is tagged with over {found}, expected {expected}")]
    OverNumber {
        index: usize,
        expected: u32,
        found: u32,
    },

    #[error("closing delivery {found:?} disagrees with replay {expected:?}")]
    ClosingDelivery {
        expected: Option<usize>,
        found: Option<usize>,
    },
}

/// Strategy-local failures. Always recovered inside the engine by falling
/// through to the next strategy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("strategy declined the context")]
    Declined,

    #[error("cache miss")]
    CacheMiss,

    #[error("model call failed: {0}")]
    Model(String),

    #[error("model call timed out after {0}ms")]
    Timeout(u64),

    #[error("model output could not be parsed: {0}")]
    Parse(String),

    #[error("strategy produced an illegal over: {0}")]
    Illegal(#[from] IllegalOver),
}

/// Errors that escape the simulation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The terminal rule-based strategy always succeeds, so reaching this
    /// is a programming error.
    #[error("strategy chain exhausted without producing an over")]
    ExhaustedChain,

    #[error("invalid simulation context: {0}")]
    InvalidContext(String),
}

/// Anything that can stop an automated run of overs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
