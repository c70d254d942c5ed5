//! One delivery and the shape rules every delivery must satisfy.

use serde::{Deserialize, Serialize};

use super::PlayerId;
use crate::error::IllegalDelivery;

pub const MAX_BAT_RUNS: u8 = 6;
pub const BALLS_PER_OVER: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Run,
    Wicket,
    Wide,
    NoBall,
    LegBye,
    Bye,
}

impl EventKind {
    /// Wides and no-balls are re-bowled and do not use up a ball of the over.
    pub fn is_legal(self) -> bool {
        !matches!(self, EventKind::Wide | EventKind::NoBall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WicketKind {
    Bowled,
    Caught,
    #[serde(rename = "LBW")]
    Lbw,
    #[serde(rename = "Run Out")]
    RunOut,
    Stumped,
    #[serde(rename = "Hit Wicket")]
    HitWicket,
}

impl WicketKind {
    pub const ALL: [WicketKind; 6] = [
        WicketKind::Bowled,
        WicketKind::Caught,
        WicketKind::Lbw,
        WicketKind::RunOut,
        WicketKind::Stumped,
        WicketKind::HitWicket,
    ];

    pub fn requires_fielder(self) -> bool {
        matches!(self, WicketKind::Caught | WicketKind::RunOut | WicketKind::Stumped)
    }

    /// Run outs are not credited to the bowler.
    pub fn credited_to_bowler(self) -> bool {
        self != WicketKind::RunOut
    }

    pub fn label(self) -> &'static str {
        match self {
            WicketKind::Bowled => "Bowled",
            WicketKind::Caught => "Caught",
            WicketKind::Lbw => "LBW",
            WicketKind::RunOut => "Run Out",
            WicketKind::Stumped => "Stumped",
            WicketKind::HitWicket => "Hit Wicket",
        }
    }
}

/// A recorded delivery. Immutable once it is on an innings timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub event: EventKind,
    /// Runs off the bat.
    pub runs: u8,
    pub extras: u8,
    pub is_wicket: bool,
    #[serde(default, rename = "wicketType")]
    pub wicket_kind: Option<WicketKind>,
    #[serde(default, rename = "fielderId")]
    pub fielder_id: Option<PlayerId>,
    /// Set only when a run out dismisses the non-striker.
    #[serde(default)]
    pub dismissed_id: Option<PlayerId>,
    pub striker_id: PlayerId,
    pub bowler_id: PlayerId,
    #[serde(default)]
    pub display: String,
    pub over_number: u32,
}

impl Ball {
    fn base(event: EventKind, striker: PlayerId, bowler: PlayerId, over: u32) -> Self {
        Self {
            event,
            runs: 0,
            extras: 0,
            is_wicket: false,
            wicket_kind: None,
            fielder_id: None,
            dismissed_id: None,
            striker_id: striker,
            bowler_id: bowler,
            display: String::new(),
            over_number: over,
        }
    }

    fn labelled(mut self) -> Self {
        self.display = self.token();
        self
    }

    pub fn run(striker: PlayerId, bowler: PlayerId, over: u32, runs: u8) -> Self {
        Self { runs, ..Self::base(EventKind::Run, striker, bowler, over) }.labelled()
    }

    pub fn dot(striker: PlayerId, bowler: PlayerId, over: u32) -> Self {
        Self::run(striker, bowler, over, 0)
    }

    /// `extras` includes the one-run penalty.
    pub fn wide(striker: PlayerId, bowler: PlayerId, over: u32, extras: u8) -> Self {
        Self { extras, ..Self::base(EventKind::Wide, striker, bowler, over) }.labelled()
    }

    pub fn no_ball(striker: PlayerId, bowler: PlayerId, over: u32, bat_runs: u8) -> Self {
        Self { runs: bat_runs, extras: 1, ..Self::base(EventKind::NoBall, striker, bowler, over) }
            .labelled()
    }

    pub fn bye(striker: PlayerId, bowler: PlayerId, over: u32, extras: u8) -> Self {
        Self { extras, ..Self::base(EventKind::Bye, striker, bowler, over) }.labelled()
    }

    pub fn leg_bye(striker: PlayerId, bowler: PlayerId, over: u32, extras: u8) -> Self {
        Self { extras, ..Self::base(EventKind::LegBye, striker, bowler, over) }.labelled()
    }

    pub fn wicket(
        striker: PlayerId,
        bowler: PlayerId,
        over: u32,
        kind: WicketKind,
        fielder: Option<PlayerId>,
    ) -> Self {
        Self {
            is_wicket: true,
            wicket_kind: Some(kind),
            fielder_id: fielder,
            ..Self::base(EventKind::Wicket, striker, bowler, over)
        }
        .labelled()
    }

    /// Run out after `completed` runs, dismissing `dismissed`.
    pub fn run_out(
        striker: PlayerId,
        bowler: PlayerId,
        over: u32,
        completed: u8,
        fielder: PlayerId,
        dismissed: PlayerId,
    ) -> Self {
        let mut ball = Self::wicket(striker, bowler, over, WicketKind::RunOut, Some(fielder));
        ball.runs = completed;
        if dismissed != striker {
            ball.dismissed_id = Some(dismissed);
        }
        ball.labelled()
    }

    pub fn is_legal(&self) -> bool {
        self.event.is_legal()
    }

    pub fn total_runs(&self) -> u32 {
        self.runs as u32 + self.extras as u32
    }

    /// Runs physically run between the wickets; odd values swap strike.
    /// No-ball extras beyond the penalty are byes the batters ran.
    pub fn runs_run(&self) -> u8 {
        match self.event {
            EventKind::Run | EventKind::Wicket => self.runs,
            EventKind::NoBall => self.runs.saturating_add(self.extras.saturating_sub(1)),
            EventKind::Bye | EventKind::LegBye => self.extras,
            EventKind::Wide => self.extras.saturating_sub(1),
        }
    }

    /// Runs charged against the bowler's figures. Byes are never charged,
    /// including those run off a no-ball.
    pub fn bowler_runs(&self) -> u32 {
        match self.event {
            EventKind::Bye | EventKind::LegBye => 0,
            EventKind::NoBall => self.runs as u32 + u32::from(self.extras.min(1)),
            _ => self.total_runs(),
        }
    }

    /// Whether the delivery counts as a ball faced by the striker.
    pub fn faced_by_striker(&self) -> bool {
        self.event != EventKind::Wide
    }

    pub fn dismissed_player(&self) -> Option<PlayerId> {
        self.is_wicket.then(|| self.dismissed_id.unwrap_or(self.striker_id))
    }

    /// Scorecard token: ".", "4", "W", "Wd", "2Wd", "Nb+4", "1Lb", "2B".
    pub fn token(&self) -> String {
        match self.event {
            EventKind::Run if self.runs == 0 => ".".to_string(),
            EventKind::Run => self.runs.to_string(),
            EventKind::Wicket if self.runs > 0 => format!("{}W", self.runs),
            EventKind::Wicket => "W".to_string(),
            EventKind::Wide if self.extras <= 1 => "Wd".to_string(),
            EventKind::Wide => format!("{}Wd", self.extras),
            EventKind::NoBall if self.runs > 0 => format!("Nb+{}", self.runs),
            EventKind::NoBall if self.extras > 1 => format!("Nb+{}B", self.extras - 1),
            EventKind::NoBall => "Nb".to_string(),
            EventKind::LegBye => format!("{}Lb", self.extras),
            EventKind::Bye => format!("{}B", self.extras),
        }
    }

    /// Checks the rules a delivery must satisfy on its own, independent of
    /// any innings state.
    pub fn validate(&self) -> Result<(), IllegalDelivery> {
        if self.runs > MAX_BAT_RUNS {
            return Err(IllegalDelivery::RunsOutOfRange(self.runs));
        }
        if self.is_wicket != (self.event == EventKind::Wicket) {
            return Err(IllegalDelivery::WicketFlagMismatch(self.event));
        }

        match self.event {
            EventKind::Run => {
                if self.extras != 0 {
                    return Err(IllegalDelivery::UnexpectedExtras {
                        event: self.event,
                        extras: self.extras,
                    });
                }
            }
            EventKind::Bye | EventKind::LegBye | EventKind::Wide => {
                if self.runs != 0 {
                    return Err(IllegalDelivery::RunsOnExtra { event: self.event, runs: self.runs });
                }
                if self.extras == 0 {
                    return Err(IllegalDelivery::MissingExtras(self.event));
                }
            }
            EventKind::NoBall => {
                if self.extras == 0 {
                    return Err(IllegalDelivery::MissingExtras(self.event));
                }
                if self.runs > 0 && self.extras > 1 {
                    return Err(IllegalDelivery::RunsAndByesOnNoBall {
                        runs: self.runs,
                        byes: self.extras - 1,
                    });
                }
            }
            EventKind::Wicket => {
                let kind = self.wicket_kind.ok_or(IllegalDelivery::MissingWicketKind)?;
                if self.extras != 0 {
                    return Err(IllegalDelivery::UnexpectedExtras {
                        event: self.event,
                        extras: self.extras,
                    });
                }
                if self.runs > 0 && kind != WicketKind::RunOut {
                    return Err(IllegalDelivery::RunsOnDismissal { kind, runs: self.runs });
                }
                if kind.requires_fielder() && self.fielder_id.is_none() {
                    return Err(IllegalDelivery::MissingFielder(kind));
                }
                if !kind.requires_fielder() && self.fielder_id.is_some() {
                    return Err(IllegalDelivery::UnexpectedFielder(kind));
                }
                if kind != WicketKind::RunOut
                    && self.dismissed_id.is_some_and(|d| d != self.striker_id)
                {
                    return Err(IllegalDelivery::NonStrikerDismissal(kind));
                }
            }
        }

        if !self.is_wicket {
            if let Some(kind) = self.wicket_kind {
                return Err(IllegalDelivery::UnexpectedWicketKind(kind));
            }
            if self.fielder_id.is_some() {
                return Err(IllegalDelivery::FielderWithoutWicket(self.event));
            }
            if self.dismissed_id.is_some() {
                return Err(IllegalDelivery::DismissedWithoutWicket(self.event));
            }
        }
        Ok(())
    }
}
