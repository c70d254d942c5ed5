//! Abstract delivery outcomes and their text tokens.
//!
//! Strategies speak in outcomes; [`super::builder::OverBuilder`] turns them
//! into [`Ball`]s with the right striker, fielder and incoming batter.
//!
//! | token    | outcome                              |
//! |----------|--------------------------------------|
//! | `.` `0`  | dot                                  |
//! | `1`-`6`  | runs off the bat                     |
//! | `Wd`     | wide, `3Wd` wide with three extras   |
//! | `Nb`     | no-ball, `Nb+4` with four off the bat |
//! | `1B`     | byes                                 |
//! | `2Lb`    | leg byes                             |
//! | `W`      | bowled                               |
//! | `W:c`    | caught (also `b` `lbw` `st` `hw`)    |
//! | `1W:ro`  | striker run out after one run        |
//! | `W:ro:ns`| non-striker run out                  |

use serde::{Deserialize, Serialize};

use crate::models::{Ball, EventKind, WicketKind, MAX_BAT_RUNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DeliveryOutcome {
    Runs { runs: u8 },
    /// Extras including the one-run penalty.
    Wide { extras: u8 },
    NoBall { bat_runs: u8 },
    Bye { extras: u8 },
    LegBye { extras: u8 },
    /// Striker dismissed by anything but a run out.
    Wicket { kind: WicketKind },
    RunOut { completed: u8, non_striker: bool },
}

impl DeliveryOutcome {
    pub const DOT: DeliveryOutcome = DeliveryOutcome::Runs { runs: 0 };

    pub fn runs(runs: u8) -> Self {
        DeliveryOutcome::Runs { runs }
    }

    pub fn wicket(kind: WicketKind) -> Self {
        if kind == WicketKind::RunOut {
            DeliveryOutcome::RunOut { completed: 0, non_striker: false }
        } else {
            DeliveryOutcome::Wicket { kind }
        }
    }

    pub fn is_legal(&self) -> bool {
        !matches!(self, DeliveryOutcome::Wide { .. } | DeliveryOutcome::NoBall { .. })
    }

    pub fn is_wicket(&self) -> bool {
        matches!(self, DeliveryOutcome::Wicket { .. } | DeliveryOutcome::RunOut { .. })
    }

    /// Outcome a recorded ball was built from.
    pub fn from_ball(ball: &Ball) -> Self {
        match ball.event {
            EventKind::Run => DeliveryOutcome::Runs { runs: ball.runs },
            EventKind::Wide => DeliveryOutcome::Wide { extras: ball.extras },
            EventKind::NoBall => DeliveryOutcome::NoBall { bat_runs: ball.runs },
            EventKind::Bye => DeliveryOutcome::Bye { extras: ball.extras },
            EventKind::LegBye => DeliveryOutcome::LegBye { extras: ball.extras },
            EventKind::Wicket => match ball.wicket_kind {
                Some(WicketKind::RunOut) | None => DeliveryOutcome::RunOut {
                    completed: ball.runs,
                    non_striker: ball.dismissed_id.is_some(),
                },
                Some(kind) => DeliveryOutcome::Wicket { kind },
            },
        }
    }

    pub fn token(&self) -> String {
        match *self {
            DeliveryOutcome::Runs { runs: 0 } => ".".to_string(),
            DeliveryOutcome::Runs { runs } => runs.to_string(),
            DeliveryOutcome::Wide { extras } if extras <= 1 => "Wd".to_string(),
            DeliveryOutcome::Wide { extras } => format!("{}Wd", extras),
            DeliveryOutcome::NoBall { bat_runs: 0 } => "Nb".to_string(),
            DeliveryOutcome::NoBall { bat_runs } => format!("Nb+{}", bat_runs),
            DeliveryOutcome::Bye { extras } => format!("{}B", extras),
            DeliveryOutcome::LegBye { extras } => format!("{}Lb", extras),
            DeliveryOutcome::Wicket { kind } => format!("W:{}", wicket_code(kind)),
            DeliveryOutcome::RunOut { completed, non_striker } => {
                let prefix = if completed > 0 { completed.to_string() } else { String::new() };
                let suffix = if non_striker { ":ns" } else { "" };
                format!("{}W:ro{}", prefix, suffix)
            }
        }
    }
}

fn wicket_code(kind: WicketKind) -> &'static str {
    match kind {
        WicketKind::Bowled => "b",
        WicketKind::Caught => "c",
        WicketKind::Lbw => "lbw",
        WicketKind::RunOut => "ro",
        WicketKind::Stumped => "st",
        WicketKind::HitWicket => "hw",
    }
}

fn parse_count(text: &str, default: u8, token: &str) -> Result<u8, String> {
    if text.is_empty() {
        return Ok(default);
    }
    text.parse::<u8>().map_err(|_| format!("bad count in token '{}'", token))
}

/// Parses one token such as `4`, `2Wd`, `Nb+1` or `1W:ro:ns`.
pub fn parse_token(token: &str) -> Result<DeliveryOutcome, String> {
    let t = token.trim();
    if t == "." {
        return Ok(DeliveryOutcome::DOT);
    }
    if let Ok(runs) = t.parse::<u8>() {
        if runs > MAX_BAT_RUNS {
            return Err(format!("runs out of range in token '{}'", t));
        }
        return Ok(DeliveryOutcome::Runs { runs });
    }
    if let Some(rest) = t.strip_prefix("Nb") {
        let bat_runs = match rest.strip_prefix('+') {
            Some(n) => parse_count(n, 0, t)?,
            None if rest.is_empty() => 0,
            None => return Err(format!("unknown token '{}'", t)),
        };
        if bat_runs > MAX_BAT_RUNS {
            return Err(format!("runs out of range in token '{}'", t));
        }
        return Ok(DeliveryOutcome::NoBall { bat_runs });
    }
    if let Some(count) = t.strip_suffix("Wd") {
        return Ok(DeliveryOutcome::Wide { extras: parse_count(count, 1, t)?.max(1) });
    }
    if let Some(count) = t.strip_suffix("Lb") {
        return Ok(DeliveryOutcome::LegBye { extras: parse_count(count, 1, t)?.max(1) });
    }
    if let Some(count) = t.strip_suffix('B') {
        return Ok(DeliveryOutcome::Bye { extras: parse_count(count, 1, t)?.max(1) });
    }
    if let Some(pos) = t.find('W') {
        let completed = parse_count(&t[..pos], 0, t)?;
        let mut parts = t[pos + 1..].split(':').skip(1);
        let code = parts.next().unwrap_or("b");
        let kind = match code {
            "b" => WicketKind::Bowled,
            "c" => WicketKind::Caught,
            "lbw" => WicketKind::Lbw,
            "ro" => WicketKind::RunOut,
            "st" => WicketKind::Stumped,
            "hw" => WicketKind::HitWicket,
            _ => return Err(format!("unknown wicket code in token '{}'", t)),
        };
        if kind == WicketKind::RunOut {
            let non_striker = parts.next() == Some("ns");
            if completed > 3 {
                return Err(format!("too many completed runs in token '{}'", t));
            }
            return Ok(DeliveryOutcome::RunOut { completed, non_striker });
        }
        if completed > 0 {
            return Err(format!("only a run out scores on a wicket ('{}')", t));
        }
        return Ok(DeliveryOutcome::Wicket { kind });
    }
    Err(format!("unknown token '{}'", t))
}

/// Parses whitespace or comma separated tokens.
pub fn parse_outcomes(text: &str) -> Result<Vec<DeliveryOutcome>, String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(parse_token)
        .collect()
}
