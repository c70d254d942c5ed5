//! Match State Machine
//!
//! Turns one delivery into the next consistent match state.
//!
//! - Match: `Pending -> InProgress -> Finished`, never backwards
//! - Innings: `NotStarted -> Batting -> Completed(reason)`
//!
//! Every check runs before the first mutation, so a rejected ball leaves the
//! match exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::strike::StrikePair;
use crate::error::{IllegalDelivery, MatchError, Result};
use crate::models::{
    Ball, BattingStatus, CompletionReason, Dismissal, EventKind, FallOfWicket, Innings,
    InningsStatus, Margin, Match, MatchOutcome, MatchStatus, OverMark, Partnership, PlayerId,
    TeamId, TossDecision, WicketKind, BALLS_PER_OVER,
};

/// What applying one ball changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApplyOutcome {
    pub innings: u8,
    pub runs: u32,
    pub wicket: bool,
    pub over_completed: bool,
    pub free_hit_next: bool,
    pub innings_completed: Option<CompletionReason>,
    pub match_finished: bool,
}

/// Applies one delivery to the current innings of `m`.
pub fn apply_ball(m: &mut Match, ball: Ball) -> Result<ApplyOutcome> {
    m.apply_ball(ball)
}

impl Match {
    /// Team batting first, from the toss.
    pub fn batting_first(&self) -> Result<TeamId> {
        let loser = self.opponent(self.toss.winner)?;
        Ok(match self.toss.decision {
            TossDecision::Bat => self.toss.winner,
            TossDecision::Bowl => loser,
        })
    }

    /// Overs one bowler may bowl, never fewer than the bowling side needs to
    /// cover an innings without anyone bowling consecutive overs.
    pub fn bowler_quota(&self, bowling_team: TeamId) -> Result<u32> {
        let bowlers = self.team(bowling_team)?.players.len().max(1) as u32;
        Ok(self.format.bowler_quota().max(self.overs_per_innings().div_ceil(bowlers)))
    }

    /// `Pending -> InProgress`: opens the first innings.
    pub fn start(&mut self) -> Result<()> {
        if self.status != MatchStatus::Pending {
            return Err(MatchError::AlreadyStarted);
        }
        let batting = self.batting_first()?;
        self.open_innings(1, batting, None)?;
        self.status = MatchStatus::InProgress;
        info!(match_id = %self.id, "match started");
        Ok(())
    }

    fn open_innings(&mut self, number: u8, batting: TeamId, target: Option<u32>) -> Result<()> {
        let bowling = self.opponent(batting)?;
        let max_overs = self.overs_per_innings();
        let (batting_team, _) = self.sides_mut(batting)?;

        let mut openers = batting_team.players.iter_mut().filter(|p| !p.batting.has_batted());
        let (Some(first), Some(second)) = (openers.next(), openers.next()) else {
            return Err(MatchError::InvalidSettings(format!(
                "team {} cannot field two openers",
                batting_team.name
            )));
        };
        first.batting.status = BattingStatus::NotOut;
        second.batting.status = BattingStatus::NotOut;
        let (striker, non_striker) = (first.id, second.id);

        let mut innings = Innings::new(
            number,
            batting,
            bowling,
            batting_team.wicket_limit(),
            max_overs,
            target,
        );
        innings.striker = Some(striker);
        innings.non_striker = Some(non_striker);
        innings.partnership = Some(Partnership::new(striker, non_striker));
        innings.status = InningsStatus::Batting;

        self.innings.push(innings);
        self.current_innings = number;
        debug!(innings = number, ?target, "innings opened");
        Ok(())
    }

    /// Names the bowler of the next over.
    pub fn set_bowler(&mut self, bowler: PlayerId) -> Result<()> {
        if self.status != MatchStatus::InProgress {
            return Err(MatchError::NotInProgress);
        }
        let innings = self.current()?;
        if !innings.is_batting() {
            return Err(MatchError::InningsCompleted(innings.number));
        }
        if innings.current_bowler.is_some() && innings.current_over_balls().next().is_some() {
            return Err(MatchError::OverInProgress(innings.overs));
        }
        if innings.previous_bowler == Some(bowler) {
            return Err(MatchError::ConsecutiveOvers(bowler));
        }
        let bowling_team = innings.bowling_team;
        let player = self.team(bowling_team)?.require(bowler)?;
        let quota = self.bowler_quota(bowling_team)?;
        if player.bowling.completed_overs() >= quota {
            return Err(MatchError::BowlerQuotaExceeded { bowler, quota });
        }

        self.current_mut()?.current_bowler = Some(bowler);
        Ok(())
    }

    /// One-time impact player swap for `team`.
    pub fn substitute_impact_player(
        &mut self,
        team: TeamId,
        out: PlayerId,
        incoming: PlayerId,
    ) -> Result<()> {
        if self.is_finished() {
            return Err(MatchError::NotInProgress);
        }
        if let Ok(innings) = self.current() {
            let on_field = [innings.striker, innings.non_striker, innings.current_bowler];
            if innings.is_batting() && on_field.contains(&Some(out)) {
                return Err(MatchError::OnField(out));
            }
        }
        self.team_mut(team)?.substitute_impact_player(out, incoming)
    }

    /// Ends the match without a result.
    pub fn abandon(&mut self) -> Result<()> {
        if self.is_finished() {
            return Err(MatchError::NotInProgress);
        }
        self.finish(MatchOutcome::NoResult)
    }

    /// Validates then applies one delivery.
    pub fn apply_ball(&mut self, mut ball: Ball) -> Result<ApplyOutcome> {
        let pair = self.check_delivery(&ball)?;
        if ball.display.is_empty() {
            ball.display = ball.token();
        }

        let number = self.current_innings;
        let innings = self.current()?;
        let (batting_id, bowling_id) = (innings.batting_team, innings.bowling_team);
        let incoming = if ball.is_wicket && innings.wickets + 1 < innings.wicket_limit {
            self.team(batting_id)?.yet_to_bat().next().map(|p| p.id)
        } else {
            None
        };

        let (batting, bowling) = self.sides_mut(batting_id)?;
        debug_assert_eq!(bowling.id, bowling_id);

        // batter
        let striker = batting.player_mut(ball.striker_id).ok_or(MatchError::WrongTeam {
            player: ball.striker_id,
            team: batting_id,
        })?;
        if ball.faced_by_striker() {
            striker.batting.balls_faced += 1;
        }
        if matches!(ball.event, EventKind::Run | EventKind::NoBall | EventKind::Wicket) {
            striker.batting.runs += ball.runs as u32;
            if ball.event != EventKind::Wicket {
                match ball.runs {
                    4 => striker.batting.fours += 1,
                    6 => striker.batting.sixes += 1,
                    _ => {}
                }
            }
        }

        // bowler
        let bowler = bowling.player_mut(ball.bowler_id).ok_or(MatchError::WrongTeam {
            player: ball.bowler_id,
            team: bowling_id,
        })?;
        if ball.is_legal() {
            bowler.bowling.balls_bowled += 1;
        }
        bowler.bowling.runs_conceded += ball.bowler_runs();
        match ball.event {
            EventKind::Wide => bowler.bowling.wides += 1,
            EventKind::NoBall => bowler.bowling.no_balls += 1,
            _ => {}
        }
        if ball.wicket_kind.is_some_and(WicketKind::credited_to_bowler) {
            bowler.bowling.wickets += 1;
        }

        // dismissal
        let dismissed = ball.dismissed_player();
        if let (Some(out), Some(kind)) = (dismissed, ball.wicket_kind) {
            if let Some(player) = batting.player_mut(out) {
                player.batting.status = BattingStatus::Out;
                player.batting.dismissal =
                    Some(Dismissal { kind, bowler: ball.bowler_id, fielder: ball.fielder_id });
            }
        }
        if let Some(new) = incoming {
            if let Some(player) = batting.player_mut(new) {
                player.batting.status = BattingStatus::NotOut;
            }
        }

        let innings = self.current_mut()?;
        let mut outcome = ApplyOutcome {
            innings: number,
            runs: ball.total_runs(),
            wicket: ball.is_wicket,
            ..Default::default()
        };

        innings.score += ball.total_runs();
        innings.over_bowler_runs += ball.bowler_runs();
        match ball.event {
            EventKind::Wide => innings.extras.wides += ball.extras as u32,
            EventKind::NoBall => innings.extras.no_balls += ball.extras as u32,
            EventKind::Bye => innings.extras.byes += ball.extras as u32,
            EventKind::LegBye => innings.extras.leg_byes += ball.extras as u32,
            _ => {}
        }
        if let Some(partnership) = innings.partnership.as_mut() {
            partnership.runs += ball.total_runs();
            if ball.is_legal() {
                partnership.balls += 1;
            }
        }

        if ball.event == EventKind::NoBall {
            innings.free_hit = true;
        } else if ball.is_legal() {
            innings.free_hit = false;
        }
        outcome.free_hit_next = innings.free_hit;

        if ball.is_legal() {
            innings.balls += 1;
        }

        let mut pair = pair;
        pair.after_delivery(&ball, incoming);

        if let Some(out) = dismissed {
            innings.wickets += 1;
            innings.fall_of_wickets.push(FallOfWicket {
                wicket_number: innings.wickets,
                score: innings.score,
                over: OverMark::from_legal_balls(innings.legal_balls()),
                player_id: out,
            });
            if let Some(closed) = innings.partnership.take() {
                innings.partnerships.push(closed);
            }
            if let Some(new) = incoming {
                let survivor = if pair.striker == new { pair.non_striker } else { pair.striker };
                innings.partnership = Some(Partnership::new(survivor, new));
            }
        }

        let over_number = ball.over_number;
        innings.timeline.push(ball);

        if innings.balls == BALLS_PER_OVER {
            innings.overs += 1;
            innings.balls = 0;
            outcome.over_completed = true;
            pair.end_of_over();
        }
        innings.striker = Some(pair.striker);
        innings.non_striker = Some(pair.non_striker);

        let reason = completion_reason(innings);
        let maiden = outcome.over_completed && innings.over_bowler_runs == 0;
        let finished_bowler = if outcome.over_completed || reason.is_some() {
            innings.over_bowler_runs = 0;
            innings.previous_bowler = innings.current_bowler.take();
            innings.previous_bowler
        } else {
            None
        };
        if let Some(reason) = reason {
            innings.status = InningsStatus::Completed(reason);
            if let Some(closed) = innings.partnership.take() {
                innings.partnerships.push(closed);
            }
            outcome.innings_completed = Some(reason);
        }

        debug!(
            innings = number,
            over = over_number,
            score = innings.score,
            wickets = innings.wickets,
            "delivery applied"
        );

        if maiden {
            if let Some(id) = finished_bowler {
                if let Some(player) = self.team_mut(bowling_id)?.player_mut(id) {
                    player.bowling.maidens += 1;
                }
            }
        }

        if let Some(reason) = reason {
            info!(innings = number, ?reason, "innings completed");
            outcome.match_finished = self.on_innings_completed()?;
        }
        Ok(outcome)
    }

    /// All checks for `ball`; returns the batters at the crease.
    fn check_delivery(&self, ball: &Ball) -> Result<StrikePair> {
        if self.status != MatchStatus::InProgress {
            return Err(MatchError::NotInProgress);
        }
        let innings = self.current()?;
        if !innings.is_batting() {
            return Err(MatchError::InningsCompleted(innings.number));
        }

        ball.validate()?;

        let bowler = innings.current_bowler.ok_or(MatchError::NoBowler)?;
        if ball.bowler_id != bowler {
            return Err(MatchError::BowlerMismatch { expected: bowler, found: ball.bowler_id });
        }
        let (Some(striker), Some(non_striker)) = (innings.striker, innings.non_striker) else {
            return Err(MatchError::InningsCompleted(innings.number));
        };
        if ball.striker_id != striker {
            return Err(MatchError::StrikerMismatch { expected: striker, found: ball.striker_id });
        }
        self.team(innings.batting_team)?.require(striker)?;
        self.team(innings.bowling_team)?.require(bowler)?;
        if let Some(dismissed) = ball.dismissed_id {
            if dismissed != striker && dismissed != non_striker {
                return Err(MatchError::NotAtCrease(dismissed));
            }
        }
        if let Some(fielder) = ball.fielder_id {
            let bowling = self.team(innings.bowling_team)?;
            if !bowling.contains(fielder) {
                return Err(MatchError::WrongTeam { player: fielder, team: bowling.id });
            }
        }
        if innings.free_hit {
            if let Some(kind) = ball.wicket_kind.filter(|k| *k != WicketKind::RunOut) {
                return Err(IllegalDelivery::FreeHitDismissal(kind).into());
            }
        }
        Ok(StrikePair::new(striker, non_striker))
    }

    /// First innings: open the chase. Second: settle the result.
    fn on_innings_completed(&mut self) -> Result<bool> {
        let innings = self.current()?;
        if innings.number == 1 {
            let target = innings.score + 1;
            let chasing = innings.bowling_team;
            self.open_innings(2, chasing, Some(target))?;
            return Ok(false);
        }

        let first = self.innings(1)?;
        let second = self.innings(2)?;
        let outcome = if second.score > first.score {
            MatchOutcome::Won {
                winner: second.batting_team,
                margin: Margin::Wickets(second.wickets_in_hand()),
            }
        } else if second.score == first.score {
            MatchOutcome::Tied
        } else {
            MatchOutcome::Won {
                winner: first.batting_team,
                margin: Margin::Runs(first.score - second.score),
            }
        };
        self.finish(outcome)?;
        Ok(true)
    }

    fn finish(&mut self, outcome: MatchOutcome) -> Result<()> {
        let winner_name = match outcome.winner() {
            Some(id) => self.team(id)?.name.clone(),
            None => String::new(),
        };
        let summary = outcome.describe(&winner_name);
        info!(match_id = %self.id, result = %summary, "match finished");
        self.result = Some(summary);
        self.outcome = Some(outcome);
        self.status = MatchStatus::Finished;
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }
}

fn completion_reason(innings: &Innings) -> Option<CompletionReason> {
    if innings.target.is_some_and(|t| innings.score >= t) {
        Some(CompletionReason::TargetReached)
    } else if innings.wickets >= innings.wicket_limit {
        Some(CompletionReason::AllOut)
    } else if innings.overs >= innings.max_overs {
        Some(CompletionReason::OversExhausted)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::*;
    use crate::models::MatchFormat;
    use proptest::prelude::*;

    fn started(format: MatchFormat) -> Match {
        let mut m = Match::new(create_test_settings(format)).unwrap();
        m.start().unwrap();
        m
    }

    fn bowl_dots(m: &mut Match, legal: u32) {
        for _ in 0..legal {
            let ball = Ball::dot(striker(m), current_bowler(m), m.current().unwrap().overs);
            m.apply_ball(ball).unwrap();
        }
    }

    #[test]
    fn test_start_opens_first_innings() {
        let m = started(MatchFormat::T20);
        assert_eq!(m.status, MatchStatus::InProgress);
        assert_eq!(m.current_innings, 1);
        let innings = m.current().unwrap();
        assert_eq!(innings.batting_team, m.batting_first().unwrap());
        assert!(innings.is_batting());
        let batting = m.team(innings.batting_team).unwrap();
        assert_eq!(innings.striker, Some(batting.players[0].id));
        assert_eq!(innings.non_striker, Some(batting.players[1].id));
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut m = started(MatchFormat::T20);
        assert_eq!(m.start(), Err(MatchError::AlreadyStarted));
    }

    #[test]
    fn test_ball_without_bowler_rejected() {
        let mut m = started(MatchFormat::T20);
        let ball = Ball::dot(striker(&m), PlayerId::from_u128(1), 0);
        assert_eq!(m.apply_ball(ball), Err(MatchError::NoBowler));
    }

    #[test]
    fn test_caught_without_fielder_rejected_state_unchanged() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let before = m.clone();

        let ball = Ball::wicket(striker(&m), current_bowler(&m), 0, WicketKind::Caught, None);
        let err = m.apply_ball(ball).unwrap_err();
        assert_eq!(err, MatchError::Illegal(IllegalDelivery::MissingFielder(WicketKind::Caught)));
        assert_eq!(m, before);
    }

    #[test]
    fn test_bye_with_bat_runs_rejected() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let mut ball = Ball::bye(striker(&m), current_bowler(&m), 0, 1);
        ball.runs = 2;
        assert!(matches!(m.apply_ball(ball), Err(MatchError::Illegal(_))));
        assert_eq!(m.current().unwrap().score, 0);
    }

    #[test]
    fn test_wrong_striker_rejected() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let ns = m.current().unwrap().non_striker.unwrap();
        let ball = Ball::dot(ns, current_bowler(&m), 0);
        assert!(matches!(m.apply_ball(ball), Err(MatchError::StrikerMismatch { .. })));
    }

    #[test]
    fn test_fielder_from_batting_side_rejected() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let ns = m.current().unwrap().non_striker.unwrap();
        let ball = Ball::wicket(striker(&m), current_bowler(&m), 0, WicketKind::Caught, Some(ns));
        assert!(matches!(m.apply_ball(ball), Err(MatchError::WrongTeam { .. })));
    }

    #[test]
    fn test_scoring_extras_and_records() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));

        m.apply_ball(Ball::run(s, b, 0, 4)).unwrap();
        m.apply_ball(Ball::wide(s, b, 0, 1)).unwrap();
        m.apply_ball(Ball::leg_bye(s, b, 0, 2)).unwrap();
        m.apply_ball(Ball::no_ball(s, b, 0, 6)).unwrap();

        let innings = m.current().unwrap();
        assert_eq!(innings.score, 4 + 1 + 2 + 7);
        assert_eq!(innings.balls, 2);
        assert_eq!(innings.extras.wides, 1);
        assert_eq!(innings.extras.leg_byes, 2);
        assert_eq!(innings.extras.no_balls, 1);
        assert!(innings.free_hit);
        assert_eq!(innings.timeline.len(), 4);

        let batter = m.player(s).unwrap();
        assert_eq!(batter.batting.runs, 10);
        assert_eq!(batter.batting.balls_faced, 3);
        assert_eq!(batter.batting.fours, 1);
        assert_eq!(batter.batting.sixes, 1);

        let bowler = m.player(b).unwrap();
        assert_eq!(bowler.bowling.balls_bowled, 2);
        assert_eq!(bowler.bowling.runs_conceded, 4 + 1 + 7);
        assert_eq!(bowler.bowling.wides, 1);
        assert_eq!(bowler.bowling.no_balls, 1);
    }

    #[test]
    fn test_free_hit_only_allows_run_out() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));
        m.apply_ball(Ball::no_ball(s, b, 0, 0)).unwrap();

        let bowled = Ball::wicket(s, b, 0, WicketKind::Bowled, None);
        assert_eq!(
            m.apply_ball(bowled),
            Err(MatchError::Illegal(IllegalDelivery::FreeHitDismissal(WicketKind::Bowled)))
        );

        // a wide keeps the free hit alive, a legal ball consumes it
        m.apply_ball(Ball::wide(s, b, 0, 1)).unwrap();
        assert!(m.current().unwrap().free_hit);
        m.apply_ball(Ball::dot(s, b, 0)).unwrap();
        assert!(!m.current().unwrap().free_hit);
    }

    #[test]
    fn test_wicket_bookkeeping() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));
        let ns = m.current().unwrap().non_striker.unwrap();
        let fielder = m.team(m.current().unwrap().bowling_team).unwrap().players[3].id;

        m.apply_ball(Ball::run(s, b, 0, 3)).unwrap();
        let outcome = m.apply_ball(Ball::wicket(ns, b, 0, WicketKind::Caught, Some(fielder))).unwrap();
        assert!(outcome.wicket);

        let innings = m.current().unwrap();
        assert_eq!(innings.wickets, 1);
        assert_eq!(
            innings.fall_of_wickets[0],
            FallOfWicket {
                wicket_number: 1,
                score: 3,
                over: OverMark { overs: 0, balls: 2 },
                player_id: ns,
            }
        );
        let batting = m.team(innings.batting_team).unwrap();
        let new_batter = batting.players[2].id;
        assert_eq!(innings.striker, Some(new_batter));
        assert_eq!(innings.non_striker, Some(s));
        assert_eq!(innings.partnerships.len(), 1);
        assert_eq!(innings.partnerships[0].runs, 3);
        assert_eq!(innings.partnership.as_ref().unwrap().batters, [s, new_batter]);

        let out = m.player(ns).unwrap();
        assert_eq!(out.batting.status, BattingStatus::Out);
        assert_eq!(out.batting.dismissal.unwrap().fielder, Some(fielder));
        assert_eq!(m.player(b).unwrap().bowling.wickets, 1);
    }

    #[test]
    fn test_run_out_not_credited_to_bowler() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));
        let ns = m.current().unwrap().non_striker.unwrap();
        let fielder = m.team(m.current().unwrap().bowling_team).unwrap().players[4].id;

        m.apply_ball(Ball::run_out(s, b, 0, 1, fielder, ns)).unwrap();
        let innings = m.current().unwrap();
        assert_eq!(innings.score, 1);
        assert_eq!(innings.fall_of_wickets[0].player_id, ns);
        assert_eq!(m.player(b).unwrap().bowling.wickets, 0);
        assert_eq!(m.player(s).unwrap().batting.runs, 1);
        // crossed on the single: original striker at the non-striker's end,
        // so the new batter replaced ns at the striker's end
        let new_batter = m.team(innings.batting_team).unwrap().players[2].id;
        assert_eq!(innings.striker, Some(new_batter));
        assert_eq!(innings.non_striker, Some(s));
    }

    #[test]
    fn test_over_completion_rotates_and_clears_bowler() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));
        bowl_dots(&mut m, 6);

        let innings = m.current().unwrap();
        assert_eq!(innings.overs, 1);
        assert_eq!(innings.balls, 0);
        assert_eq!(innings.current_bowler, None);
        assert_eq!(innings.previous_bowler, Some(b));
        assert_eq!(innings.non_striker, Some(s));
        assert_eq!(m.player(b).unwrap().bowling.maidens, 1);

        assert_eq!(m.set_bowler(b), Err(MatchError::ConsecutiveOvers(b)));
    }

    #[test]
    fn test_set_bowler_rejects_batting_side_and_mid_over() {
        let mut m = started(MatchFormat::T20);
        let batter = striker(&m);
        assert!(matches!(m.set_bowler(batter), Err(MatchError::WrongTeam { .. })));

        set_first_bowler(&mut m);
        bowl_dots(&mut m, 1);
        let other = m.team(m.current().unwrap().bowling_team).unwrap().players[9].id;
        assert_eq!(m.set_bowler(other), Err(MatchError::OverInProgress(0)));
    }

    #[test]
    fn test_bowler_quota_enforced() {
        let mut m = started(MatchFormat::Custom(5));
        let bowling = m.current().unwrap().bowling_team;
        let (a, b) = {
            let team = m.team(bowling).unwrap();
            (team.players[10].id, team.players[9].id)
        };
        assert_eq!(m.bowler_quota(bowling).unwrap(), 1);
        m.set_bowler(a).unwrap();
        bowl_dots(&mut m, 6);
        m.set_bowler(b).unwrap();
        bowl_dots(&mut m, 6);
        assert_eq!(m.set_bowler(a), Err(MatchError::BowlerQuotaExceeded { bowler: a, quota: 1 }));
    }

    #[test]
    fn test_all_out_completes_innings_and_opens_chase() {
        let mut settings = create_test_settings(MatchFormat::T20);
        settings.team_a.players.truncate(4);
        settings.team_b.players.truncate(4);
        let mut m = Match::new(settings).unwrap();
        m.start().unwrap();
        set_first_bowler(&mut m);
        let first_batting = m.current().unwrap().batting_team;

        m.apply_ball(Ball::run(striker(&m), current_bowler(&m), 0, 2)).unwrap();
        for i in 0..3 {
            let ball = Ball::wicket(striker(&m), current_bowler(&m), 0, WicketKind::Bowled, None);
            let outcome = m.apply_ball(ball).unwrap();
            assert_eq!(outcome.innings_completed.is_some(), i == 2);
        }

        let first = m.innings(1).unwrap();
        assert_eq!(first.status, InningsStatus::Completed(CompletionReason::AllOut));
        assert_eq!(first.wickets, 3);
        assert_eq!(first.fall_of_wickets.len(), 3);
        assert_eq!(m.current_innings, 2);
        let second = m.current().unwrap();
        assert_eq!(second.target, Some(3));
        assert_ne!(second.batting_team, first_batting);
        assert!(second.current_bowler.is_none());
    }

    #[test]
    fn test_chase_scenario_team_b_wins_by_7_wickets() {
        let mut settings = create_test_settings(MatchFormat::Custom(5));
        settings.team_a.name = "Team A".to_string();
        settings.team_b.name = "Team B".to_string();
        settings.toss = crate::models::Toss {
            winner: settings.team_a.id,
            decision: TossDecision::Bat,
        };
        let mut m = Match::new(settings).unwrap();
        m.start().unwrap();

        // Team A: 50 in 5 overs, ten runs an over
        for _ in 0..5 {
            set_next_bowler(&mut m);
            let over = m.current().unwrap().overs;
            for runs in [4, 0, 4, 0, 2, 0] {
                m.apply_ball(Ball::run(striker(&m), current_bowler(&m), over, runs)).unwrap();
            }
        }
        assert_eq!(m.innings(1).unwrap().score, 50);
        assert_eq!(m.current().unwrap().target, Some(51));

        // Team B: 51/3 in 4.2 overs
        let mut outcome = ApplyOutcome::default();
        for over in 0..5u32 {
            set_next_bowler(&mut m);
            for ball_no in 0..6u32 {
                let (s, b) = (striker(&m), current_bowler(&m));
                let ball = match (over, ball_no) {
                    (0..=2, 0) => Ball::wicket(s, b, over, WicketKind::Bowled, None),
                    (4, 0) => Ball::run(s, b, over, 6),
                    (4, 1) => Ball::run(s, b, over, 3),
                    _ => Ball::run(s, b, over, 2),
                };
                outcome = m.apply_ball(ball).unwrap();
                if outcome.match_finished {
                    break;
                }
            }
            if outcome.match_finished {
                break;
            }
        }

        let chase = m.innings(2).unwrap();
        assert_eq!(chase.score, 51);
        assert_eq!(chase.wickets, 3);
        assert_eq!(chase.position(), OverMark { overs: 4, balls: 2 });
        assert_eq!(chase.status, InningsStatus::Completed(CompletionReason::TargetReached));
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.result.as_deref(), Some("Team B won by 7 wickets"));
        assert!(outcome.match_finished);

        let late = Ball::dot(chase.striker.unwrap(), PlayerId::from_u128(1), 4);
        assert_eq!(m.apply_ball(late), Err(MatchError::NotInProgress));
    }

    #[test]
    fn test_defending_side_wins_by_runs_and_tie() {
        for (chase_runs, expected) in [(0u8, "won by 30 runs"), (5u8, "Match tied")] {
            let mut m = started(MatchFormat::Custom(1));
            set_next_bowler(&mut m);
            for _ in 0..6 {
                m.apply_ball(Ball::run(striker(&m), current_bowler(&m), 0, 5)).unwrap();
            }
            assert_eq!(m.current_innings, 2);
            set_next_bowler(&mut m);
            for _ in 0..6 {
                m.apply_ball(Ball::run(striker(&m), current_bowler(&m), 0, chase_runs)).unwrap();
            }
            assert!(m.is_finished());
            assert!(m.result.as_deref().unwrap().contains(expected), "{:?}", m.result);
        }
    }

    #[test]
    fn test_abandon_sets_no_result() {
        let mut m = started(MatchFormat::T20);
        m.abandon().unwrap();
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.outcome, Some(MatchOutcome::NoResult));
        assert_eq!(m.result.as_deref(), Some("No result"));
        assert_eq!(m.abandon(), Err(MatchError::NotInProgress));
    }

    #[test]
    fn test_impact_player_before_batting() {
        let mut m = started(MatchFormat::T20);
        let batting = m.current().unwrap().batting_team;
        let sub = crate::models::Player::new("Impact", crate::models::PlayerRole::AllRounder);
        let sub_id = sub.id;
        m.team_mut(batting).unwrap().substitutes.push(sub);
        let opener = striker(&m);
        assert_eq!(
            m.substitute_impact_player(batting, opener, sub_id),
            Err(MatchError::AlreadyParticipated(opener))
        );
        let tail = m.team(batting).unwrap().players[10].id;
        m.substitute_impact_player(batting, tail, sub_id).unwrap();
        assert!(m.team(batting).unwrap().impact_player_used);
    }

    #[test]
    fn test_impact_player_cannot_replace_current_bowler() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let bowling = m.current().unwrap().bowling_team;
        let sub = crate::models::Player::new("Impact", crate::models::PlayerRole::Bowler);
        let sub_id = sub.id;
        m.team_mut(bowling).unwrap().substitutes.push(sub);

        let b = current_bowler(&m);
        assert_eq!(m.substitute_impact_player(bowling, b, sub_id), Err(MatchError::OnField(b)));
        assert!(!m.team(bowling).unwrap().impact_player_used);
    }

    #[test]
    fn test_bowler_missing_from_side_rejects_without_mutation() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let bowling = m.current().unwrap().bowling_team;
        let (s, b) = (striker(&m), current_bowler(&m));
        let sub = crate::models::Player::new("Impact", crate::models::PlayerRole::Bowler);
        let sub_id = sub.id;
        let team = m.team_mut(bowling).unwrap();
        team.substitutes.push(sub);
        team.substitute_impact_player(b, sub_id).unwrap();
        let before = m.clone();

        let err = m.apply_ball(Ball::run(s, b, 0, 4)).unwrap_err();
        assert_eq!(err, MatchError::WrongTeam { player: b, team: bowling });
        assert_eq!(m, before);
    }

    #[test]
    fn test_no_ball_byes_rotate_strike() {
        let mut m = started(MatchFormat::T20);
        set_first_bowler(&mut m);
        let (s, b) = (striker(&m), current_bowler(&m));
        let mut ball = Ball::no_ball(s, b, 0, 0);
        ball.extras = 2;
        m.apply_ball(ball).unwrap();

        let innings = m.current().unwrap();
        assert_ne!(striker(&m), s);
        assert_eq!(innings.score, 2);
        assert_eq!(innings.extras.no_balls, 2);
        assert_eq!(m.player(b).unwrap().bowling.runs_conceded, 1);
        assert_eq!(m.player(s).unwrap().batting.runs, 0);
    }

    proptest! {
        /// Wicket count moves by exactly one on wicket balls and never otherwise.
        #[test]
        fn prop_wicket_count_delta(kinds in proptest::collection::vec(0u8..8, 1..24)) {
            let mut m = started(MatchFormat::T20);
            set_next_bowler(&mut m);
            for k in kinds {
                if m.current().unwrap().current_bowler.is_none() {
                    set_next_bowler(&mut m);
                }
                let (s, b) = (striker(&m), current_bowler(&m));
                let over = m.current().unwrap().overs;
                let ball = match k {
                    0 => Ball::wicket(s, b, over, WicketKind::Bowled, None),
                    1 => Ball::wide(s, b, over, 1),
                    2 => Ball::leg_bye(s, b, over, 1),
                    n => Ball::run(s, b, over, n - 3),
                };
                let is_wicket = ball.is_wicket;
                let before = m.current().unwrap().fall_of_wickets.len();
                let innings_before = m.current_innings;
                m.apply_ball(ball).unwrap();
                if m.current_innings != innings_before || m.is_finished() {
                    break;
                }
                let after = m.current().unwrap().fall_of_wickets.len();
                prop_assert_eq!(after - before, usize::from(is_wicket));
                prop_assert_eq!(after as u32, m.current().unwrap().wickets);
            }
        }

        /// After a full over without wickets the striker is swapped iff an
        /// even number of deliveries had odd runs (odd-run parity, then the
        /// end-of-over change of ends).
        #[test]
        fn prop_strike_after_over(runs in proptest::collection::vec(0u8..=6, 6)) {
            let mut m = started(MatchFormat::T20);
            set_next_bowler(&mut m);
            let before = striker(&m);
            for r in &runs {
                m.apply_ball(Ball::run(striker(&m), current_bowler(&m), 0, *r)).unwrap();
            }
            let odd = runs.iter().filter(|r| *r % 2 == 1).count();
            let same_striker = striker(&m) == before;
            prop_assert_eq!(same_striker, odd % 2 == 1);
            prop_assert_eq!(m.current().unwrap().score, runs.iter().map(|r| *r as u32).sum::<u32>());
        }
    }
}
