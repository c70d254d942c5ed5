//! Turns a stream of outcomes into the balls of one over.
//!
//! The builder replays the state machine's strike and dismissal rules so each
//! ball names the right striker, and it records the closing delivery: the
//! ball after which the innings would end. Outcomes past the closing delivery
//! only pad the over to six legal balls and never dismiss anyone.

use std::collections::VecDeque;

use super::outcome::DeliveryOutcome;
use super::{OverResult, StrategyKind};
use crate::engine::context::SimulationContext;
use crate::engine::deterministic::{deterministic_choice, subcase};
use crate::engine::strike::StrikePair;
use crate::error::IllegalOver;
use crate::models::{Ball, PlayerId, WicketKind, BALLS_PER_OVER};

/// Wides and no-balls accepted per over before further extras become dots.
const MAX_ILLEGAL_DELIVERIES: usize = 6;

pub struct OverBuilder<'a> {
    ctx: &'a SimulationContext,
    pair: StrikePair,
    incoming: VecDeque<PlayerId>,
    legal: u32,
    illegal: usize,
    score: u32,
    wickets: u32,
    free_hit: bool,
    closing: Option<usize>,
    deliveries: Vec<Ball>,
}

impl<'a> OverBuilder<'a> {
    pub fn new(ctx: &'a SimulationContext) -> Self {
        Self {
            ctx,
            pair: StrikePair::new(ctx.striker.id, ctx.non_striker.id),
            incoming: ctx.next_batters.iter().map(|b| b.id).collect(),
            legal: ctx.balls_in_over,
            illegal: 0,
            score: ctx.score,
            wickets: ctx.wickets,
            free_hit: ctx.free_hit,
            closing: None,
            deliveries: Vec::with_capacity(8),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.legal >= BALLS_PER_OVER
    }

    pub fn striker(&self) -> PlayerId {
        self.pair.striker
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_some()
    }

    pub fn free_hit(&self) -> bool {
        self.free_hit
    }

    pub fn runs_in_over(&self) -> u32 {
        self.score - self.ctx.score
    }

    /// Appends one delivery; ignored once the over holds six legal balls.
    pub fn push(&mut self, outcome: DeliveryOutcome) {
        if self.is_complete() {
            return;
        }
        let index = self.deliveries.len();
        let outcome = self.normalize(outcome);
        let ball = self.ball_for(outcome, index);

        self.score += ball.total_runs();
        if ball.is_legal() {
            self.legal += 1;
            self.free_hit = false;
        } else {
            self.illegal += 1;
            if matches!(outcome, DeliveryOutcome::NoBall { .. }) {
                self.free_hit = true;
            }
        }

        let mut incoming = None;
        if ball.is_wicket {
            self.wickets += 1;
            if self.wickets < self.ctx.wicket_limit {
                incoming = self.incoming.pop_front();
            }
        }
        self.pair.after_delivery(&ball, incoming);

        if self.closing.is_none() {
            let target_reached = self.ctx.target.is_some_and(|t| self.score >= t);
            let all_out = self.wickets >= self.ctx.wicket_limit
                || (ball.is_wicket && incoming.is_none());
            if target_reached || all_out {
                self.closing = Some(index);
            }
        }
        self.deliveries.push(ball);
    }

    /// Pushes `next()` until six legal balls exist.
    pub fn fill_with(&mut self, mut next: impl FnMut(&Self) -> DeliveryOutcome) {
        while !self.is_complete() {
            let outcome = next(self);
            self.push(outcome);
        }
    }

    pub fn finish(self, strategy: StrategyKind) -> Result<OverResult, IllegalOver> {
        let legal = self.deliveries.iter().filter(|b| b.is_legal()).count();
        if legal != BALLS_PER_OVER as usize {
            return Err(IllegalOver::LegalCount(legal));
        }
        Ok(OverResult { deliveries: self.deliveries, strategy, closing_delivery: self.closing })
    }

    fn normalize(&self, outcome: DeliveryOutcome) -> DeliveryOutcome {
        if !outcome.is_legal() && self.illegal >= MAX_ILLEGAL_DELIVERIES {
            return DeliveryOutcome::DOT;
        }
        match outcome {
            DeliveryOutcome::RunOut { completed, .. } if self.is_closed() => {
                DeliveryOutcome::runs(completed)
            }
            DeliveryOutcome::Wicket { .. } if self.is_closed() || self.free_hit => {
                DeliveryOutcome::DOT
            }
            DeliveryOutcome::Wicket { kind: WicketKind::Caught }
                if self.ctx.fielders.is_empty() =>
            {
                DeliveryOutcome::wicket(WicketKind::Bowled)
            }
            DeliveryOutcome::RunOut { completed, .. } if self.ctx.fielders.is_empty() => {
                DeliveryOutcome::runs(completed)
            }
            DeliveryOutcome::Wicket { kind: WicketKind::Stumped }
                if self.ctx.keeper.is_none() && self.ctx.fielders.is_empty() =>
            {
                DeliveryOutcome::wicket(WicketKind::Bowled)
            }
            other => other,
        }
    }

    fn pick_fielder(&self, index: usize) -> Option<PlayerId> {
        let fielders = &self.ctx.fielders;
        if fielders.is_empty() {
            return None;
        }
        let i = deterministic_choice(self.ctx.seed, index as u64, subcase::FIELDER, fielders.len());
        Some(fielders[i])
    }

    fn ball_for(&self, outcome: DeliveryOutcome, index: usize) -> Ball {
        let (striker, bowler, over) = (self.pair.striker, self.ctx.bowler.id, self.ctx.over_number);
        match outcome {
            DeliveryOutcome::Runs { runs } => Ball::run(striker, bowler, over, runs),
            DeliveryOutcome::Wide { extras } => Ball::wide(striker, bowler, over, extras.max(1)),
            DeliveryOutcome::NoBall { bat_runs } => Ball::no_ball(striker, bowler, over, bat_runs),
            DeliveryOutcome::Bye { extras } => Ball::bye(striker, bowler, over, extras.max(1)),
            DeliveryOutcome::LegBye { extras } => {
                Ball::leg_bye(striker, bowler, over, extras.max(1))
            }
            DeliveryOutcome::Wicket { kind } => {
                let fielder = match kind {
                    WicketKind::Caught => self.pick_fielder(index),
                    WicketKind::Stumped => self.ctx.keeper.or_else(|| self.pick_fielder(index)),
                    _ => None,
                };
                Ball::wicket(striker, bowler, over, kind, fielder)
            }
            DeliveryOutcome::RunOut { completed, non_striker } => {
                let dismissed = if non_striker { self.pair.non_striker } else { striker };
                match self.pick_fielder(index) {
                    Some(fielder) => {
                        Ball::run_out(striker, bowler, over, completed, fielder, dismissed)
                    }
                    None => Ball::run(striker, bowler, over, completed),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::outcome::parse_outcomes;
    use crate::engine::test_fixtures::*;
    use crate::models::{EventKind, MatchFormat};

    fn build(tokens: &str, ctx: &SimulationContext) -> OverResult {
        let mut builder = OverBuilder::new(ctx);
        for outcome in parse_outcomes(tokens).unwrap() {
            builder.push(outcome);
        }
        builder.finish(StrategyKind::Template).unwrap()
    }

    #[test]
    fn test_strikers_follow_rotation() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let result = build("1 2 Wd 3 . 1Lb 4", &ctx);
        let (a, b) = (ctx.striker.id, ctx.non_striker.id);
        let strikers: Vec<_> = result.deliveries.iter().map(|d| d.striker_id).collect();
        assert_eq!(strikers, vec![a, b, b, b, a, a, b]);
        assert_eq!(result.closing_delivery, None);
        assert_eq!(result.legal_count(), 6);
    }

    #[test]
    fn test_wicket_brings_next_batter_and_fielders() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let result = build("W:c . W:st . . .", &ctx);
        let next = ctx.next_batters[0].id;
        assert_eq!(result.deliveries[1].striker_id, next);
        let caught = &result.deliveries[0];
        assert!(ctx.fielders.contains(&caught.fielder_id.unwrap()));
        assert_eq!(result.deliveries[2].fielder_id, ctx.keeper);
        assert_eq!(result.wickets(), 2);
    }

    #[test]
    fn test_free_hit_converts_dismissal() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let result = build("Nb W:b W:ro . . . .", &ctx);
        assert_eq!(result.deliveries[1].event, EventKind::Run);
        assert_eq!(result.deliveries[2].wicket_kind, Some(WicketKind::RunOut));
        assert_eq!(result.legal_count(), 6);
    }

    #[test]
    fn test_extras_are_capped() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let mut builder = OverBuilder::new(&ctx);
        builder.fill_with(|_| DeliveryOutcome::Wide { extras: 1 });
        let result = builder.finish(StrategyKind::RuleBased).unwrap();
        assert_eq!(result.deliveries.len(), MAX_ILLEGAL_DELIVERIES + 6);
    }

    #[test]
    fn test_closing_delivery_on_target() {
        let mut m = create_started_match(MatchFormat::T20);
        let mut ctx = create_test_context(&mut m, 5);
        ctx.target = Some(6);
        let result = build("4 1 1 W:b 6 .", &ctx);
        assert_eq!(result.closing_delivery, Some(2));
        // padding after the close never dismisses
        assert!(!result.deliveries[3].is_wicket);
        assert_eq!(result.applicable().len(), 3);
        assert_eq!(result.runs(), 6);
    }

    #[test]
    fn test_closing_delivery_on_all_out() {
        let mut m = create_started_match(MatchFormat::T20);
        let mut ctx = create_test_context(&mut m, 5);
        ctx.wickets = 9;
        let result = build(". W:lbw W:b . . .", &ctx);
        assert_eq!(result.closing_delivery, Some(1));
        assert_eq!(result.wickets(), 1);
    }

    #[test]
    fn test_short_over_rejected() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let mut builder = OverBuilder::new(&ctx);
        builder.push(DeliveryOutcome::DOT);
        assert_eq!(builder.finish(StrategyKind::Ai).unwrap_err(), IllegalOver::LegalCount(1));
    }
}
