//! Over-level legality check applied to every strategy's output before the
//! engine accepts it.

use std::collections::VecDeque;

use super::context::SimulationContext;
use super::strategy::OverResult;
use super::strike::StrikePair;
use crate::error::{IllegalDelivery, IllegalOver};
use crate::models::{EventKind, WicketKind, BALLS_PER_OVER};

/// Checks shape of every ball, six legal deliveries, one bowler, fielders
/// from the fielding side, and replays strike and innings closure against
/// the context.
pub fn validate_over(ctx: &SimulationContext, over: &OverResult) -> Result<(), IllegalOver> {
    let mut legal = 0usize;
    for (index, ball) in over.deliveries.iter().enumerate() {
        ball.validate().map_err(|source| IllegalOver::Delivery { index, source })?;
        if ball.over_number != ctx.over_number {
            return Err(IllegalOver::OverNumber {
                index,
                expected: ctx.over_number,
                found: ball.over_number,
            });
        }
        if ball.bowler_id != ctx.bowler.id {
            return Err(IllegalOver::BowlerChanged {
                index,
                expected: ctx.bowler.id,
                found: ball.bowler_id,
            });
        }
        if let Some(fielder) = ball.fielder_id {
            if !ctx.fielders.contains(&fielder) {
                return Err(IllegalOver::UnknownFielder { index, fielder });
            }
        }
        if ball.is_legal() {
            legal += 1;
        }
    }
    if legal != BALLS_PER_OVER as usize {
        return Err(IllegalOver::LegalCount(legal));
    }

    let expected = replay(ctx, over)?;
    if expected != over.closing_delivery {
        return Err(IllegalOver::ClosingDelivery { expected, found: over.closing_delivery });
    }
    Ok(())
}

/// Walks the over like the state machine would and returns the index of the
/// ball that ends the innings.
fn replay(ctx: &SimulationContext, over: &OverResult) -> Result<Option<usize>, IllegalOver> {
    let mut pair = StrikePair::new(ctx.striker.id, ctx.non_striker.id);
    let mut incoming: VecDeque<_> = ctx.next_batters.iter().map(|b| b.id).collect();
    let mut score = ctx.score;
    let mut wickets = ctx.wickets;
    let mut free_hit = ctx.free_hit;

    for (index, ball) in over.deliveries.iter().enumerate() {
        if ball.striker_id != pair.striker {
            return Err(IllegalOver::StrikerSequence {
                index,
                expected: pair.striker,
                found: ball.striker_id,
            });
        }
        if let Some(dismissed) = ball.dismissed_id {
            if dismissed != pair.non_striker {
                return Err(IllegalOver::StrikerSequence {
                    index,
                    expected: pair.non_striker,
                    found: dismissed,
                });
            }
        }
        if free_hit {
            if let Some(kind) = ball.wicket_kind.filter(|k| *k != WicketKind::RunOut) {
                return Err(IllegalOver::Delivery {
                    index,
                    source: IllegalDelivery::FreeHitDismissal(kind),
                });
            }
        }

        score += ball.total_runs();
        if ball.is_legal() {
            free_hit = false;
        } else if ball.event == EventKind::NoBall {
            free_hit = true;
        }

        let mut next = None;
        if ball.is_wicket {
            wickets += 1;
            if wickets < ctx.wicket_limit {
                next = incoming.pop_front();
            }
        }
        pair.after_delivery(ball, next);

        let target_reached = ctx.target.is_some_and(|t| score >= t);
        let all_out = wickets >= ctx.wicket_limit || (ball.is_wicket && next.is_none());
        if target_reached || all_out {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::{parse_outcomes, OverBuilder, StrategyKind};
    use crate::engine::test_fixtures::*;
    use crate::models::{MatchFormat, PlayerId, WicketKind};

    fn over(ctx: &SimulationContext, tokens: &str) -> OverResult {
        let mut builder = OverBuilder::new(ctx);
        for o in parse_outcomes(tokens).unwrap() {
            builder.push(o);
        }
        builder.finish(StrategyKind::Template).unwrap()
    }

    #[test]
    fn test_built_over_is_valid() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let result = over(&ctx, "1 W:c Nb 2 1Lb 4 W:ro:ns");
        validate_over(&ctx, &result).unwrap();
    }

    #[test]
    fn test_caught_without_fielder_rejected() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let mut result = over(&ctx, "W:c . . . . .");
        result.deliveries[0].fielder_id = None;
        assert_eq!(
            validate_over(&ctx, &result),
            Err(IllegalOver::Delivery {
                index: 0,
                source: IllegalDelivery::MissingFielder(WicketKind::Caught)
            })
        );
    }

    #[test]
    fn test_five_legal_rejected() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let mut result = over(&ctx, ". . . . . .");
        result.deliveries.pop();
        assert_eq!(validate_over(&ctx, &result), Err(IllegalOver::LegalCount(5)));
    }

    #[test]
    fn test_bowler_change_and_strike_errors() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);

        let mut changed = over(&ctx, ". . . . . .");
        changed.deliveries[3].bowler_id = PlayerId::from_u128(7);
        assert!(matches!(validate_over(&ctx, &changed), Err(IllegalOver::BowlerChanged { index: 3, .. })));

        let mut wrong_end = over(&ctx, "1 . . . . .");
        wrong_end.deliveries[1].striker_id = ctx.striker.id;
        assert!(matches!(
            validate_over(&ctx, &wrong_end),
            Err(IllegalOver::StrikerSequence { index: 1, .. })
        ));
    }

    #[test]
    fn test_foreign_fielder_rejected() {
        let mut m = create_started_match(MatchFormat::T20);
        let ctx = create_test_context(&mut m, 5);
        let mut result = over(&ctx, "W:c . . . . .");
        result.deliveries[0].fielder_id = Some(ctx.non_striker.id);
        assert!(matches!(validate_over(&ctx, &result), Err(IllegalOver::UnknownFielder { index: 0, .. })));
    }

    #[test]
    fn test_closing_delivery_must_match() {
        let mut m = create_started_match(MatchFormat::T20);
        let mut ctx = create_test_context(&mut m, 5);
        ctx.target = Some(4);
        let mut result = over(&ctx, "4 . . . . .");
        assert_eq!(result.closing_delivery, Some(0));
        validate_over(&ctx, &result).unwrap();
        result.closing_delivery = None;
        assert!(matches!(validate_over(&ctx, &result), Err(IllegalOver::ClosingDelivery { .. })));
    }
}
