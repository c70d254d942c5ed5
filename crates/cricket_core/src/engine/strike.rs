//! Strike rotation rules shared by the state machine and the over builder.

use crate::models::{Ball, PlayerId};

/// The two batters at the crease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikePair {
    pub striker: PlayerId,
    pub non_striker: PlayerId,
}

impl StrikePair {
    pub fn new(striker: PlayerId, non_striker: PlayerId) -> Self {
        Self { striker, non_striker }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.striker == id || self.non_striker == id
    }

    /// Odd runs run swap ends. On a dismissal the batters cross first and
    /// `incoming` then takes the dismissed batter's end. With no incoming
    /// batter (all out) the dismissed id stays in place.
    pub fn after_delivery(&mut self, ball: &Ball, incoming: Option<PlayerId>) {
        if ball.runs_run() % 2 == 1 {
            self.swap();
        }
        if let (Some(out), Some(new)) = (ball.dismissed_player(), incoming) {
            if self.striker == out {
                self.striker = new;
            } else if self.non_striker == out {
                self.non_striker = new;
            }
        }
    }

    pub fn end_of_over(&mut self) {
        self.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WicketKind;

    fn ids() -> (PlayerId, PlayerId, PlayerId, PlayerId) {
        (
            PlayerId::from_u128(1),
            PlayerId::from_u128(2),
            PlayerId::from_u128(3),
            PlayerId::from_u128(9),
        )
    }

    #[test]
    fn test_odd_runs_rotate() {
        let (a, b, _, bowler) = ids();
        let mut pair = StrikePair::new(a, b);
        pair.after_delivery(&Ball::run(a, bowler, 0, 1), None);
        assert_eq!(pair.striker, b);
        pair.after_delivery(&Ball::run(b, bowler, 0, 2), None);
        assert_eq!(pair.striker, b);
        pair.after_delivery(&Ball::leg_bye(b, bowler, 0, 1), None);
        assert_eq!(pair.striker, a);
        // single penalty run on a wide is not run
        pair.after_delivery(&Ball::wide(a, bowler, 0, 1), None);
        assert_eq!(pair.striker, a);
    }

    #[test]
    fn test_incoming_batter_takes_dismissed_end() {
        let (a, b, c, bowler) = ids();
        let mut pair = StrikePair::new(a, b);
        pair.after_delivery(&Ball::wicket(a, bowler, 0, WicketKind::Bowled, None), Some(c));
        assert_eq!(pair, StrikePair::new(c, b));
    }

    #[test]
    fn test_run_out_after_crossing() {
        let (a, b, c, bowler) = ids();
        let fielder = PlayerId::from_u128(10);
        // one run completed, striker run out at the far end: the survivor
        // has crossed and faces, the new batter goes to the non-striker's end
        let mut pair = StrikePair::new(a, b);
        pair.after_delivery(&Ball::run_out(a, bowler, 0, 1, fielder, a), Some(c));
        assert_eq!(pair, StrikePair::new(b, c));

        let mut pair = StrikePair::new(a, b);
        pair.after_delivery(&Ball::run_out(a, bowler, 0, 0, fielder, b), Some(c));
        assert_eq!(pair, StrikePair::new(a, c));
    }
}
