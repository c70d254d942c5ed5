//! Canned over patterns for players without any recorded statistics.

use super::builder::OverBuilder;
use super::outcome::parse_token;
use super::weights::PressureBand;
use super::{OverResult, OverStrategy, StrategyKind};
use crate::engine::context::{MatchPhase, SimulationContext};
use crate::engine::deterministic::{deterministic_choice, subcase};
use crate::error::StrategyError;

use crate::engine::context::MatchPhase::{Death, Middle, Powerplay};

/// One canned over. `band` of `None` fits any pressure.
#[derive(Debug, Clone, Copy)]
pub struct OverTemplate {
    pub name: &'static str,
    pub phases: &'static [MatchPhase],
    pub band: Option<PressureBand>,
    pub tokens: &'static [&'static str],
}

impl OverTemplate {
    fn fits(&self, phase: MatchPhase, band: PressureBand) -> bool {
        self.phases.contains(&phase) && self.band.map_or(true, |b| b == band)
    }
}

pub const TEMPLATES: &[OverTemplate] = &[
    OverTemplate {
        name: "steady accumulation",
        phases: &[Middle],
        band: None,
        tokens: &["1", "1", ".", "2", "1", "1"],
    },
    OverTemplate {
        name: "rotate the strike",
        phases: &[Powerplay, Middle],
        band: Some(PressureBand::Low),
        tokens: &["1", ".", "1", "1", "2", "1"],
    },
    OverTemplate {
        name: "powerplay flurry",
        phases: &[Powerplay],
        band: None,
        tokens: &["4", ".", "4", "1", "6", "1"],
    },
    OverTemplate {
        name: "tight opening spell",
        phases: &[Powerplay],
        band: None,
        tokens: &[".", ".", "1", ".", "Wd", ".", "4"],
    },
    OverTemplate {
        name: "middle-overs squeeze",
        phases: &[Middle],
        band: Some(PressureBand::Medium),
        tokens: &[".", "1", ".", ".", "1Lb", "W:c"],
    },
    OverTemplate {
        name: "collapse",
        phases: &[Powerplay, Middle, Death],
        band: Some(PressureBand::High),
        tokens: &["W:b", ".", "1", "W:lbw", ".", "."],
    },
    OverTemplate {
        name: "aggressive death overs",
        phases: &[Death],
        band: None,
        tokens: &["6", "4", "1", "Wd", "6", "2", "W:c"],
    },
    OverTemplate {
        name: "death yorkers",
        phases: &[Death],
        band: None,
        tokens: &[".", "1", "1", ".", "W:b", "1"],
    },
    OverTemplate {
        name: "slog and miss",
        phases: &[Middle, Death],
        band: Some(PressureBand::High),
        tokens: &["4", ".", "W:c", "1", "6", "Nb", "."],
    },
];

pub struct TemplateStrategy {
    templates: &'static [OverTemplate],
}

impl Default for TemplateStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStrategy {
    pub fn new() -> Self {
        Self { templates: TEMPLATES }
    }

    /// Candidates for the context, in table order.
    pub fn candidates(&self, ctx: &SimulationContext) -> Vec<&'static OverTemplate> {
        let band = PressureBand::from_index(ctx.pressure_index);
        self.templates.iter().filter(|t| t.fits(ctx.phase, band)).collect()
    }
}

impl OverStrategy for TemplateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Template
    }

    fn can_handle(&self, ctx: &SimulationContext) -> bool {
        !ctx.has_history()
    }

    fn simulate_over(&self, ctx: &SimulationContext) -> Result<OverResult, StrategyError> {
        let candidates = self.candidates(ctx);
        if candidates.is_empty() {
            return Err(StrategyError::Declined);
        }
        let pick = deterministic_choice(
            ctx.seed,
            u64::from(ctx.aggression),
            subcase::TEMPLATE,
            candidates.len(),
        );
        let template = candidates[pick];

        let mut builder = OverBuilder::new(ctx);
        for token in template.tokens {
            builder.push(parse_token(token).map_err(StrategyError::Parse)?);
        }
        Ok(builder.finish(self.kind())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::outcome::parse_outcomes;
    use crate::engine::test_fixtures::*;
    use crate::models::MatchFormat;

    #[test]
    fn test_every_template_has_six_legal_balls() {
        for template in TEMPLATES {
            let outcomes = parse_outcomes(&template.tokens.join(" ")).unwrap();
            let legal = outcomes.iter().filter(|o| o.is_legal()).count();
            assert_eq!(legal, 6, "{}", template.name);
        }
    }

    #[test]
    fn test_every_phase_and_band_has_a_candidate() {
        let mut m = create_started_match(MatchFormat::T20);
        let mut ctx = create_test_context(&mut m, 5);
        let strategy = TemplateStrategy::new();
        for phase in [Powerplay, Middle, Death] {
            for pressure in [0.1, 0.5, 0.9] {
                ctx.phase = phase;
                ctx.pressure_index = pressure;
                assert!(!strategy.candidates(&ctx).is_empty(), "{:?} {}", phase, pressure);
            }
        }
    }

    #[test]
    fn test_declines_with_history() {
        let mut m = create_started_match(MatchFormat::T20);
        let mut ctx = create_test_context(&mut m, 5);
        let strategy = TemplateStrategy::new();
        assert!(strategy.can_handle(&ctx));
        ctx.bowler.profile = Some(crate::engine::context::BowlingProfile {
            economy: 7.0,
            wicket_rate: 0.05,
            extras_rate: 0.03,
            balls_sample: 120,
        });
        assert!(!strategy.can_handle(&ctx));
    }
}
