//! Rule-based stand-in for a model.
//!
//! Decides from hand strength and pot odds, then phrases the decision the
//! way a model would so it goes through the same parser and policy as a
//! real reply. Useful for dry runs and as a benchmark floor.

use arena_engine::action::ActionType;
use arena_engine::cards::Card;
use arena_engine::context::{DecisionContext, Street};
use arena_engine::tools::pot_odds;

use crate::responder::{ModelReply, Prompt, Responder, ResponderError};

/// Deterministic, offline [`Responder`].
///
/// # Strategy
///
/// - Strength comes from the equity tool when present, otherwise from a
///   preflop table of the hole cards (0-10).
/// - Unopened pots: bet strong hands, check the rest.
/// - Facing a bet: raise premium hands, call strong ones, call medium and
///   marginal hands only at a good price, fold the rest.
#[derive(Debug, Clone, Default)]
pub struct BaselineResponder;

impl BaselineResponder {
    pub fn new() -> Self {
        Self
    }

    /// Preflop strength of two hole cards on a 0-10 scale.
    fn preflop_strength(hole: [Card; 2]) -> u8 {
        let (a, b) = (hole[0].rank.value(), hole[1].rank.value());
        let (high, low) = if a >= b { (a, b) } else { (b, a) };
        let suited = hole[0].suit == hole[1].suit;

        if high == low {
            return match high {
                13..=14 => 10,
                11..=12 => 9,
                10 => 8,
                9 => 7,
                8 => 6,
                7 => 5,
                _ => 4,
            };
        }

        let offsuit = match (high, low) {
            (14, 13) => 8,
            (14, 12) => 7,
            (14, 11) | (13, 12) => 6,
            (14, 10) | (13, 11) | (12, 11) => 5,
            (14, _) | (13, 10) | (12, 10) => 4,
            _ if suited && high - low <= 2 => return if high >= 9 { 5 } else { 4 },
            _ if high >= 11 && low >= 9 => return 4,
            _ => return 2,
        };
        if suited { offsuit + 1 } else { offsuit }
    }

    fn strength(ctx: &DecisionContext) -> u8 {
        if let Some(equity) = ctx.tools.equity
            && ctx.street != Street::Preflop
        {
            return (equity.get() * 10.0).round() as u8;
        }
        ctx.hole_cards.map_or(0, Self::preflop_strength)
    }

    /// Picks the decision and phrases it.
    pub fn reply_for(ctx: &DecisionContext) -> String {
        let strength = Self::strength(ctx);
        let legal = &ctx.legal;

        if ctx.to_call == 0 {
            let size = match strength {
                9..=10 => ctx.pot * 2 / 3,
                7..=8 => ctx.pot / 2,
                _ => 0,
            };
            return match legal.range(ActionType::Bet) {
                Some(range) if size > 0 => format!(
                    "Strong holding ({strength}/10), building the pot. Action: BET {}",
                    range.clamp(size)
                ),
                _ => format!("Nothing worth putting chips in with ({strength}/10). Action: CHECK"),
            };
        }

        let price = pot_odds(ctx.pot, ctx.to_call).break_even.get();

        if ctx.to_call >= ctx.stack {
            return if strength >= 7 {
                format!("Short-stacked with {strength}/10. Action: ALL IN")
            } else {
                format!("Calling off the stack with {strength}/10 is too thin. Action: FOLD")
            };
        }

        if strength >= 9
            && let Some(range) = legal.range(ActionType::Raise)
        {
            let target = ctx
                .to_call
                .saturating_add((ctx.pot / 2).max(range.min.saturating_sub(ctx.to_call)));
            return format!(
                "Premium strength ({strength}/10). Action: RAISE {}",
                range.clamp(target)
            );
        }

        let calls = match strength {
            7..=10 => true,
            5..=6 => price <= 0.33 || ctx.to_call <= ctx.pot / 4,
            3..=4 => price <= 0.20 || ctx.to_call <= ctx.pot / 6,
            _ => false,
        };
        if calls {
            format!(
                "Need {:.1}% equity and {strength}/10 is enough. Action: CALL",
                price * 100.0
            )
        } else {
            format!(
                "Need {:.1}% equity, {strength}/10 does not get there. Action: FOLD",
                price * 100.0
            )
        }
    }
}

impl Responder for BaselineResponder {
    fn respond(&self, prompt: &Prompt) -> Result<ModelReply, ResponderError> {
        Ok(ModelReply::text(Self::reply_for(&prompt.context)))
    }

    fn model(&self) -> &str {
        "baseline"
    }
}
