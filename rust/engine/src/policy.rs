use crate::action::{Action, ActionType};
use crate::context::{DecisionContext, LegalActions};
use crate::errors::ParseError;
use crate::outcome::{DecisionOutcome, FallbackReason, Resolution, ResponseMeta};
use crate::parser::{ActionParser, Intent, ParseResult};
use crate::tools::advise;

/// Order in which the fallback action is chosen. Checking is free, so it
/// always beats folding; the wagering entries only matter for unusual
/// engine snapshots that offer neither.
const FALLBACK_ORDER: [ActionType; 5] = [
    ActionType::Check,
    ActionType::Fold,
    ActionType::Call,
    ActionType::Bet,
    ActionType::Raise,
];

/// Deterministic default for unusable replies: check if legal, else fold.
///
/// # Examples
///
/// ```
/// use arena_engine::action::Action;
/// use arena_engine::context::LegalActions;
/// use arena_engine::policy::fallback_action;
///
/// assert_eq!(fallback_action(&LegalActions::derive(1000, 0, 20)), Action::Check);
/// assert_eq!(fallback_action(&LegalActions::derive(1000, 50, 20)), Action::Fold);
/// ```
pub fn fallback_action(legal: &LegalActions) -> Action {
    FALLBACK_ORDER
        .iter()
        .find_map(|&kind| match kind {
            ActionType::Bet | ActionType::Raise => legal
                .range(kind)
                .and_then(|r| Action::from_parts(kind, Some(r.min))),
            _ if legal.contains(kind) => Action::from_parts(kind, None),
            _ => None,
        })
        .unwrap_or(Action::Fold)
}

/// Turns a [`ParseResult`] into a legal action for a [`DecisionContext`].
///
/// The policy never fails: unparseable or illegal replies fall back to
/// [`fallback_action`], out-of-range amounts are clamped to the nearest
/// bound. Tool outputs only produce advisories.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    parser: ActionParser,
}

impl Policy {
    pub fn new(parser: ActionParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &ActionParser {
        &self.parser
    }

    /// Parses `reply` (absent on timeout or transport failure) and decides.
    pub fn decide_reply(&self, reply: Option<&str>, ctx: &DecisionContext) -> DecisionOutcome {
        self.decide(self.parser.parse_reply(reply), ctx)
    }

    pub fn decide(&self, parse: ParseResult, ctx: &DecisionContext) -> DecisionOutcome {
        let resolved = match parse.intent() {
            None => Err(FallbackReason::Unparseable(
                parse.error().cloned().unwrap_or(ParseError::NoActionVerb),
            )),
            Some(Intent::AllIn) => resolve_all_in(&ctx.legal),
            Some(Intent::Act(action)) => resolve(action, &ctx.legal),
        };

        let (action, resolution, parse) = match resolved {
            Ok((action, resolution)) => (action, resolution, parse),
            Err(reason) => {
                let action = fallback_action(&ctx.legal);
                tracing::warn!(
                    street = %ctx.street,
                    reason = %reason,
                    fallback = %action,
                    "using fallback action"
                );
                (action, Resolution::Fallback(reason), parse.into_fallback())
            }
        };

        match &resolution {
            Resolution::Parsed => {
                tracing::debug!(street = %ctx.street, action = %action, "reply parsed")
            }
            Resolution::Clamped {
                requested, bounds, ..
            } => tracing::info!(
                street = %ctx.street,
                action = %action,
                requested,
                min = bounds.min,
                max = bounds.max,
                "amount clamped into legal range"
            ),
            Resolution::Fallback(_) => {}
        }

        let advisories = advise(&action, ctx);
        for advisory in &advisories {
            tracing::info!(
                street = %ctx.street,
                action = %action,
                ?advisory,
                "questionable decision"
            );
        }

        DecisionOutcome {
            action,
            parse,
            resolution,
            street: ctx.street,
            tools: ctx.tools,
            advisories,
            meta: ResponseMeta::default(),
        }
    }
}

fn resolve(action: Action, legal: &LegalActions) -> Result<(Action, Resolution), FallbackReason> {
    let kind = action.action_type();
    if !legal.contains(kind) {
        return Err(FallbackReason::Illegal {
            action: kind,
            legal: legal.action_types(),
        });
    }
    let (Some(requested), Some(bounds)) = (action.amount(), legal.range(kind)) else {
        return Ok((action, Resolution::Parsed));
    };
    if bounds.contains(requested) {
        return Ok((action, Resolution::Parsed));
    }
    let clamped = bounds.clamp(requested);
    Ok((
        action.with_amount(clamped),
        Resolution::Clamped {
            requested,
            clamped,
            bounds,
        },
    ))
}

/// All-in maps to the largest legal wager, or a call when only that is left.
fn resolve_all_in(legal: &LegalActions) -> Result<(Action, Resolution), FallbackReason> {
    let action = if let Some(r) = legal.range(ActionType::Raise) {
        Action::Raise(r.max)
    } else if let Some(r) = legal.range(ActionType::Bet) {
        Action::Bet(r.max)
    } else if legal.contains(ActionType::Call) {
        Action::Call
    } else {
        return Err(FallbackReason::AllInUnavailable {
            legal: legal.action_types(),
        });
    };
    Ok((action, Resolution::Parsed))
}
