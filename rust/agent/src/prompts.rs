//! Prompt text sent to the model.

use arena_engine::cards::display_cards;
use arena_engine::context::{DecisionContext, LegalAction, LegalActions};
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = "\
You are playing No-Limit Texas Hold'em against other AI models. Your goal is \
to finish with as many chips as possible.

Each turn you receive the street, the pot, your hole cards, the board, your \
stack, the amount you must call and the actions you may take. Pot odds and \
an equity estimate may be included; they are hints, not instructions.

Think it through, then end your reply with a single line of the form
Action: <ACTION>
where <ACTION> is exactly one of
- FOLD
- CHECK (only when there is nothing to call)
- CALL
- BET <total> (when nobody has bet yet)
- RAISE <total> (when facing a bet)
- ALL IN

Amounts are whole chips and always the TOTAL you are putting in on this \
street, not the increment. Write them as digits, e.g. `Action: RAISE 1200`.";

/// Appended to the action prompt when tool calls are allowed.
pub const TOOLS_HINT: &str = "\n\nYou may call `pot_odds_calculator` and \
`equity_calculator` before answering. Your final message must still end with \
the `Action:` line.";

/// Renders the per-decision user message.
///
/// # Examples
///
/// ```
/// use arena_engine::context::{DecisionContext, Street};
/// use arena_agent::prompts::action_prompt;
///
/// let ctx = DecisionContext::derived(Street::Flop, 5_000, 200, 200, 1_200);
/// let prompt = action_prompt(&ctx);
/// assert!(prompt.contains("**Street:** FLOP"));
/// assert!(prompt.contains("- CALL 200"));
/// assert!(prompt.contains("- RAISE to 400-5,000"));
/// ```
pub fn action_prompt(ctx: &DecisionContext) -> String {
    let hand = ctx
        .hole_cards
        .map(|h| display_cards(&h))
        .unwrap_or_else(|| "Unknown".to_string());
    let board = if ctx.board.is_empty() {
        "None".to_string()
    } else {
        display_cards(&ctx.board)
    };

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "## Current Game State\n");
    let _ = writeln!(out, "**Street:** {}", ctx.street.as_str().to_uppercase());
    let _ = writeln!(out, "**Pot:** {} chips\n", chips(ctx.pot));
    let _ = writeln!(out, "**Your Hand:** {hand}");
    let _ = writeln!(out, "**Community Cards:** {board}\n");
    let _ = writeln!(out, "**Your Stack:** {} chips", chips(ctx.stack));
    let _ = writeln!(out, "**Amount to Call:** {} chips\n", chips(ctx.to_call));

    if !ctx.tools.is_empty() {
        let _ = writeln!(out, "**Tool Results:**");
        if let Some(p) = ctx.tools.pot_odds {
            let _ = writeln!(out, "- Pot odds: you need {:.1}% equity to call", p.percent());
        }
        if let Some(e) = ctx.tools.equity {
            let _ = writeln!(out, "- Estimated equity: {:.1}%", e.percent());
        }
        out.push('\n');
    }

    let _ = writeln!(out, "**Your Legal Actions:**");
    out.push_str(&legal_lines(&ctx.legal));
    out.push_str("\n---\n\nAnalyze the situation and state your action.");
    out
}

/// Follow-up sent once when the first reply had no usable action.
pub fn clarification_prompt(legal: &LegalActions) -> String {
    format!(
        "Your previous reply did not contain a usable action. Reply with \
         exactly one line, `Action: <ACTION>`, choosing from:\n{}\nWhat is your action?",
        legal_lines(legal)
    )
}

fn legal_lines(legal: &LegalActions) -> String {
    legal
        .iter()
        .map(|a| match a {
            LegalAction::Fold => "- FOLD\n".to_string(),
            LegalAction::Check => "- CHECK\n".to_string(),
            LegalAction::Call { amount } => format!("- CALL {}\n", chips(*amount)),
            LegalAction::Bet(r) => format!("- BET {}-{}\n", chips(r.min), chips(r.max)),
            LegalAction::Raise(r) => format!("- RAISE to {}-{}\n", chips(r.min), chips(r.max)),
        })
        .collect()
}

/// `1234567` -> `1,234,567`
fn chips(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
