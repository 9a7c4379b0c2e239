//! Tools a model may call before it answers.
//!
//! Definitions use the JSON function-calling shape that model providers
//! share. [`ToolRunner::execute`] runs one call locally and always produces
//! a JSON result: bad arguments and unknown tool names come back as
//! `{"error": ...}` for the model to read, never as a Rust error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::cards::parse_cards;
use crate::tools::{self, Equity, PotOdds, ToolOutputs, DEFAULT_SAMPLES};

pub const POT_ODDS_TOOL: &str = "pot_odds_calculator";
pub const EQUITY_TOOL: &str = "equity_calculator";

/// A tool call as requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, as sent by the model
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// One executed tool call, kept for the decision record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
    pub result: Value,
}

impl ToolInvocation {
    pub fn failed(&self) -> bool {
        self.result.get("error").is_some()
    }
}

/// Tool definitions to offer the model.
pub fn definitions() -> Value {
    json!([
        {
            "type": "function",
            "function": {
                "name": POT_ODDS_TOOL,
                "description": "Calculate pot odds to determine if a call is mathematically profitable. Use this when facing a bet to understand what equity you need to call profitably. Returns pot odds as a percentage and ratio.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "pot_size": {
                            "type": "integer",
                            "description": "Current pot size in chips (before your call)"
                        },
                        "bet_to_call": {
                            "type": "integer",
                            "description": "Amount you need to call in chips"
                        }
                    },
                    "required": ["pot_size", "bet_to_call"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": EQUITY_TOOL,
                "description": "Calculate your probability of winning the hand using Monte Carlo simulation against opponents' random hands. Compare the result with pot odds.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "hole_cards": {
                            "type": "string",
                            "description": "Your hole cards, e.g. 'AsKh'. Suits are s, h, d, c."
                        },
                        "community_cards": {
                            "type": "string",
                            "description": "Board cards in the same format, e.g. 'Jc7d2s'. Empty string preflop."
                        },
                        "num_opponents": {
                            "type": "integer",
                            "description": "Number of active opponents still in the hand (1-5)"
                        }
                    },
                    "required": ["hole_cards", "community_cards", "num_opponents"]
                }
            }
        }
    ])
}

/// Executes tool calls. `seed` makes equity results repeatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRunner {
    pub equity_samples: u32,
    pub seed: u64,
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self {
            equity_samples: DEFAULT_SAMPLES,
            seed: 0,
        }
    }
}

impl ToolRunner {
    pub fn new(equity_samples: u32, seed: u64) -> Self {
        Self {
            equity_samples,
            seed,
        }
    }

    pub fn execute(&self, call: &ToolCall) -> ToolInvocation {
        // malformed arguments are treated as none at all
        let args = serde_json::from_str::<Value>(&call.arguments)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let result = match call.name.as_str() {
            POT_ODDS_TOOL => self.pot_odds(&args),
            EQUITY_TOOL => self.equity(&args),
            other => Err(format!("Unknown tool: {other}")),
        }
        .unwrap_or_else(|error| json!({ "error": error }));

        let invocation = ToolInvocation {
            name: call.name.clone(),
            args,
            result,
        };
        tracing::debug!(
            tool = %invocation.name,
            failed = invocation.failed(),
            "executed tool call"
        );
        invocation
    }

    fn pot_odds(&self, args: &Value) -> Result<Value, String> {
        let pot = chips_arg(args, "pot_size")?;
        let to_call = chips_arg(args, "bet_to_call")?;
        let report = tools::pot_odds(pot, to_call);
        let pct = round1(report.break_even.percent());
        Ok(json!({
            "pot_odds_percentage": pct,
            "pot_odds_ratio": report.ratio,
            "break_even_equity": pct,
            "recommendation": report.recommendation,
        }))
    }

    fn equity(&self, args: &Value) -> Result<Value, String> {
        let hole = args
            .get("hole_cards")
            .and_then(Value::as_str)
            .ok_or("hole_cards is required")?;
        let hole = parse_cards(hole).map_err(|e| e.to_string())?;
        let board = args
            .get("community_cards")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let board = parse_cards(board).map_err(|e| e.to_string())?;
        let opponents = args
            .get("num_opponents")
            .and_then(Value::as_u64)
            .unwrap_or(1)
            .min(u64::from(u8::MAX)) as u8;

        let estimate = tools::equity(&hole, &board, opponents, self.equity_samples, self.seed)
            .map_err(|e| e.to_string())?;
        let pct = round1(estimate.equity.percent());
        Ok(json!({
            "equity_percentage": pct,
            "win_probability": pct,
            "opponents": estimate.opponents,
            "sample_size": estimate.samples,
            "confidence": if estimate.samples >= DEFAULT_SAMPLES { "high" } else { "medium" },
            "recommendation": estimate.recommendation,
        }))
    }
}

/// Fills the missing values in `outputs` from successful tool results.
///
/// Values supplied with the decision context win; among tool results the
/// latest one wins.
pub fn merge_outputs(invocations: &[ToolInvocation], outputs: ToolOutputs) -> ToolOutputs {
    let latest = |tool: &str, key: &str| {
        invocations
            .iter()
            .rev()
            .filter(|inv| inv.name == tool)
            .find_map(|inv| inv.result.get(key).and_then(Value::as_f64))
    };
    ToolOutputs {
        equity: outputs.equity.or_else(|| {
            latest(EQUITY_TOOL, "equity_percentage").and_then(|p| Equity::from_percent(p).ok())
        }),
        pot_odds: outputs.pot_odds.or_else(|| {
            latest(POT_ODDS_TOOL, "pot_odds_percentage")
                .and_then(|p| PotOdds::from_percent(p).ok())
        }),
    }
}

fn chips_arg(args: &Value, key: &str) -> Result<u32, String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("{key} must be a whole number of chips, got {v}")),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
