use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{Action, ActionType};
use crate::context::{AmountRange, Street};
use crate::errors::ParseError;
use crate::parser::ParseResult;
use crate::registry::ToolInvocation;
use crate::tools::{Advisory, ToolOutputs};

/// Why the policy substituted the fallback action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FallbackReason {
    /// Nothing usable could be read from the reply
    #[error(transparent)]
    Unparseable(ParseError),
    /// The reply named an action the engine does not offer right now
    #[error("illegal action {action} (legal: {})", join(.legal))]
    Illegal {
        action: ActionType,
        legal: Vec<ActionType>,
    },
    /// All-in requested but no bet, raise or call is available
    #[error("all-in requested but no wagering action is legal (legal: {})", join(.legal))]
    AllInUnavailable { legal: Vec<ActionType> },
}

fn join(types: &[ActionType]) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which of the three paths produced the final action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The parsed action was legal as read
    Parsed,
    /// The parsed action was legal but its amount was moved into range
    Clamped {
        requested: u32,
        clamped: u32,
        bounds: AmountRange,
    },
    /// The fallback action replaced the reply
    Fallback(FallbackReason),
}

/// Token counts reported by the model provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    pub fn add(self, other: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + other.prompt_tokens,
            completion_tokens: self.completion_tokens + other.completion_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }
}

/// Timing and cost of the model call, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub latency_ms: u64,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    /// A clarification follow-up was sent after an unparseable reply
    pub clarified: bool,
    /// Transport or provider error that left the reply empty
    #[serde(default)]
    pub responder_error: Option<String>,
    /// Tool calls the model made before answering, in order
    #[serde(default)]
    pub tool_calls: Vec<ToolInvocation>,
}

/// Final, legal action for one decision point plus everything needed to audit it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub action: Action,
    pub parse: ParseResult,
    pub resolution: Resolution,
    pub street: Street,
    pub tools: ToolOutputs,
    pub advisories: Vec<Advisory>,
    pub meta: ResponseMeta,
}

impl DecisionOutcome {
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self.resolution, Resolution::Fallback(_))
    }

    pub fn was_clamped(&self) -> bool {
        matches!(self.resolution, Resolution::Clamped { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.resolution {
            Resolution::Fallback(reason) => Some(reason),
            _ => None,
        }
    }

    /// Amount the model asked for before clamping.
    pub fn requested_amount(&self) -> Option<u32> {
        match self.resolution {
            Resolution::Clamped { requested, .. } => Some(requested),
            _ => None,
        }
    }
}
