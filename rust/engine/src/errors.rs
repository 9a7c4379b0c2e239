use thiserror::Error;

use crate::action::ActionType;

/// Why a model reply did not yield a usable action.
///
/// The `Display` text is what lands in the persisted `parse_error` column.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no response from model")]
    NoResponse,
    #[error("empty response")]
    EmptyResponse,
    #[error("no recognizable action verb")]
    NoActionVerb,
    #[error("amount missing for {action}")]
    MissingAmount { action: ActionType },
    #[error("negative amount for {action}: {raw}")]
    NegativeAmount { action: ActionType, raw: String },
    #[error("zero amount for {action}")]
    ZeroAmount { action: ActionType },
    #[error("fractional chip amount for {action}: {raw}")]
    FractionalAmount { action: ActionType, raw: String },
    #[error("malformed amount for {action}: {raw}")]
    MalformedAmount { action: ActionType, raw: String },
    #[error("amount too large for {action}: {raw}")]
    AmountOverflow { action: ActionType, raw: String },
    #[error("pot- or blind-relative amount for {action} is unsupported: {raw}")]
    RelativeAmount { action: ActionType, raw: String },
    #[error("amount for {action} written in words is unsupported: {raw}")]
    AmountInWords { action: ActionType, raw: String },
}

/// Structural problems with a [`crate::context::DecisionContext`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContextError {
    #[error("legal action set is empty")]
    NoLegalActions,
    #[error("legal action {0} listed more than once")]
    DuplicateLegalAction(ActionType),
    #[error("invalid {action} range: min {min} > max {max}")]
    InvertedRange { action: ActionType, min: u32, max: u32 },
}

/// Errors raised by the tool helpers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("{name} must be a fraction in [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("invalid card string: {0:?}")]
    InvalidCards(String),
    #[error("expected {expected} hole cards, got {actual}")]
    HoleCardCount { expected: usize, actual: usize },
    #[error("board must hold 0, 3, 4 or 5 cards, got {0}")]
    BoardSize(usize),
}
