use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A concrete poker action as applied to the table.
/// Bet and raise amounts are "to" totals, the size the wager becomes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "lowercase")]
pub enum Action {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if no bet to call)
    Check,
    /// Call the current bet
    Call,
    /// Open the betting to the given total
    Bet(u32),
    /// Raise the current bet to the given total
    Raise(u32),
}

/// Amount-free tag of an [`Action`], matching the persisted `action_type` column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Fold,
        ActionType::Check,
        ActionType::Call,
        ActionType::Bet,
        ActionType::Raise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Fold => "fold",
            ActionType::Check => "check",
            ActionType::Call => "call",
            ActionType::Bet => "bet",
            ActionType::Raise => "raise",
        }
    }

    /// Whether actions of this type carry a chip amount.
    pub fn takes_amount(self) -> bool {
        matches!(self, ActionType::Bet | ActionType::Raise)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionType::Fold),
            "check" => Ok(ActionType::Check),
            "call" => Ok(ActionType::Call),
            "bet" => Ok(ActionType::Bet),
            "raise" => Ok(ActionType::Raise),
            other => Err(format!("unknown action type: {other}")),
        }
    }
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Fold => ActionType::Fold,
            Action::Check => ActionType::Check,
            Action::Call => ActionType::Call,
            Action::Bet(_) => ActionType::Bet,
            Action::Raise(_) => ActionType::Raise,
        }
    }

    /// Chip amount, present iff the action is a bet or raise.
    pub fn amount(&self) -> Option<u32> {
        match self {
            Action::Bet(a) | Action::Raise(a) => Some(*a),
            _ => None,
        }
    }

    /// Same action with a different amount. Amount-free actions are returned unchanged.
    pub fn with_amount(self, amount: u32) -> Action {
        match self {
            Action::Bet(_) => Action::Bet(amount),
            Action::Raise(_) => Action::Raise(amount),
            other => other,
        }
    }

    /// Builds an action from its tag, requiring an amount exactly for bet/raise.
    pub fn from_parts(kind: ActionType, amount: Option<u32>) -> Option<Action> {
        match (kind, amount) {
            (ActionType::Fold, None) => Some(Action::Fold),
            (ActionType::Check, None) => Some(Action::Check),
            (ActionType::Call, None) => Some(Action::Call),
            (ActionType::Bet, Some(a)) => Some(Action::Bet(a)),
            (ActionType::Raise, Some(a)) => Some(Action::Raise(a)),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount() {
            Some(a) => write!(f, "{} {}", self.action_type(), a),
            None => write!(f, "{}", self.action_type()),
        }
    }
}
