use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{Action, ActionType};
use crate::cards::Card;
use crate::errors::ContextError;
use crate::tools::ToolOutputs;

/// Represents a betting street in Texas Hold'em poker.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    /// Before flop (hole cards dealt)
    Preflop,
    /// After flop (3 community cards)
    Flop,
    /// After turn (4th community card)
    Turn,
    /// After river (5th community card)
    River,
}

impl Street {
    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive chip range for a bet or raise total.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }

    /// Moves `amount` to the nearest bound when it falls outside the range.
    pub fn clamp(&self, amount: u32) -> u32 {
        amount.max(self.min).min(self.max)
    }
}

/// One entry in the legal action set offered by the engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "lowercase")]
pub enum LegalAction {
    Fold,
    Check,
    Call { amount: u32 },
    Bet(AmountRange),
    Raise(AmountRange),
}

impl LegalAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            LegalAction::Fold => ActionType::Fold,
            LegalAction::Check => ActionType::Check,
            LegalAction::Call { .. } => ActionType::Call,
            LegalAction::Bet(_) => ActionType::Bet,
            LegalAction::Raise(_) => ActionType::Raise,
        }
    }
}

/// The legal actions for the acting player, in engine order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegalActions(Vec<LegalAction>);

impl LegalActions {
    pub fn new(actions: Vec<LegalAction>) -> Self {
        Self(actions)
    }

    /// Builds the conventional no-limit action set for a player.
    ///
    /// `min_raise` is the smallest increment over the current bet; the
    /// resulting bet/raise ranges are expressed as wager totals and are
    /// capped by the stack, so a short stack only has an all-in option.
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_engine::action::ActionType;
    /// use arena_engine::context::{AmountRange, LegalActions};
    ///
    /// let legal = LegalActions::derive(500, 20, 20);
    /// assert!(!legal.contains(ActionType::Check));
    /// assert_eq!(legal.call_amount(), Some(20));
    /// assert_eq!(legal.range(ActionType::Raise), Some(AmountRange::new(40, 500)));
    /// ```
    pub fn derive(stack: u32, to_call: u32, min_raise: u32) -> Self {
        let mut actions = vec![LegalAction::Fold];
        if to_call == 0 {
            actions.push(LegalAction::Check);
            if stack > 0 {
                let min = min_raise.max(1).min(stack);
                actions.push(LegalAction::Bet(AmountRange::new(min, stack)));
            }
        } else {
            actions.push(LegalAction::Call {
                amount: to_call.min(stack),
            });
            if stack > to_call {
                let min = to_call.saturating_add(min_raise.max(1)).min(stack);
                actions.push(LegalAction::Raise(AmountRange::new(min, stack)));
            }
        }
        Self(actions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LegalAction> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, kind: ActionType) -> Option<&LegalAction> {
        self.0.iter().find(|a| a.action_type() == kind)
    }

    pub fn contains(&self, kind: ActionType) -> bool {
        self.get(kind).is_some()
    }

    /// Bet or raise range, if that action is legal.
    pub fn range(&self, kind: ActionType) -> Option<AmountRange> {
        match self.get(kind)? {
            LegalAction::Bet(r) | LegalAction::Raise(r) => Some(*r),
            _ => None,
        }
    }

    pub fn call_amount(&self) -> Option<u32> {
        match self.get(ActionType::Call)? {
            LegalAction::Call { amount } => Some(*amount),
            _ => None,
        }
    }

    /// True when the action type is offered and any amount is in range.
    pub fn permits(&self, action: &Action) -> bool {
        match action.amount() {
            Some(amount) => self
                .range(action.action_type())
                .is_some_and(|r| r.contains(amount)),
            None => self.contains(action.action_type()),
        }
    }

    pub fn action_types(&self) -> Vec<ActionType> {
        self.0.iter().map(LegalAction::action_type).collect()
    }
}

/// Snapshot handed to the decision pipeline for one acting player.
///
/// Read-only to the parser and policy; the orchestrator owns its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub street: Street,
    pub legal: LegalActions,
    /// Chips needed to call
    pub to_call: u32,
    pub pot: u32,
    /// Acting player's remaining stack
    pub stack: u32,
    #[serde(default)]
    pub tools: ToolOutputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<[Card; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub board: Vec<Card>,
}

impl DecisionContext {
    pub fn new(street: Street, legal: LegalActions, to_call: u32, pot: u32, stack: u32) -> Self {
        Self {
            street,
            legal,
            to_call,
            pot,
            stack,
            tools: ToolOutputs::default(),
            hole_cards: None,
            board: Vec::new(),
        }
    }

    /// Context with the legal set derived by [`LegalActions::derive`].
    pub fn derived(street: Street, stack: u32, to_call: u32, min_raise: u32, pot: u32) -> Self {
        Self::new(
            street,
            LegalActions::derive(stack, to_call, min_raise),
            to_call,
            pot,
            stack,
        )
    }

    pub fn with_tools(mut self, tools: ToolOutputs) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_hole_cards(mut self, hole: [Card; 2]) -> Self {
        self.hole_cards = Some(hole);
        self
    }

    pub fn with_board(mut self, board: Vec<Card>) -> Self {
        self.board = board;
        self
    }

    /// Checks the structural invariants the policy relies on.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.legal.is_empty() {
            return Err(ContextError::NoLegalActions);
        }
        let mut seen = Vec::with_capacity(5);
        for entry in self.legal.iter() {
            let kind = entry.action_type();
            if seen.contains(&kind) {
                return Err(ContextError::DuplicateLegalAction(kind));
            }
            seen.push(kind);
            if let LegalAction::Bet(r) | LegalAction::Raise(r) = entry {
                if r.min > r.max {
                    return Err(ContextError::InvertedRange {
                        action: kind,
                        min: r.min,
                        max: r.max,
                    });
                }
            }
        }
        Ok(())
    }
}
