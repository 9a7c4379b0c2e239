use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType};
use crate::context::Street;
use crate::errors::ParseError;
use crate::outcome::DecisionOutcome;
use crate::registry::ToolInvocation;

/// Identifies one decision within a tournament.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordKeys {
    pub hand_id: String,
    pub participant_id: String,
    /// 1-based position of this decision within the hand
    pub decision_number: u32,
}

/// Flat row for one decision, in the shape the storage layer persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub hand_id: String,
    pub participant_id: String,
    pub decision_number: u32,
    pub street: Street,
    /// Raw model reply; `None` when the model produced nothing
    pub llm_response: Option<String>,
    pub action_type: ActionType,
    pub action_amount: Option<u32>,
    /// Amount the model asked for when it had to be clamped
    #[serde(default)]
    pub requested_amount: Option<u32>,
    pub parse_success: bool,
    pub parse_error: Option<String>,
    pub default_action_used: bool,
    #[serde(default)]
    pub clarified: bool,
    pub latency_ms: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    /// Break-even equity the model was shown, as a fraction
    pub pot_odds: Option<f64>,
    pub equity_estimate: Option<f64>,
    #[serde(default)]
    pub tools_called: Vec<ToolInvocation>,
}

impl DecisionRecord {
    pub fn from_outcome(outcome: &DecisionOutcome, keys: RecordKeys) -> Self {
        let parse = &outcome.parse;
        let llm_response = match parse.error() {
            Some(ParseError::NoResponse) => None,
            _ => Some(parse.raw().to_string()),
        };
        // Parse errors and illegal-action reasons share the column.
        let parse_error = outcome.fallback_reason().map(ToString::to_string);
        let meta = &outcome.meta;

        Self {
            hand_id: keys.hand_id,
            participant_id: keys.participant_id,
            decision_number: keys.decision_number,
            street: outcome.street,
            llm_response,
            action_type: outcome.action.action_type(),
            action_amount: outcome.action.amount(),
            requested_amount: outcome.requested_amount(),
            parse_success: parse.success(),
            parse_error,
            default_action_used: outcome.used_fallback(),
            clarified: meta.clarified,
            latency_ms: meta.latency_ms,
            prompt_tokens: meta.usage.prompt_tokens,
            completion_tokens: meta.usage.completion_tokens,
            total_tokens: meta.usage.total_tokens,
            cost_usd: meta.cost_usd,
            pot_odds: outcome.tools.pot_odds.map(|p| p.get()),
            equity_estimate: outcome.tools.equity.map(|e| e.get()),
            tools_called: meta.tool_calls.clone(),
        }
    }

    /// The action the row describes, `None` if type and amount disagree.
    pub fn action(&self) -> Option<Action> {
        Action::from_parts(self.action_type, self.action_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DecisionContext;
    use crate::outcome::{ResponseMeta, TokenUsage};
    use crate::policy::Policy;
    use crate::tools::{Equity, PotOdds, ToolOutputs};

    fn keys() -> RecordKeys {
        RecordKeys {
            hand_id: "h-1".to_string(),
            participant_id: "p-1".to_string(),
            decision_number: 3,
        }
    }

    fn ctx() -> DecisionContext {
        DecisionContext::derived(Street::Flop, 500, 20, 20, 60)
    }

    #[test]
    fn clean_parse_has_no_error() {
        let out = Policy::default().decide_reply(Some("I call"), &ctx());
        let rec = DecisionRecord::from_outcome(&out, keys());
        assert_eq!(rec.action_type, ActionType::Call);
        assert_eq!(rec.action_amount, None);
        assert!(rec.parse_success);
        assert!(!rec.default_action_used);
        assert_eq!(rec.parse_error, None);
        assert_eq!(rec.llm_response.as_deref(), Some("I call"));
        assert_eq!(rec.action(), Some(Action::Call));
    }

    #[test]
    fn clamped_amount_keeps_request() {
        let out = Policy::default().decide_reply(Some("raise to 9000"), &ctx());
        let rec = DecisionRecord::from_outcome(&out, keys());
        assert_eq!(rec.action_amount, Some(500));
        assert_eq!(rec.requested_amount, Some(9000));
        assert!(!rec.default_action_used);
    }

    #[test]
    fn illegal_action_records_reason() {
        let out = Policy::default().decide_reply(Some("check"), &ctx());
        let rec = DecisionRecord::from_outcome(&out, keys());
        assert!(rec.parse_success);
        assert!(rec.default_action_used);
        assert_eq!(rec.action_type, ActionType::Fold);
        assert!(rec.parse_error.unwrap().starts_with("illegal action check"));
    }

    #[test]
    fn missing_reply_has_null_response() {
        let out = Policy::default().decide_reply(None, &ctx());
        let rec = DecisionRecord::from_outcome(&out, keys());
        assert_eq!(rec.llm_response, None);
        assert_eq!(rec.parse_error.as_deref(), Some("no response from model"));
    }

    #[test]
    fn meta_and_tools_are_copied() {
        let tools = ToolOutputs {
            equity: Some(Equity::new(0.4).unwrap()),
            pot_odds: Some(PotOdds::new(0.25).unwrap()),
        };
        let out = Policy::default()
            .decide_reply(Some("call"), &ctx().with_tools(tools))
            .with_meta(ResponseMeta {
                latency_ms: 812,
                usage: TokenUsage::new(300, 40),
                cost_usd: 0.002,
                clarified: false,
                responder_error: None,
                tool_calls: Vec::new(),
            });
        let rec = DecisionRecord::from_outcome(&out, keys());
        assert!(rec.tools_called.is_empty());
        assert_eq!(rec.latency_ms, 812);
        assert_eq!(rec.total_tokens, 340);
        assert_eq!(rec.pot_odds, Some(0.25));
        assert_eq!(rec.equity_estimate, Some(0.4));
    }
}
