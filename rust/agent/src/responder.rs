use arena_engine::context::DecisionContext;
use arena_engine::outcome::TokenUsage;
use arena_engine::registry::ToolCall;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Sampling and transport settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub temperature: f64,
    pub timeout: Duration,
    /// Offer the definitions from `arena_engine::registry::definitions`
    pub tools_enabled: bool,
}

/// Conversation sent to a [`Responder`] plus the snapshot it was rendered from.
///
/// Real model clients only read `messages` and `settings`; rule-based
/// responders may decide from `context` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub messages: Vec<Message>,
    pub context: DecisionContext,
    pub settings: CallSettings,
}

impl Prompt {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Content of the latest user message.
    pub fn last_user(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Whether an earlier answer is already in the conversation. Tool-call
    /// turns do not count.
    pub fn is_follow_up(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.role == Role::Assistant && m.tool_calls.is_empty())
    }
}

/// What came back from the model. `text` is `None` when the provider
/// returned no content at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    /// Tools the model wants run before it answers
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
    pub cost_usd: f64,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn calling(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage, cost_usd: f64) -> Self {
        self.usage = usage;
        self.cost_usd = cost_usd;
        self
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResponderError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("model refused to answer: {0}")]
    Refused(String),
}

impl ResponderError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResponderError::Timeout(_) | ResponderError::Transport(_) => true,
            ResponderError::Provider { status, .. } => *status == 429 || *status >= 500,
            ResponderError::Refused(_) => false,
        }
    }
}

/// A source of model replies: a provider client, a rule-based stand-in, or
/// a script in tests.
pub trait Responder: Send + Sync {
    fn respond(&self, prompt: &Prompt) -> Result<ModelReply, ResponderError>;

    /// Model identifier, e.g. `openai/gpt-4o`.
    fn model(&self) -> &str;
}

impl<R: Responder + ?Sized> Responder for Box<R> {
    fn respond(&self, prompt: &Prompt) -> Result<ModelReply, ResponderError> {
        (**self).respond(prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_engine::context::Street;

    #[test]
    fn transient_errors() {
        assert!(ResponderError::Timeout(Duration::from_secs(30)).is_transient());
        assert!(ResponderError::Provider { status: 503, message: "busy".into() }.is_transient());
        let throttled = ResponderError::Provider {
            status: 429,
            message: "slow down".into(),
        };
        assert!(throttled.is_transient());
        assert!(!ResponderError::Provider { status: 400, message: "bad".into() }.is_transient());
        assert!(!ResponderError::Refused("policy".into()).is_transient());
    }

    #[test]
    fn follow_up_detection() {
        let mut prompt = Prompt {
            messages: vec![Message::new(Role::System, "sys"), Message::new(Role::User, "act")],
            context: DecisionContext::derived(Street::Flop, 100, 0, 10, 20),
            settings: CallSettings {
                temperature: 0.7,
                timeout: Duration::from_secs(30),
                tools_enabled: false,
            },
        };
        assert!(!prompt.is_follow_up());
        prompt.push(Role::Assistant, "hmm");
        prompt.push(Role::User, "again");
        assert!(prompt.is_follow_up());
        assert_eq!(prompt.last_user(), Some("again"));
    }

    #[test]
    fn tool_messages_serialize_in_provider_shape() {
        let call = ToolCall::new("call_1", "pot_odds_calculator", "{}");
        let asked = serde_json::to_value(Message::assistant_calls("", vec![call])).unwrap();
        assert_eq!(asked["role"], "assistant");
        assert_eq!(asked["tool_calls"][0]["id"], "call_1");
        assert!(asked.get("tool_call_id").is_none());

        let answered = serde_json::to_value(Message::tool_result("call_1", "{}")).unwrap();
        assert_eq!(answered["role"], "tool");
        assert_eq!(answered["tool_call_id"], "call_1");
        assert!(answered.get("tool_calls").is_none());
    }
}
