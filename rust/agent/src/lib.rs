//! # arena-agent: Hand Orchestration Contract
//!
//! Connects a model to the decision pipeline in `arena-engine`. The hand
//! orchestrator holds one [`DecisionAgent`] per seat and asks it for a
//! decision whenever that seat is to act; the agent always answers with a
//! legal action, whatever the model said.
//!
//! ## Core Components
//!
//! - [`DecisionAgent`] - What the orchestrator calls
//! - [`agent`] - [`agent::LlmAgent`], an agent backed by any [`responder::Responder`],
//!   running the model's tool calls locally
//! - [`responder`] - The model-facing seam: prompts in, replies out
//! - [`prompts`] - System, action, tool hint and clarification prompt text
//! - [`baseline`] - Offline rule-based responder
//! - [`scripted`] - Responder that replays canned replies
//! - [`config`] - Layered configuration (defaults, toml file, env)
//! - [`logging`] - `tracing` subscriber setup and test capture
//!
//! ## Quick Start
//!
//! ```rust
//! use arena_agent::{DecisionAgent, create_agent};
//! use arena_agent::config::AgentConfig;
//! use arena_engine::context::{DecisionContext, Street};
//!
//! let agent = create_agent("baseline", &AgentConfig::default()).unwrap();
//! let ctx = DecisionContext::derived(Street::Turn, 1_000, 100, 100, 300);
//!
//! let outcome = agent.request_decision(&ctx);
//! assert!(ctx.legal.permits(&outcome.action));
//! ```

use arena_engine::context::DecisionContext;
use arena_engine::outcome::DecisionOutcome;

pub mod agent;
pub mod baseline;
pub mod config;
pub mod logging;
pub mod prompts;
pub mod responder;
pub mod scripted;

use config::{AgentConfig, ConfigError};

/// A seat's decision maker.
///
/// Implementations must be total: every call returns a legal action for
/// `ctx`, falling back to check/fold when the model is unusable.
pub trait DecisionAgent: Send + Sync {
    /// Decides for the player described by `ctx`.
    fn request_decision(&self, ctx: &DecisionContext) -> DecisionOutcome;

    /// Display name, usually the model identifier.
    fn name(&self) -> &str;
}

/// Builds an agent by kind.
///
/// Only offline kinds are known here; provider-backed agents are built with
/// [`agent::LlmAgent::new`] around the caller's own responder.
///
/// # Supported kinds
///
/// - `"baseline"` - [`baseline::BaselineResponder`] behind an [`agent::LlmAgent`]
pub fn create_agent(
    kind: &str,
    config: &AgentConfig,
) -> Result<Box<dyn DecisionAgent>, ConfigError> {
    config::validate(config)?;
    match kind {
        "baseline" => Ok(Box::new(agent::LlmAgent::new(
            "baseline",
            baseline::BaselineResponder::new(),
            config.clone(),
        ))),
        other => Err(ConfigError::UnknownAgent(other.to_string())),
    }
}
