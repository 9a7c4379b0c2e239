use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use arena_engine::context::DecisionContext;
use arena_engine::outcome::{DecisionOutcome, ResponseMeta, TokenUsage};
use arena_engine::parser::ActionParser;
use arena_engine::policy::Policy;
use arena_engine::registry::{self, ToolInvocation, ToolRunner};
use serde::Serialize;

use crate::DecisionAgent;
use crate::config::AgentConfig;
use crate::prompts::{SYSTEM_PROMPT, TOOLS_HINT, action_prompt, clarification_prompt};
use crate::responder::{
    CallSettings, Message, ModelReply, Prompt, Responder, ResponderError, Role,
};

/// Running totals for one agent. Safe to update from several threads.
#[derive(Debug, Default)]
pub struct AgentStats {
    calls: AtomicU64,
    parse_failures: AtomicU64,
    fallbacks: AtomicU64,
    clamps: AtomicU64,
    clarifications: AtomicU64,
    responder_errors: AtomicU64,
    tool_calls: AtomicU64,
    tokens: AtomicU64,
    cost_micros: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub calls: u64,
    pub parse_failures: u64,
    pub fallbacks: u64,
    pub clamps: u64,
    pub clarifications: u64,
    pub responder_errors: u64,
    pub tool_calls: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub parse_failure_rate: f64,
}

impl AgentStats {
    pub fn record(&self, outcome: &DecisionOutcome) {
        let bump = |counter: &AtomicU64, hit: bool| {
            if hit {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        };
        bump(&self.calls, true);
        bump(&self.parse_failures, !outcome.parse.success());
        bump(&self.fallbacks, outcome.used_fallback());
        bump(&self.clamps, outcome.was_clamped());
        bump(&self.clarifications, outcome.meta.clarified);
        bump(&self.responder_errors, outcome.meta.responder_error.is_some());
        self.tool_calls
            .fetch_add(outcome.meta.tool_calls.len() as u64, Ordering::Relaxed);
        self.tokens
            .fetch_add(outcome.meta.usage.total_tokens, Ordering::Relaxed);
        self.cost_micros.fetch_add(
            (outcome.meta.cost_usd.max(0.0) * 1_000_000.0).round() as u64,
            Ordering::Relaxed,
        );
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let calls = self.calls.load(Ordering::Relaxed);
        let parse_failures = self.parse_failures.load(Ordering::Relaxed);
        StatsSnapshot {
            calls,
            parse_failures,
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            clamps: self.clamps.load(Ordering::Relaxed),
            clarifications: self.clarifications.load(Ordering::Relaxed),
            responder_errors: self.responder_errors.load(Ordering::Relaxed),
            tool_calls: self.tool_calls.load(Ordering::Relaxed),
            total_tokens: self.tokens.load(Ordering::Relaxed),
            total_cost_usd: self.cost_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
            parse_failure_rate: if calls == 0 {
                0.0
            } else {
                parse_failures as f64 / calls as f64
            },
        }
    }
}

/// Accumulates usage and tool calls across the calls made for one decision.
#[derive(Default)]
struct Exchange {
    usage: TokenUsage,
    cost_usd: f64,
    tool_calls: Vec<ToolInvocation>,
}

/// A [`DecisionAgent`] backed by a [`Responder`].
///
/// Per decision it renders the prompt and calls the responder, retrying
/// transient errors. While tool rounds remain, requested tool calls are run
/// locally and their results sent back; after the last round tools are no
/// longer offered and any further calls are ignored. When the answer has no
/// usable action it asks once more, then hands the reply to the [`Policy`].
/// Transport failures are logged and treated as a missing reply.
pub struct LlmAgent<R> {
    name: String,
    responder: R,
    policy: Policy,
    tools: ToolRunner,
    config: AgentConfig,
    system_prompt: String,
    stats: AgentStats,
}

impl<R: Responder> LlmAgent<R> {
    pub fn new(name: impl Into<String>, responder: R, config: AgentConfig) -> Self {
        let policy = Policy::new(ActionParser::new(config.parser_config()));
        Self {
            name: name.into(),
            responder,
            policy,
            tools: config.tool_runner(),
            config,
            system_prompt: SYSTEM_PROMPT.to_string(),
            stats: AgentStats::default(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn call(&self, prompt: &Prompt, exchange: &mut Exchange) -> Result<ModelReply, ResponderError> {
        let mut attempt = 0;
        loop {
            match self.responder.respond(prompt) {
                Ok(reply) => {
                    exchange.usage = exchange.usage.add(reply.usage);
                    exchange.cost_usd += reply.cost_usd;
                    return Ok(reply);
                }
                Err(err) if err.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    tracing::warn!(
                        agent = %self.name,
                        model = self.responder.model(),
                        attempt,
                        error = %err,
                        "retrying model call"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Calls the responder until it answers without tool calls or the tool
    /// rounds run out, and returns the answer text.
    fn converse(
        &self,
        prompt: &mut Prompt,
        exchange: &mut Exchange,
    ) -> Result<Option<String>, ResponderError> {
        let mut rounds = 0;
        loop {
            prompt.settings.tools_enabled = rounds < self.config.tool_rounds;
            let reply = self.call(prompt, exchange)?;
            if reply.tool_calls.is_empty() {
                return Ok(reply.text);
            }
            if !prompt.settings.tools_enabled {
                tracing::warn!(
                    agent = %self.name,
                    ignored = reply.tool_calls.len(),
                    "tool calls after the last tool round"
                );
                return Ok(reply.text);
            }

            rounds += 1;
            let calls = reply.tool_calls;
            prompt.messages.push(Message::assistant_calls(
                reply.text.unwrap_or_default(),
                calls.clone(),
            ));
            for call in &calls {
                let invocation = self.tools.execute(call);
                tracing::debug!(
                    agent = %self.name,
                    round = rounds,
                    tool = %invocation.name,
                    "ran tool for model"
                );
                prompt
                    .messages
                    .push(Message::tool_result(call.id.as_str(), invocation.result.to_string()));
                exchange.tool_calls.push(invocation);
            }
        }
    }
}

impl<R: Responder> DecisionAgent for LlmAgent<R> {
    fn request_decision(&self, ctx: &DecisionContext) -> DecisionOutcome {
        let started = Instant::now();
        if let Err(err) = ctx.validate() {
            tracing::error!(agent = %self.name, error = %err, "malformed decision context");
        }

        let mut user = action_prompt(ctx);
        if self.config.tool_rounds > 0 {
            user.push_str(TOOLS_HINT);
        }
        let mut prompt = Prompt {
            messages: vec![
                Message::new(Role::System, self.system_prompt.as_str()),
                Message::new(Role::User, user),
            ],
            context: ctx.clone(),
            settings: CallSettings {
                temperature: self.config.temperature,
                timeout: Duration::from_secs(self.config.timeout_secs),
                tools_enabled: false,
            },
        };
        let mut exchange = Exchange::default();
        let mut responder_error = None;
        let mut clarified = false;

        let reply = self.converse(&mut prompt, &mut exchange).unwrap_or_else(|err| {
            tracing::error!(agent = %self.name, error = %err, "model call failed");
            responder_error = Some(err.to_string());
            None
        });
        let mut parse = self.policy.parser().parse_reply(reply.as_deref());

        if !parse.success() && self.config.clarify && responder_error.is_none() {
            clarified = true;
            tracing::info!(
                agent = %self.name,
                error = ?parse.error().map(ToString::to_string),
                "asking for clarification"
            );
            prompt.push(Role::Assistant, reply.unwrap_or_default());
            prompt.push(Role::User, clarification_prompt(&ctx.legal));
            prompt.settings.tools_enabled = false;
            match self.call(&prompt, &mut exchange) {
                Ok(retry) => parse = self.policy.parser().parse_reply(retry.text.as_deref()),
                Err(err) => {
                    tracing::error!(agent = %self.name, error = %err, "clarification call failed");
                    responder_error = Some(err.to_string());
                }
            }
        }

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let Exchange {
            usage,
            cost_usd,
            tool_calls,
        } = exchange;
        let outcome = if tool_calls.is_empty() {
            self.policy.decide(parse, ctx)
        } else {
            let tools = registry::merge_outputs(&tool_calls, ctx.tools);
            self.policy.decide(parse, &ctx.clone().with_tools(tools))
        };
        let outcome = outcome.with_meta(ResponseMeta {
            latency_ms,
            usage,
            cost_usd,
            clarified,
            responder_error,
            tool_calls,
        });
        self.stats.record(&outcome);

        tracing::info!(
            agent = %self.name,
            street = %ctx.street,
            action = %outcome.action,
            fallback = outcome.used_fallback(),
            clamped = outcome.was_clamped(),
            latency_ms,
            tokens = usage.total_tokens,
            tool_calls = outcome.meta.tool_calls.len(),
            "decision made"
        );
        outcome
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedResponder;
    use arena_engine::context::Street;

    #[test]
    fn empty_stats_have_zero_failure_rate() {
        let stats = AgentStats::default().snapshot();
        assert_eq!(stats.calls, 0);
        assert_eq!(stats.parse_failure_rate, 0.0);
    }

    #[test]
    fn stats_sum_usage_and_cost() {
        let responder = ScriptedResponder::new(Vec::<String>::new());
        responder.push_reply(
            crate::responder::ModelReply::text("fold").with_usage(TokenUsage::new(100, 10), 0.25),
        );
        responder.push_reply(
            crate::responder::ModelReply::text("call").with_usage(TokenUsage::new(200, 20), 0.5),
        );
        let agent = LlmAgent::new("t", responder, AgentConfig::default());
        let ctx = DecisionContext::derived(Street::Turn, 400, 40, 40, 100);
        agent.request_decision(&ctx);
        agent.request_decision(&ctx);

        let stats = agent.stats();
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.total_tokens, 330);
        assert!((stats.total_cost_usd - 0.75).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_for_reports() {
        let json = serde_json::to_value(AgentStats::default().snapshot()).unwrap();
        assert_eq!(json["fallbacks"], 0);
        assert!(json.get("parse_failure_rate").is_some());
    }

    #[test]
    fn custom_system_prompt_is_sent() {
        let agent = LlmAgent::new("t", ScriptedResponder::new(["check"]), AgentConfig::default())
            .with_system_prompt("Play tight.");
        agent.request_decision(&DecisionContext::derived(Street::Flop, 100, 0, 10, 20));
        let prompts = agent.responder().prompts();
        assert_eq!(prompts[0].messages[0].content, "Play tight.");
        assert_eq!(agent.config().retries, 3);
    }
}
