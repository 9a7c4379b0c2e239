//! # arena-engine: Decision Pipeline Core
//!
//! Turns free-form model replies into legal poker actions for an
//! LLM-vs-LLM evaluation harness. The external poker engine owns the rules
//! and supplies the legal action set; this crate reads what the model said,
//! validates it against that set, and degrades to a deterministic default
//! when the reply is unusable. Nothing here returns an error to the caller:
//! every problem ends up as data in the [`outcome::DecisionOutcome`].
//!
//! ## Core Modules
//!
//! - [`action`] - Canonical actions (fold/check/call/bet/raise)
//! - [`context`] - Per-decision snapshot: street, legal actions, pot, stack
//! - [`grammar`] - Action phrase rules and phrase selection
//! - [`parser`] - Free text to [`parser::ParseResult`]
//! - [`policy`] - Legality check, clamping and fallback
//! - [`outcome`] - Final decision plus audit metadata
//! - [`record`] - Flat row for persistence
//! - [`tools`] - Pot odds, equity and advisories
//! - [`registry`] - Tool calls a model may make and their execution
//! - [`cards`] - Card notation used by the equity tools
//! - [`deck`] - Seeded deck of unseen cards for simulation
//! - [`hand`] - Hand strength evaluation
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use arena_engine::action::Action;
//! use arena_engine::context::{DecisionContext, Street};
//!
//! // 500 behind, facing 20, min raise 20, 60 in the pot
//! let ctx = DecisionContext::derived(Street::Flop, 500, 20, 20, 60);
//!
//! let outcome = arena_engine::decide(Some("Tough spot. Final answer: raise to 1,000"), &ctx);
//! assert_eq!(outcome.action, Action::Raise(500));
//! assert!(outcome.was_clamped());
//!
//! let outcome = arena_engine::decide(Some("hmm, not sure"), &ctx);
//! assert_eq!(outcome.action, Action::Fold);
//! assert!(outcome.used_fallback());
//! ```

pub mod action;
pub mod cards;
pub mod context;
pub mod deck;
pub mod errors;
pub mod grammar;
pub mod hand;
pub mod outcome;
pub mod parser;
pub mod policy;
pub mod record;
pub mod registry;
pub mod tools;

use context::DecisionContext;
use outcome::DecisionOutcome;

/// Parses `reply` and resolves it with the default [`policy::Policy`].
pub fn decide(reply: Option<&str>, ctx: &DecisionContext) -> DecisionOutcome {
    policy::Policy::default().decide_reply(reply, ctx)
}
