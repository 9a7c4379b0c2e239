use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::responder::{ModelReply, Prompt, Responder, ResponderError};

/// Replays queued replies in order and records every prompt it was sent.
///
/// Once the queue is empty it answers with an empty reply, which the
/// pipeline treats like a model that said nothing.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    model: String,
    replies: Mutex<VecDeque<Result<ModelReply, ResponderError>>>,
    seen: Mutex<Vec<Prompt>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedResponder {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "scripted".to_string(),
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| Ok(ModelReply::text(r)))
                    .collect(),
            ),
            seen: Mutex::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn push_reply(&self, reply: ModelReply) {
        lock(&self.replies).push_back(Ok(reply));
    }

    pub fn push_error(&self, error: ResponderError) {
        lock(&self.replies).push_back(Err(error));
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<Prompt> {
        lock(&self.seen).clone()
    }
}

impl Responder for ScriptedResponder {
    fn respond(&self, prompt: &Prompt) -> Result<ModelReply, ResponderError> {
        lock(&self.seen).push(prompt.clone());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::default()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
