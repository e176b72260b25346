//! Testing utilities for the quest engine.
//!
//! Provides a scripted chat backend for deterministic tests without API
//! calls, in the spirit of a scripted dungeon master: queue up responses,
//! play them back in order, count how often the narrator asked.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use groq::Message;

use crate::narrator::ChatBackend;

/// A chat backend that replays scripted completions in order.
///
/// Once the script runs out, every further call answers with a fixed
/// non-JSON line, so an empty script doubles as an "always malformed"
/// backend for exercising the repair loop.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, groq::Error>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, groq::Error>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script a sequence of successful completions.
    pub fn completions(texts: Vec<String>) -> Self {
        Self::new(texts.into_iter().map(Ok).collect())
    }

    /// Append another response to the script.
    pub fn queue(&self, response: Result<String, groq::Error>) {
        self.responses
            .lock()
            .expect("scripted backend lock poisoned")
            .push_back(response);
    }

    /// How many times the narrator has called this backend.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, _messages: &[Message]) -> Result<String, groq::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .expect("scripted backend lock poisoned")
            .pop_front();
        match next {
            Some(response) => response,
            None => Ok("The narrator has no more scripted lines.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let backend = ScriptedBackend::completions(vec!["one".to_string(), "two".to_string()]);

        assert_eq!(backend.chat(&[]).await.unwrap(), "one");
        assert_eq!(backend.chat(&[]).await.unwrap(), "two");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_script_answers_with_non_json() {
        let backend = ScriptedBackend::new(vec![]);
        let answer = backend.chat(&[]).await.unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&answer).is_err());
    }

    #[tokio::test]
    async fn test_queue_after_creation() {
        let backend = ScriptedBackend::new(vec![]);
        backend.queue(Ok("later".to_string()));
        assert_eq!(backend.chat(&[]).await.unwrap(), "later");
    }
}
