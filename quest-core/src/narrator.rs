//! Scene generation with bounded self-repair.
//!
//! The model is an untrusted, non-deterministic text source. The retry
//! loop here absorbs formatting noise (stray prose, code fences, minor
//! JSON malformation), not semantic errors: every retry re-sends the same
//! history with no corrective feedback, giving the model a few chances to
//! self-correct purely by chance. Transport and API errors are different
//! in kind and fail fast on the first occurrence.

use std::sync::Arc;

use async_trait::async_trait;
use groq::{Groq, Message, Request};
use thiserror::Error;
use tracing::{debug, warn};

use crate::history::History;
use crate::scene::{parse_scene, strip_code_fences, BraceSpan, Extractor, Scene};
use crate::state::PlayerState;

/// Total decode attempts per scene: one initial try plus three repairs.
const MAX_ATTEMPTS: usize = 4;

/// Flavor text when every repair attempt produced garbage.
pub const GARBLED_MESSAGE: &str = "The storyteller's script dissolves into unreadable runes. \
No amount of squinting recovers the next chapter, and so the tale closes itself.";

/// Flavor text when the model could not be reached at all.
pub const CONNECTION_LOST_MESSAGE: &str = "A sudden storm scatters the storyteller's pages. \
The adventure ends here, sooner than anyone hoped.";

/// Flavor text for the locally synthesized conclusion.
pub const CONCLUSION_MESSAGE: &str = "Your adventure comes to an end...";

/// A chat backend the narrator draws completions from.
///
/// The live implementation wraps the Groq client; tests script one.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, messages: &[Message]) -> Result<String, groq::Error>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn chat(&self, messages: &[Message]) -> Result<String, groq::Error> {
        (**self).chat(messages).await
    }
}

/// Live backend over the Groq API.
pub struct GroqBackend {
    client: Groq,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
}

impl GroqBackend {
    pub fn new(client: Groq) -> Self {
        Self {
            client,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    async fn chat(&self, messages: &[Message]) -> Result<String, groq::Error> {
        let mut request = Request::new(messages.to_vec());
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        let response = self.client.complete(request).await?;
        Ok(response.text())
    }
}

#[derive(Debug, Error)]
enum GenerationError {
    #[error(transparent)]
    Transport(#[from] groq::Error),

    #[error("model output stayed malformed after {MAX_ATTEMPTS} attempts")]
    Exhausted,
}

/// Turns conversation history into well-formed scenes.
pub struct Narrator {
    backend: Box<dyn ChatBackend>,
    extractor: Box<dyn Extractor>,
}

impl Narrator {
    /// Create a narrator with the loose default extractor.
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self {
            backend,
            extractor: Box::new(BraceSpan),
        }
    }

    /// Swap the extraction step.
    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Generate the next scene.
    ///
    /// Never fails past this boundary: transport errors and exhausted
    /// repair attempts both degrade to a renderable terminal scene that
    /// carries the player's current stats.
    pub async fn next_scene(&self, history: &History, player: &PlayerState) -> Scene {
        match self.try_generate(history).await {
            Ok(scene) => scene,
            Err(GenerationError::Transport(err)) => {
                warn!(%err, "model call failed, ending the story");
                Scene::game_over(CONNECTION_LOST_MESSAGE, player)
            }
            Err(GenerationError::Exhausted) => {
                warn!("scene output never became parseable, ending the story");
                Scene::game_over(GARBLED_MESSAGE, player)
            }
        }
    }

    /// Generate a closing scene narrated by the model.
    ///
    /// The result is forced terminal so the turn loop cannot be reopened
    /// past the step budget. Any failure, transport or garbled alike,
    /// falls back to the local conclusion instead of the mid-game failure
    /// scenes.
    pub async fn ending_scene(&self, history: &History, player: &PlayerState) -> Scene {
        match self.try_generate(history).await {
            Ok(scene) => scene.into_terminal(),
            Err(err) => {
                debug!(%err, "ending generation failed, using the local conclusion");
                Scene::game_over(CONCLUSION_MESSAGE, player)
            }
        }
    }

    async fn try_generate(&self, history: &History) -> Result<Scene, GenerationError> {
        for attempt in 1..=MAX_ATTEMPTS {
            // Transport errors are not part of the repair loop: the `?`
            // ends the turn on the first one.
            let raw = self.backend.chat(history.messages()).await?;
            let cleaned = strip_code_fences(&raw);
            let candidate = self.extractor.extract(&cleaned);
            match parse_scene(candidate) {
                Ok(scene) => return Ok(scene),
                Err(err) => {
                    debug!(attempt, %err, "scene payload malformed, deciphering again");
                }
            }
        }
        Err(GenerationError::Exhausted)
    }
}
