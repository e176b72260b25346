//! GameSession - the turn controller and primary public API.
//!
//! This module wraps the narrator, player state, and conversation history
//! behind the three calls the presentation surface is allowed to make:
//! `initialize`, `apply_choice`, and `restart`, plus read-only snapshots.
//! Every path out of the controller hands back a renderable scene; failure
//! never surfaces to the player as anything but fiction.

use groq::{Groq, Message};
use thiserror::Error;
use tracing::info;

use crate::history::History;
use crate::narrator::{ChatBackend, GroqBackend, Narrator, CONCLUSION_MESSAGE};
use crate::scene::Scene;
use crate::state::PlayerState;

/// In-fiction message for a scene that cannot honor the submitted choice.
pub const FAULT_MESSAGE: &str = "A mysterious force disrupts your adventure...\n\n\
The ancient scrolls have become illegible, but your journey was still a memorable one!";

/// In-fiction message shown when the player's health runs out.
pub const DEATH_MESSAGE: &str = "You have perished in your quest!";

/// In-fiction message for choices submitted after the story has ended.
pub const EPILOGUE_MESSAGE: &str = "Your epic journey has reached its conclusion...\n\n\
As you reflect on your adventures, you realize how far you've come.";

/// Errors from creating a game session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No API key configured - set GROQ_API_KEY environment variable")]
    NoApiKey,
}

/// How the final scene is produced once the step budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndingMode {
    /// Ask the model to narrate a closing scene (forced terminal).
    #[default]
    ModelNarrated,
    /// Synthesize the conclusion locally without a model call.
    LocalFallback,
}

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of accepted choices before the story concludes.
    pub max_steps: u32,

    /// How the final scene is produced.
    pub ending: EndingMode,

    /// Model override for the narrator.
    pub model: Option<String>,

    /// Maximum tokens per completion.
    pub max_tokens: Option<usize>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Custom system prompt (replaces the built-in template).
    pub custom_system_prompt: Option<String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            max_steps: 5,
            ending: EndingMode::default(),
            model: None,
            max_tokens: None,
            temperature: None,
            custom_system_prompt: None,
        }
    }

    /// Set the number of steps the story lasts.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set how the final scene is produced.
    pub fn with_ending(mut self, ending: EndingMode) -> Self {
        self.ending = ending;
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens for completions.
    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set temperature for generation.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set a custom narrator system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the session is in the turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    AwaitingChoice,
    Ended,
}

/// A quest game session.
///
/// Owns the player state and conversation history outright; callers must
/// not invoke it concurrently with itself. The presentation layer's
/// reject-while-generating rule plus `&mut self` receivers are the whole
/// synchronization story.
pub struct GameSession {
    narrator: Narrator,
    player: PlayerState,
    history: History,
    config: SessionConfig,
    phase: Phase,
}

impl GameSession {
    /// Create a session from the GROQ_API_KEY environment variable.
    pub fn from_env(config: SessionConfig) -> Result<Self, SessionError> {
        let mut client = Groq::from_env().map_err(|_| SessionError::NoApiKey)?;
        if let Some(ref model) = config.model {
            client = client.with_model(model);
        }

        let mut backend = GroqBackend::new(client);
        if let Some(max_tokens) = config.max_tokens {
            backend = backend.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = config.temperature {
            backend = backend.with_temperature(temperature);
        }

        Ok(Self::with_backend(config, Box::new(backend)))
    }

    /// Create a session over an arbitrary chat backend.
    pub fn with_backend(config: SessionConfig, backend: Box<dyn ChatBackend>) -> Self {
        Self {
            narrator: Narrator::new(backend),
            player: PlayerState::new(),
            history: History::new(),
            config,
            phase: Phase::Unstarted,
        }
    }

    /// Seed the conversation and generate the opening scene.
    pub async fn initialize(&mut self) -> Scene {
        if self.phase != Phase::Unstarted {
            self.restart();
        }

        self.history.record(Message::system(self.system_prompt()));
        self.history.record(Message::user("Start the adventure!"));

        let scene = self.narrator.next_scene(&self.history, &self.player).await;
        self.phase = if scene.is_terminal() {
            Phase::Ended
        } else {
            Phase::AwaitingChoice
        };
        scene
    }

    /// Apply the player's choice from the prior scene and produce the next.
    ///
    /// Takes the prior scene by value: the caller hands over an owned copy
    /// and keeps whatever it needs for rendering.
    pub async fn apply_choice(&mut self, index: usize, scene: Scene) -> Scene {
        // Late or premature submissions never mutate state.
        if self.phase != Phase::AwaitingChoice || self.player.step >= self.config.max_steps {
            self.phase = Phase::Ended;
            return Scene::game_over(EPILOGUE_MESSAGE, &self.player);
        }

        // Validate before touching any state: a scene that cannot honor
        // the submitted index ends the game with nothing half-applied.
        let Some(label) = scene.choice_label(index) else {
            info!(index, "chosen index missing from scene, ending in-fiction");
            self.phase = Phase::Ended;
            return Scene::game_over(FAULT_MESSAGE, &self.player);
        };
        let Some(effect) = scene.effect_for(index) else {
            info!(index, "no effect mapping for chosen index, ending in-fiction");
            self.phase = Phase::Ended;
            return Scene::game_over(FAULT_MESSAGE, &self.player);
        };

        self.player.apply(effect);

        // Keep the model's context causally consistent with the state it
        // just changed: the scene it wrote, then the choice taken.
        self.history
            .record(Message::assistant(serde_json::to_string(&scene).unwrap_or_default()));
        self.history.record(Message::user(format!(
            "Choice made: {label}\nNew player state: {}",
            self.player.summary()
        )));

        // Death takes precedence over whatever would have come next.
        if self.player.is_dead() {
            info!(step = self.player.step, "player died, ending the story");
            self.phase = Phase::Ended;
            return Scene::game_over(DEATH_MESSAGE, &self.player);
        }

        // The step budget is checked before spending a generation on it.
        if self.player.step >= self.config.max_steps {
            self.phase = Phase::Ended;
            return match self.config.ending {
                EndingMode::LocalFallback => Scene::game_over(CONCLUSION_MESSAGE, &self.player),
                EndingMode::ModelNarrated => {
                    self.history.record(Message::user(
                        "The adventure is complete. Narrate the closing scene.",
                    ));
                    self.narrator.ending_scene(&self.history, &self.player).await
                }
            };
        }

        let next = self.narrator.next_scene(&self.history, &self.player).await;
        if next.is_terminal() {
            self.phase = Phase::Ended;
        }
        next
    }

    /// Reset for a fresh run: new player, empty history, back to unstarted.
    pub fn restart(&mut self) {
        self.player = PlayerState::new();
        self.history.clear();
        self.phase = Phase::Unstarted;
    }

    /// Read-only snapshot of the player state.
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// The conversation history as it would be sent to the model.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn max_steps(&self) -> u32 {
        self.config.max_steps
    }

    fn system_prompt(&self) -> String {
        let template = self
            .config
            .custom_system_prompt
            .clone()
            .unwrap_or_else(|| include_str!("prompts/narrator.txt").to_string());

        format!(
            "{}\n\nCurrent player state: {}",
            template.replace("{max_steps}", &self.config.max_steps.to_string()),
            self.player.summary()
        )
    }
}
