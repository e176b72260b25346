//! Main application state and logic.

use quest_core::{PlayerState, Scene};
use tokio::sync::mpsc;

use crate::ui::theme::QuestTheme;
use crate::worker::{WorkerRequest, WorkerResponse};

/// Rotating in-fiction status lines shown while a scene is generating.
const LOADING_MESSAGES: &[&str] = &[
    "The dungeon master is rolling dice...",
    "Consulting with the local dragons...",
    "Sharpening virtual swords...",
    "Brewing potions of creativity...",
    "Consulting ancient scrolls...",
    "Rolling for initiative...",
    "Gathering magical energies...",
    "Exploring distant castles...",
    "Preparing epic encounters...",
    "Writing the next chapter...",
];

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main application state.
pub struct App {
    // Channel communication with the session worker
    pub request_tx: mpsc::Sender<WorkerRequest>,
    pub response_rx: mpsc::Receiver<WorkerResponse>,

    // Game state snapshot for rendering
    pub scene: Option<Scene>,
    pub player: PlayerState,
    pub max_steps: u32,

    // UI state
    pub theme: QuestTheme,
    pub generating: bool,
    pub show_help: bool,
    pub scroll: u16,
    status_message: Option<String>,
    spinner_frame: usize,
}

impl App {
    /// Create the application with channel endpoints to the worker.
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
        max_steps: u32,
    ) -> Self {
        Self {
            request_tx,
            response_rx,
            scene: None,
            player: PlayerState::new(),
            max_steps,
            theme: QuestTheme::default(),
            generating: false,
            show_help: false,
            scroll: 0,
            status_message: None,
            spinner_frame: 0,
        }
    }

    /// Kick off the opening generation.
    pub fn start(&mut self) {
        self.generating = true;
        if self.request_tx.try_send(WorkerRequest::Start).is_err() {
            self.generating = false;
            self.set_status("The narrator is busy, try again");
        }
    }

    /// Submit the player's 1-based choice.
    ///
    /// Submissions while a generation is outstanding are rejected
    /// outright, never queued; the button stays dead until the worker
    /// answers.
    pub fn choose(&mut self, index: usize) {
        if self.generating {
            self.set_status("The narrator is still writing...");
            return;
        }
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        if scene.is_terminal() {
            return;
        }
        if index == 0 || index > scene.choices.len() {
            self.set_status(format!("No choice {index} here"));
            return;
        }

        // The worker gets its own copy of the scene the choice was made
        // from; the one kept here is only read for rendering.
        let scene = scene.clone();

        self.generating = true;
        self.clear_status();

        let request = WorkerRequest::Choose {
            index,
            scene,
        };
        if self.request_tx.try_send(request).is_err() {
            self.generating = false;
            self.set_status("The narrator is busy, try again");
        }
    }

    /// Begin a fresh run; only offered once the story has ended.
    pub fn restart(&mut self) {
        if self.generating {
            return;
        }
        let at_end = self.scene.as_ref().is_some_and(Scene::is_terminal);
        if !at_end {
            return;
        }

        self.generating = true;
        self.scroll = 0;
        self.clear_status();
        if self.request_tx.try_send(WorkerRequest::Restart).is_err() {
            self.generating = false;
            self.set_status("The narrator is busy, try again");
        }
    }

    /// Drain any finished work from the worker.
    pub fn drain_responses(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            match response {
                WorkerResponse::Scene { scene, player } => {
                    self.scene = Some(scene);
                    self.player = player;
                    self.generating = false;
                    self.scroll = 0;
                }
            }
        }
    }

    /// Tick for the loading animation.
    pub fn tick(&mut self) {
        if self.generating {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// The loading line to display while a generation is outstanding.
    pub fn loading_line(&self) -> Option<String> {
        if !self.generating {
            return None;
        }
        let message = LOADING_MESSAGES[self.player.step as usize % LOADING_MESSAGES.len()];
        Some(format!("{} {}", SPINNER_FRAMES[self.spinner_frame], message))
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
