//! Turn-based narrative quest engine driven by an LLM narrator.
//!
//! This crate provides:
//! - The turn controller (`GameSession`) that owns player state and the
//!   conversation history
//! - Scene generation with a bounded self-repair loop over a chat backend
//! - A sliding-window conversation history
//! - Scripted-backend testing utilities
//!
//! # Quick Start
//!
//! ```ignore
//! use quest_core::{GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::from_env(SessionConfig::new())?;
//!
//!     let scene = session.initialize().await;
//!     println!("{}", scene.story);
//!
//!     let next = session.apply_choice(1, scene).await;
//!     println!("{}", next.story);
//!     Ok(())
//! }
//! ```

pub mod history;
pub mod narrator;
pub mod scene;
pub mod session;
pub mod state;
pub mod testing;

// Primary public API
pub use history::History;
pub use narrator::{ChatBackend, GroqBackend, Narrator};
pub use scene::{BraceSpan, Effect, Extractor, Scene};
pub use session::{EndingMode, GameSession, Phase, SessionConfig, SessionError};
pub use state::PlayerState;
pub use testing::ScriptedBackend;
