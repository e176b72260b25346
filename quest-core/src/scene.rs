//! Scene values and best-effort extraction of scene JSON from model text.
//!
//! The model is an untrusted text source: responses may wrap the scene
//! JSON in code fences or surround it with prose. Extraction here is
//! deliberately loose; the narrator's repair loop absorbs what it misses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::PlayerState;

/// One turn's narrative payload.
///
/// Scenes are immutable values: the session consumes an owned `Scene` per
/// choice and produces a fresh one, so no copying discipline is needed at
/// the presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Narrative text shown to the player.
    pub story: String,
    /// Choice labels, at most three. Empty means the scene is terminal.
    #[serde(default)]
    pub choices: Vec<String>,
    /// Per-choice deltas, keyed by 1-based choice index ("1".."3").
    ///
    /// Lenient on decode: a scene missing its `effects` table parses fine
    /// and only fails later, at choice time, as a protocol violation.
    #[serde(default)]
    pub effects: BTreeMap<String, Effect>,
}

impl Scene {
    /// Build a terminal scene from a message plus the player's final stats.
    pub fn game_over(message: &str, player: &PlayerState) -> Self {
        Self {
            story: format!("{message}\n\n{}", player.final_stats()),
            choices: Vec::new(),
            effects: BTreeMap::new(),
        }
    }

    /// A scene with no choices ends the game.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }

    /// Look up the effect for a 1-based choice index.
    pub fn effect_for(&self, index: usize) -> Option<&Effect> {
        self.effects.get(&index.to_string())
    }

    /// Look up the label for a 1-based choice index.
    pub fn choice_label(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }

    /// Drop choices and effects, forcing the scene terminal.
    pub fn into_terminal(mut self) -> Self {
        self.choices.clear();
        self.effects.clear();
        self
    }
}

/// The stat/inventory delta attached to one choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Why a model payload failed to decode into a scene.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scene has an empty story")]
    EmptyStory,
}

/// Remove markdown code-fence markers the model sometimes wraps around JSON.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Extracts a scene-JSON candidate from raw model text.
///
/// Swappable so tests can substitute a stricter extractor without touching
/// the repair loop built around the loose default.
pub trait Extractor: Send + Sync {
    fn extract<'a>(&self, raw: &'a str) -> &'a str;
}

/// Best-effort extraction: the span from the first `{` to the last `}`.
///
/// Known limitation: when the response contains more than one JSON-like
/// block, the span covers all of them and decoding fails downstream. The
/// repair loop exists to absorb exactly that kind of noise, so this stays
/// a loose scan rather than a real parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceSpan;

impl Extractor for BraceSpan {
    fn extract<'a>(&self, raw: &'a str) -> &'a str {
        match (raw.find('{'), raw.rfind('}')) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => raw,
        }
    }
}

/// Decode an extracted candidate into a scene.
///
/// An empty story counts as malformed output even when the JSON itself is
/// valid; well-formed scenes always narrate something.
pub fn parse_scene(candidate: &str) -> Result<Scene, ParseError> {
    let scene: Scene = serde_json::from_str(candidate)?;
    if scene.story.trim().is_empty() {
        return Err(ParseError::EmptyStory);
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let raw = "```json\n{\"story\": \"hi\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"story\": \"hi\"}");
    }

    #[test]
    fn test_brace_span_extracts_object() {
        let raw = "Here is your scene: {\"story\": \"hi\"} Enjoy!";
        assert_eq!(BraceSpan.extract(raw), "{\"story\": \"hi\"}");
    }

    #[test]
    fn test_brace_span_without_braces_passes_through() {
        let raw = "no json here";
        assert_eq!(BraceSpan.extract(raw), raw);
    }

    #[test]
    fn test_brace_span_is_greedy_across_blocks() {
        // Two objects in one response: the span swallows both, which then
        // fails to decode. Documented behavior, not something to fix.
        let raw = "{\"a\": 1} and {\"b\": 2}";
        let extracted = BraceSpan.extract(raw);
        assert_eq!(extracted, "{\"a\": 1} and {\"b\": 2}");
        assert!(parse_scene(extracted).is_err());
    }

    #[test]
    fn test_parse_scene_full() {
        let payload = r#"{
            "story": "A dragon blocks the bridge.",
            "choices": ["Fight", "Flee"],
            "effects": {
                "1": {"health": -20, "gold": 50, "items": ["dragon scale"]},
                "2": {"health": 0}
            }
        }"#;

        let scene = parse_scene(payload).unwrap();
        assert_eq!(scene.choices.len(), 2);
        assert!(!scene.is_terminal());

        let fight = scene.effect_for(1).unwrap();
        assert_eq!(fight.health, -20);
        assert_eq!(fight.gold, 50);

        // Missing effect fields default to no-ops.
        let flee = scene.effect_for(2).unwrap();
        assert_eq!(flee.gold, 0);
        assert!(flee.items.is_empty());
    }

    #[test]
    fn test_parse_scene_missing_effects_is_lenient() {
        let scene = parse_scene(r#"{"story": "Calm night.", "choices": ["Sleep"]}"#).unwrap();
        assert!(scene.effects.is_empty());
        assert!(scene.effect_for(1).is_none());
    }

    #[test]
    fn test_parse_scene_empty_story_is_malformed() {
        assert!(matches!(
            parse_scene(r#"{"story": "  ", "choices": []}"#),
            Err(ParseError::EmptyStory)
        ));
    }

    #[test]
    fn test_parse_scene_rejects_prose() {
        assert!(parse_scene("Once upon a time").is_err());
    }

    #[test]
    fn test_game_over_embeds_stats() {
        let mut player = PlayerState::new();
        player.gold = 42;
        player.inventory.push("lantern".to_string());

        let scene = Scene::game_over("The end.", &player);
        assert!(scene.is_terminal());
        assert!(scene.effects.is_empty());
        assert!(scene.story.contains("The end."));
        assert!(scene.story.contains("Gold: 42"));
        assert!(scene.story.contains("lantern"));
    }

    #[test]
    fn test_into_terminal() {
        let scene = parse_scene(
            r#"{"story": "Fin.", "choices": ["More"], "effects": {"1": {"gold": 1}}}"#,
        )
        .unwrap();
        let terminal = scene.into_terminal();
        assert!(terminal.is_terminal());
        assert!(terminal.effects.is_empty());
        assert_eq!(terminal.story, "Fin.");
    }

    #[test]
    fn test_choice_label_bounds() {
        let scene = parse_scene(r#"{"story": "x", "choices": ["Only"]}"#).unwrap();
        assert_eq!(scene.choice_label(1), Some("Only"));
        assert_eq!(scene.choice_label(0), None);
        assert_eq!(scene.choice_label(2), None);
    }
}
