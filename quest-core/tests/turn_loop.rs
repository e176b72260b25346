//! End-to-end turn-loop tests over a scripted backend.
//!
//! These exercise the full controller: choice application, history
//! bookkeeping, the repair loop, and every termination path, all without
//! touching the network.

use std::sync::Arc;

use quest_core::narrator::{CONCLUSION_MESSAGE, CONNECTION_LOST_MESSAGE, GARBLED_MESSAGE};
use quest_core::session::{DEATH_MESSAGE, EPILOGUE_MESSAGE, FAULT_MESSAGE};
use quest_core::testing::ScriptedBackend;
use quest_core::{EndingMode, GameSession, Phase, PlayerState, SessionConfig};

fn scene_payload(step: usize) -> String {
    format!(
        r#"{{
            "story": "Scene {step}: a fork in the road.",
            "choices": ["Go left", "Go right", "Rest a while"],
            "effects": {{
                "1": {{"health": -10, "gold": 5, "items": ["pebble {step}"]}},
                "2": {{"health": 0, "gold": 10, "items": []}},
                "3": {{"health": 5, "gold": 0, "items": []}}
            }}
        }}"#
    )
}

fn session_over(
    responses: Vec<Result<String, groq::Error>>,
    config: SessionConfig,
) -> (GameSession, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::new(responses));
    let session = GameSession::with_backend(config, Box::new(backend.clone()));
    (session, backend)
}

#[tokio::test]
async fn full_run_ends_exactly_at_max_steps() {
    let script = (0..3).map(|i| Ok(scene_payload(i))).collect();
    let config = SessionConfig::new()
        .with_max_steps(3)
        .with_ending(EndingMode::LocalFallback);
    let (mut session, backend) = session_over(script, config);

    let mut scene = session.initialize().await;
    assert_eq!(session.phase(), Phase::AwaitingChoice);

    for _ in 0..3 {
        assert!(!scene.is_terminal());
        scene = session.apply_choice(2, scene).await;
    }

    assert!(scene.is_terminal());
    assert!(scene.story.contains(CONCLUSION_MESSAGE));
    assert_eq!(session.player().step, 3);
    assert_eq!(session.player().gold, 30);
    assert!(session.is_ended());
    // Three generations: the opener and two mid-game scenes. The local
    // ending costs no model call.
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn model_narrated_ending_is_forced_terminal() {
    // The "ending" the model returns still has choices; the controller
    // must strip them so the loop cannot reopen.
    let script = vec![Ok(scene_payload(0)), Ok(scene_payload(1))];
    let config = SessionConfig::new()
        .with_max_steps(1)
        .with_ending(EndingMode::ModelNarrated);
    let (mut session, backend) = session_over(script, config);

    let scene = session.initialize().await;
    let ending = session.apply_choice(1, scene).await;

    assert!(ending.is_terminal());
    assert!(ending.effects.is_empty());
    assert_eq!(session.player().step, 1);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn choice_effect_applies_additively() {
    let payload = r#"{
        "story": "A rope bridge sways over the gorge.",
        "choices": ["Cross carefully"],
        "effects": {"1": {"health": -20, "gold": 5, "items": ["rope"]}}
    }"#;
    let (mut session, _backend) = session_over(
        vec![Ok(payload.to_string()), Ok(scene_payload(1))],
        SessionConfig::new().with_max_steps(5),
    );

    let scene = session.initialize().await;
    session.apply_choice(1, scene).await;

    let player = session.player();
    assert_eq!(player.health, 80);
    assert_eq!(player.gold, 5);
    assert_eq!(player.inventory, vec!["rope".to_string()]);
    assert_eq!(player.step, 1);
}

#[tokio::test]
async fn history_window_keeps_system_prompt() {
    let script = (0..6).map(|i| Ok(scene_payload(i))).collect();
    let (mut session, _backend) = session_over(script, SessionConfig::new().with_max_steps(8));

    let mut scene = session.initialize().await;
    assert_eq!(session.history().len(), 2);

    // Each accepted choice records two messages; five turns overflow the
    // ten-message window.
    for _ in 0..5 {
        scene = session.apply_choice(3, scene).await;
    }

    assert_eq!(session.history().len(), 10);
    let first = &session.history().messages()[0];
    assert!(matches!(first.role, groq::Role::System));
    assert!(first.content.contains("dungeon master"));
}

#[tokio::test]
async fn death_overrides_remaining_steps() {
    let payload = r#"{
        "story": "The cliff edge crumbles.",
        "choices": ["Jump", "Climb down"],
        "effects": {
            "1": {"health": -150, "gold": 0, "items": []},
            "2": {"health": -5, "gold": 0, "items": []}
        }
    }"#;
    let (mut session, backend) = session_over(
        vec![Ok(payload.to_string())],
        SessionConfig::new().with_max_steps(10),
    );

    let scene = session.initialize().await;
    let death = session.apply_choice(1, scene).await;

    assert!(death.is_terminal());
    assert!(death.story.contains(DEATH_MESSAGE));
    assert!(death.story.contains("Health: -50"));
    assert_eq!(session.player().step, 1);
    assert!(session.is_ended());
    // No generation is spent on a dead player.
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn missing_effect_entry_ends_without_partial_mutation() {
    let payload = r#"{
        "story": "Three doors stand before you.",
        "choices": ["Red door", "Blue door", "Green door"],
        "effects": {"1": {"gold": 5}}
    }"#;
    let (mut session, backend) = session_over(
        vec![Ok(payload.to_string())],
        SessionConfig::new().with_max_steps(5),
    );

    let scene = session.initialize().await;
    let fault = session.apply_choice(2, scene).await;

    assert!(fault.is_terminal());
    assert!(fault.story.contains(FAULT_MESSAGE));
    assert_eq!(session.player(), &PlayerState::new());
    assert!(session.is_ended());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn out_of_range_index_ends_without_partial_mutation() {
    let (mut session, _backend) = session_over(
        vec![Ok(scene_payload(0))],
        SessionConfig::new().with_max_steps(5),
    );

    let scene = session.initialize().await;
    let fault = session.apply_choice(7, scene).await;

    assert!(fault.is_terminal());
    assert!(fault.story.contains(FAULT_MESSAGE));
    assert_eq!(session.player(), &PlayerState::new());
}

#[tokio::test]
async fn persistent_malformed_output_degrades_to_fallback() {
    // Empty script: every call answers with non-JSON.
    let (mut session, backend) = session_over(vec![], SessionConfig::new());

    let scene = session.initialize().await;

    assert_eq!(backend.call_count(), 4);
    assert!(scene.is_terminal());
    assert!(scene.story.contains(GARBLED_MESSAGE));
    assert!(scene.story.contains("Final Stats"));
    assert!(session.is_ended());
}

#[tokio::test]
async fn transport_error_fails_fast_in_fiction() {
    let (mut session, backend) = session_over(
        vec![Err(groq::Error::Network("dns failure".to_string()))],
        SessionConfig::new(),
    );

    let scene = session.initialize().await;

    assert_eq!(backend.call_count(), 1);
    assert!(scene.is_terminal());
    assert!(scene.story.contains(CONNECTION_LOST_MESSAGE));
    assert!(session.is_ended());
}

#[tokio::test]
async fn late_submission_never_mutates_state() {
    let (mut session, backend) = session_over(
        vec![Ok(scene_payload(0))],
        SessionConfig::new()
            .with_max_steps(1)
            .with_ending(EndingMode::LocalFallback),
    );

    let scene = session.initialize().await;
    let kept_copy = scene.clone();
    session.apply_choice(1, scene).await;

    let after_end = session.player().clone();
    let calls = backend.call_count();

    // A duplicate submission with its own copy of the old scene.
    let epilogue = session.apply_choice(1, kept_copy).await;

    assert!(epilogue.is_terminal());
    assert!(epilogue.story.contains(EPILOGUE_MESSAGE));
    assert_eq!(session.player(), &after_end);
    assert_eq!(backend.call_count(), calls);
}

#[tokio::test]
async fn choice_application_is_deterministic() {
    // Two sessions fed identical scripts and identical choices land in
    // identical states; duplicate-submission protection itself lives at
    // the presentation layer, not here.
    let config = || {
        SessionConfig::new()
            .with_max_steps(4)
            .with_ending(EndingMode::LocalFallback)
    };
    let script = || -> Vec<Result<String, groq::Error>> {
        (0..2).map(|i| Ok(scene_payload(i))).collect()
    };

    let (mut first, _) = session_over(script(), config());
    let (mut second, _) = session_over(script(), config());

    let scene_a = first.initialize().await;
    let scene_b = second.initialize().await;
    assert_eq!(scene_a, scene_b);

    let next_a = first.apply_choice(1, scene_a.clone()).await;
    let next_b = second.apply_choice(1, scene_b.clone()).await;

    assert_eq!(next_a, next_b);
    assert_eq!(first.player(), second.player());
}

#[tokio::test]
async fn restart_resets_player_and_history() {
    let (mut session, _backend) = session_over(
        vec![Ok(scene_payload(0)), Ok(scene_payload(1))],
        SessionConfig::new()
            .with_max_steps(1)
            .with_ending(EndingMode::LocalFallback),
    );

    let scene = session.initialize().await;
    session.apply_choice(1, scene).await;
    assert!(session.is_ended());

    session.restart();
    assert_eq!(session.phase(), Phase::Unstarted);
    assert_eq!(session.player(), &PlayerState::new());
    assert!(session.history().is_empty());

    let fresh = session.initialize().await;
    assert!(!fresh.is_terminal());
    assert_eq!(session.player().step, 0);
}
