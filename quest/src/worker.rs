//! Background worker that owns the game session.
//!
//! The session, and with it the player state and conversation history,
//! lives on a single tokio task; the UI talks to it over bounded mpsc
//! channels. Only this task ever touches game state, which is why the
//! UI's reject-while-generating rule needs no lock behind it.

use quest_core::{GameSession, PlayerState, Scene};
use tokio::sync::mpsc;

/// Requests the UI can send to the worker.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Start the story from scratch.
    Start,
    /// Apply a choice; carries an owned copy of the scene it was made from.
    Choose { index: usize, scene: Scene },
    /// Reset the session and start a fresh run.
    Restart,
}

/// Responses the worker sends back to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    /// A new scene plus the player snapshot to render alongside it.
    Scene { scene: Scene, player: PlayerState },
}

/// Spawn the worker task and return the UI's channel endpoints.
///
/// The request channel holds a single slot: with the UI refusing to
/// submit while a generation is outstanding, one slot is all it takes.
pub fn spawn(
    session: GameSession,
) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, request_rx) = mpsc::channel(1);
    let (response_tx, response_rx) = mpsc::channel(4);
    tokio::spawn(run(session, request_rx, response_tx));
    (request_tx, response_rx)
}

async fn run(
    mut session: GameSession,
    mut requests: mpsc::Receiver<WorkerRequest>,
    responses: mpsc::Sender<WorkerResponse>,
) {
    while let Some(request) = requests.recv().await {
        let scene = match request {
            WorkerRequest::Start => session.initialize().await,
            WorkerRequest::Choose { index, scene } => session.apply_choice(index, scene).await,
            WorkerRequest::Restart => {
                session.restart();
                session.initialize().await
            }
        };

        let player = session.player().clone();
        if responses
            .send(WorkerResponse::Scene { scene, player })
            .await
            .is_err()
        {
            // UI is gone; nothing left to narrate for.
            break;
        }
    }
}
