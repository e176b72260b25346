//! Headless mode for the quest game.
//!
//! A line-oriented interface for running the game without a TUI: scenes
//! print to stdout, choices come from stdin one number per line. Useful
//! for scripted runs and agents.

use quest_core::{GameSession, Scene};
use std::io::{self, BufRead, Write};

/// Run the game in headless mode.
///
/// Protocol:
/// - `[SCENE]` blocks carry narrative, `[STATUS]` the player snapshot
/// - choice numbers (1-3) advance the story
/// - `restart` begins a fresh run, `quit` exits
pub async fn run_headless(mut session: GameSession) {
    println!("=== Fantasy Adventure Quest (headless) ===");
    println!("Enter a choice number (1-3), 'restart', or 'quit'.");
    println!();

    let mut scene = session.initialize().await;
    print_scene(&scene, &session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "restart" => {
                session.restart();
                scene = session.initialize().await;
                print_scene(&scene, &session);
            }
            _ => {
                if scene.is_terminal() {
                    println!("[END] The story is over. Type 'restart' or 'quit'.");
                    continue;
                }

                let index = match line.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= scene.choices.len() => n,
                    _ => {
                        println!("[ERROR] Enter a choice number (1-{}).", scene.choices.len());
                        continue;
                    }
                };

                print!("[GENERATING]");
                stdout.flush().ok();

                scene = session.apply_choice(index, scene.clone()).await;

                print!("\r            \r");
                stdout.flush().ok();
                print_scene(&scene, &session);
            }
        }
    }
}

fn print_scene(scene: &Scene, session: &GameSession) {
    println!("[SCENE]");
    for para in scene.story.split("\n\n") {
        println!("{para}");
    }
    println!();

    let player = session.player();
    let inventory = if player.inventory.is_empty() {
        "none".to_string()
    } else {
        player.inventory.join(", ")
    };
    println!(
        "[STATUS] Health: {}  Gold: {}  Step: {}/{}  Inventory: {}",
        player.health,
        player.gold,
        player.step,
        session.max_steps(),
        inventory
    );

    if scene.is_terminal() {
        println!("[END] The story is over. Type 'restart' or 'quit'.");
    } else {
        for (i, choice) in scene.choices.iter().enumerate() {
            println!("  {}. {choice}", i + 1);
        }
    }
    println!();
}
