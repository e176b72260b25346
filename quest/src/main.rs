//! Fantasy Adventure Quest TUI.
//!
//! A terminal client for an LLM-narrated branching story: pick among up
//! to three choices per turn, watch your health, gold, and inventory
//! shift, and see how far the tale carries you.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for
//! scripted runs:
//!
//! ```bash
//! cargo run -p quest -- --headless --steps 10 --ending local
//! ```

mod app;
mod events;
mod headless;
mod ui;
mod worker;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quest_core::{EndingMode, GameSession, SessionConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Check for API key
    if std::env::var("GROQ_API_KEY").is_err() {
        eprintln!("Error: GROQ_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export GROQ_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = parse_config_from_args(&args);

    if args.iter().any(|a| a == "--headless") {
        // Logs go to stderr here; the TUI owns the terminal, so no
        // subscriber is installed in that mode.
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "quest=info,quest_core=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();

        let session = GameSession::from_env(config)?;
        headless::run_headless(session).await;
        return Ok(());
    }

    let session = GameSession::from_env(config)?;
    let max_steps = session.max_steps();

    // The session lives on its own task from here on
    let (request_tx, response_rx) = worker::spawn(session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(request_tx, response_rx, max_steps);
    app.start();

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Pick up any scenes the worker finished since the last frame
        app.drain_responses();

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with a timeout so the spinner keeps moving
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }
    }
}

fn parse_config_from_args(args: &[String]) -> SessionConfig {
    let mut config = SessionConfig::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--steps" => {
                if let Some(steps) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config = config.with_max_steps(steps);
                    i += 1;
                }
            }
            "--ending" => {
                if let Some(mode) = args.get(i + 1) {
                    config = config.with_ending(match mode.as_str() {
                        "local" => EndingMode::LocalFallback,
                        _ => EndingMode::ModelNarrated,
                    });
                    i += 1;
                }
            }
            "--model" => {
                if let Some(model) = args.get(i + 1) {
                    config = config.with_model(model);
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Fantasy Adventure Quest - an LLM-narrated branching story");
    println!();
    println!("USAGE:");
    println!("  quest [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help         Show this help message");
    println!("  --headless         Run in headless mode (text-only, no TUI)");
    println!("  --steps <N>        Number of steps before the story ends (default: 5)");
    println!("  --ending <MODE>    How the story ends: 'model' (narrated) or 'local'");
    println!("  --model <NAME>     Override the Groq model (default: llama-3.1-8b-instant)");
    println!();
    println!("ENVIRONMENT:");
    println!("  GROQ_API_KEY       Required. Read from the environment or a .env file.");
    println!();
    println!("EXAMPLES:");
    println!("  quest                                  # Interactive TUI, 5 steps");
    println!("  quest --steps 10 --ending local        # Longer run, local ending");
    println!("  quest --headless                       # Line-oriented mode");
}
