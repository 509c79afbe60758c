use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use gemini_chat_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

/// Log to a file: the terminal itself is owned by the UI
fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?
        .join("gemini-chat");
    fs::create_dir_all(&log_dir)?;
    let log_file = File::create(log_dir.join("gemini-chat.log"))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info,gemini_chat_core=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::new().merge_env(|name| std::env::var(name).ok())
    });
    tracing::info!(endpoint = config.endpoint(), has_key = config.has_api_key(), "starting gemini-chat");

    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(tui::TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    tracing::info!(entries = app.exchange.conversation().len(), "session ended");
    Ok(())
}
