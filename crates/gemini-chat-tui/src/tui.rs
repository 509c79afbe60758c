use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// How often the loop wakes up to look for a finished request
pub const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Map a raw terminal event to what the chat loop cares about.
/// Key releases and repeats, focus changes and pastes are dropped.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// Merges terminal input and a periodic tick into one channel
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input_tx = tx.clone();
        let input = tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(next) = reader.next().await {
                match next {
                    Ok(event) => {
                        if let Some(app_event) = translate(event) {
                            if input_tx.send(app_event).is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "terminal event stream error"),
                }
            }
            tracing::debug!("terminal event stream closed");
        });

        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            tasks: vec![input, ticker],
        }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    // Mouse capture for wheel scrolling of the transcript
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Put the terminal back before the panic message is printed
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}
