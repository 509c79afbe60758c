//! One request/response cycle per user submission.
//!
//! [`ExchangeController`] owns the transcript and the busy gate. A front end
//! either awaits [`ExchangeController::submit`] directly, or drives the two
//! halves itself: [`begin`](ExchangeController::begin) before spawning the
//! request and [`complete`](ExchangeController::complete) once it resolves.

use std::sync::Arc;

use chrono::Local;

use crate::ai::{GenerateResponse, TextGenerator};
use crate::error::ClientError;
use crate::state::{Conversation, MessageEntry};

pub const NO_RESPONSE_TEXT: &str = "Sorry, I couldn't get a response.";
pub const ERROR_TEXT: &str = "Error, please try again.";

/// Source of the time-of-day string stamped on bot entries
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> String;
}

/// Wall clock in the local timezone, e.g. `3:07:09 PM`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_of_day(&self) -> String {
        Local::now().format("%-I:%M:%S %p").to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeState {
    pub pending_input: String,
    pub busy: bool,
}

pub struct ExchangeController<G: TextGenerator> {
    conversation: Conversation,
    state: ExchangeState,
    generator: Arc<G>,
    clock: Box<dyn Clock>,
}

impl<G: TextGenerator> ExchangeController<G> {
    pub fn new(generator: G) -> Self {
        Self::with_clock(generator, LocalClock)
    }

    pub fn with_clock(generator: G, clock: impl Clock + 'static) -> Self {
        Self {
            conversation: Conversation::new(),
            state: ExchangeState::default(),
            generator: Arc::new(generator),
            clock: Box::new(clock),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn pending_input(&self) -> &str {
        &self.state.pending_input
    }

    pub fn pending_input_mut(&mut self) -> &mut String {
        &mut self.state.pending_input
    }

    /// Shared handle for running a request off the UI task
    pub fn generator(&self) -> Arc<G> {
        Arc::clone(&self.generator)
    }

    /// Swap in a new generator for later exchanges; one already in flight
    /// keeps the handle it was started with.
    pub fn replace_generator(&mut self, generator: G) {
        self.generator = Arc::new(generator);
    }

    /// Accept a submission: record the user entry, clear the input and go busy.
    ///
    /// Returns the prompt to send, or `None` if `text` is blank or an exchange
    /// is already running (nothing changes in that case).
    pub fn begin(&mut self, text: &str) -> Option<String> {
        if self.state.busy {
            tracing::trace!("submission ignored while busy");
            return None;
        }
        if text.trim().is_empty() {
            tracing::trace!("blank submission ignored");
            return None;
        }

        self.conversation.append(MessageEntry::user(text));
        self.state.pending_input.clear();
        self.state.busy = true;

        tracing::debug!(entries = self.conversation.len(), "exchange started");
        Some(text.to_string())
    }

    /// Record the outcome of the request started by [`begin`](Self::begin).
    ///
    /// Always appends exactly one bot entry and clears the busy flag. Calling
    /// this while idle does nothing.
    pub fn complete(&mut self, result: Result<GenerateResponse, ClientError>) {
        if !self.state.busy {
            tracing::warn!("exchange completion without a pending request");
            return;
        }

        let reply = match result {
            Ok(response) => match response.content {
                Some(text) => text,
                None => NO_RESPONSE_TEXT.to_string(),
            },
            Err(err) => {
                tracing::error!(error = %err, "Error during API call");
                ERROR_TEXT.to_string()
            }
        };

        self.conversation
            .append(MessageEntry::bot(reply, self.clock.time_of_day()));
        self.state.busy = false;

        tracing::debug!(entries = self.conversation.len(), "exchange finished");
    }

    pub async fn submit(&mut self, text: &str) {
        let Some(prompt) = self.begin(text) else {
            return;
        };

        let generator = self.generator();
        let result = generator.generate(&prompt).await;
        self.complete(result);
    }
}
