pub mod ai;
pub mod config;
pub mod error;
pub mod exchange;
pub mod state;
pub mod theme;

// Re-export main types for convenience
pub use ai::{GeminiClient, GenerateResponse, GenerationParams, TextGenerator};
pub use config::Config;
pub use error::ClientError;
pub use exchange::{Clock, ExchangeController, ExchangeState, LocalClock, ERROR_TEXT, NO_RESPONSE_TEXT};
pub use state::{Conversation, MessageEntry};
pub use theme::Theme;
