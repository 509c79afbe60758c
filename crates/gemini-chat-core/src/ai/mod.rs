pub mod gemini;

pub use gemini::{GeminiClient, GenerationParams, DEFAULT_ENDPOINT};

use async_trait::async_trait;

use crate::error::ClientError;

/// Decoded success payload of a generation request.
///
/// `content` is `None` whenever the service answered 2xx without a usable
/// reply string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub content: Option<String>,
}

impl GenerateResponse {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// A remote text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, ClientError>;
}
