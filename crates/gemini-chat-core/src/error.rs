use reqwest::StatusCode;
use thiserror::Error;

/// Ways an outbound generation request can fail.
///
/// Every variant ends up as the same user-facing error entry; the variants
/// only exist so the diagnostic log says what actually happened.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error with the request URL stripped, since the URL carries
    /// the API key
    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Request task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(err.without_url())
    }
}
