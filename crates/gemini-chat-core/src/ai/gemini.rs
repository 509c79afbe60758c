use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{GenerateResponse, TextGenerator};
use crate::config::Config;
use crate::error::ClientError;

pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";

/// Fixed sampling parameters sent with every prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub const DEFAULT: GenerationParams = GenerationParams {
        temperature: 0.7,
        max_output_tokens: 150,
    };
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

/// Pull the reply text out of a success body.
///
/// Anything other than a non-empty string under `content` (including a body
/// that is not JSON at all) yields `None`.
fn extract_content(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    match payload.get("content") {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn query(&self, prompt: &str) -> Result<GenerateResponse, ClientError> {
        let api_key = self.api_key.as_deref().ok_or(ClientError::MissingApiKey)?;
        let params = GenerationParams::DEFAULT;

        let request = GeminiRequest {
            prompt,
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        };

        tracing::debug!(endpoint = %self.endpoint, prompt_chars = prompt.chars().count(), "sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let body = response.text().await?;
        let content = extract_content(&body);
        if content.is_none() {
            tracing::warn!(%status, "generation response had no content field");
        }

        Ok(GenerateResponse { content })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, ClientError> {
        self.query(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then as much body as Content-Length announces
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}/v1beta/models/test:generateContent", addr), handle)
    }

    #[test]
    fn test_request_body_uses_fixed_params() {
        let params = GenerationParams::DEFAULT;
        let request = GeminiRequest {
            prompt: "Hi",
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "Hi");
        assert_eq!(json["maxOutputTokens"], 150);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_content() {
        assert_eq!(extract_content(r#"{"content":"Hello!"}"#), Some("Hello!".to_string()));
        assert_eq!(extract_content(r#"{"other":"x"}"#), None);
        assert_eq!(extract_content(r#"{"content":""}"#), None);
        assert_eq!(extract_content(r#"{"content":{"parts":[]}}"#), None);
        assert_eq!(extract_content("not json"), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = GeminiClient::new(DEFAULT_ENDPOINT, Some("secret-key"));
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_from_config_ignores_empty_key() {
        let config = Config {
            api_key: Some(String::new()),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert!(!client.has_api_key());
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", None);
        let err = client.query("Hi").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_query_success_posts_prompt_with_key() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"content":"Hello!"}"#).await;
        let client = GeminiClient::new(&url, Some("test-key"));

        let response = client.query("Hi").await.unwrap();
        assert_eq!(response.content.as_deref(), Some("Hello!"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1beta/models/test:generateContent?key=test-key"));
        assert!(raw.contains(r#""prompt":"Hi""#));
        assert!(raw.contains(r#""maxOutputTokens":150"#));
    }

    #[tokio::test]
    async fn test_query_missing_content_is_not_an_error() {
        let (url, _server) = serve_once("HTTP/1.1 200 OK", r#"{"candidates":[]}"#).await;
        let client = GeminiClient::new(&url, Some("test-key"));

        let response = client.query("Hi").await.unwrap();
        assert_eq!(response.content, None);
    }

    #[tokio::test]
    async fn test_query_error_status() {
        let (url, _server) = serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = GeminiClient::new(&url, Some("test-key"));

        match client.query("Hi").await {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("boom"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(&format!("http://{}/generate", addr), Some("test-key"));
        let err = client.query("Hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
    }

    #[tokio::test]
    async fn test_transport_error_message_hides_api_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(&format!("http://{}/generate", addr), Some("SECRET-KEY-123"));
        let err = client.query("Hi").await.unwrap_err();

        assert!(!format!("{}", err).contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }
}
