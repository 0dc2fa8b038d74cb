//! Model API client.
//!
//! Speaks the chat-completions protocol. The trait is the seam the
//! orchestrator mocks in tests; [`HttpModelClient`] is the real thing.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::AnalysisError;

/// Request timeout for model calls.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// How much of an error body to keep in messages.
const ERROR_BODY_SNIPPET: usize = 200;

// ============================================================================
// Trait and Request
// ============================================================================

/// Parameters for one model call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Base URL of the model API, without the endpoint path.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Bearer key for this call.
    pub api_key: String,
    /// System prompt.
    pub system: String,
    /// User prompt.
    pub user: String,
}

/// Chat-completion seam between the orchestrator and the network.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends one completion request and returns the assistant text.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response carries
    /// no usable content.
    async fn complete(&self, request: &ModelRequest) -> Result<String, AnalysisError>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP implementation of [`ModelClient`].
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    client: Client,
}

impl HttpModelClient {
    /// Creates a client with the standard request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl Default for HttpModelClient {
    /// Creates a default model client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should only happen
    /// if the system's TLS configuration is broken.
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            panic!(
                "Failed to create default model client: {}. \
                This usually indicates a broken TLS/SSL configuration.",
                e
            )
        })
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ModelRequest) -> Result<String, AnalysisError> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: Some(0.2),
            max_tokens: Some(1024),
        };

        let url = format!("{}/chat/completions", request.base_url.trim_end_matches('/'));
        debug!(url = %url, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            warn!(retry_after = ?retry_after, "Model API rate limited");
            return Err(AnalysisError::RateLimited { retry_after });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, "Model API rejected credential");
            return Err(AnalysisError::AuthenticationFailed(format!("HTTP {status}")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(ERROR_BODY_SNIPPET).collect();
            return Err(AnalysisError::InvalidResponse(format!(
                "HTTP {status}: {snippet}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::InvalidResponse("Model returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_content_extraction() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hello"}}
            ],
            "usage": {"total_tokens": 5}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hello");
    }

    #[test]
    fn test_request_serializes_messages_in_order() {
        let body = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "be terse".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "document".to_string(),
                },
            ],
            temperature: Some(0.2),
            max_tokens: Some(1024),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["model"], "gpt-4o-mini");
    }
}
