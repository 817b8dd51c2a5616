//! Reqwest-based LLM transport implementing OpenAI-compatible Chat Completions
//! (non-streaming), plus the error taxonomy used by the model gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Closed classification of remote-call failures. Quota errors drive the
/// model cascade; everything else is terminal for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Quota,
    Other,
}

/// Phrases that mark a failure as quota/rate-limit when no structured HTTP
/// status is available. Matched case-insensitively.
const QUOTA_PHRASES: &[&str] = &[
    "resource_exhausted",
    "quota",
    "rate limit",
    "rate_limit",
    "429",
    "too many requests",
];

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn quota(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Quota, message: message.into() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Other, message: message.into() }
    }

    /// Classify by message content, the fallback when the transport exposed
    /// no structured status code.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if QUOTA_PHRASES.iter().any(|p| lower.contains(p)) {
            Self::quota(message)
        } else {
            Self::other(message)
        }
    }

    pub fn is_quota(&self) -> bool {
        self.kind == ErrorKind::Quota
    }
}

/// Seam between the gateway and the remote endpoint; stubbed in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

#[derive(Debug)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let timeout = cfg.get_u64("REQUEST_TIMEOUT").unwrap_or(60);
        let base_url = cfg
            .get("API_BASE_URL")
            .unwrap_or_else(|| "https://api.groq.com/openai/v1".into())
            .trim_end_matches('/')
            .to_string();
        let api_key = cfg.api_key();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self { http, base_url, api_key })
    }
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let hv = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ChatError::other(format!("invalid API key header: {e}")))?;
            headers.insert(AUTHORIZATION, hv);
        }

        let body = serde_json::json!({
            "model": model,
            "temperature": 0,
            "messages": messages,
        });

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::classify(format!("failed to send chat request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            // 429 is the structured rate-limit signal; other statuses fall
            // back to message inspection.
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(ChatError::quota(format!("HTTP 429: {detail}")));
            }
            return Err(ChatError::classify(format!("LLM error {status}: {detail}")));
        }

        let completion: Completion = resp
            .json()
            .await
            .map_err(|e| ChatError::other(format!("malformed completion response: {e}")))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::other("completion contained no choices"))
    }
}

// Minimal response structures for OpenAI-like completions
#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}
