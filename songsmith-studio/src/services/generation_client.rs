//! Generative-language API client
//!
//! One POST per attempt to `{endpoint}/models/{model}:generateContent`.
//! Failed attempts are retried with exponential backoff
//! (`backoff_base * 2^attempt`). After the last attempt the
//! [`TextGenerator`] entry point returns a reply starting with
//! [`ERROR_MARKER`] instead of an error; callers check [`is_error_reply`]
//! before parsing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// Prefix of every failed generation reply
pub const ERROR_MARKER: &str = "Fehler:";

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";

const USER_AGENT: &str = concat!("Songsmith/", env!("CARGO_PKG_VERSION"));

/// API key shared between the client and the settings endpoint
///
/// Updating it through the settings API takes effect on the next call.
pub type SharedApiKey = Arc<RwLock<Option<String>>>;

/// Generation client errors
///
/// Display strings are shown to the user after [`ERROR_MARKER`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Kein API-Schlüssel konfiguriert.")]
    MissingApiKey,

    #[error("Netzwerkfehler: {0}")]
    Network(String),

    #[error("API-Fehler: {status} {reason}")]
    Api { status: u16, reason: String },

    #[error("Unerwartete Antwortstruktur von der API.")]
    UnexpectedResponse,
}

impl GenerationError {
    /// Retrying cannot fix a missing key
    fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::MissingApiKey)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub endpoint: String,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

/// Seam between the songwriter workflow and the network
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a prompt; never fails
    ///
    /// On failure the returned text starts with [`ERROR_MARKER`].
    async fn generate(&self, prompt: &str) -> String;
}

/// Generative-language API client
pub struct GenerationClient {
    http_client: reqwest::Client,
    api_key: SharedApiKey,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(api_key: SharedApiKey, config: GenerationConfig) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            config,
        })
    }

    /// Generate text, retrying failed attempts
    pub async fn try_generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.read().await.clone();
        let Some(api_key) = api_key else {
            warn!("Generation requested but no API key is configured");
            return Err(GenerationError::MissingApiKey);
        };

        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            debug!(attempt = attempt + 1, attempts, "Sending generation request");

            match self.send_once(&api_key, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt + 1 >= attempts || !e.is_retryable() => {
                    error!(attempts = attempt + 1, "Generation failed: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        "Generation attempt failed: {} - retrying in {:?}", e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            attempt += 1;
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn send_once(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|_| GenerationError::UnexpectedResponse)?;

        parsed.into_text().ok_or(GenerationError::UnexpectedResponse)
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => error_reply(&e.to_string()),
        }
    }
}

/// Build the user-displayable failure reply
pub fn error_reply(reason: &str) -> String {
    format!(
        "{} Konnte keine Antwort von der KI erhalten. Grund: {}",
        ERROR_MARKER, reason
    )
}

/// Whether a generation reply is a failure notice
pub fn is_error_reply(reply: &str) -> bool {
    reply.starts_with(ERROR_MARKER)
}
