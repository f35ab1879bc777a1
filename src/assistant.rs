//! Developer assistant
//!
//! Forwards free-text developer questions to a generative-language API and
//! returns the answer text. The assistant is independent of the wallet
//! simulation; it only shares the error type and configuration.
//!
//! The `AssistantClient` trait allows:
//! - The HTTP client below (`GeminiClient`)
//! - In-process fakes for tests or offline demos

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use url::Url;

use crate::config::AssistantConfig;
use crate::{Error, Result};

/// Persona given to the model on every request
pub const SYSTEM_INSTRUCTION: &str = "You are an expert on the Midnight network, ZK-proofs, and \
privacy-preserving smart contracts. Provide concise, technical, and accurate developer advice.";

/// Returned when the model produced no text
pub const NO_RESPONSE: &str = "No response generated.";

const PROMPT_PREFIX: &str = "Act as a senior Midnight Blockchain Engineer. Explain the following \
or answer the developer question clearly: ";

/// Trait for assistant implementations
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Ask a question and return the answer text
    async fn ask(&self, question: &str) -> Result<String>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}

/// Wrap a developer question in the engineer persona prompt
pub fn build_prompt(question: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, question.trim())
}

/// Client for the `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    config: AssistantConfig,
}

impl GeminiClient {
    pub fn new(config: AssistantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// `{endpoint}/models/{model}:generateContent`
    fn request_url(&self) -> Result<Url> {
        let base = self.config.endpoint.as_str().trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.config.model)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid assistant URL: {}", e)))
    }

    fn request_body(question: &str) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(question) }]
            }]
        })
    }

    /// Concatenate the text parts of the first candidate
    fn extract_text(response: &Value) -> Result<String> {
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(Error::Assistant(message.to_string()));
        }

        let text: String = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            Ok(NO_RESPONSE.to_string())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl AssistantClient for GeminiClient {
    async fn ask(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(Error::InvalidArgument("question is empty".to_string()));
        }

        let url = self.request_url()?;
        let start = Instant::now();

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.config.api_key())
            .json(&Self::request_body(question))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            model = %self.config.model,
            status = status.as_u16(),
            latency_ms = latency_ms,
            "Assistant response received"
        );

        if !status.is_success() && body.get("error").is_none() {
            return Err(Error::Assistant(format!("HTTP {}", status)));
        }

        Self::extract_text(&body)
    }

    fn name(&self) -> &'static str {
        "GeminiClient"
    }
}
