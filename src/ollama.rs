//! Ollama completion client with timeout, retries, and typed errors.
//!
//! One `generate` call issues `POST /api/generate` with a hard wall-clock
//! timeout and classifies failures into [`ServiceError`] variants. Every
//! failure kind is treated as retryable at the transport layer; budgets
//! exhaust quickly for the permanent ones and the last error surfaces to
//! the orchestration layer.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::Settings;
use crate::normalize::word_count;
use crate::retry::with_retry;

/// Responses shorter than this many words are treated as garbled output.
pub const MIN_RESPONSE_WORDS: usize = 10;

/// Errors from the completion service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("generation exceeded {0:?}")]
    Timeout(Duration),

    #[error("cannot reach Ollama server at {0}: is it running?")]
    Unavailable(String),

    #[error("model not found in Ollama: {0} (ensure it is pulled)")]
    ModelNotFound(String),

    #[error("memory exhausted during generation: {0}")]
    ResourceExhausted(String),

    #[error("malformed or empty response from model: {0}")]
    Malformed(String),

    #[error("{0}")]
    Internal(String),
}

/// Per-request options beyond the standard knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    /// Ask the server to constrain decoding to JSON.
    pub format_json: bool,
}

/// One text-generation request against a completion service. Implemented
/// by [`OllamaClient`] in production and by scripted mocks in tests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
        options: &GenerationOptions,
    ) -> Result<String, ServiceError>;
}

/// Approximate token count: 1 word is roughly 1.33 tokens.
pub fn approx_tokens(text: &str) -> u32 {
    (word_count(text) as f64 * 1.33).ceil() as u32
}

/// Thin reqwest client over the Ollama HTTP API.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    attempts: u32,
    backoff_base: Duration,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.ollama_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            timeout: settings.request_timeout,
            attempts: settings.transport_attempts,
            backoff_base: settings.backoff_base,
            http: reqwest::Client::builder()
                .timeout(settings.request_timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
        options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        let start = Instant::now();

        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
            "system": system_prompt,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        });
        if options.format_json {
            body["format"] = json!("json");
        }

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &text, &self.model));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let text = value["response"].as_str().unwrap_or("").trim().to_string();

        let words = word_count(&text);
        if words < MIN_RESPONSE_WORDS {
            return Err(ServiceError::Malformed(format!(
                "response too short ({} words)",
                words
            )));
        }

        let elapsed = start.elapsed().as_secs_f64().max(1e-6);
        let tokens = approx_tokens(&text);
        info!(
            "ollama call ok | model={} | prompt_words={} | response_words={} | tokens~{} | time={:.2}s | tps~{:.1}",
            self.model,
            word_count(prompt),
            words,
            tokens,
            elapsed,
            tokens as f64 / elapsed,
        );
        Ok(text)
    }

    fn classify_transport(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else if e.is_connect() {
            ServiceError::Unavailable(self.base_url.clone())
        } else {
            ServiceError::Internal(e.to_string())
        }
    }
}

/// Map an HTTP error status and body to a service error.
fn classify_status(status: u16, body: &str, model: &str) -> ServiceError {
    let lower = body.to_ascii_lowercase();
    if status == 404 || lower.contains("model not found") || lower.contains("no such model") {
        return ServiceError::ModelNotFound(model.to_string());
    }
    if lower.contains("out of memory") || lower.contains("vram") {
        return ServiceError::ResourceExhausted(body.trim().to_string());
    }
    ServiceError::Internal(format!("HTTP {}: {}", status, body.trim()))
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: f32,
        max_tokens: u32,
        options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        with_retry("ollama generate", self.attempts, self.backoff_base, || {
            self.attempt(prompt, system_prompt, temperature, max_tokens, options)
        })
        .await
    }
}
