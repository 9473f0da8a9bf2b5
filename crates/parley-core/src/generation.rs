//! Text generation for agent turns.
//!
//! [`DashScopeClient`] talks to the DashScope text-generation endpoint.
//! The driver only sees the [`TextGenerator`] trait, so tests can script
//! replies.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::GenerationConfig;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned an empty response")]
    EmptyBody,

    #[error("API returned a non-JSON response: {0}")]
    NotJson(String),

    #[error("response has no output.text")]
    MissingOutput,
}

/// Produces one reply for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_tokens: u32,
    temperature: f32,
}

/// DashScope HTTP client.
#[derive(Clone)]
pub struct DashScopeClient {
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl DashScopeClient {
    pub fn new(config: &GenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for DashScopeClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            model: &self.model,
            input: GenerationInput { prompt },
            parameters: GenerationParameters {
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Generation response received");

        parse_response(status, &body)
    }
}

/// Classify a raw API response and pull out the generated text.
pub fn parse_response(status: u16, body: &str) -> Result<String, GenerationError> {
    if status != 200 {
        return Err(GenerationError::Status { status, body: body.to_string() });
    }

    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyBody);
    }
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return Err(GenerationError::NotJson(preview(trimmed)));
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| GenerationError::NotJson(e.to_string()))?;

    value
        .get("output")
        .and_then(|output| output.get("text"))
        .and_then(|text| text.as_str())
        .map(str::to_string)
        .ok_or(GenerationError::MissingOutput)
}

fn preview(body: &str) -> String {
    body.chars().take(120).collect()
}
