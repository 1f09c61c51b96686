use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::errors::CoreError;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Anything that turns a prompt into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub max_retries: usize,
    pub retry_delay_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, config: GenerationConfig) -> Self {
        Self {
            client,
            api_key,
            config,
        }
    }

    async fn generate_once(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{GEMINI_ENDPOINT}/{}:generateContent", self.config.model);
        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature,
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CoreError::GeminiApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed = serde_json::from_str::<GenerateContentResponse>(&body)
            .context("failed to parse Gemini generateContent response")?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyModelResponse.into());
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let max_retries = self.config.max_retries.max(1);

        let mut attempt = 0;
        loop {
            match self.generate_once(prompt).await {
                Ok(text) => {
                    debug!(
                        model = %self.config.model,
                        attempt,
                        chars = text.len(),
                        "Gemini response received"
                    );
                    return Ok(text);
                }
                Err(err) => {
                    let is_last_attempt = attempt + 1 >= max_retries;
                    if !is_retryable_error(&err) || is_last_attempt {
                        return Err(err);
                    }

                    let backoff_seconds =
                        self.config.retry_delay_seconds * 2_f64.powf(attempt as f64);
                    warn!(
                        attempt,
                        backoff_seconds, "Gemini request failed, retrying: {err}"
                    );
                    tokio::time::sleep(Duration::from_secs_f64(backoff_seconds.max(0.1))).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn is_retryable_error(error: &anyhow::Error) -> bool {
    if let Some(core_error) = error.downcast_ref::<CoreError>() {
        return core_error.is_retryable();
    }

    if let Some(reqwest_error) = error.downcast_ref::<reqwest::Error>() {
        if reqwest_error.is_timeout() || reqwest_error.is_connect() {
            return true;
        }

        if let Some(status) = reqwest_error.status() {
            let code = status.as_u16();
            return code == 429 || code >= 500;
        }
    }

    false
}
