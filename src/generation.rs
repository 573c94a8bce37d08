use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::data_models::{
    ErrorKind, GenerationRequest, GenerationResponse, GenerationResult, Prompt,
};

/// Answer substituted when the backend replies without any text.
pub const NO_OUTPUT_ANSWER: &str = "[No output]";

/// Longest slice of an error body carried into a `BackendError` detail.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for an Ollama-style `/api/generate` endpoint.
///
/// Makes exactly one attempt per call; every outcome is folded into a
/// [`GenerationResult`] so callers never see a raw transport error.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl GenerationClient {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<GenerationClient> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build generation HTTP client")?;
        Ok(GenerationClient {
            client,
            endpoint: format!("{}/api/generate", host.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<GenerationClient> {
        Self::new(
            &config.generation_host,
            &config.generation_model,
            config.generation_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.text.len()))]
    pub async fn generate(&self, prompt: &Prompt) -> GenerationResult {
        let request = GenerationRequest::new(&self.model, prompt);

        let res = match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(res) => res,
            Err(e) => return transport_failure(e),
        };

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%status, "could not read error body: {:#}", e);
                    String::new()
                }
            };
            return GenerationResult::failure(
                ErrorKind::BackendError,
                format!("status {}: {}", status, excerpt(&body)),
            );
        }

        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => return transport_failure(e),
        };
        debug!(bytes = body.len(), "generation backend replied");

        match serde_json::from_str::<GenerationResponse>(&body) {
            Ok(parsed) => match parsed.response {
                Some(answer) if !answer.trim().is_empty() => GenerationResult::Success { answer },
                _ => GenerationResult::Success {
                    answer: NO_OUTPUT_ANSWER.to_string(),
                },
            },
            Err(e) => GenerationResult::failure(
                ErrorKind::MalformedResponse,
                format!("{e} (body: {})", excerpt(&body)),
            ),
        }
    }
}

fn transport_failure(e: reqwest::Error) -> GenerationResult {
    let kind = if e.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Unreachable
    };
    GenerationResult::failure(kind, format!("{:#}", anyhow::Error::new(e)))
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() > BODY_EXCERPT_CHARS {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}...")
    } else {
        body.to_string()
    }
}
