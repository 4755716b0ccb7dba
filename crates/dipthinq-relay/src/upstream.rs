//! OpenRouter client.
//!
//! Speaks the OpenAI chat completions protocol. One POST per call, no retry
//! and no streaming; the status and raw body are handed back so the relay
//! can decide how to interpret them.

use reqwest::Client;
use serde::Serialize;

use dipthinq_types::{ChatError, Result, config::GenerationParams, message::ChatTurn};

use crate::config::RelayConfig;

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    #[serde(flatten)]
    pub params: GenerationParams,
}

/// Raw upstream answer.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct OpenRouterClient {
    http: Client,
    url: String,
    referer: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.completions_url(),
            referer: config.public_base_url.clone(),
            app_title: config.app_title.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn chat_completions(
        &self,
        api_key: &str,
        body: &CompletionRequest<'_>,
    ) -> std::result::Result<UpstreamResponse, reqwest::Error> {
        let response = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}
