//! Relay client: posts chat turns to the relay endpoint with browser `fetch()`
//! (through gloo-net).

use async_trait::async_trait;
use gloo_net::http::Request;

use dipthinq_core::ports::RelayPort;
use dipthinq_types::{
    ChatError, Result,
    relay::{ErrorBody, RelayReply, RelayRequest},
};

/// Shown when a failed relay response carries no readable error body.
pub const GENERIC_RELAY_FAILURE: &str = "Failed to get response from server";

pub struct RelayClient {
    url: String,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl RelayPort for RelayClient {
    async fn send(&self, req: RelayRequest) -> Result<RelayReply> {
        let response = Request::post(&self.url)
            .header("Content-Type", "application/json")
            .json(&req)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(relay_failure(status, &text));
        }

        parse_reply(&text)
    }
}

/// Decode a successful relay body.
pub fn parse_reply(text: &str) -> Result<RelayReply> {
    serde_json::from_str(text).map_err(|e| ChatError::MalformedUpstreamResponse(e.to_string()))
}

/// Turn a non-success relay response into an error whose message is the
/// body's `message`, else its `error`, else a generic failure text.
pub fn relay_failure(status: u16, body: &str) -> ChatError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.display_text().is_empty() => parsed.display_text().to_string(),
        Ok(_) => GENERIC_RELAY_FAILURE.to_string(),
        Err(e) => {
            log::warn!("Relay returned HTTP {} with unreadable body: {}", status, e);
            GENERIC_RELAY_FAILURE.to_string()
        }
    };
    ChatError::Relay { status, message }
}
