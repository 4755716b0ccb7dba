//! Wire shapes of `POST /api/chat`, shared by the relay and its clients.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::message::ChatTurn;

/// Body of a relay request.
///
/// Every field is optional on the wire so that missing values surface as a
/// validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<ChatTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// `"history": null` reads as no history.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChatTurn>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ChatTurn>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RelayRequest {
    pub fn new(message: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            agent_id: Some(agent_id.into()),
            history: Vec::new(),
            model_id: None,
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

/// Successful relay response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReply {
    /// Assistant text; `null` when the provider returned a message without content
    pub response: Option<String>,
    /// Model that actually served the request, `"unknown"` if not reported
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_model: Option<String>,
}

/// Error body returned by the relay for every failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            message: None,
            model: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Most specific human-readable text: `message` when present, else `error`.
    pub fn display_text(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => &self.error,
        }
    }
}
