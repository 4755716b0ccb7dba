use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The upstream provider answered with a non-success status.
    #[error("Upstream error: HTTP {status}: {message}")]
    Upstream {
        status: u16,
        /// Error body as returned by the provider: JSON when it parsed, text otherwise
        details: Value,
        message: String,
    },

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// The relay answered the client with a non-success status.
    #[error("Relay error ({status}): {message}")]
    Relay { status: u16, message: String },

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("A request is already in flight")]
    Busy,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Text shown in the transcript when an exchange fails.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Relay { message, .. } | ChatError::Upstream { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            ChatError::Network(_) => {
                "Sorry, there was an error processing your request. Please check your API configuration."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
