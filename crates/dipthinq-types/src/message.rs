use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{deserialize_id, new_id};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message owned by a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    /// Set when the assistant entry reports a failed exchange
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, error: bool) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            error,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, false)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, false)
    }

    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, true)
    }

    /// Role/content pair for use as relay history.
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role.as_str().to_string(),
            content: Value::String(self.content.clone()),
        }
    }
}

/// A role/content pair as carried in relay history and upstream requests.
///
/// History is forwarded to the provider verbatim, so neither field is
/// checked: the role is any string and the content any JSON value
/// (usually a string, sometimes `null` or a list of parts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: Value::String(content.into()),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}
