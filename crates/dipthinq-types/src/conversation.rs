use serde::{Deserialize, Serialize};

use crate::id::{deserialize_id, new_id};
use crate::message::Message;

/// Title every conversation starts with until the first message arrives.
pub const PLACEHOLDER_TITLE: &str = "New Conversation";

/// Characters of the latest message kept as the sidebar preview.
pub const PREVIEW_CHARS: usize = 100;

/// A persisted conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            last_message: None,
        }
    }

    /// A conversation with no messages may be reused for a new session.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_placeholder_title(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }

    /// Append a message and refresh the cached preview.
    pub fn push(&mut self, message: Message) {
        self.last_message = Some(truncate_chars(&message.content, PREVIEW_CHARS));
        self.messages.push(message);
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            last_message: self.last_message.clone(),
            message_count: self.messages.len(),
            created_at: self.created_at.clone(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a conversation for the sidebar listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub last_message: Option<String>,
    pub message_count: usize,
    pub created_at: String,
}

/// First `max` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
