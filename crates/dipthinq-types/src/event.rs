use serde::{Deserialize, Serialize};

/// Events emitted by the conversation store and chat runtime.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// Persisted conversations were loaded at startup
    Loaded { count: usize },

    ConversationCreated { id: String },

    ConversationSelected { id: String },

    /// A message was appended to a conversation
    MessageAppended {
        conversation_id: String,
        message_id: String,
        error: bool,
    },

    /// A generated title replaced the temporary one
    TitleUpdated { conversation_id: String, title: String },

    ConversationDeleted { id: String },

    ConversationsCleared,

    ModelSelected { model: String },

    AgentSelected { agent: String },

    /// A relay exchange started for a conversation
    ExchangeStarted { conversation_id: String },

    /// The relay exchange finished (successfully or with an error message)
    ExchangeFinished { conversation_id: String, success: bool },

    /// An error occurred outside of an exchange
    Error { message: String },
}

impl StoreEvent {
    /// Conversation whose listed state or transcript this event changes.
    ///
    /// Exchange lifecycle and errors are not tied to the transcript and
    /// return `None`, like the global events.
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            StoreEvent::ConversationCreated { id }
            | StoreEvent::ConversationSelected { id }
            | StoreEvent::ConversationDeleted { id } => Some(id),
            StoreEvent::MessageAppended { conversation_id, .. }
            | StoreEvent::TitleUpdated { conversation_id, .. } => Some(conversation_id),
            _ => None,
        }
    }
}
