//! Chat runtime: one user exchange at a time.
//!
//! An exchange is:
//! 1. Snapshot the conversation history (before the new message)
//! 2. Append the user message to the store
//! 3. Send message, agent, model and history to the relay
//! 4. Append the reply, or an error-flagged message on failure

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use dipthinq_types::{ChatError, Result, message::Message, relay::RelayRequest};

use crate::event_bus::EventBus;
use crate::ports::RelayPort;
use crate::store::ConversationStore;

/// Shown when the relay answers without any text.
pub const EMPTY_REPLY_TEXT: &str = "Sorry, I could not generate a response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// The user message is being recorded
    Sending,
    AwaitingReply { conversation_id: String },
    /// The last exchange failed; a new one may start.
    Error(String),
}

/// What a finished exchange produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOutcome {
    pub conversation_id: String,
    pub user_message: Message,
    /// `None` when the conversation was deleted while waiting.
    pub reply: Option<Message>,
    pub success: bool,
}

pub struct ChatRuntime {
    store: Rc<ConversationStore>,
    relay: Rc<dyn RelayPort>,
    event_bus: EventBus,
    state: RefCell<ExchangeState>,
}

impl ChatRuntime {
    pub fn new(store: Rc<ConversationStore>, relay: Rc<dyn RelayPort>) -> Self {
        let event_bus = store.event_bus().clone();
        Self {
            store,
            relay,
            event_bus,
            state: RefCell::new(ExchangeState::Idle),
        }
    }

    pub fn store(&self) -> &Rc<ConversationStore> {
        &self.store
    }

    pub fn state(&self) -> ExchangeState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            *self.state.borrow(),
            ExchangeState::Sending | ExchangeState::AwaitingReply { .. }
        )
    }

    /// Run one exchange with the active conversation (created on demand).
    ///
    /// Relay failures do not fail the call: they end up in the transcript as
    /// an error-flagged assistant message and `success == false`. Errors are
    /// returned only for rejected input, a busy runtime, or storage failures.
    pub async fn send(&self, text: &str) -> Result<ExchangeOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidRequest("Message is empty".to_string()));
        }
        if self.is_busy() {
            return Err(ChatError::Busy);
        }
        *self.state.borrow_mut() = ExchangeState::Sending;

        let history = self
            .store
            .active_id()
            .map(|id| self.store.history(&id))
            .unwrap_or_default();

        let appended = match self.store.append_user_message(None, text).await {
            Ok(appended) => appended,
            Err(e) => {
                *self.state.borrow_mut() = ExchangeState::Error(e.to_string());
                return Err(e);
            }
        };
        let conversation_id = appended.conversation_id.clone();

        *self.state.borrow_mut() = ExchangeState::AwaitingReply {
            conversation_id: conversation_id.clone(),
        };
        self.event_bus.exchange_started(&conversation_id);

        let model = self.store.selected_model();
        let agent = self.store.selected_agent();
        let req = RelayRequest::new(text, agent.id)
            .with_model(model.model_id)
            .with_history(history);

        log::debug!(
            "Sending message with {} ({}) as {}",
            model.name,
            model.model_id,
            agent.id
        );

        let (reply_text, success) = match self.relay.send(req).await {
            Ok(reply) => {
                let text = reply
                    .response
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_TEXT.to_string());
                (text, true)
            }
            Err(e) => {
                log::error!("Error sending message: {}", e);
                (e.user_message(), false)
            }
        };

        let reply = self
            .store
            .append_assistant_message(&conversation_id, &reply_text, !success)
            .await;

        *self.state.borrow_mut() = match (&reply, success) {
            (Ok(_), true) => ExchangeState::Idle,
            (Ok(_), false) => ExchangeState::Error(reply_text.clone()),
            (Err(e), _) => ExchangeState::Error(e.to_string()),
        };
        self.event_bus.exchange_finished(&conversation_id, success);

        Ok(ExchangeOutcome {
            conversation_id,
            user_message: appended.message,
            reply: reply?,
            success,
        })
    }
}
