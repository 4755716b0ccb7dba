//! Conversation store: the single writer of the conversation collection.
//!
//! Every mutating operation updates memory and then re-serializes the whole
//! collection to the storage port before returning (write-through). When the
//! collection becomes empty the persisted entry is removed, not written as `[]`.
//!
//! The store is single-threaded: state lives in a `RefCell` and no borrow is
//! held across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use dipthinq_types::{
    ChatError, Result,
    agent::Agent,
    config::{CONVERSATIONS_KEY, SELECTED_MODEL_KEY},
    conversation::{Conversation, ConversationSummary},
    event::StoreEvent,
    message::{ChatTurn, Message},
    model::Model,
};

use crate::event_bus::EventBus;
use crate::ports::{RelayPort, StoragePort, TaskSpawner};
use crate::title::{fallback_title, generate_title};

/// A user message that was just appended, with the conversation it landed in.
#[derive(Debug, Clone)]
pub struct AppendedMessage {
    pub conversation_id: String,
    pub message: Message,
}

struct StoreState {
    /// Newest first
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    selected_model: &'static Model,
    selected_agent: &'static Agent,
}

impl StoreState {
    fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.find(id))
    }
}

pub struct ConversationStore {
    state: RefCell<StoreState>,
    storage: Rc<dyn StoragePort>,
    relay: Rc<dyn RelayPort>,
    spawner: Rc<dyn TaskSpawner>,
    event_bus: EventBus,
    title_model: String,
}

impl ConversationStore {
    pub fn new(
        storage: Rc<dyn StoragePort>,
        relay: Rc<dyn RelayPort>,
        spawner: Rc<dyn TaskSpawner>,
        event_bus: EventBus,
        title_model: impl Into<String>,
    ) -> Self {
        Self {
            state: RefCell::new(StoreState {
                conversations: Vec::new(),
                active_id: None,
                selected_model: Model::default_model(),
                selected_agent: Agent::default_agent(),
            }),
            storage,
            relay,
            spawner,
            event_bus,
            title_model: title_model.into(),
        }
    }

    // ─── Loading ─────────────────────────────────────────────

    /// Rehydrate the collection and the last-selected model.
    ///
    /// Unreadable data is logged and replaced by an empty collection; no
    /// conversation is selected afterwards. Returns the number loaded.
    pub async fn load_all(&self) -> usize {
        let conversations = match self.storage.get(CONVERSATIONS_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Conversation>>(&bytes) {
                Ok(conversations) => conversations,
                Err(e) => {
                    log::error!("Error loading conversations: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Error reading conversations from {}: {}", self.storage.backend_name(), e);
                Vec::new()
            }
        };

        let saved_model = match self.storage.get(SELECTED_MODEL_KEY).await {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .ok()
                .and_then(|key| Model::find(key.trim())),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Error reading selected model: {}", e);
                None
            }
        };

        let count = conversations.len();
        {
            let mut state = self.state.borrow_mut();
            state.conversations = conversations;
            state.active_id = None;
            if let Some(model) = saved_model {
                state.selected_model = model;
            }
        }

        log::info!("Loaded {} conversations from {}", count, self.storage.backend_name());
        self.event_bus.emit(StoreEvent::Loaded { count });
        count
    }

    // ─── Queries ─────────────────────────────────────────────

    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.state
            .borrow()
            .conversations
            .iter()
            .map(Conversation::summary)
            .collect()
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.state.borrow().find(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_id(&self) -> Option<String> {
        self.state.borrow().active_id.clone()
    }

    /// Messages of the active conversation, empty when none is active.
    pub fn active_messages(&self) -> Vec<Message> {
        self.state
            .borrow()
            .active()
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Prior turns of a conversation as relay history. Error results are
    /// presentation-only and never sent back to the model.
    pub fn history(&self, conversation_id: &str) -> Vec<ChatTurn> {
        self.state
            .borrow()
            .find(conversation_id)
            .map(|c| {
                c.messages
                    .iter()
                    .filter(|m| !m.error)
                    .map(Message::to_turn)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_model(&self) -> &'static Model {
        self.state.borrow().selected_model
    }

    pub fn selected_agent(&self) -> &'static Agent {
        self.state.borrow().selected_agent
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ─── Session management ──────────────────────────────────

    /// Start a new conversation, or keep the active one if it is still empty.
    /// Returns the id of the conversation that is active afterwards.
    pub async fn new_conversation(&self) -> Result<String> {
        let id = {
            let mut state = self.state.borrow_mut();
            if let Some(active) = state.active() {
                if active.is_empty() {
                    return Ok(active.id.clone());
                }
            }
            let conversation = Conversation::new();
            let id = conversation.id.clone();
            state.conversations.insert(0, conversation);
            state.active_id = Some(id.clone());
            id
        };

        self.event_bus.emit(StoreEvent::ConversationCreated { id: id.clone() });
        self.persist().await?;
        Ok(id)
    }

    /// Make a conversation active. Unknown ids are ignored and yield `None`.
    pub fn select_conversation(&self, id: &str) -> Option<Vec<Message>> {
        let messages = {
            let mut state = self.state.borrow_mut();
            let messages = state.find(id)?.messages.clone();
            state.active_id = Some(id.to_string());
            messages
        };
        self.event_bus.emit(StoreEvent::ConversationSelected { id: id.to_string() });
        Some(messages)
    }

    /// Remove a conversation. Returns `false` when the id was unknown.
    pub async fn delete_conversation(&self, id: &str) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let before = state.conversations.len();
            state.conversations.retain(|c| c.id != id);
            if state.conversations.len() == before {
                return Ok(false);
            }
            if state.active_id.as_deref() == Some(id) {
                state.active_id = None;
            }
        }

        self.event_bus.emit(StoreEvent::ConversationDeleted { id: id.to_string() });
        self.persist().await?;
        Ok(true)
    }

    pub async fn delete_all(&self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state.conversations.clear();
            state.active_id = None;
        }
        self.event_bus.emit(StoreEvent::ConversationsCleared);
        self.persist().await
    }

    // ─── Messages ────────────────────────────────────────────

    /// Append a user message.
    ///
    /// With `conversation_id == None` the active conversation is used, and
    /// one is created when nothing is active. The first message of a fresh
    /// conversation sets a temporary title and schedules title generation in
    /// the background.
    pub async fn append_user_message(
        self: &Rc<Self>,
        conversation_id: Option<&str>,
        text: &str,
    ) -> Result<AppendedMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidRequest("Message is empty".to_string()));
        }

        let target = match conversation_id {
            Some(id) if self.contains(id) => id.to_string(),
            Some(id) => return Err(ChatError::ConversationNotFound(id.to_string())),
            None => match self.active_id() {
                Some(id) => id,
                None => self.new_conversation().await?,
            },
        };

        let message = Message::user(text);
        let needs_title = {
            let mut state = self.state.borrow_mut();
            let conversation = state
                .find_mut(&target)
                .ok_or_else(|| ChatError::ConversationNotFound(target.clone()))?;
            let first = conversation.is_empty() && conversation.has_placeholder_title();
            if first {
                conversation.title = fallback_title(text);
            }
            conversation.push(message.clone());
            first
        };

        self.event_bus.message_appended(&target, &message);

        if needs_title {
            self.spawn_title_job(target.clone(), text.to_string());
        }

        self.persist().await?;
        Ok(AppendedMessage {
            conversation_id: target,
            message,
        })
    }

    /// Append an assistant reply. A reply for a conversation deleted in the
    /// meantime is dropped and yields `None`.
    pub async fn append_assistant_message(
        &self,
        conversation_id: &str,
        text: &str,
        is_error: bool,
    ) -> Result<Option<Message>> {
        let message = if is_error {
            Message::assistant_error(text)
        } else {
            Message::assistant(text)
        };

        {
            let mut state = self.state.borrow_mut();
            match state.find_mut(conversation_id) {
                Some(conversation) => conversation.push(message.clone()),
                None => {
                    log::warn!(
                        "Dropping assistant reply for deleted conversation {}",
                        conversation_id
                    );
                    return Ok(None);
                }
            }
        }

        self.event_bus.message_appended(conversation_id, &message);
        self.persist().await?;
        Ok(Some(message))
    }

    // ─── Titles ──────────────────────────────────────────────

    fn spawn_title_job(self: &Rc<Self>, conversation_id: String, text: String) {
        let store = Rc::downgrade(self);
        let relay = self.relay.clone();
        let agent_id = self.selected_agent().id;
        let title_model = self.title_model.clone();

        self.spawner.spawn(Box::pin(async move {
            let title = generate_title(relay.as_ref(), agent_id, &title_model, &text).await;
            let Some(store) = store.upgrade() else {
                return;
            };
            if let Err(e) = store.apply_generated_title(&conversation_id, title).await {
                log::warn!("Failed to save generated title: {}", e);
            }
        }));
    }

    /// Replace a conversation title in place.
    ///
    /// Returns `false` without touching anything when the conversation no
    /// longer exists or already carries that title.
    pub async fn apply_generated_title(&self, conversation_id: &str, title: String) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let Some(conversation) = state.find_mut(conversation_id) else {
                log::debug!("Conversation {} is gone, discarding title", conversation_id);
                return Ok(false);
            };
            if conversation.title == title {
                return Ok(false);
            }
            conversation.title = title.clone();
        }

        self.event_bus.emit(StoreEvent::TitleUpdated {
            conversation_id: conversation_id.to_string(),
            title,
        });
        self.persist().await?;
        Ok(true)
    }

    // ─── Preferences ─────────────────────────────────────────

    /// Select a model by local key and remember it across reloads.
    ///
    /// The selection applies to this session even when it cannot be saved;
    /// the write error is still returned.
    pub async fn select_model(&self, key: &str) -> Result<&'static Model> {
        let model = Model::find(key)
            .ok_or_else(|| ChatError::InvalidRequest(format!("Unknown model: {}", key)))?;
        self.state.borrow_mut().selected_model = model;
        self.event_bus.emit(StoreEvent::ModelSelected {
            model: model.id.to_string(),
        });

        if let Err(e) = self.storage.set(SELECTED_MODEL_KEY, model.id.as_bytes()).await {
            log::error!("Failed to save selected model {}: {}", model.id, e);
            self.event_bus.error(e.to_string());
            return Err(e);
        }
        Ok(model)
    }

    /// Select the agent for subsequent exchanges; unknown ids fall back to the default.
    pub fn select_agent(&self, id: &str) -> &'static Agent {
        let agent = Agent::resolve(id);
        self.state.borrow_mut().selected_agent = agent;
        self.event_bus.emit(StoreEvent::AgentSelected {
            agent: agent.id.to_string(),
        });
        agent
    }

    // ─── Persistence ─────────────────────────────────────────

    async fn persist(&self) -> Result<()> {
        let snapshot = {
            let state = self.state.borrow();
            if state.conversations.is_empty() {
                None
            } else {
                Some(serde_json::to_vec(&state.conversations)?)
            }
        };

        let result = match snapshot {
            Some(bytes) => self.storage.set(CONVERSATIONS_KEY, &bytes).await,
            None => self.storage.delete(CONVERSATIONS_KEY).await,
        };

        if let Err(e) = &result {
            log::error!("Failed to persist conversations: {}", e);
            self.event_bus.error(e.to_string());
        }
        result
    }
}
