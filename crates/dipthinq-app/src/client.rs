//! JS-facing facade over the store and runtime.
//!
//! Synchronous getters return plain JS values. Anything that touches storage
//! or the network returns a `Promise`; the future holds its own `Rc` handles
//! so no borrow of `self` outlives the call.

use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use dipthinq_core::event_bus::EventBus;
use dipthinq_core::ports::RelayPort;
use dipthinq_core::runtime::ChatRuntime;
use dipthinq_core::store::ConversationStore;
use dipthinq_platform::storage::open_storage;
use dipthinq_platform::{LocalSpawner, RelayClient};
use dipthinq_types::{
    ChatError,
    agent::Agent,
    config::ClientConfig,
    model::Model,
};

#[wasm_bindgen]
pub struct ChatClient {
    runtime: Rc<ChatRuntime>,
}

fn to_js_error(e: ChatError) -> JsValue {
    js_sys::Error::new(&e.user_message()).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(|e| to_js_error(e.into()))
}

impl ChatClient {
    async fn build(config: ClientConfig) -> dipthinq_types::Result<ChatClient> {
        let storage = open_storage(&config.storage.backend)?;
        let relay: Rc<dyn RelayPort> = Rc::new(RelayClient::new(config.relay_url.clone()));
        let store = Rc::new(ConversationStore::new(
            storage,
            relay.clone(),
            Rc::new(LocalSpawner),
            EventBus::new(),
            config.title_model.clone(),
        ));
        store.load_all().await;

        log::info!("Chat client ready (relay {})", config.relay_url);
        Ok(ChatClient {
            runtime: Rc::new(ChatRuntime::new(store, relay)),
        })
    }

    fn store(&self) -> Rc<ConversationStore> {
        self.runtime.store().clone()
    }
}

#[wasm_bindgen]
impl ChatClient {
    /// `await ChatClient.create("/api/chat")`; the URL is optional.
    pub async fn create(relay_url: Option<String>) -> Result<ChatClient, JsValue> {
        let mut config = ClientConfig::default();
        if let Some(url) = relay_url.filter(|u| !u.is_empty()) {
            config.relay_url = url;
        }
        Self::build(config).await.map_err(to_js_error)
    }

    /// Same as `create`, taking a full `ClientConfig` object.
    #[wasm_bindgen(js_name = createWithConfig)]
    pub async fn create_with_config(config: JsValue) -> Result<ChatClient, JsValue> {
        let config: ClientConfig = config
            .into_serde()
            .map_err(|e| to_js_error(ChatError::InvalidRequest(format!("Invalid client config: {}", e))))?;
        Self::build(config).await.map_err(to_js_error)
    }

    // ─── Catalogs ────────────────────────────────────────────

    pub fn agents(&self) -> Result<JsValue, JsValue> {
        to_js(Agent::all())
    }

    pub fn models(&self) -> Result<JsValue, JsValue> {
        to_js(Model::all())
    }

    /// Models grouped under their provider badge.
    #[wasm_bindgen(js_name = modelGroups)]
    pub fn model_groups(&self) -> Result<JsValue, JsValue> {
        to_js(&Model::grouped())
    }

    // ─── Conversations ───────────────────────────────────────

    pub fn conversations(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store().conversations())
    }

    /// Messages of the active conversation.
    pub fn messages(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store().active_messages())
    }

    #[wasm_bindgen(js_name = activeConversationId)]
    pub fn active_conversation_id(&self) -> Option<String> {
        self.store().active_id()
    }

    /// Resolves to the id of the active conversation.
    #[wasm_bindgen(js_name = newConversation)]
    pub fn new_conversation(&self) -> Promise {
        let store = self.store();
        future_to_promise(async move {
            let id = store.new_conversation().await.map_err(to_js_error)?;
            Ok(JsValue::from_str(&id))
        })
    }

    /// Returns `false` for an unknown id.
    #[wasm_bindgen(js_name = selectConversation)]
    pub fn select_conversation(&self, id: &str) -> bool {
        self.store().select_conversation(id).is_some()
    }

    #[wasm_bindgen(js_name = deleteConversation)]
    pub fn delete_conversation(&self, id: String) -> Promise {
        let store = self.store();
        future_to_promise(async move {
            let removed = store.delete_conversation(&id).await.map_err(to_js_error)?;
            Ok(JsValue::from_bool(removed))
        })
    }

    #[wasm_bindgen(js_name = deleteAll)]
    pub fn delete_all(&self) -> Promise {
        let store = self.store();
        future_to_promise(async move {
            store.delete_all().await.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    // ─── Preferences ─────────────────────────────────────────

    #[wasm_bindgen(js_name = selectModel)]
    pub fn select_model(&self, key: String) -> Promise {
        let store = self.store();
        future_to_promise(async move {
            let model = store.select_model(&key).await.map_err(to_js_error)?;
            to_js(model)
        })
    }

    /// Returns the id actually selected (unknown ids fall back).
    #[wasm_bindgen(js_name = selectAgent)]
    pub fn select_agent(&self, id: &str) -> String {
        self.store().select_agent(id).id.to_string()
    }

    #[wasm_bindgen(js_name = selectedModel)]
    pub fn selected_model(&self) -> String {
        self.store().selected_model().id.to_string()
    }

    #[wasm_bindgen(js_name = selectedAgent)]
    pub fn selected_agent(&self) -> String {
        self.store().selected_agent().id.to_string()
    }

    // ─── Exchange ────────────────────────────────────────────

    /// Resolves to `{ conversationId, userMessage, reply, success }`.
    /// Rejects for empty text, while another exchange is running, or when
    /// storage fails.
    pub fn send(&self, text: String) -> Promise {
        let runtime = self.runtime.clone();
        future_to_promise(async move {
            let outcome = runtime.send(&text).await.map_err(to_js_error)?;
            to_js(&outcome)
        })
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.runtime.is_busy()
    }

    /// Store events since the last call, oldest first.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        to_js(&self.store().event_bus().drain())
    }
}
