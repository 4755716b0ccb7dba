#[cfg(test)]
mod tests {
    use crate::event_bus::EventBus;
    use crate::ports::*;
    use crate::runtime::{ChatRuntime, EMPTY_REPLY_TEXT, ExchangeState};
    use crate::store::ConversationStore;
    use crate::title::*;
    use async_trait::async_trait;
    use dipthinq_types::ChatError;
    use dipthinq_types::agent::DEFAULT_AGENT_ID;
    use dipthinq_types::config::{CONVERSATIONS_KEY, SELECTED_MODEL_KEY};
    use dipthinq_types::conversation::{Conversation, PLACEHOLDER_TITLE};
    use dipthinq_types::event::StoreEvent;
    use dipthinq_types::message::*;
    use dipthinq_types::model::TITLE_MODEL_ID;
    use dipthinq_types::relay::{RelayReply, RelayRequest};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    // ─── Mocks ───────────────────────────────────────────────

    /// Replies in order; records every request.
    struct MockRelay {
        replies: RefCell<VecDeque<dipthinq_types::Result<RelayReply>>>,
        requests: RefCell<Vec<RelayRequest>>,
    }

    impl MockRelay {
        fn new() -> Self {
            Self {
                replies: RefCell::new(VecDeque::new()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn reply(&self, text: &str) {
            self.replies.borrow_mut().push_back(Ok(RelayReply {
                response: Some(text.to_string()),
                model: "openai/gpt-4o-mini".to_string(),
                requested_model: Some("openai/gpt-4o-mini".to_string()),
            }));
        }

        fn reply_null(&self) {
            self.replies.borrow_mut().push_back(Ok(RelayReply {
                response: None,
                model: "unknown".to_string(),
                requested_model: None,
            }));
        }

        fn fail(&self, err: ChatError) {
            self.replies.borrow_mut().push_back(Err(err));
        }
    }

    #[async_trait(?Send)]
    impl RelayPort for MockRelay {
        async fn send(&self, req: RelayRequest) -> dipthinq_types::Result<RelayReply> {
            self.requests.borrow_mut().push(req);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Network("no scripted reply".to_string())))
        }
    }

    struct MockStorage {
        data: RefCell<HashMap<String, Vec<u8>>>,
        fail_writes: Cell<bool>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                data: RefCell::new(HashMap::new()),
                fail_writes: Cell::new(false),
            }
        }

        fn raw(&self, key: &str) -> Option<Vec<u8>> {
            self.data.borrow().get(key).cloned()
        }
    }

    #[async_trait(?Send)]
    impl StoragePort for MockStorage {
        async fn get(&self, key: &str) -> dipthinq_types::Result<Option<Vec<u8>>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8]) -> dipthinq_types::Result<()> {
            if self.fail_writes.get() {
                return Err(ChatError::Storage("quota exceeded".to_string()));
            }
            self.data.borrow_mut().insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> dipthinq_types::Result<()> {
            self.data.borrow_mut().remove(key);
            Ok(())
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    /// Answers once the test opens the gate.
    struct GatedRelay {
        gate: RefCell<Option<oneshot::Receiver<RelayReply>>>,
    }

    #[async_trait(?Send)]
    impl RelayPort for GatedRelay {
        async fn send(&self, _req: RelayRequest) -> dipthinq_types::Result<RelayReply> {
            let gate = self.gate.borrow_mut().take();
            match gate {
                Some(rx) => rx
                    .await
                    .map_err(|_| ChatError::Network("gate dropped".to_string())),
                None => Err(ChatError::Network("gate already used".to_string())),
            }
        }
    }

    /// Holds spawned tasks until the test runs them.
    struct QueueSpawner {
        tasks: RefCell<Vec<LocalTask>>,
    }

    impl QueueSpawner {
        fn new() -> Self {
            Self {
                tasks: RefCell::new(Vec::new()),
            }
        }

        fn pending(&self) -> usize {
            self.tasks.borrow().len()
        }

        fn run_pending(&self) {
            let tasks: Vec<LocalTask> = self.tasks.borrow_mut().drain(..).collect();
            for task in tasks {
                block_on(task);
            }
        }
    }

    impl TaskSpawner for QueueSpawner {
        fn spawn(&self, task: LocalTask) {
            self.tasks.borrow_mut().push(task);
        }
    }

    struct Harness {
        relay: Rc<MockRelay>,
        storage: Rc<MockStorage>,
        spawner: Rc<QueueSpawner>,
        store: Rc<ConversationStore>,
    }

    fn harness_with(storage: Rc<MockStorage>) -> Harness {
        let relay = Rc::new(MockRelay::new());
        let spawner = Rc::new(QueueSpawner::new());
        let store = Rc::new(ConversationStore::new(
            storage.clone(),
            relay.clone(),
            spawner.clone(),
            EventBus::new(),
            TITLE_MODEL_ID,
        ));
        Harness {
            relay,
            storage,
            spawner,
            store,
        }
    }

    fn harness() -> Harness {
        harness_with(Rc::new(MockStorage::new()))
    }

    fn persisted(storage: &MockStorage) -> Vec<Conversation> {
        let bytes = storage.raw(CONVERSATIONS_KEY).expect("conversations persisted");
        serde_json::from_slice(&bytes).unwrap()
    }

    // ─── EventBus Tests ──────────────────────────────────────

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        bus.emit(StoreEvent::ConversationsCleared);
        bus.emit(StoreEvent::Loaded { count: 2 });

        assert!(bus.has_pending());
        assert_eq!(bus.drain().len(), 2);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(StoreEvent::ConversationsCleared);
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    #[test]
    fn test_event_bus_drops_oldest_when_full() {
        let bus = EventBus::with_capacity(2);
        for count in 1..=3 {
            bus.emit(StoreEvent::Loaded { count });
        }
        assert_eq!(
            bus.drain(),
            vec![StoreEvent::Loaded { count: 2 }, StoreEvent::Loaded { count: 3 }]
        );
        assert_eq!(bus.dropped(), 1);
    }

    #[test]
    fn test_event_bus_delete_discards_stale_events() {
        let bus = EventBus::new();
        let message = Message::assistant_error("Invalid API key");
        bus.emit(StoreEvent::ConversationCreated { id: "a".into() });
        bus.emit(StoreEvent::ConversationCreated { id: "b".into() });
        bus.message_appended("a", &message);
        bus.exchange_finished("a", false);
        bus.emit(StoreEvent::ConversationDeleted { id: "a".into() });

        assert_eq!(
            bus.drain(),
            vec![
                StoreEvent::ConversationCreated { id: "b".into() },
                StoreEvent::ExchangeFinished {
                    conversation_id: "a".into(),
                    success: false,
                },
                StoreEvent::ConversationDeleted { id: "a".into() },
            ]
        );
    }

    #[test]
    fn test_event_bus_clear_keeps_global_events() {
        let bus = EventBus::new();
        bus.emit(StoreEvent::Loaded { count: 1 });
        bus.emit(StoreEvent::ConversationSelected { id: "a".into() });
        bus.error("quota exceeded");
        bus.emit(StoreEvent::ConversationsCleared);

        let events = bus.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StoreEvent::Loaded { count: 1 });
        assert!(matches!(events[1], StoreEvent::Error { ref message } if message == "quota exceeded"));
        assert_eq!(events[2], StoreEvent::ConversationsCleared);
    }

    #[test]
    fn test_message_appended_carries_error_flag() {
        let bus = EventBus::new();
        let message = Message::assistant_error("offline");
        bus.message_appended("c1", &message);
        assert_eq!(
            bus.drain(),
            vec![StoreEvent::MessageAppended {
                conversation_id: "c1".into(),
                message_id: message.id.clone(),
                error: true,
            }]
        );
    }

    // ─── Title Tests ─────────────────────────────────────────

    #[test]
    fn test_sanitize_plain_title() {
        assert_eq!(sanitize_title("Fixing Login Bug").as_deref(), Some("Fixing Login Bug"));
    }

    #[test]
    fn test_sanitize_nested_decoration() {
        assert_eq!(
            sanitize_title("**Title:** \"Fixing Login Bug\"").as_deref(),
            Some("Fixing Login Bug")
        );
        assert_eq!(sanitize_title("## Rust Borrow Checker").as_deref(), Some("Rust Borrow Checker"));
        assert_eq!(sanitize_title("The title is: 'Trip Ideas'").as_deref(), Some("Trip Ideas"));
    }

    #[test]
    fn test_sanitize_keeps_five_words() {
        assert_eq!(
            sanitize_title("One Two Three Four Five Six Seven").as_deref(),
            Some("One Two Three Four Five")
        );
    }

    #[test]
    fn test_sanitize_rejects_empty_and_long() {
        assert_eq!(sanitize_title("\"\""), None);
        assert_eq!(sanitize_title("   "), None);
        let long = "Supercalifragilisticexpialidocious Antidisestablishmentarianism Words";
        assert_eq!(sanitize_title(long), None);
    }

    #[test]
    fn test_fallback_title_is_thirty_chars() {
        let text = "How do I configure a reverse proxy for my app?";
        assert_eq!(fallback_title(text), "How do I configure a reverse p");
        assert_eq!(fallback_title("short"), "short");
    }

    #[test]
    fn test_title_prompt_embeds_message() {
        let prompt = title_prompt("what is rust");
        assert!(prompt.contains("User's first message: \"what is rust\""));
        assert!(prompt.contains("Return ONLY the title text"));
    }

    #[test]
    fn test_generate_title_uses_title_model() {
        let relay = MockRelay::new();
        relay.reply("Rust Ownership Basics");
        let title = block_on(generate_title(&relay, "agent_coding", TITLE_MODEL_ID, "explain ownership"));
        assert_eq!(title, "Rust Ownership Basics");

        let requests = relay.requests.borrow();
        let req = &requests[0];
        assert_eq!(req.model_id.as_deref(), Some(TITLE_MODEL_ID));
        assert_eq!(req.agent_id.as_deref(), Some("agent_coding"));
        assert!(req.history.is_empty());
    }

    #[test]
    fn test_generate_title_falls_back_on_failure() {
        let relay = MockRelay::new();
        relay.fail(ChatError::Relay {
            status: 500,
            message: "boom".to_string(),
        });
        let text = "Please help me plan a week long trip to Japan";
        let title = block_on(generate_title(&relay, DEFAULT_AGENT_ID, TITLE_MODEL_ID, text));
        assert_eq!(title, fallback_title(text));
    }

    #[test]
    fn test_generate_title_falls_back_on_null_response() {
        let relay = MockRelay::new();
        relay.reply_null();
        assert_eq!(block_on(generate_title(&relay, DEFAULT_AGENT_ID, TITLE_MODEL_ID, "hi")), "hi");
    }

    // ─── Store: Session Management ───────────────────────────

    #[test]
    fn test_load_empty_storage() {
        let h = harness();
        assert_eq!(block_on(h.store.load_all()), 0);
        assert!(h.store.is_empty());
        assert!(h.store.active_id().is_none());
    }

    #[test]
    fn test_load_malformed_data_yields_empty() {
        let storage = Rc::new(MockStorage::new());
        storage
            .data
            .borrow_mut()
            .insert(CONVERSATIONS_KEY.to_string(), b"{not json".to_vec());
        let h = harness_with(storage);
        assert_eq!(block_on(h.store.load_all()), 0);
    }

    #[test]
    fn test_new_conversation_reuses_empty_active() {
        let h = harness();
        let first = block_on(h.store.new_conversation()).unwrap();
        let second = block_on(h.store.new_conversation()).unwrap();
        assert_eq!(first, second);
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.store.active_id().as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_new_conversation_prepends() {
        let h = harness();
        let first = block_on(h.store.new_conversation()).unwrap();
        block_on(h.store.append_user_message(None, "hello")).unwrap();
        let second = block_on(h.store.new_conversation()).unwrap();

        assert_ne!(first, second);
        let list = h.store.conversations();
        assert_eq!(list[0].id, second);
        assert_eq!(list[1].id, first);
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let h = harness();
        let id = block_on(h.store.new_conversation()).unwrap();
        assert!(h.store.select_conversation("missing").is_none());
        assert_eq!(h.store.active_id(), Some(id));
    }

    #[test]
    fn test_select_returns_messages() {
        let h = harness();
        let first = block_on(h.store.new_conversation()).unwrap();
        block_on(h.store.append_user_message(None, "hello")).unwrap();
        block_on(h.store.new_conversation()).unwrap();

        let messages = h.store.select_conversation(&first).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(h.store.active_id(), Some(first));
    }

    #[test]
    fn test_delete_only_conversation_removes_key() {
        let h = harness();
        let id = block_on(h.store.new_conversation()).unwrap();
        assert!(h.storage.raw(CONVERSATIONS_KEY).is_some());

        assert!(block_on(h.store.delete_conversation(&id)).unwrap());
        assert!(h.store.is_empty());
        assert!(h.store.active_id().is_none());
        assert!(h.storage.raw(CONVERSATIONS_KEY).is_none());
    }

    #[test]
    fn test_delete_unknown_returns_false() {
        let h = harness();
        block_on(h.store.new_conversation()).unwrap();
        assert!(!block_on(h.store.delete_conversation("missing")).unwrap());
        assert_eq!(h.store.len(), 1);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let h = harness();
        let first = block_on(h.store.new_conversation()).unwrap();
        block_on(h.store.append_user_message(None, "hello")).unwrap();
        let second = block_on(h.store.new_conversation()).unwrap();

        block_on(h.store.delete_conversation(&first)).unwrap();
        assert_eq!(h.store.active_id(), Some(second));
        assert_eq!(persisted(&h.storage).len(), 1);
    }

    #[test]
    fn test_delete_all() {
        let h = harness();
        block_on(h.store.append_user_message(None, "one")).unwrap();
        block_on(h.store.new_conversation()).unwrap();
        block_on(h.store.delete_all()).unwrap();

        assert!(h.store.is_empty());
        assert!(h.store.active_id().is_none());
        assert!(h.storage.raw(CONVERSATIONS_KEY).is_none());
    }

    // ─── Store: Messages ─────────────────────────────────────

    #[test]
    fn test_append_creates_conversation_on_demand() {
        let h = harness();
        let appended = block_on(h.store.append_user_message(None, "  hello there  ")).unwrap();

        assert_eq!(appended.message.content, "hello there");
        assert_eq!(appended.message.role, Role::User);
        assert_eq!(h.store.active_id(), Some(appended.conversation_id.clone()));

        let conv = h.store.conversation(&appended.conversation_id).unwrap();
        assert_eq!(conv.title, "hello there");
        assert_eq!(conv.last_message.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_append_empty_is_rejected() {
        let h = harness();
        let err = block_on(h.store.append_user_message(None, "   ")).unwrap_err();
        assert!(matches!(err, ChatError::InvalidRequest(_)));
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_append_to_unknown_conversation() {
        let h = harness();
        let err = block_on(h.store.append_user_message(Some("missing"), "hi")).unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound(_)));
    }

    #[test]
    fn test_first_message_schedules_title_once() {
        let h = harness();
        block_on(h.store.append_user_message(None, "first")).unwrap();
        block_on(h.store.append_user_message(None, "second")).unwrap();
        assert_eq!(h.spawner.pending(), 1);
    }

    #[test]
    fn test_title_job_applies_generated_title() {
        let h = harness();
        h.relay.reply("\"Greeting The Assistant\"");
        let appended = block_on(h.store.append_user_message(None, "hello assistant, how are you")).unwrap();

        h.spawner.run_pending();

        let conv = h.store.conversation(&appended.conversation_id).unwrap();
        assert_eq!(conv.title, "Greeting The Assistant");
        assert_eq!(persisted(&h.storage)[0].title, "Greeting The Assistant");

        let requests = h.relay.requests.borrow();
        let req = &requests[0];
        assert_eq!(req.model_id.as_deref(), Some(TITLE_MODEL_ID));
    }

    #[test]
    fn test_title_job_does_not_resurrect_deleted() {
        let h = harness();
        h.relay.reply("Some Title");
        let appended = block_on(h.store.append_user_message(None, "hello")).unwrap();
        block_on(h.store.delete_conversation(&appended.conversation_id)).unwrap();

        h.spawner.run_pending();

        assert!(h.store.is_empty());
        assert!(h.storage.raw(CONVERSATIONS_KEY).is_none());
    }

    #[test]
    fn test_title_job_after_store_dropped() {
        let h = harness();
        h.relay.reply("Some Title");
        block_on(h.store.append_user_message(None, "hello")).unwrap();
        let spawner = h.spawner.clone();
        drop(h);
        spawner.run_pending();
    }

    #[test]
    fn test_assistant_reply_for_deleted_conversation() {
        let h = harness();
        let appended = block_on(h.store.append_user_message(None, "hello")).unwrap();
        block_on(h.store.delete_conversation(&appended.conversation_id)).unwrap();

        let reply = block_on(h.store.append_assistant_message(&appended.conversation_id, "hi", false)).unwrap();
        assert!(reply.is_none());
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_history_excludes_error_messages() {
        let h = harness();
        let appended = block_on(h.store.append_user_message(None, "q1")).unwrap();
        let id = appended.conversation_id;
        block_on(h.store.append_assistant_message(&id, "a1", false)).unwrap();
        block_on(h.store.append_user_message(None, "q2")).unwrap();
        block_on(h.store.append_assistant_message(&id, "failed", true)).unwrap();

        let history = h.store.history(&id);
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], ChatTurn::assistant("a1"));
        assert_eq!(history[2], ChatTurn::user("q2"));
    }

    #[test]
    fn test_reload_roundtrip() {
        let h = harness();
        let appended = block_on(h.store.append_user_message(None, "What is the capital of France?")).unwrap();
        block_on(h.store.append_assistant_message(&appended.conversation_id, "Paris.", false)).unwrap();

        let reloaded = harness_with(h.storage.clone());
        assert_eq!(block_on(reloaded.store.load_all()), 1);
        assert!(reloaded.store.active_id().is_none());

        let conv = reloaded.store.conversation(&appended.conversation_id).unwrap();
        assert_eq!(conv.title, "What is the capital of France?");
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].content, "Paris.");
    }

    #[test]
    fn test_storage_failure_keeps_memory() {
        let h = harness();
        h.storage.fail_writes.set(true);
        let result = block_on(h.store.new_conversation());
        assert!(matches!(result, Err(ChatError::Storage(_))));
        assert_eq!(h.store.len(), 1);

        let events = h.store.event_bus().drain();
        assert!(events.iter().any(|e| matches!(e, StoreEvent::Error { .. })));
    }

    // ─── Store: Preferences ──────────────────────────────────

    #[test]
    fn test_selected_model_persists() {
        let h = harness();
        let model = block_on(h.store.select_model("gpt-3.5-turbo")).unwrap();
        assert_eq!(model.model_id, "openai/gpt-3.5-turbo");
        assert_eq!(h.storage.raw(SELECTED_MODEL_KEY).unwrap(), b"gpt-3.5-turbo".to_vec());

        let reloaded = harness_with(h.storage.clone());
        block_on(reloaded.store.load_all());
        assert_eq!(reloaded.store.selected_model().id, "gpt-3.5-turbo");
    }

    #[test]
    fn test_select_unknown_model_is_rejected() {
        let h = harness();
        let before = h.store.selected_model().id;
        assert!(block_on(h.store.select_model("nope")).is_err());
        assert_eq!(h.store.selected_model().id, before);
    }

    #[test]
    fn test_select_model_write_failure_is_reported() {
        let h = harness();
        h.storage.fail_writes.set(true);
        let result = block_on(h.store.select_model("gpt-3.5-turbo"));
        assert!(matches!(result, Err(ChatError::Storage(_))));
        assert_eq!(h.store.selected_model().id, "gpt-3.5-turbo");
        assert!(h.storage.raw(SELECTED_MODEL_KEY).is_none());

        let events = h.store.event_bus().drain();
        assert!(matches!(events[0], StoreEvent::ModelSelected { ref model } if model == "gpt-3.5-turbo"));
        assert!(matches!(events[1], StoreEvent::Error { ref message } if message.contains("quota exceeded")));
    }

    #[test]
    fn test_select_agent_falls_back() {
        let h = harness();
        assert_eq!(h.store.select_agent("agent_coding").id, "agent_coding");
        assert_eq!(h.store.select_agent("bogus").id, DEFAULT_AGENT_ID);
    }

    // ─── Runtime Tests ───────────────────────────────────────

    fn runtime(h: &Harness) -> ChatRuntime {
        ChatRuntime::new(h.store.clone(), h.relay.clone())
    }

    #[test]
    fn test_runtime_initial_state() {
        let h = harness();
        let rt = runtime(&h);
        assert_eq!(rt.state(), ExchangeState::Idle);
        assert!(!rt.is_busy());
    }

    #[test]
    fn test_send_successful_exchange() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.reply("Paris is the capital of France.");

        let outcome = block_on(rt.send("What is the capital of France?")).unwrap();
        assert!(outcome.success);
        assert_eq!(rt.state(), ExchangeState::Idle);

        let reply = outcome.reply.unwrap();
        assert_eq!(reply.content, "Paris is the capital of France.");
        assert!(!reply.error);

        let requests = h.relay.requests.borrow();
        let req = &requests[0];
        assert_eq!(req.message.as_deref(), Some("What is the capital of France?"));
        assert_eq!(req.agent_id.as_deref(), Some(DEFAULT_AGENT_ID));
        assert_eq!(req.model_id.as_deref(), Some("openai/gpt-4o-mini"));
        assert!(req.history.is_empty());

        let events = h.store.event_bus().drain();
        assert!(events.iter().any(|e| matches!(e, StoreEvent::ExchangeStarted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, StoreEvent::ExchangeFinished { success: true, .. })));
    }

    #[test]
    fn test_send_carries_prior_history() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.reply("Paris.");
        block_on(rt.send("Capital of France?")).unwrap();
        h.spawner.run_pending();
        h.relay.reply("About 2 million.");
        block_on(rt.send("Population?")).unwrap();

        let requests = h.relay.requests.borrow();
        let last = requests.last().unwrap();
        assert_eq!(
            last.history,
            vec![ChatTurn::user("Capital of France?"), ChatTurn::assistant("Paris.")]
        );
    }

    #[test]
    fn test_send_uses_selected_agent_and_model() {
        let h = harness();
        let rt = runtime(&h);
        h.store.select_agent("agent_research");
        block_on(h.store.select_model("gpt-3.5-turbo")).unwrap();
        h.relay.reply("ok");

        block_on(rt.send("hi")).unwrap();
        let requests = h.relay.requests.borrow();
        let req = &requests[0];
        assert_eq!(req.agent_id.as_deref(), Some("agent_research"));
        assert_eq!(req.model_id.as_deref(), Some("openai/gpt-3.5-turbo"));
    }

    #[test]
    fn test_send_null_response_uses_apology() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.reply_null();
        let outcome = block_on(rt.send("hi")).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.reply.unwrap().content, EMPTY_REPLY_TEXT);
    }

    #[test]
    fn test_send_relay_error_is_recorded() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.fail(ChatError::Relay {
            status: 401,
            message: "Invalid API key".to_string(),
        });

        let outcome = block_on(rt.send("hi")).unwrap();
        assert!(!outcome.success);
        let reply = outcome.reply.unwrap();
        assert!(reply.error);
        assert_eq!(reply.content, "Invalid API key");
        assert!(matches!(rt.state(), ExchangeState::Error(_)));
        assert!(!rt.is_busy());

        // The error reply is not sent back as history.
        h.relay.reply("ok");
        block_on(rt.send("again")).unwrap();
        let requests = h.relay.requests.borrow();
        assert_eq!(requests.last().unwrap().history, vec![ChatTurn::user("hi")]);
    }

    #[test]
    fn test_send_while_busy_is_rejected() {
        let h = harness();
        let (open, gate) = oneshot::channel();
        let relay = Rc::new(GatedRelay {
            gate: RefCell::new(Some(gate)),
        });
        let rt = ChatRuntime::new(h.store.clone(), relay);

        block_on(async {
            let mut first = Box::pin(rt.send("first question"));
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert!(rt.is_busy());
            assert!(matches!(rt.state(), ExchangeState::AwaitingReply { .. }));

            let second = rt.send("second question").await;
            assert!(matches!(second, Err(ChatError::Busy)));
            assert_eq!(h.store.active_messages().len(), 1);

            open.send(RelayReply {
                response: Some("answer".to_string()),
                model: "openai/gpt-4o-mini".to_string(),
                requested_model: None,
            })
            .unwrap();
            let outcome = first.await.unwrap();
            assert!(outcome.success);
        });

        assert!(!rt.is_busy());
        assert_eq!(rt.state(), ExchangeState::Idle);
        let contents: Vec<String> = h
            .store
            .active_messages()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first question", "answer"]);
    }

    #[test]
    fn test_busy_clears_after_failed_exchange() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.fail(ChatError::Network("offline".to_string()));
        block_on(rt.send("hi")).unwrap();
        assert!(!rt.is_busy());

        h.relay.reply("back online");
        let outcome = block_on(rt.send("hi again")).unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn test_send_empty_is_rejected() {
        let h = harness();
        let rt = runtime(&h);
        assert!(matches!(block_on(rt.send("  ")), Err(ChatError::InvalidRequest(_))));
        assert!(h.relay.requests.borrow().is_empty());
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_send_first_message_sets_temporary_title() {
        let h = harness();
        let rt = runtime(&h);
        h.relay.reply("ok");
        let outcome = block_on(rt.send("Explain how lifetimes work in Rust please")).unwrap();
        let conv = h.store.conversation(&outcome.conversation_id).unwrap();
        assert_eq!(conv.title, "Explain how lifetimes work in ");
        assert_ne!(conv.title, PLACEHOLDER_TITLE);
    }
}
