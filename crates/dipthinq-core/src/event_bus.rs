//! Buffered store events for the UI.
//!
//! The UI polls instead of subscribing, so events wait in a queue until the
//! next `drain`. The queue is bounded: a page that stops polling loses the
//! oldest events, not memory. Events about a conversation are discarded
//! once a later event deletes it (or clears everything), since the UI could
//! only act on them by looking up something that no longer exists.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use dipthinq_types::event::StoreEvent;
use dipthinq_types::message::Message;

pub const DEFAULT_CAPACITY: usize = 256;

struct Queue {
    events: VecDeque<StoreEvent>,
    capacity: usize,
    dropped: usize,
}

/// Handle to a shared queue. Clones see the same events.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<Queue>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Queue {
                events: VecDeque::new(),
                capacity: capacity.max(1),
                dropped: 0,
            })),
        }
    }

    pub fn emit(&self, event: StoreEvent) {
        let mut queue = self.inner.borrow_mut();
        match &event {
            StoreEvent::ConversationsCleared => {
                queue.events.retain(|e| e.conversation_id().is_none());
            }
            StoreEvent::ConversationDeleted { id } => {
                let id = id.clone();
                queue.events.retain(|e| e.conversation_id() != Some(id.as_str()));
            }
            _ => {}
        }
        if queue.events.len() == queue.capacity {
            queue.events.pop_front();
            queue.dropped += 1;
            log::debug!("Event queue full, dropped oldest ({} so far)", queue.dropped);
        }
        queue.events.push_back(event);
    }

    pub fn message_appended(&self, conversation_id: &str, message: &Message) {
        self.emit(StoreEvent::MessageAppended {
            conversation_id: conversation_id.to_string(),
            message_id: message.id.clone(),
            error: message.error,
        });
    }

    pub fn exchange_started(&self, conversation_id: &str) {
        self.emit(StoreEvent::ExchangeStarted {
            conversation_id: conversation_id.to_string(),
        });
    }

    pub fn exchange_finished(&self, conversation_id: &str, success: bool) {
        self.emit(StoreEvent::ExchangeFinished {
            conversation_id: conversation_id.to_string(),
            success,
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(StoreEvent::Error {
            message: message.into(),
        });
    }

    /// Take everything queued, oldest first.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().events.is_empty()
    }

    /// Events lost to the capacity bound since the bus was created.
    pub fn dropped(&self) -> usize {
        self.inner.borrow().dropped
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
