use std::cell::{Cell, RefCell};
use crate::event::{EventHandler, StudioEvent};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Broadcasts studio events to registered handlers.
///
/// Handlers run synchronously, in subscription order, once per event.
/// An event emitted while handlers are running is dropped with a warning.
pub struct EventBus {
    subscribers: RefCell<Vec<(SubscriptionId, Box<dyn EventHandler>)>>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.try_borrow().map(|s| s.len()).ok();
        f.debug_struct("EventBus")
            .field("subscribers", &count)
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, handler));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    pub fn emit(&self, event: StudioEvent) {
        let Ok(mut subscribers) = self.subscribers.try_borrow_mut() else {
            log::warn!("Dropping {:?} emitted during dispatch", event);
            return;
        };
        for (_, handler) in subscribers.iter_mut() {
            handler.handle_event(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
