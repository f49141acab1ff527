//! In-process publish/subscribe bus for domain events.
//!
//! Subscribers register against an event category string (see
//! [`super::domain_event::DomainEvent::category`]) or the wildcard `"*"` to
//! receive everything. Dispatch order is registration order within a
//! category, followed by wildcard subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::domain_event::DomainEvent;

type EventCallback = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`EventBus::subscribe`], used to later unsubscribe.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    event_type: String,
    callback_id: u64,
}

#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<String, Vec<(u64, EventCallback)>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribes to a single event category (see `DomainEvent::category`).
    pub fn subscribe<F>(&self, category: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(&DomainEvent) + Send + Sync + 'static,
    {
        let callback_id = NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscribers.lock().unwrap();
        subs.entry(category.to_string())
            .or_default()
            .push((callback_id, Arc::new(callback)));

        SubscriptionHandle {
            event_type: category.to_string(),
            callback_id,
        }
    }

    /// Subscribes to every event category, regardless of kind.
    pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&DomainEvent) + Send + Sync + 'static,
    {
        self.subscribe("*", callback)
    }

    /// Dispatches one event to every subscriber of its category, then every
    /// wildcard subscriber.
    pub fn publish(&self, event: &DomainEvent) {
        let subs = self.subscribers.lock().unwrap();

        if let Some(callbacks) = subs.get(event.category()) {
            for (_, callback) in callbacks {
                callback(event);
            }
        }

        if event.category() != "*" {
            if let Some(callbacks) = subs.get("*") {
                for (_, callback) in callbacks {
                    callback(event);
                }
            }
        }
    }

    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        let mut subs = self.subscribers.lock().unwrap();
        if let Some(callbacks) = subs.get_mut(&handle.event_type) {
            callbacks.retain(|(id, _)| *id != handle.callback_id);
        }
    }

    pub fn clear_subscribers(&self, category: &str) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.remove(category);
    }

    pub fn clear_all_subscribers(&self) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.clear();
    }

    pub fn subscriber_count(&self, category: &str) -> usize {
        let subs = self.subscribers.lock().unwrap();
        subs.get(category).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
