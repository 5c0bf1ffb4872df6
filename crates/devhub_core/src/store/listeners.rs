//! Key-scoped subscriber bookkeeping shared by store backends.

use super::{ContextId, StorageCallback, StorageEvent, SubscriptionId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Listener {
    id: SubscriptionId,
    context: ContextId,
    key: String,
    callback: StorageCallback,
}

/// Subscriber list keyed by storage key and owning context.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one callback owned by `context` for `key`.
    pub fn add(&self, context: ContextId, key: &str, callback: StorageCallback) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().push(Listener {
            id,
            context,
            key: key.to_string(),
            callback,
        });
        id
    }

    /// Removes one subscription. Returns whether it existed.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Delivers `event` to every listener of its key outside the source context.
    ///
    /// Callbacks run after the registry lock is released, so they may read the
    /// store or (un)subscribe. Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &StorageEvent) -> usize {
        let targets: Vec<StorageCallback> = self
            .lock()
            .iter()
            .filter(|listener| listener.key == event.key && listener.context != event.source)
            .map(|listener| Arc::clone(&listener.callback))
            .collect();

        for callback in &targets {
            callback(event);
        }
        targets.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
