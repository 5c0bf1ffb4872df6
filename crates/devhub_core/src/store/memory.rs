//! In-memory storage shared between several contexts.
//!
//! # Responsibility
//! - Model one origin-wide key-value area (`MemoryStorage`) with many
//!   independent context handles (`MemoryStore`), like browser tabs sharing
//!   local storage.
//! - Notify other contexts synchronously after each effective write.
//!
//! # Invariants
//! - Writes that leave a value unchanged emit no notification.
//! - Notifications are dispatched after the entry lock is released.

use super::listeners::ListenerRegistry;
use super::{
    ContextId, PersistentStore, StorageCallback, StorageEvent, StoreError, StoreResult,
    SubscriptionId,
};
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Shared key-value area. Open one `MemoryStore` per context.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    listeners: ListenerRegistry,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Opens a new context handle with a fresh context id.
    pub fn open_context(self: &Arc<Self>) -> MemoryStore {
        MemoryStore {
            storage: Arc::clone(self),
            context: Uuid::new_v4(),
        }
    }

    /// Writes a raw value without notifying anyone.
    ///
    /// Simulates data that already existed before any context was opened.
    pub fn seed(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Poisoned("memory storage entries"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Reads a raw value regardless of context.
    pub fn raw(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| StoreError::Poisoned("memory storage entries"))?
            .get(key)
            .cloned())
    }

    /// Number of registered subscriptions over all contexts.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

/// One context's view of a `MemoryStorage`.
#[derive(Clone)]
pub struct MemoryStore {
    storage: Arc<MemoryStorage>,
    context: ContextId,
}

impl MemoryStore {
    /// Convenience constructor for a single-context storage.
    pub fn standalone() -> Self {
        MemoryStorage::new().open_context()
    }

    /// Backing storage shared with sibling contexts.
    pub fn storage(&self) -> &Arc<MemoryStorage> {
        &self.storage
    }

    fn notify(&self, key: &str, new_value: Option<String>) {
        let event = StorageEvent {
            key: key.to_string(),
            new_value,
            source: self.context,
        };
        let delivered = self.storage.listeners.dispatch(&event);
        debug!(
            "event=storage_notify module=store status=ok backend=memory key={} delivered={}",
            key, delivered
        );
    }
}

impl PersistentStore for MemoryStore {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage.raw(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let previous = self
            .storage
            .entries
            .lock()
            .map_err(|_| StoreError::Poisoned("memory storage entries"))?
            .insert(key.to_string(), value.to_string());

        if previous.as_deref() != Some(value) {
            self.notify(key, Some(value.to_string()));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let previous = self
            .storage
            .entries
            .lock()
            .map_err(|_| StoreError::Poisoned("memory storage entries"))?
            .remove(key);

        if previous.is_some() {
            self.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: StorageCallback) -> SubscriptionId {
        self.storage.listeners.add(self.context, key, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.storage.listeners.remove(id);
    }
}
