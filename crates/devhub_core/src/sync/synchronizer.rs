//! Store-notification driven reloads of collections and slots.

use crate::model::Entity;
use crate::repo::category_registry::CategoryRegistry;
use crate::repo::collection::EntityCollection;
use crate::repo::user_profile::UserProfile;
use crate::store::{PersistentStore, StorageEvent, SubscriptionId};
use log::{debug, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A reloadable in-memory view of one store key.
pub trait SyncTarget: Send + Sync + 'static {
    fn storage_key(&self) -> String;
    /// Whether memory already reflects the raw value `raw`.
    fn holds(&self, raw: Option<&str>) -> bool;
    /// Re-reads the key from the store.
    fn reload(&self);
}

impl<T: Entity> SyncTarget for EntityCollection<T> {
    fn storage_key(&self) -> String {
        self.key().to_string()
    }

    fn holds(&self, raw: Option<&str>) -> bool {
        self.holds_snapshot(raw)
    }

    fn reload(&self) {
        self.load();
    }
}

impl SyncTarget for CategoryRegistry {
    fn storage_key(&self) -> String {
        self.key().to_string()
    }

    fn holds(&self, raw: Option<&str>) -> bool {
        self.holds_snapshot(raw)
    }

    fn reload(&self) {
        self.load();
    }
}

impl SyncTarget for UserProfile {
    fn storage_key(&self) -> String {
        self.key().to_string()
    }

    fn holds(&self, raw: Option<&str>) -> bool {
        self.holds_value(raw)
    }

    fn reload(&self) {
        self.load();
    }
}

/// Counters describing what the synchronizer did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Notifications that triggered a reload.
    pub reloads: u64,
    /// Notifications skipped because memory already matched.
    pub skipped: u64,
    /// Notifications for keys the target does not own.
    pub ignored: u64,
}

#[derive(Default)]
struct SyncCounters {
    reloads: AtomicU64,
    skipped: AtomicU64,
    ignored: AtomicU64,
}

/// Subscribes watched targets to external changes of their keys.
///
/// Dropping the synchronizer removes every subscription it made.
pub struct CrossTabSynchronizer {
    store: Arc<dyn PersistentStore>,
    subscriptions: Vec<(String, SubscriptionId)>,
    counters: Arc<SyncCounters>,
}

impl CrossTabSynchronizer {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            subscriptions: Vec::new(),
            counters: Arc::new(SyncCounters::default()),
        }
    }

    /// Reloads `target` whenever another context writes its key.
    pub fn watch<S: SyncTarget>(&mut self, target: S) {
        let key = target.storage_key();
        let owned_key = key.clone();
        let counters = Arc::clone(&self.counters);
        let id = self.store.subscribe(
            &key,
            Arc::new(move |event: &StorageEvent| {
                if event.key != owned_key {
                    counters.ignored.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                if target.holds(event.new_value.as_deref()) {
                    counters.skipped.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        "event=sync_reload module=sync status=skip key={} reason=same_snapshot",
                        owned_key
                    );
                    return;
                }
                target.reload();
                counters.reloads.fetch_add(1, Ordering::Relaxed);
                info!(
                    "event=sync_reload module=sync status=ok key={} source={}",
                    owned_key, event.source
                );
            }),
        );
        self.subscriptions.push((key, id));
    }

    /// Keys currently watched, in registration order.
    pub fn watched_keys(&self) -> Vec<&str> {
        self.subscriptions
            .iter()
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            reloads: self.counters.reloads.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
        }
    }
}

impl Drop for CrossTabSynchronizer {
    fn drop(&mut self) {
        for (_, id) in self.subscriptions.drain(..) {
            self.store.unsubscribe(id);
        }
    }
}
