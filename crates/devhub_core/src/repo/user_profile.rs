//! Scalar slot holding the active user's display name.
//!
//! The value is stored as a raw string, not JSON.

use crate::store::{PersistentStore, StoreResult};
use log::{error, info};
use std::sync::{Arc, PoisonError, RwLock};

struct ProfileInner {
    key: String,
    store: Arc<dyn PersistentStore>,
    name: RwLock<Option<String>>,
}

/// Shared handle to the display-name slot.
#[derive(Clone)]
pub struct UserProfile {
    inner: Arc<ProfileInner>,
}

impl UserProfile {
    pub fn open(store: Arc<dyn PersistentStore>, key: impl Into<String>) -> Self {
        let profile = Self {
            inner: Arc::new(ProfileInner {
                key: key.into(),
                store,
                name: RwLock::new(None),
            }),
        };
        profile.load();
        profile
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Re-reads the stored name. Blank values count as unset.
    pub fn load(&self) {
        match self.inner.store.get(&self.inner.key) {
            Ok(value) => {
                let name = value
                    .map(|raw| raw.trim().to_string())
                    .filter(|raw| !raw.is_empty());
                *self
                    .inner
                    .name
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = name;
            }
            Err(err) => error!(
                "event=profile_load module=repo status=error key={} error={}",
                self.inner.key, err
            ),
        }
    }

    pub fn name(&self) -> Option<String> {
        self.inner
            .name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// First whitespace-separated word of the display name.
    pub fn first_name(&self) -> Option<String> {
        self.name()
            .and_then(|name| name.split_whitespace().next().map(str::to_string))
    }

    /// Stores a trimmed display name. Returns `false` for blank input.
    pub fn set_name(&self, name: &str) -> StoreResult<bool> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        self.inner.store.set(&self.inner.key, trimmed)?;
        *self
            .inner
            .name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(trimmed.to_string());
        info!(
            "event=profile_set_name module=repo status=ok key={}",
            self.inner.key
        );
        Ok(true)
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.inner.store.remove(&self.inner.key)?;
        *self
            .inner
            .name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    pub fn holds_value(&self, raw: Option<&str>) -> bool {
        let incoming = raw.map(str::trim).filter(|value| !value.is_empty());
        self.name().as_deref() == incoming
    }
}
