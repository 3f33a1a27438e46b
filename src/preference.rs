//! String key-value preferences local to one browsing device.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// Synchronous key-value store shared by every component that remembers
/// something for the visitor.
///
/// Writers are serialized by the caller and the last write wins; there are no
/// transactions.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// A process-local store, used by tests and by hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}
