// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent client-side key/value storage (the browser's `localStorage`).

use dashmap::DashMap;
use std::sync::Arc;

/// Storage keys used by the session.
pub mod keys {
    pub const DISCLAIMER_ACCEPTED: &str = "disclaimerAccepted";
    pub const LANGUAGE: &str = "language";
    pub const DATA_STALE: &str = "dataStale";
}

/// Client storage capability.
pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage, for tests and non-browser hosts.
#[derive(Default)]
pub struct MemoryStorage {
    values: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.remove(key);
    }
}

/// Typed view over the flags the session keeps in client storage.
#[derive(Clone)]
pub struct SessionStorage {
    inner: Arc<dyn ClientStorage>,
    default_language: String,
}

impl SessionStorage {
    pub fn new(inner: Arc<dyn ClientStorage>, default_language: &str) -> Self {
        Self {
            inner,
            default_language: default_language.to_string(),
        }
    }

    pub fn disclaimer_accepted(&self) -> bool {
        self.flag(keys::DISCLAIMER_ACCEPTED)
    }

    pub fn accept_disclaimer(&self) {
        self.inner.set(keys::DISCLAIMER_ACCEPTED, "true");
    }

    /// Preferred language, falling back to the configured default.
    pub fn language(&self) -> String {
        self.inner
            .get(keys::LANGUAGE)
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_language.clone())
    }

    pub fn set_language(&self, language: &str) {
        self.inner.set(keys::LANGUAGE, &language.to_ascii_lowercase());
    }

    /// Whether the next countries load must go to the live API first.
    pub fn data_stale(&self) -> bool {
        self.flag(keys::DATA_STALE)
    }

    pub fn set_data_stale(&self, stale: bool) {
        if stale {
            self.inner.set(keys::DATA_STALE, "true");
        } else {
            self.inner.remove(keys::DATA_STALE);
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.inner.get(key).is_some_and(|v| v == "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_and_language() {
        let storage = SessionStorage::new(Arc::new(MemoryStorage::new()), "en");
        assert!(!storage.disclaimer_accepted());
        assert_eq!(storage.language(), "en");

        storage.accept_disclaimer();
        storage.set_language("DE");
        storage.set_data_stale(true);
        assert!(storage.disclaimer_accepted());
        assert_eq!(storage.language(), "de");
        assert!(storage.data_stale());

        storage.set_data_stale(false);
        assert!(!storage.data_stale());
    }
}
