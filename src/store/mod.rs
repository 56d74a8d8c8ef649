//! Durable key-value seam backing session persistence.
//!
//! The tracker only needs atomic get/set of a string per key; everything else
//! (schema, file layout) is the backend's business.

use std::{collections::HashMap, sync::RwLock};

use anyhow::Result;

mod sqlite;

pub use sqlite::SqliteStore;

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store. Nothing survives a restart; intended for tests and
/// hosts that do their own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("s1").unwrap(), None);

        store.set("s1", r#"{"duration":5}"#).unwrap();
        assert_eq!(store.get("s1").unwrap().as_deref(), Some(r#"{"duration":5}"#));

        store.set("s1", r#"{"duration":9}"#).unwrap();
        assert_eq!(store.get("s1").unwrap().as_deref(), Some(r#"{"duration":9}"#));
    }
}
