use std::{
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::SessionStore;

/// SQLite-backed store: one `kv` table, one row per session key.
///
/// Writes go through `INSERT OR REPLACE`, so set/get are atomic per key.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
              );",
        )
        .context("failed to create kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SessionStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("failed to read key '{key}'"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("failed to write key '{key}'"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("s1").unwrap(), None);

        store.set("s1", r#"{"duration":250}"#).unwrap();
        assert_eq!(
            store.get("s1").unwrap().as_deref(),
            Some(r#"{"duration":250}"#)
        );
    }

    #[test]
    fn test_replace_overwrites_prior_value() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("s1", "a").unwrap();
        store.set("s1", "b").unwrap();
        assert_eq!(store.get("s1").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("s1", r#"{"duration":77}"#).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("s1").unwrap().as_deref(),
            Some(r#"{"duration":77}"#)
        );
    }
}
