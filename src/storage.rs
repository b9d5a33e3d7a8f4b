//! Persistent key-value store.
//!
//! Values are JSON text keyed by a fixed set of names. Every key loads
//! independently: a missing or malformed value yields that key's default.

use rusqlite::{params, Connection};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Key {
    #[strum(serialize = "tasks")]
    Tasks,
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "notes")]
    Notes,
    #[strum(serialize = "completedSessions")]
    CompletedSessions,
    #[strum(serialize = "totalStudiedSec")]
    TotalStudiedSec,
}

impl Key {
    pub const ALL: [Key; 5] = [
        Key::Tasks,
        Key::Settings,
        Key::Notes,
        Key::CompletedSessions,
        Key::TotalStudiedSec,
    ];
}

pub trait Store {
    fn get_raw(&self, key: Key) -> StoreResult<Option<String>>;
    fn set_raw(&mut self, key: Key, value: &str) -> StoreResult<()>;
    /// Remove every persisted value.
    fn clear(&mut self) -> StoreResult<()>;

    /// Decode `key`, falling back to `default` when the value is missing,
    /// unreadable or malformed.
    fn load<T: DeserializeOwned>(&self, key: Key, default: T) -> T
    where
        Self: Sized,
    {
        match self.get_raw(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(%key, %err, "malformed persisted value, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(err) => {
                tracing::warn!(%key, %err, "failed to read persisted value, using default");
                default
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: Key, value: &T) -> StoreResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }
}

/// SQLite-backed store with a single `kv` table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: PathBuf::from(path),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn get_raw(&self, key: Key) -> StoreResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key.to_string()], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&mut self, key: Key, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key.to_string(), value],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

/// In-process store for tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {
    fn get_raw(&self, key: Key) -> StoreResult<Option<String>> {
        Ok(self.values.get(&key.to_string()).cloned())
    }

    fn set_raw(&mut self, key: Key, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.values.clear();
        Ok(())
    }
}
