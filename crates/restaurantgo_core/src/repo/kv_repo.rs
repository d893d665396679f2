//! Key-value store for app preferences and small cached state.
//!
//! # Responsibility
//! - Store JSON values under string keys.
//! - Offer an in-memory backend and an SQLite backend for on-device
//!   persistence.
//!
//! # Invariants
//! - Keys are trimmed and must be non-empty.
//! - Values round-trip as JSON; unreadable persisted values surface as
//!   `KvError::InvalidData` from `get` and fall back to the default in
//!   `get_or`.

use crate::db::DbError;
use log::warn;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

#[derive(Debug)]
pub enum KvError {
    InvalidKey(String),
    Serde(serde_json::Error),
    Db(DbError),
    InvalidData { key: String, message: String },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid key: `{key}`"),
            Self::Serde(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid stored value for `{key}`: {message}")
            }
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serde(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for KvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract shared by every key-value backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>>;
    fn set(&mut self, key: &str, value: &Value) -> KvResult<()>;
    /// Returns whether an entry was removed.
    fn remove(&mut self, key: &str) -> KvResult<bool>;
    fn clear(&mut self) -> KvResult<()>;

    /// Returns the stored value, or `default` when the key is missing or
    /// the stored value cannot be read.
    fn get_or(&self, key: &str, default: Value) -> Value {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!("event=kv_get module=kv status=fallback error={err}");
                default
            }
        }
    }

    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| KvError::InvalidData {
                    key: key.trim().to_string(),
                    message: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set_typed<T: Serialize>(&mut self, key: &str, value: &T) -> KvResult<()>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set(key, &value)
    }
}

/// Transient backend; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let key = normalize_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        let key = normalize_key(key)?;
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<bool> {
        let key = normalize_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&mut self) -> KvResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// SQLite backend over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let key = normalize_key(key)?;
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv_entries WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|err| KvError::InvalidData {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        let key = normalize_key(key)?;
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            [key, text.as_str()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<bool> {
        let key = normalize_key(key)?;
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn clear(&mut self) -> KvResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }
}

fn normalize_key(key: &str) -> KvResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}
