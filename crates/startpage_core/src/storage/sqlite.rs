//! SQLite-backed storage adapter.
//!
//! # Responsibility
//! - Persist key-value entries as JSON text in `kv_entries`.
//! - Apply each `set` inside one transaction.
//!
//! # Invariants
//! - A stored value that is not valid JSON is reported as `Corrupt`.

use super::{Record, StorageAdapter, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection already bootstrapped by `crate::db`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("sqlite storage lock poisoned".to_string()))
    }

    fn read(&self, keys: &[&str]) -> StorageResult<Record> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM kv_entries WHERE key = ?1;")?;
        let mut record = Record::new();

        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()?;
            let Some(raw) = raw else {
                continue;
            };
            let value = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: (*key).to_string(),
                source,
            })?;
            record.insert((*key).to_string(), value);
        }

        Ok(record)
    }

    fn write(&self, items: &Record) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
            )?;
            for (key, value) in items {
                let encoded = serde_json::to_string(value).map_err(StorageError::Serialization)?;
                stmt.execute(params![key, encoded])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn get(&self, keys: &[&str]) -> StorageResult<Record> {
        let started_at = Instant::now();
        let result = self.read(keys);
        match &result {
            Ok(record) => debug!(
                "event=storage_get module=storage status=ok backend=sqlite requested={} found={} duration_ms={}",
                keys.len(),
                record.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_get module=storage status=error backend=sqlite requested={} error={err}",
                keys.len()
            ),
        }
        result
    }

    async fn set(&self, items: Record) -> StorageResult<()> {
        let started_at = Instant::now();
        let result = self.write(&items);
        match &result {
            Ok(()) => debug!(
                "event=storage_set module=storage status=ok backend=sqlite keys={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=storage_set module=storage status=error backend=sqlite keys={} error={err}",
                items.len()
            ),
        }
        result
    }
}
