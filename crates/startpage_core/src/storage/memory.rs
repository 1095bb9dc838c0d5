//! In-process storage adapter.
//!
//! Used for ephemeral sessions and tests. Failure switches let callers
//! exercise the error paths of services.

use super::{Record, StorageAdapter, StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Record>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing record, e.g. data synced from another device.
    pub fn with_record(record: Record) -> Self {
        Self {
            entries: Mutex::new(record),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> StorageResult<Record> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Record>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> StorageResult<Record> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read failure injected".to_string()));
        }

        let entries = self.lock()?;
        Ok(keys
            .iter()
            .filter_map(|key| {
                entries
                    .get(*key)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect())
    }

    async fn set(&self, items: Record) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write failure injected".to_string()));
        }

        let mut entries = self.lock()?;
        entries.extend(items);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
