//! Whole-collection repository over one storage key.
//!
//! # Invariants
//! - `load` returns the collection exactly as stored (storage order).
//! - `store` replaces the whole collection with a single storage write.
//! - A missing key loads as an empty collection; a malformed one fails.

use crate::storage::{read_json, write_json, SharedStorage, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

pub struct ListRepository<T> {
    storage: SharedStorage,
    key: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: SharedStorage, key: &'static str) -> Self {
        Self {
            storage,
            key,
            _item: PhantomData,
        }
    }

    pub async fn load(&self) -> StorageResult<Vec<T>> {
        Ok(read_json(self.storage.as_ref(), self.key)
            .await?
            .unwrap_or_default())
    }

    pub async fn store(&self, items: &[T]) -> StorageResult<()> {
        write_json(self.storage.as_ref(), self.key, items).await
    }
}
