//! Storage adapter boundary.
//!
//! # Responsibility
//! - Define the async key-value contract every persistence backend fulfils.
//! - Provide typed JSON helpers used by repositories.
//!
//! # Invariants
//! - `get` returns only keys that exist; absent keys are simply missing.
//! - `set` applies the whole partial record or nothing.
//! - Read and write failures surface as `StorageError`; they are never
//!   reported as empty data.

use crate::db::DbError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Partial or full key-value record exchanged with a storage adapter.
pub type Record = Map<String, Value>;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage handle shared by every service of one start page.
pub type SharedStorage = Arc<dyn StorageAdapter>;

/// Keys written by the start page.
pub mod keys {
    pub const TODOS: &str = "todos";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const DEFAULT_SEARCH_ENGINE: &str = "defaultSearchEngine";
    pub const BACKGROUND_TYPE: &str = "backgroundType";
    pub const PRESET_BACKGROUND_ID: &str = "presetBackgroundId";
    pub const BACKGROUND_COLOR: &str = "backgroundColor";
    pub const BACKGROUND_IMAGE: &str = "backgroundImage";
    pub const GRADIENT_COLORS: &str = "gradientColors";
    pub const BING_IMAGE_URL: &str = "bingImageUrl";

    /// Every key making up the persisted background selection.
    pub const BACKGROUND: &[&str] = &[
        BACKGROUND_TYPE,
        PRESET_BACKGROUND_ID,
        BACKGROUND_COLOR,
        BACKGROUND_IMAGE,
        GRADIENT_COLORS,
        BING_IMAGE_URL,
    ];
}

#[derive(Debug)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    Unavailable(String),
    Db(DbError),
    /// A value could not be encoded for writing.
    Serialization(serde_json::Error),
    /// A stored value exists but does not have the expected shape.
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode value: {err}"),
            Self::Corrupt { key, source } => {
                write!(f, "stored value for `{key}` is malformed: {source}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Corrupt { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Asynchronous, eventually consistent key-value store.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Reads the requested keys.
    async fn get(&self, keys: &[&str]) -> StorageResult<Record>;

    /// Writes every entry of `items` in one atomic step.
    async fn set(&self, items: Record) -> StorageResult<()>;
}

/// Reads and decodes one key. A missing key or JSON `null` is `None`.
pub async fn read_json<T: DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &str,
) -> StorageResult<Option<T>> {
    let mut record = storage.get(&[key]).await?;
    match record.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

/// Encodes and writes one key as a single-entry record.
pub async fn write_json<T: Serialize + ?Sized>(
    storage: &dyn StorageAdapter,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let encoded = serde_json::to_value(value).map_err(StorageError::Serialization)?;
    let mut record = Record::new();
    record.insert(key.to_string(), encoded);
    storage.set(record).await
}
