//! Personal bookmark grid service.
//!
//! Same whole-list, single-writer pattern as the todo service; there is no
//! derived state beyond favicon URLs.

use crate::model::bookmark::{Bookmark, BookmarkValidationError};
use crate::repo::ListRepository;
use crate::storage::{keys, SharedStorage, StorageError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::Mutex;

#[derive(Debug)]
pub enum BookmarkServiceError {
    Validation(BookmarkValidationError),
    NotFound { index: usize, len: usize },
    Storage(StorageError),
}

impl Display for BookmarkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { index, len } => {
                write!(f, "bookmark not found at index {index} (grid has {len})")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookmarkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<BookmarkValidationError> for BookmarkServiceError {
    fn from(value: BookmarkValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for BookmarkServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

pub struct BookmarkService {
    repo: ListRepository<Bookmark>,
    writer: Mutex<()>,
}

impl BookmarkService {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            repo: ListRepository::new(storage, keys::BOOKMARKS),
            writer: Mutex::new(()),
        }
    }

    /// Appends a bookmark built from raw form input.
    pub async fn add(
        &self,
        name: &str,
        url: &str,
    ) -> Result<Bookmark, BookmarkServiceError> {
        let bookmark = Bookmark::new(name, url)?;

        let _writer = self.writer.lock().await;
        let mut bookmarks = self.repo.load().await?;
        bookmarks.push(bookmark.clone());
        if let Err(err) = self.repo.store(&bookmarks).await {
            error!("event=bookmark_add module=bookmark status=error error={err}");
            return Err(err.into());
        }

        info!(
            "event=bookmark_add module=bookmark status=ok index={}",
            bookmarks.len() - 1
        );
        Ok(bookmark)
    }

    /// Removes and returns the bookmark at `index`.
    pub async fn remove(&self, index: usize) -> Result<Bookmark, BookmarkServiceError> {
        let _writer = self.writer.lock().await;
        let mut bookmarks = self.repo.load().await?;
        let len = bookmarks.len();
        if index >= len {
            return Err(BookmarkServiceError::NotFound { index, len });
        }

        let removed = bookmarks.remove(index);
        if let Err(err) = self.repo.store(&bookmarks).await {
            error!("event=bookmark_remove module=bookmark status=error index={index} error={err}");
            return Err(err.into());
        }

        info!("event=bookmark_remove module=bookmark status=ok index={index}");
        Ok(removed)
    }

    /// Bookmarks in grid (insertion) order.
    pub async fn list(&self) -> Result<Vec<Bookmark>, BookmarkServiceError> {
        Ok(self.repo.load().await?)
    }
}
