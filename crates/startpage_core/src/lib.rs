//! Core logic of the start page: todos, bookmarks, search dispatch and
//! background selection, persisted through an async key-value store.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::background::{
    BackgroundKind, BackgroundMode, BackgroundValidationError, PresetBackground,
    DAILY_IMAGE_ARCHIVE_URL, PRESET_BACKGROUNDS,
};
pub use model::bookmark::{Bookmark, BookmarkValidationError};
pub use model::browser_bookmarks::{project_panel, BookmarkNode, BookmarkTreeError, PanelEntry, PanelLink};
pub use model::search::{dispatch, SearchEngine, SearchTarget};
pub use model::todo::{derive_status, Timestamp, Todo, TodoDraft, TodoStatus, ValidationError};
pub use service::bookmark_service::{BookmarkService, BookmarkServiceError};
pub use service::confirm::{Confirm, Preconfirmed};
pub use service::settings_service::{SettingsService, SettingsServiceError};
pub use service::start_page::StartPage;
pub use service::todo_service::{TodoEntry, TodoList, TodoService, TodoServiceError};
pub use storage::{MemoryStorage, Record, SharedStorage, SqliteStorage, StorageAdapter, StorageError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
