//! Application state for one open start page.
//!
//! # Responsibility
//! - Own the services sharing one storage handle and clock.
//! - Hold the selected search engine and background explicitly.
//!
//! # Invariants
//! - Persisted preferences are the source of truth on open and refresh.
//! - A preference changes in memory only after storage accepted it.

use crate::clock::Clock;
use crate::model::background::BackgroundMode;
use crate::model::search::{dispatch, SearchEngine, SearchTarget};
use crate::service::bookmark_service::BookmarkService;
use crate::service::settings_service::{SettingsService, SettingsServiceError};
use crate::service::todo_service::TodoService;
use crate::storage::{SharedStorage, StorageResult};
use std::sync::Arc;

pub struct StartPage {
    todos: TodoService,
    bookmarks: BookmarkService,
    settings: SettingsService,
    default_engine: SearchEngine,
    engine: SearchEngine,
    background: BackgroundMode,
}

impl StartPage {
    /// Builds the page state and loads persisted preferences.
    ///
    /// `default_engine` applies only while no engine has been saved.
    pub async fn open(
        storage: SharedStorage,
        clock: Arc<dyn Clock>,
        default_engine: SearchEngine,
    ) -> StorageResult<Self> {
        let mut page = Self {
            todos: TodoService::new(Arc::clone(&storage), clock),
            bookmarks: BookmarkService::new(Arc::clone(&storage)),
            settings: SettingsService::new(storage),
            default_engine,
            engine: default_engine,
            background: BackgroundMode::default(),
        };
        page.refresh().await?;
        Ok(page)
    }

    /// Reloads preferences, e.g. after another device synced new values.
    pub async fn refresh(&mut self) -> StorageResult<()> {
        self.engine = self.settings.search_engine(self.default_engine).await?;
        self.background = self.settings.background().await?;
        Ok(())
    }

    pub fn todos(&self) -> &TodoService {
        &self.todos
    }

    pub fn bookmarks(&self) -> &BookmarkService {
        &self.bookmarks
    }

    pub fn search_engine(&self) -> SearchEngine {
        self.engine
    }

    pub async fn select_search_engine(&mut self, engine: SearchEngine) -> StorageResult<()> {
        self.settings.set_search_engine(engine).await?;
        self.engine = engine;
        Ok(())
    }

    /// Resolves search box input against the selected engine.
    pub fn search(&self, text: &str) -> Option<SearchTarget> {
        dispatch(text, self.engine)
    }

    pub fn background(&self) -> &BackgroundMode {
        &self.background
    }

    pub fn background_css(&self) -> String {
        self.background.css_value()
    }

    /// Validates and saves `mode`; the page keeps the previous background on
    /// any error.
    pub async fn set_background(
        &mut self,
        mode: BackgroundMode,
    ) -> Result<(), SettingsServiceError> {
        self.background = self.settings.set_background(mode).await?;
        Ok(())
    }

    /// Records a fresh daily image from an image archive response.
    ///
    /// The cached URL is always stored; the visible background only changes
    /// while the daily image mode is selected.
    pub async fn apply_daily_image(&mut self, archive_body: &str) -> StorageResult<()> {
        let Some(url) = self.settings.record_daily_image(archive_body).await? else {
            return Ok(());
        };
        if let BackgroundMode::DailyImage { cached_url } = &mut self.background {
            *cached_url = Some(url);
        }
        Ok(())
    }
}
