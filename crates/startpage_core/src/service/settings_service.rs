//! Search engine and background preferences.
//!
//! # Invariants
//! - A background is validated before any storage access, so the saved
//!   mode always reads back as the mode returned to the caller.

use crate::model::background::{
    resolve_daily_image_url, BackgroundMode, BackgroundValidationError,
};
use crate::model::search::SearchEngine;
use crate::repo::SettingsRepository;
use crate::storage::{SharedStorage, StorageError, StorageResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SettingsServiceError {
    Validation(BackgroundValidationError),
    Storage(StorageError),
}

impl Display for SettingsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<BackgroundValidationError> for SettingsServiceError {
    fn from(value: BackgroundValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for SettingsServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

pub struct SettingsService {
    repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            repo: SettingsRepository::new(storage),
        }
    }

    /// Persisted engine, or `fallback` when none is stored.
    pub async fn search_engine(&self, fallback: SearchEngine) -> StorageResult<SearchEngine> {
        Ok(self.repo.load_search_engine().await?.unwrap_or(fallback))
    }

    pub async fn set_search_engine(&self, engine: SearchEngine) -> StorageResult<()> {
        self.repo.store_search_engine(engine).await?;
        info!("event=settings_engine module=settings status=ok engine={engine}");
        Ok(())
    }

    pub async fn background(&self) -> StorageResult<BackgroundMode> {
        self.repo.load_background().await
    }

    /// Saves `mode` and returns it as it will be loaded again.
    ///
    /// A daily image without a cached URL picks up the stored one.
    pub async fn set_background(
        &self,
        mode: BackgroundMode,
    ) -> Result<BackgroundMode, SettingsServiceError> {
        let mut mode = mode.validated().inspect_err(|err| {
            info!("event=settings_background module=settings status=rejected reason={err}");
        })?;
        if let BackgroundMode::DailyImage { cached_url } = &mut mode {
            if cached_url.is_none() {
                *cached_url = self.repo.load_daily_image_url().await?;
            }
        }

        self.repo.store_background(&mode).await?;
        info!(
            "event=settings_background module=settings status=ok kind={}",
            mode.kind()
        );
        Ok(mode)
    }

    /// Stores the daily image named by an image archive response.
    ///
    /// Returns the resolved URL, or `None` when the response holds no image
    /// (nothing is written then).
    pub async fn record_daily_image(&self, archive_body: &str) -> StorageResult<Option<String>> {
        let Some(url) = resolve_daily_image_url(archive_body) else {
            info!("event=settings_daily_image module=settings status=skipped reason=no_image");
            return Ok(None);
        };
        self.repo.store_daily_image_url(&url).await?;
        Ok(Some(url))
    }
}
