//! Persistence of start page preferences.
//!
//! # Responsibility
//! - Read and write the selected search engine.
//! - Reconcile the flat background record into one `BackgroundMode`.
//!
//! # Invariants
//! - Loading a preference never fails on unknown or malformed values; it
//!   falls back instead. Storage transport errors still propagate.
//! - Saving a background writes the discriminant and that variant's field
//!   only, so other variants keep their last values.

use crate::model::background::{preset_by_id, BackgroundKind, BackgroundMode};
use crate::model::search::SearchEngine;
use crate::storage::{keys, Record, SharedStorage, StorageResult};
use log::warn;
use serde_json::Value;

pub struct SettingsRepository {
    storage: SharedStorage,
}

impl SettingsRepository {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Persisted engine, or `None` when unset or unknown.
    pub async fn load_search_engine(&self) -> StorageResult<Option<SearchEngine>> {
        let record = self.storage.get(&[keys::DEFAULT_SEARCH_ENGINE]).await?;
        let engine = match record.get(keys::DEFAULT_SEARCH_ENGINE) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => {
                let engine = SearchEngine::from_id(id);
                if engine.is_none() {
                    warn!("event=settings_load module=settings status=fallback key=defaultSearchEngine reason=unknown_engine");
                }
                engine
            }
            Some(_) => {
                warn!("event=settings_load module=settings status=fallback key=defaultSearchEngine reason=not_a_string");
                None
            }
        };
        Ok(engine)
    }

    pub async fn store_search_engine(&self, engine: SearchEngine) -> StorageResult<()> {
        let mut record = Record::new();
        record.insert(
            keys::DEFAULT_SEARCH_ENGINE.to_string(),
            Value::String(engine.id().to_string()),
        );
        self.storage.set(record).await
    }

    pub async fn load_background(&self) -> StorageResult<BackgroundMode> {
        let record = self.storage.get(keys::BACKGROUND).await?;
        Ok(reconcile_background(&record))
    }

    pub async fn store_background(&self, mode: &BackgroundMode) -> StorageResult<()> {
        self.storage.set(background_record(mode)).await
    }

    /// Last resolved daily image, if any.
    pub async fn load_daily_image_url(&self) -> StorageResult<Option<String>> {
        let record = self.storage.get(&[keys::BING_IMAGE_URL]).await?;
        Ok(non_empty_str(&record, keys::BING_IMAGE_URL))
    }

    /// Remembers the last resolved daily image without changing the mode.
    pub async fn store_daily_image_url(&self, url: &str) -> StorageResult<()> {
        let mut record = Record::new();
        record.insert(
            keys::BING_IMAGE_URL.to_string(),
            Value::String(url.to_string()),
        );
        self.storage.set(record).await
    }
}

/// Picks the background variant named by `backgroundType`.
///
/// A variant whose data is missing or malformed degrades to the daily
/// image; preset mode without a known id uses the first preset.
pub fn reconcile_background(record: &Record) -> BackgroundMode {
    let daily = || BackgroundMode::DailyImage {
        cached_url: non_empty_str(record, keys::BING_IMAGE_URL),
    };

    let kind = record
        .get(keys::BACKGROUND_TYPE)
        .and_then(Value::as_str)
        .and_then(BackgroundKind::parse)
        .unwrap_or(BackgroundKind::DailyImage);

    match kind {
        BackgroundKind::DailyImage => daily(),
        BackgroundKind::Preset => non_empty_str(record, keys::PRESET_BACKGROUND_ID)
            .filter(|id| preset_by_id(id).is_some())
            .map(|id| BackgroundMode::Preset { id })
            .unwrap_or_else(BackgroundMode::first_preset),
        BackgroundKind::Color => non_empty_str(record, keys::BACKGROUND_COLOR)
            .map(|color| BackgroundMode::Color { color })
            .unwrap_or_else(daily),
        BackgroundKind::Image => non_empty_str(record, keys::BACKGROUND_IMAGE)
            .map(|data_url| BackgroundMode::Image { data_url })
            .unwrap_or_else(daily),
        BackgroundKind::Gradient => gradient_pair(record)
            .map(|(from, to)| BackgroundMode::Gradient { from, to })
            .unwrap_or_else(daily),
    }
}

/// Partial record persisting `mode`.
pub fn background_record(mode: &BackgroundMode) -> Record {
    let mut record = Record::new();
    record.insert(
        keys::BACKGROUND_TYPE.to_string(),
        Value::String(mode.kind().as_str().to_string()),
    );

    let mut put = |key: &str, value: Value| {
        record.insert(key.to_string(), value);
    };
    match mode {
        BackgroundMode::DailyImage { cached_url } => {
            if let Some(url) = cached_url {
                put(keys::BING_IMAGE_URL, Value::String(url.clone()));
            }
        }
        BackgroundMode::Preset { id } => put(keys::PRESET_BACKGROUND_ID, Value::String(id.clone())),
        BackgroundMode::Color { color } => put(keys::BACKGROUND_COLOR, Value::String(color.clone())),
        BackgroundMode::Image { data_url } => {
            put(keys::BACKGROUND_IMAGE, Value::String(data_url.clone()))
        }
        BackgroundMode::Gradient { from, to } => put(
            keys::GRADIENT_COLORS,
            Value::Array(vec![Value::String(from.clone()), Value::String(to.clone())]),
        ),
    }
    record
}

fn non_empty_str(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn gradient_pair(record: &Record) -> Option<(String, String)> {
    let colors = record.get(keys::GRADIENT_COLORS)?.as_array()?;
    match colors.as_slice() {
        [Value::String(from), Value::String(to)] => Some((from.clone(), to.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_type_is_daily_image_with_cache() {
        let mode = reconcile_background(&record(json!({ "bingImageUrl": "https://img/a.jpg" })));
        assert_eq!(
            mode,
            BackgroundMode::DailyImage {
                cached_url: Some("https://img/a.jpg".to_string())
            }
        );
    }

    #[test]
    fn variants_fall_back_when_their_data_is_missing() {
        assert_eq!(
            reconcile_background(&record(json!({ "backgroundType": "color" }))),
            BackgroundMode::default()
        );
        assert_eq!(
            reconcile_background(&record(
                json!({ "backgroundType": "gradient", "gradientColors": ["#fff"] })
            )),
            BackgroundMode::default()
        );
        assert_eq!(
            reconcile_background(&record(
                json!({ "backgroundType": "preset", "presetBackgroundId": "gone" })
            )),
            BackgroundMode::first_preset()
        );
        assert_eq!(
            reconcile_background(&record(json!({ "backgroundType": "aurora" }))),
            BackgroundMode::default()
        );
    }

    #[test]
    fn record_contains_only_the_selected_variant() {
        let written = background_record(&BackgroundMode::Gradient {
            from: "#111".to_string(),
            to: "#222".to_string(),
        });
        assert_eq!(
            Value::Object(written.clone()),
            json!({ "backgroundType": "gradient", "gradientColors": ["#111", "#222"] })
        );
        assert_eq!(
            reconcile_background(&written),
            BackgroundMode::Gradient {
                from: "#111".to_string(),
                to: "#222".to_string(),
            }
        );
    }
}
