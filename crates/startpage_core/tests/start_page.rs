use serde_json::json;
use startpage_core::{
    BackgroundMode, BackgroundValidationError, BookmarkServiceError, BookmarkValidationError,
    FixedClock, MemoryStorage, Record, SearchEngine, SearchTarget, SettingsServiceError,
    SharedStorage, StartPage, StorageAdapter, TodoDraft,
};
use std::sync::Arc;

async fn open(storage: &Arc<MemoryStorage>, default_engine: SearchEngine) -> StartPage {
    let shared: SharedStorage = storage.clone();
    StartPage::open(shared, Arc::new(FixedClock::new(0)), default_engine)
        .await
        .unwrap()
}

#[tokio::test]
async fn engine_defaults_then_persists_selection() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Google).await;
    assert_eq!(page.search_engine(), SearchEngine::Google);

    page.select_search_engine(SearchEngine::Baidu).await.unwrap();
    assert_eq!(
        page.search("rust"),
        Some(SearchTarget::Query {
            engine: SearchEngine::Baidu,
            url: "https://www.baidu.com/s?wd=rust".to_string(),
        })
    );

    let reopened = open(&storage, SearchEngine::Google).await;
    assert_eq!(reopened.search_engine(), SearchEngine::Baidu);
    let record = storage.get(&["defaultSearchEngine"]).await.unwrap();
    assert_eq!(record["defaultSearchEngine"], json!("baidu"));
}

#[tokio::test]
async fn unknown_persisted_engine_uses_default() {
    let mut record = Record::new();
    record.insert("defaultSearchEngine".to_string(), json!("altavista"));
    let storage = Arc::new(MemoryStorage::with_record(record));

    let page = open(&storage, SearchEngine::Yahoo).await;
    assert_eq!(page.search_engine(), SearchEngine::Yahoo);
}

#[tokio::test]
async fn failed_engine_write_keeps_previous_selection() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Bing).await;

    storage.fail_writes(true);
    assert!(page.select_search_engine(SearchEngine::Google).await.is_err());
    assert_eq!(page.search_engine(), SearchEngine::Bing);
}

#[tokio::test]
async fn background_switches_restore_previous_variant_data() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Bing).await;
    assert_eq!(page.background(), &BackgroundMode::default());

    page.set_background(BackgroundMode::Color {
        color: "#102030".to_string(),
    })
    .await
    .unwrap();
    page.set_background(BackgroundMode::Gradient {
        from: "#000000".to_string(),
        to: "#ffffff".to_string(),
    })
    .await
    .unwrap();
    assert_eq!(
        page.background_css(),
        "linear-gradient(135deg, #000000 0%, #ffffff 100%)"
    );

    // Switching the discriminant back finds the stored color again.
    let mut record = Record::new();
    record.insert("backgroundType".to_string(), json!("color"));
    storage.set(record).await.unwrap();
    page.refresh().await.unwrap();
    assert_eq!(page.background_css(), "#102030");
}

#[tokio::test]
async fn saved_backgrounds_read_back_unchanged() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Bing).await;
    page.apply_daily_image(r#"{"images":[{"url":"/th?id=OHR.Lake.jpg"}]}"#)
        .await
        .unwrap();

    let modes = vec![
        BackgroundMode::Color {
            color: " #abcdef ".to_string(),
        },
        BackgroundMode::Preset {
            id: "preset3".to_string(),
        },
        BackgroundMode::Image {
            data_url: "data:image/png;base64,AAAA".to_string(),
        },
        BackgroundMode::Gradient {
            from: "#000000".to_string(),
            to: "#ffffff".to_string(),
        },
        BackgroundMode::DailyImage { cached_url: None },
    ];
    for mode in modes {
        page.set_background(mode).await.unwrap();
        let saved = page.background().clone();
        page.refresh().await.unwrap();
        assert_eq!(page.background(), &saved);
    }

    assert_eq!(
        page.background(),
        &BackgroundMode::DailyImage {
            cached_url: Some("https://www.bing.com/th?id=OHR.Lake.jpg".to_string())
        }
    );
}

#[tokio::test]
async fn unrestorable_backgrounds_are_rejected_before_writing() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Bing).await;
    page.set_background(BackgroundMode::Color {
        color: "#102030".to_string(),
    })
    .await
    .unwrap();
    let before = storage.write_count();

    let err = page
        .set_background(BackgroundMode::Preset {
            id: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SettingsServiceError::Validation(BackgroundValidationError::UnknownPreset(ref id)) if id == "nope"
    ));
    assert!(matches!(
        page.set_background(BackgroundMode::Color {
            color: "  ".to_string()
        })
        .await,
        Err(SettingsServiceError::Validation(
            BackgroundValidationError::MissingColor
        ))
    ));

    assert_eq!(storage.write_count(), before);
    assert_eq!(page.background_css(), "#102030");
    page.refresh().await.unwrap();
    assert_eq!(page.background_css(), "#102030");
}

#[tokio::test]
async fn daily_image_updates_cache_and_active_background() {
    let storage = Arc::new(MemoryStorage::new());
    let mut page = open(&storage, SearchEngine::Bing).await;

    page.apply_daily_image(r#"{"images":[{"url":"/th?id=OHR.Fjord.jpg"}]}"#)
        .await
        .unwrap();
    assert_eq!(page.background_css(), "url(https://www.bing.com/th?id=OHR.Fjord.jpg)");

    page.set_background(BackgroundMode::first_preset()).await.unwrap();
    page.apply_daily_image(r#"{"images":[{"url":"/th?id=OHR.Dunes.jpg"}]}"#)
        .await
        .unwrap();
    assert!(matches!(page.background(), BackgroundMode::Preset { .. }));

    let record = storage.get(&["bingImageUrl"]).await.unwrap();
    assert_eq!(
        record["bingImageUrl"],
        json!("https://www.bing.com/th?id=OHR.Dunes.jpg")
    );

    let before = storage.write_count();
    page.apply_daily_image("not json").await.unwrap();
    assert_eq!(storage.write_count(), before);
}

#[tokio::test]
async fn bookmarks_append_and_remove_by_index() {
    let storage = Arc::new(MemoryStorage::new());
    let page = open(&storage, SearchEngine::Bing).await;
    let bookmarks = page.bookmarks();

    bookmarks.add("Docs", "docs.rs").await.unwrap();
    bookmarks.add("Crates", "https://crates.io").await.unwrap();
    bookmarks.add("Blog", "http://blog.example").await.unwrap();

    let removed = bookmarks.remove(1).await.unwrap();
    assert_eq!(removed.url, "https://crates.io");

    let names = bookmarks
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|bookmark| bookmark.url)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["https://docs.rs", "http://blog.example"]);

    assert!(matches!(
        bookmarks.remove(2).await,
        Err(BookmarkServiceError::NotFound { index: 2, len: 2 })
    ));
    assert!(matches!(
        bookmarks.add("  ", "x.io").await,
        Err(BookmarkServiceError::Validation(
            BookmarkValidationError::MissingName
        ))
    ));
}

#[tokio::test]
async fn services_share_one_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let page = open(&storage, SearchEngine::Bing).await;

    page.todos().save(TodoDraft::new("water plants"), None).await.unwrap();
    page.bookmarks().add("News", "news.example").await.unwrap();

    let record = storage.snapshot().unwrap();
    assert_eq!(record["todos"].as_array().map(Vec::len), Some(1));
    assert_eq!(record["bookmarks"][0]["name"], json!("News"));
}
