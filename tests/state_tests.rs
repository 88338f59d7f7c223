use std::collections::HashMap;

use feedsync::{KvStore, LocalState, KEY_FAVORITES, KEY_FEEDS, KEY_READ};

type Overlay = HashMap<String, Vec<String>>;

#[tokio::test]
async fn empty_storage_loads_exactly_the_default_feed_and_persists_it() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;

    let feeds = state.list_feeds().await;
    assert_eq!(feeds.len(), 1);
    assert_eq!(feeds[0].id, "nasa");
    assert_eq!(feeds[0].name, "NASA Breaking News");

    // The seeded registry must have been written back.
    let persisted: Vec<feedsync::Feed> = store.get(KEY_FEEDS).await;
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, "nasa");
}

#[tokio::test]
async fn loading_twice_never_duplicates_the_default_feed() {
    let store = KvStore::in_memory();
    let first = LocalState::load(store.clone()).await;
    first.add_feed("Test", "https://example.com/rss").await;

    let second = LocalState::load(store.clone()).await;
    let feeds = second.list_feeds().await;
    assert_eq!(feeds.len(), 2);
    assert_eq!(feeds.iter().filter(|f| f.id == "nasa").count(), 1);

    let third = LocalState::load(store).await;
    assert_eq!(third.list_feeds().await.len(), 2);
}

#[tokio::test]
async fn duplicate_ids_collapse_to_the_first_occurrence_on_load() {
    let store = KvStore::in_memory();
    let duplicated = vec![
        feedsync::Feed {
            id: "dup".into(),
            name: "First".into(),
            url: "https://example.com/a".into(),
            created_at: chrono::Utc::now(),
        },
        feedsync::Feed {
            id: "dup".into(),
            name: "Second".into(),
            url: "https://example.com/b".into(),
            created_at: chrono::Utc::now(),
        },
    ];
    store.set(KEY_FEEDS, &duplicated).await;

    let state = LocalState::load(store).await;
    let feeds = state.list_feeds().await;
    let dups: Vec<_> = feeds.iter().filter(|f| f.id == "dup").collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].name, "First");
}

#[tokio::test]
async fn mark_read_is_idempotent_in_the_persisted_overlay() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;

    state.mark_read("nasa", "guid-1").await;
    state.mark_read("nasa", "guid-1").await;

    let overlay: Overlay = store.get(KEY_READ).await;
    let guids = &overlay["nasa"];
    assert_eq!(guids.iter().filter(|g| *g == "guid-1").count(), 1);
    assert!(state.is_read("nasa", "guid-1").await);
    assert!(!state.is_read("nasa", "guid-2").await);
}

#[tokio::test]
async fn read_state_survives_a_reload() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;
    state.mark_read("nasa", "guid-1").await;

    let reloaded = LocalState::load(store).await;
    assert!(reloaded.is_read("nasa", "guid-1").await);
}

#[tokio::test]
async fn toggle_favorite_is_its_own_inverse() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;

    assert!(state.toggle_favorite("nasa", "guid-1").await);
    assert!(state.is_favorite("nasa", "guid-1").await);

    assert!(!state.toggle_favorite("nasa", "guid-1").await);
    assert!(!state.is_favorite("nasa", "guid-1").await);

    let overlay: Overlay = store.get(KEY_FAVORITES).await;
    assert!(overlay.get("nasa").map(Vec::is_empty).unwrap_or(true));
}

#[tokio::test]
async fn remove_favorite_only_removes() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store).await;

    // No-op on a non-favorite.
    state.remove_favorite("nasa", "guid-1").await;
    assert!(!state.is_favorite("nasa", "guid-1").await);

    state.toggle_favorite("nasa", "guid-1").await;
    state.remove_favorite("nasa", "guid-1").await;
    assert!(!state.is_favorite("nasa", "guid-1").await);
}

#[tokio::test]
async fn deleting_a_feed_cascades_into_both_overlays() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;

    let feed = state.add_feed("Test", "https://example.com/rss").await;
    state.mark_read(&feed.id, "guid-1").await;
    state.toggle_favorite(&feed.id, "guid-2").await;
    state.mark_read("nasa", "guid-3").await;

    state.delete_feed(&feed.id).await;

    let feeds = state.list_feeds().await;
    assert!(feeds.iter().all(|f| f.id != feed.id));

    let read: Overlay = store.get(KEY_READ).await;
    assert!(!read.contains_key(&feed.id));
    // Sibling feeds keep their overlay entries.
    assert!(read.contains_key("nasa"));

    let favorites: Overlay = store.get(KEY_FAVORITES).await;
    assert!(!favorites.contains_key(&feed.id));
}

#[tokio::test]
async fn deleting_an_unknown_feed_is_a_noop() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store.clone()).await;
    state.mark_read("nasa", "guid-1").await;

    state.delete_feed("no-such-feed").await;

    assert_eq!(state.list_feeds().await.len(), 1);
    let read: Overlay = store.get(KEY_READ).await;
    assert!(read.contains_key("nasa"));
}

#[tokio::test]
async fn update_feed_replaces_by_id() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store).await;

    let mut feed = state.add_feed("Test", "https://example.com/rss").await;
    feed.name = "Renamed".into();
    assert!(state.update_feed(feed.clone()).await);
    assert_eq!(state.feed(&feed.id).await.unwrap().name, "Renamed");

    feed.id = "no-such-feed".into();
    assert!(!state.update_feed(feed).await);
}

#[tokio::test]
async fn add_feed_generates_unique_ids_and_timestamps() {
    let store = KvStore::in_memory();
    let state = LocalState::load(store).await;

    let a = state.add_feed("A", "https://example.com/a").await;
    let b = state.add_feed("B", "https://example.com/b").await;
    assert_ne!(a.id, b.id);
    assert_eq!(state.list_feeds().await.len(), 3);
}
