use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::fetch::{self, FetchConfig};
use crate::models::{Article, Feed};
use crate::storage::KvStore;

pub const KEY_FEEDS: &str = "feeds";
pub const KEY_READ: &str = "readArticles";
pub const KEY_FAVORITES: &str = "favorites";

/// Overlay shape shared by read state and favorites: feed id to an
/// insertion-ordered list of article guids with set semantics. Persisted
/// as plain JSON maps of string arrays, matching the historical layout of
/// the `readArticles` and `favorites` keys.
type Overlay = HashMap<String, Vec<String>>;

/// The one state container for the whole sync layer: feed registry,
/// read/favorite overlays, and the in-session article map. All mutation
/// goes through its methods; every mutation persists through the backing
/// [`KvStore`] before returning.
///
/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct LocalState {
    store: KvStore,
    feeds: Arc<RwLock<Vec<Feed>>>,
    read: Arc<RwLock<Overlay>>,
    favorites: Arc<RwLock<Overlay>>,
    articles: Arc<RwLock<HashMap<String, Vec<Article>>>>,
}

impl LocalState {
    /// Load persisted state from the store. Seeds the default feed if its
    /// id is absent, collapses duplicate ids (first occurrence wins), and
    /// persists the merged registry back.
    pub async fn load(store: KvStore) -> Self {
        let mut feeds: Vec<Feed> = store.get(KEY_FEEDS).await;

        let default_feed = Feed::default_feed();
        if !feeds.iter().any(|f| f.id == default_feed.id) {
            feeds.push(default_feed);
        }

        let mut seen = std::collections::HashSet::new();
        feeds.retain(|f| seen.insert(f.id.clone()));

        store.set(KEY_FEEDS, &feeds).await;

        let read: Overlay = store.get(KEY_READ).await;
        let favorites: Overlay = store.get(KEY_FAVORITES).await;

        Self {
            store,
            feeds: Arc::new(RwLock::new(feeds)),
            read: Arc::new(RwLock::new(read)),
            favorites: Arc::new(RwLock::new(favorites)),
            articles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn list_feeds(&self) -> Vec<Feed> {
        self.feeds.read().await.clone()
    }

    pub async fn feed(&self, feed_id: &str) -> Option<Feed> {
        self.feeds
            .read()
            .await
            .iter()
            .find(|f| f.id == feed_id)
            .cloned()
    }

    /// Register a new feed with a fresh id and the current timestamp.
    /// Field and remote validation happen in the form layer before this
    /// is called.
    pub async fn add_feed(&self, name: &str, url: &str) -> Feed {
        let feed = Feed {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            url: url.to_owned(),
            created_at: Utc::now(),
        };
        {
            let mut feeds = self.feeds.write().await;
            feeds.push(feed.clone());
        }
        self.persist_feeds().await;
        feed
    }

    /// Replace the feed with a matching id. Returns false (and persists
    /// nothing) when the id is unknown.
    pub async fn update_feed(&self, updated: Feed) -> bool {
        let replaced = {
            let mut feeds = self.feeds.write().await;
            match feeds.iter_mut().find(|f| f.id == updated.id) {
                Some(slot) => {
                    *slot = updated;
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.persist_feeds().await;
        }
        replaced
    }

    /// Remove a feed and cascade-delete its overlay entries. The three
    /// writes are sequenced (feeds, then read state, then favorites); the
    /// store gives no cross-key atomicity, so each write must leave a
    /// self-consistent value on its own.
    pub async fn delete_feed(&self, feed_id: &str) {
        {
            let mut feeds = self.feeds.write().await;
            feeds.retain(|f| f.id != feed_id);
        }
        self.persist_feeds().await;

        {
            let mut articles = self.articles.write().await;
            articles.remove(feed_id);
        }

        {
            let mut read = self.read.write().await;
            read.remove(feed_id);
        }
        self.persist_read().await;

        {
            let mut favorites = self.favorites.write().await;
            favorites.remove(feed_id);
        }
        self.persist_favorites().await;
    }

    /// Idempotently mark an article read. The read set only grows; there
    /// is no reverse operation. Also flips the `read` flag on the
    /// in-session article so the current view updates without a refetch.
    pub async fn mark_read(&self, feed_id: &str, guid: &str) {
        let inserted = {
            let mut read = self.read.write().await;
            let guids = read.entry(feed_id.to_owned()).or_default();
            if guids.iter().any(|g| g == guid) {
                false
            } else {
                guids.push(guid.to_owned());
                true
            }
        };
        if inserted {
            self.persist_read().await;
        } else {
            debug!(feed_id, guid, "article already marked read");
        }

        let mut articles = self.articles.write().await;
        if let Some(list) = articles.get_mut(feed_id) {
            for article in list.iter_mut().filter(|a| a.guid == guid) {
                article.read = true;
            }
        }
    }

    pub async fn is_read(&self, feed_id: &str, guid: &str) -> bool {
        self.read
            .read()
            .await
            .get(feed_id)
            .map(|guids| guids.iter().any(|g| g == guid))
            .unwrap_or(false)
    }

    /// Flip favorite membership for an article. Returns the new
    /// membership state.
    pub async fn toggle_favorite(&self, feed_id: &str, guid: &str) -> bool {
        let now_favorite = {
            let mut favorites = self.favorites.write().await;
            let guids = favorites.entry(feed_id.to_owned()).or_default();
            match guids.iter().position(|g| g == guid) {
                Some(index) => {
                    guids.remove(index);
                    false
                }
                None => {
                    guids.push(guid.to_owned());
                    true
                }
            }
        };
        self.persist_favorites().await;
        now_favorite
    }

    /// Remove-only variant used by the favorites screen; never adds.
    pub async fn remove_favorite(&self, feed_id: &str, guid: &str) {
        let removed = {
            let mut favorites = self.favorites.write().await;
            match favorites.get_mut(feed_id) {
                Some(guids) => match guids.iter().position(|g| g == guid) {
                    Some(index) => {
                        guids.remove(index);
                        true
                    }
                    None => false,
                },
                None => false,
            }
        };
        if removed {
            self.persist_favorites().await;
        } else {
            debug!(feed_id, guid, "article was not a favorite");
        }
    }

    pub async fn is_favorite(&self, feed_id: &str, guid: &str) -> bool {
        self.favorites
            .read()
            .await
            .get(feed_id)
            .map(|guids| guids.iter().any(|g| g == guid))
            .unwrap_or(false)
    }

    /// Re-fetch every registered feed and publish the joined article map.
    /// Per-feed failures degrade to empty lists inside the fan-out; the
    /// map replaces the previous session state wholesale, so overlapping
    /// refreshes resolve last-write-wins.
    pub async fn refresh(&self, client: &Client, config: &FetchConfig) {
        let feeds = self.list_feeds().await;
        let read = self.read.read().await.clone();
        let fetched = fetch::fetch_all(client, config, &feeds, &read).await;
        let mut articles = self.articles.write().await;
        *articles = fetched;
    }

    pub async fn articles_for(&self, feed_id: &str) -> Vec<Article> {
        self.articles
            .read()
            .await
            .get(feed_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn articles_by_feed(&self) -> HashMap<String, Vec<Article>> {
        self.articles.read().await.clone()
    }

    /// Rebuild the favorites list from scratch: re-fetch every registered
    /// feed, keep the articles whose guid is in that feed's favorite set,
    /// and sort newest first. Favorites whose source feed is deleted or
    /// unreachable drop out until the feed comes back; that is the
    /// intended consistency tradeoff, not a cache to repair.
    pub async fn list_favorites(&self, client: &Client, config: &FetchConfig) -> Vec<Article> {
        let feeds = self.list_feeds().await;
        let favorites = self.favorites.read().await.clone();

        let fetched = fetch::fetch_all(client, config, &feeds, &HashMap::new()).await;

        let mut matched: Vec<Article> = Vec::new();
        for (feed_id, articles) in fetched {
            let Some(guids) = favorites.get(&feed_id) else {
                continue;
            };
            matched.extend(
                articles
                    .into_iter()
                    .filter(|a| guids.iter().any(|g| *g == a.guid)),
            );
        }

        matched.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
        matched
    }

    async fn persist_feeds(&self) {
        let feeds = self.feeds.read().await;
        self.store.set(KEY_FEEDS, &*feeds).await;
    }

    async fn persist_read(&self) {
        let read = self.read.read().await;
        self.store.set(KEY_READ, &*read).await;
    }

    async fn persist_favorites(&self) {
        let favorites = self.favorites.read().await;
        self.store.set(KEY_FAVORITES, &*favorites).await;
    }
}
