use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered RSS source. Serialized into the `feeds` storage key with the
/// same field spellings the persisted JSON has always used, so existing
/// installs round-trip across versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feed {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Feed {
    /// The built-in feed that is re-seeded into the registry on every load
    /// if its id is missing.
    pub fn default_feed() -> Self {
        Self {
            id: "nasa".to_owned(),
            name: "NASA Breaking News".to_owned(),
            url: "https://www.nasa.gov/rss/dyn/breaking_news.rss".to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// One entry from a feed, rebuilt from the conversion API on every fetch.
/// Articles are session-only: they are never persisted, only tagged against
/// the read/favorite overlays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub guid: String,
    pub title: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub link: String,
    pub content: String,
    #[serde(rename = "feedId")]
    pub feed_id: String,
    pub read: bool,
}

impl Article {
    /// Parse the publication date for sorting. The conversion API emits
    /// `YYYY-MM-DD HH:MM:SS`; upstream feeds occasionally leak RFC 2822 or
    /// RFC 3339 strings through, so all three are accepted.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_pub_date(&self.pub_date)
    }
}

pub(crate) fn parse_pub_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
