use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::SyncError;
use crate::models::{Article, Feed};

pub const DEFAULT_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Conversion endpoint translating a feed URL into JSON items.
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Raw conversion-API response shape: `{status, items: [...]}`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    guid: Option<String>,
}

impl ApiItem {
    /// Normalize into the Article shape: missing title becomes empty,
    /// content falls back to the description field, `read` is computed
    /// from the caller's read overlay for this feed.
    fn into_article(self, feed_id: &str, read_guids: &[String]) -> Article {
        let guid = self.guid.unwrap_or_default();
        let read = read_guids.contains(&guid);
        Article {
            title: self.title.unwrap_or_default(),
            pub_date: self.pub_date.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            content: self.content.or(self.description).unwrap_or_default(),
            guid,
            feed_id: feed_id.to_owned(),
            read,
        }
    }
}

/// Fetch one feed's items through the conversion endpoint and reconcile
/// them against the read overlay. A non-"ok" API status is an error just
/// like a transport failure.
pub async fn fetch_feed_articles(
    client: &Client,
    config: &FetchConfig,
    feed: &Feed,
    read_guids: &[String],
) -> Result<Vec<Article>, SyncError> {
    let response = client
        .get(&config.endpoint)
        .query(&[("rss_url", feed.url.as_str())])
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?;
    let body: ApiResponse = response.json().await?;

    if body.status != "ok" {
        return Err(SyncError::Api {
            status: body.status,
        });
    }

    Ok(body
        .items
        .into_iter()
        .map(|item| item.into_article(&feed.id, read_guids))
        .collect())
}

/// Concurrent fan-out over a set of feeds. Each feed fetch is its own
/// failure domain: a failing feed logs a warning and contributes an empty
/// list, never aborting its siblings. The join point guarantees every
/// feed id is present in the returned map.
pub async fn fetch_all(
    client: &Client,
    config: &FetchConfig,
    feeds: &[Feed],
    read: &HashMap<String, Vec<String>>,
) -> HashMap<String, Vec<Article>> {
    static NO_GUIDS: [String; 0] = [];

    let fetches = feeds.iter().map(|feed| {
        let read_guids = read.get(&feed.id).map(Vec::as_slice).unwrap_or(&NO_GUIDS);
        async move {
            let articles = match fetch_feed_articles(client, config, feed, read_guids).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(feed = %feed.name, url = %feed.url, error = %e, "failed to fetch feed");
                    Vec::new()
                }
            };
            (feed.id.clone(), articles)
        }
    });

    join_all(fetches).await.into_iter().collect()
}

/// Remote half of add/edit validation: the URL must resolve through the
/// conversion endpoint with status "ok" before it is accepted. Transport
/// failures count as rejection.
pub async fn validate_remote(client: &Client, config: &FetchConfig, url: &str) -> bool {
    let result = async {
        let response = client
            .get(&config.endpoint)
            .query(&[("rss_url", url)])
            .timeout(config.request_timeout)
            .send()
            .await?;
        response.json::<ApiResponse>().await
    }
    .await;

    match result {
        Ok(body) => body.status == "ok",
        Err(e) => {
            warn!(url, error = %e, "remote feed validation failed");
            false
        }
    }
}
