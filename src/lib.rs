//! Feed synchronization and local state core for an RSS news reader.
//!
//! Feeds come from user registration plus one built-in default; articles
//! come from a feed-to-JSON conversion endpoint and live only for the
//! session; read and favorite status are small persisted overlays keyed
//! by feed id and article guid.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod state;
pub mod storage;
pub mod validate;
pub mod view;

pub use config::AppConfig;
pub use error::SyncError;
pub use fetch::{fetch_all, fetch_feed_articles, validate_remote, FetchConfig, DEFAULT_ENDPOINT};
pub use models::{Article, Feed};
pub use state::{LocalState, KEY_FAVORITES, KEY_FEEDS, KEY_READ};
pub use storage::KvStore;
pub use validate::{validate_feed_form, FieldErrors, ValidationError};
pub use view::{filter_articles, search_by_title, Filter};
