use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// String-keyed JSON store backing the three persisted structures
/// (`feeds`, `readArticles`, `favorites`). Each key maps to one
/// `<key>.json` file under the data directory; writes go through a
/// `.json.tmp` sibling and a rename so a crash mid-write leaves either
/// the old file or a recoverable tmp copy.
///
/// `in_memory()` keeps everything in a map instead, for tests.
#[derive(Debug, Clone)]
pub struct KvStore {
    dir: Option<PathBuf>,
    mem: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl KvStore {
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            mem: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(error = %e, path = %dir.display(), "failed to create data dir");
        }
        Self {
            dir: Some(dir),
            mem: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn file_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{key}.json"))
    }

    /// Read and deserialize the value under `key`. Any failure (missing
    /// file, unreadable bytes, corrupt JSON with no usable tmp copy)
    /// degrades to `T::default()` so callers behave as if no prior data
    /// existed.
    pub async fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match &self.dir {
            Some(dir) => {
                let path = Self::file_path(dir, key);
                match tokio::fs::read(&path).await {
                    Ok(bytes) => match serde_json::from_slice::<T>(&bytes) {
                        Ok(value) => value,
                        Err(e) => {
                            warn!(error = %e, path = %path.display(), "corrupt JSON, trying tmp fallback");
                            let tmp = path.with_extension("json.tmp");
                            match tokio::fs::read(&tmp).await {
                                Ok(tmp_bytes) => {
                                    serde_json::from_slice::<T>(&tmp_bytes).unwrap_or_default()
                                }
                                Err(_) => T::default(),
                            }
                        }
                    },
                    Err(_) => T::default(),
                }
            }
            None => {
                let mem = self.mem.read().await;
                mem.get(key)
                    .and_then(|bytes| serde_json::from_slice::<T>(bytes).ok())
                    .unwrap_or_default()
            }
        }
    }

    /// Serialize and persist `value` under `key`. Write failures are
    /// logged and swallowed; on-device storage is assumed reliable and
    /// callers keep their in-memory state regardless.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec_pretty(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, key, "failed to serialize value");
                return;
            }
        };
        match &self.dir {
            Some(dir) => {
                let path = Self::file_path(dir, key);
                let tmp = path.with_extension("json.tmp");
                if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
                    warn!(error = %e, path = %tmp.display(), "failed to write tmp file");
                    return;
                }
                if let Err(e) = tokio::fs::rename(&tmp, &path).await {
                    warn!(error = %e, path = %path.display(), "failed to persist file");
                }
            }
            None => {
                let mut mem = self.mem.write().await;
                mem.insert(key.to_owned(), bytes);
            }
        }
    }

    pub async fn remove(&self, key: &str) {
        match &self.dir {
            Some(dir) => {
                let path = Self::file_path(dir, key);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    debug!(error = %e, path = %path.display(), "nothing to remove");
                }
            }
            None => {
                let mut mem = self.mem.write().await;
                mem.remove(key);
            }
        }
    }
}
