use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::MonitorError;

/// A single JSON snapshot on disk, used as an advisory cache.
pub struct JsonFileCache<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonFileCache<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn exists(&self) -> bool {
        self.path.exists()
    }

    /// `Ok(None)` when the file is absent; corrupt content is an error.
    pub fn load(&self) -> Result<Option<T>, MonitorError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MonitorError::LocalIoFailure(format!(
                    "reading {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let value = serde_json::from_str(&data).map_err(|e| {
            MonitorError::LocalIoFailure(format!("decoding {}: {}", self.path.display(), e))
        })?;
        Ok(Some(value))
    }

    /// Overwrites the snapshot through a sibling temp file and a rename.
    pub fn store(&self, value: &T) -> Result<(), MonitorError> {
        let json = serde_json::to_string(value)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| {
            MonitorError::LocalIoFailure(format!("writing {}: {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            MonitorError::LocalIoFailure(format!("replacing {}: {}", self.path.display(), e))
        })?;
        debug!("Stored snapshot {}", self.path.display());
        Ok(())
    }

    /// Returns the cached value, or runs `fetch` and stores its result.
    pub async fn load_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, MonitorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MonitorError>>,
    {
        if let Some(value) = self.load()? {
            info!("Found existing {}", self.path.display());
            return Ok(value);
        }
        info!("{} not found, fetching", self.path.display());
        self.fetch_and_store(fetch).await
    }

    /// Always fetches, then replaces whatever is on disk.
    pub async fn fetch_and_store<F, Fut>(&self, fetch: F) -> Result<T, MonitorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MonitorError>>,
    {
        let value = fetch().await?;
        self.store(&value)?;
        info!("Saved {}", self.path.display());
        Ok(value)
    }
}
