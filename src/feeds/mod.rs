//! Transit feed cache.
//!
//! Feeds live in a local directory. Online deployments warm the directory
//! from a remote bundle bucket; offline deployments use only what is already
//! on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedCacheError {
    #[error("failed to create feed cache directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed cache path {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Where cached feeds are read from and fetched into.
#[derive(Debug, Clone)]
pub struct FeedCache {
    local_dir: PathBuf,
    remote_bucket: Option<String>,
}

impl FeedCache {
    /// Ensure the cache directory exists and bind the remote source.
    ///
    /// `remote_bucket` is `None` in offline mode.
    pub fn initialize(
        local_dir: &Path,
        remote_bucket: Option<&str>,
    ) -> Result<Self, FeedCacheError> {
        std::fs::create_dir_all(local_dir).map_err(|source| FeedCacheError::Create {
            path: local_dir.to_path_buf(),
            source,
        })?;

        if !local_dir.is_dir() {
            return Err(FeedCacheError::NotADirectory(local_dir.to_path_buf()));
        }

        Ok(Self {
            local_dir: local_dir.to_path_buf(),
            remote_bucket: remote_bucket.map(str::to_string),
        })
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn remote_bucket(&self) -> Option<&str> {
        self.remote_bucket.as_deref()
    }

    /// True when feeds can only come from the local directory.
    pub fn is_local_only(&self) -> bool {
        self.remote_bucket.is_none()
    }
}
