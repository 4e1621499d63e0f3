//! Persistent storage connection.
//!
//! # Responsibilities
//! - Open the process-wide SQLite connection during bootstrap
//! - Prove the connection is usable before any handler is reachable
//! - Share the connection with handlers through `AppState`
//!
//! # Design Decisions
//! - One connection behind a mutex; handlers hold the lock briefly
//! - Schema belongs to the handlers, not to the gateway

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

use crate::config::StorageConfig;

/// Location that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to prepare storage directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("database connection poisoned")]
    Poisoned,
}

/// Shared handle to the persistent store.
#[derive(Clone)]
pub struct Storage {
    db: Arc<Mutex<Connection>>,
    location: String,
}

impl Storage {
    /// Open the configured database and check it answers queries.
    pub fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let location = config.database.trim().to_string();

        let db = if location == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            let path = Path::new(&location);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Directory {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
            Connection::open(path)
        }
        .map_err(|source| StorageError::Open {
            location: location.clone(),
            source,
        })?;

        db.busy_timeout(Duration::from_secs(5))?;

        let storage = Self {
            db: Arc::new(Mutex::new(db)),
            location,
        };
        storage.ping()?;
        Ok(storage)
    }

    /// Round-trip a trivial query.
    pub fn ping(&self) -> Result<(), StorageError> {
        let one: i64 = self.with_connection(|db| db.query_row("SELECT 1", [], |row| row.get(0)))?;
        debug_assert_eq!(one, 1);
        Ok(())
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&db)?)
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
