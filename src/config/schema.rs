//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Operating mode, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Authorization enforced, group taken from the bearer token.
    #[default]
    Online,
    /// No authorization, every request runs as the offline group.
    Offline,
}

impl Mode {
    pub fn is_offline(self) -> bool {
        matches!(self, Mode::Offline)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Online => write!(f, "online"),
            Mode::Offline => write!(f, "offline"),
        }
    }
}

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Online (authorized) or offline (standalone) operation.
    pub mode: Mode,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Listener configuration (bind address, landing page).
    pub listener: ListenerConfig,

    /// Persistent storage settings.
    pub storage: StorageConfig,

    /// Transit feed cache settings.
    pub feeds: FeedConfig,
}

/// Token verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret, base64 with the URL-safe alphabet.
    pub secret: String,

    /// Client identifier tokens must be issued for (audience).
    pub client_id: String,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind on.
    pub host: String,

    /// Port to listen on. Zero picks an ephemeral port.
    pub port: u16,

    /// Directory holding the landing page (`index.html`) and its assets.
    pub static_dir: PathBuf,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7070,
            static_dir: PathBuf::from("public"),
        }
    }
}

/// Persistent storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path, or `:memory:` for a throwaway store.
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: "analyst.db".to_string(),
        }
    }
}

/// Transit feed cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Local directory feeds are cached in.
    pub local_cache: PathBuf,

    /// Remote bucket feeds are fetched from. Ignored when offline.
    pub bundle_bucket: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            local_cache: PathBuf::from("cache"),
            bundle_bucket: None,
        }
    }
}
