//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Mode-dependent required settings
//! - Secret material must decode
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::auth::verifier::decode_secret;
use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A setting required in the current mode is empty or absent.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// The verifier secret is not valid base64.
    #[error("`auth.secret` is not valid base64: {0}")]
    InvalidSecret(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.database.trim().is_empty() {
        errors.push(ValidationError::Missing("storage.database"));
    }
    if config.feeds.local_cache.as_os_str().is_empty() {
        errors.push(ValidationError::Missing("feeds.local_cache"));
    }

    if !config.mode.is_offline() {
        if config.auth.secret.is_empty() {
            errors.push(ValidationError::Missing("auth.secret"));
        }
        if config.auth.client_id.is_empty() {
            errors.push(ValidationError::Missing("auth.client_id"));
        }
        if config
            .feeds
            .bundle_bucket
            .as_deref()
            .map_or(true, |bucket| bucket.trim().is_empty())
        {
            errors.push(ValidationError::Missing("feeds.bundle_bucket"));
        }
    }

    if let Err(e) = decode_secret(&config.auth.secret) {
        errors.push(ValidationError::InvalidSecret(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
