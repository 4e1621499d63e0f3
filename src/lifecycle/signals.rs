//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C)
//! - Translate it into a shutdown trigger

use crate::lifecycle::shutdown::Shutdown;

/// Trigger `shutdown` once Ctrl+C is received.
pub async fn trigger_on_ctrl_c(shutdown: &Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => shutdown.trigger(),
        Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
