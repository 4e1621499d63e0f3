//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Per request (http/server.rs):
//!     → x-request-id set and propagated
//!     → TraceLayer span per request
//! ```

pub mod logging;
