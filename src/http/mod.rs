//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → middleware/authorization.rs (gate: bypass, 400/401/403, or context)
//!     → registered handler, or static landing assets
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use server::{AppState, GatedRouter, HttpServer, RouteConflict};
