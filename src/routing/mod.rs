//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RouteRegistry (ordered registrars)
//!     → GatedRouter (gate already installed)
//!     → each registrar mounts its handlers
//!     → Freeze as immutable axum Router
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Registration order is fixed but not load-bearing
//! - Every registered route sits beneath the authorization gate

pub mod registry;

pub use registry::{RouteRegistrar, RouteRegistry};
