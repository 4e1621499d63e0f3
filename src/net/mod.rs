//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (resolve, bind)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Binding happens during bootstrap; failure is fatal
//! - Connection handling is left to axum/hyper

pub mod listener;
