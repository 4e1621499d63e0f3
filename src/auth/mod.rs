//! Authorization subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, Authorization header)
//!     → gate.rs (landing bypass, mode check, header parsing)
//!     → verifier.rs (signature check, claim decoding)
//!     → context.rs (RequestContext attached to request extensions)
//!     → Registered handler
//! ```
//!
//! # Design Decisions
//! - Verifier built once at startup, injected into the gate
//! - Mode passed to the gate constructor, never read from globals
//! - Rejections carry a status code only; causes are logged

pub mod context;
pub mod gate;
pub mod verifier;

pub use context::RequestContext;
pub use gate::{AuthorizationGate, ForbiddenReason, Rejection, LANDING_PATH, OFFLINE_GROUP};
pub use verifier::{Claims, CredentialVerifier, VerifyError};
