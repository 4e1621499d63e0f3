//! Route registration for business components.
//!
//! # Responsibilities
//! - Hold the registrars of every business component, in order
//! - Hand each one the router exactly once during bootstrap
//!
//! # Design Decisions
//! - Registrars never see an ungated router (see `GatedRouter`)
//! - Registered paths are opaque to the gateway

use axum::Router;

use crate::http::server::AppState;

/// A business component that mounts its own handlers.
///
/// The landing path `/` is already taken when `register` runs.
pub trait RouteRegistrar: Send + Sync {
    /// Component name, used in startup logs.
    fn name(&self) -> &'static str;

    /// Attach the component's routes and return the router.
    fn register(&self, router: Router<AppState>) -> Router<AppState>;
}

/// Ordered list of registrars invoked once at startup.
#[derive(Default)]
pub struct RouteRegistry {
    registrars: Vec<Box<dyn RouteRegistrar>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registrar; registration follows insertion order.
    pub fn with(mut self, registrar: impl RouteRegistrar + 'static) -> Self {
        self.registrars.push(Box::new(registrar));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn RouteRegistrar> {
        self.registrars.iter().map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|r| r.name()).collect()
    }
}
