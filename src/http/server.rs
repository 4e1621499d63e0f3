//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (authorization, tracing, request ID)
//! - Serve the static landing page
//! - Bind server to listener

use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{middleware, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth::{AuthorizationGate, LANDING_PATH};
use crate::config::ServiceConfig;
use crate::feeds::FeedCache;
use crate::http::middleware::authorization_middleware;
use crate::routing::RouteRegistrar;
use crate::storage::Storage;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub storage: Storage,
    pub feeds: Arc<FeedCache>,
}

/// A component tried to mount a path that is already taken.
#[derive(Debug, Error)]
#[error("component `{component}` mounted a route that is already taken: {message}")]
pub struct RouteConflict {
    pub component: &'static str,
    pub message: String,
}

/// A router whose routes can only be reached through the authorization gate.
///
/// The gate is supplied at construction, so nothing can be registered
/// before it exists. The landing page is mounted at the same time, which
/// leaves `/` reserved. The gate is applied over every registered route and
/// the static fallback when the router is finished.
pub struct GatedRouter {
    gate: Arc<AuthorizationGate>,
    static_dir: PathBuf,
    routes: Router<AppState>,
}

impl GatedRouter {
    pub fn install(gate: Arc<AuthorizationGate>, static_dir: &Path) -> Self {
        let landing = ServeFile::new(static_dir.join("index.html"));
        Self {
            gate,
            static_dir: static_dir.to_path_buf(),
            routes: Router::new().route_service(LANDING_PATH, landing),
        }
    }

    /// Let a business component mount its routes.
    ///
    /// axum panics on overlapping routes; that panic is reported as a
    /// [`RouteConflict`] naming the component.
    pub fn register(&mut self, registrar: &dyn RouteRegistrar) -> Result<(), RouteConflict> {
        let routes = std::mem::replace(&mut self.routes, Router::new());
        self.routes = panic::catch_unwind(AssertUnwindSafe(|| registrar.register(routes)))
            .map_err(|payload| RouteConflict {
                component: registrar.name(),
                message: panic_message(payload.as_ref()),
            })?;
        tracing::debug!(component = registrar.name(), "Routes registered");
        Ok(())
    }

    /// Freeze the router: static assets, gate, request IDs.
    pub fn finish(self, state: AppState) -> Router {
        self.routes
            .fallback_service(ServeDir::new(self.static_dir))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                self.gate,
                authorization_middleware,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "route registration panicked".to_string()
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub fn new(listener: TcpListener, router: Router) -> Self {
        Self { router, listener }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = self.listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
