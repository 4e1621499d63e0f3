//! Business components mounted behind the gateway.
//!
//! Each component owns a path prefix. Their handlers live outside the
//! gateway; until one is wired in, the prefix answers `501 Not Implemented`
//! with the caller's group so deployments can check authorization end to end.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;

use crate::auth::RequestContext;
use crate::http::AppState;
use crate::routing::{RouteRegistrar, RouteRegistry};

/// A business component identified by name and path prefix.
#[derive(Debug, Clone, Copy)]
pub struct Controller {
    name: &'static str,
    prefix: &'static str,
}

impl Controller {
    pub const fn new(name: &'static str, prefix: &'static str) -> Self {
        Self { name, prefix }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }
}

pub const MODIFICATIONS: Controller = Controller::new("modification", "/api/modification");
pub const SCENARIOS: Controller = Controller::new("scenario", "/api/scenario");
pub const GRAPHQL: Controller = Controller::new("graphql", "/api/graphql");
pub const BUNDLES: Controller = Controller::new("bundle", "/api/bundle");

impl RouteRegistrar for Controller {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router
            .route(self.prefix, any(not_implemented))
            .route(&format!("{}/{{*rest}}", self.prefix), any(not_implemented))
    }
}

async fn not_implemented(ctx: RequestContext, uri: Uri) -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "group": ctx.group(), "path": uri.path() })),
    )
        .into_response()
}

/// All business components, in registration order.
pub fn registry() -> RouteRegistry {
    RouteRegistry::new()
        .with(MODIFICATIONS)
        .with(SCENARIOS)
        .with(GRAPHQL)
        .with(BUNDLES)
}
