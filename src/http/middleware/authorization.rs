//! Authorization middleware.
//! Runs the gate before any handler is dispatched.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::AuthorizationGate;

pub async fn authorization_middleware(
    State(gate): State<Arc<AuthorizationGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    match gate.authorize(req.uri().path(), req.headers()) {
        Ok(Some(ctx)) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(rejection) => rejection.into_response(),
    }
}
