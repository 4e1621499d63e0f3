//! Per-request authorization context.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

/// Context attached to authorized requests.
///
/// Carries the caller's group, never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    group: String,
}

impl RequestContext {
    pub(crate) fn new(group: impl Into<String>) -> Self {
        Self { group: group.into() }
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only the landing path runs without a context, and it has no handlers.
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
