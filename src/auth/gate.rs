//! The authorization decision applied to every request.
//!
//! # State Machine
//! ```text
//! Start → PathCheck ─┬─ landing path ──────────────────────────────→ Proceed (no context)
//!                    └─ ModeCheck ─┬─ offline ──────────────────────→ Proceed (OFFLINE)
//!                                  └─ header present? ── 401
//!                                     → scheme valid? ── 400
//!                                     → verified? ────── 403
//!                                     → claim present? ─ 403
//!                                     → group extracted? 403
//!                                     → Proceed (group)
//! ```
//!
//! The decision is synchronous. It only logs on verification failure.

use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::auth::context::RequestContext;
use crate::auth::verifier::{Claims, CredentialVerifier};
use crate::config::Mode;

/// Path of the public landing page.
pub const LANDING_PATH: &str = "/";

/// Group assigned to every request in offline mode.
pub const OFFLINE_GROUP: &str = "OFFLINE";

/// Claim holding the analyst authorization object.
pub const AUTHORIZATION_CLAIM: &str = "analyst";

const GROUP_FIELD: &str = "group";

/// Why an authenticated caller was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForbiddenReason {
    #[error("credential failed verification")]
    Verification,

    #[error("authorization claim missing")]
    MissingClaim,

    #[error("authorization claim has no usable group")]
    MissingGroup,
}

/// A request terminated by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("authorization header missing")]
    MissingCredentials,

    #[error("authorization header malformed")]
    MalformedHeader,

    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MissingCredentials => StatusCode::UNAUTHORIZED,
            Rejection::MalformedHeader => StatusCode::BAD_REQUEST,
            Rejection::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        // Status only; verification details stay in the logs.
        self.status().into_response()
    }
}

/// Per-request authorization, shared by every connection.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    mode: Mode,
    verifier: Arc<CredentialVerifier>,
}

impl AuthorizationGate {
    pub fn new(mode: Mode, verifier: Arc<CredentialVerifier>) -> Self {
        Self { mode, verifier }
    }

    /// Decide whether a request may proceed.
    ///
    /// `Ok(None)` means the path is public and no context applies.
    pub fn authorize(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Option<RequestContext>, Rejection> {
        if path == LANDING_PATH {
            return Ok(None);
        }

        if self.mode.is_offline() {
            return Ok(Some(RequestContext::new(OFFLINE_GROUP)));
        }

        let credential = bearer_credential(headers)?;

        let claims = self.verifier.verify(credential).map_err(|e| {
            tracing::info!(error = %e, cause = ?e, "Login failed");
            Rejection::Forbidden(ForbiddenReason::Verification)
        })?;

        let group = extract_group(&claims)?;
        Ok(Some(RequestContext::new(group)))
    }
}

/// Pull the credential out of `Authorization: Bearer <credential>`.
fn bearer_credential(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(Rejection::MissingCredentials),
    };

    let value = value.to_str().map_err(|_| Rejection::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(credential), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Ok(credential)
        }
        _ => Err(Rejection::MalformedHeader),
    }
}

fn extract_group(claims: &Claims) -> Result<&str, Rejection> {
    let authorization = claims
        .get(AUTHORIZATION_CLAIM)
        .ok_or(Rejection::Forbidden(ForbiddenReason::MissingClaim))?;

    authorization
        .as_object()
        .and_then(|claim| claim.get(GROUP_FIELD))
        .and_then(Value::as_str)
        .filter(|group| !group.is_empty())
        .ok_or(Rejection::Forbidden(ForbiddenReason::MissingGroup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verifier::tests::{sign, CLIENT_ID, SECRET};
    use axum::http::HeaderValue;
    use serde_json::json;

    fn gate(mode: Mode) -> AuthorizationGate {
        AuthorizationGate::new(mode, Arc::new(CredentialVerifier::new(SECRET, CLIENT_ID)))
    }

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    fn bearer(claims: serde_json::Value) -> HeaderMap {
        headers(&format!("Bearer {}", sign(&claims, SECRET)))
    }

    /// Log sink shared with a fmt subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_landing_path_bypasses_every_mode() {
        for mode in [Mode::Online, Mode::Offline] {
            assert_eq!(gate(mode).authorize("/", &HeaderMap::new()), Ok(None));
            assert_eq!(gate(mode).authorize("/", &headers("Basic abc")), Ok(None));
        }
    }

    #[test]
    fn test_offline_ignores_headers() {
        let gate = gate(Mode::Offline);
        for h in [HeaderMap::new(), headers("Basic abc"), headers("Bearer garbage")] {
            let ctx = gate.authorize("/api/bundle", &h).unwrap().unwrap();
            assert_eq!(ctx.group(), OFFLINE_GROUP);
        }
    }

    #[test]
    fn test_missing_or_empty_header_is_401() {
        let gate = gate(Mode::Online);
        assert_eq!(
            gate.authorize("/api/bundle", &HeaderMap::new()),
            Err(Rejection::MissingCredentials)
        );
        assert_eq!(
            gate.authorize("/api/bundle", &headers("")),
            Err(Rejection::MissingCredentials)
        );
        assert_eq!(Rejection::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_malformed_header_is_400() {
        let gate = gate(Mode::Online);
        for value in ["Basic abc", "bearer", "   ", "Bearer a b", "Token abc"] {
            assert_eq!(
                gate.authorize("/api/bundle", &headers(value)),
                Err(Rejection::MalformedHeader),
                "{value:?}"
            );
        }
        assert_eq!(Rejection::MalformedHeader.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let token = sign(&json!({ "analyst": { "group": "acme" } }), SECRET);
        for scheme in ["Bearer", "bearer", "BEARER", "bEaReR"] {
            let ctx = gate(Mode::Online)
                .authorize("/api/bundle", &headers(&format!("{scheme} {token}")))
                .unwrap()
                .unwrap();
            assert_eq!(ctx.group(), "acme");
        }
    }

    #[test]
    fn test_failed_verification_is_403() {
        let gate = gate(Mode::Online);
        let forged = sign(&json!({ "analyst": { "group": "acme" } }), b"wrong-secret");

        for value in ["Bearer abc.def.ghi".to_string(), format!("Bearer {forged}")] {
            let rejection = gate.authorize("/api/bundle", &headers(&value)).unwrap_err();
            assert_eq!(rejection, Rejection::Forbidden(ForbiddenReason::Verification));
            assert_eq!(rejection.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_tampered_token_is_logged_and_body_is_empty() {
        let gate = gate(Mode::Online);
        let forged = sign(&json!({ "analyst": { "group": "acme" } }), b"wrong-secret");
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            gate.authorize("/api/bundle", &headers(&format!("Bearer {forged}")))
        });

        let rejection = result.unwrap_err();
        assert_eq!(rejection, Rejection::Forbidden(ForbiddenReason::Verification));
        let logged = logs.contents();
        assert!(logged.contains("Login failed"), "{logged}");
        assert!(logged.contains("InvalidSignature"), "{logged}");

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_missing_authorization_claim_is_403() {
        let result = gate(Mode::Online).authorize("/api/bundle", &bearer(json!({ "sub": "u1" })));
        assert_eq!(result, Err(Rejection::Forbidden(ForbiddenReason::MissingClaim)));
    }

    #[test]
    fn test_unusable_group_is_403() {
        let gate = gate(Mode::Online);
        for claims in [
            json!({ "analyst": {} }),
            json!({ "analyst": "metro" }),
            json!({ "analyst": { "group": 42 } }),
            json!({ "analyst": { "group": null } }),
            json!({ "analyst": { "group": "" } }),
        ] {
            assert_eq!(
                gate.authorize("/api/bundle", &bearer(claims.clone())),
                Err(Rejection::Forbidden(ForbiddenReason::MissingGroup)),
                "{claims}"
            );
        }
    }

    #[test]
    fn test_valid_token_attaches_group() {
        let ctx = gate(Mode::Online)
            .authorize("/api/graphql", &bearer(json!({ "analyst": { "group": "metro" } })))
            .unwrap()
            .unwrap();
        assert_eq!(ctx.group(), "metro");
    }

    #[test]
    fn test_rejection_response_carries_status() {
        let response = Rejection::Forbidden(ForbiddenReason::Verification).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
