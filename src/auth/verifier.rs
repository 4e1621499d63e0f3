//! Bearer token verification.
//!
//! Tokens are HS256 JWTs signed with the shared secret and issued for the
//! configured client. `exp` and `aud` are enforced when present; no claim is
//! mandatory. The decoded claim set is returned verbatim.

use std::collections::HashSet;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AuthConfig;

/// URL-safe base64 that tolerates both padded and unpadded secrets.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the configured verifier secret.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, base64::DecodeError> {
    SECRET_ENGINE.decode(secret.trim())
}

/// Claims decoded from a verified token.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Reasons a token fails verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Not three dot-separated segments of base64 JSON.
    #[error("token is malformed")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token was not issued for this client")]
    InvalidAudience,

    #[error("token algorithm is not accepted")]
    UnsupportedAlgorithm,

    #[error("token rejected")]
    Rejected(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => VerifyError::Malformed(err),
            ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::InvalidAudience => VerifyError::InvalidAudience,
            ErrorKind::InvalidAlgorithm => VerifyError::UnsupportedAlgorithm,
            _ => VerifyError::Rejected(err),
        }
    }
}

/// Stateless verifier holding only immutable key material.
///
/// Built once at startup and shared behind an `Arc`.
pub struct CredentialVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    pub fn new(secret: &[u8], client_id: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.set_audience(&[client_id]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Build a verifier from the `[auth]` section, decoding the secret.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, base64::DecodeError> {
        let secret = decode_secret(&auth.secret)?;
        Ok(Self::new(&secret, &auth.client_id))
    }

    /// Check the token signature and return its claims.
    pub fn verify(&self, raw_token: &str) -> Result<Claims, VerifyError> {
        let data = decode::<Claims>(raw_token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}
