//! Signed admin session token
//!
//! The `mcoj_admin_session` cookie carries an HS256 JWT. The server only
//! trusts the admin role when this token verifies; the plain
//! `mcoj_admin_authenticated` flag cookie is a client-side hint.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subject of every admin session token
pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    /// Unique per grant
    pub jti: String,
}

impl AdminSessionClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("session token expired")]
    Expired,

    #[error("invalid session token: {0}")]
    Invalid(String),

    #[error("failed to sign session token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone)]
pub struct SessionSigner {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionSigner {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token valid from `now` for `ttl`
    pub fn issue(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, AdminSessionClaims), TokenError> {
        let claims = AdminSessionClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
            jti: shared::util::new_id(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str) -> Result<AdminSessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
        validation.leeway = 0;

        let data = decode::<AdminSessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            },
        )?;

        if data.claims.sub != ADMIN_SUBJECT {
            return Err(TokenError::Invalid(format!(
                "unexpected subject {}",
                data.claims.sub
            )));
        }
        Ok(data.claims)
    }
}
