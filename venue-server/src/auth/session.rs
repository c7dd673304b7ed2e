//! Admin session cookies
//!
//! A grant writes two cookies with identical lifetime and attributes:
//!
//! | Cookie | Value | Purpose |
//! |--------|-------|---------|
//! | `mcoj_admin_authenticated` | `true` | Flag consulted by the admin entry view |
//! | `mcoj_admin_session` | signed token | Verified before any event mutation |
//!
//! Both are `HttpOnly`, `Path=/`, `SameSite=Strict`, and `Secure` only when
//! the server runs in production. A revoke expires both.

use chrono::{DateTime, Duration, Utc};
use http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use thiserror::Error;

use super::cookie::{SetCookie, read_cookie};
use super::token::{AdminSessionClaims, SessionSigner, TokenError};
use crate::core::Config;

pub const AUTH_COOKIE_NAME: &str = "mcoj_admin_authenticated";
pub const SESSION_COOKIE_NAME: &str = "mcoj_admin_session";
pub const AUTH_COOKIE_VALUE: &str = "true";

/// Request header carrying the client's own view of the admin flag
pub const CLIENT_FLAG_HEADER: &str = "x-admin-authenticated";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to write session cookie: {0}")]
    CookieWrite(String),

    #[error("admin session cookie missing")]
    Missing,

    #[error("admin session expired")]
    Expired,

    #[error("admin session invalid: {0}")]
    Invalid(String),
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            TokenError::Invalid(msg) => Self::Invalid(msg),
            TokenError::Signing(msg) => Self::CookieWrite(msg),
        }
    }
}

/// Outcome of a successful grant
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub expires_at: DateTime<Utc>,
    pub claims: AdminSessionClaims,
}

/// Grants, revokes and checks the admin session
#[derive(Debug, Clone)]
pub struct AdminSessionGate {
    signer: SessionSigner,
    ttl: Duration,
    secure: bool,
}

impl AdminSessionGate {
    pub fn new(signer: SessionSigner, ttl: Duration, secure: bool) -> Self {
        Self {
            signer,
            ttl,
            secure,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SessionSigner::new(&config.session_secret, config.session_issuer.clone()),
            Duration::days(config.session_ttl_days),
            config.is_production(),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Append both admin cookies to `headers`, valid from now
    pub fn grant(&self, headers: &mut HeaderMap) -> Result<SessionGrant, SessionError> {
        self.grant_at(headers, Utc::now())
    }

    /// Grant with an explicit clock
    ///
    /// Both header values are built before either is appended; on error
    /// `headers` is left untouched.
    pub fn grant_at(
        &self,
        headers: &mut HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<SessionGrant, SessionError> {
        let expires_at = now + self.ttl;
        let (token, claims) = self.signer.issue(now, self.ttl)?;

        let flag = self.cookie(AUTH_COOKIE_NAME, AUTH_COOKIE_VALUE, expires_at)?;
        let session = self.cookie(SESSION_COOKIE_NAME, &token, expires_at)?;

        headers.append(SET_COOKIE, flag);
        headers.append(SET_COOKIE, session);
        Ok(SessionGrant { expires_at, claims })
    }

    /// Append expiring versions of both admin cookies to `headers`
    ///
    /// Idempotent: revoking without a session writes the same headers.
    pub fn revoke(&self, headers: &mut HeaderMap) -> Result<(), SessionError> {
        let flag = self.removal(AUTH_COOKIE_NAME)?;
        let session = self.removal(SESSION_COOKIE_NAME)?;

        headers.append(SET_COOKIE, flag);
        headers.append(SET_COOKIE, session);
        Ok(())
    }

    /// Admission decision for the admin entry view
    ///
    /// The client-reported flag is taken at face value; mutations are gated
    /// separately by [`verify`](Self::verify).
    pub fn is_authenticated(client_flag: bool) -> bool {
        client_flag
    }

    /// Verify the signed session cookie of a request
    pub fn verify(&self, headers: &HeaderMap) -> Result<AdminSessionClaims, SessionError> {
        let token = read_cookie(headers, SESSION_COOKIE_NAME)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::Missing)?;
        Ok(self.signer.verify(&token)?)
    }

    fn cookie(
        &self,
        name: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<HeaderValue, SessionError> {
        SetCookie::new(name, value)
            .path("/")
            .expires(expires_at)
            .max_age(self.ttl.num_seconds())
            .http_only(true)
            .secure(self.secure)
            .same_site_strict(true)
            .to_header_value()
            .map_err(|e| SessionError::CookieWrite(e.to_string()))
    }

    fn removal(&self, name: &str) -> Result<HeaderValue, SessionError> {
        SetCookie::removal(name)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site_strict(true)
            .to_header_value()
            .map_err(|e| SessionError::CookieWrite(e.to_string()))
    }
}

/// Parse the client flag header; `true` (any case) or `1` count as set
pub fn client_flag(headers: &HeaderMap) -> bool {
    headers
        .get(CLIENT_FLAG_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http::header::COOKIE;

    fn gate(secure: bool) -> AdminSessionGate {
        AdminSessionGate::new(
            SessionSigner::new("gate-test-secret-gate-test-secret", "venue-server"),
            Duration::days(7),
            secure,
        )
    }

    fn set_cookies(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// Turn Set-Cookie headers into the Cookie header a browser would send back
    fn echo_cookies(headers: &HeaderMap) -> HeaderMap {
        let pairs: Vec<String> = set_cookies(headers)
            .iter()
            .map(|c| c.split(';').next().unwrap().to_string())
            .collect();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_str(&pairs.join("; ")).unwrap());
        request
    }

    #[test]
    fn test_grant_writes_both_cookies() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let mut headers = HeaderMap::new();
        let grant = gate(false).grant_at(&mut headers, now).unwrap();

        assert_eq!(grant.expires_at, now + Duration::days(7));

        let cookies = set_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("mcoj_admin_authenticated=true; Path=/"));
        assert!(cookies[1].starts_with("mcoj_admin_session="));
        for cookie in &cookies {
            assert!(cookie.contains("Expires=Sun, 08 Mar 2026 10:00:00 GMT"));
            assert!(cookie.contains("Max-Age=604800"));
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("SameSite=Strict"));
            assert!(!cookie.contains("Secure"));
        }
    }

    #[test]
    fn test_secure_flag_follows_environment() {
        let mut headers = HeaderMap::new();
        gate(true).grant(&mut headers).unwrap();
        gate(true).revoke(&mut headers).unwrap();
        assert!(set_cookies(&headers).iter().all(|c| c.contains("; Secure")));
    }

    #[test]
    fn test_revoke_expires_both_cookies() {
        let mut headers = HeaderMap::new();
        gate(false).revoke(&mut headers).unwrap();

        let cookies = set_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("mcoj_admin_authenticated=;"));
        assert!(cookies[1].starts_with("mcoj_admin_session=;"));
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        }
    }

    #[test]
    fn test_verify_round_trip() {
        let gate = gate(false);
        let mut response = HeaderMap::new();
        let grant = gate.grant(&mut response).unwrap();

        let claims = gate.verify(&echo_cookies(&response)).unwrap();
        assert_eq!(claims, grant.claims);
    }

    #[test]
    fn test_verify_rejects_missing_and_revoked() {
        let gate = gate(false);
        assert!(matches!(
            gate.verify(&HeaderMap::new()),
            Err(SessionError::Missing)
        ));

        let mut response = HeaderMap::new();
        gate.revoke(&mut response).unwrap();
        assert!(matches!(
            gate.verify(&echo_cookies(&response)),
            Err(SessionError::Missing)
        ));
    }

    #[test]
    fn test_flag_cookie_alone_is_not_a_session() {
        let mut request = HeaderMap::new();
        request.insert(
            COOKIE,
            HeaderValue::from_static("mcoj_admin_authenticated=true"),
        );
        assert!(matches!(
            gate(false).verify(&request),
            Err(SessionError::Missing)
        ));
    }

    #[test]
    fn test_expired_session() {
        let gate = gate(false);
        let mut response = HeaderMap::new();
        gate.grant_at(&mut response, Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(
            gate.verify(&echo_cookies(&response)),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_is_authenticated_passes_flag_through() {
        assert!(AdminSessionGate::is_authenticated(true));
        assert!(!AdminSessionGate::is_authenticated(false));
    }

    #[test]
    fn test_client_flag_parsing() {
        let mut headers = HeaderMap::new();
        assert!(!client_flag(&headers));

        headers.insert(CLIENT_FLAG_HEADER, HeaderValue::from_static("TRUE"));
        assert!(client_flag(&headers));

        headers.insert(CLIENT_FLAG_HEADER, HeaderValue::from_static("1"));
        assert!(client_flag(&headers));

        headers.insert(CLIENT_FLAG_HEADER, HeaderValue::from_static("false"));
        assert!(!client_flag(&headers));
    }
}
