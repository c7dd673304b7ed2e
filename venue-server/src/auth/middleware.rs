//! Admin session middleware
//!
//! Applied once at the router level. Reads are public; every mutation of the
//! event collection needs a verified `mcoj_admin_session` cookie.
//!
//! `POST /admin/auth/set-cookie` grants unconditionally and is itself public,
//! so this gate authenticates nobody: a verified cookie only proves it was
//! issued by this server. Credentials must be checked upstream of
//! set-cookie (reverse proxy, identity provider) before it is reachable.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::{AppError, ErrorCode};

use super::session::SessionError;
use crate::core::ServerState;
use crate::security_log;

/// Whether a request must carry a verified admin session
///
/// | Request | Session |
/// |---------|---------|
/// | `OPTIONS *` (CORS preflight) | no |
/// | `GET`/`HEAD /events...` | no |
/// | any other method on `/events...` | yes |
/// | `/admin...`, `/health` | no |
pub fn requires_admin_session(method: &Method, path: &str) -> bool {
    let is_events_path = path == "/events" || path.starts_with("/events/");
    is_events_path && !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Reject event mutations without a valid admin session
///
/// On success the verified claims are inserted into the request extensions.
///
/// | Failure | Code | Status |
/// |---------|------|--------|
/// | no session cookie | NotAuthenticated | 401 |
/// | token expired | SessionExpired | 401 |
/// | bad signature / issuer / shape | TokenInvalid | 401 |
pub async fn require_admin_session(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !requires_admin_session(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    match state.sessions.verify(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "admin_session_rejected",
                error = format!("{}", e),
                method = req.method().as_str(),
                uri = format!("{:?}", req.uri())
            );

            match e {
                SessionError::Missing => Err(AppError::not_authenticated()),
                SessionError::Expired => Err(AppError::new(ErrorCode::SessionExpired)),
                SessionError::Invalid(_) | SessionError::CookieWrite(_) => {
                    Err(AppError::new(ErrorCode::TokenInvalid))
                }
            }
        }
    }
}
