//! Admin authentication
//!
//! - [`cookie`] - `Set-Cookie` construction, `Cookie` lookup
//! - [`token`] - signed session token
//! - [`session`] - [`AdminSessionGate`]: grant / revoke / verify
//! - [`middleware`] - [`require_admin_session`]

pub mod cookie;
pub mod middleware;
pub mod session;
pub mod token;

pub use cookie::{SetCookie, read_cookie};
pub use middleware::require_admin_session;
pub use session::{
    AUTH_COOKIE_NAME, AdminSessionGate, CLIENT_FLAG_HEADER, SESSION_COOKIE_NAME, SessionError,
    SessionGrant, client_flag,
};
pub use token::{AdminSessionClaims, SessionSigner, TokenError};
