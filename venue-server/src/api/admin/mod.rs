//! Admin API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /admin | GET | Entry view admission; 303 to `/admin/login` when not signed in |
//! | /admin/auth/set-cookie | POST | Grant the admin session cookies |
//! | /admin/auth/logout | POST | Revoke the admin session cookies |
//! | /admin/auth/session | GET | Server-side view of the session |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Where unauthenticated visitors of the entry view are sent
pub const LOGIN_PATH: &str = "/admin/login";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/admin", get(handler::entry))
        .nest("/admin/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/set-cookie", post(handler::set_cookie))
        .route("/logout", post(handler::logout))
        .route("/session", get(handler::session))
}
