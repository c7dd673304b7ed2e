//! HTTP API
//!
//! | Module | Routes | Session |
//! |--------|--------|---------|
//! | [`health`] | `/health` | no |
//! | [`events`] | `/events...` | mutations only |
//! | [`admin`] | `/admin`, `/admin/auth/...` | no |
//!
//! Event mutations are gated by [`require_admin_session`], applied once at
//! the router level.

pub mod admin;
pub mod events;
pub mod health;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, Method, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::{CLIENT_FLAG_HEADER, require_admin_session};
use crate::core::ServerState;

/// HTTP request log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        status.as_u16(),
        started.elapsed().as_millis()
    );

    response
}

/// Routes without state
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(events::router())
        .merge(admin::router())
}

/// Fully layered application
pub fn build_app(state: ServerState) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_session,
        ))
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

/// Permissive without a configured origin. With one, cookies are allowed
/// cross-origin for that origin only.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(CLIENT_FLAG_HEADER),
            ]),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS_ALLOWED_ORIGIN, falling back to permissive");
            CorsLayer::permissive()
        }
    }
}
