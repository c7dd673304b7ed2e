//! Admin API Handlers

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use shared::response::{AdminEntryResponse, MessageResponse, SessionStatusResponse};
use shared::{AppError, AppResult};

use super::LOGIN_PATH;
use crate::auth::{AdminSessionGate, SessionError, client_flag};
use crate::core::ServerState;
use crate::security_log;

fn grant_failure(e: SessionError) -> AppError {
    tracing::error!(error = %e, "Failed to set auth cookie");
    AppError::cookie_write(e.to_string()).with_message("Failed to set auth cookie")
}

fn revoke_failure(e: SessionError) -> AppError {
    tracing::error!(error = %e, "Logout failed");
    AppError::cookie_write(e.to_string()).with_message("Logout failed")
}

/// POST /admin/auth/set-cookie
///
/// Unconditional: the caller has already completed sign-in upstream.
pub async fn set_cookie(
    State(state): State<ServerState>,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    let mut headers = HeaderMap::new();
    let grant = state.sessions.grant(&mut headers).map_err(grant_failure)?;

    security_log!(
        "INFO",
        "admin_session_granted",
        session_id = grant.claims.jti.as_str(),
        expires_at = grant.expires_at.to_rfc3339()
    );
    Ok((headers, Json(MessageResponse::ok("Auth cookie set successfully"))))
}

/// POST /admin/auth/logout
///
/// Idempotent; succeeds without an existing session.
pub async fn logout(
    State(state): State<ServerState>,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    let mut headers = HeaderMap::new();
    state.sessions.revoke(&mut headers).map_err(revoke_failure)?;

    security_log!("INFO", "admin_session_revoked");
    Ok((headers, Json(MessageResponse::ok("Logout successful"))))
}

/// GET /admin/auth/session
pub async fn session(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse> {
    let claims = state.sessions.verify(&headers).ok();
    Json(SessionStatusResponse {
        success: true,
        authenticated: claims.is_some(),
        expires_at: claims.and_then(|c| c.expires_at()),
    })
}

/// GET /admin
///
/// Admission follows the client-reported flag alone.
pub async fn entry(headers: HeaderMap) -> Response {
    if AdminSessionGate::is_authenticated(client_flag(&headers)) {
        Json(AdminEntryResponse {
            success: true,
            authenticated: true,
        })
        .into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn error_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_grant_failure_response() {
        let err = grant_failure(SessionError::CookieWrite("signing key rejected".into()));
        let (status, body) = error_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Failed to set auth cookie",
                "error": "failed to write session cookie: signing key rejected",
            })
        );
    }

    #[tokio::test]
    async fn test_revoke_failure_response() {
        let err = revoke_failure(SessionError::CookieWrite("bad header".into()));
        let (status, body) = error_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Logout failed");
        assert_eq!(body["error"], "failed to write session cookie: bad header");
    }
}
