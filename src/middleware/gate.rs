//! Admin access gate.
//!
//! Admin views render only for a session whose user is authenticated and
//! marked active; anything else is redirected to the login page rather
//! than answered with an error.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{datastore, AppState};

pub const LOGIN_PATH: &str = "/login";

/// Validates the session token, loads the user and requires `active`.
/// The authenticated user is stored in request extensions.
pub async fn admin_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(redirect_to_login());
    };

    let claims = state
        .tokens
        .verify_access_token(token)
        .map_err(|_| redirect_to_login())?;

    let user_id: i32 = claims.sub.parse().map_err(|_| redirect_to_login())?;

    let mut conn = state.db_pool.get().map_err(|e| {
        error!(error = %e, "Database connection error");
        db_error_response()
    })?;

    let user = datastore::find_user(&mut conn, user_id).map_err(|e| {
        error!(error = %e, "Failed to load session user");
        db_error_response()
    })?;

    match user {
        Some(user) if user.active => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        _ => Err(redirect_to_login()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn redirect_to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

fn db_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Database error", "code": "DB_ERROR"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn test_redirect_targets_login_page() {
        let response = redirect_to_login();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            LOGIN_PATH
        );
    }
}
