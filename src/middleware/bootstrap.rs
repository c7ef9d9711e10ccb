//! First-request bootstrap hook.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{bootstrap, AppState};

/// Runs the schema/seed procedure before the first handled request.
///
/// The `OnceCell` serializes concurrent first requests, so the procedure
/// runs at most once per process. A failed run leaves the cell empty;
/// the triggering request fails and the next one retries.
pub async fn bootstrap_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    state
        .bootstrap
        .get_or_try_init(|| async {
            bootstrap::run(&state.db_pool, &state.passwords, &state.bootstrap_config)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Bootstrap failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Bootstrap failed", "code": "BOOTSTRAP_FAILED"})),
            )
                .into_response()
        })?;

    Ok(next.run(req).await)
}
