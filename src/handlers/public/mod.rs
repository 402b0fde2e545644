// handlers/public/mod.rs - Public handlers (no authentication required)
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::filter::SqlResult;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - API description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Notes API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "logout": "/api/auth/logout (public)",
                "account": "/api/users/:user_id (protected)",
                "notes": "/api/users/:user_id/notes[/:note_id] (protected)",
                "note_tags": "/api/users/:user_id/notes/:note_id/tags, /api/users/:user_id/tags (protected)",
                "attachment": "/api/users/:user_id/notes/:note_id/file (protected)",
                "tags": "/api/tags (protected)"
            }
        }
    }))
}

/// GET /health - process and database liveness
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let probe = SqlResult::new("SELECT 1 AS ok", vec![]);
    match state.engine.execute(&probe).await {
        Ok(_) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "database": "ok",
            "environment": state.config.environment,
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Database unavailable"))
        }
    }
}

/// POST /api/auth/logout - expire the session cookie
///
/// Stateless: the token itself stays valid until it expires, the browser
/// just stops sending it.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None",
        state.config.security.cookie_name
    );
    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "message": "Logged out" })),
    )
}
