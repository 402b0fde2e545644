use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the session token and injects the caller's `Identity` into the
/// request extensions. Requests without a valid token never reach a handler.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), &state.config.security.cookie_name)
        .ok_or_else(|| ApiError::unauthorized("Access denied"))?;

    let identity = verify_token(&token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ApiError::unauthorized("Invalid token")
    })?;

    tracing::debug!(user_id = identity.user_id, "request authenticated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Session cookie first, then `Authorization: Bearer`
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}
