use axum::extract::{Extension, State};

use crate::auth::Identity;
use crate::handlers::extract::ApiPath;
use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/users/:user_id - the caller's own account
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Account> {
    let account = state.accounts.get_account(&identity, user_id).await?;
    Ok(ApiResponse::success(account))
}
