use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::auth::Identity;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::database::models::{NoteTagLink, Tag};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkTagRequest {
    pub tag_id: i64,
}

/// GET /api/tags - global tag list
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(ApiResponse::success(state.notes.list_tags().await?))
}

/// POST /api/tags - create a global tag
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTagRequest>,
) -> ApiResult<Tag> {
    let tag = state.notes.create_tag(&request.name).await?;
    Ok(ApiResponse::created(tag))
}

/// GET /api/users/:user_id/tags - tags used on the owner's notes
pub async fn list_owner(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Vec<Tag>> {
    let tags = state.notes.list_owner_tags(&identity, user_id).await?;
    Ok(ApiResponse::success(tags))
}

/// POST /api/users/:user_id/notes/:note_id/tags - attach a tag to a note
pub async fn link(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((user_id, note_id)): ApiPath<(i64, i64)>,
    ApiJson(request): ApiJson<LinkTagRequest>,
) -> ApiResult<NoteTagLink> {
    let link = state.notes.link_tag(&identity, user_id, note_id, request.tag_id).await?;
    Ok(ApiResponse::created(link))
}
