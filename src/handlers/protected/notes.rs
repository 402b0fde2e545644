use axum::{
    body::Body,
    extract::{Extension, Request, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::auth::Identity;
use crate::database::models::{Note, NotePage};
use crate::error::ApiError;
use crate::filter::NoteFilter;
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ownership::ensure_owner;
use crate::state::AppState;

use super::form::NoteForm;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring over title or content
    pub q: Option<String>,
    /// Exact tag name
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/users/:user_id/notes
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<NotePage> {
    let mut filter = NoteFilter::new(
        user_id,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(state.config.api.default_page_size),
    );
    if let Some(q) = query.q {
        filter = filter.with_free_text(q);
    }
    if let Some(tag) = query.tag {
        filter = filter.with_tag(tag);
    }

    let page = state.notes.list_notes(&identity, &filter).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/users/:user_id/notes/:note_id
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((user_id, note_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Note> {
    let note = state.notes.get_note(&identity, user_id, note_id).await?;
    Ok(ApiResponse::success(note))
}

/// GET /api/users/:user_id/notes/:note_id/file - the note's attachment
///
/// Same ownership checks as reading the note itself.
pub async fn attachment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((user_id, note_id)): ApiPath<(i64, i64)>,
    request: Request,
) -> Result<Response, ApiError> {
    let note = state.notes.get_note(&identity, user_id, note_id).await?;
    let stored_path = note
        .file_path
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Note has no attachment"))?;

    let full_path = match state.notes.attachments().locate(stored_path).await {
        Some(path) => path,
        None => {
            tracing::warn!(note_id, "attachment missing from upload directory");
            return Err(ApiError::not_found("Attachment file not found"));
        }
    };

    let response = ServeFile::new(full_path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.map(Body::new))
}

/// POST /api/users/:user_id/notes
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<i64>,
    form: NoteForm,
) -> ApiResult<Note> {
    // Nothing is written to the upload directory for a request that will be refused.
    ensure_owner(&identity, user_id)?;
    form.input.validate()?;

    let upload = form.store_upload(&state).await?;
    let note = state.notes.create_note(&identity, user_id, &form.input, upload).await?;
    Ok(ApiResponse::created(note))
}

/// PUT /api/users/:user_id/notes/:note_id
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((user_id, note_id)): ApiPath<(i64, i64)>,
    form: NoteForm,
) -> ApiResult<Note> {
    ensure_owner(&identity, user_id)?;
    form.input.validate()?;

    let upload = form.store_upload(&state).await?;
    let note = state
        .notes
        .update_note(&identity, user_id, note_id, &form.input, upload)
        .await?;
    Ok(ApiResponse::success(note))
}

/// DELETE /api/users/:user_id/notes/:note_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath((user_id, note_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Value> {
    let note = state.notes.delete_note(&identity, user_id, note_id).await?;
    Ok(ApiResponse::success(json!({ "message": "Note deleted", "note": note })))
}
