//! Note body extractor: JSON `{title, content}` or a multipart form with
//! `title`, `content` and an optional `file` field.

use axum::{
    async_trait,
    extract::{FromRequest, Json, Multipart, Request},
    http::header,
};

use crate::error::ApiError;
use crate::services::{NoteInput, StoredUpload};
use crate::state::AppState;

/// Raw upload as received, before it is written to the upload directory
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct NoteForm {
    pub input: NoteInput,
    pub file: Option<UploadedFile>,
}

impl NoteForm {
    /// Write the uploaded file, if any, to the upload directory.
    pub async fn store_upload(&self, state: &AppState) -> Result<Option<StoredUpload>, ApiError> {
        match &self.file {
            Some(file) => {
                let stored = state
                    .notes
                    .attachments()
                    .persist(file.file_name.as_deref(), &file.bytes)
                    .await?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for NoteForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let Json(input) = Json::<NoteInput>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(NoteForm { input, file: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let mut input = NoteInput::default();
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
        {
            let field_name = field.name().map(|n| n.to_string());
            match field_name.as_deref() {
                Some("title") => input.title = read_text(field).await?,
                Some("content") => input.content = read_text(field).await?,
                Some("file") => {
                    let file_name = field.file_name().map(|n| n.to_string());
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))?;
                    // Browsers send an empty part when no file was chosen.
                    if !bytes.is_empty() {
                        file = Some(UploadedFile { file_name, bytes: bytes.to_vec() });
                    }
                }
                _ => {}
            }
        }

        Ok(NoteForm { input, file })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Read error: {}", e)))
}
