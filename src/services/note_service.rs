use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::Identity;
use crate::database::models::{Note, NoteOwner, NotePage, NoteTagLink, Tag};
use crate::database::record::{decode_all, decode_count, decode_optional};
use crate::database::{DatabaseError, StorageEngine};
use crate::filter::{NoteFilter, NoteQuery, SqlResult};
use crate::types::Operation;

use super::attachments::{self, AttachmentStore, StoredUpload};
use super::error::NoteError;
use super::ownership::ensure_owner;

/// Title and content for create and update. Missing fields deserialize
/// as empty and are rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }

    pub fn validate(&self) -> Result<(), NoteError> {
        if self.title.trim().is_empty() {
            return Err(NoteError::invalid("Title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(NoteError::invalid("Content is required"));
        }
        Ok(())
    }
}

/// Row returned by the update statement: the new note plus the path it
/// referenced just before the write.
#[derive(Debug, Deserialize)]
struct UpdatedNote {
    #[serde(flatten)]
    note: Note,
    previous_file_path: Option<String>,
}

/// Owner-scoped note, tag and tag-link operations.
///
/// Every owner-scoped call checks the caller against the owner named in the
/// request before touching storage, then against the stored owner of the
/// addressed note.
pub struct NoteService {
    engine: Arc<dyn StorageEngine>,
    attachments: AttachmentStore,
    query: NoteQuery,
}

impl NoteService {
    pub fn new(engine: Arc<dyn StorageEngine>, attachments: AttachmentStore, max_page_size: Option<i64>) -> Self {
        Self {
            engine,
            attachments,
            query: NoteQuery::new(max_page_size),
        }
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    pub async fn list_notes(&self, identity: &Identity, filter: &NoteFilter) -> Result<NotePage, NoteError> {
        ensure_owner(identity, filter.owner_id)?;
        let sql = self.query.build(filter)?;

        let notes: Vec<Note> = decode_all(self.engine.execute(&sql.select).await?)?;
        let total = decode_count(self.engine.execute(&sql.count).await?)?;

        Ok(NotePage {
            page: filter.page,
            total_pages: NotePage::total_pages(total, sql.page_size),
            notes,
        })
    }

    pub async fn get_note(&self, identity: &Identity, owner_id: i64, note_id: i64) -> Result<Note, NoteError> {
        ensure_owner(identity, owner_id)?;
        let statement = SqlResult::new(
            "SELECT * FROM notes WHERE id = $1 AND deleted = false",
            vec![json!(note_id)],
        );
        let note: Note = decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::not_found("Note not found"))?;
        ensure_owner(identity, note.user_id)?;
        Ok(note)
    }

    /// Create a note. An upload that cannot be attached is removed again.
    pub async fn create_note(
        &self,
        identity: &Identity,
        owner_id: i64,
        input: &NoteInput,
        upload: Option<StoredUpload>,
    ) -> Result<Note, NoteError> {
        let result = self.insert_note(identity, owner_id, input, upload.as_ref()).await;
        if result.is_err() {
            if let Some(upload) = &upload {
                self.attachments.discard(upload).await;
            }
        }
        result
    }

    async fn insert_note(
        &self,
        identity: &Identity,
        owner_id: i64,
        input: &NoteInput,
        upload: Option<&StoredUpload>,
    ) -> Result<Note, NoteError> {
        ensure_owner(identity, owner_id)?;
        input.validate()?;

        let plan = attachments::plan(Operation::Create, None, upload);
        let statement = SqlResult::new(
            "INSERT INTO notes (user_id, title, content, file_path) VALUES ($1, $2, $3, $4) RETURNING *",
            vec![json!(owner_id), json!(input.title), json!(input.content), json!(plan.persist)],
        );
        let note: Note = decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| DatabaseError::QueryError("insert returned no row".to_string()))?;

        info!(note_id = note.id, user_id = owner_id, attached = note.file_path.is_some(), "note created");
        Ok(note)
    }

    /// Update title and content, optionally replacing the attachment. The
    /// superseded file is removed only after the row change committed.
    pub async fn update_note(
        &self,
        identity: &Identity,
        owner_id: i64,
        note_id: i64,
        input: &NoteInput,
        upload: Option<StoredUpload>,
    ) -> Result<Note, NoteError> {
        match self.apply_update(identity, owner_id, note_id, input, upload.as_ref()).await {
            Ok(updated) => {
                let plan = attachments::plan(
                    Operation::Update,
                    updated.previous_file_path.as_deref(),
                    upload.as_ref(),
                );
                if let Some(stale) = plan.reclaim {
                    self.attachments.reclaim(&stale).await;
                }
                info!(note_id, user_id = owner_id, replaced_file = upload.is_some(), "note updated");
                Ok(updated.note)
            }
            Err(e) => {
                if let Some(upload) = &upload {
                    self.attachments.discard(upload).await;
                }
                Err(e)
            }
        }
    }

    async fn apply_update(
        &self,
        identity: &Identity,
        owner_id: i64,
        note_id: i64,
        input: &NoteInput,
        upload: Option<&StoredUpload>,
    ) -> Result<UpdatedNote, NoteError> {
        ensure_owner(identity, owner_id)?;
        input.validate()?;

        let current = self.find_owner(note_id).await?;
        ensure_owner(identity, current.user_id)?;

        // $3 is NULL without an upload, which keeps the stored path.
        let statement = SqlResult::new(
            "UPDATE notes AS n SET title = $1, content = $2, file_path = COALESCE($3, n.file_path) \
             FROM (SELECT id, file_path AS previous_file_path FROM notes WHERE id = $4 FOR UPDATE) AS prev \
             WHERE n.id = prev.id AND n.user_id = $5 AND n.deleted = false \
             RETURNING n.*, prev.previous_file_path",
            vec![
                json!(input.title),
                json!(input.content),
                json!(upload.map(|u| u.stored_path.as_str())),
                json!(note_id),
                json!(current.user_id),
            ],
        );

        decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::not_found("Note not found"))
    }

    /// Delete a note and its attachment, returning the deleted row.
    pub async fn delete_note(&self, identity: &Identity, owner_id: i64, note_id: i64) -> Result<Note, NoteError> {
        ensure_owner(identity, owner_id)?;

        let current = self.find_owner(note_id).await?;
        ensure_owner(identity, current.user_id)?;

        // Conditional delete: of two concurrent deletes only one sees the row.
        let statement = SqlResult::new(
            "DELETE FROM notes WHERE id = $1 AND user_id = $2 RETURNING *",
            vec![json!(note_id), json!(current.user_id)],
        );
        let deleted: Note = decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::not_found("Note not found"))?;

        let plan = attachments::plan(Operation::Delete, deleted.file_path.as_deref(), None);
        if let Some(stale) = plan.reclaim {
            self.attachments.reclaim(&stale).await;
        }

        info!(note_id, user_id = owner_id, "note deleted");
        Ok(deleted)
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag, NoteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NoteError::invalid("Tag name is required"));
        }

        let statement = SqlResult::new("INSERT INTO tags (name) VALUES ($1) RETURNING *", vec![json!(name)]);
        let rows = match self.engine.execute(&statement).await {
            Ok(rows) => rows,
            Err(DatabaseError::Conflict(_)) => {
                return Err(NoteError::Conflict(format!("Tag '{}' already exists", name)))
            }
            Err(e) => return Err(e.into()),
        };
        let tag: Tag = decode_optional(rows)?
            .ok_or_else(|| DatabaseError::QueryError("insert returned no row".to_string()))?;

        info!(tag_id = tag.id, "tag created");
        Ok(tag)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, NoteError> {
        let statement = SqlResult::new("SELECT * FROM tags ORDER BY name ASC, id ASC", vec![]);
        Ok(decode_all(self.engine.execute(&statement).await?)?)
    }

    /// Tags attached to at least one of the owner's notes
    pub async fn list_owner_tags(&self, identity: &Identity, owner_id: i64) -> Result<Vec<Tag>, NoteError> {
        ensure_owner(identity, owner_id)?;
        let statement = SqlResult::new(
            "SELECT DISTINCT t.* FROM tags t \
             JOIN note_tags nt ON nt.tag_id = t.id \
             JOIN notes n ON n.id = nt.note_id \
             WHERE n.user_id = $1 AND n.deleted = false \
             ORDER BY t.name ASC, t.id ASC",
            vec![json!(owner_id)],
        );
        Ok(decode_all(self.engine.execute(&statement).await?)?)
    }

    pub async fn link_tag(
        &self,
        identity: &Identity,
        owner_id: i64,
        note_id: i64,
        tag_id: i64,
    ) -> Result<NoteTagLink, NoteError> {
        ensure_owner(identity, owner_id)?;

        let note = self.find_owner(note_id).await?;
        ensure_owner(identity, note.user_id)?;

        let tag_lookup = SqlResult::new("SELECT * FROM tags WHERE id = $1", vec![json!(tag_id)]);
        let tag: Option<Tag> = decode_optional(self.engine.execute(&tag_lookup).await?)?;
        if tag.is_none() {
            return Err(NoteError::not_found("Tag not found"));
        }

        let statement = SqlResult::new(
            "INSERT INTO note_tags (note_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING RETURNING note_id, tag_id",
            vec![json!(note_id), json!(tag_id)],
        );
        let link: NoteTagLink = decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::Conflict("Tag is already linked to this note".to_string()))?;

        info!(note_id, tag_id, "tag linked");
        Ok(link)
    }

    async fn find_owner(&self, note_id: i64) -> Result<NoteOwner, NoteError> {
        let statement = SqlResult::new(
            "SELECT id, user_id, file_path FROM notes WHERE id = $1 AND deleted = false",
            vec![json!(note_id)],
        );
        decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::not_found("Note not found"))
    }
}
