use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    /// Relative to the upload directory
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
}

/// Minimal projection used for existence and ownership checks
#[derive(Debug, Clone, Deserialize)]
pub struct NoteOwner {
    pub id: i64,
    pub user_id: i64,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotePage {
    pub page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub notes: Vec<Note>,
}

impl NotePage {
    pub fn total_pages(total: i64, page_size: i64) -> i64 {
        if total <= 0 || page_size <= 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        }
    }
}
