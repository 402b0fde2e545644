//! Attachment lifecycle for the single file slot a note may carry.
//!
//! The decision of which path a row should keep and which file becomes
//! stale is pure (`plan`). The filesystem side (`AttachmentStore`) only
//! reclaims a stale file after the database write that superseded it has
//! committed, so a row never points at a file that is already gone.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::Operation;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Attachment path cannot be resolved: {0}")]
    Unresolvable(String),

    #[error("Attachment I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file already written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUpload {
    pub stored_path: String,
}

/// What the row should reference after the operation, and which file (if
/// any) is stale once the row change commits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachmentPlan {
    pub persist: Option<String>,
    pub reclaim: Option<String>,
}

pub fn plan(op: Operation, existing: Option<&str>, incoming: Option<&StoredUpload>) -> AttachmentPlan {
    match op {
        Operation::Create => AttachmentPlan {
            persist: incoming.map(|u| u.stored_path.clone()),
            reclaim: None,
        },
        Operation::Update => match incoming {
            Some(upload) => AttachmentPlan {
                persist: Some(upload.stored_path.clone()),
                reclaim: existing
                    .filter(|old| *old != upload.stored_path)
                    .map(str::to_string),
            },
            None => AttachmentPlan {
                persist: existing.map(str::to_string),
                reclaim: None,
            },
        },
        Operation::Delete => AttachmentPlan {
            persist: None,
            reclaim: existing.map(str::to_string),
        },
    }
}

/// Filesystem-backed upload directory
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write an incoming upload under a fresh name. The original file name
    /// only contributes its extension.
    pub async fn persist(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<StoredUpload, AttachmentError> {
        fs::create_dir_all(&self.root).await.map_err(|source| AttachmentError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let stored_path = match original_name.and_then(safe_extension) {
            Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
            None => Uuid::new_v4().simple().to_string(),
        };
        let full_path = self.root.join(&stored_path);

        fs::write(&full_path, bytes).await.map_err(|source| AttachmentError::Io {
            path: stored_path.clone(),
            source,
        })?;

        debug!(stored_path = %stored_path, size = bytes.len(), "attachment: persisted upload");
        Ok(StoredUpload { stored_path })
    }

    /// Map a stored relative path into the upload directory. Absolute paths
    /// and anything with `..` are rejected.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Resolve a stored path to a file that is present on disk.
    pub async fn locate(&self, path: &str) -> Option<PathBuf> {
        let full_path = self.resolve(path)?;
        match fs::try_exists(&full_path).await {
            Ok(true) => Some(full_path),
            Ok(false) => None,
            Err(e) => {
                warn!(path = %path, error = %e, "attachment: cannot stat file");
                None
            }
        }
    }

    /// Remove a file if it exists. `Ok(false)` when it was already gone.
    pub async fn remove(&self, path: &str) -> Result<bool, AttachmentError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| AttachmentError::Unresolvable(path.to_string()))?;

        let exists = fs::try_exists(&full_path).await.map_err(|source| AttachmentError::Io {
            path: path.to_string(),
            source,
        })?;
        if !exists {
            return Ok(false);
        }

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(true),
            // Lost a race with another remover.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(AttachmentError::Io { path: path.to_string(), source }),
        }
    }

    /// Remove a stale file. Failures are logged and never fail the caller.
    pub async fn reclaim(&self, path: &str) -> bool {
        match self.remove(path).await {
            Ok(true) => {
                info!(path = %path, "attachment: removed stale file");
                true
            }
            Ok(false) => {
                debug!(path = %path, "attachment: stale file already absent");
                false
            }
            Err(e) => {
                warn!(error = %e, "attachment: failed to remove stale file");
                false
            }
        }
    }

    /// Drop an upload whose note operation did not go through.
    pub async fn discard(&self, upload: &StoredUpload) {
        self.reclaim(&upload.stored_path).await;
    }
}

fn safe_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
