/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Note write operations; drives the attachment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}
