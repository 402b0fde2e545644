use crate::auth::Identity;
use super::error::NoteError;

/// True when the caller owns the resource
pub fn authorize(identity: &Identity, resource_owner_id: i64) -> bool {
    identity.user_id == resource_owner_id
}

pub fn ensure_owner(identity: &Identity, resource_owner_id: i64) -> Result<(), NoteError> {
    if authorize(identity, resource_owner_id) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = identity.user_id,
            owner_id = resource_owner_id,
            "access denied to resource owned by another user"
        );
        Err(NoteError::forbidden("You do not have access to this resource"))
    }
}
