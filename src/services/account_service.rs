use std::sync::Arc;

use serde_json::json;

use crate::auth::Identity;
use crate::database::models::Account;
use crate::database::record::decode_optional;
use crate::database::StorageEngine;
use crate::filter::SqlResult;

use super::error::NoteError;
use super::ownership::ensure_owner;

/// Read-only access to the caller's own account row
pub struct AccountService {
    engine: Arc<dyn StorageEngine>,
}

impl AccountService {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    pub async fn get_account(&self, identity: &Identity, user_id: i64) -> Result<Account, NoteError> {
        ensure_owner(identity, user_id)?;
        let statement = SqlResult::new(
            "SELECT id, username, email FROM users WHERE id = $1",
            vec![json!(user_id)],
        );
        decode_optional(self.engine.execute(&statement).await?)?
            .ok_or_else(|| NoteError::not_found("Account not found"))
    }
}
