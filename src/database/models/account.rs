use serde::{Deserialize, Serialize};

/// Public view of a row in `users`; credentials never leave the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
}
