pub mod engine;
pub mod manager;
pub mod models;
pub mod record;

pub use engine::{JsonRow, PgEngine, StorageEngine};
pub use manager::{DatabaseError, DatabaseManager};
