pub mod types;
pub mod note_query;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use note_query::NoteQuery;
