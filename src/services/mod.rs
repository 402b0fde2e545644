pub mod account_service;
pub mod attachments;
pub mod error;
pub mod note_service;
pub mod ownership;

pub use account_service::AccountService;
pub use attachments::{AttachmentPlan, AttachmentStore, StoredUpload};
pub use error::NoteError;
pub use note_service::{NoteInput, NoteService};
