pub mod account;
pub mod note;
pub mod tag;

pub use account::Account;
pub use note::{Note, NoteOwner, NotePage};
pub use tag::{NoteTagLink, Tag};
