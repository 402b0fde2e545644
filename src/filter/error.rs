use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid page: {0} (must be >= 1)")]
    InvalidPage(i64),

    #[error("Invalid page size: {0} (must be >= 1)")]
    InvalidPageSize(i64),

    #[error("Page {0} is out of range")]
    PageOutOfRange(i64),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}
