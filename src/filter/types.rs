use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Listing parameters for one owner's notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteFilter {
    pub owner_id: i64,
    pub free_text: Option<String>,
    pub tag_name: Option<String>,
    pub page: i64,
    pub page_size: i64,
}

impl NoteFilter {
    pub fn new(owner_id: i64, page: i64, page_size: i64) -> Self {
        Self {
            owner_id,
            free_text: None,
            tag_name: None,
            page,
            page_size,
        }
    }

    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>) -> Self {
        self.tag_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Query text plus its positional arguments ($1, $2, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}

/// Select and count statements produced for a single listing
#[derive(Debug, Clone)]
pub struct NoteQuerySql {
    pub select: SqlResult,
    pub count: SqlResult,
    /// Page size actually applied, after capping
    pub page_size: i64,
}
