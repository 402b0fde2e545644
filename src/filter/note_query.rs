use serde_json::json;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{contains_pattern, FilterWhere};
use super::types::{NoteFilter, NoteQuerySql, SqlResult};

const TAG_JOIN: &str = "JOIN note_tags nt ON nt.note_id = n.id JOIN tags t ON t.id = nt.tag_id";

/// Builds the owner-scoped note listing query and its matching count query.
///
/// Parameters are assigned in a fixed order: owner, free text, tag name,
/// then limit and offset. No caller value is ever written into the query
/// text.
pub struct NoteQuery {
    max_page_size: Option<i64>,
}

impl NoteQuery {
    pub fn new(max_page_size: Option<i64>) -> Self {
        Self { max_page_size }
    }

    pub fn validate(filter: &NoteFilter) -> Result<(), FilterError> {
        if filter.page <= 0 { return Err(FilterError::InvalidPage(filter.page)); }
        if filter.page_size <= 0 { return Err(FilterError::InvalidPageSize(filter.page_size)); }
        Ok(())
    }

    pub fn build(&self, filter: &NoteFilter) -> Result<NoteQuerySql, FilterError> {
        Self::validate(filter)?;

        let page_size = match self.max_page_size {
            Some(max) if filter.page_size > max => {
                tracing::warn!("Page size {} exceeds max {}, capping to max", filter.page_size, max);
                max
            }
            _ => filter.page_size,
        };

        let free_text = filter.free_text.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let tag_name = filter.tag_name.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut conditions = FilterWhere::new();
        conditions.eq("n.user_id", json!(filter.owner_id))?;
        conditions.fixed("n.deleted = false");
        if let Some(text) = free_text {
            conditions.ilike_any(&["n.title", "n.content"], contains_pattern(text))?;
        }
        if let Some(tag) = tag_name {
            conditions.eq("t.name", json!(tag))?;
        }

        let from_clause = if tag_name.is_some() {
            format!("FROM notes n {}", TAG_JOIN)
        } else {
            "FROM notes n".to_string()
        };
        // The tag join yields one row per matching link; collapse them per note.
        let select_clause = if tag_name.is_some() { "SELECT DISTINCT n.*" } else { "SELECT n.*" };
        let order_clause = FilterOrder::generate(&FilterOrder::newest_first("n.created_at", "n.id"))?;

        let offset = (filter.page - 1)
            .checked_mul(page_size)
            .ok_or(FilterError::PageOutOfRange(filter.page))?;

        let (where_clause, where_params) = conditions.into_parts();

        let count = SqlResult::new(
            format!("SELECT COUNT(DISTINCT n.id) AS count {} WHERE {}", from_clause, where_clause),
            where_params.clone(),
        );

        let mut params = where_params;
        params.push(json!(page_size));
        let limit_placeholder = format!("${}", params.len());
        params.push(json!(offset));
        let offset_placeholder = format!("${}", params.len());

        let query = [
            select_clause.to_string(),
            from_clause,
            format!("WHERE {}", where_clause),
            order_clause,
            format!("LIMIT {} OFFSET {}", limit_placeholder, offset_placeholder),
        ]
        .join(" ");

        Ok(NoteQuerySql {
            select: SqlResult::new(query, params),
            count,
            page_size,
        })
    }
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self::new(None)
    }
}
