use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Newest first, ties broken by id so pages stay stable.
    pub fn newest_first(created_column: &str, id_column: &str) -> Vec<FilterOrderInfo> {
        vec![
            FilterOrderInfo { column: created_column.to_string(), sort: SortDirection::Desc },
            FilterOrderInfo { column: id_column.to_string(), sort: SortDirection::Asc },
        ]
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            FilterWhere::validate_column(&info.column)?;
            parts.push(format!("{} {}", info.column, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}
