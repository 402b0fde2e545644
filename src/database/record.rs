use serde::de::DeserializeOwned;
use serde_json::Value;

use super::engine::JsonRow;
use super::manager::DatabaseError;

/// Decode one `row_to_json` row into a model
pub fn decode<T: DeserializeOwned>(row: JsonRow) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(row)).map_err(DatabaseError::Decode)
}

pub fn decode_all<T: DeserializeOwned>(rows: Vec<JsonRow>) -> Result<Vec<T>, DatabaseError> {
    rows.into_iter().map(decode).collect()
}

/// First row, if any; extra rows are ignored
pub fn decode_optional<T: DeserializeOwned>(rows: Vec<JsonRow>) -> Result<Option<T>, DatabaseError> {
    rows.into_iter().next().map(decode).transpose()
}

/// Read the `count` column of a `SELECT COUNT(...) AS count` row
pub fn decode_count(rows: Vec<JsonRow>) -> Result<i64, DatabaseError> {
    rows.first()
        .and_then(|row| row.get("count"))
        .and_then(Value::as_i64)
        .ok_or_else(|| DatabaseError::QueryError("count query returned no count column".to_string()))
}
