use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, PgPool, Row};
use tracing::debug;

use crate::filter::SqlResult;
use super::manager::DatabaseError;

/// One result row, keyed by column name
pub type JsonRow = Map<String, Value>;

/// Parameterized statement execution. Values in `SqlResult::params` are
/// always bound positionally, never spliced into the text.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    async fn execute(&self, statement: &SqlResult) -> Result<Vec<JsonRow>, DatabaseError>;
}

/// Postgres engine backed by a shared pool. Each call checks one connection
/// out for the duration of the statement.
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Wrap a statement so every row comes back as a single JSON column.
    /// Data-modifying statements must use `RETURNING`.
    fn wrap(query: &str) -> String {
        let trimmed = query.trim_start();
        let is_select = trimmed
            .get(..6)
            .map(|head| head.eq_ignore_ascii_case("select"))
            .unwrap_or(false);
        if is_select {
            format!("SELECT row_to_json(t) AS row FROM ({}) t", query)
        } else {
            format!("WITH t AS ({}) SELECT row_to_json(t) AS row FROM t", query)
        }
    }
}

#[async_trait]
impl StorageEngine for PgEngine {
    async fn execute(&self, statement: &SqlResult) -> Result<Vec<JsonRow>, DatabaseError> {
        let sql = Self::wrap(&statement.query);
        debug!(query = %statement.query, params = statement.params.len(), "executing statement");

        let mut q = sqlx::query(&sql);
        for p in statement.params.iter() {
            q = bind_param(q, p);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(DatabaseError::from_sqlx)?;

        rows.iter()
            .map(|row| match row.try_get::<Value, _>("row")? {
                Value::Object(map) => Ok(map),
                other => Err(DatabaseError::QueryError(format!("unexpected row format: {}", other))),
            })
            .collect()
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
