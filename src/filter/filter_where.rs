use serde_json::Value;

use super::error::FilterError;

/// Accumulates WHERE conditions and assigns positional parameters in
/// insertion order.
pub struct FilterWhere {
    param_values: Vec<Value>,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    /// `column = $n`
    pub fn eq(&mut self, column: &str, value: Value) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        let placeholder = self.bind(value);
        self.conditions.push(format!("{} = {}", column, placeholder));
        Ok(self)
    }

    /// `(a ILIKE $n OR b ILIKE $n ...)`, the pattern is bound once and shared.
    pub fn ilike_any(&mut self, columns: &[&str], pattern: String) -> Result<&mut Self, FilterError> {
        for column in columns {
            Self::validate_column(column)?;
        }
        let placeholder = self.bind(Value::String(pattern));
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("{} ILIKE {}", c, placeholder))
            .collect();
        self.conditions.push(format!("({})", parts.join(" OR ")));
        Ok(self)
    }

    /// Condition without parameters; callers only pass fixed SQL.
    pub fn fixed(&mut self, condition: &'static str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Reserve the next positional parameter for `value` and return its placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }

    pub fn param_count(&self) -> usize {
        self.param_values.len()
    }

    pub fn to_where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        let clause = self.to_where_clause();
        (clause, self.param_values)
    }

    /// Accepts `name` or `alias.name` identifiers.
    pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid = !column.is_empty()
            && column.split('.').all(|part| {
                let mut chars = part.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape LIKE metacharacters so user text matches literally, then wrap it
/// in `%...%`.
pub fn contains_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
