use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::{DatabaseError, JsonRow, StorageEngine};
use crate::filter::SqlResult;

/// Storage engine double that replays scripted responses in order and
/// records every statement it receives.
#[derive(Default)]
pub struct ScriptedEngine {
    responses: Mutex<VecDeque<Result<Vec<JsonRow>, DatabaseError>>>,
    calls: Mutex<Vec<SqlResult>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next unanswered statement
    pub fn push_rows(&self, rows: Vec<Value>) -> &Self {
        let rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("scripted row must be an object, got {}", other),
            })
            .collect();
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn push_empty(&self) -> &Self {
        self.push_rows(vec![])
    }

    pub fn push_error(&self, err: DatabaseError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<SqlResult> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageEngine for ScriptedEngine {
    async fn execute(&self, statement: &SqlResult) -> Result<Vec<JsonRow>, DatabaseError> {
        self.calls.lock().unwrap().push(statement.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![]))
    }
}
