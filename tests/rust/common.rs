//! Common utilities for integration tests

use async_trait::async_trait;
use proximadb_filter::core::{LoggingConfig, Payload, VectorPoint, VectorStoreConfig};
use proximadb_filter::storage::{SqlExecutor, SqlRow};
use proximadb_filter::DistanceMetric;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Initialize test environment
pub fn init_test_env() {
    INIT.call_once(|| {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        proximadb_filter::init_tracing(&config);
    });
}

/// Build a payload from a JSON object literal
pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap_or_default()
}

/// Small store configuration for tests
pub fn test_store_config(dimension: usize) -> VectorStoreConfig {
    VectorStoreConfig {
        collection: "test_documents".to_string(),
        dimension,
        distance: DistanceMetric::Cosine,
        ..Default::default()
    }
}

/// Article-like corpus used across the store tests (dimension 3)
pub fn sample_points() -> Vec<VectorPoint> {
    vec![
        VectorPoint::new(
            1u64,
            vec![1.0, 0.0, 0.0],
            payload(serde_json::json!({"category": "ai", "author": "O'Brien", "year": 2021, "tags": ["ml", "rust"]})),
        ),
        VectorPoint::new(
            2u64,
            vec![0.9, 0.1, 0.0],
            payload(serde_json::json!({"category": "ai", "author": "Lee", "year": 2023, "tags": ["nlp"]})),
        ),
        VectorPoint::new(
            3u64,
            vec![0.0, 1.0, 0.0],
            payload(serde_json::json!({"category": "db", "author": "Kim", "year": 2024, "draft": null})),
        ),
        VectorPoint::new(
            4u64,
            vec![0.0, 0.0, 1.0],
            payload(serde_json::json!({"category": "db", "author": "Ng", "year": 2019, "tags": []})),
        ),
    ]
}

/// Executor double that records statements and replays canned rows
#[derive(Default)]
pub struct MockSqlExecutor {
    statements: Mutex<Vec<String>>,
    rows: Mutex<VecDeque<Vec<SqlRow>>>,
    pub affected_rows: u64,
    pub fail_with: Option<String>,
}

impl MockSqlExecutor {
    pub fn returning(rows: Vec<Vec<Value>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|batch| batch.into_iter().filter_map(|row| row.as_object().cloned()).collect())
            .collect();
        Self {
            rows: Mutex::new(rows),
            affected_rows: 1,
            ..Default::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, statement: &str) -> anyhow::Result<()> {
        self.statements.lock().unwrap().push(statement.to_string());
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SqlExecutor for MockSqlExecutor {
    async fn execute(&self, statement: &str) -> anyhow::Result<u64> {
        self.record(statement)?;
        Ok(self.affected_rows)
    }

    async fn query(&self, statement: &str) -> anyhow::Result<Vec<SqlRow>> {
        self.record(statement)?;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }
}
