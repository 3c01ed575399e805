// Copyright 2025 ProximaDB
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! SQL Vector Store Backend
//!
//! Columnar layout: one table per collection with an `id` column, a
//! pgvector-style `vector` column and one column per payload key. Filters
//! compile to predicate strings and are spliced into `WHERE` clauses.
//!
//! Ids are stored in the TEXT `id` column as order-preserving keys:
//! `n` plus 20 zero-padded digits for numeric ids and `u` plus the
//! hyphenated lowercase form for UUIDs. Text order of the keys is the
//! order of [`PointId`], so `ORDER BY id` and `id >= cursor` page correctly.
//!
//! The connection itself is a collaborator behind [`SqlExecutor`], so any
//! driver (or a test double) can run the generated statements. Identifiers
//! are validated before they reach a statement and every literal goes
//! through the shared value formatter.

use anyhow::anyhow;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use super::super::traits::{ensure_delete_scope, validate_points, VectorStore};
use super::super::types::{ScrollPage, ScrollRequest, SearchRequest};
use crate::core::{
    Payload, PointId, Record, ScoredPoint, Vector, VectorPoint, VectorStoreConfig, VectorStoreError,
    VectorStoreResult,
};
use crate::filter::{
    escape_string, format_value, CanonicalFilter, CompiledFilter, Condition, ConditionShape, FilterDialect,
    FilterValue,
};

/// Row returned by a query, keyed by column name
pub type SqlRow = serde_json::Map<String, Value>;

const RESERVED_COLUMNS: [&str; 3] = ["id", "vector", SCORE_COLUMN];
const SCORE_COLUMN: &str = "_score";

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
}

/// Statement runner supplied by the embedding application
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a statement and return the number of affected rows
    async fn execute(&self, statement: &str) -> anyhow::Result<u64>;

    /// Run a query and return its rows
    async fn query(&self, statement: &str) -> anyhow::Result<Vec<SqlRow>>;
}

/// Reject anything that is not a plain SQL identifier
pub fn validate_identifier(name: &str) -> VectorStoreResult<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(VectorStoreError::MalformedQuery(format!(
            "'{}' is not a valid column or table name",
            name
        )))
    }
}

fn validate_payload_key(key: &str) -> VectorStoreResult<&str> {
    validate_identifier(key)?;
    if RESERVED_COLUMNS.contains(&key) {
        return Err(VectorStoreError::MalformedQuery(format!(
            "payload key '{}' collides with a reserved column",
            key
        )));
    }
    Ok(key)
}

/// Field names a filter will splice into SQL. Predicate strings are
/// caller-owned SQL and pass through as they are.
fn filter_keys(filter: &CanonicalFilter) -> Vec<&str> {
    match filter {
        CanonicalFilter::Structured(structured) => structured.conditions().map(|c| c.key.as_str()).collect(),
        CanonicalFilter::Simple(simple) => simple.iter().map(|(key, _)| key).collect(),
        CanonicalFilter::Predicate(_) => Vec::new(),
    }
}

fn column_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "BOOLEAN",
        Value::Number(_) => "DOUBLE PRECISION",
        Value::Array(_) | Value::Object(_) => "JSONB",
        Value::Null | Value::String(_) => "TEXT",
    }
}

fn literal(value: &Value) -> String {
    match FilterValue::from_json(value) {
        Some(scalar) => format_value(&scalar),
        None => escape_string(&value.to_string()),
    }
}

/// Text key stored in the `id` column
fn id_key(id: &PointId) -> String {
    match id {
        PointId::Num(n) => format!("n{:020}", n),
        PointId::Uuid(u) => format!("u{}", u.hyphenated()),
    }
}

fn id_literal(id: &PointId) -> String {
    escape_string(&id_key(id))
}

/// `has_id` conditions target the id column whatever their key says
fn rewrite_id_conditions(filter: &CanonicalFilter) -> CanonicalFilter {
    let CanonicalFilter::Structured(structured) = filter else {
        return filter.clone();
    };
    let rewrite = |conditions: &[Condition]| -> Vec<Condition> {
        conditions
            .iter()
            .map(|condition| match condition.shape() {
                ConditionShape::HasId(ids) => {
                    Condition::any("id", ids.iter().map(|id| FilterValue::Text(id_key(id))))
                }
                _ => condition.clone(),
            })
            .collect()
    };
    let mut structured = structured.clone();
    structured.must = rewrite(&structured.must);
    structured.should = rewrite(&structured.should);
    structured.must_not = rewrite(&structured.must_not);
    CanonicalFilter::Structured(structured)
}

fn vector_literal(vector: &[f32]) -> String {
    let components: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("'[{}]'", components.join(","))
}

fn where_clause(parts: &[String]) -> String {
    let parts: Vec<String> = parts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("({})", p))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn parse_id(value: Option<&Value>) -> VectorStoreResult<PointId> {
    let id = match value {
        Some(Value::Number(n)) => n.as_u64().map(PointId::Num),
        Some(Value::String(s)) => parse_id_key(s)
            .or_else(|| s.parse::<u64>().ok().map(PointId::Num))
            .or_else(|| Uuid::parse_str(s).ok().map(PointId::Uuid)),
        _ => None,
    };
    id.ok_or_else(|| VectorStoreError::Backend(anyhow!("row has no usable id: {:?}", value)))
}

fn parse_id_key(key: &str) -> Option<PointId> {
    if let Some(digits) = key.strip_prefix('n') {
        digits.parse::<u64>().ok().map(PointId::Num)
    } else if let Some(uuid) = key.strip_prefix('u') {
        Uuid::parse_str(uuid).ok().map(PointId::Uuid)
    } else {
        None
    }
}

fn parse_vector(value: Option<&Value>) -> VectorStoreResult<Vector> {
    match value {
        Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
        Some(array @ Value::Array(_)) => Ok(serde_json::from_value(array.clone())?),
        other => Err(VectorStoreError::Backend(anyhow!("row has no usable vector: {:?}", other))),
    }
}

fn row_payload(row: &SqlRow) -> Payload {
    row.iter()
        .filter(|(column, value)| !RESERVED_COLUMNS.contains(&column.as_str()) && !value.is_null())
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}

/// SQL-backed vector store
pub struct SqlVectorStore {
    config: VectorStoreConfig,
    executor: Arc<dyn SqlExecutor>,
}

impl SqlVectorStore {
    pub fn new(config: VectorStoreConfig, executor: Arc<dyn SqlExecutor>) -> VectorStoreResult<Self> {
        validate_identifier(&config.collection)?;
        Ok(Self { config, executor })
    }

    fn table(&self) -> &str {
        &self.config.collection
    }

    fn predicate(&self, filter: Option<&CanonicalFilter>) -> VectorStoreResult<String> {
        let rewritten = filter.map(rewrite_id_conditions);
        let filter = rewritten.as_ref();
        if let Some(filter) = filter {
            for key in filter_keys(filter) {
                validate_identifier(key)?;
            }
        }
        Ok(match self.compile_filter(filter) {
            CompiledFilter::Predicate(predicate) => predicate,
            CompiledFilter::Structured(_) => filter.map(CanonicalFilter::to_predicate_string).unwrap_or_default(),
        })
    }

    /// Add a column for every payload key, typed from its first non-null
    /// value. Keys that only ever hold null become TEXT.
    async fn ensure_columns<'a>(&self, payloads: impl Iterator<Item = &'a Payload>) -> VectorStoreResult<()> {
        let payloads: Vec<&Payload> = payloads.collect();
        let mut columns: Vec<(&str, &'static str)> = Vec::new();
        let mut seen = BTreeSet::new();
        for payload in &payloads {
            for (key, value) in payload.iter() {
                validate_payload_key(key)?;
                if !value.is_null() && seen.insert(key.as_str()) {
                    columns.push((key.as_str(), column_type(value)));
                }
            }
        }
        for payload in &payloads {
            for key in payload.keys() {
                if seen.insert(key.as_str()) {
                    columns.push((key.as_str(), "TEXT"));
                }
            }
        }
        for (column, sql_type) in columns {
            let statement = format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
                self.table(),
                column,
                sql_type
            );
            self.executor.execute(&statement).await?;
        }
        Ok(())
    }

    async fn count(&self, statement: &str) -> VectorStoreResult<u64> {
        let rows = self.executor.query(statement).await?;
        let value = rows.first().and_then(|row| row.get("count"));
        let count = match value {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        count.ok_or_else(|| VectorStoreError::Backend(anyhow!("count query returned {:?}", value)))
    }

    fn insert_statement(&self, points: &[VectorPoint]) -> String {
        let mut columns: Vec<&str> = Vec::new();
        for point in points {
            for key in point.payload.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }

        let rows: Vec<String> = points
            .iter()
            .map(|point| {
                let mut values = vec![id_literal(&point.id), vector_literal(&point.vector)];
                values.extend(
                    columns
                        .iter()
                        .map(|column| point.payload.get(*column).map_or_else(|| "NULL".to_string(), literal)),
                );
                format!("({})", values.join(", "))
            })
            .collect();

        let updates: Vec<String> = std::iter::once("vector")
            .chain(columns.iter().copied())
            .map(|column| format!("{} = EXCLUDED.{}", column, column))
            .collect();

        let mut all_columns = vec!["id", "vector"];
        all_columns.extend(columns.iter().copied());
        format!(
            "INSERT INTO {} ({}) VALUES {} ON CONFLICT (id) DO UPDATE SET {}",
            self.table(),
            all_columns.join(", "),
            rows.join(", "),
            updates.join(", ")
        )
    }
}

#[async_trait]
impl VectorStore for SqlVectorStore {
    fn backend_name(&self) -> &'static str {
        "sql"
    }

    fn filter_dialect(&self) -> FilterDialect {
        FilterDialect::Predicate
    }

    async fn initialize(&self) -> VectorStoreResult<()> {
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, vector VECTOR({}) NOT NULL)",
            self.table(),
            self.config.dimension
        );
        self.executor.execute(&statement).await?;
        tracing::info!("Initialized SQL collection '{}'", self.table());
        Ok(())
    }

    async fn is_collection_empty(&self) -> VectorStoreResult<bool> {
        let exists = format!(
            "SELECT COUNT(*) AS count FROM information_schema.tables WHERE table_name = {}",
            escape_string(self.table())
        );
        if self.count(&exists).await? == 0 {
            return Ok(true);
        }
        let rows = format!("SELECT COUNT(*) AS count FROM {}", self.table());
        Ok(self.count(&rows).await? == 0)
    }

    async fn batch_save_data(&self, points: Vec<VectorPoint>) -> VectorStoreResult<()> {
        if points.is_empty() {
            return Ok(());
        }
        validate_points(&points, self.config.dimension)?;
        for point in &points {
            for key in point.payload.keys() {
                validate_payload_key(key)?;
            }
        }

        self.ensure_columns(points.iter().map(|p| &p.payload)).await?;
        // Single statement so the engine applies the batch atomically
        let affected = self.executor.execute(&self.insert_statement(&points)).await?;
        tracing::debug!("Upserted {} row(s) into '{}'", affected, self.table());
        Ok(())
    }

    async fn batch_delete(&self, filter: &CanonicalFilter) -> VectorStoreResult<u64> {
        let predicate = self.predicate(Some(filter))?;
        ensure_delete_scope(filter, &CompiledFilter::Predicate(predicate.clone()))?;

        let statement = format!("DELETE FROM {}{}", self.table(), where_clause(&[predicate]));
        let deleted = self.executor.execute(&statement).await?;
        tracing::debug!("Deleted {} row(s) from '{}'", deleted, self.table());
        Ok(deleted)
    }

    async fn search(&self, request: SearchRequest) -> VectorStoreResult<Vec<ScoredPoint>> {
        let query = request.vector.as_ref().ok_or_else(|| {
            VectorStoreError::InvalidRequest("the sql backend needs a query vector".to_string())
        })?;
        if query.len() != self.config.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.config.dimension,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(VectorStoreError::InvalidRequest(
                "query vector has a non-finite component".to_string(),
            ));
        }

        let metric = self.config.distance;
        let distance = format!("vector {} {}", metric.sql_operator(), vector_literal(query));
        let score = metric.sql_score(&distance);

        let mut conditions = vec![self.predicate(request.filter.as_ref())?];
        if let Some(threshold) = request.score_threshold.filter(|t| t.is_finite()) {
            conditions.push(format!("{} >= {}", score, threshold));
        }
        let limit = if request.limit == 0 { self.config.default_limit } else { request.limit };
        let statement = format!(
            "SELECT *, {} AS {} FROM {}{} ORDER BY {} LIMIT {}",
            score,
            SCORE_COLUMN,
            self.table(),
            where_clause(&conditions),
            distance,
            limit
        );

        let rows = self.executor.query(&statement).await?;
        rows.iter()
            .map(|row| -> VectorStoreResult<ScoredPoint> {
                Ok(ScoredPoint {
                    id: parse_id(row.get("id"))?,
                    score: row.get(SCORE_COLUMN).and_then(Value::as_f64).unwrap_or_default() as f32,
                    payload: request.with_payload.then(|| row_payload(row)),
                    vector: if request.with_vector { Some(parse_vector(row.get("vector"))?) } else { None },
                })
            })
            .collect()
    }

    async fn scroll(&self, request: ScrollRequest) -> VectorStoreResult<ScrollPage> {
        let limit = if request.limit == 0 { self.config.default_limit } else { request.limit };
        let mut conditions = vec![self.predicate(request.filter.as_ref())?];
        if let Some(offset) = &request.offset {
            conditions.push(format!("id >= {}", id_literal(offset)));
        }
        let statement = format!(
            "SELECT * FROM {}{} ORDER BY id LIMIT {}",
            self.table(),
            where_clause(&conditions),
            limit + 1
        );

        let rows = self.executor.query(&statement).await?;
        let mut points = rows
            .iter()
            .map(|row| -> VectorStoreResult<Record> {
                Ok(Record {
                    id: parse_id(row.get("id"))?,
                    payload: request.with_payload.then(|| row_payload(row)),
                    vector: if request.with_vector { Some(parse_vector(row.get("vector"))?) } else { None },
                })
            })
            .collect::<VectorStoreResult<Vec<_>>>()?;

        let next_offset = if points.len() > limit {
            points.pop().map(|record| record.id)
        } else {
            None
        };
        Ok(ScrollPage { points, next_offset })
    }

    async fn update_payload(&self, filter: &CanonicalFilter, payload: Payload) -> VectorStoreResult<u64> {
        if payload.is_empty() {
            return Ok(0);
        }
        let predicate = self.predicate(Some(filter))?;
        self.ensure_columns(std::iter::once(&payload)).await?;

        let assignments: Vec<String> = payload
            .iter()
            .map(|(key, value)| format!("{} = {}", key, literal(value)))
            .collect();
        let statement = format!(
            "UPDATE {} SET {}{}",
            self.table(),
            assignments.join(", "),
            where_clause(&[predicate])
        );
        let updated = self.executor.execute(&statement).await?;
        tracing::debug!("Updated {} row(s) in '{}'", updated, self.table());
        Ok(updated)
    }
}
