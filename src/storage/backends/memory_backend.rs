// Copyright 2025 ProximaDB
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! In-Memory Vector Store Backend
//!
//! Keeps one collection in a `BTreeMap` ordered by point id and evaluates
//! structured filters in process. Ideal for testing, development, and
//! embedding where persistence is not required.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::super::traits::{ensure_delete_scope, validate_points, VectorStore};
use super::super::types::{ScrollPage, ScrollRequest, SearchRequest};
use crate::compute::DistanceCompute;
use crate::core::{
    Payload, PointId, Record, ScoredPoint, VectorPoint, VectorStoreConfig, VectorStoreError,
    VectorStoreResult,
};
use crate::filter::{CanonicalFilter, CompiledFilter, FilterDialect, StructuredFilter};

type Collection = BTreeMap<PointId, VectorPoint>;

/// In-memory vector store
pub struct MemoryVectorStore {
    config: VectorStoreConfig,

    /// `None` until `initialize` creates the collection
    points: Arc<RwLock<Option<Collection>>>,

    distance: Box<dyn DistanceCompute>,
}

impl MemoryVectorStore {
    pub fn new(config: VectorStoreConfig) -> Self {
        let distance = config.distance.calculator();
        Self {
            config,
            points: Arc::new(RwLock::new(None)),
            distance,
        }
    }

    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }

    fn structured(&self, filter: Option<&CanonicalFilter>) -> StructuredFilter {
        match self.compile_filter(filter) {
            CompiledFilter::Structured(structured) => structured,
            // Unreachable for this backend; fall back to the direct translation
            CompiledFilter::Predicate(_) => filter.map(CanonicalFilter::to_structured).unwrap_or_default(),
        }
    }

    fn missing(&self) -> VectorStoreError {
        VectorStoreError::CollectionNotFound(self.config.collection.clone())
    }

    fn effective_limit(&self, limit: usize) -> usize {
        if limit == 0 {
            self.config.default_limit
        } else {
            limit
        }
    }
}

/// Lowercased string values of a payload, array elements included
fn payload_text(payload: &Payload) -> Vec<String> {
    fn collect(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.push(s.to_lowercase()),
            Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            Value::Object(map) => map.values().for_each(|item| collect(item, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    payload.values().for_each(|value| collect(value, &mut out));
    out
}

/// Fraction of query terms found in the point's string payload values
fn text_score(terms: &[String], payload: &Payload) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = payload_text(payload);
    let found = terms
        .iter()
        .filter(|term| haystack.iter().any(|text| text.contains(term.as_str())))
        .count();
    found as f32 / terms.len() as f32
}

fn project(point: &VectorPoint, with_payload: bool, with_vector: bool) -> (Option<Payload>, Option<Vec<f32>>) {
    (
        with_payload.then(|| point.payload.clone()),
        with_vector.then(|| point.vector.clone()),
    )
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn filter_dialect(&self) -> FilterDialect {
        FilterDialect::Structured
    }

    async fn initialize(&self) -> VectorStoreResult<()> {
        let mut points = self.points.write().await;
        if points.is_none() {
            *points = Some(Collection::new());
            tracing::info!(
                "Created in-memory collection '{}' (dimension {}, {:?})",
                self.config.collection,
                self.config.dimension,
                self.config.distance
            );
        }
        Ok(())
    }

    async fn is_collection_empty(&self) -> VectorStoreResult<bool> {
        let points = self.points.read().await;
        Ok(points.as_ref().map_or(true, BTreeMap::is_empty))
    }

    async fn batch_save_data(&self, points: Vec<VectorPoint>) -> VectorStoreResult<()> {
        validate_points(&points, self.config.dimension)?;

        let mut guard = self.points.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;
        let count = points.len();
        for point in points {
            collection.insert(point.id.clone(), point);
        }
        tracing::debug!("Upserted {} point(s) into '{}'", count, self.config.collection);
        Ok(())
    }

    async fn batch_delete(&self, filter: &CanonicalFilter) -> VectorStoreResult<u64> {
        let compiled = self.compile_filter(Some(filter));
        ensure_delete_scope(filter, &compiled)?;
        let structured = self.structured(Some(filter));

        let mut guard = self.points.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;
        let before = collection.len();
        collection.retain(|id, point| !structured.matches(id, &point.payload));
        let deleted = (before - collection.len()) as u64;

        tracing::debug!("Deleted {} point(s) from '{}'", deleted, self.config.collection);
        Ok(deleted)
    }

    async fn search(&self, request: SearchRequest) -> VectorStoreResult<Vec<ScoredPoint>> {
        if let Some(vector) = &request.vector {
            if vector.len() != self.config.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: vector.len(),
                });
            }
        }
        let terms: Vec<String> = match (&request.vector, &request.text) {
            (Some(_), _) => Vec::new(),
            (None, Some(text)) => text.split_whitespace().map(str::to_lowercase).collect(),
            (None, None) => {
                return Err(VectorStoreError::InvalidRequest(
                    "search needs a query vector or query text".to_string(),
                ))
            }
        };
        let filter = self.structured(request.filter.as_ref());
        let limit = self.effective_limit(request.limit);

        let guard = self.points.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        let mut hits: Vec<(f32, &VectorPoint)> = collection
            .iter()
            .filter(|(id, point)| filter.matches(id, &point.payload))
            .map(|(_, point)| {
                let score = match &request.vector {
                    Some(query) => self.distance.score(query, &point.vector),
                    None => text_score(&terms, &point.payload),
                };
                (score, point)
            })
            .filter(|(score, _)| request.vector.is_some() || *score > 0.0)
            .filter(|(score, _)| request.score_threshold.map_or(true, |t| *score >= t))
            .collect();

        // Stable sort keeps id order among equal scores
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        hits.truncate(limit);

        Ok(hits
            .into_iter()
            .map(|(score, point)| {
                let (payload, vector) = project(point, request.with_payload, request.with_vector);
                ScoredPoint {
                    id: point.id.clone(),
                    score,
                    payload,
                    vector,
                }
            })
            .collect())
    }

    async fn scroll(&self, request: ScrollRequest) -> VectorStoreResult<ScrollPage> {
        let filter = self.structured(request.filter.as_ref());
        let limit = self.effective_limit(request.limit);

        let guard = self.points.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        let candidates: Box<dyn Iterator<Item = (&PointId, &VectorPoint)>> = match &request.offset {
            Some(offset) => Box::new(collection.range(offset.clone()..)),
            None => Box::new(collection.iter()),
        };
        let mut matched: Vec<&VectorPoint> = candidates
            .filter(|(id, point)| filter.matches(id, &point.payload))
            .map(|(_, point)| point)
            .take(limit + 1)
            .collect();

        let next_offset = if matched.len() > limit {
            matched.pop().map(|point| point.id.clone())
        } else {
            None
        };

        let points = matched
            .into_iter()
            .map(|point| {
                let (payload, vector) = project(point, request.with_payload, request.with_vector);
                Record {
                    id: point.id.clone(),
                    payload,
                    vector,
                }
            })
            .collect();
        Ok(ScrollPage { points, next_offset })
    }

    async fn update_payload(&self, filter: &CanonicalFilter, payload: Payload) -> VectorStoreResult<u64> {
        let structured = self.structured(Some(filter));
        if structured.is_unconstrained() && !filter.is_unconstrained() && !filter.is_match_all() {
            tracing::warn!(
                "Filter {:?} places no constraint in the structured dialect; updating every point in '{}'",
                filter,
                self.config.collection
            );
        }

        let mut guard = self.points.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;

        let mut updated = 0u64;
        for (id, point) in collection.iter_mut() {
            if structured.matches(id, &point.payload) {
                for (key, value) in &payload {
                    point.payload.insert(key.clone(), value.clone());
                }
                updated += 1;
            }
        }
        tracing::debug!("Updated payload of {} point(s) in '{}'", updated, self.config.collection);
        Ok(updated)
    }
}
