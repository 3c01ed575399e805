/*
 * Copyright 2025 Vijaykumar Singh
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Backend-agnostic vector store contract
//!
//! Every engine accepts the same [`CanonicalFilter`] and compiles it into
//! its own dialect through [`VectorStore::compile_filter`]. Callers never
//! see the native filter form.

use async_trait::async_trait;

use super::types::{ScrollPage, ScrollRequest, SearchRequest};
use crate::core::{Payload, ScoredPoint, VectorPoint, VectorStoreError, VectorStoreResult};
use crate::filter::{compile_for, CanonicalFilter, CompiledFilter, FilterDialect};

/// Async vector store operated through one shared filter vocabulary.
///
/// Operations are independent; concurrent calls carry no ordering
/// guarantee, so callers sequence dependent calls themselves.
#[async_trait]
pub trait VectorStore: Send + Sync {
    // =============================================================================
    // IDENTIFICATION
    // =============================================================================

    fn backend_name(&self) -> &'static str;

    /// Filter dialect the underlying engine evaluates natively
    fn filter_dialect(&self) -> FilterDialect;

    // =============================================================================
    // COLLECTION LIFECYCLE
    // =============================================================================

    /// Create the collection if missing. Safe to call repeatedly.
    async fn initialize(&self) -> VectorStoreResult<()>;

    /// True when the collection holds no points, or does not exist yet
    async fn is_collection_empty(&self) -> VectorStoreResult<bool>;

    // =============================================================================
    // DATA OPERATIONS
    // =============================================================================

    /// Upsert a batch of points. The batch is validated before anything is
    /// written, so a rejected batch leaves the store untouched.
    async fn batch_save_data(&self, points: Vec<VectorPoint>) -> VectorStoreResult<()>;

    /// Delete every point matching `filter` and return how many went.
    ///
    /// A filter without constraints is refused unless it is the explicit
    /// [`CanonicalFilter::match_all`].
    async fn batch_delete(&self, filter: &CanonicalFilter) -> VectorStoreResult<u64>;

    async fn search(&self, request: SearchRequest) -> VectorStoreResult<Vec<ScoredPoint>>;

    async fn scroll(&self, request: ScrollRequest) -> VectorStoreResult<ScrollPage>;

    /// Merge `payload` into every matching point, returning the match count
    async fn update_payload(&self, filter: &CanonicalFilter, payload: Payload) -> VectorStoreResult<u64>;

    // =============================================================================
    // PROVIDED HELPERS
    // =============================================================================

    /// Approximate serialized size of a batch, for upstream batching
    fn estimate_points_size(&self, points: &[VectorPoint]) -> usize {
        estimate_points_size(points)
    }

    fn compile_filter(&self, filter: Option<&CanonicalFilter>) -> CompiledFilter {
        compile_for(filter, self.filter_dialect())
    }
}

/// Bytes per point: id + 4 per vector component + JSON payload length
pub fn estimate_points_size(points: &[VectorPoint]) -> usize {
    points
        .iter()
        .map(|point| {
            let payload_len = if point.payload.is_empty() {
                0
            } else {
                serde_json::to_string(&point.payload).map_or(0, |json| json.len())
            };
            point.id.estimated_size() + point.vector.len() * std::mem::size_of::<f32>() + payload_len
        })
        .sum()
}

/// Refuse deletes that would silently wipe the collection.
///
/// `compiled` is the filter in the engine's dialect; a predicate string
/// that recovers to nothing is treated as unconstrained as well.
pub fn ensure_delete_scope(filter: &CanonicalFilter, compiled: &CompiledFilter) -> VectorStoreResult<()> {
    if filter.is_match_all() {
        return Ok(());
    }
    if filter.is_unconstrained() || compiled.is_unconstrained() {
        tracing::warn!("Rejected delete with unconstrained filter: {:?}", filter);
        return Err(VectorStoreError::UnconstrainedDelete);
    }
    Ok(())
}

/// Check dimensions and component values of a batch before any write
pub fn validate_points(points: &[VectorPoint], dimension: usize) -> VectorStoreResult<()> {
    for point in points {
        if point.vector.len() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: point.vector.len(),
            });
        }
        if point.vector.iter().any(|v| !v.is_finite()) {
            return Err(VectorStoreError::InvalidRequest(format!(
                "point {} has a non-finite vector component",
                point.id
            )));
        }
    }
    Ok(())
}
