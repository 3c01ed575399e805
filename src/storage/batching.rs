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

//! Size-bounded batching of point uploads

use super::traits::VectorStore;
use crate::core::{VectorPoint, VectorStoreResult};

/// Split `points` into consecutive batches whose estimated size stays
/// within `max_batch_bytes`. A point larger than the limit on its own
/// forms a single-point batch. Input order is preserved.
pub fn split_by_estimated_size(
    store: &dyn VectorStore,
    points: Vec<VectorPoint>,
    max_batch_bytes: usize,
) -> Vec<Vec<VectorPoint>> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut current_bytes = 0usize;

    for point in points {
        let size = store.estimate_points_size(std::slice::from_ref(&point));
        if !current.is_empty() && current_bytes + size > max_batch_bytes {
            batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += size;
        current.push(point);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Save `points` batch by batch, one call after the other. Returns the
/// number of batches written; stops at the first failing batch.
pub async fn save_in_batches(
    store: &dyn VectorStore,
    points: Vec<VectorPoint>,
    max_batch_bytes: usize,
) -> VectorStoreResult<usize> {
    let batches = split_by_estimated_size(store, points, max_batch_bytes);
    let total = batches.len();
    for (index, batch) in batches.into_iter().enumerate() {
        tracing::debug!("Saving batch {}/{} ({} points)", index + 1, total, batch.len());
        store.batch_save_data(batch).await?;
    }
    Ok(total)
}
