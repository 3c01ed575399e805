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

//! Request and response types for the vector store contract

use serde::{Deserialize, Serialize};

use crate::core::{PointId, Record, Vector};
use crate::filter::CanonicalFilter;

/// Similarity search request.
///
/// At least one of `vector` or `text` must be set. A `limit` of zero falls
/// back to the store's configured default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub vector: Option<Vector>,
    pub text: Option<String>,
    pub limit: usize,
    pub filter: Option<CanonicalFilter>,
    /// Drop hits scoring below this value
    pub score_threshold: Option<f32>,
    pub with_payload: bool,
    pub with_vector: bool,
}

impl SearchRequest {
    pub fn by_vector(vector: Vector, limit: usize) -> Self {
        Self {
            vector: Some(vector),
            text: None,
            limit,
            filter: None,
            score_threshold: None,
            with_payload: true,
            with_vector: false,
        }
    }

    pub fn by_text(text: impl Into<String>, limit: usize) -> Self {
        Self {
            vector: None,
            text: Some(text.into()),
            ..Self::by_vector(Vec::new(), limit)
        }
    }

    pub fn with_filter(mut self, filter: impl Into<CanonicalFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn with_vectors(mut self) -> Self {
        self.with_vector = true;
        self
    }
}

/// One page of a filtered scan ordered by point id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub filter: Option<CanonicalFilter>,
    pub limit: usize,
    /// Cursor: first id of the page, taken from a previous `next_offset`
    pub offset: Option<PointId>,
    pub with_payload: bool,
    pub with_vector: bool,
}

impl ScrollRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            filter: None,
            limit,
            offset: None,
            with_payload: true,
            with_vector: false,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<CanonicalFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn starting_at(mut self, offset: Option<PointId>) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollPage {
    pub points: Vec<Record>,
    /// Cursor for the next page; `None` when the scan is exhausted
    pub next_offset: Option<PointId>,
}
