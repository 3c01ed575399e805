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

//! # ProximaDB Filter - one filter vocabulary for every vector engine
//!
//! Callers describe a filter once, as a [`CanonicalFilter`], and any
//! [`VectorStore`] compiles it into whatever its engine understands:
//!
//! - **Structured**: `must` / `should` / `must_not` condition trees
//! - **Predicate**: SQL `WHERE` bodies with safely escaped literals
//! - **Simple**: flat `key -> value` maps (conjunctive equality / membership)
//!
//! ## Layout
//!
//! - [`filter`]: filter types, translation, value escaping, best-effort
//!   predicate recovery and in-process evaluation
//! - [`storage`]: the async [`VectorStore`] contract, memory and SQL
//!   backends, and size-bounded batching
//! - [`compute`]: similarity metrics
//! - [`core`]: shared types, errors, configuration and tracing setup
//!
//! ```
//! use proximadb_filter::{CanonicalFilter, SimpleFilter};
//!
//! let filter = CanonicalFilter::from(SimpleFilter::new().with("status", "active"));
//! assert_eq!(filter.to_predicate_string(), "status = 'active'");
//! ```

pub mod compute;
pub mod core;
pub mod filter;
pub mod storage;

pub use crate::core::*;
pub use compute::{DistanceCompute, DistanceMetric};
pub use filter::{
    CanonicalFilter, CompiledFilter, Condition, FilterDialect, FilterValue, Match, Range, SimpleFilter,
    SimpleValue, StructuredFilter,
};
pub use storage::{
    ScrollPage, ScrollRequest, SearchRequest, SqlExecutor, VectorStore, VectorStoreBackendType,
    VectorStoreFactory,
};
