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

pub mod backends;
pub mod batching;
pub mod traits;
pub mod types;

pub use backends::{
    BackendCapabilities, MemoryVectorStore, SqlExecutor, SqlRow, SqlVectorStore, VectorStoreBackendType,
    VectorStoreFactory,
};
pub use batching::{save_in_batches, split_by_estimated_size};
pub use traits::{estimate_points_size, VectorStore};
pub use types::{ScrollPage, ScrollRequest, SearchRequest};
