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

//! Filter translation layer
//!
//! One canonical filter, three representations:
//! - structured (must / should / must_not condition tree)
//! - predicate string (flat SQL `WHERE` body)
//! - simple (key -> value/list equality map)
//!
//! Translation is fail-open: an unrecognized condition compiles to `1=1`.
//! A compiled predicate is only as restrictive as the structured input when
//! every condition uses one of the shapes in [`sql::compile_condition`].

pub mod classify;
pub mod eval;
pub mod recover;
pub mod sql;
pub mod translate;
pub mod value;

pub use recover::recover_structured;
pub use sql::{escape_string, format_value};
pub use translate::{compile_for, to_predicate_string, to_structured, CompiledFilter, FilterDialect};
pub use value::{
    CanonicalFilter, Condition, ConditionShape, FilterValue, Match, Range, SimpleFilter, SimpleValue,
    StructuredFilter, MATCH_ALL_PREDICATE,
};
