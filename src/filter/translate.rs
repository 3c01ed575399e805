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

//! Conversions between the filter representations
//!
//! All functions here are pure: no I/O, no shared state, no failure path.
//! An absent filter translates to "no constraint" in every dialect.

use serde::{Deserialize, Serialize};

use super::recover::recover_structured;
use super::sql::{compile_simple, compile_structured};
use super::value::{CanonicalFilter, Condition, SimpleFilter, SimpleValue, StructuredFilter};

/// Filter dialect a storage engine accepts natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDialect {
    /// must / should / must_not condition tree
    Structured,
    /// Flat textual predicate (SQL `WHERE` body)
    Predicate,
}

/// A filter compiled for one dialect
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFilter {
    Structured(StructuredFilter),
    Predicate(String),
}

impl CompiledFilter {
    pub fn dialect(&self) -> FilterDialect {
        match self {
            Self::Structured(_) => FilterDialect::Structured,
            Self::Predicate(_) => FilterDialect::Predicate,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::Structured(filter) => filter.is_unconstrained(),
            Self::Predicate(predicate) => predicate.trim().is_empty(),
        }
    }
}

fn simple_to_structured(filter: &SimpleFilter) -> StructuredFilter {
    let must = filter
        .iter()
        .map(|(key, value)| match value {
            SimpleValue::Scalar(v) => Condition::matches(key, v.clone()),
            SimpleValue::List(values) => Condition::any(key, values.iter().cloned()),
        })
        .collect();
    StructuredFilter {
        must,
        ..Default::default()
    }
}

/// Translate any filter into the structured dialect.
///
/// Structured input is returned unchanged. Predicate strings go through the
/// best-effort recovery scan, so disjunctions and exclusions in them are
/// not reconstructed.
pub fn to_structured(input: Option<&CanonicalFilter>) -> StructuredFilter {
    match input {
        None => StructuredFilter::default(),
        Some(CanonicalFilter::Structured(filter)) => filter.clone(),
        Some(CanonicalFilter::Simple(filter)) => simple_to_structured(filter),
        Some(CanonicalFilter::Predicate(predicate)) => recover_structured(predicate),
    }
}

/// Translate any filter into a predicate string. Predicate input is
/// returned unchanged; an absent or empty filter yields `""`.
pub fn to_predicate_string(input: Option<&CanonicalFilter>) -> String {
    match input {
        None => String::new(),
        Some(CanonicalFilter::Predicate(predicate)) => predicate.clone(),
        Some(CanonicalFilter::Simple(filter)) => compile_simple(filter),
        Some(CanonicalFilter::Structured(filter)) => compile_structured(filter),
    }
}

/// Compile an optional filter for the given dialect
pub fn compile_for(input: Option<&CanonicalFilter>, dialect: FilterDialect) -> CompiledFilter {
    let compiled = match dialect {
        FilterDialect::Structured => CompiledFilter::Structured(to_structured(input)),
        FilterDialect::Predicate => CompiledFilter::Predicate(to_predicate_string(input)),
    };
    tracing::debug!("Compiled filter for {:?} dialect: {:?}", dialect, compiled);
    compiled
}

impl CanonicalFilter {
    pub fn to_structured(&self) -> StructuredFilter {
        to_structured(Some(self))
    }

    pub fn to_predicate_string(&self) -> String {
        to_predicate_string(Some(self))
    }

    pub fn compile_for(&self, dialect: FilterDialect) -> CompiledFilter {
        compile_for(Some(self), dialect)
    }
}
