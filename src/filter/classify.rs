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

//! Classification of untyped JSON filter input
//!
//! Rules, in priority order:
//! 1. a string is a predicate string
//! 2. an object exposing `must`, `should` or `must_not` as an array is a
//!    structured filter
//! 3. an object whose values are all scalars or arrays of scalars is a
//!    simple filter
//!
//! Anything else is rejected with [`FilterError::AmbiguousShape`] rather
//! than being reinterpreted as a simple filter and losing information.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::value::{CanonicalFilter, FilterValue, SimpleFilter, SimpleValue, StructuredFilter};
use crate::core::FilterError;

const STRUCTURED_KEYS: [&str; 3] = ["must", "should", "must_not"];

fn simple_value(key: &str, value: &Value) -> Result<SimpleValue, FilterError> {
    if let Some(scalar) = FilterValue::from_json(value) {
        return Ok(SimpleValue::Scalar(scalar));
    }
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                FilterValue::from_json(item).ok_or_else(|| FilterError::AmbiguousShape { key: key.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SimpleValue::List),
        _ => Err(FilterError::AmbiguousShape { key: key.to_string() }),
    }
}

impl CanonicalFilter {
    /// Classify a raw JSON filter. `null` means "no filter".
    pub fn from_json(value: &Value) -> Result<Option<Self>, FilterError> {
        match value {
            Value::Null => Ok(None),
            Value::String(predicate) => Ok(Some(Self::Predicate(predicate.clone()))),
            Value::Object(map) => {
                let structured = STRUCTURED_KEYS
                    .iter()
                    .any(|k| map.get(*k).map_or(false, Value::is_array));
                if structured {
                    let filter: StructuredFilter =
                        serde_json::from_value(value.clone()).map_err(FilterError::InvalidStructured)?;
                    return Ok(Some(Self::Structured(filter)));
                }

                let mut filter = SimpleFilter::new();
                for (key, entry) in map {
                    filter.insert(key.clone(), simple_value(key, entry)?);
                }
                Ok(Some(Self::Simple(filter)))
            }
            Value::Array(_) => Err(FilterError::UnsupportedInput(
                "a top-level array is not a filter".to_string(),
            )),
            Value::Bool(_) | Value::Number(_) => Err(FilterError::UnsupportedInput(format!(
                "scalar {} is not a filter",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for CanonicalFilter {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)?
            .ok_or_else(|| FilterError::UnsupportedInput("null is an absent filter".to_string()))
    }
}

impl<'de> Deserialize<'de> for CanonicalFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}
