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

//! In-process evaluation of structured filters against point payloads
//!
//! Used by engines that filter natively on the structured dialect. Semantics
//! line up with the compiled predicate string wherever the two can agree:
//! missing fields behave like SQL NULL, and unset conditions pass.

use serde_json::Value;

use super::value::{Condition, ConditionShape, FilterValue, Match, StructuredFilter};
use crate::core::{Payload, PointId};

/// Resolve a field, first as a literal key, then as a dotted path
fn lookup<'a>(payload: &'a Payload, key: &str) -> Option<&'a Value> {
    if let Some(value) = payload.get(key) {
        return Some(value);
    }
    let mut parts = key.split('.');
    let mut current = payload.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Scalars a field offers for comparison; arrays offer each element
fn candidates(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn is_null_or_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn value_equals(value: &Value, expected: &FilterValue) -> bool {
    match (value, expected) {
        (Value::Null, FilterValue::Null) => true,
        (Value::Bool(a), FilterValue::Bool(b)) => a == b,
        (Value::String(a), FilterValue::Text(b)) => a == b,
        (Value::Number(a), FilterValue::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => false,
    }
}

fn any_equals(field: &Value, expected: &[FilterValue]) -> bool {
    candidates(field)
        .into_iter()
        .any(|candidate| expected.iter().any(|e| value_equals(candidate, e)))
}

fn eval_match(field: Option<&Value>, m: &Match) -> bool {
    match m {
        Match::Value(FilterValue::Null) => is_null_or_missing(field),
        Match::Value(expected) => field.map_or(false, |f| any_equals(f, std::slice::from_ref(expected))),
        Match::Any(expected) => field.map_or(false, |f| any_equals(f, expected)),
        Match::Except(excluded) if excluded.is_empty() => true,
        Match::Except(excluded) => match field {
            Some(f) if !f.is_null() => !any_equals(f, excluded),
            _ => false,
        },
        Match::Text(needle) => field.map_or(false, |f| {
            candidates(f)
                .into_iter()
                .any(|c| c.as_str().map_or(false, |s| s.contains(needle.as_str())))
        }),
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

impl Condition {
    /// Evaluate this condition for one point. `has_id` tests the point id.
    pub fn evaluate(&self, id: &PointId, payload: &Payload) -> bool {
        let field = lookup(payload, &self.key);
        match self.shape() {
            ConditionShape::Match(m) => eval_match(field, m),
            ConditionShape::Range(range) => {
                if range.is_unbounded() {
                    return true;
                }
                field.map_or(false, |f| {
                    candidates(f)
                        .into_iter()
                        .filter_map(Value::as_f64)
                        .any(|v| range.contains(v))
                })
            }
            ConditionShape::IsNull => is_null_or_missing(field),
            ConditionShape::IsEmpty => is_empty_value(field),
            ConditionShape::HasId(ids) => ids.contains(id),
            ConditionShape::Unset => true,
        }
    }
}

impl StructuredFilter {
    /// True when the point satisfies every `must`, at least one `should`
    /// (if any are given) and no `must_not`.
    pub fn matches(&self, id: &PointId, payload: &Payload) -> bool {
        self.must.iter().all(|c| c.evaluate(id, payload))
            && (self.should.is_empty() || self.should.iter().any(|c| c.evaluate(id, payload)))
            && !self.must_not.iter().any(|c| c.evaluate(id, payload))
    }
}
