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

//! Predicate-string compilation
//!
//! Compiles simple and structured filters into a flat SQL `WHERE` body.
//! Every literal goes through [`format_value`], which is the only place
//! responsible for quoting and escaping.
//!
//! Unrecognized condition shapes compile to the tautology `1=1`: the
//! compiled predicate can be looser than the structured input, never
//! stricter.

use super::value::{Condition, ConditionShape, FilterValue, Match, Range, SimpleFilter, SimpleValue, StructuredFilter};

const TAUTOLOGY: &str = "1=1";
const CONTRADICTION: &str = "1=0";

/// Quote a string literal, doubling embedded single quotes
pub fn escape_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Format a scalar as a SQL literal
pub fn format_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Null => "NULL".to_string(),
        FilterValue::Bool(true) => "TRUE".to_string(),
        FilterValue::Bool(false) => "FALSE".to_string(),
        FilterValue::Number(n) => format_number(n),
        FilterValue::Text(s) => escape_string(s),
    }
}

/// Integers print as they are. Floats print in plain decimal with at least
/// one fractional digit, so `1e20` is `100000000000000000000.0` and reads
/// back as the same float.
fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(v) => {
            let text = v.to_string();
            if text.contains('.') {
                text
            } else {
                format!("{}.0", text)
            }
        }
        None => n.to_string(),
    }
}

fn format_list(values: &[FilterValue]) -> String {
    values.iter().map(format_value).collect::<Vec<_>>().join(", ")
}

fn membership(key: &str, values: &[FilterValue]) -> String {
    if values.is_empty() {
        CONTRADICTION.to_string()
    } else {
        format!("{} IN ({})", key, format_list(values))
    }
}

/// Compile a simple filter: scalars become `=`, lists become `IN`, nulls
/// become `IS NULL`, all joined with `AND`.
pub fn compile_simple(filter: &SimpleFilter) -> String {
    filter
        .iter()
        .map(|(key, value)| match value {
            SimpleValue::Scalar(FilterValue::Null) => format!("{} IS NULL", key),
            SimpleValue::Scalar(v) => format!("{} = {}", key, format_value(v)),
            SimpleValue::List(values) => membership(key, values),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn compile_match(key: &str, m: &Match) -> String {
    match m {
        Match::Value(FilterValue::Null) => format!("{} IS NULL", key),
        Match::Value(v) => format!("{} = {}", key, format_value(v)),
        Match::Any(values) => membership(key, values),
        Match::Except(values) if values.is_empty() => TAUTOLOGY.to_string(),
        Match::Except(values) => format!("{} NOT IN ({})", key, format_list(values)),
        Match::Text(text) => {
            let pattern = format!("%{}%", text);
            format!("{} LIKE {}", key, escape_string(&pattern))
        }
    }
}

fn compile_range(key: &str, range: &Range) -> String {
    if range.is_unbounded() {
        return TAUTOLOGY.to_string();
    }
    range
        .bounds()
        .into_iter()
        .map(|(op, bound)| format!("{} {} {}", key, op, bound))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Compile one condition to a sub-predicate
pub fn compile_condition(condition: &Condition) -> String {
    let key = condition.key.as_str();
    match condition.shape() {
        ConditionShape::Match(m) => compile_match(key, m),
        ConditionShape::Range(range) => compile_range(key, range),
        ConditionShape::IsNull => format!("{} IS NULL", key),
        ConditionShape::IsEmpty => format!("{} IS NULL OR {} = ''", key, key),
        ConditionShape::HasId(ids) => {
            let values: Vec<FilterValue> = ids.iter().map(FilterValue::from).collect();
            membership(key, &values)
        }
        ConditionShape::Unset => {
            tracing::warn!("Condition on '{}' has no recognized shape, compiling to {}", key, TAUTOLOGY);
            TAUTOLOGY.to_string()
        }
    }
}

/// Whether a compiled fragment carries its own AND/OR
fn is_compound(condition: &Condition) -> bool {
    match condition.shape() {
        ConditionShape::IsEmpty => true,
        ConditionShape::Range(range) => range.bounds().len() > 1,
        _ => false,
    }
}

fn compile_group(conditions: &[Condition], joiner: &str) -> String {
    let wrap = conditions.len() > 1;
    conditions
        .iter()
        .map(|condition| {
            let fragment = compile_condition(condition);
            if wrap && is_compound(condition) {
                format!("({})", fragment)
            } else {
                fragment
            }
        })
        .collect::<Vec<_>>()
        .join(joiner)
}

/// Compile a structured filter.
///
/// `must` becomes `(a AND b)`, `should` becomes `(a OR b)`, `must_not`
/// becomes `NOT (a OR b)`; non-empty groups are joined with `AND`. An
/// empty filter compiles to an empty string.
pub fn compile_structured(filter: &StructuredFilter) -> String {
    let mut groups = Vec::with_capacity(3);
    if !filter.must.is_empty() {
        groups.push(format!("({})", compile_group(&filter.must, " AND ")));
    }
    if !filter.should.is_empty() {
        groups.push(format!("({})", compile_group(&filter.should, " OR ")));
    }
    if !filter.must_not.is_empty() {
        groups.push(format!("NOT ({})", compile_group(&filter.must_not, " OR ")));
    }
    groups.join(" AND ")
}
