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

//! Best-effort recovery of a structured filter from a predicate string
//!
//! This is NOT a SQL parser. Four independent pattern scans run over the
//! text and every hit is appended to `must`:
//!
//! 1. equality: `ident = 'text'`, `ident = 12`, `ident = TRUE`
//! 2. membership: `ident IN (v1, v2, ...)`
//! 3. numeric range: `ident > 1`, `>=`, `<`, `<=`
//! 4. null test: `ident IS NULL`
//!
//! `AND`/`OR`/`NOT` and parentheses are ignored, as are `NOT IN` and
//! `IS NOT NULL`. The result is only faithful for simple conjunctive
//! predicates such as the ones `compile_simple` produces. Unmatched text is
//! dropped silently; recovery never fails.

use lazy_static::lazy_static;
use regex::Regex;

use super::value::{Condition, FilterValue, Range, StructuredFilter};

lazy_static! {
    static ref EQUALITY: Regex = Regex::new(
        r"\b([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*('(?:[^']|'')*'|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?|(?i:true|false)\b)"
    )
    .expect("equality pattern is valid");

    static ref MEMBERSHIP: Regex = Regex::new(
        r"(?i)\b([A-Za-z_][A-Za-z0-9_.]*)\s+(NOT\s+)?IN\s*\(((?:'(?:[^']|'')*'|[^')])*)\)"
    )
    .expect("membership pattern is valid");

    static ref LIST_ITEM: Regex = Regex::new(r"'(?:[^']|'')*'|[^,\s]+")
        .expect("list item pattern is valid");

    static ref RANGE: Regex = Regex::new(
        r"\b([A-Za-z_][A-Za-z0-9_.]*)\s*(>=|<=|>|<)\s*(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)"
    )
    .expect("range pattern is valid");

    static ref NULL_TEST: Regex = Regex::new(
        r"(?i)\b([A-Za-z_][A-Za-z0-9_.]*)\s+IS\s+(NOT\s+)?NULL\b"
    )
    .expect("null test pattern is valid");
}

fn unquote(literal: &str) -> String {
    literal[1..literal.len() - 1].replace("''", "'")
}

fn parse_number(token: &str) -> Option<FilterValue> {
    if let Ok(n) = token.parse::<i64>() {
        return Some(FilterValue::from(n));
    }
    if let Ok(n) = token.parse::<u64>() {
        return Some(FilterValue::from(n));
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FilterValue::from)
}

fn parse_literal(token: &str) -> FilterValue {
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        return FilterValue::Text(unquote(token));
    }
    if token.eq_ignore_ascii_case("true") {
        return FilterValue::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return FilterValue::Bool(false);
    }
    if token.eq_ignore_ascii_case("null") {
        return FilterValue::Null;
    }
    parse_number(token).unwrap_or_else(|| FilterValue::Text(token.trim_matches('\'').to_string()))
}

fn range_for(op: &str, bound: f64) -> Range {
    let mut range = Range::default();
    match op {
        ">" => range.gt = Some(bound),
        ">=" => range.gte = Some(bound),
        "<" => range.lt = Some(bound),
        _ => range.lte = Some(bound),
    }
    range
}

/// Recover a structured filter from a predicate string.
///
/// All recovered conditions land in `must`, in scan order (equality,
/// membership, range, null tests).
pub fn recover_structured(predicate: &str) -> StructuredFilter {
    let mut must = Vec::new();

    for caps in EQUALITY.captures_iter(predicate) {
        must.push(Condition::matches(&caps[1], parse_literal(&caps[2])));
    }

    for caps in MEMBERSHIP.captures_iter(predicate) {
        if caps.get(2).is_some() {
            continue;
        }
        let values: Vec<FilterValue> = LIST_ITEM
            .find_iter(&caps[3])
            .map(|item| parse_literal(item.as_str()))
            .collect();
        must.push(Condition::any(&caps[1], values));
    }

    for caps in RANGE.captures_iter(predicate) {
        if let Ok(bound) = caps[3].parse::<f64>() {
            must.push(Condition::range(&caps[1], range_for(&caps[2], bound)));
        }
    }

    for caps in NULL_TEST.captures_iter(predicate) {
        if caps.get(2).is_none() {
            must.push(Condition::matches(&caps[1], FilterValue::Null));
        }
    }

    tracing::debug!("Recovered {} condition(s) from predicate string", must.len());
    StructuredFilter {
        must,
        ..Default::default()
    }
}
