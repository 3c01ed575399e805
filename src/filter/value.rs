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

//! Filter value model shared by every filter representation
//!
//! - [`FilterValue`]: closed scalar union compared everywhere
//! - [`Condition`]: one field-level test (match, range, null/empty, has-id)
//! - [`StructuredFilter`]: must / should / must_not condition lists
//! - [`SimpleFilter`]: ordered key -> scalar/list equality map
//! - [`CanonicalFilter`]: the tagged union callers hand to a vector store
//!
//! The JSON shape of [`StructuredFilter`] follows the structured-condition
//! dialect (`{"must": [{"key": "a", "match": {"value": 1}}]}`).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::core::PointId;

/// Predicate that matches every row; the only unconstrained filter a
/// vector store accepts for deletes.
pub const MATCH_ALL_PREDICATE: &str = "1=1";

/// Scalar filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Convert a JSON scalar; arrays and objects are not filter values
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no JSON number form and become `Null`.
impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or(Self::Null)
    }
}

impl From<&PointId> for FilterValue {
    fn from(id: &PointId) -> Self {
        match id {
            PointId::Num(n) => Self::Number((*n).into()),
            PointId::Uuid(u) => Self::Text(u.to_string()),
        }
    }
}

/// Match test carried by a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Match {
    /// Single-value equality
    Value(FilterValue),
    /// Membership in a list
    Any(Vec<FilterValue>),
    /// Exclusion from a list
    Except(Vec<FilterValue>),
    /// Substring match
    Text(String),
}

/// Numeric range; any combination of bounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl Range {
    /// Finite bounds that are present, as (SQL operator, value), in
    /// gt/gte/lt/lte order. NaN and infinite bounds are ignored.
    pub fn bounds(&self) -> Vec<(&'static str, f64)> {
        [
            (">", self.gt),
            (">=", self.gte),
            ("<", self.lt),
            ("<=", self.lte),
        ]
        .into_iter()
        .filter_map(|(op, bound)| bound.filter(|v| v.is_finite()).map(|v| (op, v)))
        .collect()
    }

    pub fn is_unbounded(&self) -> bool {
        self.bounds().is_empty()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.bounds().into_iter().all(|(op, bound)| match op {
            ">" => value > bound,
            ">=" => value >= bound,
            "<" => value < bound,
            _ => value <= bound,
        })
    }
}

/// One named predicate on a field.
///
/// Exactly one shape is expected to be set. When several are, the first
/// in `match`, `range`, `is_null`, `is_empty`, `has_id` order is used; when
/// none is, the condition is unset and compiles fail-open.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<Match>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_id: Option<Vec<PointId>>,
}

/// Resolved shape of a condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionShape<'a> {
    Match(&'a Match),
    Range(&'a Range),
    IsNull,
    IsEmpty,
    HasId(&'a [PointId]),
    Unset,
}

impl Condition {
    fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn matches(key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            r#match: Some(Match::Value(value.into())),
            ..Self::keyed(key)
        }
    }

    pub fn any<V: Into<FilterValue>>(key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            r#match: Some(Match::Any(values.into_iter().map(Into::into).collect())),
            ..Self::keyed(key)
        }
    }

    pub fn except<V: Into<FilterValue>>(key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            r#match: Some(Match::Except(values.into_iter().map(Into::into).collect())),
            ..Self::keyed(key)
        }
    }

    pub fn text(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            r#match: Some(Match::Text(text.into())),
            ..Self::keyed(key)
        }
    }

    pub fn range(key: impl Into<String>, range: Range) -> Self {
        Self {
            range: Some(range),
            ..Self::keyed(key)
        }
    }

    pub fn null(key: impl Into<String>) -> Self {
        Self {
            is_null: Some(true),
            ..Self::keyed(key)
        }
    }

    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            is_empty: Some(true),
            ..Self::keyed(key)
        }
    }

    pub fn has_ids(key: impl Into<String>, ids: impl IntoIterator<Item = PointId>) -> Self {
        Self {
            has_id: Some(ids.into_iter().collect()),
            ..Self::keyed(key)
        }
    }

    pub fn shape(&self) -> ConditionShape<'_> {
        if let Some(m) = &self.r#match {
            ConditionShape::Match(m)
        } else if let Some(range) = &self.range {
            ConditionShape::Range(range)
        } else if self.is_null == Some(true) {
            ConditionShape::IsNull
        } else if self.is_empty == Some(true) {
            ConditionShape::IsEmpty
        } else if let Some(ids) = &self.has_id {
            ConditionShape::HasId(ids)
        } else {
            ConditionShape::Unset
        }
    }

    /// True when the condition holds for every point: no shape, an empty
    /// exclusion list, or a range without finite bounds.
    pub fn is_tautology(&self) -> bool {
        match self.shape() {
            ConditionShape::Unset => true,
            ConditionShape::Match(Match::Except(values)) => values.is_empty(),
            ConditionShape::Range(range) => range.is_unbounded(),
            _ => false,
        }
    }

    /// True when the condition holds for no point: an empty `any` or `has_id` list.
    pub fn is_contradiction(&self) -> bool {
        match self.shape() {
            ConditionShape::Match(Match::Any(values)) => values.is_empty(),
            ConditionShape::HasId(ids) => ids.is_empty(),
            _ => false,
        }
    }
}

/// Boolean tree of typed conditions. Empty lists mean "no constraint".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Condition>,
}

impl StructuredFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, condition: Condition) -> Self {
        self.must.push(condition);
        self
    }

    pub fn should(mut self, condition: Condition) -> Self {
        self.should.push(condition);
        self
    }

    pub fn must_not(mut self, condition: Condition) -> Self {
        self.must_not.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// True when every point passes, either because the filter is empty or
    /// because each clause reduces to `1=1`.
    pub fn is_unconstrained(&self) -> bool {
        self.must.iter().all(Condition::is_tautology)
            && (self.should.is_empty() || self.should.iter().any(Condition::is_tautology))
            && self.must_not.iter().all(Condition::is_contradiction)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.must.iter().chain(&self.should).chain(&self.must_not)
    }
}

/// Value side of a simple filter entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimpleValue {
    Scalar(FilterValue),
    /// Any of the listed values
    List(Vec<FilterValue>),
}

macro_rules! impl_scalar_simple_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SimpleValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_simple_value!(FilterValue, &str, String, bool, i32, i64, u64, f64);

impl<T: Into<FilterValue>> From<Vec<T>> for SimpleValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Flat key -> value/list equality filter, always a conjunction.
///
/// Entries keep insertion order, which is also the order of the compiled
/// conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleFilter {
    entries: Vec<(String, SimpleValue)>,
}

impl SimpleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SimpleValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SimpleValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SimpleValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SimpleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<SimpleValue>> FromIterator<(K, V)> for SimpleFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (key, value) in iter {
            filter.insert(key, value);
        }
        filter
    }
}

impl Serialize for SimpleFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SimpleFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SimpleFilterVisitor;

        impl<'de> Visitor<'de> for SimpleFilterVisitor {
            type Value = SimpleFilter;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to scalars or lists of scalars")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut filter = SimpleFilter::new();
                while let Some((key, value)) = access.next_entry::<String, SimpleValue>()? {
                    filter.insert(key, value);
                }
                Ok(filter)
            }
        }

        deserializer.deserialize_map(SimpleFilterVisitor)
    }
}

/// The filter callers pass to a vector store; "absent" is `Option::None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalFilter {
    Structured(StructuredFilter),
    /// Backend-native textual predicate, e.g. a SQL `WHERE` body
    Predicate(String),
    Simple(SimpleFilter),
}

impl CanonicalFilter {
    /// Explicit always-true filter
    pub fn match_all() -> Self {
        Self::Predicate(MATCH_ALL_PREDICATE.to_string())
    }

    pub fn predicate(predicate: impl Into<String>) -> Self {
        Self::Predicate(predicate.into())
    }

    /// True when the filter places no constraint at all
    pub fn is_unconstrained(&self) -> bool {
        match self {
            Self::Structured(filter) => filter.is_unconstrained(),
            Self::Predicate(predicate) => predicate.trim().is_empty(),
            Self::Simple(filter) => filter.is_empty(),
        }
    }

    /// True only for the explicit tautology produced by [`CanonicalFilter::match_all`]
    pub fn is_match_all(&self) -> bool {
        match self {
            Self::Predicate(predicate) => {
                let compact: String = predicate.split_whitespace().collect();
                compact == MATCH_ALL_PREDICATE || compact.eq_ignore_ascii_case("true")
            }
            _ => false,
        }
    }
}

impl From<StructuredFilter> for CanonicalFilter {
    fn from(filter: StructuredFilter) -> Self {
        Self::Structured(filter)
    }
}

impl From<SimpleFilter> for CanonicalFilter {
    fn from(filter: SimpleFilter) -> Self {
        Self::Simple(filter)
    }
}

impl From<String> for CanonicalFilter {
    fn from(predicate: String) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<&str> for CanonicalFilter {
    fn from(predicate: &str) -> Self {
        Self::Predicate(predicate.to_string())
    }
}
