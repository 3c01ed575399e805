//! Filter translation integration tests

use super::common::*;
use proptest::prelude::*;
use proximadb_filter::filter::{
    escape_string, format_value, recover_structured, CanonicalFilter, Condition, FilterDialect,
    FilterValue, Match, Range, SimpleFilter, SimpleValue, StructuredFilter,
};
use proximadb_filter::FilterError;
use serde_json::json;

#[cfg(test)]
mod translation_tests {
    use super::*;

    #[test]
    fn test_json_boundary_to_sql() {
        init_test_env();

        let structured: CanonicalFilter = serde_json::from_value(json!({
            "must": [
                {"key": "category", "match": {"any": ["ai", "db"]}},
                {"key": "year", "range": {"gte": 2020, "lt": 2024}}
            ],
            "must_not": [{"key": "author", "match": {"value": "O'Brien"}}]
        }))
        .unwrap();

        assert_eq!(
            structured.to_predicate_string(),
            "(category IN ('ai', 'db') AND (year >= 2020 AND year < 2024)) AND NOT (author = 'O''Brien')"
        );
    }

    #[test]
    fn test_every_condition_shape() {
        let filter = StructuredFilter::new()
            .should(Condition::matches("a", "x"))
            .should(Condition::matches("b", FilterValue::Null))
            .should(Condition::any("c", vec![1, 2]))
            .should(Condition::except("d", vec!["p"]))
            .should(Condition::text("e", "50%"))
            .should(Condition::range("f", Range { gt: Some(1.5), ..Default::default() }))
            .should(Condition::null("g"))
            .should(Condition::empty("h"))
            .should(Condition::has_ids("id", vec![7u64.into()]));

        assert_eq!(
            CanonicalFilter::from(filter).to_predicate_string(),
            "(a = 'x' OR b IS NULL OR c IN (1, 2) OR d NOT IN ('p') OR e LIKE '%50%%' \
             OR f > 1.5 OR g IS NULL OR (h IS NULL OR h = '') OR id IN (7))"
        );
    }

    #[test]
    fn test_unset_condition_fails_open() {
        let unset = Condition {
            key: "ghost".to_string(),
            ..Default::default()
        };
        let filter = StructuredFilter::new().must(unset).must(Condition::matches("a", 1));
        assert_eq!(CanonicalFilter::from(filter).to_predicate_string(), "(1=1 AND a = 1)");
    }

    #[test]
    fn test_ambiguous_json_is_rejected() {
        let err = serde_json::from_value::<CanonicalFilter>(json!({"meta": {"author": "x"}})).unwrap_err();
        assert!(err.to_string().contains("meta"));

        let err = CanonicalFilter::from_json(&json!({"meta": {"author": "x"}})).unwrap_err();
        assert!(matches!(err, FilterError::AmbiguousShape { .. }));
    }

    #[test]
    fn test_dialect_dispatch_agrees() {
        let filter = CanonicalFilter::from(SimpleFilter::new().with("status", "active").with("rank", vec![1, 2]));
        let predicate = filter.compile_for(FilterDialect::Predicate);
        let structured = filter.compile_for(FilterDialect::Structured);

        let recovered = match predicate {
            proximadb_filter::CompiledFilter::Predicate(sql) => recover_structured(&sql),
            other => panic!("expected predicate, got {:?}", other),
        };
        assert_eq!(proximadb_filter::CompiledFilter::Structured(recovered), structured);
    }

    #[test]
    fn test_match_value_serializes_as_tagged_object() {
        let condition = Condition::matches("a", 1);
        let encoded = serde_json::to_value(&condition).unwrap();
        assert_eq!(encoded["match"], json!({"value": 1}));
        assert_eq!(condition.r#match, Some(Match::Value(FilterValue::from(1))));
    }
}

/// Finite floats across the whole range, including values whose shortest
/// form would be written with an exponent
fn float() -> impl Strategy<Value = FilterValue> {
    prop_oneof![
        any::<f64>().prop_filter("finite", |v| v.is_finite()),
        -1e300..1e300f64,
        -1e-12..1e-12f64,
        Just(1e20),
        Just(1.5e-7),
        Just(2.0),
    ]
    .prop_map(FilterValue::from)
}

fn scalar() -> impl Strategy<Value = FilterValue> {
    prop_oneof![
        Just(FilterValue::Null),
        any::<bool>().prop_map(FilterValue::Bool),
        any::<i64>().prop_map(FilterValue::from),
        float(),
        "[a-zA-Z0-9' _%-]{0,12}".prop_map(FilterValue::Text),
    ]
}

fn simple_filter() -> impl Strategy<Value = SimpleFilter> {
    prop::collection::btree_map(
        "f_[a-z0-9]{0,6}",
        prop_oneof![
            scalar().prop_map(SimpleValue::Scalar),
            prop::collection::vec(
                prop_oneof![
                    any::<i64>().prop_map(FilterValue::from),
                    float(),
                    "[a-zA-Z0-9' _-]{0,8}".prop_map(FilterValue::Text)
                ],
                1..4
            )
            .prop_map(SimpleValue::List),
        ],
        1..5,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_escaped_strings_have_balanced_quotes(text in ".*") {
        let escaped = escape_string(&text);
        prop_assert!(escaped.starts_with('\'') && escaped.ends_with('\''));
        let inner = &escaped[1..escaped.len() - 1];
        prop_assert_eq!(inner.matches('\'').count(), text.matches('\'').count() * 2);
        prop_assert_eq!(inner.replace("''", "'"), text);
    }

    #[test]
    fn prop_text_values_always_quoted(text in "[^\\x00]{0,16}") {
        let formatted = format_value(&FilterValue::Text(text));
        prop_assert!(formatted.starts_with('\''));
        prop_assert!(formatted.ends_with('\''));
    }

    #[test]
    fn prop_simple_round_trip_recovers_each_value(filter in simple_filter()) {
        let sql = CanonicalFilter::from(filter.clone()).to_predicate_string();
        let mut recovered = recover_structured(&sql).must;

        let mut expected: Vec<Condition> = filter
            .iter()
            .map(|(key, value)| match value {
                SimpleValue::Scalar(v) => Condition::matches(key, v.clone()),
                SimpleValue::List(values) => Condition::any(key, values.iter().cloned()),
            })
            .collect();
        recovered.sort_by(|a, b| a.key.cmp(&b.key));
        expected.sort_by(|a, b| a.key.cmp(&b.key));
        prop_assert_eq!(recovered, expected, "predicate: {}", sql);
    }

    #[test]
    fn prop_formatted_floats_read_back_unchanged(value in float()) {
        let formatted = format_value(&value);
        prop_assert!(!formatted.contains('e'), "{}", formatted);
        let recovered = recover_structured(&format!("x = {}", formatted)).must;
        prop_assert_eq!(recovered, vec![Condition::matches("x", value)]);
    }
}
