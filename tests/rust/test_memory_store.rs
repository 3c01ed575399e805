//! In-memory vector store integration tests

use super::common::*;
use anyhow::Result;
use proximadb_filter::core::{PointId, VectorStoreError};
use proximadb_filter::filter::{CanonicalFilter, Condition, Range, SimpleFilter, StructuredFilter};
use proximadb_filter::storage::{ScrollRequest, SearchRequest, VectorStore, VectorStoreFactory};
use serde_json::json;
use std::sync::Arc;

async fn seeded_store() -> Result<Arc<dyn VectorStore>> {
    init_test_env();
    let store = VectorStoreFactory::create_store(&test_store_config(3), None)?;
    store.initialize().await?;
    store.batch_save_data(sample_points()).await?;
    Ok(store)
}

fn ids(points: impl IntoIterator<Item = PointId>) -> Vec<PointId> {
    points.into_iter().collect()
}

#[cfg(test)]
mod memory_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_filter_in_every_representation() -> Result<()> {
        let store = seeded_store().await?;
        let filters = vec![
            CanonicalFilter::from(SimpleFilter::new().with("category", "ai")),
            CanonicalFilter::from(StructuredFilter::new().must(Condition::matches("category", "ai"))),
            CanonicalFilter::predicate("category = 'ai'"),
            serde_json::from_value(json!({"category": "ai"}))?,
        ];

        for filter in filters {
            let page = store.scroll(ScrollRequest::new(10).with_filter(filter.clone())).await?;
            assert_eq!(
                ids(page.points.into_iter().map(|r| r.id)),
                vec![PointId::Num(1), PointId::Num(2)],
                "filter {:?}",
                filter
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_search_ranks_within_filter() -> Result<()> {
        let store = seeded_store().await?;
        let filter = StructuredFilter::new()
            .should(Condition::matches("category", "db"))
            .should(Condition::matches("author", "Lee"))
            .must_not(Condition::range("year", Range { lt: Some(2020.0), ..Default::default() }));

        let hits = store
            .search(SearchRequest::by_vector(vec![1.0, 0.0, 0.0], 10).with_filter(filter))
            .await?;
        assert_eq!(ids(hits.iter().map(|h| h.id.clone())), vec![PointId::Num(2), PointId::Num(3)]);
        assert!(hits[0].score > hits[1].score);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_score_threshold() -> Result<()> {
        let store = seeded_store().await?;
        let hits = store
            .search(SearchRequest::by_vector(vec![1.0, 0.0, 0.0], 10).with_score_threshold(0.9))
            .await?;
        assert_eq!(ids(hits.iter().map(|h| h.id.clone())), vec![PointId::Num(1), PointId::Num(2)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_scroll_covers_collection_once() -> Result<()> {
        let store = seeded_store().await?;
        let mut seen = Vec::new();
        let mut offset = None;
        loop {
            let page = store.scroll(ScrollRequest::new(3).starting_at(offset)).await?;
            seen.extend(page.points.into_iter().map(|r| r.id));
            offset = page.next_offset;
            if offset.is_none() {
                break;
            }
        }
        assert_eq!(seen, (1..=4u64).map(PointId::Num).collect::<Vec<_>>());
        Ok(())
    }

    #[tokio::test]
    async fn test_null_and_empty_conditions() -> Result<()> {
        let store = seeded_store().await?;

        let nulls = StructuredFilter::new().must(Condition::null("draft"));
        let page = store.scroll(ScrollRequest::new(10).with_filter(nulls)).await?;
        assert_eq!(page.points.len(), 4);

        let empty_tags = StructuredFilter::new().must(Condition::empty("tags"));
        let page = store.scroll(ScrollRequest::new(10).with_filter(empty_tags)).await?;
        assert_eq!(ids(page.points.into_iter().map(|r| r.id)), vec![PointId::Num(3), PointId::Num(4)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_then_delete() -> Result<()> {
        let store = seeded_store().await?;
        let updated = store
            .update_payload(
                &CanonicalFilter::from(SimpleFilter::new().with("category", "db")),
                payload(json!({"archived": true})),
            )
            .await?;
        assert_eq!(updated, 2);

        let deleted = store.batch_delete(&CanonicalFilter::predicate("archived = TRUE")).await?;
        assert_eq!(deleted, 2);

        let remaining = store.scroll(ScrollRequest::new(10)).await?;
        assert_eq!(ids(remaining.points.into_iter().map(|r| r.id)), vec![PointId::Num(1), PointId::Num(2)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_lossy_predicate_never_deletes_everything() -> Result<()> {
        let store = seeded_store().await?;
        let result = store.batch_delete(&CanonicalFilter::predicate("author NOT IN ('Lee')")).await;
        assert!(matches!(result, Err(VectorStoreError::UnconstrainedDelete)));
        assert!(!store.is_collection_empty().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_tautological_structured_filters_never_delete_everything() -> Result<()> {
        let store = seeded_store().await?;
        let shapeless = Condition {
            key: "category".to_string(),
            ..Default::default()
        };
        let filters = vec![
            StructuredFilter::new().must(shapeless),
            StructuredFilter::new().must(Condition::except("author", Vec::<String>::new())),
            StructuredFilter::new().must(Condition::range("year", Range::default())),
            StructuredFilter::new()
                .should(Condition::matches("category", "ai"))
                .should(Condition::range("year", Range { lt: Some(f64::INFINITY), ..Default::default() })),
        ];

        for filter in filters {
            let result = store.batch_delete(&CanonicalFilter::from(filter.clone())).await;
            assert!(
                matches!(result, Err(VectorStoreError::UnconstrainedDelete)),
                "{:?} was not refused",
                filter
            );
        }
        let page = store.scroll(ScrollRequest::new(10)).await?;
        assert_eq!(page.points.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_text_search_and_projection() -> Result<()> {
        let store = seeded_store().await?;
        let mut request = SearchRequest::by_text("obrien o'brien", 10);
        request.with_payload = false;
        let hits = store.search(request).await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, PointId::Num(1));
        assert!(hits[0].payload.is_none());
        Ok(())
    }
}
