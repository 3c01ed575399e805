//! SQL vector store integration tests, run against a recording executor

use super::common::*;
use anyhow::Result;
use proximadb_filter::core::{PointId, VectorStoreError};
use proximadb_filter::filter::{CanonicalFilter, Condition, SimpleFilter, StructuredFilter};
use proximadb_filter::storage::{
    ScrollRequest, SearchRequest, SqlExecutor, VectorStore, VectorStoreBackendType, VectorStoreFactory,
};
use proximadb_filter::FilterDialect;
use serde_json::json;
use std::sync::Arc;

fn sql_store(executor: Arc<MockSqlExecutor>) -> Result<Arc<dyn VectorStore>> {
    init_test_env();
    let mut config = test_store_config(3);
    config.backend = VectorStoreBackendType::Sql;
    let executor: Arc<dyn SqlExecutor> = executor;
    Ok(VectorStoreFactory::create_store(&config, Some(executor))?)
}

#[cfg(test)]
mod sql_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_builds_predicate_store() -> Result<()> {
        let store = sql_store(Arc::new(MockSqlExecutor::default()))?;
        assert_eq!(store.backend_name(), "sql");
        assert_eq!(store.filter_dialect(), FilterDialect::Predicate);
        Ok(())
    }

    #[tokio::test]
    async fn test_structured_filter_reaches_sql() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::returning(vec![vec![
            json!({"id": 2, "vector": "[0.9,0.1,0]", "category": "ai", "_score": 0.99}),
        ]]));
        let store = sql_store(executor.clone())?;

        let filter = StructuredFilter::new()
            .must(Condition::matches("category", "ai"))
            .must_not(Condition::matches("author", "O'Brien"));
        let hits = store
            .search(SearchRequest::by_vector(vec![1.0, 0.0, 0.0], 3).with_filter(filter))
            .await?;

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, PointId::Num(2));
        assert_eq!(
            executor.statements()[0],
            "SELECT *, 1 - (vector <=> '[1,0,0]') AS _score FROM test_documents \
             WHERE ((category = 'ai') AND NOT (author = 'O''Brien')) \
             ORDER BY vector <=> '[1,0,0]' LIMIT 3"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_save_writes_one_insert() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::returning(vec![]));
        let store = sql_store(executor.clone())?;
        store.batch_save_data(sample_points()).await?;

        let statements = executor.statements();
        let inserts: Vec<&String> = statements.iter().filter(|s| s.starts_with("INSERT")).collect();
        assert_eq!(inserts.len(), 1);
        assert!(inserts[0].contains("'O''Brien'"));
        assert!(inserts[0].contains("('n00000000000000000004', '[0,0,1]'"));
        assert!(inserts[0].contains(r#"'["ml","rust"]'"#));
        assert!(statements.contains(&"ALTER TABLE test_documents ADD COLUMN IF NOT EXISTS draft TEXT".to_string()));
        assert!(statements.contains(&"ALTER TABLE test_documents ADD COLUMN IF NOT EXISTS tags JSONB".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_scroll_follows_cursor() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::returning(vec![
            vec![
                json!({"id": "n00000000000000000001", "vector": [1, 0, 0]}),
                json!({"id": "n00000000000000000002", "vector": [0.9, 0.1, 0]}),
            ],
            vec![json!({"id": "n00000000000000000002", "vector": [0.9, 0.1, 0]})],
        ]));
        let store = sql_store(executor.clone())?;

        let first = store.scroll(ScrollRequest::new(1)).await?;
        assert_eq!(first.next_offset, Some(PointId::Num(2)));
        let second = store.scroll(ScrollRequest::new(1).starting_at(first.next_offset)).await?;
        assert_eq!(second.next_offset, None);
        assert_eq!(second.points[0].id, PointId::Num(2));

        assert_eq!(
            executor.statements(),
            vec![
                "SELECT * FROM test_documents ORDER BY id LIMIT 2".to_string(),
                "SELECT * FROM test_documents WHERE (id >= 'n00000000000000000002') ORDER BY id LIMIT 2".to_string(),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_mixed_ids_page_in_point_id_order() -> Result<()> {
        let uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let executor = Arc::new(MockSqlExecutor::returning(vec![vec![
            json!({"id": "n00000000000000000009", "vector": [1, 0, 0]}),
            json!({"id": "n00000000000000000010", "vector": [0, 1, 0]}),
            json!({"id": format!("u{}", uuid), "vector": [0, 0, 1]}),
        ]]));
        let store = sql_store(executor.clone())?;

        let page = store.scroll(ScrollRequest::new(2).starting_at(Some(PointId::Num(9)))).await?;
        let ids: Vec<PointId> = page.points.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![PointId::Num(9), PointId::Num(10)]);
        assert_eq!(page.next_offset, Some(PointId::Uuid(uuid.parse()?)));
        assert_eq!(
            executor.statements(),
            vec!["SELECT * FROM test_documents WHERE (id >= 'n00000000000000000009') ORDER BY id LIMIT 3".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tautological_filters_never_delete_everything() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::returning(vec![]));
        let store = sql_store(executor.clone())?;
        let filters = vec![
            StructuredFilter::new().must(Condition::except("author", Vec::<String>::new())),
            StructuredFilter::new().must(Condition::range("year", Default::default())),
        ];
        for filter in filters {
            let result = store.batch_delete(&filter.into()).await;
            assert!(matches!(result, Err(VectorStoreError::UnconstrainedDelete)));
        }
        assert!(executor.statements().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_guard_and_injection() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::returning(vec![]));
        let store = sql_store(executor.clone())?;

        let result = store.batch_delete(&CanonicalFilter::from(SimpleFilter::new())).await;
        assert!(matches!(result, Err(VectorStoreError::UnconstrainedDelete)));

        let hostile = SimpleFilter::new().with("year; DROP TABLE test_documents", 1);
        let result = store.batch_delete(&hostile.into()).await;
        assert!(matches!(result, Err(VectorStoreError::MalformedQuery(_))));

        let value_injection = SimpleFilter::new().with("author", "x' OR '1'='1");
        store.batch_delete(&value_injection.into()).await?;
        assert_eq!(
            executor.statements(),
            vec!["DELETE FROM test_documents WHERE (author = 'x'' OR ''1''=''1')".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_executor_failure_surfaces_as_backend_error() -> Result<()> {
        let executor = Arc::new(MockSqlExecutor::failing("connection reset"));
        let store = sql_store(executor)?;
        let err = store.initialize().await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Backend(_)));
        assert!(err.to_string().contains("connection reset"));
        Ok(())
    }
}
