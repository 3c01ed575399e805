//! Batching integration tests

use super::common::*;
use anyhow::Result;
use proximadb_filter::core::{Payload, VectorPoint};
use proximadb_filter::storage::{
    estimate_points_size, save_in_batches, split_by_estimated_size, MemoryVectorStore, VectorStore,
};
use serde_json::json;

#[cfg(test)]
mod batching_tests {
    use super::*;

    #[test]
    fn test_batches_stay_under_limit() {
        init_test_env();
        let store = MemoryVectorStore::new(test_store_config(3));
        let points = sample_points();
        let limit = estimate_points_size(&points[..2]);

        let batches = split_by_estimated_size(&store, points.clone(), limit);
        for batch in &batches {
            assert!(batch.len() == 1 || store.estimate_points_size(batch) <= limit);
        }
        let flattened: Vec<VectorPoint> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, points);
    }

    #[test]
    fn test_payload_counts_towards_size() {
        let bare = VectorPoint::new(1u64, vec![0.0; 3], Payload::new());
        let heavy = VectorPoint::new(1u64, vec![0.0; 3], payload(json!({"body": "x".repeat(100)})));
        assert!(estimate_points_size(&[heavy]) > estimate_points_size(&[bare]) + 100);
    }

    #[tokio::test]
    async fn test_save_in_batches_writes_everything() -> Result<()> {
        init_test_env();
        let store = MemoryVectorStore::new(test_store_config(3));
        store.initialize().await?;
        let written = save_in_batches(&store, sample_points(), 1).await?;
        assert_eq!(written, 4);
        assert!(!store.is_collection_empty().await?);
        Ok(())
    }
}
