// Copyright 2025 ProximaDB
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Vector Store Backends
//!
//! Pluggable engines behind the [`VectorStore`] contract:
//! - **Memory**: in-process collection, structured filter dialect
//! - **Sql**: statement builder over a caller-supplied [`SqlExecutor`],
//!   predicate filter dialect

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::traits::VectorStore;
use crate::core::{VectorStoreConfig, VectorStoreError, VectorStoreResult};
use crate::filter::FilterDialect;

pub mod memory_backend;
pub mod sql_backend;

pub use memory_backend::MemoryVectorStore;
pub use sql_backend::{validate_identifier, SqlExecutor, SqlRow, SqlVectorStore};

/// Supported vector store backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreBackendType {
    /// In-memory (testing, development, embedding)
    #[default]
    Memory,

    /// SQL engine with a pgvector-style vector column
    Sql,
}

/// Backend capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendCapabilities {
    pub filter_dialect: FilterDialect,
    pub supports_text_search: bool,
    pub supports_transactions: bool,
    pub supports_persistence: bool,
    /// Identifiers spliced into statements must be plain SQL identifiers
    pub requires_identifier_keys: bool,
}

/// Vector store factory
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Create a store for the configured backend. The SQL backend needs an
    /// executor; the memory backend ignores it. The store is not initialized.
    pub fn create_store(
        config: &VectorStoreConfig,
        executor: Option<Arc<dyn SqlExecutor>>,
    ) -> VectorStoreResult<Arc<dyn VectorStore>> {
        tracing::debug!(
            "Creating {:?} vector store for collection '{}'",
            config.backend,
            config.collection
        );
        match config.backend {
            VectorStoreBackendType::Memory => Ok(Arc::new(MemoryVectorStore::new(config.clone()))),
            VectorStoreBackendType::Sql => {
                let executor = executor.ok_or_else(|| {
                    VectorStoreError::Connection("the sql backend requires a SqlExecutor".to_string())
                })?;
                Ok(Arc::new(SqlVectorStore::new(config.clone(), executor)?))
            }
        }
    }

    /// Get available backend types
    pub fn available_backends() -> Vec<VectorStoreBackendType> {
        vec![VectorStoreBackendType::Memory, VectorStoreBackendType::Sql]
    }

    /// Get backend capabilities
    pub fn backend_capabilities(backend_type: &VectorStoreBackendType) -> BackendCapabilities {
        match backend_type {
            VectorStoreBackendType::Memory => BackendCapabilities {
                filter_dialect: FilterDialect::Structured,
                supports_text_search: true,
                supports_transactions: false,
                supports_persistence: false,
                requires_identifier_keys: false,
            },
            VectorStoreBackendType::Sql => BackendCapabilities {
                filter_dialect: FilterDialect::Predicate,
                supports_text_search: false,
                supports_transactions: true,
                supports_persistence: true,
                requires_identifier_keys: true,
            },
        }
    }
}
