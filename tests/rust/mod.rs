//! ProximaDB Filter Integration Tests
//!
//! Exercises the filter translation layer and the vector store contract
//! through the public API. Tests are organized by functionality.

pub mod common;
pub mod test_batching;
pub mod test_filter_translation;
pub mod test_memory_store;
pub mod test_sql_store;

// Re-export common utilities
pub use common::*;
