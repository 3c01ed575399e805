use thiserror::Error;

/// Errors raised at the untyped filter boundary.
///
/// Translation between typed filters never fails; only classifying a raw
/// JSON value into a `CanonicalFilter` can.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Ambiguous filter shape at key '{key}': nested objects are neither a structured nor a simple filter")]
    AmbiguousShape { key: String },

    #[error("Unsupported filter input: {0}")]
    UnsupportedInput(String),

    #[error("Invalid structured filter: {0}")]
    InvalidStructured(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Refusing to delete with an unconstrained filter; pass CanonicalFilter::match_all() to delete every point")]
    UnconstrainedDelete,

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type VectorStoreResult<T> = std::result::Result<T, VectorStoreError>;
