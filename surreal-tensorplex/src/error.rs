use thiserror::Error;

/// Errors of the metrics server.
#[derive(Debug, Error)]
pub enum TensorplexError {
    #[error("Unknown group {0}")]
    UnknownGroup(String),

    #[error("Metric of normal group {0} has no id")]
    MissingId(String),

    #[error("Metric of indexed group {0} has no index")]
    MissingIndex(String),

    #[error("Group {0} is both normal and indexed")]
    DuplicateGroup(String),

    #[error("Invalid bin sizes: {0}")]
    InvalidBinSize(String),
}
