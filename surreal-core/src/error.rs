//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum SurrealError {
    /// A stage of the same kind is already present in the pipeline.
    #[error("Attempted to double wrap with stage: {0}")]
    DoubleWrap(String),

    /// The native space is not a continuous, bounded box.
    #[error("Unsupported space: {0}")]
    UnsupportedSpace(String),

    /// An observation or a spec does not have the shape a stage expects.
    ///
    /// This indicates a misconfigured pipeline.
    #[error("Shape invariant violated: {0}")]
    ShapeInvariant(String),

    /// A stateful stage was stepped before being reset.
    #[error("{0} was stepped before reset")]
    NotReset(String),

    /// No checkpoint found in the folder.
    #[error("No checkpoint available in folder {}", .0.display())]
    NoCheckpoint(PathBuf),

    /// The iteration number of a checkpoint file could not be parsed.
    #[error("Invalid checkpoint file name: {0}")]
    InvalidCheckpointName(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The render window was closed by the user.
    #[error("Render window was closed")]
    WindowClosed,

    /// Error raised by a native backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
