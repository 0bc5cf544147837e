//! Error types for the curation library.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::StageKind;
use crate::toolkit::ToolkitError;

/// Main error type for curation operations.
#[derive(Debug, Error)]
pub enum CurationError {
    /// A stage schema violated one of its own constraints.
    #[error("Invalid {stage} schema: {reason}")]
    InvalidSchema { stage: StageKind, reason: String },

    /// No stage implementation is registered for a discriminator.
    #[error("No stage is registered for '{0}'")]
    UnregisteredStage(StageKind),

    /// A stage was handed the schema of a different stage.
    #[error("The {expected} stage cannot be applied with a {found} schema")]
    SchemaMismatch { expected: StageKind, found: StageKind },

    /// The cheminformatics collaborator could not process a molecule.
    #[error("Toolkit error: {0}")]
    Toolkit(#[from] ToolkitError),

    /// A measurement table was built from inconsistent rows or columns.
    #[error("Table error: {0}")]
    Table(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a cell of a measurement file.
    #[error("Parse error at row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool for parallel row evaluation could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Empty file or no data to curate.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl CurationError {
    pub(crate) fn invalid(stage: StageKind, reason: impl Into<String>) -> Self {
        CurationError::InvalidSchema {
            stage,
            reason: reason.into(),
        }
    }
}

/// Result type alias for curation operations.
pub type Result<T> = std::result::Result<T, CurationError>;
