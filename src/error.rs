//! Error types for gridscan.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridscanError>;

/// All errors the clustering pipeline can surface.
///
/// The clustering kernel itself is a pure data transform and cannot fail on
/// well-formed input; errors come from parameter validation at the boundary
/// and from the ingestion layer.
#[derive(Debug, Error)]
pub enum GridscanError {
    /// A clustering parameter was rejected by validation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input file could not be turned into a point set. The whole run
    /// aborts; there is no partial-result recovery.
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    /// Operating-system failure, e.g. a worker thread could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV structure in the input file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
