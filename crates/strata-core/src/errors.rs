//! Error types for the Strata core library.

/// Top-level error enum for the Strata core library.
///
/// Analyses over a snapshot are infallible by design (an empty or malformed
/// graph yields empty results, not an error), so this surface is carried only
/// by the persistence boundary and the commit-walk pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Delta error: {0}")]
    Delta(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StrataResult<T> = Result<T, StrataError>;
