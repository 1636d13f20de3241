//! Error types for the wardrobe index

use thiserror::Error;

/// Main error type for wardrobe operations
///
/// Index lookups never produce errors: absence is routine and reported as
/// `Option`/empty results. Errors come from sources that touch disk or parse
/// recipe files.
#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("Source error: {0}")]
    SourceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for wardrobe operations
pub type Result<T> = std::result::Result<T, WardrobeError>;
