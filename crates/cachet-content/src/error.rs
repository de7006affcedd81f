//! Error types for the content store.

use thiserror::Error;

use cachet_core::Locator;

/// Errors that can occur at the content-store boundary.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The store rejected or failed the write. The caller owns retry.
    #[error("upload failed: {0}")]
    Upload(String),

    /// No document under this locator.
    #[error("document not found: {0}")]
    NotFound(Locator),

    /// The fetched bytes do not parse as a document.
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Result type for content-store operations.
pub type Result<T> = std::result::Result<T, ContentError>;
