//! Error types for the courier.

use thiserror::Error;

use cachet_content::ContentError;
use cachet_core::{CipherError, DocumentError};
use cachet_grants::{DecryptionDenied, GrantsError, Handle};
use cachet_ledger::LedgerError;

/// Errors that can occur during courier operations.
///
/// Content-store and cipher failures stay distinct from decryption
/// denial: the former are retryable or diagnosable by the caller, the
/// latter is a single opaque condition.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Content store error.
    #[error("content store error: {0}")]
    Content(#[from] ContentError),

    /// Protection runtime error.
    #[error("protection runtime error: {0}")]
    Runtime(#[from] GrantsError),

    /// Authorized decryption was denied.
    #[error(transparent)]
    Denied(#[from] DecryptionDenied),

    /// The runtime released values but not for this handle.
    #[error("runtime returned no value for handle {0}")]
    MissingValue(Handle),

    /// Content cipher error.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Document packaging error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

/// Result type for courier operations.
pub type Result<T> = std::result::Result<T, CourierError>;
