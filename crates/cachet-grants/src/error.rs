//! Error types for the grants module.

use thiserror::Error;

/// The single failure surfaced by authorized decryption.
///
/// A rejected signature, an expired or not-yet-valid window, and a
/// missing grant all collapse into this one condition with no partial
/// result. The runtime logs the specific reason; callers cannot
/// distinguish them by design of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("decryption denied")]
pub struct DecryptionDenied;

/// Errors that can occur at the protection-runtime boundary.
#[derive(Debug, Error)]
pub enum GrantsError {
    /// The externally supplied ciphertext proof was rejected.
    #[error("ciphertext proof rejected")]
    ProofRejected,

    /// A sealed input was structurally invalid.
    #[error("malformed sealed input: {0}")]
    MalformedInput(String),

    /// The handle is not known to the runtime.
    #[error("unknown handle: {0}")]
    UnknownHandle(crate::handle::Handle),

    /// Sealing or unsealing a value failed.
    #[error("sealing error: {0}")]
    Sealing(String),

    /// Authorized decryption was denied.
    #[error(transparent)]
    Denied(#[from] DecryptionDenied),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for grant operations.
pub type Result<T> = std::result::Result<T, GrantsError>;
