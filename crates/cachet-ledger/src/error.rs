//! Error types for the ledger.

use thiserror::Error;

use cachet_core::{Address, MessageId};

/// The documented failure classes of ledger operations.
///
/// Tests assert the class, not the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed submission (zero recipient, empty locator).
    Validation,
    /// A non-recipient touched a protected read or delete.
    Authorization,
    /// The message does not exist or is already deleted.
    State,
    /// The protection runtime rejected a ciphertext proof.
    ProofVerification,
    /// Backend failure (database, serialization, grant registration).
    Storage,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("recipient must not be the zero address")]
    ZeroRecipient,

    #[error("content locator must not be empty")]
    EmptyLocator,

    #[error("ciphertext proof rejected: {0}")]
    ProofRejected(String),

    #[error("message {0} does not exist")]
    UnknownMessage(MessageId),

    #[error("message {0} is deleted")]
    Deleted(MessageId),

    #[error("caller {caller} is not the recipient of message {id}")]
    NotRecipient { id: MessageId, caller: Address },

    #[error("grant registration failed: {0}")]
    Grant(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid data in storage: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl LedgerError {
    /// The documented failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::ZeroRecipient | LedgerError::EmptyLocator => ErrorKind::Validation,
            LedgerError::NotRecipient { .. } => ErrorKind::Authorization,
            LedgerError::UnknownMessage(_) | LedgerError::Deleted(_) => ErrorKind::State,
            LedgerError::ProofRejected(_) => ErrorKind::ProofVerification,
            LedgerError::Grant(_)
            | LedgerError::Database(_)
            | LedgerError::InvalidData(_)
            | LedgerError::Migration(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(LedgerError::ZeroRecipient.kind(), ErrorKind::Validation);
        assert_eq!(LedgerError::EmptyLocator.kind(), ErrorKind::Validation);
        assert_eq!(
            LedgerError::NotRecipient {
                id: MessageId::new(0),
                caller: Address::ZERO,
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            LedgerError::Deleted(MessageId::new(0)).kind(),
            ErrorKind::State
        );
        assert_eq!(
            LedgerError::UnknownMessage(MessageId::new(7)).kind(),
            ErrorKind::State
        );
        assert_eq!(
            LedgerError::ProofRejected("bad".into()).kind(),
            ErrorKind::ProofVerification
        );
    }
}
