//! Message records and their views.

use serde::{Deserialize, Serialize};

use cachet_core::{Address, Locator, MessageId};
use cachet_grants::Handle;

/// A message record in the ledger arena.
///
/// Immutable after creation except for `is_deleted`, which transitions
/// false→true exactly once and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sequential id, assigned at creation.
    pub id: MessageId,

    /// Handle to the ciphertext of the 160-bit logical sender identity.
    pub protected_sender: Handle,

    /// The designated recipient. Plaintext, public, used for routing and
    /// authorization.
    pub recipient: Address,

    /// Locator of the encrypted content document in the external store.
    pub content_locator: Locator,

    /// Handle to the ciphertext of the 256-bit content key.
    pub protected_key: Handle,

    /// Commit timestamp (Unix milliseconds), monotonic across ids.
    pub created_at: i64,

    /// Soft-delete flag.
    pub is_deleted: bool,
}

/// The unrestricted metadata view of a message.
///
/// Out-of-range ids read as the zeroed default rather than failing;
/// `count()` is the discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub recipient: Address,
    pub content_locator: Locator,
    pub created_at: i64,
    pub is_deleted: bool,
}

impl MessageMetadata {
    /// The metadata view of a record.
    pub fn of(message: &Message) -> Self {
        Self {
            recipient: message.recipient,
            content_locator: message.content_locator.clone(),
            created_at: message.created_at,
            is_deleted: message.is_deleted,
        }
    }
}

/// The recipient-only view of a message: everything needed to run the
/// authorized-read flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedEnvelope {
    pub protected_sender: Handle,
    pub content_locator: Locator,
    pub protected_key: Handle,
    pub created_at: i64,
}

impl ProtectedEnvelope {
    /// The protected view of a record.
    pub fn of(message: &Message) -> Self {
        Self {
            protected_sender: message.protected_sender,
            content_locator: message.content_locator.clone(),
            protected_key: message.protected_key,
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        Message {
            id: MessageId::new(3),
            protected_sender: Handle::from_bytes([1; 32]),
            recipient: Address::from_bytes([2; 20]),
            content_locator: Locator::new("b3-deadbeef"),
            protected_key: Handle::from_bytes([3; 32]),
            created_at: 1_700_000_000_000,
            is_deleted: false,
        }
    }

    #[test]
    fn test_metadata_view() {
        let message = sample_message();
        let meta = MessageMetadata::of(&message);

        assert_eq!(meta.recipient, message.recipient);
        assert_eq!(meta.content_locator, message.content_locator);
        assert_eq!(meta.created_at, message.created_at);
        assert!(!meta.is_deleted);
    }

    #[test]
    fn test_metadata_default_is_zeroed() {
        let meta = MessageMetadata::default();
        assert_eq!(meta.recipient, Address::ZERO);
        assert!(meta.content_locator.is_empty());
        assert_eq!(meta.created_at, 0);
        assert!(!meta.is_deleted);
    }

    #[test]
    fn test_envelope_view() {
        let message = sample_message();
        let envelope = ProtectedEnvelope::of(&message);

        assert_eq!(envelope.protected_sender, message.protected_sender);
        assert_eq!(envelope.protected_key, message.protected_key);
        assert_eq!(envelope.content_locator, message.content_locator);
    }
}
