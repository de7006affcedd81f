//! Ledger events.
//!
//! Every state change records an event in an append-only log, the
//! ledger's analog of on-chain event emission. Events are queryable
//! after the fact and mirrored through `tracing`.

use serde::{Deserialize, Serialize};

use cachet_core::{Address, Locator, MessageId};

/// An event recorded by a ledger state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A message was created.
    MessageSent {
        id: MessageId,
        recipient: Address,
        signer: Address,
        content_locator: Locator,
        created_at: i64,
    },

    /// A message was soft-deleted by its recipient.
    MessageDeleted { id: MessageId, deleter: Address },
}

impl LedgerEvent {
    /// The message this event concerns.
    pub fn message_id(&self) -> MessageId {
        match self {
            LedgerEvent::MessageSent { id, .. } => *id,
            LedgerEvent::MessageDeleted { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_message_id() {
        let sent = LedgerEvent::MessageSent {
            id: MessageId::new(4),
            recipient: Address::from_bytes([1; 20]),
            signer: Address::from_bytes([2; 20]),
            content_locator: Locator::new("b3-aa"),
            created_at: 1,
        };
        assert_eq!(sent.message_id(), MessageId::new(4));

        let deleted = LedgerEvent::MessageDeleted {
            id: MessageId::new(9),
            deleter: Address::from_bytes([1; 20]),
        };
        assert_eq!(deleted.message_id(), MessageId::new(9));
    }
}
