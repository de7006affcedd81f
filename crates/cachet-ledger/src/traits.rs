//! Ledger trait: the abstract interface for the system of record.
//!
//! This trait allows the protocol to be storage-agnostic. Implementations
//! include in-memory (primary for tests) and SQLite (durable).

use async_trait::async_trait;

use cachet_core::{Address, CallContext, Locator, MessageId};
use cachet_grants::SealedInput;

use crate::error::Result;
use crate::events::LedgerEvent;
use crate::message::{MessageMetadata, ProtectedEnvelope};

/// The Ledger trait: async interface for the message arena, its indices,
/// and its grant registration.
///
/// # Design Notes
///
/// - **Explicit context**: every caller-dependent operation takes a
///   [`CallContext`] carrying the signer and the clock; there is no
///   ambient "current signer" state.
/// - **Atomic mutations**: `submit` and `delete` either apply fully or
///   leave no trace. Two concurrent deletes of one id race such that
///   exactly one succeeds; the other observes the deleted state.
/// - **Delegated verification**: the ledger does not inspect ciphertexts.
///   It hands proof verification to the protection runtime and registers
///   the recipient's grant (plus its own internal self-grant) on the
///   minted handles — that grant is the sole enforcement of "only the
///   recipient can decrypt".
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a message.
    ///
    /// Validates the recipient and locator, imports both sealed inputs
    /// through the runtime, grants decryption to the recipient, appends
    /// the record and both index entries, and records a
    /// [`LedgerEvent::MessageSent`].
    ///
    /// The assigned `created_at` is `max(ctx.now, latest created_at)` so
    /// timestamps never decrease across ids.
    async fn submit(
        &self,
        ctx: &CallContext,
        recipient: Address,
        content_locator: Locator,
        sealed_sender: SealedInput,
        sealed_key: SealedInput,
    ) -> Result<MessageId>;

    /// Soft-delete a message. Recipient only; single-use.
    async fn delete(&self, ctx: &CallContext, id: MessageId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Protected reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The recipient-only view of a message.
    ///
    /// A deleted message is unreadable regardless of caller, so the
    /// deletion check precedes the caller check.
    async fn retrieve(&self, ctx: &CallContext, id: MessageId) -> Result<ProtectedEnvelope>;

    // ─────────────────────────────────────────────────────────────────────────
    // Unrestricted reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The public metadata view of a message.
    ///
    /// An out-of-range id reads as [`MessageMetadata::default`], not an
    /// error; use [`Ledger::count`] to distinguish absent ids.
    async fn retrieve_metadata(&self, id: MessageId) -> Result<MessageMetadata>;

    /// Ids received by the caller, in creation order.
    async fn list_received(&self, ctx: &CallContext) -> Result<Vec<MessageId>>;

    /// Ids received by an arbitrary address, in creation order.
    async fn list_received_of(&self, address: Address) -> Result<Vec<MessageId>>;

    /// Ids sent (signed) by an arbitrary address, in creation order.
    async fn list_sent(&self, address: Address) -> Result<Vec<MessageId>>;

    /// Whether the caller is the recipient of `id`. Never fails; an
    /// out-of-range id is simply `false`.
    async fn is_recipient(&self, ctx: &CallContext, id: MessageId) -> Result<bool>;

    /// Total messages ever created.
    async fn count(&self) -> Result<u64>;

    /// The append-only event log, in emission order.
    async fn events(&self) -> Result<Vec<LedgerEvent>>;
}
