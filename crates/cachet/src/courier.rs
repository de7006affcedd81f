//! The Courier: protocol orchestration for one party.
//!
//! A courier holds a ledger identity and coordinates the content store,
//! the protection runtime, and the ledger into the two-phase send flow
//! and the authorized-read flow.

use std::sync::Arc;

use cachet_content::ContentStore;
use cachet_core::{
    Address, CallContext, ContentDocument, ContentKey, ContentKind, ContentMeta,
    EncryptedContent, Identity, Locator, MessageId,
};
use cachet_grants::{
    DecryptionAuthorization, DecryptionRequest, DecryptionSession, ProtectionRuntime, Word,
};
use cachet_ledger::Ledger;

use crate::error::{CourierError, Result};

/// The output of the prepare phase, held client-side until commit.
///
/// Nothing about it is persisted: a crash between prepare and commit
/// discards it, orphaning the uploaded document. Prepare is free to run
/// again from scratch.
#[derive(Debug)]
pub struct PreparedTransmission {
    /// Where the encrypted document landed.
    pub locator: Locator,

    /// The content key. Leaves the client only inside a sealed input.
    pub key: ContentKey,

    /// Display metadata, echoed into [`ReceivedMessage`] on the far side.
    pub meta: ContentMeta,
}

/// A fully decrypted received message.
#[derive(Debug)]
pub struct ReceivedMessage {
    pub id: MessageId,

    /// The logical sender identity recovered from the protected field.
    pub sender: Address,

    /// The decrypted content bytes.
    pub content: Vec<u8>,

    pub filename: String,
    pub mime_type: String,
    pub kind: ContentKind,
    pub created_at: i64,
}

impl ReceivedMessage {
    /// The content as UTF-8 text, if it is.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Protocol orchestrator bound to one ledger identity.
pub struct Courier {
    identity: Identity,
    ledger: Arc<dyn Ledger>,
    content: Arc<dyn ContentStore>,
    runtime: Arc<dyn ProtectionRuntime>,
}

impl Courier {
    /// Create a courier for `identity` over the given collaborators.
    pub fn new(
        identity: Identity,
        ledger: Arc<dyn Ledger>,
        content: Arc<dyn ContentStore>,
        runtime: Arc<dyn ProtectionRuntime>,
    ) -> Self {
        Self {
            identity,
            ledger,
            content,
            runtime,
        }
    }

    /// This courier's ledger address.
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    /// A call context for this courier using the system clock.
    pub fn context(&self) -> CallContext {
        CallContext::new(self.identity.address())
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Two-phase send
    // ─────────────────────────────────────────────────────────────────────────

    /// Phase 1 for a bare text message.
    pub async fn prepare_text(&self, text: &str) -> Result<PreparedTransmission> {
        self.prepare(text.as_bytes(), ContentMeta::text()).await
    }

    /// Phase 1 for an arbitrary file.
    pub async fn prepare_file(
        &self,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        content: &[u8],
    ) -> Result<PreparedTransmission> {
        self.prepare(content, ContentMeta::file(filename, mime_type))
            .await
    }

    /// Phase 1: encrypt, package, upload. Off-ledger and retryable; no
    /// state changes anywhere but the content store.
    pub async fn prepare(&self, content: &[u8], meta: ContentMeta) -> Result<PreparedTransmission> {
        let encrypted = EncryptedContent::encrypt(content);
        let document = ContentDocument::package(&encrypted, content.len(), &meta);

        // An upload failure surfaces here and blocks phase 2; retrying
        // prepare is always safe.
        let locator = self.content.put(&document).await?;

        tracing::debug!(%locator, size = content.len(), "content prepared");
        Ok(PreparedTransmission {
            locator,
            key: encrypted.key,
            meta,
        })
    }

    /// Phase 2: seal the logical sender identity and the content key for
    /// the recipient, then commit the message in a single ledger
    /// transaction.
    ///
    /// Non-idempotent: each call creates a new message. The sealing
    /// happens here, at commit time, so the protected values are bound to
    /// exactly this recipient/locator pairing.
    pub async fn commit(
        &self,
        ctx: &CallContext,
        recipient: Address,
        prepared: &PreparedTransmission,
    ) -> Result<MessageId> {
        let sealed_sender = self
            .runtime
            .encrypt_with_grant(Word::from_address(&self.identity.address()), recipient)
            .await?;
        let sealed_key = self
            .runtime
            .encrypt_with_grant(Word::from_key(&prepared.key), recipient)
            .await?;

        let id = self
            .ledger
            .submit(
                ctx,
                recipient,
                prepared.locator.clone(),
                sealed_sender,
                sealed_key,
            )
            .await?;

        tracing::info!(%id, %recipient, "transmission committed");
        Ok(id)
    }

    /// Both phases back to back, for callers with nothing to retry.
    pub async fn send_text(
        &self,
        ctx: &CallContext,
        recipient: Address,
        text: &str,
    ) -> Result<MessageId> {
        let prepared = self.prepare_text(text).await?;
        self.commit(ctx, recipient, &prepared).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorized read
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a received message: retrieve the protected envelope, run the
    /// authorized-decrypt session, fetch the document, and decrypt it.
    pub async fn read(&self, ctx: &CallContext, id: MessageId) -> Result<ReceivedMessage> {
        let envelope = self.ledger.retrieve(ctx, id).await?;

        // One-shot session; the signed authorization binds the handles,
        // this address, the window, and the session key together.
        let session = DecryptionSession::generate();
        let signed = DecryptionAuthorization::new(
            vec![envelope.protected_sender, envelope.protected_key],
            self.identity.address(),
            session.public_key(),
            ctx.now,
        )
        .sign(self.identity.keypair());

        let released = self
            .runtime
            .authorized_decrypt(&DecryptionRequest {
                signed,
                now: ctx.now,
            })
            .await?;

        let open = |handle| -> Result<Word> {
            let sealed = released
                .iter()
                .find(|v| v.handle == handle)
                .ok_or(CourierError::MissingValue(handle))?;
            Ok(session.open(sealed)?)
        };

        // Canonical widths: address from the low 160 bits, key full-width
        let sender = open(envelope.protected_sender)?.to_address();
        let key = open(envelope.protected_key)?.to_key();

        let document = self.content.get(&envelope.content_locator).await?;
        let content = document.open(&key)?;

        tracing::debug!(%id, %sender, "message read");
        Ok(ReceivedMessage {
            id,
            sender,
            content,
            filename: document.filename,
            mime_type: document.mime_type,
            kind: document.kind,
            created_at: envelope.created_at,
        })
    }

    /// Soft-delete a received message.
    pub async fn delete(&self, ctx: &CallContext, id: MessageId) -> Result<()> {
        Ok(self.ledger.delete(ctx, id).await?)
    }

    /// Ids of messages received by this courier.
    pub async fn inbox(&self, ctx: &CallContext) -> Result<Vec<MessageId>> {
        Ok(self.ledger.list_received(ctx).await?)
    }

    /// Ids of messages signed by this courier.
    pub async fn outbox(&self) -> Result<Vec<MessageId>> {
        Ok(self.ledger.list_sent(self.identity.address()).await?)
    }
}
