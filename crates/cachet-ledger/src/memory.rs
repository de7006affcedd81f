//! In-memory implementation of the Ledger trait.
//!
//! This is the primary backend for tests. It has the same semantics as
//! the SQLite backend but keeps everything in memory with no
//! persistence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use cachet_core::{Address, CallContext, Locator, MessageId};
use cachet_grants::{GrantsError, Handle, ProtectionRuntime, SealedInput};

use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::message::{Message, MessageMetadata, ProtectedEnvelope};
use crate::traits::Ledger;

/// In-memory ledger implementation.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock;
/// runtime calls complete before the write lock is taken, so the locked
/// section is the atomic transaction.
pub struct MemoryLedger {
    /// The ledger's own address, used for the internal self-grant.
    address: Address,

    /// The protection runtime handling proofs and grants.
    runtime: Arc<dyn ProtectionRuntime>,

    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    /// The message arena; index == id.
    messages: Vec<Message>,

    /// Index: recipient -> received ids, in creation order.
    received_by: HashMap<Address, Vec<MessageId>>,

    /// Index: signer -> sent ids, in creation order.
    sent_by: HashMap<Address, Vec<MessageId>>,

    /// Append-only event log.
    events: Vec<LedgerEvent>,
}

impl MemoryLedger {
    /// Create an empty ledger with the given self-grant address.
    pub fn new(address: Address, runtime: Arc<dyn ProtectionRuntime>) -> Self {
        Self {
            address,
            runtime,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// The ledger's own address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Import a sealed input and register grants on the minted handle.
    async fn import_and_grant(&self, input: &SealedInput, recipient: Address) -> Result<Handle> {
        let handle = self.runtime.import(input).await.map_err(map_import_err)?;

        self.runtime
            .grant(&handle, recipient)
            .await
            .map_err(|e| LedgerError::Grant(e.to_string()))?;

        // Internal self-grant, reserved for future runtime-side use
        self.runtime
            .grant(&handle, self.address)
            .await
            .map_err(|e| LedgerError::Grant(e.to_string()))?;

        Ok(handle)
    }
}

/// Classify a runtime import failure.
fn map_import_err(e: GrantsError) -> LedgerError {
    match e {
        GrantsError::ProofRejected | GrantsError::MalformedInput(_) => {
            LedgerError::ProofRejected(e.to_string())
        }
        other => LedgerError::Grant(other.to_string()),
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn submit(
        &self,
        ctx: &CallContext,
        recipient: Address,
        content_locator: Locator,
        sealed_sender: SealedInput,
        sealed_key: SealedInput,
    ) -> Result<MessageId> {
        if recipient.is_zero() {
            return Err(LedgerError::ZeroRecipient);
        }
        if content_locator.is_empty() {
            return Err(LedgerError::EmptyLocator);
        }

        // Everything fallible happens before the ledger state is touched
        let protected_sender = self.import_and_grant(&sealed_sender, recipient).await?;
        let protected_key = self.import_and_grant(&sealed_key, recipient).await?;

        let mut state = self.inner.write().unwrap();

        let id = MessageId::new(state.messages.len() as u64);
        let created_at = state
            .messages
            .last()
            .map(|m| m.created_at.max(ctx.now))
            .unwrap_or(ctx.now);

        state.messages.push(Message {
            id,
            protected_sender,
            recipient,
            content_locator: content_locator.clone(),
            protected_key,
            created_at,
            is_deleted: false,
        });
        state.received_by.entry(recipient).or_default().push(id);
        state.sent_by.entry(ctx.signer).or_default().push(id);
        state.events.push(LedgerEvent::MessageSent {
            id,
            recipient,
            signer: ctx.signer,
            content_locator,
            created_at,
        });

        tracing::info!(%id, %recipient, signer = %ctx.signer, "message committed");
        Ok(id)
    }

    async fn delete(&self, ctx: &CallContext, id: MessageId) -> Result<()> {
        let mut state = self.inner.write().unwrap();

        let message = state
            .messages
            .get_mut(id.as_u64() as usize)
            .ok_or(LedgerError::UnknownMessage(id))?;

        if message.is_deleted {
            return Err(LedgerError::Deleted(id));
        }
        if message.recipient != ctx.signer {
            return Err(LedgerError::NotRecipient {
                id,
                caller: ctx.signer,
            });
        }

        message.is_deleted = true;
        state.events.push(LedgerEvent::MessageDeleted {
            id,
            deleter: ctx.signer,
        });

        tracing::info!(%id, deleter = %ctx.signer, "message deleted");
        Ok(())
    }

    async fn retrieve(&self, ctx: &CallContext, id: MessageId) -> Result<ProtectedEnvelope> {
        let state = self.inner.read().unwrap();

        let message = state
            .messages
            .get(id.as_u64() as usize)
            .ok_or(LedgerError::UnknownMessage(id))?;

        // Deleted messages are unreadable regardless of caller
        if message.is_deleted {
            return Err(LedgerError::Deleted(id));
        }
        if message.recipient != ctx.signer {
            return Err(LedgerError::NotRecipient {
                id,
                caller: ctx.signer,
            });
        }

        Ok(ProtectedEnvelope::of(message))
    }

    async fn retrieve_metadata(&self, id: MessageId) -> Result<MessageMetadata> {
        let state = self.inner.read().unwrap();
        Ok(state
            .messages
            .get(id.as_u64() as usize)
            .map(MessageMetadata::of)
            .unwrap_or_default())
    }

    async fn list_received(&self, ctx: &CallContext) -> Result<Vec<MessageId>> {
        self.list_received_of(ctx.signer).await
    }

    async fn list_received_of(&self, address: Address) -> Result<Vec<MessageId>> {
        let state = self.inner.read().unwrap();
        Ok(state.received_by.get(&address).cloned().unwrap_or_default())
    }

    async fn list_sent(&self, address: Address) -> Result<Vec<MessageId>> {
        let state = self.inner.read().unwrap();
        Ok(state.sent_by.get(&address).cloned().unwrap_or_default())
    }

    async fn is_recipient(&self, ctx: &CallContext, id: MessageId) -> Result<bool> {
        let state = self.inner.read().unwrap();
        Ok(state
            .messages
            .get(id.as_u64() as usize)
            .map(|m| m.recipient == ctx.signer)
            .unwrap_or(false))
    }

    async fn count(&self) -> Result<u64> {
        let state = self.inner.read().unwrap();
        Ok(state.messages.len() as u64)
    }

    async fn events(&self) -> Result<Vec<LedgerEvent>> {
        let state = self.inner.read().unwrap();
        Ok(state.events.clone())
    }
}
