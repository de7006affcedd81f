//! SQLite implementation of the Ledger trait.
//!
//! This is the durable backend. It uses rusqlite with bundled SQLite;
//! each submission or deletion runs inside a SQLite transaction, which
//! provides the ledger's atomicity.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use cachet_core::{Address, CallContext, Locator, MessageId};
use cachet_grants::{GrantsError, Handle, ProtectionRuntime, SealedInput};

use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::message::{MessageMetadata, ProtectedEnvelope};
use crate::migration;
use crate::traits::Ledger;

/// SQLite-based ledger implementation.
///
/// Thread-safe via internal Mutex; runtime calls complete before the
/// connection is locked.
pub struct SqliteLedger {
    /// The ledger's own address, used for the internal self-grant.
    address: Address,

    /// The protection runtime handling proofs and grants.
    runtime: Arc<dyn ProtectionRuntime>,

    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(
        path: impl AsRef<Path>,
        address: Address,
        runtime: Arc<dyn ProtectionRuntime>,
    ) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            address,
            runtime,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory(address: Address, runtime: Arc<dyn ProtectionRuntime>) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            address,
            runtime,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The ledger's own address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Execute a blocking operation on the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| {
            LedgerError::InvalidData(format!("connection mutex poisoned: {}", e))
        })?;
        f(&conn)
    }

    /// Execute a blocking operation that needs mutable access.
    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| {
            LedgerError::InvalidData(format!("connection mutex poisoned: {}", e))
        })?;
        f(&mut conn)
    }

    /// Import a sealed input and register grants on the minted handle.
    async fn import_and_grant(&self, input: &SealedInput, recipient: Address) -> Result<Handle> {
        let handle = self.runtime.import(input).await.map_err(map_import_err)?;

        self.runtime
            .grant(&handle, recipient)
            .await
            .map_err(|e| LedgerError::Grant(e.to_string()))?;
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

/// Parse a 20-byte address blob.
fn blob_to_address(blob: Vec<u8>) -> Result<Address> {
    let arr: [u8; 20] = blob
        .try_into()
        .map_err(|_| LedgerError::InvalidData("address blob is not 20 bytes".into()))?;
    Ok(Address::from_bytes(arr))
}

/// Parse a 32-byte handle blob.
fn blob_to_handle(blob: Vec<u8>) -> Result<Handle> {
    let arr: [u8; 32] = blob
        .try_into()
        .map_err(|_| LedgerError::InvalidData("handle blob is not 32 bytes".into()))?;
    Ok(Handle::from_bytes(arr))
}

/// A message row as read from storage, before blob parsing.
struct MessageRow {
    protected_sender: Vec<u8>,
    recipient: Vec<u8>,
    content_locator: String,
    protected_key: Vec<u8>,
    created_at: i64,
    is_deleted: bool,
}

#[async_trait]
impl Ledger for SqliteLedger {
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

        let protected_sender = self.import_and_grant(&sealed_sender, recipient).await?;
        let protected_key = self.import_and_grant(&sealed_key, recipient).await?;

        let signer = ctx.signer;
        let now = ctx.now;
        let id = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let next_id: i64 =
                tx.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            let last_created: Option<i64> = tx
                .query_row(
                    "SELECT created_at FROM messages ORDER BY id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            let created_at = last_created.map(|t| t.max(now)).unwrap_or(now);

            tx.execute(
                "INSERT INTO messages
                    (id, protected_sender, recipient, content_locator, protected_key, created_at, is_deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![
                    next_id,
                    protected_sender.as_bytes().as_slice(),
                    recipient.as_bytes().as_slice(),
                    content_locator.as_str(),
                    protected_key.as_bytes().as_slice(),
                    created_at,
                ],
            )?;
            tx.execute(
                "INSERT INTO received_index (address, message_id) VALUES (?1, ?2)",
                params![recipient.as_bytes().as_slice(), next_id],
            )?;
            tx.execute(
                "INSERT INTO sent_index (address, message_id) VALUES (?1, ?2)",
                params![signer.as_bytes().as_slice(), next_id],
            )?;
            tx.execute(
                "INSERT INTO events (kind, message_id, recipient, actor, content_locator, created_at)
                 VALUES ('sent', ?1, ?2, ?3, ?4, ?5)",
                params![
                    next_id,
                    recipient.as_bytes().as_slice(),
                    signer.as_bytes().as_slice(),
                    content_locator.as_str(),
                    created_at,
                ],
            )?;

            tx.commit()?;
            Ok(MessageId::new(next_id as u64))
        })?;

        tracing::info!(%id, %recipient, %signer, "message committed");
        Ok(id)
    }

    async fn delete(&self, ctx: &CallContext, id: MessageId) -> Result<()> {
        let caller = ctx.signer;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let row: Option<(Vec<u8>, bool)> = tx
                .query_row(
                    "SELECT recipient, is_deleted FROM messages WHERE id = ?1",
                    params![id.as_u64() as i64],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (recipient_blob, is_deleted) = row.ok_or(LedgerError::UnknownMessage(id))?;
            if is_deleted {
                return Err(LedgerError::Deleted(id));
            }
            if blob_to_address(recipient_blob)? != caller {
                return Err(LedgerError::NotRecipient { id, caller });
            }

            tx.execute(
                "UPDATE messages SET is_deleted = 1 WHERE id = ?1",
                params![id.as_u64() as i64],
            )?;
            tx.execute(
                "INSERT INTO events (kind, message_id, actor) VALUES ('deleted', ?1, ?2)",
                params![id.as_u64() as i64, caller.as_bytes().as_slice()],
            )?;

            tx.commit()?;
            Ok(())
        })?;

        tracing::info!(%id, deleter = %caller, "message deleted");
        Ok(())
    }

    async fn retrieve(&self, ctx: &CallContext, id: MessageId) -> Result<ProtectedEnvelope> {
        let caller = ctx.signer;
        self.with_conn(|conn| {
            let row: Option<MessageRow> = conn
                .query_row(
                    "SELECT protected_sender, recipient, content_locator, protected_key,
                            created_at, is_deleted
                     FROM messages WHERE id = ?1",
                    params![id.as_u64() as i64],
                    |row| {
                        Ok(MessageRow {
                            protected_sender: row.get(0)?,
                            recipient: row.get(1)?,
                            content_locator: row.get(2)?,
                            protected_key: row.get(3)?,
                            created_at: row.get(4)?,
                            is_deleted: row.get(5)?,
                        })
                    },
                )
                .optional()?;

            let row = row.ok_or(LedgerError::UnknownMessage(id))?;

            // Deleted messages are unreadable regardless of caller
            if row.is_deleted {
                return Err(LedgerError::Deleted(id));
            }
            if blob_to_address(row.recipient)? != caller {
                return Err(LedgerError::NotRecipient { id, caller });
            }

            Ok(ProtectedEnvelope {
                protected_sender: blob_to_handle(row.protected_sender)?,
                content_locator: Locator::new(row.content_locator),
                protected_key: blob_to_handle(row.protected_key)?,
                created_at: row.created_at,
            })
        })
    }

    async fn retrieve_metadata(&self, id: MessageId) -> Result<MessageMetadata> {
        self.with_conn(|conn| {
            let row: Option<(Vec<u8>, String, i64, bool)> = conn
                .query_row(
                    "SELECT recipient, content_locator, created_at, is_deleted
                     FROM messages WHERE id = ?1",
                    params![id.as_u64() as i64],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;

            match row {
                Some((recipient, locator, created_at, is_deleted)) => Ok(MessageMetadata {
                    recipient: blob_to_address(recipient)?,
                    content_locator: Locator::new(locator),
                    created_at,
                    is_deleted,
                }),
                None => Ok(MessageMetadata::default()),
            }
        })
    }

    async fn list_received(&self, ctx: &CallContext) -> Result<Vec<MessageId>> {
        self.list_received_of(ctx.signer).await
    }

    async fn list_received_of(&self, address: Address) -> Result<Vec<MessageId>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id FROM received_index WHERE address = ?1 ORDER BY message_id",
            )?;
            let ids = stmt
                .query_map(params![address.as_bytes().as_slice()], |row| {
                    row.get::<_, i64>(0)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids.into_iter().map(|id| MessageId::new(id as u64)).collect())
        })
    }

    async fn list_sent(&self, address: Address) -> Result<Vec<MessageId>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id FROM sent_index WHERE address = ?1 ORDER BY message_id",
            )?;
            let ids = stmt
                .query_map(params![address.as_bytes().as_slice()], |row| {
                    row.get::<_, i64>(0)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids.into_iter().map(|id| MessageId::new(id as u64)).collect())
        })
    }

    async fn is_recipient(&self, ctx: &CallContext, id: MessageId) -> Result<bool> {
        let caller = ctx.signer;
        self.with_conn(|conn| {
            let recipient: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT recipient FROM messages WHERE id = ?1",
                    params![id.as_u64() as i64],
                    |row| row.get(0),
                )
                .optional()?;

            match recipient {
                Some(blob) => Ok(blob_to_address(blob)? == caller),
                None => Ok(false),
            }
        })
    }

    async fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    async fn events(&self) -> Result<Vec<LedgerEvent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT kind, message_id, recipient, actor, content_locator, created_at
                 FROM events ORDER BY seq",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<Vec<u8>>>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut events = Vec::with_capacity(rows.len());
            for (kind, message_id, recipient, actor, locator, created_at) in rows {
                let id = MessageId::new(message_id as u64);
                let actor = blob_to_address(actor)?;
                let event = match kind.as_str() {
                    "sent" => LedgerEvent::MessageSent {
                        id,
                        recipient: blob_to_address(recipient.ok_or_else(|| {
                            LedgerError::InvalidData("sent event missing recipient".into())
                        })?)?,
                        signer: actor,
                        content_locator: Locator::new(locator.unwrap_or_default()),
                        created_at: created_at.unwrap_or(0),
                    },
                    "deleted" => LedgerEvent::MessageDeleted { id, deleter: actor },
                    other => {
                        return Err(LedgerError::InvalidData(format!(
                            "unknown event kind: {}",
                            other
                        )))
                    }
                };
                events.push(event);
            }
            Ok(events)
        })
    }
}
