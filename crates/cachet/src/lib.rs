//! # Cachet
//!
//! Confidential transmission over a public ledger.
//!
//! ## Overview
//!
//! A sender transmits content to one designated recipient such that the
//! content, the content key, and the logical sender identity are all
//! unreadable to anyone else — even though the transfer itself is
//! recorded on a public, append-only ledger. What stays public: that a
//! transfer occurred, who signed it, and who receives it.
//!
//! Three trust boundaries cooperate:
//!
//! - the **ledger** ([`cachet_ledger`]) records messages and registers
//!   decryption grants
//! - the **content store** ([`cachet_content`]) holds the encrypted
//!   documents, addressed by their own bytes
//! - the **protection runtime** ([`cachet_grants`]) enforces that only a
//!   grant holder can recover the protected fields
//!
//! ## Sending
//!
//! Sends are two-phase. Phase 1 (prepare) encrypts and uploads — cheap
//! to retry, no ledger effects. Phase 2 (commit) seals the sender
//! identity and content key for the recipient and writes the message in
//! one atomic ledger transaction.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cachet::{Courier, CourierError};
//! use cachet_content::MemoryContentStore;
//! use cachet_core::{Address, Identity};
//! use cachet_grants::runtime::local::LocalRuntime;
//! use cachet_ledger::MemoryLedger;
//!
//! async fn example(recipient: Address) -> Result<(), CourierError> {
//!     let runtime = Arc::new(LocalRuntime::new());
//!     let ledger = Arc::new(MemoryLedger::new(
//!         Identity::generate().address(),
//!         runtime.clone(),
//!     ));
//!     let content = Arc::new(MemoryContentStore::new());
//!
//!     let sender = Courier::new(Identity::generate(), ledger, content, runtime);
//!
//!     let prepared = sender.prepare_text("meet at noon").await?;
//!     let id = sender.commit(&sender.context(), recipient, &prepared).await?;
//!     println!("committed as message {id}");
//!     Ok(())
//! }
//! ```
//!
//! ## Reading
//!
//! The recipient retrieves the protected envelope, proves its identity
//! to the runtime with a signed, time-bounded authorization, recovers
//! the sender address and content key, then fetches and decrypts the
//! document. See [`Courier::read`].
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `cachet::core` - primitives (Address, cipher, document format)
//! - `cachet::ledger` - the system of record
//! - `cachet::content` - the content store boundary
//! - `cachet::grants` - handles, grants, authorizations

pub mod courier;
pub mod error;

// Re-export component crates
pub use cachet_content as content;
pub use cachet_core as core;
pub use cachet_grants as grants;
pub use cachet_ledger as ledger;

// Re-export main types for convenience
pub use courier::{Courier, PreparedTransmission, ReceivedMessage};
pub use error::{CourierError, Result};

// Re-export commonly used component types
pub use cachet_content::{ContentStore, MemoryContentStore};
pub use cachet_core::{
    Address, CallContext, ContentDocument, ContentKind, ContentMeta, Identity, Keypair, Locator,
    MessageId,
};
pub use cachet_grants::{DecryptionDenied, Handle, ProtectionRuntime, SealedInput};
pub use cachet_ledger::{Ledger, LedgerEvent, MemoryLedger, SqliteLedger};
