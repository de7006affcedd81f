//! # Cachet Ledger
//!
//! The system of record for confidential transmissions: an append-only
//! arena of message records, per-address received/sent indices, and the
//! grant registration that makes "only the recipient can decrypt"
//! cryptographic rather than advisory.
//!
//! ## Key Properties
//!
//! - Message ids are sequential from 0 and form a contiguous range.
//! - Every field except the deletion flag is fixed at creation.
//! - Deletion is a one-way soft delete by the recipient; records are
//!   never physically removed, and the stored content outlives them.
//! - All state-changing operations are atomic: a failed submission or
//!   deletion leaves no trace.
//!
//! ## Backends
//!
//! - [`MemoryLedger`] - RwLock-protected in-memory state, primary for
//!   tests
//! - [`SqliteLedger`] - durable backend on bundled SQLite

pub mod error;
pub mod events;
pub mod memory;
pub mod message;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{ErrorKind, LedgerError, Result};
pub use events::LedgerEvent;
pub use memory::MemoryLedger;
pub use message::{Message, MessageMetadata, ProtectedEnvelope};
pub use sqlite::SqliteLedger;
pub use traits::Ledger;
