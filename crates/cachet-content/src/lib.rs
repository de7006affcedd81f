//! # Cachet Content
//!
//! The content-addressed store boundary.
//!
//! Encrypted documents live outside the ledger in a store that addresses
//! each document by a locator derived from its own bytes. The core
//! assumes that guarantee and performs no independent integrity check on
//! fetch. Upload failures surface immediately with no automatic retry —
//! `put` has idempotent side effects, so callers may retry freely.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ContentError, Result};
pub use memory::MemoryContentStore;
pub use traits::ContentStore;
