//! # Cachet Core
//!
//! Pure primitives for the cachet transmission protocol: addresses,
//! the content cipher, the stored-document format, and canonicalization.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Address`] - 160-bit ledger address, derived from an Ed25519 key
//! - [`MessageId`] - Sequential message identifier on the ledger
//! - [`ContentKey`] / [`ContentIv`] - Fresh-per-message cipher material
//! - [`ContentDocument`] - The stored-content document format
//! - [`CallContext`] - Explicit signer + clock threaded through protocol calls
//!
//! ## Canonicalization
//!
//! Signed objects are encoded using deterministic CBOR. See [`canonical`].

pub mod address;
pub mod canonical;
pub mod cipher;
pub mod crypto;
pub mod document;
pub mod error;
pub mod types;

pub use address::Address;
pub use canonical::encode_canonical;
pub use cipher::{decrypt_content, ContentIv, ContentKey, EncryptedContent};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Identity, Keypair};
pub use document::{ContentDocument, ContentKind, ContentMeta, ALGORITHM_ID};
pub use error::{CipherError, DocumentError};
pub use types::{CallContext, Locator, MessageId};
