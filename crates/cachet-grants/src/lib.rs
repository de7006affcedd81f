//! # Cachet Grants
//!
//! The protection-runtime boundary: ciphertext handles with
//! runtime-enforced, per-address decryption grants.
//!
//! ## Overview
//!
//! The ledger never stores the logical sender identity or the content key
//! in clear. Both travel as opaque [`Handle`]s pointing at ciphertext
//! held by an external protection runtime. The runtime enforces exactly
//! one rule: a handle's cleartext is released only to an address holding
//! a grant on that handle, and only against a signed, time-bounded
//! [`DecryptionAuthorization`].
//!
//! ## Key Concepts
//!
//! - **Handle**: opaque reference to a ciphertext value, meaningless
//!   without the runtime's cooperation
//! - **Grant**: runtime-enforced permission for one address to decrypt
//!   one handle; established at message creation, never altered
//! - **Decryption authorization**: a signed object naming handles,
//!   requester, session key, and a validity window (10 days by default)
//! - **Decryption session**: a one-shot X25519 key pair; released values
//!   come back sealed to the session public key
//!
//! The runtime itself is an external collaborator. [`ProtectionRuntime`]
//! is the contract this crate consumes; [`runtime::local::LocalRuntime`]
//! is an in-process implementation used by tests.

pub mod authorization;
pub mod crypto;
pub mod error;
pub mod handle;
pub mod registry;
pub mod runtime;
pub mod session;

pub use authorization::{
    DecryptionAuthorization, SignedAuthorization, DEFAULT_VALIDITY_DAYS, MILLIS_PER_DAY,
};
pub use crypto::{
    EphemeralKeyPair, SealingKey, SealingNonce, SharedKey, X25519PublicKey, X25519StaticSecret,
};
pub use error::{DecryptionDenied, GrantsError, Result};
pub use handle::{Handle, SealedInput, Word};
pub use registry::GrantRegistry;
pub use runtime::{DecryptionRequest, ProtectionRuntime};
pub use session::{DecryptionSession, SealedValue};
