//! Deterministic authorization vectors.
//!
//! The decryption authorization is signed over canonical CBOR bytes, so
//! every platform must encode the same authorization to the same bytes.
//! These vectors pin down the inputs; the tests assert the encoding is
//! deterministic, self-consistent, and sensitive to every field.

use cachet_core::Identity;
use cachet_grants::{DecryptionAuthorization, Handle, SignedAuthorization};

use crate::generators;

/// A single authorization vector: deterministic inputs for building one
/// signed authorization.
#[derive(Debug, Clone)]
pub struct AuthorizationVector {
    pub name: &'static str,
    pub description: &'static str,
    pub requester_seed: [u8; 32],
    pub session_public: [u8; 32],
    pub handles: Vec<[u8; 32]>,
    pub issued_at: i64,
    pub valid_for_days: u32,
}

impl AuthorizationVector {
    /// Build the signed authorization this vector describes.
    pub fn build(&self) -> SignedAuthorization {
        let identity = Identity::from_seed(&self.requester_seed);
        DecryptionAuthorization::new(
            self.handles.iter().copied().map(Handle::from_bytes).collect(),
            identity.address(),
            cachet_grants::X25519PublicKey::from_bytes(self.session_public),
            self.issued_at,
        )
        .with_validity(self.valid_for_days)
        .sign(identity.keypair())
    }
}

/// All authorization vectors.
pub fn all_vectors() -> Vec<AuthorizationVector> {
    vec![
        AuthorizationVector {
            name: "single-handle",
            description: "one handle, default-style 10-day window",
            requester_seed: [0x01; 32],
            session_public: [0x10; 32],
            handles: vec![[0xa0; 32]],
            issued_at: 1_700_000_000_000,
            valid_for_days: 10,
        },
        AuthorizationVector {
            name: "sender-and-key",
            description: "the protocol's usual pair of protected handles",
            requester_seed: [0x02; 32],
            session_public: [0x20; 32],
            handles: vec![[0xa1; 32], [0xa2; 32]],
            issued_at: 1_700_000_000_000,
            valid_for_days: 10,
        },
        AuthorizationVector {
            name: "short-window",
            description: "narrow one-day validity",
            requester_seed: [0x03; 32],
            session_public: [0x30; 32],
            handles: vec![[0xa3; 32]],
            issued_at: 0,
            valid_for_days: 1,
        },
        AuthorizationVector {
            name: "empty-handles",
            description: "degenerate but encodable: no handles requested",
            requester_seed: [0x04; 32],
            session_public: [0x40; 32],
            handles: vec![],
            issued_at: 42,
            valid_for_days: 10,
        },
    ]
}

/// Verify every vector: deterministic bytes and a valid signature.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let a = vector.build();
        let b = vector.build();

        if a.authorization.signing_bytes() != b.authorization.signing_bytes() {
            return Err(format!("vector {}: signing bytes not deterministic", vector.name));
        }
        if a.signature != b.signature {
            return Err(format!("vector {}: signature not deterministic", vector.name));
        }
        if a.verify().is_err() {
            return Err(format!("vector {}: signature does not verify", vector.name));
        }
    }
    Ok(())
}
