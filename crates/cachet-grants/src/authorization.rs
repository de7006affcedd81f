//! Signed decryption authorizations.
//!
//! To obtain cleartext for protected handles, a requester signs an
//! authorization object naming the handles, its own address, a session
//! public key, and a validity window. The runtime releases values only
//! against a valid signature from an address holding a grant on every
//! named handle, inside the window.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use cachet_core::{encode_canonical, Address, Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::crypto::X25519PublicKey;
use crate::error::DecryptionDenied;
use crate::handle::Handle;

/// Default validity window for an authorization, in days.
pub const DEFAULT_VALIDITY_DAYS: u32 = 10;

/// Milliseconds per day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Domain tag prefixed to the canonical signing bytes.
const SIGNING_DOMAIN: &[u8] = b"cachet-authz-v0:";

/// Field keys for the canonical signing encoding.
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const HANDLES: u64 = 0;
    pub const REQUESTER: u64 = 1;
    pub const SESSION_PUBLIC: u64 = 2;
    pub const ISSUED_AT: u64 = 3;
    pub const VALID_FOR_DAYS: u64 = 4;
}

/// An unsigned decryption authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionAuthorization {
    /// The protected handles cleartext is requested for.
    pub handles: Vec<Handle>,

    /// The address requesting decryption.
    pub requester: Address,

    /// The session public key released values are sealed to.
    ///
    /// Bound into the signature so a captured authorization cannot be
    /// replayed with a different session key.
    pub session_public: X25519PublicKey,

    /// Start of the validity window (Unix milliseconds).
    pub issued_at: i64,

    /// Validity duration in days.
    pub valid_for_days: u32,
}

impl DecryptionAuthorization {
    /// Create an authorization with the default 10-day window.
    pub fn new(
        handles: Vec<Handle>,
        requester: Address,
        session_public: X25519PublicKey,
        issued_at: i64,
    ) -> Self {
        Self {
            handles,
            requester,
            session_public,
            issued_at,
            valid_for_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Override the validity window.
    pub fn with_validity(mut self, days: u32) -> Self {
        self.valid_for_days = days;
        self
    }

    /// End of the validity window (inclusive).
    pub fn expires_at(&self) -> i64 {
        self.issued_at + self.valid_for_days as i64 * MILLIS_PER_DAY
    }

    /// Whether `now` falls inside the validity window.
    pub fn is_current(&self, now: i64) -> bool {
        now >= self.issued_at && now <= self.expires_at()
    }

    /// The bytes that get signed: domain tag + canonical CBOR map.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let handles: Vec<Value> = self
            .handles
            .iter()
            .map(|h| Value::Bytes(h.0.to_vec()))
            .collect();

        let map = Value::Map(vec![
            (Value::Integer(keys::HANDLES.into()), Value::Array(handles)),
            (
                Value::Integer(keys::REQUESTER.into()),
                Value::Bytes(self.requester.as_bytes().to_vec()),
            ),
            (
                Value::Integer(keys::SESSION_PUBLIC.into()),
                Value::Bytes(self.session_public.as_bytes().to_vec()),
            ),
            (
                Value::Integer(keys::ISSUED_AT.into()),
                Value::Integer(self.issued_at.into()),
            ),
            (
                Value::Integer(keys::VALID_FOR_DAYS.into()),
                Value::Integer(self.valid_for_days.into()),
            ),
        ]);

        let mut buf = SIGNING_DOMAIN.to_vec();
        buf.extend_from_slice(&encode_canonical(&map));
        buf
    }

    /// Sign with the requester's ledger identity key.
    pub fn sign(self, keypair: &Keypair) -> SignedAuthorization {
        let signature = keypair.sign(&self.signing_bytes());
        SignedAuthorization {
            authorization: self,
            public_key: keypair.public_key(),
            signature,
        }
    }
}

/// A signed decryption authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    /// The authorization that was signed.
    pub authorization: DecryptionAuthorization,

    /// The signer's public key.
    pub public_key: Ed25519PublicKey,

    /// Ed25519 signature over the canonical signing bytes.
    pub signature: Ed25519Signature,
}

impl SignedAuthorization {
    /// Verify the signature and that the key belongs to the requester.
    ///
    /// Both failure modes collapse into [`DecryptionDenied`].
    pub fn verify(&self) -> Result<(), DecryptionDenied> {
        if Address::from_public_key(&self.public_key) != self.authorization.requester {
            tracing::debug!("authorization key does not derive to requester address");
            return Err(DecryptionDenied);
        }

        if !self
            .public_key
            .verify(&self.authorization.signing_bytes(), &self.signature)
        {
            tracing::debug!("authorization signature rejected");
            return Err(DecryptionDenied);
        }

        Ok(())
    }
}
