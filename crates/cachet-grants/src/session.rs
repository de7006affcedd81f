//! Decryption sessions and sealed values.
//!
//! Released clear values never travel in the open: the runtime seals
//! each one to the session public key named in the authorization, and
//! only the holder of the session secret can open them. A session is
//! scoped to a single read attempt.

use serde::{Deserialize, Serialize};

use crate::crypto::{EphemeralKeyPair, SealingNonce, X25519PublicKey, X25519StaticSecret};
use crate::error::{GrantsError, Result};
use crate::handle::{Handle, Word};

/// A one-shot asymmetric key pair for a single authorized read.
pub struct DecryptionSession {
    secret: X25519StaticSecret,
    public: X25519PublicKey,
}

impl DecryptionSession {
    /// Generate a fresh session key pair.
    pub fn generate() -> Self {
        let secret = X25519StaticSecret::generate();
        let public = secret.public_key();
        Self { secret, public }
    }

    /// The public half, named in the signed authorization.
    pub fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    /// Open a sealed value released by the runtime.
    pub fn open(&self, sealed: &SealedValue) -> Result<Word> {
        let shared = self.secret.diffie_hellman(&sealed.ephemeral_public);
        let key = shared.derive_sealing_key(sealed.handle.as_bytes());

        let bytes = key.decrypt(&sealed.ciphertext, &sealed.nonce)?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            GrantsError::Sealing(format!("sealed value has {} bytes, expected 32", bytes.len()))
        })?;
        Ok(Word::from_bytes(arr))
    }
}

/// A clear value sealed to a session public key.
///
/// Sealing uses a per-value ephemeral X25519 key, with the handle as the
/// key-derivation context, then ChaCha20-Poly1305.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedValue {
    /// The handle this value belongs to.
    pub handle: Handle,

    /// Ephemeral X25519 public key (sealer's side of ECDH).
    pub ephemeral_public: X25519PublicKey,

    /// Nonce used for sealing.
    pub nonce: SealingNonce,

    /// The sealed 32-byte word.
    pub ciphertext: Vec<u8>,
}

impl SealedValue {
    /// Seal a clear value to a session public key.
    pub fn seal(handle: Handle, word: &Word, session_public: &X25519PublicKey) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let shared = ephemeral.diffie_hellman(session_public);
        let key = shared.derive_sealing_key(handle.as_bytes());

        let nonce = SealingNonce::generate();
        let ciphertext = key.encrypt(word.as_bytes(), &nonce)?;

        Ok(Self {
            handle,
            ephemeral_public,
            nonce,
            ciphertext,
        })
    }
}
