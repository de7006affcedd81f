//! Ciphertext handles, clear-value words, and sealed inputs.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use cachet_core::{Address, ContentKey};

/// A 32-byte opaque handle to a ciphertext value.
///
/// A handle is minted by the protection runtime when it accepts a
/// ciphertext+proof pair. It carries no information on its own; only the
/// runtime can turn it back into a clear value, and only for a grantee.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(pub [u8; 32]);

impl Handle {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero handle (sentinel).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Handle {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 256-bit big-endian clear value as released by the runtime.
///
/// The runtime deals in fixed-width integers. A 160-bit address rides in
/// the low 20 bytes with 12 zero bytes of left padding; a 256-bit content
/// key occupies the full width. Reconstruction uses exactly these
/// widths.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word(pub [u8; 32]);

impl Word {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Embed an address in the low 160 bits.
    pub fn from_address(address: &Address) -> Self {
        let mut arr = [0u8; 32];
        arr[12..32].copy_from_slice(address.as_bytes());
        Self(arr)
    }

    /// Embed a content key (full width).
    pub fn from_key(key: &ContentKey) -> Self {
        Self(*key.as_bytes())
    }

    /// Recover an address from the low 160 bits.
    pub fn to_address(&self) -> Address {
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&self.0[12..32]);
        Address::from_bytes(arr)
    }

    /// Recover a content key (full width).
    pub fn to_key(&self) -> ContentKey {
        ContentKey::from_bytes(self.0)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Clear values stay out of logs.
        write!(f, "Word(..)")
    }
}

/// A ciphertext+proof pair as supplied to the ledger.
///
/// Produced client-side by `encrypt_with_grant`; the ledger hands it to
/// the runtime, which verifies the proof and mints a [`Handle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedInput {
    /// The ciphertext bytes, opaque to the ledger.
    pub ciphertext: Bytes,

    /// The proof that the ciphertext is well-formed.
    pub proof: Bytes,
}
