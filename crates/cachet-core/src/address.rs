//! Ledger addresses.
//!
//! An address is the public identity of a party on the ledger: the
//! recipient field of a message, the signer of a transaction, and the
//! grantee of a decryption right are all addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Ed25519PublicKey;

/// A 20-byte (160-bit) ledger address.
///
/// Derived from an Ed25519 public key by taking the trailing 20 bytes of
/// its domain-tagged Blake3 hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derive an address from an Ed25519 public key.
    pub fn from_public_key(key: &Ed25519PublicKey) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"cachet-address-v0:");
        hasher.update(&key.0);
        let digest = hasher.finalize();
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&digest.as_bytes()[12..32]);
        Self(arr)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to a 0x-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without a 0x prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != 20 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero/null address. Never a valid recipient.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_address_derivation_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let a1 = Address::from_public_key(&keypair.public_key());
        let a2 = Address::from_public_key(&keypair.public_key());
        assert_eq!(a1, a2);
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        let a = Address::from_public_key(&Keypair::from_seed(&[1; 32]).public_key());
        let b = Address::from_public_key(&Keypair::from_seed(&[2; 32]).public_key());
        assert_ne!(a, b);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        let recovered = Address::from_hex(&hex).unwrap();
        assert_eq!(addr, recovered);

        // Also without the prefix
        let recovered = Address::from_hex(&hex[2..]).unwrap();
        assert_eq!(addr, recovered);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_bytes([1; 20]).is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }
}
