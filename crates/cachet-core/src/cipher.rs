//! The content cipher: AES-256-CBC over arbitrary byte content.
//!
//! Every encryption generates a fresh random key and iv; reusing either
//! across two messages is a correctness violation. There is no
//! authentication tag on the ciphertext — tampering is undetectable until
//! decryption fails padding or produces garbage. That matches the stored
//! wire format, which carries the raw CBC ciphertext and iv only.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use std::fmt;

use crate::error::CipherError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// A 256-bit content encryption key.
///
/// This is the value that gets sealed into the ledger's protected key
/// field; it never appears on the ledger in clear.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs.
        write!(f, "ContentKey(..)")
    }
}

/// A 128-bit CBC initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentIv([u8; 16]);

impl ContentIv {
    /// Generate a fresh random iv.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to hex string (the form stored in the document).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CipherError> {
        let bytes = hex::decode(s).map_err(|_| CipherError::InvalidIvLength(0))?;
        let arr: [u8; 16] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::InvalidIvLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

/// The output of one content encryption: ciphertext plus the fresh
/// key/iv pair that produced it.
pub struct EncryptedContent {
    pub ciphertext: Vec<u8>,
    pub key: ContentKey,
    pub iv: ContentIv,
}

impl EncryptedContent {
    /// Encrypt `content` under a freshly generated key and iv.
    pub fn encrypt(content: &[u8]) -> Self {
        let key = ContentKey::generate();
        let iv = ContentIv::generate();
        let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), iv.as_bytes().into())
            .encrypt_padded_vec_mut::<Pkcs7>(content);
        Self {
            ciphertext,
            key,
            iv,
        }
    }
}

/// Decrypt `ciphertext` with the given key and iv.
///
/// Exact inverse of [`EncryptedContent::encrypt`] for the same key/iv
/// pair. A mismatched key or iv yields either [`CipherError::Malformed`]
/// or garbage bytes; the caller cannot rely on detection.
pub fn decrypt_content(
    ciphertext: &[u8],
    key: &ContentKey,
    iv: &ContentIv,
) -> Result<Vec<u8>, CipherError> {
    Aes256CbcDec::new(key.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_roundtrip() {
        let content = b"the quick brown fox";
        let enc = EncryptedContent::encrypt(content);
        let decrypted = decrypt_content(&enc.ciphertext, &enc.key, &enc.iv).unwrap();
        assert_eq!(decrypted, content);
    }

    #[test]
    fn test_empty_content_roundtrip() {
        let enc = EncryptedContent::encrypt(b"");
        // PKCS#7 always pads, so even empty content produces a full block
        assert_eq!(enc.ciphertext.len(), 16);
        let decrypted = decrypt_content(&enc.ciphertext, &enc.key, &enc.iv).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_fresh_key_and_iv_every_call() {
        let content = b"identical content";
        let a = EncryptedContent::encrypt(content);
        let b = EncryptedContent::encrypt(content);

        assert_ne!(a.key.as_bytes(), b.key.as_bytes());
        assert_ne!(a.iv.as_bytes(), b.iv.as_bytes());
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() {
        let enc = EncryptedContent::encrypt(b"some secret content here");
        let wrong = ContentKey::generate();

        // No integrity tag: decryption either errors on padding or yields
        // bytes that differ from the plaintext.
        match decrypt_content(&enc.ciphertext, &wrong, &enc.iv) {
            Err(CipherError::Malformed) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(garbage) => assert_ne!(garbage, b"some secret content here"),
        }
    }

    #[test]
    fn test_iv_hex_roundtrip() {
        let iv = ContentIv::from_bytes([0x5a; 16]);
        let recovered = ContentIv::from_hex(&iv.to_hex()).unwrap();
        assert_eq!(iv, recovered);
    }

    #[test]
    fn test_key_from_slice_length_check() {
        assert!(ContentKey::from_slice(&[0u8; 32]).is_ok());
        assert!(matches!(
            ContentKey::from_slice(&[0u8; 31]),
            Err(CipherError::InvalidKeyLength(31))
        ));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_arbitrary_content(content in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let enc = EncryptedContent::encrypt(&content);
            let decrypted = decrypt_content(&enc.ciphertext, &enc.key, &enc.iv).unwrap();
            prop_assert_eq!(decrypted, content);
        }
    }
}
