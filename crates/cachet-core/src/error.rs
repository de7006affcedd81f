//! Error types for cachet core primitives.

use thiserror::Error;

/// Errors from the content cipher.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid key length: expected 32, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid iv length: expected 16, got {0}")]
    InvalidIvLength(usize),

    /// The ciphertext does not decrypt cleanly under the given key/iv.
    ///
    /// There is no integrity tag on content ciphertext, so a wrong key,
    /// wrong iv, or tampered ciphertext surfaces either as this error
    /// (padding failure) or as garbage plaintext.
    #[error("ciphertext is malformed or does not match key/iv")]
    Malformed,
}

/// Errors from packing or opening a stored-content document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported algorithm id: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid hex field {field}: {source}")]
    InvalidHex {
        field: &'static str,
        source: hex::FromHexError,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}
