//! The stored-content document format.
//!
//! What actually lands in the content-addressed store is not the raw
//! ciphertext but a small JSON document bundling the ciphertext with the
//! iv and display metadata. The content key is the only thing missing
//! from it — that travels through the ledger's protected field.

use serde::{Deserialize, Serialize};

use crate::cipher::{decrypt_content, ContentIv, ContentKey, EncryptedContent};
use crate::error::DocumentError;

/// Identifier of the only cipher the document format currently carries.
pub const ALGORITHM_ID: &str = "aes-256-cbc";

/// What the document holds: a bare text message or an arbitrary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    File,
}

/// Display metadata attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMeta {
    pub filename: String,
    pub mime_type: String,
    pub kind: ContentKind,
}

impl ContentMeta {
    /// Metadata for a bare text message.
    pub fn text() -> Self {
        Self {
            filename: "message.txt".to_string(),
            mime_type: "text/plain".to_string(),
            kind: ContentKind::Text,
        }
    }

    /// Metadata for an arbitrary file.
    pub fn file(filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            kind: ContentKind::File,
        }
    }
}

/// The stored-content document.
///
/// Serialized as camelCase JSON; `iv` and `ciphertext` are hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub iv: String,
    pub ciphertext: String,
    pub algorithm_id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub kind: ContentKind,
}

impl ContentDocument {
    /// Bundle an encryption result and its metadata into a document.
    ///
    /// `size_bytes` records the plaintext size, not the ciphertext size.
    pub fn package(encrypted: &EncryptedContent, plaintext_len: usize, meta: &ContentMeta) -> Self {
        Self {
            iv: encrypted.iv.to_hex(),
            ciphertext: hex::encode(&encrypted.ciphertext),
            algorithm_id: ALGORITHM_ID.to_string(),
            filename: meta.filename.clone(),
            size_bytes: plaintext_len as u64,
            mime_type: meta.mime_type.clone(),
            kind: meta.kind,
        }
    }

    /// Decrypt the document's content with the recovered key and the
    /// document's own declared iv.
    pub fn open(&self, key: &ContentKey) -> Result<Vec<u8>, DocumentError> {
        if self.algorithm_id != ALGORITHM_ID {
            return Err(DocumentError::UnsupportedAlgorithm(
                self.algorithm_id.clone(),
            ));
        }

        let iv = ContentIv::from_hex(&self.iv).map_err(DocumentError::Cipher)?;
        let ciphertext = hex::decode(&self.ciphertext).map_err(|source| {
            DocumentError::InvalidHex {
                field: "ciphertext",
                source,
            }
        })?;

        Ok(decrypt_content(&ciphertext, key, &iv)?)
    }

    /// Serialize to the external JSON form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(|e| DocumentError::Encoding(e.to_string()))
    }

    /// Deserialize from the external JSON form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|e| DocumentError::Decoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_open() {
        let content = b"hello, sealed world";
        let enc = EncryptedContent::encrypt(content);
        let doc = ContentDocument::package(&enc, content.len(), &ContentMeta::text());

        assert_eq!(doc.algorithm_id, ALGORITHM_ID);
        assert_eq!(doc.size_bytes, content.len() as u64);
        assert_eq!(doc.kind, ContentKind::Text);

        let opened = doc.open(&enc.key).unwrap();
        assert_eq!(opened, content);
    }

    #[test]
    fn test_json_field_names() {
        let enc = EncryptedContent::encrypt(b"x");
        let doc = ContentDocument::package(&enc, 1, &ContentMeta::file("a.pdf", "application/pdf"));
        let json = String::from_utf8(doc.to_bytes().unwrap()).unwrap();

        // External format is camelCase with lowercase kind values
        assert!(json.contains("\"algorithmId\""));
        assert!(json.contains("\"sizeBytes\""));
        assert!(json.contains("\"mimeType\""));
        assert!(json.contains("\"kind\":\"file\""));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let enc = EncryptedContent::encrypt(b"roundtrip me");
        let doc = ContentDocument::package(&enc, 12, &ContentMeta::text());
        let recovered = ContentDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(doc, recovered);
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let enc = EncryptedContent::encrypt(b"x");
        let mut doc = ContentDocument::package(&enc, 1, &ContentMeta::text());
        doc.algorithm_id = "rot13".to_string();

        assert!(matches!(
            doc.open(&enc.key),
            Err(DocumentError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_malformed_hex_rejected() {
        let enc = EncryptedContent::encrypt(b"x");
        let mut doc = ContentDocument::package(&enc, 1, &ContentMeta::text());
        doc.ciphertext = "not hex!".to_string();

        assert!(matches!(
            doc.open(&enc.key),
            Err(DocumentError::InvalidHex { field: "ciphertext", .. })
        ));
    }
}
