//! In-memory implementation of the ContentStore trait.
//!
//! Primarily for testing. Locators are Blake3 hashes of the document's
//! JSON bytes, so the store is genuinely content-addressed.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cachet_core::{Blake3Hash, ContentDocument, Locator};

use crate::error::{ContentError, Result};
use crate::traits::ContentStore;

/// Prefix marking locators minted by this store.
const LOCATOR_PREFIX: &str = "b3-";

/// In-memory content store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<Locator, Vec<u8>>>,
}

impl MemoryContentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().unwrap().is_empty()
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, document: &ContentDocument) -> Result<Locator> {
        let bytes = document
            .to_bytes()
            .map_err(|e| ContentError::Upload(e.to_string()))?;
        let locator = Locator::new(format!(
            "{}{}",
            LOCATOR_PREFIX,
            Blake3Hash::hash(&bytes).to_hex()
        ));

        let mut blobs = self.blobs.write().unwrap();
        blobs.insert(locator.clone(), bytes);
        Ok(locator)
    }

    async fn get(&self, locator: &Locator) -> Result<ContentDocument> {
        let blobs = self.blobs.read().unwrap();
        let bytes = blobs
            .get(locator)
            .ok_or_else(|| ContentError::NotFound(locator.clone()))?;
        ContentDocument::from_bytes(bytes).map_err(|e| ContentError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::{ContentMeta, EncryptedContent};

    fn sample_document() -> ContentDocument {
        let enc = EncryptedContent::encrypt(b"hello");
        ContentDocument::package(&enc, 5, &ContentMeta::text())
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryContentStore::new();
        let doc = sample_document();

        let locator = store.put(&doc).await.unwrap();
        assert!(locator.as_str().starts_with("b3-"));

        let fetched = store.get(&locator).await.unwrap();
        assert_eq!(fetched, doc);
    }

    #[tokio::test]
    async fn test_locator_is_content_derived() {
        let store = MemoryContentStore::new();
        let doc = sample_document();

        // Same document, same locator; put is idempotent in side effects
        let a = store.put(&doc).await.unwrap();
        let b = store.put(&doc).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);

        // A different document lands elsewhere
        let other = sample_document();
        let c = store.put(&other).await.unwrap();
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_get_unknown_locator() {
        let store = MemoryContentStore::new();
        let err = store.get(&Locator::new("b3-missing")).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
    }
}
