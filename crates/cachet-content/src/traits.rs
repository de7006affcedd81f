//! ContentStore trait: the abstract interface for document storage.

use async_trait::async_trait;

use cachet_core::{ContentDocument, Locator};

use crate::error::Result;

/// The content-addressed store contract.
///
/// Implementations must be thread-safe (Send + Sync). The store derives
/// the locator from the document's own bytes: storing the identical
/// document twice yields the identical locator, which is what makes the
/// prepare phase freely retryable.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Durably store a document and return its content-derived locator.
    async fn put(&self, document: &ContentDocument) -> Result<Locator>;

    /// Fetch a previously stored document.
    async fn get(&self, locator: &Locator) -> Result<ContentDocument>;
}
