//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use async_trait::async_trait;

use cachet::Courier;
use cachet_content::{ContentError, ContentStore, MemoryContentStore};
use cachet_core::{ContentDocument, Identity, Locator};
use cachet_grants::runtime::local::LocalRuntime;
use cachet_ledger::MemoryLedger;

/// A complete in-process deployment: protection runtime, memory ledger,
/// and memory content store, wired together.
pub struct TestNet {
    pub runtime: Arc<LocalRuntime>,
    pub ledger: Arc<MemoryLedger>,
    pub content: Arc<MemoryContentStore>,
}

impl TestNet {
    /// Create a fresh deployment.
    ///
    /// The ledger's self-grant address is a fixed seeded identity so
    /// runs are reproducible.
    pub fn new() -> Self {
        let runtime = Arc::new(LocalRuntime::new());
        let ledger = Arc::new(MemoryLedger::new(
            Identity::from_seed(&[0xee; 32]).address(),
            runtime.clone(),
        ));
        Self {
            runtime,
            ledger,
            content: Arc::new(MemoryContentStore::new()),
        }
    }

    /// A courier for the seeded identity `seed`.
    pub fn courier(&self, seed: u8) -> Courier {
        self.courier_for(identity_from_byte(seed))
    }

    /// A courier for an explicit identity.
    pub fn courier_for(&self, identity: Identity) -> Courier {
        Courier::new(
            identity,
            self.ledger.clone(),
            self.content.clone(),
            self.runtime.clone(),
        )
    }
}

impl Default for TestNet {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic identity from a single-byte seed.
fn identity_from_byte(seed: u8) -> Identity {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    Identity::from_seed(&bytes)
}

/// Create distinct deterministic identities for multi-party tests.
pub fn seeded_identities(count: usize) -> Vec<Identity> {
    (0..count).map(|i| identity_from_byte(i as u8)).collect()
}

/// A content store whose writes always fail.
///
/// For exercising the upload-failure path: prepare must surface the
/// error immediately and leave the ledger untouched.
pub struct FailingContentStore;

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn put(&self, _document: &ContentDocument) -> Result<Locator, ContentError> {
        Err(ContentError::Upload("store unavailable".into()))
    }

    async fn get(&self, locator: &Locator) -> Result<ContentDocument, ContentError> {
        Err(ContentError::NotFound(locator.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet::{CallContext, CourierError};
    use cachet_ledger::Ledger;

    #[tokio::test]
    async fn test_net_roundtrip() {
        let net = TestNet::new();
        let sender = net.courier(1);
        let recipient = net.courier(2);

        let prepared = sender.prepare_text("hi").await.unwrap();
        let id = sender
            .commit(
                &CallContext::at(sender.address(), 1_000),
                recipient.address(),
                &prepared,
            )
            .await
            .unwrap();

        let received = recipient
            .read(&CallContext::at(recipient.address(), 2_000), id)
            .await
            .unwrap();
        assert_eq!(received.text(), Some("hi"));
    }

    #[tokio::test]
    async fn test_seeded_identities_distinct() {
        let identities = seeded_identities(3);
        assert_ne!(identities[0].address(), identities[1].address());
        assert_ne!(identities[1].address(), identities[2].address());
        assert_ne!(identities[0].address(), identities[2].address());
    }

    #[tokio::test]
    async fn test_failing_store_blocks_prepare() {
        let net = TestNet::new();
        let sender = Courier::new(
            identity_from_byte(1),
            net.ledger.clone(),
            Arc::new(FailingContentStore),
            net.runtime.clone(),
        );

        let err = sender.prepare_text("doomed").await.unwrap_err();
        assert!(matches!(err, CourierError::Content(ContentError::Upload(_))));

        // Phase 1 failure never reaches the ledger
        assert_eq!(net.ledger.count().await.unwrap(), 0);
    }
}
