//! The protection runtime contract.
//!
//! The runtime is an external cryptographic service. This module defines
//! the contract the protocol consumes — encrypt-with-grant, proof
//! verification, grant registration, authorized decrypt — and an
//! in-process implementation for tests. The real runtime's internal
//! cryptography is out of scope here; what matters is the contract.

use async_trait::async_trait;

use cachet_core::Address;

use crate::authorization::SignedAuthorization;
use crate::error::{DecryptionDenied, GrantsError, Result};
use crate::handle::{Handle, SealedInput, Word};
use crate::session::SealedValue;

/// A request for authorized decryption of one or more handles.
#[derive(Debug, Clone)]
pub struct DecryptionRequest {
    /// The signed authorization naming handles, requester, session key,
    /// and validity window.
    pub signed: SignedAuthorization,

    /// The current time (Unix milliseconds) the window is checked
    /// against.
    pub now: i64,
}

/// The protection runtime contract.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ProtectionRuntime: Send + Sync {
    /// Encrypt a clear value for eventual decryption by `grantee`.
    ///
    /// This is the client-side sealing step: it produces the
    /// ciphertext+proof pair submitted to the ledger. The grant itself is
    /// registered by the ledger at commit time, not here.
    async fn encrypt_with_grant(&self, value: Word, grantee: Address) -> Result<SealedInput>;

    /// Verify a ciphertext+proof pair and mint a handle for it.
    ///
    /// Fails with [`GrantsError::ProofRejected`] if the proof does not
    /// check out.
    async fn import(&self, input: &SealedInput) -> Result<Handle>;

    /// Grant `grantee` the right to decrypt `handle`.
    async fn grant(&self, handle: &Handle, grantee: Address) -> Result<()>;

    /// Whether `address` holds a grant on `handle`.
    async fn has_grant(&self, handle: &Handle, address: Address) -> bool;

    /// Release the clear values behind the requested handles, sealed to
    /// the session public key named in the authorization.
    ///
    /// A bad signature, an out-of-window request, and a missing grant
    /// all collapse into [`DecryptionDenied`]; there is never a partial
    /// result.
    async fn authorized_decrypt(
        &self,
        request: &DecryptionRequest,
    ) -> std::result::Result<Vec<SealedValue>, DecryptionDenied>;
}

/// An in-process runtime for testing.
///
/// Plays the role the real external runtime plays in production, the way
/// an in-memory transport stands in for a network: proofs are keyed
/// Blake3 MACs, values are held encrypted under a runtime secret, and
/// the grant/authorization checks are exactly the contract's.
pub mod local {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use rand::RngCore;

    use cachet_core::Blake3Hash;

    use super::*;
    use crate::crypto::{SealingKey, SealingNonce};
    use crate::registry::GrantRegistry;

    /// In-process protection runtime.
    pub struct LocalRuntime {
        /// Runtime secret, never exposed.
        secret: [u8; 32],
        state: RwLock<LocalState>,
    }

    #[derive(Default)]
    struct LocalState {
        /// Imported ciphertexts by handle.
        values: HashMap<Handle, Vec<u8>>,
        /// Grant bookkeeping.
        registry: GrantRegistry,
    }

    impl LocalRuntime {
        /// Create a runtime with a random secret.
        pub fn new() -> Self {
            let mut rng = rand::thread_rng();
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            Self::from_secret(secret)
        }

        /// Create a runtime with a fixed secret (deterministic tests).
        pub fn from_secret(secret: [u8; 32]) -> Self {
            Self {
                secret,
                state: RwLock::new(LocalState::default()),
            }
        }

        /// The key values are held under.
        fn value_key(&self) -> SealingKey {
            let mut hasher = blake3::Hasher::new_derive_key("cachet-local-runtime-v0-values");
            hasher.update(&self.secret);
            SealingKey::from_bytes(*hasher.finalize().as_bytes())
        }

        /// The key proofs are MACed under.
        fn proof_key(&self) -> [u8; 32] {
            let mut hasher = blake3::Hasher::new_derive_key("cachet-local-runtime-v0-proofs");
            hasher.update(&self.secret);
            *hasher.finalize().as_bytes()
        }

        fn prove(&self, ciphertext: &[u8]) -> [u8; 32] {
            *blake3::keyed_hash(&self.proof_key(), ciphertext).as_bytes()
        }

        /// Decrypt an imported ciphertext back to its word.
        fn unseal_value(&self, ciphertext: &[u8]) -> Result<Word> {
            if ciphertext.len() < 12 {
                return Err(GrantsError::MalformedInput("ciphertext too short".into()));
            }
            let (nonce_bytes, ct) = ciphertext.split_at(12);
            let nonce = SealingNonce::from_bytes(nonce_bytes.try_into().expect("12-byte split"));
            let bytes = self.value_key().decrypt(ct, &nonce)?;
            let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                GrantsError::MalformedInput(format!("value has {} bytes, expected 32", bytes.len()))
            })?;
            Ok(Word::from_bytes(arr))
        }
    }

    impl Default for LocalRuntime {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProtectionRuntime for LocalRuntime {
        async fn encrypt_with_grant(&self, value: Word, grantee: Address) -> Result<SealedInput> {
            tracing::debug!(%grantee, "sealing value");

            let nonce = SealingNonce::generate();
            let ct = self.value_key().encrypt(value.as_bytes(), &nonce)?;

            let mut ciphertext = nonce.as_bytes().to_vec();
            ciphertext.extend_from_slice(&ct);
            let proof = self.prove(&ciphertext).to_vec();

            Ok(SealedInput {
                ciphertext: ciphertext.into(),
                proof: proof.into(),
            })
        }

        async fn import(&self, input: &SealedInput) -> Result<Handle> {
            if input.ciphertext.len() < 12 {
                return Err(GrantsError::MalformedInput("ciphertext too short".into()));
            }
            if self.prove(&input.ciphertext) != input.proof.as_ref() {
                return Err(GrantsError::ProofRejected);
            }

            let handle = Handle(Blake3Hash::hash(&input.ciphertext).0);
            let mut state = self.state.write().unwrap();
            state.values.insert(handle, input.ciphertext.to_vec());
            Ok(handle)
        }

        async fn grant(&self, handle: &Handle, grantee: Address) -> Result<()> {
            let mut state = self.state.write().unwrap();
            if !state.values.contains_key(handle) {
                return Err(GrantsError::UnknownHandle(*handle));
            }
            state.registry.grant(*handle, grantee);
            Ok(())
        }

        async fn has_grant(&self, handle: &Handle, address: Address) -> bool {
            let state = self.state.read().unwrap();
            state.registry.has_grant(handle, address)
        }

        async fn authorized_decrypt(
            &self,
            request: &DecryptionRequest,
        ) -> std::result::Result<Vec<SealedValue>, DecryptionDenied> {
            let auth = &request.signed.authorization;

            request.signed.verify()?;

            if !auth.is_current(request.now) {
                tracing::debug!(
                    issued_at = auth.issued_at,
                    expires_at = auth.expires_at(),
                    now = request.now,
                    "authorization outside validity window"
                );
                return Err(DecryptionDenied);
            }

            // All checks pass before anything is released
            let ciphertexts: Vec<(Handle, Vec<u8>)> = {
                let state = self.state.read().unwrap();
                let mut out = Vec::with_capacity(auth.handles.len());
                for handle in &auth.handles {
                    if !state.registry.has_grant(handle, auth.requester) {
                        tracing::debug!(%handle, requester = %auth.requester, "no grant");
                        return Err(DecryptionDenied);
                    }
                    let Some(ct) = state.values.get(handle) else {
                        tracing::debug!(%handle, "unknown handle");
                        return Err(DecryptionDenied);
                    };
                    out.push((*handle, ct.clone()));
                }
                out
            };

            let mut released = Vec::with_capacity(ciphertexts.len());
            for (handle, ct) in ciphertexts {
                let word = self.unseal_value(&ct).map_err(|e| {
                    tracing::debug!(%handle, error = %e, "value unseal failed");
                    DecryptionDenied
                })?;
                let sealed =
                    SealedValue::seal(handle, &word, &auth.session_public).map_err(|e| {
                        tracing::debug!(%handle, error = %e, "session seal failed");
                        DecryptionDenied
                    })?;
                released.push(sealed);
            }

            Ok(released)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::local::LocalRuntime;
    use super::*;
    use crate::authorization::{DecryptionAuthorization, MILLIS_PER_DAY};
    use crate::session::DecryptionSession;
    use cachet_core::Identity;

    async fn import_for(
        runtime: &LocalRuntime,
        word: Word,
        grantee: Address,
    ) -> Handle {
        let input = runtime.encrypt_with_grant(word, grantee).await.unwrap();
        let handle = runtime.import(&input).await.unwrap();
        runtime.grant(&handle, grantee).await.unwrap();
        handle
    }

    fn request_for(
        identity: &Identity,
        session: &DecryptionSession,
        handles: Vec<Handle>,
        issued_at: i64,
        now: i64,
    ) -> DecryptionRequest {
        let signed = DecryptionAuthorization::new(
            handles,
            identity.address(),
            session.public_key(),
            issued_at,
        )
        .sign(identity.keypair());
        DecryptionRequest { signed, now }
    }

    #[tokio::test]
    async fn test_seal_import_decrypt_roundtrip() {
        let runtime = LocalRuntime::new();
        let recipient = Identity::from_seed(&[1; 32]);
        let word = Word::from_bytes([0x55; 32]);

        let handle = import_for(&runtime, word, recipient.address()).await;
        assert!(runtime.has_grant(&handle, recipient.address()).await);

        let session = DecryptionSession::generate();
        let request = request_for(&recipient, &session, vec![handle], 1_000, 2_000);
        let released = runtime.authorized_decrypt(&request).await.unwrap();

        assert_eq!(released.len(), 1);
        assert_eq!(session.open(&released[0]).unwrap(), word);
    }

    #[tokio::test]
    async fn test_bad_proof_rejected() {
        let runtime = LocalRuntime::new();
        let recipient = Identity::from_seed(&[1; 32]);

        let mut input = runtime
            .encrypt_with_grant(Word::from_bytes([1; 32]), recipient.address())
            .await
            .unwrap();
        input.proof = vec![0u8; 32].into();

        assert!(matches!(
            runtime.import(&input).await,
            Err(GrantsError::ProofRejected)
        ));
    }

    #[tokio::test]
    async fn test_grant_unknown_handle_rejected() {
        let runtime = LocalRuntime::new();
        let err = runtime
            .grant(&Handle::from_bytes([9; 32]), Address::from_bytes([1; 20]))
            .await;
        assert!(matches!(err, Err(GrantsError::UnknownHandle(_))));
    }

    #[tokio::test]
    async fn test_non_grantee_denied() {
        let runtime = LocalRuntime::new();
        let recipient = Identity::from_seed(&[1; 32]);
        let stranger = Identity::from_seed(&[2; 32]);

        let handle = import_for(&runtime, Word::from_bytes([3; 32]), recipient.address()).await;

        let session = DecryptionSession::generate();
        let request = request_for(&stranger, &session, vec![handle], 1_000, 2_000);
        assert_eq!(
            runtime.authorized_decrypt(&request).await,
            Err(DecryptionDenied)
        );
    }

    #[tokio::test]
    async fn test_window_enforced() {
        let runtime = LocalRuntime::new();
        let recipient = Identity::from_seed(&[1; 32]);
        let handle = import_for(&runtime, Word::from_bytes([3; 32]), recipient.address()).await;

        let issued_at = 1_000;
        let session = DecryptionSession::generate();

        // Day 9: inside the 10-day default window
        let request = request_for(
            &recipient,
            &session,
            vec![handle],
            issued_at,
            issued_at + 9 * MILLIS_PER_DAY,
        );
        assert!(runtime.authorized_decrypt(&request).await.is_ok());

        // Day 11: expired
        let request = request_for(
            &recipient,
            &session,
            vec![handle],
            issued_at,
            issued_at + 11 * MILLIS_PER_DAY,
        );
        assert_eq!(
            runtime.authorized_decrypt(&request).await,
            Err(DecryptionDenied)
        );
    }

    #[tokio::test]
    async fn test_no_partial_result() {
        let runtime = LocalRuntime::new();
        let recipient = Identity::from_seed(&[1; 32]);

        let granted = import_for(&runtime, Word::from_bytes([3; 32]), recipient.address()).await;

        // Second handle exists but was never granted to the recipient
        let input = runtime
            .encrypt_with_grant(Word::from_bytes([4; 32]), recipient.address())
            .await
            .unwrap();
        let ungranted = runtime.import(&input).await.unwrap();

        let session = DecryptionSession::generate();
        let request = request_for(&recipient, &session, vec![granted, ungranted], 1_000, 2_000);
        assert_eq!(
            runtime.authorized_decrypt(&request).await,
            Err(DecryptionDenied)
        );
    }
}
