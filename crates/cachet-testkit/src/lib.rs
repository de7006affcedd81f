//! # Cachet Testkit
//!
//! Testing utilities for the cachet protocol.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a complete in-process deployment (runtime + ledger +
//!   content store) plus seeded identities and a failing content store
//! - **Generators**: proptest strategies for property-based testing
//! - **Vectors**: deterministic authorization vectors verifying the
//!   canonical signing encoding
//!
//! ## Test Fixtures
//!
//! Quickly set up a deployment and parties:
//!
//! ```rust
//! use cachet_testkit::fixtures::TestNet;
//!
//! let net = TestNet::new();
//! let sender = net.courier(1);
//! let recipient = net.courier(2);
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cachet_testkit::generators;
//!
//! proptest! {
//!     #[test]
//!     fn word_roundtrips(address in generators::address()) {
//!         let word = cachet_grants::Word::from_address(&address);
//!         prop_assert_eq!(word.to_address(), address);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{seeded_identities, FailingContentStore, TestNet};
pub use generators::{address, content_kind, content_meta, identity, locator, payload, word};
pub use vectors::{all_vectors, verify_all_vectors, AuthorizationVector};
