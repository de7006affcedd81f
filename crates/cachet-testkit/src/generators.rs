//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cachet_core::{Address, ContentKind, ContentMeta, Identity, Locator};
use cachet_grants::{Handle, Word};

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(|seed| Identity::from_seed(&seed))
}

/// Generate a random non-zero address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>()
        .prop_filter("zero address is never a valid party", |b| b != &[0u8; 20])
        .prop_map(Address::from_bytes)
}

/// Generate a random handle.
pub fn handle() -> impl Strategy<Value = Handle> {
    any::<[u8; 32]>().prop_map(Handle::from_bytes)
}

/// Generate a random word.
pub fn word() -> impl Strategy<Value = Word> {
    any::<[u8; 32]>().prop_map(Word::from_bytes)
}

/// Generate a non-empty locator.
pub fn locator() -> impl Strategy<Value = Locator> {
    "b3-[a-f0-9]{16,64}".prop_map(Locator::new)
}

/// Generate content bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a content kind.
pub fn content_kind() -> impl Strategy<Value = ContentKind> {
    prop_oneof![Just(ContentKind::Text), Just(ContentKind::File)]
}

/// Generate document metadata.
pub fn content_meta() -> impl Strategy<Value = ContentMeta> {
    ("[a-z][a-z0-9_-]{0,24}\\.[a-z]{2,4}", "[a-z]{3,12}/[a-z0-9.+-]{2,20}")
        .prop_map(|(filename, mime_type)| ContentMeta::file(filename, mime_type))
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::{decrypt_content, EncryptedContent};

    proptest! {
        #[test]
        fn test_word_address_roundtrip(addr in address()) {
            let word = Word::from_address(&addr);
            prop_assert_eq!(word.to_address(), addr);
        }

        #[test]
        fn test_word_bytes_roundtrip(w in word()) {
            let key = w.to_key();
            prop_assert_eq!(Word::from_key(&key), w);
        }

        #[test]
        fn test_cipher_roundtrip(content in payload(2048)) {
            let enc = EncryptedContent::encrypt(&content);
            let decrypted = decrypt_content(&enc.ciphertext, &enc.key, &enc.iv).unwrap();
            prop_assert_eq!(decrypted, content);
        }

        #[test]
        fn test_identity_addresses_injective(a in identity(), b in identity()) {
            prop_assume!(a.public_key() != b.public_key());
            prop_assert_ne!(a.address(), b.address());
        }

        #[test]
        fn test_generated_locators_valid(loc in locator()) {
            prop_assert!(!loc.is_empty());
        }
    }
}
