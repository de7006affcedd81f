//! Strong type definitions for the cachet protocol.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

/// A sequential message identifier on the ledger.
///
/// Ids are assigned starting at 0, never reused, and form a contiguous
/// range `[0, count)` at any point in time.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Create from a raw index.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw index.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A locator naming an encrypted document in the content-addressed store.
///
/// The locator is derived from the document's own bytes by the store; the
/// ledger treats it as an opaque non-empty string.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(pub String);

impl Locator {
    /// Create from a raw string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the raw string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the locator is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The explicit call context for ledger and protocol operations.
///
/// There is no ambient "current signer" or "current time" anywhere in the
/// protocol: every operation that depends on who is calling, or on the
/// clock, receives one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The address signing the transaction.
    pub signer: Address,

    /// The current time (Unix milliseconds).
    pub now: i64,
}

impl CallContext {
    /// Create a context for `signer` using the system clock.
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            now: now_millis(),
        }
    }

    /// Create a context with an explicit timestamp.
    pub fn at(signer: Address, now: i64) -> Self {
        Self { signer, now }
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_ordering() {
        let a = MessageId::new(0);
        let b = a.next();
        assert!(a < b);
        assert_eq!(b.as_u64(), 1);
    }

    #[test]
    fn test_message_id_display() {
        assert_eq!(format!("{}", MessageId::new(42)), "42");
    }

    #[test]
    fn test_locator_empty() {
        assert!(Locator::default().is_empty());
        assert!(!Locator::new("b3-abc").is_empty());
    }

    #[test]
    fn test_context_explicit_time() {
        let ctx = CallContext::at(Address::ZERO, 1234);
        assert_eq!(ctx.now, 1234);
    }
}
