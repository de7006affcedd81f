//! Grant bookkeeping.
//!
//! A grant ties one handle to one grantee address. Grants are
//! established atomically when a message is created and never altered
//! afterwards — there is no revocation in this protocol.

use std::collections::HashMap;

use cachet_core::Address;

use crate::handle::Handle;

/// Aggregated grant state: which addresses may decrypt which handles.
#[derive(Debug, Default)]
pub struct GrantRegistry {
    /// Grantees per handle.
    grants: HashMap<Handle, Vec<Address>>,

    /// Index: grantee -> handles they may decrypt.
    by_grantee: HashMap<Address, Vec<Handle>>,
}

impl GrantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `grantee` the right to decrypt `handle`.
    ///
    /// Idempotent: granting twice records once.
    pub fn grant(&mut self, handle: Handle, grantee: Address) {
        let grantees = self.grants.entry(handle).or_default();
        if grantees.contains(&grantee) {
            return;
        }
        grantees.push(grantee);
        self.by_grantee.entry(grantee).or_default().push(handle);
    }

    /// Whether `address` holds a grant on `handle`.
    pub fn has_grant(&self, handle: &Handle, address: Address) -> bool {
        self.grants
            .get(handle)
            .map(|g| g.contains(&address))
            .unwrap_or(false)
    }

    /// All grantees of a handle, in grant order.
    pub fn grantees(&self, handle: &Handle) -> &[Address] {
        self.grants.get(handle).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All handles a grantee may decrypt, in grant order.
    pub fn handles_for(&self, grantee: Address) -> &[Handle] {
        self.by_grantee
            .get(&grantee)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of handles with at least one grant.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
