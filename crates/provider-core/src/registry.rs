//! In-memory address → derivation path registry.
//!
//! Account enumeration records every address the device reports together
//! with the path it was derived from; signing looks the path back up. Keys
//! are lower-cased so lookups are case-insensitive with respect to EIP-55
//! checksums.
//!
//! The registry is never cleared. Re-enumerating overwrites entries for
//! addresses seen again and leaves every other entry in place, so an address
//! from an earlier, differently configured enumeration stays signable.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Address → path map shared between enumeration and signing.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    entries: RwLock<HashMap<String, String>>,
}

impl AccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `address → path`, replacing any previous path for the address.
    pub fn insert(&self, address: &str, path: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(address), path.into());
    }

    /// Returns the path recorded for `address`, if any.
    #[must_use]
    pub fn path_for(&self, address: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(address))
            .cloned()
    }

    /// Returns `true` if `address` has been enumerated.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.path_for(address).is_some()
    }

    /// Number of known addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no address has been enumerated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn normalize(address: &str) -> String {
    address.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = AccountRegistry::new();
        registry.insert(CHECKSUMMED, "44'/60'/0'/0/0");

        assert_eq!(
            registry.path_for(&CHECKSUMMED.to_lowercase()).as_deref(),
            Some("44'/60'/0'/0/0")
        );
        assert_eq!(
            registry.path_for(&CHECKSUMMED.to_uppercase().replace("0X", "0x")).as_deref(),
            Some("44'/60'/0'/0/0")
        );
        assert!(registry.snapshot().contains_key(&CHECKSUMMED.to_lowercase()));
    }

    #[test]
    fn later_insert_overwrites() {
        let registry = AccountRegistry::new();
        registry.insert(CHECKSUMMED, "44'/60'/0'/0/0");
        registry.insert(CHECKSUMMED, "44'/60'/0'/0");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.path_for(CHECKSUMMED).as_deref(), Some("44'/60'/0'/0"));
    }

    #[test]
    fn unknown_address_is_absent() {
        let registry = AccountRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(CHECKSUMMED));
        assert_eq!(registry.path_for(CHECKSUMMED), None);
    }
}
