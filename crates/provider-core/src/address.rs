//! Recipient addresses carried in transaction requests.
//!
//! Account addresses are derived by the device and stored as the strings it
//! reports. This type only covers the `to` field of a transaction, which has
//! to be parsed into its 20 raw bytes before RLP encoding.
//!
//! # Example
//!
//! ```
//! use hw_evm_provider_core::Address;
//!
//! let addr = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
//! assert_eq!(addr.to_checksum_hex(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//! ```

use alloy_primitives::Address as AlloyAddress;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An Ethereum address (20 bytes).
///
/// This is a wrapper around [`alloy_primitives::Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(AlloyAddress);

impl Address {
    /// The length of an Ethereum address in bytes.
    pub const BYTE_LEN: usize = 20;

    /// Creates a new address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(AlloyAddress::new(bytes))
    }

    /// Returns the [`Address`] as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; Self::BYTE_LEN] {
        self.0.as_ref()
    }

    /// Returns the [`Address`] as a checksummed hex string (EIP-55).
    #[must_use]
    pub fn to_checksum_hex(&self) -> String {
        self.0.to_checksum(None)
    }

    /// Parses an [`Address`] from a hex string, optionally prefixed with `0x`.
    ///
    /// Checksums are not enforced; mixed case input is accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HexDecodeFailed`] if the hex string is invalid, or
    /// [`Error::InvalidAddress`] if the decoded bytes are not 20 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;

        let address_bytes: [u8; Self::BYTE_LEN] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidAddress(format!(
                "expected {} bytes, got {}",
                Self::BYTE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::new(address_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_case_input_is_accepted() {
        let addr = Address::from_hex("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        assert_eq!(addr.as_bytes()[0], 0x5a);
        assert_eq!(
            addr.to_checksum_hex(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn prefix_is_optional() {
        let addr = Address::from_hex("0000000000000000000000000000000000000001").unwrap();
        assert_eq!(addr.as_bytes()[19], 1);
    }

    #[test]
    fn wrong_length_is_invalid_address() {
        let result = Address::from_hex("0x1234");
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn bad_digit_is_hex_error() {
        let result = Address::from_hex("0xzz00000000000000000000000000000000000000");
        assert!(matches!(result, Err(Error::HexDecodeFailed(_))));
    }
}
