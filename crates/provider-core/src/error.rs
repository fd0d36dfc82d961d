//! Error types for the hardware EVM provider.
//!
//! This module provides the error type [`enum@Error`] covering every failure
//! mode of account enumeration and signing through a hardware device.
//!
//! # Error Categories
//!
//! - **Configuration errors**: raised when a provider is constructed
//! - **Registry errors**: signing requested for an address never enumerated
//! - **Device errors**: opaque failures passed through from the transport or
//!   the device app
//! - **Validation errors**: device responses that are well-formed but wrong
//!
//! # Example
//!
//! ```
//! use hw_evm_provider_core::Error;
//!
//! fn example() -> Result<(), Error> {
//!     let err = Error::UnknownAddress("0xabc".to_string());
//!     assert!(matches!(err, Error::UnknownAddress(_)));
//!     Ok(())
//! }
//! ```

use core::result::Result as CoreResult;
use hex::FromHexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// The main error type for the hardware EVM provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// The deprecated singular `path` option was supplied.
    #[error("the `path` option is deprecated, use `paths` instead")]
    DeprecatedPathOption,

    /// The resolved list of derivation path templates is empty.
    #[error("`paths` must contain at least one derivation path template")]
    EmptyPaths,

    /// A derivation path template does not contain exactly one `x` placeholder.
    #[error("invalid derivation path template {0:?}: expected exactly one `x` placeholder")]
    InvalidPathTemplate(String),

    // =========================================================================
    // Registry Errors
    // =========================================================================
    /// Signing was requested for an address that enumeration never returned.
    #[error("address unknown '{0}'")]
    UnknownAddress(String),

    // =========================================================================
    // Transport and Device Errors
    // =========================================================================
    /// No hardware device was found.
    #[error("no hardware device found")]
    DeviceNotFound,

    /// Failed to open a session with the device.
    #[error("failed to connect to device: {0}")]
    ConnectionFailed(String),

    /// The device was disconnected unexpectedly.
    #[error("device disconnected")]
    DeviceDisconnected,

    /// The device app reported a failure (user rejection, busy, locked, ...).
    #[error("device error: {0}")]
    Device(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// The device signed for a different chain than the configured network.
    #[error("invalid networkId signature returned. Expected: {expected}, Got: {got}")]
    InvalidNetworkId {
        /// The configured network id.
        expected: u64,
        /// The chain id embedded in the returned `v`.
        got: i128,
    },

    /// The signature is invalid or malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// An address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transaction data is invalid.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    /// Failed to parse hex data.
    #[error("hex decoding failed: {0}")]
    HexDecodeFailed(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<FromHexError> for Error {
    fn from(err: FromHexError) -> Self {
        Self::HexDecodeFailed(err.to_string())
    }
}

impl From<SerdeJsonError> for Error {
    fn from(err: SerdeJsonError) -> Self {
        Self::JsonError(err.to_string())
    }
}

/// A specialized [`Result`] type for provider operations.
pub type Result<T> = CoreResult<T, Error>;

#[cfg(test)]
mod tests {
    use serde_json::{Value, from_str};

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::UnknownAddress("0xdead".to_string());
        assert_eq!(err.to_string(), "address unknown '0xdead'");

        let err = Error::InvalidNetworkId {
            expected: 1,
            got: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid networkId signature returned. Expected: 1, Got: 0"
        );

        let err = Error::InvalidPathTemplate("44'/60'/0'/0".to_string());
        assert!(err.to_string().contains("44'/60'/0'/0"));
    }

    #[test]
    fn from_hex_error() {
        let hex_err = FromHexError::InvalidHexCharacter { c: 'g', index: 0 };
        let err: Error = hex_err.into();
        assert!(matches!(err, Error::HexDecodeFailed(_)));
    }

    #[test]
    fn from_json_error() {
        let json_err = from_str::<Value>("not valid json{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
