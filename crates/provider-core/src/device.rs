//! Hardware device collaborators.
//!
//! The provider never speaks the device's wire protocol itself. It depends on
//! two traits that platform crates implement:
//!
//! - [`Transport`] opens and closes sessions with the physical device
//!   (USB HID, WebUSB, BLE, a speculos emulator, ...).
//! - [`EthereumApp`] drives the Ethereum app on the device over an open
//!   session: address derivation and the two signing commands.
//!
//! A session is opened at the start of every public provider operation and
//! closed before it returns, whether the operation succeeded or not.
//!
//! # Example
//!
//! ```ignore
//! use hw_evm_provider_core::{HardwareProvider, ProviderOptions};
//!
//! let transport = HidTransport::default();
//! let app = LedgerEthApp::default();
//! let provider = HardwareProvider::new(transport, app, ProviderOptions::default())?;
//!
//! let accounts = provider.enumerate_accounts().await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::signature::DeviceSignature;

/// Acquires and releases sessions with a hardware device.
#[async_trait]
pub trait Transport: Send + Sync {
    /// An open communication channel to the device.
    type Session: Send;

    /// Opens a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if no device is available or it cannot be opened.
    async fn open(&self) -> Result<Self::Session>;

    /// Closes a session previously returned by [`open`](Self::open).
    ///
    /// # Errors
    ///
    /// Returns an error if the device could not be released cleanly.
    async fn close(&self, session: Self::Session) -> Result<()>;
}

/// The device's answer to an address request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    /// The derived address, hex encoded (checksummed or not).
    pub address: String,
}

impl AddressResponse {
    /// Wraps a reported address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Commands of the Ethereum app running on the device.
///
/// Every method receives the session opened by the provider for the current
/// operation. Device-side failures (user rejection, locked device, app not
/// open) are reported as [`crate::Error`] and propagated untouched.
#[async_trait]
pub trait EthereumApp<S: Send>: Send + Sync {
    /// Derives the address at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - A resolved derivation path such as `44'/60'/0'/0/0`
    /// * `confirm` - Whether the device shows the address for confirmation
    /// * `chain_code` - Whether to also return the BIP-32 chain code
    ///
    /// # Errors
    ///
    /// Returns an error if the device refuses or the exchange fails.
    async fn get_address(
        &self,
        session: &mut S,
        path: &str,
        confirm: bool,
        chain_code: bool,
    ) -> Result<AddressResponse>;

    /// Signs a personal message (EIP-191) given as hex without `0x`.
    ///
    /// The returned `v` is 27 or 28.
    ///
    /// # Errors
    ///
    /// Returns an error if the user rejects or the exchange fails.
    async fn sign_personal_message(
        &self,
        session: &mut S,
        path: &str,
        message_hex: &str,
    ) -> Result<DeviceSignature>;

    /// Signs an RLP-encoded legacy transaction given as hex without `0x`.
    ///
    /// The returned `v` is EIP-155 encoded for the chain id in the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the user rejects or the exchange fails.
    async fn sign_transaction(
        &self,
        session: &mut S,
        path: &str,
        raw_tx_hex: &str,
    ) -> Result<DeviceSignature>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_response_from_json() {
        let response: AddressResponse = serde_json::from_str(
            r#"{"address": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", "publicKey": "04ab"}"#,
        )
        .unwrap();

        assert_eq!(
            response,
            AddressResponse::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        );
    }
}
