//! The hardware device provider: account enumeration and signing.
//!
//! [`HardwareProvider`] ties the configuration, the account registry and the
//! device collaborators together. Each public operation opens one transport
//! session, does its work, and closes the session before returning, also
//! when the work failed.
//!
//! # Example
//!
//! ```ignore
//! use hw_evm_provider_core::{HardwareProvider, ProviderOptions};
//!
//! let provider = HardwareProvider::new(
//!     transport,
//!     app,
//!     ProviderOptions::default().with_accounts_length(5),
//! )?;
//!
//! // Populates the registry; signing only works for these addresses.
//! let accounts = provider.get_accounts().await?;
//!
//! let signature = provider.sign_personal_message(&accounts[0], "0x68656c6c6f").await?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ProviderConfig, ProviderOptions};
use crate::device::{EthereumApp, Transport};
use crate::error::{Error, Result};
use crate::params::TransactionParams;
use crate::path::resolve_global;
use crate::registry::AccountRegistry;
use crate::transaction::LegacyTransaction;

/// One enumerated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAccount {
    /// The resolved derivation path.
    pub path: String,

    /// The address the device reported for `path`.
    pub address: String,
}

/// Adapts a hardware signing device to the Ethereum wallet-provider contract.
pub struct HardwareProvider<T, A> {
    /// Opens and closes device sessions.
    transport: T,

    /// Issues Ethereum app commands over a session.
    app: A,

    /// Resolved configuration.
    config: ProviderConfig,

    /// Address → path map filled by enumeration.
    registry: AccountRegistry,
}

impl<T, A> fmt::Debug for HardwareProvider<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareProvider")
            .field("config", &self.config)
            .field("known_accounts", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<T, A> HardwareProvider<T, A>
where
    T: Transport,
    A: EthereumApp<T::Session>,
{
    /// Creates a provider, resolving `options` over the defaults.
    ///
    /// # Errors
    ///
    /// Fails immediately with a configuration error (see
    /// [`ProviderConfig::resolve`]); no device is touched.
    pub fn new(transport: T, app: A, options: ProviderOptions) -> Result<Self> {
        Self::with_config(transport, app, ProviderConfig::resolve(options)?)
    }

    /// Creates a provider from an already resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPaths`] if `config` has no templates.
    pub fn with_config(transport: T, app: A, config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            app,
            config,
            registry: AccountRegistry::new(),
        })
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the address → path registry.
    #[must_use]
    pub const fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Enumerates the configured window of accounts.
    ///
    /// Global index `i` runs from `accounts_offset` to
    /// `accounts_offset + accounts_length - 1`; each one is mapped to a
    /// template and an account index (see [`crate::path`]) and queried on the
    /// device. Every reported address is recorded in the registry.
    ///
    /// # Returns
    ///
    /// The accounts in enumeration order.
    ///
    /// # Errors
    ///
    /// Propagates transport and device errors after the session is closed.
    /// Accounts recorded before the failure stay in the registry.
    pub async fn enumerate_accounts(&self) -> Result<Vec<DerivedAccount>> {
        let mut session = self.transport.open().await?;
        let result = self.enumerate_with(&mut session).await;
        self.release(session, result).await
    }

    /// Enumerates accounts and returns only their addresses.
    ///
    /// # Errors
    ///
    /// Same as [`enumerate_accounts`](Self::enumerate_accounts).
    pub async fn get_accounts(&self) -> Result<Vec<String>> {
        let accounts = self.enumerate_accounts().await?;
        Ok(accounts.into_iter().map(|account| account.address).collect())
    }

    /// Signs a personal message with the account `from`.
    ///
    /// `data` is the hex payload, with or without `0x`.
    ///
    /// # Returns
    ///
    /// `0x || r || s || v` with `v` normalized to `00`/`01`, 132 characters.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAddress`] if `from` was never enumerated; the device
    ///   is not contacted
    /// - [`Error::InvalidSignature`] if the device answer is malformed
    /// - transport and device errors, after the session is closed
    pub async fn sign_personal_message(&self, from: &str, data: &str) -> Result<String> {
        let path = self.path_for(from)?;
        let message = data.strip_prefix("0x").unwrap_or(data);
        debug!(%path, bytes = message.len() / 2, "signing personal message");

        let mut session = self.transport.open().await?;
        let result = self
            .app
            .sign_personal_message(&mut session, &path, message)
            .await;
        let raw = self.release(session, result).await?;

        Ok(raw.to_personal_signature()?.to_hex())
    }

    /// Signs a legacy transaction for the configured network.
    ///
    /// # Returns
    ///
    /// The `0x`-prefixed RLP of the signed transaction, ready for
    /// `eth_sendRawTransaction`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAddress`] if `params.from` was never enumerated
    /// - canonicalization errors from [`LegacyTransaction::from_params`]
    /// - [`Error::InvalidNetworkId`] if the returned `v` encodes another chain
    /// - transport and device errors, after the session is closed
    pub async fn sign_transaction(&self, params: &TransactionParams) -> Result<String> {
        let path = self.path_for(&params.from)?;
        let network_id = self.config.network_id;
        let tx = LegacyTransaction::from_params(params, network_id)?;
        let unsigned = hex::encode(tx.unsigned_rlp());
        debug!(%path, network_id, nonce = tx.nonce, "signing transaction");

        let mut session = self.transport.open().await?;
        let result = self
            .app
            .sign_transaction(&mut session, &path, &unsigned)
            .await;
        let signature = self.release(session, result).await?;

        let signed_chain_id = signature.signed_chain_id();
        if signed_chain_id != i128::from(network_id) {
            warn!(
                expected = network_id,
                got = %signed_chain_id,
                v = signature.v,
                "device signed for the wrong chain"
            );
            return Err(Error::InvalidNetworkId {
                expected: network_id,
                got: signed_chain_id,
            });
        }

        Ok(format!("0x{}", hex::encode(tx.signed_rlp(&signature)?)))
    }

    fn path_for(&self, address: &str) -> Result<String> {
        self.registry
            .path_for(address)
            .ok_or_else(|| Error::UnknownAddress(address.to_string()))
    }

    async fn enumerate_with(&self, session: &mut T::Session) -> Result<Vec<DerivedAccount>> {
        let indices = self.config.global_indices();
        let mut accounts = Vec::with_capacity(self.config.accounts_length as usize);

        for index in indices {
            let path = resolve_global(&self.config.paths, index)?;
            debug!(index, %path, "requesting address from device");

            let response = self
                .app
                .get_address(session, &path, self.config.ask_confirm, false)
                .await?;

            self.registry.insert(&response.address, path.clone());
            accounts.push(DerivedAccount {
                path,
                address: response.address,
            });
        }

        info!(count = accounts.len(), "enumerated device accounts");
        Ok(accounts)
    }

    /// Closes `session` and merges the close outcome into `result`.
    ///
    /// The operation's own error takes precedence over a close error.
    async fn release<R>(&self, session: T::Session, result: Result<R>) -> Result<R> {
        let closed = self.transport.close(session).await;
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "failed to close device session after error");
                Err(err)
            }
        }
    }
}
