//! Hardware Wallet EVM Provider Core Library
//!
//! This crate adapts a hardware signing device (a Ledger-style Ethereum app
//! reached over some transport) to the wallet-provider interface used by
//! Ethereum JSON-RPC middleware.
//!
//! # Overview
//!
//! The device holds the keys and does all cryptography. This library:
//!
//! - **Enumerates accounts** over one or more HD path templates
//! - **Remembers** which derivation path produced which address
//! - **Signs personal messages**, returning the 65-byte `r || s || v` hex
//! - **Signs legacy transactions** with EIP-155 replay protection, rejecting
//!   signatures that encode a different chain
//! - **Bridges** the async API to callback-style middleware hooks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               RPC middleware (callback hooks)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 CallbackProvider (WalletHooks)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       HardwareProvider                       │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐  │
//! │  │  Config  │  │  Path    │  │ Account  │  │ Legacy tx / │  │
//! │  │ resolver │  │templates │  │ registry │  │  signature  │  │
//! │  └──────────┘  └──────────┘  └──────────┘  └─────────────┘  │
//! ├─────────────────────────────────────────────────────────────┤
//! │          Transport + EthereumApp (implemented elsewhere)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Resolving a configuration
//!
//! ```rust
//! use hw_evm_provider_core::{ProviderConfig, ProviderOptions};
//!
//! let options = ProviderOptions::default()
//!     .with_network_id(137)
//!     .with_accounts_length(4);
//! let config = ProviderConfig::resolve(options).unwrap();
//!
//! assert_eq!(config.global_indices(), 0..4);
//! ```
//!
//! ## Deprecated options fail fast
//!
//! ```rust
//! use hw_evm_provider_core::{Error, ProviderConfig, ProviderOptions};
//!
//! let options = ProviderOptions::from_json(r#"{"path": "44'/60'/0'/0"}"#).unwrap();
//! assert!(matches!(
//!     ProviderConfig::resolve(options),
//!     Err(Error::DeprecatedPathOption)
//! ));
//! ```
//!
//! ## Driving a device
//!
//! Implement [`Transport`] and [`EthereumApp`] for your platform, then:
//!
//! ```ignore
//! use hw_evm_provider_core::{HardwareProvider, ProviderOptions, TransactionParams};
//!
//! let provider = HardwareProvider::new(transport, app, ProviderOptions::default())?;
//!
//! let accounts = provider.get_accounts().await?;
//! let raw_tx = provider
//!     .sign_transaction(&TransactionParams {
//!         from: accounts[0].clone(),
//!         to: Some("0x3535353535353535353535353535353535353535".into()),
//!         value: Some("0xde0b6b3a7640000".into()),
//!         nonce: Some("0x0".into()),
//!         ..TransactionParams::default()
//!     })
//!     .await?;
//! ```
//!
//! # Security Considerations
//!
//! - Private keys never leave the device
//! - Only addresses returned by enumeration can sign
//! - A transaction signature whose `v` does not encode the configured
//!   network id is rejected, never returned
//! - Nothing is persisted; the registry lives as long as the provider

// Modules
pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod params;
pub mod path;
pub mod provider;
pub mod registry;
pub mod shim;
pub mod signature;
pub mod transaction;

// Re-exports for convenience
pub use address::Address;
pub use config::{ProviderConfig, ProviderOptions};
pub use device::{AddressResponse, EthereumApp, Transport};
pub use error::{Error, Result};
pub use params::{MessageParams, TransactionParams};
pub use path::PathTemplate;
pub use provider::{DerivedAccount, HardwareProvider};
pub use registry::AccountRegistry;
pub use shim::{Callback, CallbackProvider, WalletHooks};
pub use signature::{DeviceSignature, Signature};
pub use transaction::LegacyTransaction;

pub use alloy_primitives::U256;
