//! Provider configuration.
//!
//! Callers hand in a partial [`ProviderOptions`]; [`ProviderConfig::resolve`]
//! merges it over the defaults and validates the result once, at
//! construction time, so a misconfigured provider is never built.
//!
//! | Option           | Default                                | Meaning                              |
//! |------------------|----------------------------------------|--------------------------------------|
//! | `networkId`      | `1`                                    | chain id for signing and EIP-155     |
//! | `paths`          | `["44'/60'/x'/0/0", "44'/60'/0'/x"]`   | derivation templates, one `x` each   |
//! | `askConfirm`     | `false`                                | confirm addresses on the device      |
//! | `accountsLength` | `1`                                    | number of accounts to enumerate      |
//! | `accountsOffset` | `0`                                    | first global index to enumerate      |
//!
//! The singular `path` option is deprecated and rejected outright.
//!
//! # Example
//!
//! ```
//! use hw_evm_provider_core::{ProviderConfig, ProviderOptions};
//!
//! let options = ProviderOptions::from_json(r#"{"networkId": 5, "accountsLength": 3}"#).unwrap();
//! let config = ProviderConfig::resolve(options).unwrap();
//!
//! assert_eq!(config.network_id, 5);
//! assert_eq!(config.paths.len(), 2);
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::path::PathTemplate;

/// Default chain id (Ethereum mainnet).
pub const DEFAULT_NETWORK_ID: u64 = 1;

/// Default number of accounts to enumerate.
pub const DEFAULT_ACCOUNTS_LENGTH: u32 = 1;

/// Default first global index.
pub const DEFAULT_ACCOUNTS_OFFSET: u32 = 0;

/// Caller-supplied, partial provider options.
///
/// Every field is optional; unset fields fall back to the defaults listed in
/// the [module documentation](self).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    /// Chain id used for signing and EIP-155 validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<u64>,

    /// Derivation path templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    /// Whether the device must display derived addresses for confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_confirm: Option<bool>,

    /// How many accounts to enumerate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_length: Option<u32>,

    /// The first global index to enumerate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_offset: Option<u32>,

    /// Deprecated single-path option. Any value here fails resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
}

impl ProviderOptions {
    /// Parses options from a JSON object using the camelCase option names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if the JSON is malformed or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the network id.
    #[must_use]
    pub const fn with_network_id(mut self, network_id: u64) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Sets the derivation path templates.
    #[must_use]
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether addresses must be confirmed on the device.
    #[must_use]
    pub const fn with_ask_confirm(mut self, ask_confirm: bool) -> Self {
        self.ask_confirm = Some(ask_confirm);
        self
    }

    /// Sets the number of accounts to enumerate.
    #[must_use]
    pub const fn with_accounts_length(mut self, accounts_length: u32) -> Self {
        self.accounts_length = Some(accounts_length);
        self
    }

    /// Sets the first global index to enumerate.
    #[must_use]
    pub const fn with_accounts_offset(mut self, accounts_offset: u32) -> Self {
        self.accounts_offset = Some(accounts_offset);
        self
    }
}

/// Fully resolved, validated provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Chain id used for signing and EIP-155 validation.
    pub network_id: u64,

    /// Derivation path templates, never empty.
    pub paths: Vec<PathTemplate>,

    /// Whether the device must display derived addresses for confirmation.
    pub ask_confirm: bool,

    /// How many accounts to enumerate.
    pub accounts_length: u32,

    /// The first global index to enumerate.
    pub accounts_offset: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID,
            paths: default_paths(),
            ask_confirm: false,
            accounts_length: DEFAULT_ACCOUNTS_LENGTH,
            accounts_offset: DEFAULT_ACCOUNTS_OFFSET,
        }
    }
}

impl ProviderConfig {
    /// Merges `options` over the defaults and validates the result.
    ///
    /// # Errors
    ///
    /// - [`Error::DeprecatedPathOption`] if the singular `path` option is set
    /// - [`Error::EmptyPaths`] if the resolved template list is empty
    /// - [`Error::InvalidPathTemplate`] if a template lacks exactly one `x`
    pub fn resolve(options: ProviderOptions) -> Result<Self> {
        if options.path.is_some() {
            return Err(Error::DeprecatedPathOption);
        }

        let defaults = Self::default();
        let paths = match options.paths {
            Some(paths) => paths
                .into_iter()
                .map(PathTemplate::new)
                .collect::<Result<Vec<_>>>()?,
            None => defaults.paths,
        };

        let config = Self {
            network_id: options.network_id.unwrap_or(defaults.network_id),
            paths,
            ask_confirm: options.ask_confirm.unwrap_or(defaults.ask_confirm),
            accounts_length: options.accounts_length.unwrap_or(defaults.accounts_length),
            accounts_offset: options.accounts_offset.unwrap_or(defaults.accounts_offset),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants of a configuration built by hand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPaths`] if there are no templates.
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(Error::EmptyPaths);
        }
        Ok(())
    }

    /// The window of global indices enumerated by this configuration.
    #[must_use]
    pub fn global_indices(&self) -> Range<u64> {
        let start = u64::from(self.accounts_offset);
        start..start + u64::from(self.accounts_length)
    }
}

fn default_paths() -> Vec<PathTemplate> {
    vec![PathTemplate::ledger_live(), PathTemplate::legacy()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_options() {
        let config = ProviderConfig::resolve(ProviderOptions::default()).unwrap();

        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.network_id, 1);
        assert_eq!(config.paths[0].as_str(), "44'/60'/x'/0/0");
        assert_eq!(config.paths[1].as_str(), "44'/60'/0'/x");
        assert!(!config.ask_confirm);
        assert_eq!(config.global_indices(), 0..1);
    }

    #[test]
    fn options_override_defaults() {
        let options = ProviderOptions::default()
            .with_network_id(137)
            .with_paths(["m/44'/60'/x'"])
            .with_ask_confirm(true)
            .with_accounts_length(4)
            .with_accounts_offset(10);

        let config = ProviderConfig::resolve(options).unwrap();

        assert_eq!(config.network_id, 137);
        assert_eq!(config.paths, vec![PathTemplate::new("m/44'/60'/x'").unwrap()]);
        assert!(config.ask_confirm);
        assert_eq!(config.global_indices(), 10..14);
    }

    #[test]
    fn deprecated_path_is_rejected() {
        let options = ProviderOptions::from_json(r#"{"path": "44'/60'/0'/0"}"#).unwrap();
        assert!(matches!(
            ProviderConfig::resolve(options),
            Err(Error::DeprecatedPathOption)
        ));
    }

    #[test]
    fn deprecated_path_wins_over_valid_paths() {
        let options =
            ProviderOptions::from_json(r#"{"path": "44'/60'/0'/0", "paths": ["44'/60'/x'"]}"#)
                .unwrap();
        assert!(matches!(
            ProviderConfig::resolve(options),
            Err(Error::DeprecatedPathOption)
        ));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let options = ProviderOptions::default().with_paths(Vec::<String>::new());
        assert!(matches!(
            ProviderConfig::resolve(options),
            Err(Error::EmptyPaths)
        ));
    }

    #[test]
    fn hand_built_config_without_paths_is_invalid() {
        let config = ProviderConfig {
            paths: Vec::new(),
            ..ProviderConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::EmptyPaths)));
        assert!(ProviderConfig::default().validate().is_ok());
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let options = ProviderOptions::default().with_paths(["44'/60'/0'/0"]);
        assert!(matches!(
            ProviderConfig::resolve(options),
            Err(Error::InvalidPathTemplate(_))
        ));
    }

    #[test]
    fn zero_length_window_is_allowed() {
        let options = ProviderOptions::default().with_accounts_length(0);
        let config = ProviderConfig::resolve(options).unwrap();
        assert!(config.global_indices().is_empty());
    }

    #[test]
    fn options_from_camel_case_json() {
        let options = ProviderOptions::from_json(
            r#"{"networkId": 3, "askConfirm": true, "accountsLength": 2, "accountsOffset": 1}"#,
        )
        .unwrap();

        assert_eq!(options.network_id, Some(3));
        assert_eq!(options.ask_confirm, Some(true));
        assert_eq!(options.accounts_length, Some(2));
        assert_eq!(options.accounts_offset, Some(1));
        assert!(options.paths.is_none());
    }

    #[test]
    fn options_reject_negative_length() {
        assert!(matches!(
            ProviderOptions::from_json(r#"{"accountsLength": -1}"#),
            Err(Error::JsonError(_))
        ));
    }
}
