//! Derivation path templates and the account index window.
//!
//! A template is a BIP-32 style path such as `44'/60'/x'/0/0` where the single
//! `x` stands for an account index. Several templates can be configured at
//! once; a *global* index walks through them round-robin, so the template
//! changes fastest and the account index grows slowest:
//!
//! ```text
//! templates: ["44'/60'/x'/0/0", "44'/60'/0'/x"]
//!
//! global 0 -> 44'/60'/0'/0/0
//! global 1 -> 44'/60'/0'/0
//! global 2 -> 44'/60'/1'/0/0
//! global 3 -> 44'/60'/0'/1
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The placeholder replaced by the account index.
pub const INDEX_PLACEHOLDER: char = 'x';

/// Ledger Live style path, one account per hardened account level.
pub const LEDGER_LIVE_TEMPLATE: &str = "44'/60'/x'/0/0";

/// Legacy (MEW / Ledger Chrome app) path, one account per address index.
pub const LEGACY_TEMPLATE: &str = "44'/60'/0'/x";

/// A derivation path template containing exactly one `x` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Validates and wraps a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPathTemplate`] unless the template contains
    /// exactly one `x`.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.matches(INDEX_PLACEHOLDER).count() != 1 {
            return Err(Error::InvalidPathTemplate(template));
        }
        Ok(Self(template))
    }

    /// The Ledger Live template, `44'/60'/x'/0/0`.
    #[must_use]
    pub fn ledger_live() -> Self {
        Self(LEDGER_LIVE_TEMPLATE.to_string())
    }

    /// The legacy template, `44'/60'/0'/x`.
    #[must_use]
    pub fn legacy() -> Self {
        Self(LEGACY_TEMPLATE.to_string())
    }

    /// Resolves the template for a given account index.
    ///
    /// # Example
    ///
    /// ```
    /// use hw_evm_provider_core::PathTemplate;
    ///
    /// let template = PathTemplate::new("44'/60'/x'/0/0").unwrap();
    /// assert_eq!(template.resolve(3), "44'/60'/3'/0/0");
    /// ```
    #[must_use]
    pub fn resolve(&self, account_index: u64) -> String {
        self.0.replacen(INDEX_PLACEHOLDER, &account_index.to_string(), 1)
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.0
    }
}

/// Position of a global index within the configured templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSlot {
    /// Which template to use.
    pub template_index: usize,
    /// The account index substituted for `x`.
    pub account_index: u64,
}

impl PathSlot {
    /// Splits a global index over `template_count` templates.
    ///
    /// `account_index = global / count` and
    /// `template_index = global - count * account_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPaths`] if `template_count` is zero.
    pub fn locate(global_index: u64, template_count: usize) -> Result<Self> {
        if template_count == 0 {
            return Err(Error::EmptyPaths);
        }
        let count = template_count as u64;
        let account_index = global_index / count;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "remainder is below template_count"
        )]
        let template_index = (global_index - count * account_index) as usize;
        Ok(Self {
            template_index,
            account_index,
        })
    }
}

/// Resolves the derivation path for a global index.
///
/// # Errors
///
/// Returns [`Error::EmptyPaths`] if `templates` is empty.
pub fn resolve_global(templates: &[PathTemplate], global_index: u64) -> Result<String> {
    let slot = PathSlot::locate(global_index, templates.len())?;
    templates
        .get(slot.template_index)
        .map(|template| template.resolve(slot.account_index))
        .ok_or(Error::EmptyPaths)
}
