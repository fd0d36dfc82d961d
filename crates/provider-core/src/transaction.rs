//! Legacy (EIP-155) transaction canonicalization and RLP encoding.
//!
//! The device hashes and signs the RLP pre-image itself, so this module only
//! has to produce two byte strings:
//!
//! - the unsigned EIP-155 pre-image
//!   `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`
//! - the signed transaction
//!   `rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])`
//!
//! # Signing Flow
//!
//! 1. Canonicalize the request with [`LegacyTransaction::from_params`]
//! 2. Send [`LegacyTransaction::unsigned_rlp`] to the device
//! 3. Check the returned `v` against the configured chain id
//! 4. Serialize with [`LegacyTransaction::signed_rlp`]
//!
//! # Example
//!
//! ```
//! use hw_evm_provider_core::{LegacyTransaction, TransactionParams};
//!
//! let params = TransactionParams {
//!     from: "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string(),
//!     nonce: Some("0x9".to_string()),
//!     ..TransactionParams::default()
//! };
//! let tx = LegacyTransaction::from_params(&params, 1).unwrap();
//!
//! assert_eq!(tx.nonce, 9);
//! assert_eq!(tx.gas_limit, LegacyTransaction::DEFAULT_GAS_LIMIT);
//! ```

use alloy_primitives::U256;
use alloy_rlp::Encodable;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::params::TransactionParams;
use crate::signature::DeviceSignature;

/// An EIP-155 legacy transaction.
///
/// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTransaction {
    /// The chain ID for replay protection.
    pub chain_id: u64,

    /// The transaction nonce.
    pub nonce: u64,

    /// The gas price in wei.
    pub gas_price: U256,

    /// The gas limit.
    pub gas_limit: U256,

    /// The recipient address, or `None` for contract creation.
    pub to: Option<Address>,

    /// The value to transfer in wei.
    pub value: U256,

    /// The transaction input data.
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    /// Gas limit used when the request does not carry one.
    pub const DEFAULT_GAS_LIMIT: U256 = U256::from_limbs([21_000, 0, 0, 0]);

    /// Canonicalizes RPC transaction parameters.
    ///
    /// - `to`: parsed address, or `None` when absent or empty
    /// - `value`, `gasPrice`: zero when absent
    /// - `gas`: [`Self::DEFAULT_GAS_LIMIT`] when absent
    /// - `data`: empty when absent
    /// - `nonce`: parsed from hex, zero when absent **or unparseable**
    /// - chain id: always `chain_id`, whatever the request says
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransaction`] if a quantity is not valid hex
    /// - [`Error::HexDecodeFailed`] if `data` is not valid hex
    /// - [`Error::InvalidAddress`] / [`Error::HexDecodeFailed`] for a bad `to`
    pub fn from_params(params: &TransactionParams, chain_id: u64) -> Result<Self> {
        let to = match params.to.as_deref().map(strip_hex_prefix) {
            None | Some("") => None,
            Some(to) => Some(Address::from_hex(to)?),
        };

        let data = match params.data.as_deref().map(strip_hex_prefix) {
            None | Some("") => Vec::new(),
            Some(data) => hex::decode(data)?,
        };

        Ok(Self {
            chain_id,
            nonce: parse_nonce(params.nonce.as_deref()),
            gas_price: parse_quantity("gasPrice", params.gas_price.as_deref(), U256::ZERO)?,
            gas_limit: parse_quantity("gas", params.gas.as_deref(), Self::DEFAULT_GAS_LIMIT)?,
            to,
            value: parse_quantity("value", params.value.as_deref(), U256::ZERO)?,
            data,
        })
    }

    /// RLP-encodes the EIP-155 signing pre-image.
    ///
    /// `[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`
    #[must_use]
    pub fn unsigned_rlp(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        encode_rlp_list(&mut buf, |buf| {
            self.encode_common_fields(buf);
            self.chain_id.encode(buf);
            0u8.encode(buf);
            0u8.encode(buf);
        });

        buf
    }

    /// RLP-encodes the transaction with the device's signature.
    ///
    /// `v` is used as returned (already EIP-155 encoded); `r` and `s` are
    /// encoded as integers, i.e. without leading zero bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if `r` or `s` are malformed.
    pub fn signed_rlp(&self, signature: &DeviceSignature) -> Result<Vec<u8>> {
        let r = signature.r_bytes()?;
        let s = signature.s_bytes()?;
        let mut buf = Vec::new();

        encode_rlp_list(&mut buf, |buf| {
            self.encode_common_fields(buf);
            signature.v.encode(buf);
            encode_trimmed(&r, buf);
            encode_trimmed(&s, buf);
        });

        Ok(buf)
    }

    fn encode_common_fields(&self, buf: &mut Vec<u8>) {
        self.nonce.encode(buf);
        encode_u256(&self.gas_price, buf);
        encode_u256(&self.gas_limit, buf);
        encode_optional_address(self.to.as_ref(), buf);
        encode_u256(&self.value, buf);
        self.data.as_slice().encode(buf);
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parses an optional hex quantity; `0x` alone is zero.
fn parse_quantity(field: &str, value: Option<&str>, default: U256) -> Result<U256> {
    let Some(value) = value else {
        return Ok(default);
    };
    let digits = strip_hex_prefix(value);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidTransaction(format!("{field} {value:?}: {e}")))
}

/// Parses the nonce, falling back to zero on anything that is not hex.
fn parse_nonce(value: Option<&str>) -> u64 {
    let Some(value) = value else {
        return 0;
    };
    let digits = strip_hex_prefix(value);
    if digits.is_empty() {
        return 0;
    }
    u64::from_str_radix(digits, 16).unwrap_or_else(|e| {
        warn!(nonce = value, error = %e, "unparseable nonce, signing with nonce 0");
        0
    })
}

/// Encodes an RLP list using a closure to write elements.
fn encode_rlp_list<F>(out: &mut Vec<u8>, f: F)
where
    F: FnOnce(&mut Vec<u8>),
{
    let mut content = Vec::new();
    f(&mut content);

    let header = alloy_rlp::Header {
        list: true,
        payload_length: content.len(),
    };
    header.encode(out);
    out.extend_from_slice(&content);
}

/// Encodes a U256 as RLP (strips leading zeros).
fn encode_u256(value: &U256, out: &mut Vec<u8>) {
    encode_trimmed(&value.to_be_bytes::<32>(), out);
}

/// Encodes an optional address; `None` is the empty string.
fn encode_optional_address(addr: Option<&Address>, out: &mut Vec<u8>) {
    match addr {
        Some(a) => a.as_bytes().as_slice().encode(out),
        None => out.push(alloy_rlp::EMPTY_STRING_CODE),
    }
}

/// Encodes a big-endian integer, stripping leading zeros.
fn encode_trimmed(bytes: &[u8], out: &mut Vec<u8>) {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.is_empty() {
        out.push(alloy_rlp::EMPTY_STRING_CODE);
    } else {
        trimmed.encode(out);
    }
}
