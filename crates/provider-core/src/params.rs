//! Request parameters as the JSON-RPC middleware hands them over.
//!
//! Quantities are `0x`-prefixed hex strings, exactly as they appear in
//! `eth_sendTransaction` / `personal_sign` requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Parameters of a `personal_sign` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParams {
    /// The signing account.
    pub from: String,

    /// The message payload, hex encoded (`0x` optional).
    pub data: String,
}

impl MessageParams {
    /// Creates message parameters.
    #[must_use]
    pub fn new(from: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            data: data.into(),
        }
    }
}

/// Parameters of an `eth_signTransaction` / `eth_sendTransaction` request.
///
/// Any `chainId` the caller supplies is accepted but ignored: the provider
/// always signs for its configured network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    /// The signing account.
    pub from: String,

    /// Recipient, or `None` for contract creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Value in wei (hex quantity).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Gas price in wei (hex quantity).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,

    /// Gas limit (hex quantity).
    #[serde(default, alias = "gasLimit", skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,

    /// Call data (hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Account nonce (hex quantity).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Caller supplied chain id, ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Value>,
}

impl TransactionParams {
    /// Parses transaction parameters from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonError`] if parsing fails.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_params_from_rpc_json() {
        let params = TransactionParams::from_json(
            r#"{
                "from": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
                "to": "0x3535353535353535353535353535353535353535",
                "value": "0xde0b6b3a7640000",
                "gasPrice": "0x4a817c800",
                "gas": "0x5208",
                "nonce": "0x9",
                "chainId": 3
            }"#,
        )
        .unwrap();

        assert_eq!(params.gas_price.as_deref(), Some("0x4a817c800"));
        assert_eq!(params.gas.as_deref(), Some("0x5208"));
        assert_eq!(params.chain_id, Some(Value::from(3)));
        assert!(params.data.is_none());
    }

    #[test]
    fn gas_limit_alias() {
        let params =
            TransactionParams::from_json(r#"{"from": "0x00", "gasLimit": "0x7530"}"#).unwrap();
        assert_eq!(params.gas.as_deref(), Some("0x7530"));
    }

    #[test]
    fn message_params_from_json() {
        let params: MessageParams =
            serde_json::from_str(r#"{"from": "0xabc", "data": "0x68656c6c6f"}"#).unwrap();
        assert_eq!(params, MessageParams::new("0xabc", "0x68656c6c6f"));
    }
}
