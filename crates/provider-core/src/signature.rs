//! Signature types exchanged with the device and returned to the RPC layer.
//!
//! The device answers every signing request with a [`DeviceSignature`]: a raw
//! `{ v, r, s }` triple whose `v` follows the device's convention (27/28 for
//! personal messages, `chain_id * 2 + 35 + parity` for EIP-155
//! transactions). [`Signature`] is the normalized 65-byte form handed back
//! for personal messages.
//!
//! # Wire Format
//!
//! ```text
//! 0x || r (32 bytes) || s (32 bytes) || v (1 byte, 0 or 1)
//! ```
//!
//! # Example
//!
//! ```
//! use hw_evm_provider_core::DeviceSignature;
//!
//! let raw = DeviceSignature::new(28, "11".repeat(32), "22".repeat(32));
//! let sig = raw.to_personal_signature().unwrap();
//!
//! assert_eq!(sig.v(), 1);
//! assert!(sig.to_hex().ends_with("01"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Offset of the recovery id in the legacy `v` convention.
pub const PERSONAL_SIGN_V_OFFSET: u64 = 27;

/// Offset of the recovery id in the EIP-155 `v` convention.
pub const EIP155_V_OFFSET: i128 = 35;

/// A normalized 65-byte ECDSA signature.
///
/// # Components
///
/// - `r`: 32-byte scalar representing the x-coordinate of the ephemeral point
/// - `s`: 32-byte scalar of the signature
/// - `v`: Recovery parameter (`0` or `1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes).
    r: [u8; 32],

    /// The S component of the signature (32 bytes).
    s: [u8; 32],

    /// The recovery parameter.
    v: u8,
}

impl Signature {
    /// The length of a serialized signature in bytes.
    pub const BYTE_LEN: usize = 65;

    /// Creates a new signature from raw components.
    #[must_use]
    pub const fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Serializes the signature to a 65-byte array (`r || s || v`).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        let mut bytes = [0u8; Self::BYTE_LEN];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Returns the R component of the signature.
    #[must_use]
    pub const fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Returns the S component of the signature.
    #[must_use]
    pub const fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Returns the recovery parameter (v).
    #[must_use]
    pub const fn v(&self) -> u8 {
        self.v
    }

    /// Encodes the signature as a hex string with `0x` prefix.
    ///
    /// The result is always 132 characters long: `0x` followed by 64 hex
    /// digits for `r`, 64 for `s` and 2 for `v`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// A signature exactly as the device returned it.
///
/// `r` and `s` are hex strings (with or without `0x`). `v` deserializes from
/// either a JSON number or a hex string, since device apps report it both
/// ways depending on the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignature {
    /// The raw recovery value in the device's convention.
    #[serde(with = "quantity")]
    pub v: u64,

    /// The R component, hex encoded.
    pub r: String,

    /// The S component, hex encoded.
    pub s: String,
}

/// Serde helper accepting `v` as a number or a hex string.
mod quantity {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrHex {
        Number(u64),
        Hex(String),
    }

    pub(super) fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*value)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrHex::deserialize(deserializer)? {
            NumberOrHex::Number(n) => Ok(n),
            NumberOrHex::Hex(s) => {
                let digits = s.strip_prefix("0x").unwrap_or(&s);
                u64::from_str_radix(digits, 16).map_err(de::Error::custom)
            }
        }
    }
}

impl DeviceSignature {
    /// Creates a device signature from its raw parts.
    #[must_use]
    pub fn new(v: u64, r: impl Into<String>, s: impl Into<String>) -> Self {
        Self {
            v,
            r: r.into(),
            s: s.into(),
        }
    }

    /// Decodes the R component into a big-endian 32-byte array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if `r` is not hex or longer than
    /// 32 bytes.
    pub fn r_bytes(&self) -> Result<[u8; 32]> {
        decode_scalar("r", &self.r)
    }

    /// Decodes the S component into a big-endian 32-byte array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if `s` is not hex or longer than
    /// 32 bytes.
    pub fn s_bytes(&self) -> Result<[u8; 32]> {
        decode_scalar("s", &self.s)
    }

    /// Normalizes a personal-message signature (`v` in 27/28 form).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if `v` is below 27 or the
    /// normalized value does not fit in a byte, or if `r`/`s` are malformed.
    pub fn to_personal_signature(&self) -> Result<Signature> {
        let v = self
            .v
            .checked_sub(PERSONAL_SIGN_V_OFFSET)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| {
                Error::InvalidSignature(format!("unexpected personal-sign v value {}", self.v))
            })?;

        Ok(Signature::new(self.r_bytes()?, self.s_bytes()?, v))
    }

    /// Returns the chain id embedded in an EIP-155 `v`: `floor((v - 35) / 2)`.
    ///
    /// Values of `v` below 35 yield a negative id, which never matches a
    /// configured network.
    #[must_use]
    pub fn signed_chain_id(&self) -> i128 {
        (i128::from(self.v) - EIP155_V_OFFSET).div_euclid(2)
    }
}

fn decode_scalar(name: &str, hex_str: &str) -> Result<[u8; 32]> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
    .map_err(|e| Error::InvalidSignature(format!("{name} component: {e}")))?;

    if bytes.len() > 32 {
        return Err(Error::InvalidSignature(format!(
            "{name} component is {} bytes, expected at most 32",
            bytes.len()
        )));
    }

    let mut scalar = [0u8; 32];
    scalar[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(scalar)
}
