//! # Ledger Primitives
//!
//! Hashes, raw-unit amounts and PoW nonces as they flow through the block
//! encoder and the RPC layer.

use crate::errors::{EncodingError, ValidationError};
use base64::{engine::general_purpose, Engine as _};
use primitive_types::U512;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

pub use primitive_types::U256;

/// A 32-byte BLAKE2b-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Previous hash of an account's first block, and the default send-block hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Width of an encoded amount or fee.
pub const AMOUNT_WIDTH: usize = 32;

/// Width of an encoded nonce.
pub const NONCE_WIDTH: usize = 8;

/// Lowercase hex of a hash.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex hash.
pub fn hash_from_hex(s: &str) -> Result<Hash, ValidationError> {
    let bytes = hex::decode(s).map_err(|_| ValidationError::InvalidHash(s.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| ValidationError::InvalidHash(s.to_string()))
}

/// Non-negative amount in the token's smallest unit.
///
/// Backed by a 256-bit integer, which is exactly the width the block encoder
/// gives amounts and fees. Serialized as a decimal string.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Amount(U256);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(U256::zero());

    /// Wrap a raw value.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Parse a base-10 string.
    ///
    /// A leading `-` is a [`ValidationError::NegativeAmount`]; a value needing
    /// more than 32 bytes is an [`EncodingError::FieldTooWide`].
    pub fn from_dec_str(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(ValidationError::NegativeAmount(s.to_string()));
        }
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAmount(s.to_string()));
        }

        match U256::from_dec_str(trimmed) {
            Ok(value) => Ok(Self(value)),
            Err(_) => Err(EncodingError::FieldTooWide {
                field: "amount",
                max: AMOUNT_WIDTH,
                actual: decimal_byte_width(trimmed),
            }
            .into()),
        }
    }

    /// Build from big-endian bytes, rejecting values wider than 32 bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        let minimal = strip_leading_zeros(bytes);
        if minimal.len() > AMOUNT_WIDTH {
            return Err(EncodingError::FieldTooWide {
                field: "amount",
                max: AMOUNT_WIDTH,
                actual: minimal.len(),
            });
        }
        Ok(Self(U256::from_big_endian(minimal)))
    }

    /// Minimal big-endian bytes; empty for zero.
    pub fn to_be_bytes_minimal(&self) -> Vec<u8> {
        let mut buf = [0u8; AMOUNT_WIDTH];
        self.0.to_big_endian(&mut buf);
        strip_leading_zeros(&buf).to_vec()
    }

    /// Raw 256-bit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// True for zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

/// PoW nonce as raw bytes (base64 on the wire).
///
/// The encoder left-pads it to 8 bytes; anything wider is rejected there
/// rather than here so the error carries the field context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Big-endian 8-byte nonce.
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes().to_vec())
    }

    /// Decode from standard base64.
    pub fn from_base64(s: &str) -> Result<Self, ValidationError> {
        general_purpose::STANDARD
            .decode(s)
            .map(Self)
            .map_err(|_| ValidationError::InvalidBase64(s.to_string()))
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Decode an opaque base64 payload (block `data`).
pub fn decode_base64(s: &str) -> Result<Vec<u8>, ValidationError> {
    general_purpose::STANDARD
        .decode(s)
        .map_err(|_| ValidationError::InvalidBase64(s.to_string()))
}

/// Encode an opaque payload as base64.
pub fn encode_base64(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

// Minimal byte width of an all-digit decimal string too large for U256.
fn decimal_byte_width(digits: &str) -> usize {
    if let Ok(value) = U512::from_dec_str(digits) {
        return (value.bits() + 7) / 8;
    }
    // log2(10) ~= 3.3220 bits per digit
    (digits.len() * 33_220 / 10_000 + 7) / 8
}
