//! # Error Types
//!
//! Errors raised while parsing or encoding ledger primitives. Both are fatal to
//! a submission: the caller has to fix the draft, retrying cannot help.

use thiserror::Error;

/// A value does not fit the fixed-width field it is encoded into.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Big-endian representation is wider than the field budget.
    #[error("{field} needs {actual} bytes but its encoding is fixed at {max}")]
    FieldTooWide {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Field width in bytes.
        max: usize,
        /// Minimal big-endian width of the value.
        actual: usize,
    },
}

/// Malformed user or network input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Address is not `vite_` + 40 hex + valid checksum.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Token id is not `tti_` + 20 hex + valid checksum.
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    /// Amount is not a base-10 integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount is negative.
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(String),

    /// Hash is not 64 hex characters.
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Block type outside 1..=7.
    #[error("Invalid block type: {0}")]
    InvalidBlockType(u8),

    /// Payload is not valid base64.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Value parses but does not fit its field.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
