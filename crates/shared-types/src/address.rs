//! # Account Addresses and Token Ids
//!
//! Both identifiers have two textual forms:
//!
//! - **display**: prefix + hex body + hex checksum, what users paste around;
//! - **original**: the raw bytes the block hash is computed over.
//!
//! ```text
//! vite_ | 40 hex core (20 bytes) | 10 hex checksum (BLAKE2b-40 of core)
//! tti_  | 20 hex id   (10 bytes) |  4 hex checksum (BLAKE2b-16 of id)
//! ```
//!
//! The original address is the 20-byte core followed by one kind byte
//! (`00` user, `01` contract). Contract addresses carry a bit-inverted
//! checksum, which is how the kind is recovered from the display form.

use crate::errors::ValidationError;
use crate::primitives::PublicKey;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use shared_crypto::{blake2b_16, blake2b_160, blake2b_40};
use std::fmt;
use std::str::FromStr;

/// Display prefix of an address.
pub const ADDRESS_PREFIX: &str = "vite_";

/// Bytes in an address core.
pub const ADDRESS_CORE_LEN: usize = 20;

/// Bytes in the original (hashed) form of an address.
pub const ADDRESS_ORIGINAL_LEN: usize = ADDRESS_CORE_LEN + 1;

const ADDRESS_CHECKSUM_LEN: usize = 5;

/// Display prefix of a token id.
pub const TOKEN_ID_PREFIX: &str = "tti_";

/// Bytes in a token id.
pub const TOKEN_ID_LEN: usize = 10;

const TOKEN_ID_CHECKSUM_LEN: usize = 2;

/// The native token.
pub const VITE_TOKEN_ID: &str = "tti_5649544520544f4b454e6e40";

/// Whether an address belongs to a key holder or a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Externally owned account.
    User,
    /// Contract account.
    Contract,
}

impl AddressKind {
    fn flag(self) -> u8 {
        match self {
            AddressKind::User => 0x00,
            AddressKind::Contract => 0x01,
        }
    }
}

/// Account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Address {
    core: [u8; ADDRESS_CORE_LEN],
    kind: AddressKind,
}

impl Address {
    /// Build from a 20-byte core.
    pub fn new(core: [u8; ADDRESS_CORE_LEN], kind: AddressKind) -> Self {
        Self { core, kind }
    }

    /// User address owned by an Ed25519 key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::new(blake2b_160(public_key), AddressKind::User)
    }

    /// Parse the 42-hex original form.
    pub fn from_original_hex(s: &str) -> Result<Self, ValidationError> {
        let bytes = hex::decode(s).map_err(|_| ValidationError::InvalidAddress(s.to_string()))?;
        if bytes.len() != ADDRESS_ORIGINAL_LEN {
            return Err(ValidationError::InvalidAddress(s.to_string()));
        }
        let kind = match bytes[ADDRESS_CORE_LEN] {
            0x00 => AddressKind::User,
            0x01 => AddressKind::Contract,
            _ => return Err(ValidationError::InvalidAddress(s.to_string())),
        };
        let mut core = [0u8; ADDRESS_CORE_LEN];
        core.copy_from_slice(&bytes[..ADDRESS_CORE_LEN]);
        Ok(Self::new(core, kind))
    }

    /// True if `s` is a well-formed display address with a valid checksum.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Address>().is_ok()
    }

    /// 20-byte core.
    pub fn core(&self) -> &[u8; ADDRESS_CORE_LEN] {
        &self.core
    }

    /// Address kind.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The 21 bytes that enter the block hash.
    pub fn original_bytes(&self) -> [u8; ADDRESS_ORIGINAL_LEN] {
        let mut out = [0u8; ADDRESS_ORIGINAL_LEN];
        out[..ADDRESS_CORE_LEN].copy_from_slice(&self.core);
        out[ADDRESS_CORE_LEN] = self.kind.flag();
        out
    }

    /// Original form as lowercase hex.
    pub fn original_hex(&self) -> String {
        hex::encode(self.original_bytes())
    }

    fn checksum(&self) -> [u8; ADDRESS_CHECKSUM_LEN] {
        checksum_for(&self.core, self.kind)
    }
}

fn checksum_for(core: &[u8; ADDRESS_CORE_LEN], kind: AddressKind) -> [u8; ADDRESS_CHECKSUM_LEN] {
    let mut sum = blake2b_40(core);
    if kind == AddressKind::Contract {
        for byte in sum.iter_mut() {
            *byte ^= 0xFF;
        }
    }
    sum
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            ADDRESS_PREFIX,
            hex::encode(self.core),
            hex::encode(self.checksum())
        )
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidAddress(s.to_string());

        let body = s.strip_prefix(ADDRESS_PREFIX).ok_or_else(invalid)?;
        if body.len() != (ADDRESS_CORE_LEN + ADDRESS_CHECKSUM_LEN) * 2 {
            return Err(invalid());
        }
        let bytes = hex::decode(body).map_err(|_| invalid())?;

        let mut core = [0u8; ADDRESS_CORE_LEN];
        core.copy_from_slice(&bytes[..ADDRESS_CORE_LEN]);
        let checksum = &bytes[ADDRESS_CORE_LEN..];

        [AddressKind::User, AddressKind::Contract]
            .into_iter()
            .find(|kind| checksum_for(&core, *kind)[..] == *checksum)
            .map(|kind| Self::new(core, kind))
            .ok_or_else(invalid)
    }
}

/// Token identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct TokenId([u8; TOKEN_ID_LEN]);

impl TokenId {
    /// Build from raw bytes.
    pub fn new(bytes: [u8; TOKEN_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// The native token.
    pub fn vite() -> Self {
        // Checked by `test_native_token_checksum`.
        Self(*b"VITE TOKEN")
    }

    /// True if `s` is a well-formed display token id with a valid checksum.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<TokenId>().is_ok()
    }

    /// The 10 bytes that enter the block hash.
    pub fn original_bytes(&self) -> [u8; TOKEN_ID_LEN] {
        self.0
    }

    /// Original form as lowercase hex.
    pub fn original_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            TOKEN_ID_PREFIX,
            hex::encode(self.0),
            hex::encode(blake2b_16(&self.0))
        )
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self)
    }
}

impl FromStr for TokenId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTokenId(s.to_string());

        let body = s.strip_prefix(TOKEN_ID_PREFIX).ok_or_else(invalid)?;
        if body.len() != (TOKEN_ID_LEN + TOKEN_ID_CHECKSUM_LEN) * 2 {
            return Err(invalid());
        }
        let bytes = hex::decode(body).map_err(|_| invalid())?;

        let mut id = [0u8; TOKEN_ID_LEN];
        id.copy_from_slice(&bytes[..TOKEN_ID_LEN]);
        if blake2b_16(&id)[..] != bytes[TOKEN_ID_LEN..] {
            return Err(invalid());
        }
        Ok(Self(id))
    }
}
