//! # BLAKE2b Hashing
//!
//! The ledger identifies blocks, addresses and token ids with BLAKE2b digests of
//! different widths:
//!
//! | Width | Use |
//! |-------|-----|
//! | 32 bytes | block hash, data hash, PoW challenge |
//! | 20 bytes | address core from a public key |
//! | 5 bytes  | address checksum |
//! | 2 bytes  | token id checksum |
//!
//! A BLAKE2b digest of width `n` is not a truncation of the 64-byte digest: the
//! output length is part of the parameter block, so each width needs its own
//! hasher.

use crate::CryptoError;
use blake2::digest::consts::{U2, U20, U32, U5};
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2b, Blake2bVar, Digest};

/// BLAKE2b-256 hash output.
pub type Hash = [u8; 32];

type Blake2b256 = Blake2b<U32>;

/// Maximum BLAKE2b output width in bytes.
pub const MAX_DIGEST_LEN: usize = 64;

/// Stateful BLAKE2b-256 hasher.
pub struct Blake2bHasher {
    inner: Blake2b256,
}

impl Blake2bHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Blake2b256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        Digest::update(&mut self.inner, data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        Digest::finalize(self.inner).into()
    }
}

impl Default for Blake2bHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with BLAKE2b-256 (one-shot).
pub fn blake2b_256(data: &[u8]) -> Hash {
    Blake2b256::digest(data).into()
}

/// Hash multiple inputs as if they were concatenated.
pub fn blake2b_256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Blake2bHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// BLAKE2b-160: address core derived from a public key.
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    Blake2b::<U20>::digest(data).into()
}

/// BLAKE2b-40: address checksum.
pub fn blake2b_40(data: &[u8]) -> [u8; 5] {
    Blake2b::<U5>::digest(data).into()
}

/// BLAKE2b-16: token id checksum.
pub fn blake2b_16(data: &[u8]) -> [u8; 2] {
    Blake2b::<U2>::digest(data).into()
}

/// BLAKE2b with an arbitrary output width (1..=64 bytes).
pub fn blake2b_var(data: &[u8], out_len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut hasher = Blake2bVar::new(out_len).map_err(|_| CryptoError::InvalidDigestLength {
        requested: out_len,
        max: MAX_DIGEST_LEN,
    })?;
    hasher.update(data);

    let mut out = vec![0u8; out_len];
    hasher
        .finalize_variable(&mut out)
        .map_err(|_| CryptoError::InvalidDigestLength {
            requested: out_len,
            max: MAX_DIGEST_LEN,
        })?;
    Ok(out)
}
