//! Block Hasher
//!
//! BLAKE2b-256 over the canonical encoding. Pure: no state, no clock, no
//! randomness, so equal field sets always hash equally.

use super::encoder::encode_account_block;
use shared_crypto::{blake2b_256, Blake2bHasher};
use shared_types::{hash_to_hex, AccountBlock, Address, EncodingError, Hash, HashedBlock, ZERO_HASH};

/// Hash identifying `block`.
pub fn compute_account_block_hash(block: &AccountBlock) -> Result<Hash, EncodingError> {
    encode_account_block(block).map(|source| blake2b_256(&source))
}

/// [`compute_account_block_hash`] as lowercase hex.
pub fn compute_account_block_hash_hex(block: &AccountBlock) -> Result<String, EncodingError> {
    compute_account_block_hash(block).map(|hash| hash_to_hex(&hash))
}

/// Freeze a block together with its hash.
pub fn hash_block(block: AccountBlock) -> Result<HashedBlock, EncodingError> {
    let hash = compute_account_block_hash(&block)?;
    Ok(HashedBlock { block, hash })
}

/// True if `expected` is the hash of `block`.
pub fn verify_block_hash(block: &AccountBlock, expected: &Hash) -> Result<bool, EncodingError> {
    Ok(compute_account_block_hash(block)? == *expected)
}

/// Challenge the PoW solver works on for the next block of `address`.
///
/// BLAKE2b-256 of the original address followed by the previous hash (zero
/// sentinel for the first block).
pub fn pow_challenge(address: &Address, previous_hash: Option<&Hash>) -> Hash {
    let mut hasher = Blake2bHasher::new();
    hasher
        .update(&address.original_bytes())
        .update(previous_hash.unwrap_or(&ZERO_HASH));
    hasher.finalize()
}
