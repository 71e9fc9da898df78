//! Domain layer - pure hashing logic
//!
//! No I/O and no async: the encoder and hasher are deterministic functions of
//! the block fields.
//!
//! - [`encoder`]: canonical byte layout of an account block
//! - [`hasher`]: BLAKE2b-256 block hash and PoW challenge

pub mod encoder;
pub mod hasher;

pub use encoder::{
    encode_account_block, encode_account_block_hex, encode_amount, encode_data, encode_height,
    encode_nonce, left_pad, HEIGHT_WIDTH,
};
pub use hasher::{
    compute_account_block_hash, compute_account_block_hash_hex, hash_block, pow_challenge,
    verify_block_hash,
};
