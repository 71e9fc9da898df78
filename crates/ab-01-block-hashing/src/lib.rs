//! # Account Block Hashing (Subsystem 01)
//!
//! **Bounded Context:** Block identity
//!
//! ## Purpose
//!
//! Derives the identifier of an account block: a canonical, order-fixed byte
//! encoding of the block fields hashed with BLAKE2b-256. The network computes
//! the same function, so every byte here must match it exactly.
//!
//! ## Critical Invariants
//!
//! 1. **Determinism**: equal field sets hash equally
//! 2. **Category exclusivity**: request blocks never encode a send-block hash,
//!    response blocks never encode to-address/amount/token
//! 3. **Fixed widths**: amount/fee 32 bytes, height/nonce 8 bytes, zero-padded
//!    on the left; wider values are rejected, never truncated
//!
//! ## Usage Example
//!
//! ```rust
//! use ab_01_block_hashing::compute_account_block_hash_hex;
//! use shared_types::{AccountBlock, Address, AddressKind, Amount, TokenId};
//!
//! let from = Address::new([1u8; 20], AddressKind::User);
//! let to = Address::new([2u8; 20], AddressKind::User);
//! let mut block = AccountBlock::transfer(from, to, TokenId::vite(), Amount::from(500));
//! block.height = 1;
//!
//! let hash = compute_account_block_hash_hex(&block).unwrap();
//! assert_eq!(hash.len(), 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

pub use domain::*;
pub use shared_types::EncodingError;

/// Subsystem identifier used in log prefixes
pub const SUBSYSTEM_ID: u8 = 1;
