//! # Shared Crypto - Ledger Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE2b (256-bit and variable width) | Block hashes, address/token checksums |
//! | `signatures` | Ed25519 | Account block signing |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Key material**: `SigningKey` zeroizes itself on drop; parsed seeds are
//!   wiped after use

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{
    blake2b_16, blake2b_160, blake2b_256, blake2b_256_many, blake2b_40, blake2b_var, Blake2bHasher,
    Hash,
};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
