//! Ed25519 block signer
//!
//! Signs block hashes with an in-memory key. The account address is derived
//! from the public key; the underlying signing key wipes itself on drop.

use crate::ports::{BlockSigner, SignError};
use async_trait::async_trait;
use shared_crypto::{CryptoError, Ed25519KeyPair};
use shared_types::{Address, Hash, PublicKey, Signature};
use std::fmt;

/// [`BlockSigner`] over an Ed25519 key pair.
pub struct Ed25519Signer {
    keypair: Ed25519KeyPair,
    address: Address,
}

impl Ed25519Signer {
    /// Signer for `keypair`.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        let address = Address::from_public_key(keypair.public_key().as_bytes());
        Self { keypair, address }
    }

    /// Signer from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    /// Signer from a hex private key (32-byte seed or 64-byte seed + public key).
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, CryptoError> {
        Ed25519KeyPair::from_private_key_hex(private_key).map(Self::new)
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BlockSigner for Ed25519Signer {
    fn address(&self) -> Address {
        self.address
    }

    fn public_key(&self) -> PublicKey {
        *self.keypair.public_key().as_bytes()
    }

    async fn sign(&self, hash: &Hash) -> Result<Signature, SignError> {
        Ok(*self.keypair.sign(hash).as_bytes())
    }
}
