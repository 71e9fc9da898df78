//! Outbound ports (driven side - SPI)
//!
//! The pipeline only talks to the network, the signer and the PoW service
//! through these traits. Implementations decide the transport.

use crate::domain::{AccountQuota, ChainHead, QuotaRequest, QuotaRequirement};
use async_trait::async_trait;
use primitive_types::U256;
use shared_types::{Address, Amount, Hash, Nonce, PublicKey, Signature, SignedBlock, TokenId};
use thiserror::Error;

/// Ledger query failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Node could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// Node answered with an error.
    #[error("ledger error: {0}")]
    Server(String),

    /// Node answered with something that does not parse.
    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// PoW collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PowError(pub String);

/// Signer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SignError(pub String);

/// Submission failure reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Previous hash or height no longer matches the chain head.
    #[error("chain state conflict: {0}")]
    ChainConflict(String),

    /// Block refused for any other reason.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Network could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Port: read account state from the ledger
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Head of the account chain, `None` for an account without blocks.
    async fn latest_account_block(&self, address: &Address) -> Result<Option<ChainHead>, QueryError>;

    /// Balance of `token_id`; zero when the account never held it.
    async fn account_balance(&self, address: &Address, token_id: &TokenId) -> Result<Amount, QueryError>;

    /// Quota the linked block will consume.
    async fn required_quota(&self, request: &QuotaRequest) -> Result<QuotaRequirement, QueryError>;

    /// Quota the account holds right now.
    async fn current_quota(&self, address: &Address) -> Result<AccountQuota, QueryError>;
}

/// Port: sign block hashes with the account key
#[async_trait]
pub trait BlockSigner: Send + Sync {
    /// Account the key controls.
    fn address(&self) -> Address;

    /// Verifying key published with the block.
    fn public_key(&self) -> PublicKey;

    /// Signature over a block hash.
    async fn sign(&self, hash: &Hash) -> Result<Signature, SignError>;
}

/// Port: nonce search for blocks sent without enough quota
#[async_trait]
pub trait PowSolver: Send + Sync {
    /// Nonce satisfying `difficulty` for `challenge`.
    async fn solve(&self, difficulty: U256, challenge: &Hash) -> Result<Nonce, PowError>;
}

/// Port: hand signed blocks to the network
#[async_trait]
pub trait BlockTransport: Send + Sync {
    /// Submit a block; returns the hash the network accepted.
    async fn submit(&self, block: &SignedBlock) -> Result<Hash, TransportError>;
}
