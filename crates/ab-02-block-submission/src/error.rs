//! Error types for the submission subsystem
//!
//! Every pipeline failure names the account, the height the block was being
//! built for and the stage it had reached, so a chain-state conflict is never
//! confused with a permanent validation error.

use crate::domain::SubmissionStage;
use crate::ports::{PowError, QueryError, SignError, TransportError};
use shared_types::{Address, Amount, EncodingError, TokenId, ValidationError};
use thiserror::Error;

/// Result type alias for submission operations
pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Network rejection of a submitted block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Stale previous hash or height; re-linking against the fresh head fixes it.
    #[error("chain state conflict: {0}")]
    ChainConflict(String),

    /// Anything else the network refused (balance, token, signature, ...).
    #[error("rejected: {0}")]
    Other(String),
}

/// Cause of a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionErrorKind {
    /// A field does not fit its encoding
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Malformed draft
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Draft address is not the signer's account
    #[error("validation error: draft belongs to a different account than signer {signer}")]
    SignerMismatch {
        /// Account the signer controls
        signer: Address,
    },

    /// Known balance does not cover the amount
    #[error("insufficient balance of {token}: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Token being sent
        token: TokenId,
        /// Amount of the draft
        requested: Amount,
        /// Balance reported by the ledger
        available: Amount,
    },

    /// Ledger query failed
    #[error("query error: {0}")]
    Query(String),

    /// Collaborator did not answer within the configured timeout
    #[error("timeout: {operation} did not complete in time")]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
    },

    /// PoW collaborator failed
    #[error("pow error: {0}")]
    Pow(String),

    /// Signer failed; never retried
    #[error("signing error: {0}")]
    Signing(String),

    /// Transport could not reach the network
    #[error("network error: {0}")]
    Network(String),

    /// Network refused the block
    #[error("network {0}")]
    Rejected(Rejection),

    /// Network accepted a different hash than computed locally
    #[error("hash mismatch: local {local}, network {remote}")]
    HashMismatch {
        /// Locally computed hash
        local: String,
        /// Hash returned by the network
        remote: String,
    },
}

impl From<TransportError> for SubmissionErrorKind {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ChainConflict(reason) => {
                Self::Rejected(Rejection::ChainConflict(reason))
            }
            TransportError::Rejected(reason) => Self::Rejected(Rejection::Other(reason)),
            TransportError::Unavailable(reason) => Self::Network(reason),
        }
    }
}

impl From<QueryError> for SubmissionErrorKind {
    fn from(err: QueryError) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<PowError> for SubmissionErrorKind {
    fn from(err: PowError) -> Self {
        Self::Pow(err.0)
    }
}

impl From<SignError> for SubmissionErrorKind {
    fn from(err: SignError) -> Self {
        Self::Signing(err.0)
    }
}

impl SubmissionErrorKind {
    /// True for failures a fresh attempt can fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Query(_)
                | Self::Timeout { .. }
                | Self::Pow(_)
                | Self::Network(_)
                | Self::Rejected(Rejection::ChainConflict(_))
        )
    }

    /// Coarse cause for reporting: query, validation, network or local.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::Validation(_) | Self::SignerMismatch { .. } | Self::InsufficientBalance { .. } => {
                "validation"
            }
            Self::Query(_) | Self::Timeout { .. } | Self::Pow(_) => "query",
            Self::Signing(_) => "signing",
            Self::Network(_) | Self::Rejected(_) | Self::HashMismatch { .. } => "network",
        }
    }
}

/// Errors returned by the submission subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Pipeline failure for one block
    #[error(
        "account {account} at height {}: {stage} failed: {kind}",
        height_label(.height)
    )]
    Failed {
        /// Account the block belongs to
        account: Address,
        /// Height the block was linked at, if linking happened
        height: Option<u64>,
        /// Last stage the block reached
        stage: SubmissionStage,
        /// Cause
        kind: SubmissionErrorKind,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn height_label(height: &Option<u64>) -> String {
    height.map_or_else(|| "unlinked".to_string(), |h| h.to_string())
}

impl SubmissionError {
    /// Pipeline failure.
    pub fn failed(
        account: Address,
        height: Option<u64>,
        stage: SubmissionStage,
        kind: impl Into<SubmissionErrorKind>,
    ) -> Self {
        Self::Failed {
            account,
            height,
            stage,
            kind: kind.into(),
        }
    }

    pub(crate) fn config(reason: &str) -> Self {
        Self::InvalidConfig(reason.to_string())
    }

    /// Cause of a pipeline failure.
    pub fn kind(&self) -> Option<&SubmissionErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(kind),
            Self::InvalidConfig(_) => None,
        }
    }

    /// Account of a pipeline failure.
    pub fn account(&self) -> Option<Address> {
        match self {
            Self::Failed { account, .. } => Some(*account),
            Self::InvalidConfig(_) => None,
        }
    }

    /// Check if a fresh attempt of the whole send may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some_and(SubmissionErrorKind::is_retryable)
    }

    /// Check if the network rejected a stale previous hash or height
    pub fn is_chain_conflict(&self) -> bool {
        matches!(
            self.kind(),
            Some(SubmissionErrorKind::Rejected(Rejection::ChainConflict(_)))
        )
    }
}
