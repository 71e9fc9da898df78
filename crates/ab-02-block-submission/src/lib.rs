//! # Account Block Submission (Subsystem 02)
//!
//! **Bounded Context:** Getting a block onto the account chain
//!
//! ## Purpose
//!
//! Turns a drafted account block into an accepted one:
//! - Links it to the account's current chain head
//! - Compares current against required quota and runs PoW when short
//! - Hashes, signs and submits it, checking the network kept the same hash
//! - Retries transient failures with a bounded loop, re-linking every time
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - RpcLedgerClient: ledger / PoW / transport        │
//! │  - Ed25519Signer: block signatures                  │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: BlockSubmissionApi                      │
//! │  - Outbound: LedgerQuery, BlockSigner, PowSolver,   │
//! │              BlockTransport                         │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - next_linkage, QuotaPolicy, check_balance         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Chain monotonicity**: head `{h, H}` links the next block at `{h + 1, H}`
//! 2. **Quota boundary**: PoW runs only when `current < required`
//! 3. **Hash agreement**: the accepted hash equals the locally computed one
//! 4. **Failure isolation**: one failing receiver never stops a batch
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let rpc = Arc::new(RpcLedgerClient::new(my_json_rpc_client));
//! let service = SubmissionService::new(rpc.clone(), rpc.clone(), rpc, SubmissionConfig::default())?;
//! let signer = Ed25519Signer::from_private_key_hex(&key_hex)?;
//! let receipt = service
//!     .transfer(&signer, destination, TokenId::vite(), Amount::from(1))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Ledger, signer and PoW adapters
pub mod adapters;
pub mod batch;
pub mod config;
/// Domain models and pure rules
pub mod domain;
pub mod error;
pub mod ports;
pub mod retry;
pub mod service;

/// In-memory port doubles
///
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{Ed25519Signer, JsonRpcClient, RpcError, RpcLedgerClient};
pub use batch::{BatchDispatcher, BatchReport, ReceiverOutcome};
pub use config::{RetryPolicy, SubmissionConfig};
pub use domain::{
    format_units, next_linkage, quota_to_ut, AccountQuota, ChainHead, Linkage, PowDecision,
    QuotaPolicy, QuotaRequest, QuotaRequirement, Receiver, SubmissionReceipt, SubmissionStage,
};
pub use error::{Rejection, Result, SubmissionError, SubmissionErrorKind};
pub use ports::{
    BlockSigner, BlockSubmissionApi, BlockTransport, LedgerQuery, PowError, PowSolver,
    QueryError, SignError, TransportError,
};
pub use retry::{retry, RetryOutcome};
pub use service::{ChainLinker, SubmissionService};

/// Subsystem identifier used in log prefixes
pub const SUBSYSTEM_ID: u8 = 2;
