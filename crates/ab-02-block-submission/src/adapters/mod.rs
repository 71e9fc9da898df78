//! Adapters layer
//!
//! - `rpc`: ledger, PoW and transport ports over JSON-RPC
//! - `signer`: Ed25519 block signer

pub mod rpc;
pub mod signer;

pub use rpc::{classify_rejection, JsonRpcClient, RpcError, RpcLedgerClient};
pub use signer::Ed25519Signer;
