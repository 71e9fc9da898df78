//! JSON-RPC adapter
//!
//! Implements [`LedgerQuery`], [`PowSolver`] and [`BlockTransport`] on top of
//! a raw JSON-RPC client. The HTTP or WebSocket transport behind
//! [`JsonRpcClient`] is supplied by the caller.
//!
//! Node quantities travel as decimal strings and are parsed into integers;
//! floats are never involved.

use crate::domain::{AccountQuota, ChainHead, QuotaRequest, QuotaRequirement};
use crate::ports::{
    BlockTransport, LedgerQuery, PowError, PowSolver, QueryError, TransportError,
};
use async_trait::async_trait;
use primitive_types::U256;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DisplayFromStr};
use shared_types::{
    encode_base64, hash_from_hex, hash_to_hex, AccountBlock, Address, Amount, BlockBody, Hash,
    Nonce, SignedBlock, TokenId, ZERO_HASH,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Latest block of an account.
pub const METHOD_LATEST_BLOCK: &str = "ledger_getLatestAccountBlock";
/// Account balances.
pub const METHOD_ACCOUNT_INFO: &str = "ledger_getAccountInfoByAddress";
/// Quota and PoW difficulty a block needs.
pub const METHOD_POW_DIFFICULTY: &str = "ledger_getPoWDifficulty";
/// Quota an account holds.
pub const METHOD_QUOTA: &str = "contract_getQuotaByAccount";
/// Nonce search delegated to the node.
pub const METHOD_POW_NONCE: &str = "util_getPoWNonce";
/// Block submission.
pub const METHOD_SEND_RAW: &str = "ledger_sendRawTransaction";

/// Raw JSON-RPC failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Request never got an answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Server {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },
}

/// Raw JSON-RPC request/response.
#[async_trait]
pub trait JsonRpcClient: Send + Sync {
    /// Call `method` with positional or named `params`; returns `result`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockDto {
    #[serde_as(as = "DisplayFromStr")]
    height: u64,
    hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfoDto {
    #[serde(default)]
    balance_info_map: Option<HashMap<String, BalanceInfoDto>>,
}

#[derive(Debug, Deserialize)]
struct BalanceInfoDto {
    balance: Amount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PowDifficultyParams {
    address: String,
    previous_hash: String,
    block_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PowDifficultyDto {
    #[serde_as(as = "DisplayFromStr")]
    required_quota: u64,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    is_congestion: bool,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaInfoDto {
    #[serde_as(as = "DisplayFromStr")]
    current_quota: u64,
    #[serde_as(as = "DisplayFromStr")]
    max_quota: u64,
    stake_amount: Amount,
}

/// Hashed fields of a block as the node rebuilds them.
///
/// Triggered send blocks nest the same shape; the node recomputes each child
/// hash from these fields before folding it into the parent hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockFieldsDto {
    block_type: u8,
    height: String,
    hash: String,
    previous_hash: String,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_block_hash: Option<String>,
    fee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vmlog_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    triggered_send_block_list: Option<Vec<BlockFieldsDto>>,
}

impl BlockFieldsDto {
    fn from_block(block: &AccountBlock, hash: &Hash) -> Self {
        let mut dto = Self {
            block_type: block.block_type().as_u8(),
            height: block.height.to_string(),
            hash: hash_to_hex(hash),
            previous_hash: hash_to_hex(block.previous_hash.as_ref().unwrap_or(&ZERO_HASH)),
            address: block.address.to_string(),
            to_address: None,
            token_id: None,
            amount: None,
            from_address: None,
            send_block_hash: None,
            fee: block.fee.unwrap_or_default().to_string(),
            data: block.data.as_deref().map(encode_base64),
            difficulty: block.difficulty.map(|d| d.to_string()),
            nonce: block.nonce.as_ref().map(Nonce::to_base64),
            vmlog_hash: block.vmlog_hash.as_ref().map(hash_to_hex),
            triggered_send_block_list: None,
        };
        match &block.body {
            BlockBody::Request(request) => {
                dto.to_address = Some(request.to_address.to_string());
                dto.token_id = Some(request.token_id.to_string());
                dto.amount = Some(request.amount.to_string());
            }
            BlockBody::Response(response) => {
                dto.from_address = response.from_address.map(|a| a.to_string());
                dto.send_block_hash =
                    Some(hash_to_hex(response.send_block_hash.as_ref().unwrap_or(&ZERO_HASH)));
            }
        }
        if !block.triggered_send_blocks.is_empty() {
            dto.triggered_send_block_list = Some(
                block
                    .triggered_send_blocks
                    .iter()
                    .map(|child| Self::from_block(&child.block, &child.hash))
                    .collect(),
            );
        }
        dto
    }
}

/// Block as `ledger_sendRawTransaction` expects it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawBlockDto {
    #[serde(flatten)]
    fields: BlockFieldsDto,
    public_key: String,
    signature: String,
}

impl RawBlockDto {
    fn from_signed(signed: &SignedBlock) -> Self {
        Self {
            fields: BlockFieldsDto::from_block(&signed.block, &signed.hash),
            public_key: encode_base64(&signed.public_key),
            signature: encode_base64(&signed.signature),
        }
    }
}

/// Split node rejections into chain-state conflicts and everything else.
///
/// The node reports a stale previous hash or height with messages about the
/// previous block, a fork or the block height; re-linking fixes those.
pub fn classify_rejection(message: &str) -> TransportError {
    const CONFLICT_MARKERS: [&str; 5] = ["prevhash", "prev block", "prevblock", "fork", "height"];
    let lower = message.to_lowercase();
    if CONFLICT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        TransportError::ChainConflict(message.to_string())
    } else {
        TransportError::Rejected(message.to_string())
    }
}

fn query_error(err: RpcError) -> QueryError {
    match err {
        RpcError::Transport(reason) => QueryError::Unavailable(reason),
        RpcError::Server { message, .. } => QueryError::Server(message),
    }
}

/// Ledger, PoW and transport ports over JSON-RPC.
pub struct RpcLedgerClient<C> {
    client: C,
}

impl<C: JsonRpcClient> RpcLedgerClient<C> {
    /// Adapter over `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Underlying JSON-RPC client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, QueryError> {
        debug!("[ab-02] rpc {}", method);
        let value = self.client.request(method, params).await.map_err(query_error)?;
        serde_json::from_value(value).map_err(|e| QueryError::Malformed(format!("{method}: {e}")))
    }
}

#[async_trait]
impl<C: JsonRpcClient> LedgerQuery for RpcLedgerClient<C> {
    async fn latest_account_block(&self, address: &Address) -> Result<Option<ChainHead>, QueryError> {
        let latest: Option<LatestBlockDto> =
            self.call(METHOD_LATEST_BLOCK, json!([address.to_string()])).await?;
        latest
            .map(|block| {
                hash_from_hex(&block.hash)
                    .map(|hash| ChainHead {
                        height: block.height,
                        hash,
                    })
                    .map_err(|e| QueryError::Malformed(e.to_string()))
            })
            .transpose()
    }

    async fn account_balance(&self, address: &Address, token_id: &TokenId) -> Result<Amount, QueryError> {
        let info: Option<AccountInfoDto> =
            self.call(METHOD_ACCOUNT_INFO, json!([address.to_string()])).await?;
        Ok(info
            .and_then(|info| info.balance_info_map)
            .and_then(|mut balances| balances.remove(&token_id.to_string()))
            .map(|entry| entry.balance)
            .unwrap_or_default())
    }

    async fn required_quota(&self, request: &QuotaRequest) -> Result<QuotaRequirement, QueryError> {
        let params = PowDifficultyParams {
            address: request.address.to_string(),
            previous_hash: hash_to_hex(request.previous_hash.as_ref().unwrap_or(&ZERO_HASH)),
            block_type: request.block_type.as_u8(),
            to_address: request.to_address.map(|a| a.to_string()),
            data: request.data.as_deref().map(encode_base64),
        };
        let dto: PowDifficultyDto = self.call(METHOD_POW_DIFFICULTY, json!([params])).await?;
        let difficulty = if dto.difficulty.is_empty() {
            None
        } else {
            let parsed = U256::from_dec_str(&dto.difficulty)
                .map_err(|_| QueryError::Malformed(format!("difficulty {:?}", dto.difficulty)))?;
            Some(parsed)
        };
        Ok(QuotaRequirement {
            required_quota: dto.required_quota,
            difficulty,
            is_congestion: dto.is_congestion,
        })
    }

    async fn current_quota(&self, address: &Address) -> Result<AccountQuota, QueryError> {
        let dto: QuotaInfoDto = self.call(METHOD_QUOTA, json!([address.to_string()])).await?;
        Ok(AccountQuota {
            current_quota: dto.current_quota,
            max_quota: dto.max_quota,
            stake_amount: dto.stake_amount,
        })
    }
}

#[async_trait]
impl<C: JsonRpcClient> PowSolver for RpcLedgerClient<C> {
    async fn solve(&self, difficulty: U256, challenge: &Hash) -> Result<Nonce, PowError> {
        let params = json!([difficulty.to_string(), hash_to_hex(challenge)]);
        let value = self
            .client
            .request(METHOD_POW_NONCE, params)
            .await
            .map_err(|e| PowError(e.to_string()))?;
        let encoded = value
            .as_str()
            .ok_or_else(|| PowError(format!("nonce is not a string: {value}")))?;
        Nonce::from_base64(encoded).map_err(|e| PowError(e.to_string()))
    }
}

#[async_trait]
impl<C: JsonRpcClient> BlockTransport for RpcLedgerClient<C> {
    async fn submit(&self, block: &SignedBlock) -> Result<Hash, TransportError> {
        let params = json!([RawBlockDto::from_signed(block)]);
        let value = self
            .client
            .request(METHOD_SEND_RAW, params)
            .await
            .map_err(|err| match err {
                RpcError::Transport(reason) => TransportError::Unavailable(reason),
                RpcError::Server { message, .. } => classify_rejection(&message),
            })?;

        // The node answers null on success; some gateways echo the hash or block.
        let echoed = match &value {
            Value::Null => return Ok(block.hash),
            Value::String(hash) => hash.as_str(),
            Value::Object(fields) => match fields.get("hash").and_then(Value::as_str) {
                Some(hash) => hash,
                None => return Ok(block.hash),
            },
            other => {
                return Err(TransportError::Rejected(format!("unexpected answer: {other}")));
            }
        };
        hash_from_hex(echoed).map_err(|e| TransportError::Rejected(e.to_string()))
    }
}
