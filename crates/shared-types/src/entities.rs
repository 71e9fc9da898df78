//! # Account Block Entities
//!
//! Every account owns its own chain of blocks. A block either *requests*
//! something from a counterpart (a send) or *responds* to a request someone
//! else addressed to this account (a receive). The two categories carry
//! disjoint counterpart fields, so they are modelled as a tagged body instead
//! of one record with optional fields.

use crate::address::{Address, TokenId};
use crate::errors::ValidationError;
use crate::primitives::{Amount, Hash, Nonce, PublicKey, Signature, U256};

/// Block type as encoded on the wire and in the block hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Deploys a contract.
    CreateContractRequest = 1,
    /// Plain transfer or contract call.
    TransferRequest = 2,
    /// Token re-issuance.
    ReIssueRequest = 3,
    /// Receive of a request.
    Response = 4,
    /// Failed contract receive.
    ResponseFail = 5,
    /// Refund sent by a contract.
    RefundByContractRequest = 6,
    /// Receive in the genesis snapshot.
    GenesisResponse = 7,
}

impl BlockType {
    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub fn from_u8(value: u8) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(Self::CreateContractRequest),
            2 => Ok(Self::TransferRequest),
            3 => Ok(Self::ReIssueRequest),
            4 => Ok(Self::Response),
            5 => Ok(Self::ResponseFail),
            6 => Ok(Self::RefundByContractRequest),
            7 => Ok(Self::GenesisResponse),
            other => Err(ValidationError::InvalidBlockType(other)),
        }
    }

    /// Request kinds carry to-address, amount and token id.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::CreateContractRequest
                | Self::TransferRequest
                | Self::ReIssueRequest
                | Self::RefundByContractRequest
        )
    }

    /// Response kinds carry the answered send-block hash.
    pub fn is_response(self) -> bool {
        !self.is_request()
    }
}

/// Request-category block types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// See [`BlockType::CreateContractRequest`].
    CreateContract,
    /// See [`BlockType::TransferRequest`].
    Transfer,
    /// See [`BlockType::ReIssueRequest`].
    ReIssue,
    /// See [`BlockType::RefundByContractRequest`].
    RefundByContract,
}

impl RequestKind {
    /// Wire block type.
    pub fn block_type(self) -> BlockType {
        match self {
            Self::CreateContract => BlockType::CreateContractRequest,
            Self::Transfer => BlockType::TransferRequest,
            Self::ReIssue => BlockType::ReIssueRequest,
            Self::RefundByContract => BlockType::RefundByContractRequest,
        }
    }
}

/// Response-category block types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// See [`BlockType::Response`].
    Response,
    /// See [`BlockType::ResponseFail`].
    ResponseFail,
    /// See [`BlockType::GenesisResponse`].
    Genesis,
}

impl ResponseKind {
    /// Wire block type.
    pub fn block_type(self) -> BlockType {
        match self {
            Self::Response => BlockType::Response,
            Self::ResponseFail => BlockType::ResponseFail,
            Self::Genesis => BlockType::GenesisResponse,
        }
    }
}

/// Counterpart fields of a request block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBody {
    /// Request type.
    pub kind: RequestKind,
    /// Receiving account.
    pub to_address: Address,
    /// Token being moved.
    pub token_id: TokenId,
    /// Raw amount.
    pub amount: Amount,
}

/// Counterpart fields of a response block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseBody {
    /// Response type.
    pub kind: ResponseKind,
    /// Sender of the answered request, informational only.
    pub from_address: Option<Address>,
    /// Hash of the answered send block; zero sentinel when absent.
    pub send_block_hash: Option<Hash>,
}

/// Category-specific part of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockBody {
    /// Send-side block.
    Request(RequestBody),
    /// Receive-side block.
    Response(ResponseBody),
}

impl BlockBody {
    /// Wire block type.
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockBody::Request(body) => body.kind.block_type(),
            BlockBody::Response(body) => body.kind.block_type(),
        }
    }
}

/// One entry of an account's chain.
///
/// `height == 0` and `previous_hash == None` mean the block is still a draft
/// that has not been linked to the account's chain head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBlock {
    /// Owning account.
    pub address: Address,
    /// Position in the account chain, starting at 1.
    pub height: u64,
    /// Hash of the previous block of the same account.
    pub previous_hash: Option<Hash>,
    /// Request or response fields.
    pub body: BlockBody,
    /// Raw fee.
    pub fee: Option<Amount>,
    /// Opaque payload; only its hash is part of the block hash.
    pub data: Option<Vec<u8>>,
    /// PoW difficulty the nonce was computed for.
    pub difficulty: Option<U256>,
    /// PoW nonce.
    pub nonce: Option<Nonce>,
    /// Hash of the VM log, contract blocks only.
    pub vmlog_hash: Option<Hash>,
    /// Sends triggered by this block, in order.
    pub triggered_send_blocks: Vec<HashedBlock>,
}

impl AccountBlock {
    /// Draft with the given body and no linkage.
    pub fn draft(address: Address, body: BlockBody) -> Self {
        Self {
            address,
            height: 0,
            previous_hash: None,
            body,
            fee: None,
            data: None,
            difficulty: None,
            nonce: None,
            vmlog_hash: None,
            triggered_send_blocks: Vec::new(),
        }
    }

    /// Transfer draft.
    pub fn transfer(address: Address, to_address: Address, token_id: TokenId, amount: Amount) -> Self {
        Self::draft(
            address,
            BlockBody::Request(RequestBody {
                kind: RequestKind::Transfer,
                to_address,
                token_id,
                amount,
            }),
        )
    }

    /// Receive draft answering `send_block_hash`.
    pub fn receive(address: Address, send_block_hash: Hash) -> Self {
        Self::draft(
            address,
            BlockBody::Response(ResponseBody {
                kind: ResponseKind::Response,
                from_address: None,
                send_block_hash: Some(send_block_hash),
            }),
        )
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a fee.
    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Wire block type.
    pub fn block_type(&self) -> BlockType {
        self.body.block_type()
    }

    /// Request fields, if this is a request block.
    pub fn request(&self) -> Option<&RequestBody> {
        match &self.body {
            BlockBody::Request(body) => Some(body),
            BlockBody::Response(_) => None,
        }
    }

    /// Destination of a request block.
    pub fn to_address(&self) -> Option<Address> {
        self.request().map(|body| body.to_address)
    }

    /// True once height and previous hash are set.
    pub fn is_linked(&self) -> bool {
        self.height > 0
    }
}

/// A block together with its computed hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashedBlock {
    /// Block fields.
    pub block: AccountBlock,
    /// Hash over `block`.
    pub hash: Hash,
}

/// A hashed block signed by its account's key, ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBlock {
    /// Block fields.
    pub block: AccountBlock,
    /// Hash over `block`.
    pub hash: Hash,
    /// Signer's verifying key.
    pub public_key: PublicKey,
    /// Signature over `hash`.
    pub signature: Signature,
}
