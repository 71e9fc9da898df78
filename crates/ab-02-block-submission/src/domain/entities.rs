//! Domain entities of the submission pipeline

use primitive_types::U256;
use shared_types::{AccountBlock, Address, Amount, BlockType, Hash};
use std::fmt;

/// Lifecycle stage of a block on its way to the network.
///
/// ```text
/// Drafted → Linked → QuotaChecked → PoWed | SkippedPoW → Signed → Submitted → Confirmed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionStage {
    /// Fields set by the caller, not yet linked.
    Drafted,
    /// Height and previous hash taken from the chain head.
    Linked,
    /// Current and required quota known.
    QuotaChecked,
    /// Nonce and difficulty filled in.
    PoWed,
    /// Enough quota, no PoW needed.
    SkippedPoW,
    /// Hash signed.
    Signed,
    /// Handed to the transport.
    Submitted,
    /// Network accepted the block.
    Confirmed,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drafted => "drafted",
            Self::Linked => "linked",
            Self::QuotaChecked => "quota-checked",
            Self::PoWed => "pow",
            Self::SkippedPoW => "skipped-pow",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// Most recent block of an account chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainHead {
    /// Height of the head block.
    pub height: u64,
    /// Hash of the head block.
    pub hash: Hash,
}

/// Position a new block takes in its account chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linkage {
    /// Height of the new block.
    pub height: u64,
    /// Hash of the current head; `None` (zero sentinel) for the first block.
    pub previous_hash: Option<Hash>,
}

/// Input of a required-quota lookup, taken from a linked block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaRequest {
    /// Sending account.
    pub address: Address,
    /// Previous hash the block is linked to.
    pub previous_hash: Option<Hash>,
    /// Wire block type.
    pub block_type: BlockType,
    /// Destination, request blocks only.
    pub to_address: Option<Address>,
    /// Payload, if any.
    pub data: Option<Vec<u8>>,
}

impl QuotaRequest {
    /// Lookup input for `block`.
    pub fn for_block(block: &AccountBlock) -> Self {
        Self {
            address: block.address,
            previous_hash: block.previous_hash,
            block_type: block.block_type(),
            to_address: block.to_address(),
            data: block.data.clone(),
        }
    }
}

/// Quota a block needs, as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaRequirement {
    /// Quota consumed by the block.
    pub required_quota: u64,
    /// PoW target to use when the account lacks quota.
    pub difficulty: Option<U256>,
    /// Network is congested.
    pub is_congestion: bool,
}

/// Quota an account currently holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountQuota {
    /// Quota available right now.
    pub current_quota: u64,
    /// Quota the account regains when fully recovered.
    pub max_quota: u64,
    /// Amount staked for quota.
    pub stake_amount: Amount,
}

/// Whether a block needs proof of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowDecision {
    /// Current quota covers the block.
    NotRequired,
    /// Quota is short; solve for `difficulty`.
    Required {
        /// Target handed to the PoW solver.
        difficulty: U256,
    },
}

impl PowDecision {
    /// True when PoW must run.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }
}

/// Result of an accepted submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Hash the network accepted; equal to the local hash.
    pub hash: Hash,
    /// Height the block was linked at.
    pub height: u64,
    /// Previous hash the block was linked to.
    pub previous_hash: Option<Hash>,
    /// PoW was run for this block.
    pub pow_performed: bool,
}

/// One destination of a batch send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receiver {
    /// Destination account.
    pub address: Address,
    /// Raw amount to send.
    pub amount: Amount,
}

impl Receiver {
    /// Receiver of `amount`.
    pub fn new(address: Address, amount: Amount) -> Self {
        Self { address, amount }
    }
}
