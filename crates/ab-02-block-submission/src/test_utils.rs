//! In-memory doubles of the outbound ports.
//!
//! Requires feature: `test-utils` (always on for unit tests).

use crate::adapters::Ed25519Signer;
use crate::domain::{AccountQuota, ChainHead, QuotaRequest, QuotaRequirement};
use crate::ports::{
    BlockSigner, BlockTransport, LedgerQuery, PowError, PowSolver, QueryError, SignError,
    TransportError,
};
use ab_01_block_hashing::verify_block_hash;
use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;
use shared_crypto::{Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    Address, Amount, Hash, Nonce, PublicKey, Signature, SignedBlock, TokenId,
};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Default)]
struct LedgerState {
    heads: HashMap<Address, ChainHead>,
    balances: HashMap<(Address, TokenId), Amount>,
    quotas: HashMap<Address, u64>,
    required_quota: u64,
    difficulty: Option<U256>,
    accepted: Vec<SignedBlock>,
    scripted_failures: VecDeque<TransportError>,
    failing_destinations: HashMap<Address, TransportError>,
    hash_override: Option<Hash>,
    latency: Option<Duration>,
    submissions: u32,
    head_reads: u32,
    balance_reads: u32,
}

/// Ledger and transport backed by in-process account chains.
///
/// Submitted blocks are checked the way a node would check them: linkage
/// against the current head, hash over the fields, signature over the hash.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Empty ledger: no chains, no balances, zero quota required.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain head of `address`.
    pub fn set_head(&self, address: Address, head: ChainHead) {
        self.state.lock().heads.insert(address, head);
    }

    /// Current chain head of `address`.
    pub fn head(&self, address: &Address) -> Option<ChainHead> {
        self.state.lock().heads.get(address).copied()
    }

    /// Set a balance.
    pub fn set_balance(&self, address: Address, token_id: TokenId, amount: Amount) {
        self.state.lock().balances.insert((address, token_id), amount);
    }

    /// Balance of `token_id` held by `address`.
    pub fn balance(&self, address: &Address, token_id: &TokenId) -> Amount {
        self.state
            .lock()
            .balances
            .get(&(*address, *token_id))
            .copied()
            .unwrap_or_default()
    }

    /// Set the current quota of `address`.
    pub fn set_quota(&self, address: Address, quota: u64) {
        self.state.lock().quotas.insert(address, quota);
    }

    /// Quota every block requires, and the PoW difficulty offered.
    pub fn set_requirement(&self, required_quota: u64, difficulty: Option<U256>) {
        let mut state = self.state.lock();
        state.required_quota = required_quota;
        state.difficulty = difficulty;
    }

    /// Refuse the next submission with `error`.
    pub fn fail_next_submission(&self, error: TransportError) {
        self.state.lock().scripted_failures.push_back(error);
    }

    /// Refuse every send to `destination` with `error`.
    pub fn fail_submissions_to(&self, destination: Address, error: TransportError) {
        self.state
            .lock()
            .failing_destinations
            .insert(destination, error);
    }

    /// Accept blocks but answer with `hash` instead of their own.
    pub fn answer_with_hash(&self, hash: Hash) {
        self.state.lock().hash_override = Some(hash);
    }

    /// Delay every query and submission.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    /// Blocks accepted so far, in order.
    pub fn accepted_blocks(&self) -> Vec<SignedBlock> {
        self.state.lock().accepted.clone()
    }

    /// Submissions received, accepted or not.
    pub fn submissions(&self) -> u32 {
        self.state.lock().submissions
    }

    /// Chain head lookups served.
    pub fn head_reads(&self) -> u32 {
        self.state.lock().head_reads
    }

    /// Balance lookups served.
    pub fn balance_reads(&self) -> u32 {
        self.state.lock().balance_reads
    }

    async fn delay(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn accept(&self, block: &SignedBlock) -> Result<Hash, TransportError> {
        let mut state = self.state.lock();
        state.submissions += 1;

        if let Some(error) = state.scripted_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = block
            .block
            .to_address()
            .and_then(|to| state.failing_destinations.get(&to))
        {
            return Err(error.clone());
        }

        let account = block.block.address;
        let expected = match state.heads.get(&account) {
            Some(head) => (head.height + 1, Some(head.hash)),
            None => (1, None),
        };
        if (block.block.height, block.block.previous_hash) != expected {
            return Err(TransportError::ChainConflict(format!(
                "expected height {} after {:?}, got {}",
                expected.0, expected.1, block.block.height
            )));
        }

        if !verify_block_hash(&block.block, &block.hash).unwrap_or(false) {
            return Err(TransportError::Rejected("hash does not match fields".into()));
        }
        let signature_ok = Ed25519PublicKey::from_bytes(block.public_key)
            .and_then(|key| key.verify(&block.hash, &Ed25519Signature::from_bytes(block.signature)))
            .is_ok();
        if !signature_ok || Address::from_public_key(&block.public_key) != account {
            return Err(TransportError::Rejected("invalid signature".into()));
        }

        if let Some(request) = block.block.request() {
            let key = (account, request.token_id);
            let balance = state.balances.get(&key).copied().unwrap_or_default();
            if request.amount > balance {
                return Err(TransportError::Rejected("balance not enough".into()));
            }
            let remaining = Amount::new(balance.as_u256() - request.amount.as_u256());
            state.balances.insert(key, remaining);
        }

        state.heads.insert(
            account,
            ChainHead {
                height: block.block.height,
                hash: block.hash,
            },
        );
        state.accepted.push(block.clone());
        Ok(state.hash_override.unwrap_or(block.hash))
    }
}

#[async_trait]
impl LedgerQuery for InMemoryLedger {
    async fn latest_account_block(&self, address: &Address) -> Result<Option<ChainHead>, QueryError> {
        self.delay().await;
        let mut state = self.state.lock();
        state.head_reads += 1;
        Ok(state.heads.get(address).copied())
    }

    async fn account_balance(&self, address: &Address, token_id: &TokenId) -> Result<Amount, QueryError> {
        self.delay().await;
        let mut state = self.state.lock();
        state.balance_reads += 1;
        Ok(state
            .balances
            .get(&(*address, *token_id))
            .copied()
            .unwrap_or_default())
    }

    async fn required_quota(&self, _request: &QuotaRequest) -> Result<QuotaRequirement, QueryError> {
        self.delay().await;
        let state = self.state.lock();
        Ok(QuotaRequirement {
            required_quota: state.required_quota,
            difficulty: state.difficulty,
            is_congestion: false,
        })
    }

    async fn current_quota(&self, address: &Address) -> Result<AccountQuota, QueryError> {
        self.delay().await;
        let state = self.state.lock();
        let current_quota = state.quotas.get(address).copied().unwrap_or_default();
        Ok(AccountQuota {
            current_quota,
            max_quota: current_quota,
            stake_amount: Amount::ZERO,
        })
    }
}

#[async_trait]
impl BlockTransport for InMemoryLedger {
    async fn submit(&self, block: &SignedBlock) -> Result<Hash, TransportError> {
        self.delay().await;
        self.accept(block)
    }
}

/// PoW solver answering a fixed nonce.
#[derive(Default)]
pub struct FixedPowSolver {
    nonce: u64,
    latency: Option<Duration>,
    calls: Mutex<Vec<(U256, Hash)>>,
}

impl FixedPowSolver {
    /// Solver answering `nonce` for every challenge.
    pub fn new(nonce: u64) -> Self {
        Self {
            nonce,
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Take `latency` to answer every challenge.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of solve requests.
    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Challenge of the last solve request.
    pub fn last_challenge(&self) -> Option<Hash> {
        self.calls.lock().last().map(|(_, challenge)| *challenge)
    }
}

#[async_trait]
impl PowSolver for FixedPowSolver {
    async fn solve(&self, difficulty: U256, challenge: &Hash) -> Result<Nonce, PowError> {
        if difficulty.is_zero() {
            return Err(PowError("zero difficulty".into()));
        }
        self.calls.lock().push((difficulty, *challenge));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(Nonce::from_u64(self.nonce))
    }
}

/// Ed25519 signer with a deterministic key.
pub struct StaticSigner {
    inner: Ed25519Signer,
    failing: bool,
}

impl StaticSigner {
    /// Signer whose key seed is `seed` repeated.
    pub fn new(seed: u8) -> Self {
        Self {
            inner: Ed25519Signer::from_seed([seed; 32]),
            failing: false,
        }
    }

    /// Signer that refuses to sign.
    pub fn failing(seed: u8) -> Self {
        Self {
            failing: true,
            ..Self::new(seed)
        }
    }
}

#[async_trait]
impl BlockSigner for StaticSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn public_key(&self) -> PublicKey {
        self.inner.public_key()
    }

    async fn sign(&self, hash: &Hash) -> Result<Signature, SignError> {
        if self.failing {
            return Err(SignError("key locked".into()));
        }
        self.inner.sign(hash).await
    }
}
