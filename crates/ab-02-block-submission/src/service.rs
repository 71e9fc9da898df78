//! Submission Pipeline
//!
//! Drives a draft through link → quota check → optional PoW → sign → submit.
//! Each transition is logged; every failure carries the account, the height
//! and the stage it reached.

use crate::{
    config::SubmissionConfig,
    domain::{
        check_balance, next_linkage, Linkage, PowDecision, QuotaPolicy, QuotaRequest,
        SubmissionReceipt, SubmissionStage,
    },
    error::{Result, SubmissionError, SubmissionErrorKind},
    ports::{BlockSigner, BlockSubmissionApi, BlockTransport, LedgerQuery, PowSolver},
    retry::{retry, RetryOutcome},
};
use ab_01_block_hashing::{hash_block, pow_challenge};
use async_trait::async_trait;
use shared_types::{hash_to_hex, AccountBlock, Address, SignedBlock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Await `operation` for at most `limit`.
async fn with_timeout<T, E>(
    limit: Duration,
    operation: &'static str,
    future: impl Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<T, SubmissionErrorKind>
where
    E: Into<SubmissionErrorKind>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(SubmissionErrorKind::Timeout { operation }),
    }
}

/// Reads the chain head and derives the linkage of the next block.
///
/// Nothing is cached between calls: every link reads the head again.
#[derive(Clone)]
pub struct ChainLinker {
    ledger: Arc<dyn LedgerQuery>,
    timeout: Duration,
}

impl ChainLinker {
    /// Linker reading heads through `ledger`.
    pub fn new(ledger: Arc<dyn LedgerQuery>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    /// Linkage of the next block of `address`.
    pub async fn link(&self, address: &Address) -> Result<Linkage> {
        self.next(address)
            .await
            .map_err(|kind| SubmissionError::failed(*address, None, SubmissionStage::Drafted, kind))
    }

    async fn next(&self, address: &Address) -> std::result::Result<Linkage, SubmissionErrorKind> {
        let head = with_timeout(
            self.timeout,
            "latest_account_block",
            self.ledger.latest_account_block(address),
        )
        .await?;
        next_linkage(head.as_ref()).map_err(Into::into)
    }
}

/// Where a single pass of the pipeline got to.
struct Progress {
    account: Address,
    height: Option<u64>,
    stage: SubmissionStage,
}

impl Progress {
    fn new(account: Address) -> Self {
        Self {
            account,
            height: None,
            stage: SubmissionStage::Drafted,
        }
    }

    fn advance(&mut self, stage: SubmissionStage) {
        debug!(
            "[ab-02] {} height {:?}: {} -> {}",
            self.account, self.height, self.stage, stage
        );
        self.stage = stage;
    }

    fn fail(&self, kind: SubmissionErrorKind) -> SubmissionError {
        SubmissionError::failed(self.account, self.height, self.stage, kind)
    }
}

/// Submission pipeline over the ledger, PoW and transport ports.
pub struct SubmissionService {
    ledger: Arc<dyn LedgerQuery>,
    pow: Arc<dyn PowSolver>,
    transport: Arc<dyn BlockTransport>,
    linker: ChainLinker,
    config: SubmissionConfig,
}

impl SubmissionService {
    /// Create a service; fails on an invalid configuration.
    pub fn new(
        ledger: Arc<dyn LedgerQuery>,
        pow: Arc<dyn PowSolver>,
        transport: Arc<dyn BlockTransport>,
        config: SubmissionConfig,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "[ab-02] Submission service ready (timeout {:?}, pow timeout {:?}, {} attempts, retry delay {:?})",
            config.request_timeout(),
            config.pow_timeout(),
            config.retry.max_attempts,
            config.retry.delay()
        );
        Ok(Self {
            linker: ChainLinker::new(Arc::clone(&ledger), config.request_timeout()),
            ledger,
            pow,
            transport,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Chain linker sharing this service's ledger.
    pub fn linker(&self) -> &ChainLinker {
        &self.linker
    }

    async fn run(
        &self,
        mut block: AccountBlock,
        signer: &dyn BlockSigner,
        progress: &mut Progress,
    ) -> std::result::Result<SubmissionReceipt, SubmissionErrorKind> {
        let timeout = self.config.request_timeout();
        let account = block.address;

        let signer_address = signer.address();
        if signer_address != account {
            return Err(SubmissionErrorKind::SignerMismatch {
                signer: signer_address,
            });
        }

        if self.config.check_balance {
            if let Some(request) = block.request() {
                let balance = with_timeout(
                    timeout,
                    "account_balance",
                    self.ledger.account_balance(&account, &request.token_id),
                )
                .await?;
                check_balance(request, balance)?;
            }
        }

        let linkage = self.linker.next(&account).await?;
        linkage.apply(&mut block);
        progress.height = Some(linkage.height);
        progress.advance(SubmissionStage::Linked);

        let quota_request = QuotaRequest::for_block(&block);
        let (quota, requirement) = tokio::try_join!(
            with_timeout(timeout, "current_quota", self.ledger.current_quota(&account)),
            with_timeout(timeout, "required_quota", self.ledger.required_quota(&quota_request)),
        )?;
        progress.advance(SubmissionStage::QuotaChecked);

        let decision = QuotaPolicy::decide(quota.current_quota, &requirement)?;
        match decision {
            PowDecision::Required { difficulty } => {
                info!(
                    "[ab-02] {} height {}: quota {} < {}, running PoW (difficulty {})",
                    account, linkage.height, quota.current_quota, requirement.required_quota, difficulty
                );
                let challenge = pow_challenge(&account, block.previous_hash.as_ref());
                let nonce = with_timeout(
                    self.config.pow_timeout(),
                    "pow",
                    self.pow.solve(difficulty, &challenge),
                )
                .await?;
                block.difficulty = Some(difficulty);
                block.nonce = Some(nonce);
                progress.advance(SubmissionStage::PoWed);
            }
            PowDecision::NotRequired => {
                block.difficulty = None;
                block.nonce = None;
                progress.advance(SubmissionStage::SkippedPoW);
            }
        }

        let hashed = hash_block(block)?;
        let signature = match tokio::time::timeout(timeout, signer.sign(&hashed.hash)).await {
            Ok(result) => result?,
            Err(_) => return Err(SubmissionErrorKind::Signing("signer timed out".to_string())),
        };
        let signed = SignedBlock {
            block: hashed.block,
            hash: hashed.hash,
            public_key: signer.public_key(),
            signature,
        };
        progress.advance(SubmissionStage::Signed);

        progress.advance(SubmissionStage::Submitted);
        let accepted = with_timeout(timeout, "submit", self.transport.submit(&signed)).await?;
        if accepted != signed.hash {
            return Err(SubmissionErrorKind::HashMismatch {
                local: hash_to_hex(&signed.hash),
                remote: hash_to_hex(&accepted),
            });
        }
        progress.advance(SubmissionStage::Confirmed);

        info!(
            "[ab-02] {} height {}: accepted {}",
            account,
            linkage.height,
            hash_to_hex(&signed.hash)
        );
        Ok(SubmissionReceipt {
            hash: signed.hash,
            height: linkage.height,
            previous_hash: linkage.previous_hash,
            pow_performed: decision.is_required(),
        })
    }
}

#[async_trait]
impl BlockSubmissionApi for SubmissionService {
    async fn build_and_submit(
        &self,
        draft: AccountBlock,
        signer: &dyn BlockSigner,
    ) -> Result<SubmissionReceipt> {
        let mut progress = Progress::new(draft.address);
        let result = self.run(draft, signer, &mut progress).await;
        result.map_err(|kind| {
            let err = progress.fail(kind);
            warn!(
                "[ab-02] Submission failed ({}): {}",
                err.kind().map_or("config", SubmissionErrorKind::category),
                err
            );
            err
        })
    }

    async fn submit_with_retry(
        &self,
        draft: AccountBlock,
        signer: &dyn BlockSigner,
    ) -> RetryOutcome<SubmissionReceipt> {
        retry(&self.config.retry, |attempt| {
            let draft = draft.clone();
            async move {
                debug!("[ab-02] {} attempt {}", draft.address, attempt);
                self.build_and_submit(draft, signer).await
            }
        })
        .await
    }
}
