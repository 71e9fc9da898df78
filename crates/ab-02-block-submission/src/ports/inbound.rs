//! Inbound ports (driving side - API)

use crate::domain::SubmissionReceipt;
use crate::error::Result;
use crate::ports::outbound::BlockSigner;
use crate::retry::RetryOutcome;
use async_trait::async_trait;
use shared_types::{AccountBlock, Address, Amount, Hash, TokenId};

/// Primary port: build, hash, sign and submit account blocks
#[async_trait]
pub trait BlockSubmissionApi: Send + Sync {
    /// Run one pass of the pipeline for `draft`.
    ///
    /// The draft is re-linked against the current chain head; any height or
    /// previous hash it carries is overwritten.
    async fn build_and_submit(
        &self,
        draft: AccountBlock,
        signer: &dyn BlockSigner,
    ) -> Result<SubmissionReceipt>;

    /// [`Self::build_and_submit`] under the configured retry policy.
    async fn submit_with_retry(
        &self,
        draft: AccountBlock,
        signer: &dyn BlockSigner,
    ) -> RetryOutcome<SubmissionReceipt>;

    /// Transfer `amount` of `token_id` from the signer's account.
    async fn transfer(
        &self,
        signer: &dyn BlockSigner,
        to_address: Address,
        token_id: TokenId,
        amount: Amount,
    ) -> Result<SubmissionReceipt> {
        let draft = AccountBlock::transfer(signer.address(), to_address, token_id, amount);
        self.build_and_submit(draft, signer).await
    }

    /// Receive the send block `send_block_hash` into the signer's account.
    async fn receive(
        &self,
        signer: &dyn BlockSigner,
        send_block_hash: Hash,
    ) -> Result<SubmissionReceipt> {
        let draft = AccountBlock::receive(signer.address(), send_block_hash);
        self.build_and_submit(draft, signer).await
    }
}
