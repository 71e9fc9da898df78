//! Batch dispatch
//!
//! Sends one transfer per receiver from a single account. Receiver `i` starts
//! `i × dispatch_interval` after the batch, all sends are polled concurrently
//! on the calling task, and each one runs under the retry policy on its own:
//! a receiver that keeps failing does not stop the others.

use crate::{
    domain::{Receiver, SubmissionReceipt},
    error::Result,
    ports::{BlockSigner, BlockSubmissionApi},
};
use futures::future::join_all;
use shared_types::{AccountBlock, TokenId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of one receiver.
#[derive(Debug)]
pub struct ReceiverOutcome {
    /// Destination and amount.
    pub receiver: Receiver,
    /// Attempts made.
    pub attempts: u32,
    /// Receipt or the error of the last attempt.
    pub result: Result<SubmissionReceipt>,
}

/// Per-receiver results of a batch, in receiver order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per receiver.
    pub outcomes: Vec<ReceiverOutcome>,
}

impl BatchReport {
    /// Receivers that got their transfer.
    pub fn succeeded(&self) -> impl Iterator<Item = &ReceiverOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    /// Receivers whose transfer failed.
    pub fn failed(&self) -> impl Iterator<Item = &ReceiverOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// True when every transfer went through.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Staggered, independently retried transfers to many receivers.
pub struct BatchDispatcher<S> {
    service: Arc<S>,
    signer: Arc<dyn BlockSigner>,
    token_id: TokenId,
    interval: Duration,
}

impl<S: BlockSubmissionApi> BatchDispatcher<S> {
    /// Dispatcher sending `token_id` from the signer's account.
    pub fn new(
        service: Arc<S>,
        signer: Arc<dyn BlockSigner>,
        token_id: TokenId,
        interval: Duration,
    ) -> Self {
        Self {
            service,
            signer,
            token_id,
            interval,
        }
    }

    /// Send to every receiver and wait for all of them.
    pub async fn dispatch(&self, receivers: Vec<Receiver>) -> BatchReport {
        info!(
            "[ab-02] Sending to {} receivers, {:?} apart",
            receivers.len(),
            self.interval
        );

        let sends = receivers
            .into_iter()
            .enumerate()
            .map(|(index, receiver)| self.send_one(index, receiver));
        let outcomes = join_all(sends).await;

        let report = BatchReport { outcomes };
        info!(
            "[ab-02] Batch done: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        report
    }

    async fn send_one(&self, index: usize, receiver: Receiver) -> ReceiverOutcome {
        let offset = u32::try_from(index).unwrap_or(u32::MAX);
        let delay = self.interval.saturating_mul(offset);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let draft = AccountBlock::transfer(
            self.signer.address(),
            receiver.address,
            self.token_id,
            receiver.amount,
        );
        let outcome = self
            .service
            .submit_with_retry(draft, self.signer.as_ref())
            .await;

        match &outcome.result {
            Ok(receipt) => info!(
                "[ab-02] Sent {} to {} at height {}",
                receiver.amount, receiver.address, receipt.height
            ),
            Err(err) => error!(
                "[ab-02] Could not send {} to {} after {} attempts: {}",
                receiver.amount, receiver.address, outcome.attempts, err
            ),
        }

        ReceiverOutcome {
            receiver,
            attempts: outcome.attempts,
            result: outcome.result,
        }
    }
}
