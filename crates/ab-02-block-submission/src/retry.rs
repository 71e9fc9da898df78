//! Retry Coordinator
//!
//! Bounded retry of a whole send. Every attempt runs the full pipeline again,
//! so a block rejected for a stale previous hash is re-linked against the
//! fresh chain head instead of being resubmitted as is.

use crate::config::RetryPolicy;
use crate::error::Result;
use std::future::Future;
use tracing::{debug, warn};

/// Result of a retried operation.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Result of the last attempt.
    pub result: Result<T>,
}

impl<T> RetryOutcome<T> {
    /// True if the last attempt succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `operation` until it succeeds, fails permanently or runs out of
/// attempts. `operation` receives the 1-based attempt number.
///
/// Only errors whose [`crate::SubmissionError::is_retryable`] is true are
/// retried; [`RetryPolicy::delay`] separates two attempts.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = operation(attempt).await;
        match &result {
            Ok(_) => {
                debug!("[ab-02] Attempt {}/{} succeeded", attempt, max_attempts);
                return RetryOutcome {
                    attempts: attempt,
                    result,
                };
            }
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    "[ab-02] Attempt {}/{} failed, retrying in {:?}: {}",
                    attempt,
                    max_attempts,
                    policy.delay(),
                    err
                );
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    "[ab-02] Giving up after attempt {}/{}: {}",
                    attempt, max_attempts, err
                );
                return RetryOutcome {
                    attempts: attempt,
                    result,
                };
            }
        }
    }
}
