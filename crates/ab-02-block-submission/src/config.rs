//! # Submission Configuration
//!
//! Everything the pipeline needs besides its collaborators. Passed explicitly
//! into [`crate::SubmissionService`]; there is no process-wide client or
//! config singleton.

use crate::error::{Result, SubmissionError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry of a whole send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Pause between two attempts, in milliseconds.
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// Policy with the given attempts and delay.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 20_000,
        }
    }
}

/// Submission pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Timeout applied to every ledger query, signature and submission, in
    /// milliseconds.
    pub request_timeout_ms: u64,

    /// Timeout of a single PoW nonce search, in milliseconds.
    pub pow_timeout_ms: u64,

    /// Retry policy used by the batch dispatcher.
    pub retry: RetryPolicy,

    /// Stagger between two receivers of a batch, in milliseconds.
    pub dispatch_interval_ms: u64,

    /// Check the sender's balance before building a request block.
    pub check_balance: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            pow_timeout_ms: 120_000,
            retry: RetryPolicy::default(),
            dispatch_interval_ms: 20_000,
            check_balance: true,
        }
    }
}

impl SubmissionConfig {
    /// Short timings for tests.
    pub fn for_testing() -> Self {
        Self {
            request_timeout_ms: 1_000,
            pow_timeout_ms: 5_000,
            retry: RetryPolicy::new(3, Duration::from_millis(10)),
            dispatch_interval_ms: 10,
            check_balance: true,
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Bound on one PoW nonce search.
    pub fn pow_timeout(&self) -> Duration {
        Duration::from_millis(self.pow_timeout_ms)
    }

    /// Stagger between batch receivers.
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(SubmissionError::config("request_timeout_ms must be positive"));
        }
        if self.pow_timeout_ms == 0 {
            return Err(SubmissionError::config("pow_timeout_ms must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(SubmissionError::config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SubmissionConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(20));
        assert_eq!(config.dispatch_interval(), Duration::from_secs(20));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.pow_timeout(), Duration::from_secs(120));
        assert!(config.check_balance);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SubmissionConfig =
            serde_json::from_str(r#"{"request_timeout_ms": 5000, "retry": {"max_attempts": 5}}"#)
                .unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 20_000);
        assert_eq!(config.dispatch_interval_ms, 20_000);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = SubmissionConfig::for_testing();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = SubmissionConfig::for_testing();
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SubmissionConfig::for_testing();
        config.pow_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_delay_saturates() {
        let policy = RetryPolicy::new(3, Duration::MAX);
        assert_eq!(policy.delay_ms, u64::MAX);

        let policy = RetryPolicy::new(3, Duration::from_millis(1_500));
        assert_eq!(policy.delay(), Duration::from_millis(1_500));
    }
}
