//! Quota Policy
//!
//! Decides whether a block needs proof of work, and renders quota and raw
//! amounts for display. Integer arithmetic only.

use super::entities::{PowDecision, QuotaRequirement};
use crate::error::SubmissionErrorKind;
use primitive_types::U256;
use shared_types::Amount;

/// Quota units in one UT.
pub const QUOTA_PER_UT: u64 = 21_000;

/// Decimals of the native token.
pub const VITE_DECIMALS: u32 = 18;

const UT_FRACTION_DIGITS: u32 = 4;

/// PoW decision rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuotaPolicy;

impl QuotaPolicy {
    /// `current < required` needs PoW; equal quota does not.
    ///
    /// A requirement without difficulty cannot be solved, so it is reported
    /// as a query error instead of a decision.
    pub fn decide(
        current_quota: u64,
        requirement: &QuotaRequirement,
    ) -> Result<PowDecision, SubmissionErrorKind> {
        if current_quota >= requirement.required_quota {
            return Ok(PowDecision::NotRequired);
        }
        match requirement.difficulty {
            Some(difficulty) => Ok(PowDecision::Required { difficulty }),
            None => Err(SubmissionErrorKind::Query(format!(
                "quota short ({} < {}) but no PoW difficulty reported",
                current_quota, requirement.required_quota
            ))),
        }
    }
}

/// Quota in UT, truncated to four decimals, trailing zeros trimmed.
pub fn quota_to_ut(quota: u64) -> String {
    let whole = quota / QUOTA_PER_UT;
    let scale = 10u64.pow(UT_FRACTION_DIGITS);
    let fraction = (quota % QUOTA_PER_UT) * scale / QUOTA_PER_UT;
    join_fraction(whole.to_string(), fraction.to_string(), UT_FRACTION_DIGITS)
}

/// Raw `amount` in whole units of a token with `decimals` decimals.
pub fn format_units(amount: &Amount, decimals: u32) -> String {
    let raw = amount.as_u256();
    if decimals == 0 {
        return raw.to_string();
    }
    // 10^78 overflows U256; every U256 is below it, so the whole part is zero.
    if decimals > 77 {
        return join_fraction("0".to_string(), raw.to_string(), decimals);
    }
    let scale = U256::exp10(decimals as usize);
    join_fraction(
        (raw / scale).to_string(),
        (raw % scale).to_string(),
        decimals,
    )
}

fn join_fraction(whole: String, fraction: String, digits: u32) -> String {
    let padded = format!("{:0>width$}", fraction, width = digits as usize);
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, trimmed)
    }
}
