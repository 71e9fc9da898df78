//! Pre-submission checks that run before any block is built.

use crate::error::SubmissionErrorKind;
use shared_types::{Amount, RequestBody};

/// Reject a request whose amount exceeds the known balance.
///
/// The check is advisory: the balance may change before the block lands, and
/// the network stays the final judge.
pub fn check_balance(request: &RequestBody, balance: Amount) -> Result<(), SubmissionErrorKind> {
    if request.amount > balance {
        return Err(SubmissionErrorKind::InsufficientBalance {
            token: request.token_id,
            requested: request.amount,
            available: balance,
        });
    }
    Ok(())
}
