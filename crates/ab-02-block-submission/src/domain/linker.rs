//! Chain Linker
//!
//! Derives the height and previous hash of the next block from the account's
//! chain head. Only one block per account may be in flight: two drafts linked
//! against the same head would claim the same height.

use super::entities::{ChainHead, Linkage};
use crate::ports::QueryError;
use shared_types::AccountBlock;

/// Linkage of the block following `head`.
///
/// - head `{h, H}` → `{h + 1, H}`
/// - no head → `{1, zero sentinel}`
///
/// A head already at `u64::MAX` has no successor and is reported as a
/// malformed ledger answer.
pub fn next_linkage(head: Option<&ChainHead>) -> Result<Linkage, QueryError> {
    match head {
        Some(head) => {
            let height = head.height.checked_add(1).ok_or_else(|| {
                QueryError::Malformed(format!("chain head height {} has no successor", head.height))
            })?;
            Ok(Linkage {
                height,
                previous_hash: Some(head.hash),
            })
        }
        None => Ok(Linkage {
            height: 1,
            previous_hash: None,
        }),
    }
}

impl Linkage {
    /// Write height and previous hash into `block`.
    pub fn apply(&self, block: &mut AccountBlock) {
        block.height = self.height;
        block.previous_hash = self.previous_hash;
    }
}
