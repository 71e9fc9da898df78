//! Domain layer (pure logic, no I/O)

pub mod entities;
pub mod linker;
pub mod quota;
pub mod validation;

pub use entities::*;
pub use linker::next_linkage;
pub use quota::{format_units, quota_to_ut, QuotaPolicy, QUOTA_PER_UT, VITE_DECIMALS};
pub use validation::check_balance;
