//! Cross-crate flows: hashing (ab-01) driven by the submission pipeline (ab-02).

pub mod pipeline_flows;
pub mod rpc_flows;
