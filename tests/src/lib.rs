//! # Account Block Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── hashing_benchmarks.rs   # Encoder and hasher throughput
//! └── src/integration/
//!     ├── pipeline_flows.rs       # Pipeline over the in-memory ledger
//!     └── rpc_flows.rs            # Pipeline over a JSON-RPC node double
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ab-tests
//!
//! # By category
//! cargo test -p ab-tests integration::pipeline_flows::
//! cargo test -p ab-tests integration::rpc_flows::
//!
//! # Benchmarks
//! cargo bench -p ab-tests
//! ```

#![allow(dead_code)]

pub mod integration;
