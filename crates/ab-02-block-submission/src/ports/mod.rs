//! Ports layer (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
