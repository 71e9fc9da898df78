//! # Shared Types Crate
//!
//! Ledger primitives shared by the hashing and submission subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Block, address and amount types are defined
//!   once here and used unchanged by every subsystem.
//! - **Parse, don't validate**: An [`Address`] or [`TokenId`] value always has
//!   a valid checksum; an [`Amount`] always fits the 32-byte wire field.
//! - **Categories in the type system**: request and response blocks are
//!   distinct [`BlockBody`] variants.

pub mod address;
pub mod entities;
pub mod errors;
pub mod primitives;

pub use address::*;
pub use entities::*;
pub use errors::*;
pub use primitives::*;
