//! # ethbridge-primitives
//!
//! Primitive types shared by the ethbridge crates.
//!
//! Fixed-size byte types ([`Address`], [`H256`]) parse from and render to
//! `0x`-prefixed hex, which is also their canonical string form.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Gas quantity type
pub type Gas = u64;

/// Transaction nonce type
pub type Nonce = u64;

/// Chain identifier type
pub type ChainId = u64;
