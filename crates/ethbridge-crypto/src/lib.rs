//! # ethbridge-crypto
//!
//! Keccak-256 hashing used to derive canonical Ethereum transaction hashes.
//!
//! Signing and public key recovery are handled by the surrounding node.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{keccak256, keccak256_concat};
