//! # ethbridge-types
//!
//! Bridge between Ethereum-style transactions and the host ledger's
//! multi-message transaction model.
//!
//! This crate provides:
//! - [`MsgEthereumTx`](msg::MsgEthereumTx) - an Ethereum transaction carried as a host message
//! - [`HostTx`](msg::HostTx) - the host transaction exposing its ordered messages
//! - [`ExecutionResult`](result::ExecutionResult) - outcome of executing one Ethereum message
//! - [`ResponseEnvelope`](envelope::ResponseEnvelope) - the host's per-message response container
//! - [`decode_tx_response`] - recover the execution result from envelope bytes
//! - [`unwrap_ethereum_msg`] - find the Ethereum message with a given hash
//! - [`bin_search`] / [`estimate_gas`] - minimal gas limit search

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod envelope;
pub mod error;
pub mod estimate;
pub mod msg;
pub mod result;
pub mod transaction;
pub mod unwrap;

mod serde_hex;

// Re-export commonly used types
pub use codec::{decode_tx_response, decode_tx_responses};
pub use envelope::{ResponseEnvelope, TypedEntry, TypedMessage};
pub use error::{
    CodecError, EnvelopeError, GasEstimateError, TxError, UnwrapError, UnwrapFailure,
};
pub use estimate::{bin_search, estimate_gas, GasEstimateConfig, ProbeOutcome};
pub use msg::{HostMsg, HostTx, HostTxBuilder, MsgEthereumTx, TxArgs};
pub use result::{ExecutionResult, Log};
pub use transaction::{
    AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, SignedTransaction, TransactionBody,
    TxSignature, TxType,
};
pub use unwrap::unwrap_ethereum_msg;
