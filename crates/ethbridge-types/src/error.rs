//! Error types for the bridge operations

use bytes::Bytes;
use ethbridge_primitives::{Gas, H256, U256};
use ethbridge_rlp::DecoderError;
use thiserror::Error;

/// Ethereum transaction encoding and validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Raw transaction bytes were empty
    #[error("empty transaction bytes")]
    Empty,

    /// Leading type byte is not a known EIP-2718 type
    #[error("unsupported transaction type: 0x{0:02x}")]
    UnsupportedType(u8),

    /// Payload is not valid RLP for the transaction type
    #[error("invalid transaction encoding: {0}")]
    Rlp(#[from] DecoderError),

    /// Gas limit of zero
    #[error("gas limit must not be zero")]
    ZeroGasLimit,

    /// Typed transaction without a chain id
    #[error("chain id must not be zero for typed transactions")]
    InvalidChainId,

    /// Priority fee above the fee cap
    #[error("max priority fee per gas higher than max fee per gas ({tip} > {cap})")]
    TipAboveFeeCap {
        /// Max priority fee per gas
        tip: U256,
        /// Max fee per gas
        cap: U256,
    },
}

/// Errors reading typed entries from a response envelope
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Envelope bytes are not a valid envelope
    #[error("malformed response envelope: {0}")]
    Decode(#[source] DecoderError),

    /// Entry holds a different kind of response
    #[error("cannot unpack {found} as {expected}")]
    TypeMismatch {
        /// Type URL the caller asked for
        expected: &'static str,
        /// Type URL carried by the entry
        found: String,
    },

    /// Entry has the right type URL but its payload does not decode
    #[error("failed to unpack {type_url}: {source}")]
    Unpack {
        /// Type URL of the entry
        type_url: String,
        /// Payload decoding error
        #[source]
        source: DecoderError,
    },
}

/// Errors decoding an execution result out of envelope bytes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bytes do not deserialize as an envelope
    #[error("failed to decode tx response: {0}")]
    Decode(#[source] DecoderError),

    /// No entry of the execution result kind
    #[error("no matching response for {type_url}")]
    NoMatchingResponse {
        /// Type URL that was searched for
        type_url: &'static str,
    },

    /// Matching entry failed to unpack
    #[error(transparent)]
    Unpack(EnvelopeError),
}

impl CodecError {
    /// Whether the envelope was well formed but held no matching entry
    pub fn is_not_found(&self) -> bool {
        matches!(self, CodecError::NoMatchingResponse { .. })
    }
}

impl From<EnvelopeError> for CodecError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Decode(source) => CodecError::Decode(source),
            other => CodecError::Unpack(other),
        }
    }
}

/// Reason an Ethereum message could not be unwrapped
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapFailure {
    /// No transaction was supplied
    #[error("invalid transaction: nil")]
    InvalidTransaction,

    /// Transaction carries no Ethereum message
    #[error("transaction carries no ethereum message")]
    NoEthereumMessage,

    /// Ethereum messages present, none with the expected hash
    #[error("no ethereum message with a matching hash")]
    HashMismatch,
}

/// Ethereum message not found for the expected hash
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("eth tx not found: {hash}: {reason}")]
pub struct UnwrapError {
    /// Hash the caller expected
    pub hash: H256,
    /// Detail
    pub reason: UnwrapFailure,
}

impl UnwrapError {
    /// Create a new unwrap error
    pub fn new(hash: H256, reason: UnwrapFailure) -> Self {
        Self { hash, reason }
    }
}

/// Gas estimation errors, generic over the probe's own error type
#[derive(Debug, Error)]
pub enum GasEstimateError<E> {
    /// Execution reverted even at the highest allowed gas
    #[error("execution reverted{}", reason_suffix(.reason))]
    Reverted {
        /// Decoded `Error(string)` reason, when present
        reason: Option<String>,
        /// Raw revert data
        data: Bytes,
    },

    /// Execution failed at the highest allowed gas for a reason other
    /// than running out of gas
    #[error("{0}")]
    VmError(String),

    /// No gas value within the allowance makes execution succeed
    #[error("gas required exceeds allowance ({0})")]
    GasExceedsAllowance(Gas),

    /// The probe itself failed
    #[error(transparent)]
    Probe(E),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {}", r))
        .unwrap_or_default()
}
