//! Recovering execution results from a host response envelope
//!
//! The execution pipeline packs one [`ExecutionResult`] per processed
//! Ethereum message into the host's [`ResponseEnvelope`]. These helpers are
//! the only place that knows how to pick those entries back out.

use tracing::debug;

use crate::envelope::{ResponseEnvelope, TypedMessage};
use crate::error::CodecError;
use crate::result::ExecutionResult;

/// Decode the first execution result from envelope bytes.
///
/// Entries of other kinds are skipped. Fails with
/// [`CodecError::NoMatchingResponse`] when the envelope is well formed but
/// holds no execution result.
pub fn decode_tx_response(bytes: &[u8]) -> Result<ExecutionResult, CodecError> {
    let envelope = ResponseEnvelope::decode(bytes)?;
    let Some(entry) = envelope.find::<ExecutionResult>() else {
        debug!(entries = envelope.len(), "no execution result in tx response envelope");
        return Err(CodecError::NoMatchingResponse {
            type_url: ExecutionResult::TYPE_URL,
        });
    };
    entry.unpack().map_err(CodecError::Unpack)
}

/// Decode every execution result from envelope bytes, in message order.
///
/// An envelope without execution results yields an empty list.
pub fn decode_tx_responses(bytes: &[u8]) -> Result<Vec<ExecutionResult>, CodecError> {
    let envelope = ResponseEnvelope::decode(bytes)?;
    envelope
        .entries
        .iter()
        .filter(|entry| entry.is::<ExecutionResult>())
        .map(|entry| entry.unpack().map_err(CodecError::Unpack))
        .collect()
}
