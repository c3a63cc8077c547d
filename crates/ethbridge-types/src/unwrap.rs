//! Recovering the Ethereum message from a host transaction

use ethbridge_primitives::H256;
use tracing::trace;

use crate::error::{UnwrapError, UnwrapFailure};
use crate::msg::{HostTx, MsgEthereumTx};

/// Find the Ethereum message in `tx` whose canonical hash is `hash`.
///
/// A well-formed Ethereum host transaction carries exactly one such
/// message, but every message is checked rather than trusting position.
/// A missing transaction, a transaction without Ethereum messages and a
/// hash mismatch all fail with [`UnwrapError`]; its
/// [`reason`](UnwrapError::reason) tells them apart.
pub fn unwrap_ethereum_msg(
    tx: Option<&HostTx>,
    hash: H256,
) -> Result<&MsgEthereumTx, UnwrapError> {
    let tx = tx.ok_or(UnwrapError::new(hash, UnwrapFailure::InvalidTransaction))?;

    let mut seen = 0usize;
    for msg in tx.msgs() {
        let Some(eth_msg) = msg.as_ethereum_tx() else {
            continue;
        };
        seen += 1;
        let computed = eth_msg.hash();
        if computed == hash {
            return Ok(eth_msg);
        }
        trace!(expected = %hash, %computed, "ethereum message hash mismatch");
    }

    let reason = if seen == 0 {
        UnwrapFailure::NoEthereumMessage
    } else {
        UnwrapFailure::HashMismatch
    };
    Err(UnwrapError::new(hash, reason))
}
