//! Execution result of one Ethereum message

use bytes::Bytes;
use ethbridge_primitives::{Address, Gas, H256, U256};
use ethbridge_rlp::{utils, Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::envelope::TypedMessage;

/// VM error reported when execution hits a `REVERT`
pub const VM_ERROR_EXECUTION_REVERTED: &str = "execution reverted";

/// VM error reported when execution runs out of gas
pub const VM_ERROR_OUT_OF_GAS: &str = "out of gas";

/// Selector of the ABI `Error(string)` revert payload
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Log record emitted during execution
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (indexed parameters)
    pub topics: Vec<H256>,
    /// Log data (non-indexed parameters)
    #[serde(with = "crate::serde_hex")]
    pub data: Bytes,
    /// Block in which the transaction was included
    pub block_number: u64,
    /// Hash of the transaction
    pub tx_hash: H256,
    /// Index of the transaction in the block
    pub tx_index: u64,
    /// Hash of the block
    pub block_hash: H256,
    /// Index of the log in the block
    pub index: u64,
    /// Set when the log was reverted by a chain reorganization
    pub removed: bool,
}

impl Log {
    /// Create a log with empty positional metadata
    pub fn new(address: Address, topics: Vec<H256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
            ..Default::default()
        }
    }

    /// Get the first topic (usually the event signature)
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }
}

impl Encodable for Log {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(9);
        s.append(&self.address);
        s.append_list::<H256, _>(&self.topics);
        utils::append_bytes(s, &self.data);
        s.append(&self.block_number);
        s.append(&self.tx_hash);
        s.append(&self.tx_index);
        s.append(&self.block_hash);
        s.append(&self.index);
        s.append(&u8::from(self.removed));
    }
}

impl Decodable for Log {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        utils::expect_list(rlp, 9)?;
        Ok(Self {
            address: rlp.val_at(0)?,
            topics: rlp.list_at(1)?,
            data: utils::bytes_at(rlp, 2)?,
            block_number: rlp.val_at(3)?,
            tx_hash: rlp.val_at(4)?,
            tx_index: rlp.val_at(5)?,
            block_hash: rlp.val_at(6)?,
            index: rlp.val_at(7)?,
            removed: rlp.val_at::<u8>(8)? != 0,
        })
    }
}

/// Outcome of executing one Ethereum message.
///
/// `hash` and `ret` are opaque to this crate; logs keep their emission
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Ethereum transaction hash in its canonical string form
    pub hash: String,
    /// Logs emitted by the call, in emission order
    pub logs: Vec<Log>,
    /// Return data of the call (or revert data)
    #[serde(with = "crate::serde_hex")]
    pub ret: Bytes,
    /// VM-level failure, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_error: Option<String>,
    /// Gas consumed by the call
    pub gas_used: Gas,
}

impl ExecutionResult {
    /// Whether the VM reported an error
    pub fn failed(&self) -> bool {
        self.vm_error.is_some()
    }

    /// Whether the call ended in a `REVERT`
    pub fn is_reverted(&self) -> bool {
        self.vm_error.as_deref() == Some(VM_ERROR_EXECUTION_REVERTED)
    }

    /// Return data of a successful call
    pub fn return_data(&self) -> Option<&Bytes> {
        (!self.failed()).then_some(&self.ret)
    }

    /// Revert data of a reverted call
    pub fn revert_data(&self) -> Option<&Bytes> {
        self.is_reverted().then_some(&self.ret)
    }

    /// Decoded `Error(string)` reason of a reverted call
    pub fn revert_reason(&self) -> Option<String> {
        self.revert_data().and_then(|data| decode_revert_reason(data))
    }
}

impl Encodable for ExecutionResult {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.hash);
        s.append_list::<Log, _>(&self.logs);
        utils::append_bytes(s, &self.ret);
        s.append_list::<String, _>(self.vm_error.as_slice());
        s.append(&self.gas_used);
    }
}

impl Decodable for ExecutionResult {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        utils::expect_list(rlp, 5)?;
        // absent: [], present: [message]
        let mut vm_error: Vec<String> = rlp.list_at(3)?;
        if vm_error.len() > 1 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            hash: rlp.val_at(0)?,
            logs: rlp.list_at(1)?,
            ret: utils::bytes_at(rlp, 2)?,
            vm_error: vm_error.pop(),
            gas_used: rlp.val_at(4)?,
        })
    }
}

impl TypedMessage for ExecutionResult {
    const TYPE_URL: &'static str = "/ethbridge.evm.v1.MsgEthereumTxResponse";
}

/// Decode an ABI `Error(string)` revert payload
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let payload = data.strip_prefix(&ERROR_STRING_SELECTOR[..])?;
    let offset = word_at(payload, 0)?;
    let len = word_at(payload, offset)?;
    let start = offset.checked_add(32)?;
    let bytes = payload.get(start..start.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn word_at(data: &[u8], offset: usize) -> Option<usize> {
    let word = data.get(offset..offset.checked_add(32)?)?;
    let value = U256::from_big_endian(word);
    if value.bits() > 64 {
        return None;
    }
    usize::try_from(value.low_u64()).ok()
}
