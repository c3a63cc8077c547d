//! Host ledger messages and transactions
//!
//! The host ledger executes transactions made of an ordered list of
//! messages of arbitrary kinds. An Ethereum transaction travels as a
//! single [`MsgEthereumTx`] inside such a host transaction.

use std::fmt;

use bytes::Bytes;
use ethbridge_primitives::{Address, ChainId, Gas, Nonce, H256, U256};

use crate::error::TxError;
use crate::transaction::{
    AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, SignedTransaction, TransactionBody,
    TxSignature, TxType,
};

/// Type URL of [`MsgEthereumTx`] inside a host transaction
pub const MSG_ETHEREUM_TX_TYPE_URL: &str = "/ethbridge.evm.v1.MsgEthereumTx";

/// A message carried by a host transaction
pub trait HostMsg: fmt::Debug + Send + Sync {
    /// Type discriminator of the message
    fn type_url(&self) -> &str;

    /// Capability query: the Ethereum transaction this message carries,
    /// if it is an Ethereum-style message
    fn as_ethereum_tx(&self) -> Option<&MsgEthereumTx> {
        None
    }
}

/// Arguments used to build a [`MsgEthereumTx`]
///
/// The payload kind follows from which fee fields are set: a fee cap
/// selects EIP-1559, otherwise an access list selects EIP-2930,
/// otherwise a legacy transaction is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxArgs {
    /// Chain ID
    pub chain_id: ChainId,
    /// Sender nonce
    pub nonce: Nonce,
    /// Gas limit
    pub gas_limit: Gas,
    /// Input data
    pub input: Bytes,
    /// Gas price (legacy and access list transactions)
    pub gas_price: Option<U256>,
    /// Max fee per gas (EIP-1559)
    pub gas_fee_cap: Option<U256>,
    /// Max priority fee per gas (EIP-1559)
    pub gas_tip_cap: Option<U256>,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    /// Value transferred
    pub amount: U256,
    /// Access list
    pub accesses: Option<Vec<AccessListItem>>,
}

/// An Ethereum transaction wrapped as a host message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgEthereumTx {
    tx: SignedTransaction,
    from: Option<Address>,
}

impl MsgEthereumTx {
    /// Build an unsigned message from transaction arguments
    pub fn new(args: TxArgs) -> Self {
        let gas_price = args.gas_price.unwrap_or_default();
        let body = match (args.gas_fee_cap, args.accesses) {
            (Some(fee_cap), accesses) => TransactionBody::DynamicFee(DynamicFeeTx {
                chain_id: args.chain_id,
                nonce: args.nonce,
                max_priority_fee_per_gas: args.gas_tip_cap.unwrap_or_default(),
                max_fee_per_gas: fee_cap,
                gas_limit: args.gas_limit,
                to: args.to,
                value: args.amount,
                data: args.input,
                access_list: accesses.unwrap_or_default(),
            }),
            (None, Some(access_list)) => TransactionBody::AccessList(AccessListTx {
                chain_id: args.chain_id,
                nonce: args.nonce,
                gas_price,
                gas_limit: args.gas_limit,
                to: args.to,
                value: args.amount,
                data: args.input,
                access_list,
            }),
            (None, None) => TransactionBody::Legacy(LegacyTx {
                nonce: args.nonce,
                gas_price,
                gas_limit: args.gas_limit,
                to: args.to,
                value: args.amount,
                data: args.input,
            }),
        };
        Self::from_signed(SignedTransaction::new(body, TxSignature::default()))
    }

    /// Wrap an already signed Ethereum transaction
    pub fn from_signed(tx: SignedTransaction) -> Self {
        Self { tx, from: None }
    }

    /// Decode a message from raw EIP-2718 transaction bytes
    pub fn from_raw_bytes(raw: &[u8]) -> Result<Self, TxError> {
        SignedTransaction::decode(raw).map(Self::from_signed)
    }

    /// Raw EIP-2718 transaction bytes
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.tx.encode()
    }

    /// Attach a signature produced by the surrounding signer
    pub fn with_signature(mut self, signature: TxSignature) -> Self {
        self.tx.signature = signature;
        self
    }

    /// Record the sender recovered by the surrounding node
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Sender, when known
    pub fn sender(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    /// The carried Ethereum transaction
    pub fn as_transaction(&self) -> &SignedTransaction {
        &self.tx
    }

    /// Canonical Ethereum transaction hash
    pub fn hash(&self) -> H256 {
        self.tx.hash()
    }

    /// Transaction type
    pub fn tx_type(&self) -> TxType {
        self.tx.tx_type()
    }

    /// Gas limit
    pub fn gas(&self) -> Gas {
        self.tx.gas_limit()
    }

    /// Total fee at the transaction's gas price: `gas_price * gas_limit`
    pub fn fee(&self) -> U256 {
        self.tx.gas_price().saturating_mul(U256::from(self.tx.gas_limit()))
    }

    /// Fee actually paid at `base_fee`, `None` if the fee cap is below it
    pub fn effective_fee(&self, base_fee: U256) -> Option<U256> {
        self.tx
            .effective_gas_price(base_fee)
            .map(|price| price.saturating_mul(U256::from(self.tx.gas_limit())))
    }

    /// Stateless sanity checks
    pub fn validate_basic(&self) -> Result<(), TxError> {
        if self.tx.gas_limit() == 0 {
            return Err(TxError::ZeroGasLimit);
        }
        match &self.tx.tx {
            TransactionBody::Legacy(_) => {}
            TransactionBody::AccessList(tx) => {
                if tx.chain_id == 0 {
                    return Err(TxError::InvalidChainId);
                }
            }
            TransactionBody::DynamicFee(tx) => {
                if tx.chain_id == 0 {
                    return Err(TxError::InvalidChainId);
                }
                if tx.max_priority_fee_per_gas > tx.max_fee_per_gas {
                    return Err(TxError::TipAboveFeeCap {
                        tip: tx.max_priority_fee_per_gas,
                        cap: tx.max_fee_per_gas,
                    });
                }
            }
        }
        Ok(())
    }
}

impl HostMsg for MsgEthereumTx {
    fn type_url(&self) -> &str {
        MSG_ETHEREUM_TX_TYPE_URL
    }

    fn as_ethereum_tx(&self) -> Option<&MsgEthereumTx> {
        Some(self)
    }
}

/// A host ledger transaction: ordered messages plus a memo
#[derive(Debug, Default)]
pub struct HostTx {
    msgs: Vec<Box<dyn HostMsg>>,
    memo: String,
}

impl HostTx {
    /// Start building a transaction
    pub fn builder() -> HostTxBuilder {
        HostTxBuilder::default()
    }

    /// Messages in execution order
    pub fn msgs(&self) -> &[Box<dyn HostMsg>] {
        &self.msgs
    }

    /// Memo attached to the transaction
    pub fn memo(&self) -> &str {
        &self.memo
    }
}

/// Builder for [`HostTx`]
#[derive(Debug, Default)]
pub struct HostTxBuilder {
    msgs: Vec<Box<dyn HostMsg>>,
    memo: String,
}

impl HostTxBuilder {
    /// Append a message
    pub fn msg(mut self, msg: impl HostMsg + 'static) -> Self {
        self.msgs.push(Box::new(msg));
        self
    }

    /// Replace all messages
    pub fn msgs(mut self, msgs: Vec<Box<dyn HostMsg>>) -> Self {
        self.msgs = msgs;
        self
    }

    /// Set the memo
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Finish the transaction
    pub fn build(self) -> HostTx {
        HostTx {
            msgs: self.msgs,
            memo: self.memo,
        }
    }
}
