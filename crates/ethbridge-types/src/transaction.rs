//! Ethereum transaction payloads and their EIP-2718 encoding
//!
//! A [`SignedTransaction`] is what an Ethereum client signs and broadcasts.
//! Its canonical hash is the Keccak-256 of the EIP-2718 encoding:
//! `rlp([...])` for legacy transactions and `type || rlp([...])` for typed
//! ones.

use bytes::Bytes;
use ethbridge_crypto::{keccak256, keccak256_concat};
use ethbridge_primitives::{Address, ChainId, Gas, Nonce, H256, U256};
use ethbridge_rlp::{utils, Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::error::TxError;

/// Transaction type identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TxType {
    /// Legacy transaction (pre-EIP-2718)
    #[default]
    Legacy = 0,
    /// EIP-2930 access list transaction
    AccessList = 1,
    /// EIP-1559 dynamic fee transaction
    DynamicFee = 2,
}

impl TxType {
    /// Parse an EIP-2718 type byte
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TxType::Legacy),
            1 => Some(TxType::AccessList),
            2 => Some(TxType::DynamicFee),
            _ => None,
        }
    }
}

/// Legacy transaction (Type 0)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTx {
    /// Transaction nonce
    pub nonce: Nonce,
    /// Gas price in wei
    pub gas_price: U256,
    /// Gas limit
    pub gas_limit: Gas,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: U256,
    /// Input data
    pub data: Bytes,
}

/// EIP-2930 access list transaction (Type 1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListTx {
    /// Chain ID
    pub chain_id: ChainId,
    /// Transaction nonce
    pub nonce: Nonce,
    /// Gas price in wei
    pub gas_price: U256,
    /// Gas limit
    pub gas_limit: Gas,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: U256,
    /// Input data
    pub data: Bytes,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

/// EIP-1559 dynamic fee transaction (Type 2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicFeeTx {
    /// Chain ID
    pub chain_id: ChainId,
    /// Transaction nonce
    pub nonce: Nonce,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: U256,
    /// Max fee per gas
    pub max_fee_per_gas: U256,
    /// Gas limit
    pub gas_limit: Gas,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: U256,
    /// Input data
    pub data: Bytes,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

/// Access list item (address + storage keys)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListItem {
    /// Account address
    pub address: Address,
    /// Storage keys
    pub storage_keys: Vec<H256>,
}

impl Encodable for AccessListItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list::<H256, _>(&self.storage_keys);
    }
}

impl Decodable for AccessListItem {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        utils::expect_list(rlp, 2)?;
        Ok(Self {
            address: rlp.val_at(0)?,
            storage_keys: rlp.list_at(1)?,
        })
    }
}

/// Signature components, carried verbatim.
///
/// For legacy transactions `v` is `27`/`28` or the EIP-155 value
/// `chain_id * 2 + 35 + parity`; typed transactions store the y-parity.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TxSignature {
    /// Recovery ID (v value)
    pub v: u64,
    /// R component
    pub r: U256,
    /// S component
    pub s: U256,
}

impl TxSignature {
    /// Create a new signature
    pub fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Check if signature is present (non-zero r and s)
    pub fn is_signed(&self) -> bool {
        !self.r.is_zero() && !self.s.is_zero()
    }
}

/// Transaction body (unsigned)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionBody {
    /// Legacy transaction
    Legacy(LegacyTx),
    /// EIP-2930 transaction
    AccessList(AccessListTx),
    /// EIP-1559 transaction
    DynamicFee(DynamicFeeTx),
}

/// Transaction body plus signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction body
    pub tx: TransactionBody,
    /// Signature
    pub signature: TxSignature,
}

macro_rules! body_field {
    ($self:ident, $field:ident) => {
        match &$self.tx {
            TransactionBody::Legacy(tx) => &tx.$field,
            TransactionBody::AccessList(tx) => &tx.$field,
            TransactionBody::DynamicFee(tx) => &tx.$field,
        }
    };
}

impl SignedTransaction {
    /// Wrap a body and signature
    pub fn new(tx: TransactionBody, signature: TxSignature) -> Self {
        Self { tx, signature }
    }

    /// Transaction type
    pub fn tx_type(&self) -> TxType {
        match &self.tx {
            TransactionBody::Legacy(_) => TxType::Legacy,
            TransactionBody::AccessList(_) => TxType::AccessList,
            TransactionBody::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Chain id; for legacy transactions only recoverable from an
    /// EIP-155 `v`
    pub fn chain_id(&self) -> Option<ChainId> {
        match &self.tx {
            TransactionBody::Legacy(_) => {
                let v = self.signature.v;
                (v >= 35).then(|| (v - 35) / 2)
            }
            TransactionBody::AccessList(tx) => Some(tx.chain_id),
            TransactionBody::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    /// Get transaction nonce
    pub fn nonce(&self) -> Nonce {
        *body_field!(self, nonce)
    }

    /// Get gas limit
    pub fn gas_limit(&self) -> Gas {
        *body_field!(self, gas_limit)
    }

    /// Get recipient address
    pub fn to(&self) -> Option<&Address> {
        body_field!(self, to).as_ref()
    }

    /// Get transfer value
    pub fn value(&self) -> U256 {
        *body_field!(self, value)
    }

    /// Get input data
    pub fn data(&self) -> &Bytes {
        body_field!(self, data)
    }

    /// Access list, empty for legacy transactions
    pub fn access_list(&self) -> &[AccessListItem] {
        match &self.tx {
            TransactionBody::Legacy(_) => &[],
            TransactionBody::AccessList(tx) => &tx.access_list,
            TransactionBody::DynamicFee(tx) => &tx.access_list,
        }
    }

    /// Gas price, or the fee cap for EIP-1559 transactions
    pub fn gas_price(&self) -> U256 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_price,
            TransactionBody::AccessList(tx) => tx.gas_price,
            TransactionBody::DynamicFee(tx) => tx.max_fee_per_gas,
        }
    }

    /// Check if this is a contract creation transaction
    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    /// Get effective gas price for the given base fee
    ///
    /// Returns `None` if `base_fee > max_fee_per_gas` for EIP-1559 transactions
    /// (transaction cannot be included in block with this base fee).
    pub fn effective_gas_price(&self, base_fee: U256) -> Option<U256> {
        match &self.tx {
            TransactionBody::Legacy(tx) => Some(tx.gas_price),
            TransactionBody::AccessList(tx) => Some(tx.gas_price),
            TransactionBody::DynamicFee(tx) => {
                if base_fee > tx.max_fee_per_gas {
                    return None;
                }
                let priority_fee = tx
                    .max_priority_fee_per_gas
                    .min(tx.max_fee_per_gas - base_fee);
                Some(base_fee + priority_fee)
            }
        }
    }

    /// EIP-2718 encoding of the signed transaction
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.tx_type() != TxType::Legacy {
            out.push(self.tx_type() as u8);
        }
        out.extend_from_slice(&self.rlp_payload());
        out
    }

    /// Decode an EIP-2718 encoded signed transaction
    pub fn decode(raw: &[u8]) -> Result<Self, TxError> {
        let first = *raw.first().ok_or(TxError::Empty)?;
        if first >= 0xc0 {
            let rlp = Rlp::new(raw);
            ensure_exact(&rlp, raw.len())?;
            return Ok(decode_legacy(&rlp)?);
        }

        let decode_typed = match TxType::from_type_byte(first) {
            Some(TxType::AccessList) => decode_access_list,
            Some(TxType::DynamicFee) => decode_dynamic_fee,
            _ => return Err(TxError::UnsupportedType(first)),
        };
        let payload = &raw[1..];
        let rlp = Rlp::new(payload);
        ensure_exact(&rlp, payload.len())?;
        Ok(decode_typed(&rlp)?)
    }

    /// Canonical transaction hash
    pub fn hash(&self) -> H256 {
        let payload = self.rlp_payload();
        match self.tx_type() {
            TxType::Legacy => keccak256(&payload),
            ty => keccak256_concat(&[&[ty as u8][..], &payload[..]]),
        }
    }

    fn rlp_payload(&self) -> Vec<u8> {
        let sig = &self.signature;
        let mut s = match &self.tx {
            TransactionBody::Legacy(tx) => {
                let mut s = RlpStream::new_list(9);
                s.append(&tx.nonce);
                s.append(&tx.gas_price);
                s.append(&tx.gas_limit);
                utils::append_optional_address(&mut s, tx.to.as_ref());
                s.append(&tx.value);
                utils::append_bytes(&mut s, &tx.data);
                s
            }
            TransactionBody::AccessList(tx) => {
                let mut s = RlpStream::new_list(11);
                s.append(&tx.chain_id);
                s.append(&tx.nonce);
                s.append(&tx.gas_price);
                s.append(&tx.gas_limit);
                utils::append_optional_address(&mut s, tx.to.as_ref());
                s.append(&tx.value);
                utils::append_bytes(&mut s, &tx.data);
                s.append_list::<AccessListItem, _>(&tx.access_list);
                s
            }
            TransactionBody::DynamicFee(tx) => {
                let mut s = RlpStream::new_list(12);
                s.append(&tx.chain_id);
                s.append(&tx.nonce);
                s.append(&tx.max_priority_fee_per_gas);
                s.append(&tx.max_fee_per_gas);
                s.append(&tx.gas_limit);
                utils::append_optional_address(&mut s, tx.to.as_ref());
                s.append(&tx.value);
                utils::append_bytes(&mut s, &tx.data);
                s.append_list::<AccessListItem, _>(&tx.access_list);
                s
            }
        };
        s.append(&sig.v);
        s.append(&sig.r);
        s.append(&sig.s);
        s.out().to_vec()
    }
}

fn ensure_exact(rlp: &Rlp<'_>, len: usize) -> Result<(), DecoderError> {
    let info = rlp.payload_info()?;
    if info.header_len + info.value_len != len {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    Ok(())
}

fn signature_at(rlp: &Rlp<'_>, first: usize) -> Result<TxSignature, DecoderError> {
    Ok(TxSignature::new(
        rlp.val_at(first)?,
        rlp.val_at(first + 1)?,
        rlp.val_at(first + 2)?,
    ))
}

fn decode_legacy(rlp: &Rlp<'_>) -> Result<SignedTransaction, DecoderError> {
    utils::expect_list(rlp, 9)?;
    let tx = LegacyTx {
        nonce: rlp.val_at(0)?,
        gas_price: rlp.val_at(1)?,
        gas_limit: rlp.val_at(2)?,
        to: utils::optional_address_at(rlp, 3)?,
        value: rlp.val_at(4)?,
        data: utils::bytes_at(rlp, 5)?,
    };
    Ok(SignedTransaction::new(TransactionBody::Legacy(tx), signature_at(rlp, 6)?))
}

fn decode_access_list(rlp: &Rlp<'_>) -> Result<SignedTransaction, DecoderError> {
    utils::expect_list(rlp, 11)?;
    let tx = AccessListTx {
        chain_id: rlp.val_at(0)?,
        nonce: rlp.val_at(1)?,
        gas_price: rlp.val_at(2)?,
        gas_limit: rlp.val_at(3)?,
        to: utils::optional_address_at(rlp, 4)?,
        value: rlp.val_at(5)?,
        data: utils::bytes_at(rlp, 6)?,
        access_list: rlp.list_at(7)?,
    };
    Ok(SignedTransaction::new(TransactionBody::AccessList(tx), signature_at(rlp, 8)?))
}

fn decode_dynamic_fee(rlp: &Rlp<'_>) -> Result<SignedTransaction, DecoderError> {
    utils::expect_list(rlp, 12)?;
    let tx = DynamicFeeTx {
        chain_id: rlp.val_at(0)?,
        nonce: rlp.val_at(1)?,
        max_priority_fee_per_gas: rlp.val_at(2)?,
        max_fee_per_gas: rlp.val_at(3)?,
        gas_limit: rlp.val_at(4)?,
        to: utils::optional_address_at(rlp, 5)?,
        value: rlp.val_at(6)?,
        data: utils::bytes_at(rlp, 7)?,
        access_list: rlp.list_at(8)?,
    };
    Ok(SignedTransaction::new(TransactionBody::DynamicFee(tx), signature_at(rlp, 9)?))
}

impl Default for LegacyTx {
    fn default() -> Self {
        Self {
            nonce: 0,
            gas_price: U256::zero(),
            gas_limit: 21000,
            to: None,
            value: U256::zero(),
            data: Bytes::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> TxSignature {
        TxSignature::new(27, U256::from(1u64), U256::from(2u64))
    }

    fn dynamic_fee_tx() -> DynamicFeeTx {
        DynamicFeeTx {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: U256::from(10u64),
            max_fee_per_gas: U256::from(100u64),
            gas_limit: 21000,
            to: None,
            value: U256::zero(),
            data: Bytes::new(),
            access_list: vec![],
        }
    }

    // ==================== TxType tests ====================

    #[test]
    fn test_tx_type_values() {
        assert_eq!(TxType::Legacy as u8, 0);
        assert_eq!(TxType::AccessList as u8, 1);
        assert_eq!(TxType::DynamicFee as u8, 2);
        assert_eq!(TxType::from_type_byte(2), Some(TxType::DynamicFee));
        assert_eq!(TxType::from_type_byte(3), None);
    }

    // ==================== TxSignature tests ====================

    #[test]
    fn test_signature_presence() {
        assert!(sig().is_signed());
        assert!(!TxSignature::default().is_signed());
        assert!(!TxSignature::new(27, U256::zero(), U256::one()).is_signed());
    }

    // ==================== Accessors ====================

    #[test]
    fn test_contract_creation() {
        let signed = SignedTransaction::new(TransactionBody::Legacy(LegacyTx::default()), sig());
        assert!(signed.is_contract_creation());
        assert_eq!(signed.tx_type(), TxType::Legacy);
        assert!(signed.access_list().is_empty());
    }

    #[test]
    fn test_legacy_chain_id_from_eip155_v() {
        let mut signed =
            SignedTransaction::new(TransactionBody::Legacy(LegacyTx::default()), sig());
        assert_eq!(signed.chain_id(), None);

        signed.signature.v = 37;
        assert_eq!(signed.chain_id(), Some(1));
        signed.signature.v = 9000 * 2 + 36;
        assert_eq!(signed.chain_id(), Some(9000));
    }

    #[test]
    fn test_dynamic_fee_gas_price_is_fee_cap() {
        let signed = SignedTransaction::new(TransactionBody::DynamicFee(dynamic_fee_tx()), sig());
        assert_eq!(signed.gas_price(), U256::from(100u64));
        assert_eq!(signed.chain_id(), Some(1));
    }

    // ==================== Effective gas price tests ====================

    #[test]
    fn test_effective_gas_price_legacy() {
        let tx = LegacyTx {
            gas_price: U256::from(100u64),
            ..Default::default()
        };
        let signed = SignedTransaction::new(TransactionBody::Legacy(tx), sig());
        // Legacy tx ignores base fee, always uses gas_price
        assert_eq!(signed.effective_gas_price(U256::from(50u64)), Some(U256::from(100u64)));
        assert_eq!(signed.effective_gas_price(U256::from(200u64)), Some(U256::from(100u64)));
    }

    #[test]
    fn test_effective_gas_price_dynamic() {
        let signed = SignedTransaction::new(TransactionBody::DynamicFee(dynamic_fee_tx()), sig());
        // base_fee=50, priority_fee=min(10, 100-50)=10, effective=60
        assert_eq!(signed.effective_gas_price(U256::from(50u64)), Some(U256::from(60u64)));
        // base_fee=95, remaining=5, priority_fee=min(10, 5)=5, effective=100
        assert_eq!(signed.effective_gas_price(U256::from(95u64)), Some(U256::from(100u64)));
    }

    #[test]
    fn test_effective_gas_price_base_fee_too_high() {
        let signed = SignedTransaction::new(TransactionBody::DynamicFee(dynamic_fee_tx()), sig());
        assert_eq!(signed.effective_gas_price(U256::from(101u64)), None);
        assert_eq!(signed.effective_gas_price(U256::from(100u64)), Some(U256::from(100u64)));
    }

    // ==================== Encoding ====================

    #[test]
    fn test_legacy_encoding_is_plain_rlp_list() {
        let signed = SignedTransaction::new(TransactionBody::Legacy(LegacyTx::default()), sig());
        let raw = signed.encode();
        assert!(raw[0] >= 0xc0);
        assert_eq!(signed.hash(), keccak256(&raw));
    }

    #[test]
    fn test_typed_encoding_has_type_prefix() {
        let signed = SignedTransaction::new(TransactionBody::DynamicFee(dynamic_fee_tx()), sig());
        let raw = signed.encode();
        assert_eq!(raw[0], 0x02);
        assert_eq!(signed.hash(), keccak256(&raw));
    }

    #[test]
    fn test_known_legacy_hash() {
        // EIP-155 example transaction, chain id 1
        let tx = LegacyTx {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21000,
            to: Some(Address::from_hex("0x3535353535353535353535353535353535353535").unwrap()),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::new(),
        };
        let signature = TxSignature::new(
            37,
            U256::from_dec_str(
                "18515461264373351373200002665853028612451056578545711640558177340181847433846",
            )
            .unwrap(),
            U256::from_dec_str(
                "46948507304638947509940763649030358759909902576025900602547168820602576006531",
            )
            .unwrap(),
        );
        let signed = SignedTransaction::new(TransactionBody::Legacy(tx), signature);
        assert_eq!(
            signed.hash().to_hex(),
            "0x33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788"
        );
    }

    #[test]
    fn test_decode_access_list_tx() {
        let tx = AccessListTx {
            chain_id: 7,
            nonce: 3,
            gas_price: U256::from(5u64),
            gas_limit: 60_000,
            to: Some(Address::from_bytes([0x42; 20])),
            value: U256::from(1u64),
            data: Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]),
            access_list: vec![AccessListItem {
                address: Address::from_bytes([0x01; 20]),
                storage_keys: vec![H256::from_bytes([0x02; 32]), H256::ZERO],
            }],
        };
        let signed = SignedTransaction::new(
            TransactionBody::AccessList(tx),
            TxSignature::new(1, U256::from(3u64), U256::from(4u64)),
        );
        let raw = signed.encode();
        assert_eq!(raw[0], 0x01);
        assert_eq!(SignedTransaction::decode(&raw).unwrap(), signed);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(SignedTransaction::decode(&[]), Err(TxError::Empty));
        assert_eq!(
            SignedTransaction::decode(&[0x05, 0xc0]),
            Err(TxError::UnsupportedType(0x05))
        );
        assert!(matches!(
            SignedTransaction::decode(&[0x02, 0xc0]),
            Err(TxError::Rlp(DecoderError::RlpIncorrectListLen))
        ));

        let mut raw =
            SignedTransaction::new(TransactionBody::Legacy(LegacyTx::default()), sig()).encode();
        raw.push(0x00);
        assert!(matches!(SignedTransaction::decode(&raw), Err(TxError::Rlp(_))));
    }
}
