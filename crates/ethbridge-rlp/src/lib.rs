//! # ethbridge-rlp
//!
//! RLP (Recursive Length Prefix) encoding/decoding for ethbridge.
//!
//! RLP is the canonical binary encoding of everything this workspace
//! serializes: Ethereum transactions, execution results and the host
//! response envelope. This crate re-exports the `rlp` crate and adds the
//! handful of field helpers those encoders share.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

use bytes::Bytes;

// Re-export rlp crate for direct use
pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

// Re-export primitives with RLP support
pub use ethbridge_primitives::{Address, H256, U256};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}

/// Decode RLP bytes to a value, rejecting trailing data after the item
pub fn decode_exact<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    let rlp = Rlp::new(data);
    let info = rlp.payload_info()?;
    if info.header_len + info.value_len != data.len() {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    rlp.as_val()
}

/// Field helpers shared by the transaction and envelope encoders
pub mod utils {
    use super::*;

    struct ByteStr<'a>(&'a [u8]);

    impl Encodable for ByteStr<'_> {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(self.0);
        }
    }

    /// Append an opaque byte string.
    pub fn append_bytes(s: &mut RlpStream, data: &[u8]) {
        s.append(&ByteStr(data));
    }

    /// Decode the byte string at `index` of a list.
    pub fn bytes_at(rlp: &Rlp<'_>, index: usize) -> Result<Bytes, DecoderError> {
        let item = rlp.at(index)?;
        item.decoder().decode_value(|data| Ok(Bytes::copy_from_slice(data)))
    }

    /// Append a recipient; `None` (contract creation) encodes as the
    /// empty string.
    pub fn append_optional_address(s: &mut RlpStream, to: Option<&Address>) {
        match to {
            Some(addr) => {
                s.append(addr);
            }
            None => {
                s.append_empty_data();
            }
        }
    }

    /// Decode a recipient written by [`append_optional_address`].
    pub fn optional_address_at(
        rlp: &Rlp<'_>,
        index: usize,
    ) -> Result<Option<Address>, DecoderError> {
        let item = rlp.at(index)?;
        if item.is_empty() {
            Ok(None)
        } else {
            item.as_val().map(Some)
        }
    }

    /// Ensure `rlp` is a list of exactly `expected` items.
    pub fn expect_list(rlp: &Rlp<'_>, expected: usize) -> Result<(), DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        if rlp.item_count()? != expected {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(())
    }
}
