//! The host ledger's generic per-message response envelope
//!
//! A host transaction may carry heterogeneous messages, so its execution
//! outcome is a list of opaque entries, one per processed message, in
//! processing order. Each entry names its payload kind with a type URL;
//! readers look entries up by kind instead of by position.
//!
//! Canonical encoding: `rlp([[type_url, value], ...])`.

use bytes::Bytes;
use ethbridge_rlp::{self as rlp, utils, Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::error::EnvelopeError;

/// A response payload that can be packed into a [`TypedEntry`]
pub trait TypedMessage: Encodable + Decodable {
    /// Type discriminator written into the envelope
    const TYPE_URL: &'static str;
}

/// One opaque, tagged response in an envelope
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedEntry {
    /// Type discriminator of the payload
    pub type_url: String,
    /// Encoded payload
    pub value: Bytes,
}

impl TypedEntry {
    /// Create an entry from raw parts
    pub fn new(type_url: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }

    /// Pack a typed message
    pub fn pack<T: TypedMessage>(msg: &T) -> Self {
        Self::new(T::TYPE_URL, rlp::encode(msg))
    }

    /// Whether this entry holds a `T`
    pub fn is<T: TypedMessage>(&self) -> bool {
        self.type_url == T::TYPE_URL
    }

    /// Unpack the payload as a `T`
    pub fn unpack<T: TypedMessage>(&self) -> Result<T, EnvelopeError> {
        if !self.is::<T>() {
            return Err(EnvelopeError::TypeMismatch {
                expected: T::TYPE_URL,
                found: self.type_url.clone(),
            });
        }
        rlp::decode_exact(&self.value).map_err(|source| EnvelopeError::Unpack {
            type_url: self.type_url.clone(),
            source,
        })
    }
}

impl Encodable for TypedEntry {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.type_url);
        utils::append_bytes(s, &self.value);
    }
}

impl Decodable for TypedEntry {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        utils::expect_list(rlp, 2)?;
        Ok(Self {
            type_url: rlp.val_at(0)?,
            value: utils::bytes_at(rlp, 1)?,
        })
    }
}

/// Ordered per-message responses of one host transaction
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ResponseEnvelope {
    /// Entries in message processing order
    pub entries: Vec<TypedEntry>,
}

impl ResponseEnvelope {
    /// Create an empty envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a typed response
    pub fn push<T: TypedMessage>(&mut self, msg: &T) {
        self.entries.push(TypedEntry::pack(msg));
    }

    /// Append an already packed entry
    pub fn push_entry(&mut self, entry: TypedEntry) {
        self.entries.push(entry);
    }

    /// First entry holding a `T`
    pub fn find<T: TypedMessage>(&self) -> Option<&TypedEntry> {
        self.entries.iter().find(|entry| entry.is::<T>())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the envelope has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical bytes of the envelope
    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self)
    }

    /// Read an envelope from its canonical bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        rlp::decode_exact(bytes).map_err(EnvelopeError::Decode)
    }
}

impl Encodable for ResponseEnvelope {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append_list::<TypedEntry, _>(&self.entries);
    }
}

impl Decodable for ResponseEnvelope {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        Ok(Self {
            entries: rlp.as_list()?,
        })
    }
}
