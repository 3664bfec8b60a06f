//! Message-level traits and the embedded message field kind.

use alloc::vec::Vec;
use core::marker::PhantomData;

use bytes::BufMut;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::reader::Reader;
use crate::wire::{encode_varint, encoded_len_delimited_len, WireType};

/// Trait for protobuf message types.
///
/// This trait is implemented by generated message structs. The required
/// methods operate on the message body (without length prefix); the
/// [`Message`] field kind adds the prefix for embedded messages.
pub trait ProtoMessage: Default {
    /// Decode a message body, consuming everything left in `reader`.
    fn decode_message(reader: &mut Reader<'_>) -> Result<Self, DecodeError>;

    /// Encode the message body (without length prefix).
    fn encode_message<B: BufMut>(&self, buf: &mut B);

    /// Returns the exact encoded length of the message body.
    fn encoded_message_len(&self) -> usize;

    /// Decode a complete message from `buf`.
    fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_message(&mut Reader::new(buf))
    }

    /// Encode the message into a freshly allocated buffer of exactly
    /// [`ProtoMessage::encoded_message_len`] bytes.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_message_len());
        self.encode_message(&mut buf);
        buf
    }

    /// Encode the message with its own length prefix.
    fn encode_length_delimited<B: BufMut>(&self, buf: &mut B) {
        Message::<Self>::encode(self, buf);
    }
}

/// An embedded message field: `varint(size) ++ body`.
pub struct Message<M>(PhantomData<M>);

impl<M: ProtoMessage> ProtoType for Message<M> {
    type Value = M;
    const WIRE_TYPE: WireType = WireType::Len;
}

impl<M: ProtoMessage> ProtoEncode for Message<M> {
    #[inline]
    fn encode<B: BufMut>(value: &M, buf: &mut B) {
        encode_varint(value.encoded_message_len() as u64, buf);
        value.encode_message(buf);
    }

    #[inline]
    fn encoded_len(value: &M) -> usize {
        encoded_len_delimited_len(value.encoded_message_len())
    }

    /// Message fields always have explicit presence, so no value is elided.
    #[inline]
    fn is_default(_: &M) -> bool {
        false
    }
}

impl<M: ProtoMessage> ProtoDecode for Message<M> {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<M, DecodeError> {
        let mut nested = reader.read_nested()?;
        M::decode_message(&mut nested)
    }
}
