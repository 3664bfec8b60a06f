//! Encoding and decoding traits for protobuf wire format.
//!
//! Field kinds are modelled as zero-sized marker types (see [`crate::kind`])
//! implementing [`ProtoEncode`] and [`ProtoDecode`], so that kinds sharing a
//! Rust value type (`int32`, `sint32` and `sfixed32` are all `i32`) still get
//! distinct wire encodings. Generated message code calls the free functions
//! in this module with the marker for each field.

pub(crate) mod delimited;
pub(crate) mod enumeration;
mod map;
pub(crate) mod message;
mod packed;
mod repeated;
pub(crate) mod scalar;

use bytes::BufMut;

use crate::error::DecodeError;
use crate::reader::Reader;
use crate::wire::{encode_key, encoded_key_len, WireType};

pub use enumeration::ProtoEnum;
pub use map::{decode_map_entry, encode_map, encoded_map_len, MapKey, ProtoMap};
pub use message::ProtoMessage;
pub use packed::{encode_packed, encoded_packed_len};
pub use repeated::{decode_repeated, encode_repeated, encoded_repeated_len};

pub trait ProtoType {
    /// The Rust type values of this kind are stored as.
    type Value: Default;

    /// The wire type a single value of this kind is encoded with.
    const WIRE_TYPE: WireType;
}

/// A field kind that can be decoded from protobuf wire format.
pub trait ProtoDecode: ProtoType {
    /// Decode one value, without its key.
    fn decode(reader: &mut Reader<'_>) -> Result<Self::Value, DecodeError>;
}

/// A field kind that can be encoded to protobuf wire format.
pub trait ProtoEncode: ProtoType {
    /// Encode one value, without its key.
    fn encode<B: BufMut>(value: &Self::Value, buf: &mut B);

    /// Returns the encoded length of `value` (not including the field key).
    fn encoded_len(value: &Self::Value) -> usize;

    /// Returns true if `value` is the protobuf default for this kind, i.e.
    /// an implicit-presence field holding it is not written.
    fn is_default(value: &Self::Value) -> bool;
}

/// See [`ProtoEncode::is_default`].
#[inline]
pub fn is_default<K: ProtoEncode>(value: &K::Value) -> bool {
    K::is_default(value)
}

/// Writes the key for `number` followed by `value`.
#[inline]
pub fn encode_field<K: ProtoEncode, B: BufMut>(number: u32, value: &K::Value, buf: &mut B) {
    encode_key(K::WIRE_TYPE, number, buf);
    K::encode(value, buf);
}

/// Length of [`encode_field`]'s output.
#[inline]
pub fn encoded_field_len<K: ProtoEncode>(number: u32, value: &K::Value) -> usize {
    encoded_key_len(number) + K::encoded_len(value)
}

/// Decodes one value of kind `K` for a field whose key carried `wire_type`.
///
/// If the wire type does not match the kind, the value is skipped and `None`
/// is returned; a known field number with an unexpected encoding is treated
/// like an unknown field.
#[inline]
pub fn decode_field<K: ProtoDecode>(
    wire_type: WireType,
    reader: &mut Reader<'_>,
) -> Result<Option<K::Value>, DecodeError> {
    if wire_type != K::WIRE_TYPE {
        reader.skip_field(wire_type)?;
        return Ok(None);
    }
    K::decode(reader).map(Some)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::kind;

    #[test]
    fn mismatched_wire_type_is_skipped() {
        // A fixed32 where a varint was expected, followed by a trailing byte.
        let data = [0x01, 0x02, 0x03, 0x04, 0x63];
        let mut reader = Reader::new(&data);
        let value = decode_field::<kind::Int32>(WireType::I32, &mut reader).unwrap();
        assert_eq!(value, None);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn field_with_key() {
        let mut buf = Vec::new();
        encode_field::<kind::Int32, _>(1, &300, &mut buf);
        assert_eq!(buf, [0x08, 0xAC, 0x02]);
        assert_eq!(encoded_field_len::<kind::Int32>(1, &300), 3);

        buf.clear();
        encode_field::<kind::Sint32, _>(1, &-2, &mut buf);
        assert_eq!(buf, [0x08, 0x03]);
    }
}
