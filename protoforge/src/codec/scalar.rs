//! Numeric and boolean field kinds.

use bytes::BufMut;

use crate::codec::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::reader::Reader;
use crate::wire::{
    zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64, WireType,
};

macro_rules! scalar_kind {
    ($(#[$meta:meta])* $name:ident, $value:ty, $wire:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ProtoType for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::$wire;
        }
    };
}

scalar_kind!(
    /// `int32`: varint, negative values sign-extended to ten bytes.
    Int32, i32, Varint
);
scalar_kind!(
    /// `int64`: varint of the two's complement bits.
    Int64, i64, Varint
);
scalar_kind!(
    /// `uint32`: varint.
    Uint32, u32, Varint
);
scalar_kind!(
    /// `uint64`: varint.
    Uint64, u64, Varint
);
scalar_kind!(
    /// `sint32`: zigzag varint.
    Sint32, i32, Varint
);
scalar_kind!(
    /// `sint64`: zigzag varint.
    Sint64, i64, Varint
);
scalar_kind!(
    /// `fixed32`: four little-endian bytes.
    Fixed32, u32, I32
);
scalar_kind!(
    /// `fixed64`: eight little-endian bytes.
    Fixed64, u64, I64
);
scalar_kind!(
    /// `sfixed32`: four little-endian bytes, two's complement.
    Sfixed32, i32, I32
);
scalar_kind!(
    /// `sfixed64`: eight little-endian bytes, two's complement.
    Sfixed64, i64, I64
);
scalar_kind!(
    /// `bool`: a one byte varint on encode, any non-zero varint on decode.
    Bool, bool, Varint
);
scalar_kind!(
    /// `float`: IEEE-754 bits through the `fixed32` encoding.
    Float, f32, I32
);
scalar_kind!(
    /// `double`: IEEE-754 bits through the `fixed64` encoding.
    Double, f64, I64
);

impl ProtoEncode for Int32 {
    #[inline]
    fn encode<B: BufMut>(value: &i32, buf: &mut B) {
        // Negative values are sign-extended to 64 bits.
        (i64::from(*value) as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &i32) -> usize {
        (i64::from(*value) as u64).encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &i32) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Int32 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i32, DecodeError> {
        // Truncation to the low 32 bits matches every other implementation.
        Ok(reader.read_varint()? as i32)
    }
}

impl ProtoEncode for Int64 {
    #[inline]
    fn encode<B: BufMut>(value: &i64, buf: &mut B) {
        (*value as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &i64) -> usize {
        (*value as u64).encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &i64) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Int64 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i64, DecodeError> {
        Ok(reader.read_varint()? as i64)
    }
}

impl ProtoEncode for Uint32 {
    #[inline]
    fn encode<B: BufMut>(value: &u32, buf: &mut B) {
        value.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &u32) -> usize {
        value.encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &u32) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Uint32 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<u32, DecodeError> {
        Ok(reader.read_varint()? as u32)
    }
}

impl ProtoEncode for Uint64 {
    #[inline]
    fn encode<B: BufMut>(value: &u64, buf: &mut B) {
        value.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &u64) -> usize {
        value.encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &u64) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Uint64 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<u64, DecodeError> {
        reader.read_varint()
    }
}

impl ProtoEncode for Sint32 {
    #[inline]
    fn encode<B: BufMut>(value: &i32, buf: &mut B) {
        zigzag_encode_32(*value).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &i32) -> usize {
        zigzag_encode_32(*value).encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &i32) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Sint32 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i32, DecodeError> {
        Ok(zigzag_decode_32(reader.read_varint()? as u32))
    }
}

impl ProtoEncode for Sint64 {
    #[inline]
    fn encode<B: BufMut>(value: &i64, buf: &mut B) {
        zigzag_encode_64(*value).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &i64) -> usize {
        zigzag_encode_64(*value).encoded_leb128_len()
    }

    #[inline]
    fn is_default(value: &i64) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Sint64 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i64, DecodeError> {
        Ok(zigzag_decode_64(reader.read_varint()?))
    }
}

impl ProtoEncode for Fixed32 {
    #[inline]
    fn encode<B: BufMut>(value: &u32, buf: &mut B) {
        buf.put_u32_le(*value);
    }

    #[inline]
    fn encoded_len(_: &u32) -> usize {
        4
    }

    #[inline]
    fn is_default(value: &u32) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Fixed32 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<u32, DecodeError> {
        reader.read_fixed32()
    }
}

impl ProtoEncode for Fixed64 {
    #[inline]
    fn encode<B: BufMut>(value: &u64, buf: &mut B) {
        buf.put_u64_le(*value);
    }

    #[inline]
    fn encoded_len(_: &u64) -> usize {
        8
    }

    #[inline]
    fn is_default(value: &u64) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Fixed64 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<u64, DecodeError> {
        reader.read_fixed64()
    }
}

impl ProtoEncode for Sfixed32 {
    #[inline]
    fn encode<B: BufMut>(value: &i32, buf: &mut B) {
        buf.put_i32_le(*value);
    }

    #[inline]
    fn encoded_len(_: &i32) -> usize {
        4
    }

    #[inline]
    fn is_default(value: &i32) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Sfixed32 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i32, DecodeError> {
        Ok(reader.read_fixed32()? as i32)
    }
}

impl ProtoEncode for Sfixed64 {
    #[inline]
    fn encode<B: BufMut>(value: &i64, buf: &mut B) {
        buf.put_i64_le(*value);
    }

    #[inline]
    fn encoded_len(_: &i64) -> usize {
        8
    }

    #[inline]
    fn is_default(value: &i64) -> bool {
        *value == 0
    }
}

impl ProtoDecode for Sfixed64 {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<i64, DecodeError> {
        Ok(reader.read_fixed64()? as i64)
    }
}

impl ProtoEncode for Bool {
    #[inline]
    fn encode<B: BufMut>(value: &bool, buf: &mut B) {
        buf.put_u8(u8::from(*value));
    }

    #[inline]
    fn encoded_len(_: &bool) -> usize {
        1
    }

    #[inline]
    fn is_default(value: &bool) -> bool {
        !*value
    }
}

impl ProtoDecode for Bool {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<bool, DecodeError> {
        Ok(reader.read_varint()? != 0)
    }
}

// Floats compare by bit pattern so that `-0.0` is still written.
impl ProtoEncode for Float {
    #[inline]
    fn encode<B: BufMut>(value: &f32, buf: &mut B) {
        buf.put_u32_le(value.to_bits());
    }

    #[inline]
    fn encoded_len(_: &f32) -> usize {
        4
    }

    #[inline]
    fn is_default(value: &f32) -> bool {
        value.to_bits() == 0
    }
}

impl ProtoDecode for Float {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(reader.read_fixed32()?))
    }
}

impl ProtoEncode for Double {
    #[inline]
    fn encode<B: BufMut>(value: &f64, buf: &mut B) {
        buf.put_u64_le(value.to_bits());
    }

    #[inline]
    fn encoded_len(_: &f64) -> usize {
        8
    }

    #[inline]
    fn is_default(value: &f64) -> bool {
        value.to_bits() == 0
    }
}

impl ProtoDecode for Double {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(reader.read_fixed64()?))
    }
}
