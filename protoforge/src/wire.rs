//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).
//!
//! Everything here is schema-agnostic. Decoding lives on [`crate::Reader`]
//! so that every failure can report the byte offset it happened at.

use core::ops::RangeInclusive;

use bytes::BufMut;

use crate::error::DecodeErrorKind;
use crate::leb128::LebCodec;
use crate::util::unlikely;

/// Minimum value of a protobuf field number.
pub const MINIMUM_FIELD_NUMBER: u32 = 1;
/// Maximum value of a protobuf field number.
pub const MAXIMUM_FIELD_NUMBER: u32 = (1 << 29) - 1;
/// Field numbers reserved for the protobuf implementation itself.
pub const RESERVED_FIELD_NUMBERS: RangeInclusive<u32> = 19_000..=19_999;

/// Denotes the type of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value pairs. When encoded each key-value pair
/// is turned into a record consisting of a field number, a [`WireType`], and a payload.
/// The [`WireType`] indicates how large the proceeding payload is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, `enum`.
    Varint = 0,
    /// 64-bit little-endian value.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Length-delimited payload.
    ///
    /// Used for: `string`, `bytes`, `message`, packed `repeated` fields, map entries.
    Len = 2,
    /// Group start (deprecated, rejected).
    SGroup = 3,
    /// Group end (deprecated, rejected).
    EGroup = 4,
    /// 32-bit little-endian value.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

impl WireType {
    /// Return the raw value for this [`WireType`].
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }

    /// Whether repeated values of this wire type may be packed into a single
    /// length-delimited block.
    #[inline]
    pub const fn is_packable(self) -> bool {
        matches!(self, WireType::Varint | WireType::I64 | WireType::I32)
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeErrorKind;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeErrorKind> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            other => Err(DecodeErrorKind::InvalidWireType(other)),
        }
    }
}

/// A decoded protobuf field key: a field number and a wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoKey {
    field_number: u32,
    wire_type: WireType,
}

impl ProtoKey {
    /// Creates a new [`ProtoKey`] from a raw key value, validating the wire
    /// type and field number.
    #[inline]
    pub fn try_from_raw(raw_key: u64) -> Result<Self, DecodeErrorKind> {
        // Only the low three bits carry the wire type.
        let wire_type = WireType::try_from((raw_key & 0b111) as u8)?;

        let field_number = raw_key >> 3;
        if unlikely(field_number == 0 || field_number > u64::from(MAXIMUM_FIELD_NUMBER)) {
            return Err(DecodeErrorKind::InvalidFieldNumber(field_number));
        }

        Ok(ProtoKey {
            field_number: field_number as u32,
            wire_type,
        })
    }

    /// Returns the [`WireType`] component of this key.
    #[inline(always)]
    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }

    /// Returns the field number component of this key.
    #[inline(always)]
    pub const fn field_number(self) -> u32 {
        self.field_number
    }

    /// Decomposes this key into its [`WireType`] and field number.
    #[inline(always)]
    pub const fn into_parts(self) -> (WireType, u32) {
        (self.wire_type, self.field_number)
    }
}

/// Encodes the provided field number and wire_type as a protobuf field key.
///
/// See <https://protobuf.dev/programming-guides/encoding>.
/// under the "Message Structure" section.
#[inline(always)]
pub fn encode_key<B: BufMut>(wire_type: WireType, field_number: u32, buf: &mut B) {
    debug_assert!(
        (MINIMUM_FIELD_NUMBER..=MAXIMUM_FIELD_NUMBER).contains(&field_number),
        "field number {field_number} out of range"
    );
    let key = (field_number << 3) | u32::from(wire_type.into_val());
    key.encode_leb128(buf);
}

/// Returns the encoded length of a field key.
#[inline(always)]
pub fn encoded_key_len(field_number: u32) -> usize {
    // The wire type only occupies the low three bits so it never changes the
    // length of the key.
    (field_number << 3).encoded_leb128_len()
}

/// Writes `value` as a varint.
#[inline(always)]
pub fn encode_varint<B: BufMut>(value: u64, buf: &mut B) {
    value.encode_leb128(buf);
}

/// Number of bytes [`encode_varint`] writes for `value`, 1..=10.
#[inline(always)]
pub fn encoded_varint_len(value: u64) -> usize {
    value.encoded_leb128_len()
}

/// Decodes a varint from the front of `data`, returning the value and the
/// number of bytes consumed.
#[inline]
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize), DecodeErrorKind> {
    u64::decode_leb128(data)
}

/// Maps signed integers onto unsigned ones so that small magnitudes stay
/// small: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
#[inline(always)]
pub const fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
#[inline(always)]
pub const fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[inline(always)]
pub const fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline(always)]
pub const fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

#[inline(always)]
pub fn encode_fixed32<B: BufMut>(value: u32, buf: &mut B) {
    buf.put_u32_le(value);
}

#[inline(always)]
pub fn encode_fixed64<B: BufMut>(value: u64, buf: &mut B) {
    buf.put_u64_le(value);
}

/// Writes `varint(payload.len()) ++ payload`.
#[inline]
pub fn encode_len_delimited<B: BufMut>(payload: &[u8], buf: &mut B) {
    encode_varint(payload.len() as u64, buf);
    buf.put_slice(payload);
}

/// Encoded length of a length-delimited value whose payload is `payload_len`
/// bytes long, prefix included.
#[inline(always)]
pub fn encoded_len_delimited_len(payload_len: usize) -> usize {
    encoded_varint_len(payload_len as u64) + payload_len
}

#[cfg(test)]
mod test {
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use proptest::property_test;

    use super::*;

    #[test]
    fn proptest_key_roundtrips() {
        fn arb_field_number() -> impl Strategy<Value = u32> {
            MINIMUM_FIELD_NUMBER..=MAXIMUM_FIELD_NUMBER
        }

        fn arb_wiretype() -> impl Strategy<Value = WireType> {
            prop_oneof![
                Just(WireType::Varint),
                Just(WireType::I64),
                Just(WireType::Len),
                Just(WireType::I32),
            ]
        }

        fn test(field_number: u32, wire_type: WireType) {
            let mut buf = Vec::with_capacity(16);
            encode_key(wire_type, field_number, &mut buf);
            assert_eq!(buf.len(), encoded_key_len(field_number));

            let (raw, _) = decode_varint(&buf).unwrap();
            let (rnd_wire_type, rnd_field_number) =
                ProtoKey::try_from_raw(raw).unwrap().into_parts();

            assert_eq!(field_number, rnd_field_number);
            assert_eq!(wire_type, rnd_wire_type);
        }

        let strat = (arb_field_number(), arb_wiretype());
        proptest!(|((field_number, wire_type) in strat)| test(field_number, wire_type))
    }

    #[test]
    fn test_all_valid_values() {
        for i in u8::MIN..u8::MAX {
            let wire_type = WireType::try_from(i);
            match (i, wire_type) {
                (0, Ok(WireType::Varint))
                | (1, Ok(WireType::I64))
                | (2, Ok(WireType::Len))
                | (3, Ok(WireType::SGroup))
                | (4, Ok(WireType::EGroup))
                | (5, Ok(WireType::I32)) => (),
                (_, Err(DecodeErrorKind::InvalidWireType(v))) => assert_eq!(v, i),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn key_layout() {
        let mut buf = Vec::new();
        encode_key(WireType::Varint, 1, &mut buf);
        assert_eq!(buf, [0x08]);

        buf.clear();
        encode_key(WireType::Len, 2, &mut buf);
        assert_eq!(buf, [0x12]);

        // Field 16 is the first to need a two byte key.
        assert_eq!(encoded_key_len(15), 1);
        assert_eq!(encoded_key_len(16), 2);
        assert_eq!(encoded_key_len(MAXIMUM_FIELD_NUMBER), 5);
    }

    #[test]
    fn invalid_keys() {
        assert_eq!(
            ProtoKey::try_from_raw(0),
            Err(DecodeErrorKind::InvalidFieldNumber(0))
        );
        assert_eq!(
            ProtoKey::try_from_raw((1 << 3) | 6),
            Err(DecodeErrorKind::InvalidWireType(6))
        );
        let too_big = u64::from(MAXIMUM_FIELD_NUMBER) + 1;
        assert_eq!(
            ProtoKey::try_from_raw(too_big << 3),
            Err(DecodeErrorKind::InvalidFieldNumber(too_big))
        );
    }

    #[test]
    fn zigzag_known_values() {
        assert_eq!(zigzag_encode_64(0), 0);
        assert_eq!(zigzag_encode_64(-1), 1);
        assert_eq!(zigzag_encode_64(1), 2);
        assert_eq!(zigzag_encode_64(-2), 3);
        assert_eq!(zigzag_encode_64(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag_encode_64(i64::MIN), u64::MAX);

        assert_eq!(zigzag_encode_32(-2), 3);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_decode_32(3), -2);
    }

    #[property_test]
    fn proptest_zigzag_64(value: i64) {
        prop_assert_eq!(zigzag_decode_64(zigzag_encode_64(value)), value);
        if value.unsigned_abs() < 64 {
            prop_assert_eq!(encoded_varint_len(zigzag_encode_64(value)), 1);
        }
    }

    #[property_test]
    fn proptest_zigzag_32_matches_64(value: i32) {
        prop_assert_eq!(
            u64::from(zigzag_encode_32(value)),
            zigzag_encode_64(i64::from(value))
        );
        prop_assert_eq!(zigzag_decode_32(zigzag_encode_32(value)), value);
    }

    #[property_test]
    fn proptest_varint_roundtrip(value: u64) {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        prop_assert_eq!(buf.len(), encoded_varint_len(value));
        prop_assert_eq!(decode_varint(&buf), Ok((value, buf.len())));
    }

    #[test]
    fn len_delimited_layout() {
        let mut buf = Vec::new();
        encode_len_delimited(b"hi", &mut buf);
        assert_eq!(buf, [0x02, b'h', b'i']);
        assert_eq!(encoded_len_delimited_len(2), 3);
        assert_eq!(encoded_len_delimited_len(128), 130);
    }
}
