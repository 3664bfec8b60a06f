//! Enum field kind.

use core::marker::PhantomData;

use bytes::BufMut;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::reader::Reader;
use crate::wire::WireType;

/// Trait for generated protobuf enums.
///
/// Conversion from a number is total: numbers without a declared variant are
/// kept as-is (generated enums carry an `Unrecognized(i32)` variant) so they
/// survive a decode/encode round trip. Values are identified by their number,
/// so `Unrecognized(n)` for a declared `n` equals that variant.
pub trait ProtoEnum: Copy + Default + PartialEq {
    fn to_i32(self) -> i32;

    fn from_i32(value: i32) -> Self;
}

/// An enum field, encoded like `int32`.
pub struct Enum<E>(PhantomData<E>);

impl<E: ProtoEnum> ProtoType for Enum<E> {
    type Value = E;
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl<E: ProtoEnum> ProtoEncode for Enum<E> {
    #[inline]
    fn encode<B: BufMut>(value: &E, buf: &mut B) {
        (i64::from(value.to_i32()) as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(value: &E) -> usize {
        (i64::from(value.to_i32()) as u64).encoded_leb128_len()
    }

    /// The default is the first declared value.
    #[inline]
    fn is_default(value: &E) -> bool {
        value.to_i32() == E::default().to_i32()
    }
}

impl<E: ProtoEnum> ProtoDecode for Enum<E> {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<E, DecodeError> {
        Ok(E::from_i32(reader.read_varint()? as i32))
    }
}
