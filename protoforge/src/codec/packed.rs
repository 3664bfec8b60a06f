//! Packed repeated fields.
//!
//! A packed field is a single length-delimited record whose payload is the
//! concatenation of the element encodings, without per-element keys. Only
//! kinds with a varint, `I32` or `I64` wire type can be packed. Decoding is
//! handled by [`super::decode_repeated`], which accepts both forms.

use bytes::BufMut;

use super::ProtoEncode;
use crate::wire::{encode_key, encode_varint, encoded_key_len, encoded_len_delimited_len, WireType};

#[inline]
fn packed_body_len<K: ProtoEncode>(values: &[K::Value]) -> usize {
    values.iter().map(K::encoded_len).sum()
}

/// Writes `values` as one packed record. Nothing is written for an empty
/// slice.
pub fn encode_packed<K: ProtoEncode, B: BufMut>(number: u32, values: &[K::Value], buf: &mut B) {
    debug_assert!(K::WIRE_TYPE.is_packable());
    if values.is_empty() {
        return;
    }
    encode_key(WireType::Len, number, buf);
    encode_varint(packed_body_len::<K>(values) as u64, buf);
    for value in values {
        K::encode(value, buf);
    }
}

/// Length of [`encode_packed`]'s output.
pub fn encoded_packed_len<K: ProtoEncode>(number: u32, values: &[K::Value]) -> usize {
    if values.is_empty() {
        return 0;
    }
    encoded_key_len(number) + encoded_len_delimited_len(packed_body_len::<K>(values))
}
