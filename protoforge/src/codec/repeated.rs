//! Unpacked repeated fields, and the decoder shared by both forms.

use alloc::vec::Vec;

use bytes::BufMut;

use super::{encode_field, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::reader::Reader;
use crate::wire::{encoded_key_len, WireType};

/// Writes one keyed record per element.
pub fn encode_repeated<K: ProtoEncode, B: BufMut>(number: u32, values: &[K::Value], buf: &mut B) {
    for value in values {
        encode_field::<K, B>(number, value, buf);
    }
}

/// Length of [`encode_repeated`]'s output.
pub fn encoded_repeated_len<K: ProtoEncode>(number: u32, values: &[K::Value]) -> usize {
    encoded_key_len(number) * values.len() + values.iter().map(K::encoded_len).sum::<usize>()
}

/// Decodes one occurrence of a repeated field and appends to `values`.
///
/// A record with the element's own wire type is a single unpacked element.
/// A length-delimited record for a packable kind is a packed block and is
/// decoded until exhausted. Anything else is skipped. Both encodings may be
/// mixed within one message.
pub fn decode_repeated<K: ProtoDecode>(
    wire_type: WireType,
    reader: &mut Reader<'_>,
    values: &mut Vec<K::Value>,
) -> Result<(), DecodeError> {
    if wire_type == K::WIRE_TYPE {
        values.push(K::decode(reader)?);
    } else if wire_type == WireType::Len && K::WIRE_TYPE.is_packable() {
        let mut block = reader.read_delimited()?;
        while !block.is_empty() {
            values.push(K::decode(&mut block)?);
        }
    } else {
        reader.skip_field(wire_type)?;
    }
    Ok(())
}
