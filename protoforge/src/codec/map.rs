//! Protobuf map field support.
//!
//! Maps in protobuf are syntactic sugar for `repeated Entry { K key = 1; V value = 2; }`.
//! Each map entry is encoded as a length-delimited record with two fields.
//!
//! # Wire Format
//!
//! ```text
//! [field_tag, LEN] [entry_len] [key_tag=1, key_wire] [key_value] [value_tag=2, value_wire] [value_value]
//! ```
//!
//! # Valid Key Types
//!
//! Per protobuf spec, valid key types are: integral types, bool, string.
//! NOT valid: float, double, bytes, enum, messages.

use alloc::collections::BTreeMap;

#[cfg(feature = "std")]
use core::hash::{BuildHasher, Hash};
#[cfg(feature = "std")]
use std::collections::HashMap;

use bytes::BufMut;

use super::scalar::{
    Bool, Fixed32, Fixed64, Int32, Int64, Sfixed32, Sfixed64, Sint32, Sint64, Uint32, Uint64,
};
use super::delimited::Str;
use super::{decode_field, encode_field, encoded_field_len, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::reader::Reader;
use crate::wire::{encode_key, encode_varint, encoded_key_len, encoded_len_delimited_len, WireType};

const KEY_FIELD: u32 = 1;
const VALUE_FIELD: u32 = 2;

/// Marker trait for field kinds that can be used as protobuf map keys.
pub trait MapKey: ProtoEncode + ProtoDecode {}

impl MapKey for Int32 {}
impl MapKey for Int64 {}
impl MapKey for Uint32 {}
impl MapKey for Uint64 {}
impl MapKey for Sint32 {}
impl MapKey for Sint64 {}
impl MapKey for Fixed32 {}
impl MapKey for Fixed64 {}
impl MapKey for Sfixed32 {}
impl MapKey for Sfixed64 {}
impl MapKey for Bool {}
impl MapKey for Str {}

/// Storage for a protobuf map field.
///
/// Provides a unified interface for map fields, whether they use `BTreeMap` or `HashMap`.
pub trait ProtoMap<K, V>: Default {
    /// Inserts an entry, replacing any previous value for `key`.
    fn insert_entry(&mut self, key: K, value: V);

    /// Visits every entry in iteration order.
    fn for_each_entry<F: FnMut(&K, &V)>(&self, f: F);
}

impl<K: Ord, V> ProtoMap<K, V> for BTreeMap<K, V> {
    #[inline]
    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    #[inline]
    fn for_each_entry<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (key, value) in self {
            f(key, value);
        }
    }
}

#[cfg(feature = "std")]
impl<K: Eq + Hash, V, S: BuildHasher + Default> ProtoMap<K, V> for HashMap<K, V, S> {
    #[inline]
    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    #[inline]
    fn for_each_entry<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (key, value) in self {
            f(key, value);
        }
    }
}

/// Length of an entry body. Both fields are always written.
#[inline]
fn entry_len<K: MapKey, V: ProtoEncode>(key: &K::Value, value: &V::Value) -> usize {
    encoded_field_len::<K>(KEY_FIELD, key) + encoded_field_len::<V>(VALUE_FIELD, value)
}

/// Writes one length-delimited entry record per map entry.
pub fn encode_map<K, V, M, B>(number: u32, map: &M, buf: &mut B)
where
    K: MapKey,
    V: ProtoEncode,
    M: ProtoMap<K::Value, V::Value>,
    B: BufMut,
{
    map.for_each_entry(|key, value| {
        encode_key(WireType::Len, number, buf);
        encode_varint(entry_len::<K, V>(key, value) as u64, buf);
        encode_field::<K, B>(KEY_FIELD, key, buf);
        encode_field::<V, B>(VALUE_FIELD, value, buf);
    });
}

/// Length of [`encode_map`]'s output.
pub fn encoded_map_len<K, V, M>(number: u32, map: &M) -> usize
where
    K: MapKey,
    V: ProtoEncode,
    M: ProtoMap<K::Value, V::Value>,
{
    let mut len = 0;
    map.for_each_entry(|key, value| {
        len += encoded_key_len(number) + encoded_len_delimited_len(entry_len::<K, V>(key, value));
    });
    len
}

/// Decodes one map entry record and upserts it into `map`.
///
/// A missing key or value takes its kind's default. Later entries for the
/// same key replace earlier ones. Fields of an entry with an unexpected wire
/// type, or with numbers other than 1 and 2, are skipped.
pub fn decode_map_entry<K, V, M>(
    wire_type: WireType,
    reader: &mut Reader<'_>,
    map: &mut M,
) -> Result<(), DecodeError>
where
    K: MapKey,
    V: ProtoDecode,
    M: ProtoMap<K::Value, V::Value>,
{
    if wire_type != WireType::Len {
        return reader.skip_field(wire_type);
    }

    let mut entry = reader.read_delimited()?;
    let mut key = None;
    let mut value = None;
    while !entry.is_empty() {
        let entry_key = entry.read_key()?;
        let wire_type = entry_key.wire_type();
        match entry_key.field_number() {
            KEY_FIELD => {
                if let Some(decoded) = decode_field::<K>(wire_type, &mut entry)? {
                    key = Some(decoded);
                }
            }
            VALUE_FIELD => {
                if let Some(decoded) = decode_field::<V>(wire_type, &mut entry)? {
                    value = Some(decoded);
                }
            }
            _ => entry.skip_field(wire_type)?,
        }
    }

    map.insert_entry(key.unwrap_or_default(), value.unwrap_or_default());
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;
    use crate::kind;

    fn decode_all<K, V>(buf: &[u8]) -> BTreeMap<K::Value, V::Value>
    where
        K: MapKey,
        V: ProtoDecode,
        K::Value: Ord,
    {
        let mut reader = Reader::new(buf);
        let mut map = BTreeMap::new();
        while !reader.is_empty() {
            let key = reader.read_key().unwrap();
            decode_map_entry::<K, V, _>(key.wire_type(), &mut reader, &mut map).unwrap();
        }
        map
    }

    #[test]
    fn test_btreemap_roundtrip_string_i32() {
        let mut map = BTreeMap::new();
        map.insert(String::from("a"), 1);
        map.insert(String::from("b"), -2);
        map.insert(String::new(), 0);

        let mut buf = Vec::new();
        encode_map::<kind::Str, kind::Sint32, _, _>(5, &map, &mut buf);
        assert_eq!(buf.len(), encoded_map_len::<kind::Str, kind::Sint32, _>(5, &map));

        let decoded = decode_all::<kind::Str, kind::Sint32>(&buf);
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_entry_layout() {
        let mut map = BTreeMap::new();
        map.insert(String::from("k"), 1);

        let mut buf = Vec::new();
        encode_map::<kind::Str, kind::Int32, _, _>(1, &map, &mut buf);
        assert_eq!(buf, [0x0a, 0x05, 0x0a, 0x01, b'k', 0x10, 0x01]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let mut buf = Vec::new();
        for value in [1, 2, 3] {
            let mut map = BTreeMap::new();
            map.insert(7u32, value);
            encode_map::<kind::Uint32, kind::Uint32, _, _>(1, &map, &mut buf);
        }

        let decoded = decode_all::<kind::Uint32, kind::Uint32>(&buf);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[&7], 3);
    }

    #[test]
    fn test_missing_key_and_value_default() {
        // An empty entry, then an entry with only a value, then only a key.
        let buf = [0x0a, 0x00, 0x0a, 0x02, 0x10, 0x09, 0x0a, 0x02, 0x08, 0x04];
        let decoded = decode_all::<kind::Int64, kind::Int64>(&buf);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[&0], 9);
        assert_eq!(decoded[&4], 0);
    }

    #[test]
    fn test_unknown_entry_fields_are_skipped() {
        // key=1, a stray field 3, value=2 sent as fixed32 (mismatched, skipped).
        let buf = [
            0x0a, 0x09, 0x08, 0x01, 0x18, 0x05, 0x15, 0x01, 0x00, 0x00, 0x00,
        ];
        let decoded = decode_all::<kind::Int32, kind::Int32>(&buf);
        assert_eq!(decoded[&1], 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_hashmap_roundtrip() {
        let mut map: HashMap<bool, String> = HashMap::new();
        map.insert(true, String::from("yes"));
        map.insert(false, String::from("no"));

        let mut buf = Vec::new();
        encode_map::<kind::Bool, kind::Str, _, _>(3, &map, &mut buf);
        assert_eq!(buf.len(), encoded_map_len::<kind::Bool, kind::Str, _>(3, &map));

        let mut reader = Reader::new(&buf);
        let mut decoded: HashMap<bool, String> = HashMap::new();
        while !reader.is_empty() {
            let key = reader.read_key().unwrap();
            decode_map_entry::<kind::Bool, kind::Str, _>(key.wire_type(), &mut reader, &mut decoded)
                .unwrap();
        }
        assert_eq!(decoded, map);
    }
}
