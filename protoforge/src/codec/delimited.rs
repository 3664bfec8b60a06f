//! Length-delimited field kinds: `string` and `bytes`.

use alloc::string::String;

use bytes::BufMut;

use crate::codec::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::{DecodeError, DecodeErrorKind};
use crate::reader::Reader;
use crate::wire::{encode_len_delimited, encoded_len_delimited_len, WireType};

/// `string`: UTF-8 validated on decode.
#[derive(Debug, Clone, Copy)]
pub struct Str;

/// `bytes`: an opaque payload held as [`bytes::Bytes`].
#[derive(Debug, Clone, Copy)]
pub struct Bytes;

impl ProtoType for Str {
    type Value = String;
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoEncode for Str {
    #[inline]
    fn encode<B: BufMut>(value: &String, buf: &mut B) {
        encode_len_delimited(value.as_bytes(), buf);
    }

    #[inline]
    fn encoded_len(value: &String) -> usize {
        encoded_len_delimited_len(value.len())
    }

    #[inline]
    fn is_default(value: &String) -> bool {
        value.is_empty()
    }
}

impl ProtoDecode for Str {
    fn decode(reader: &mut Reader<'_>) -> Result<String, DecodeError> {
        let payload = reader.read_bytes_delimited()?;
        match core::str::from_utf8(payload) {
            Ok(s) => Ok(String::from(s)),
            Err(err) => {
                // Point at the first invalid byte.
                let start = reader.offset() - payload.len();
                Err(DecodeError::new(
                    DecodeErrorKind::InvalidUtf8,
                    start + err.valid_up_to(),
                ))
            }
        }
    }
}

impl ProtoType for Bytes {
    type Value = bytes::Bytes;
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoEncode for Bytes {
    #[inline]
    fn encode<B: BufMut>(value: &bytes::Bytes, buf: &mut B) {
        encode_len_delimited(value, buf);
    }

    #[inline]
    fn encoded_len(value: &bytes::Bytes) -> usize {
        encoded_len_delimited_len(value.len())
    }

    #[inline]
    fn is_default(value: &bytes::Bytes) -> bool {
        value.is_empty()
    }
}

impl ProtoDecode for Bytes {
    #[inline]
    fn decode(reader: &mut Reader<'_>) -> Result<bytes::Bytes, DecodeError> {
        let payload = reader.read_bytes_delimited()?;
        Ok(bytes::Bytes::copy_from_slice(payload))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let value = String::from("hello, wörld");
        let mut buf = Vec::new();
        Str::encode(&value, &mut buf);
        assert_eq!(buf.len(), Str::encoded_len(&value));
        assert_eq!(usize::from(buf[0]), value.len());

        let decoded = Str::decode(&mut Reader::new(&buf)).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_invalid_utf8() {
        // Two valid bytes followed by a lone continuation byte.
        let data = [0x03, b'o', b'k', 0x80];
        let err = Str::decode(&mut Reader::new(&data)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidUtf8);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn test_bytes() {
        let value = bytes::Bytes::from_static(&[0, 1, 2, 0xff]);
        let mut buf = Vec::new();
        Bytes::encode(&value, &mut buf);
        assert_eq!(buf, [4, 0, 1, 2, 0xff]);
        assert_eq!(Bytes::decode(&mut Reader::new(&buf)).unwrap(), value);
        assert!(Bytes::is_default(&bytes::Bytes::new()));
    }

    #[test]
    fn test_truncated_payload() {
        let data = [0x04, b'a'];
        let err = Bytes::decode(&mut Reader::new(&data)).unwrap_err();
        assert_eq!(
            err.kind(),
            DecodeErrorKind::LengthOutOfRange {
                len: 4,
                remaining: 1
            }
        );
    }
}
