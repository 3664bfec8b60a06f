//! Forward-only decode cursor.

use bytes::Buf;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::leb128::LebCodec;
use crate::util::likely;
use crate::wire::{ProtoKey, WireType};

/// Maximum depth of nested messages a single decode call will follow.
pub const RECURSION_LIMIT: u32 = 100;

/// A cursor over an encoded message.
///
/// Every read advances the cursor; nothing is ever re-read. Length-delimited
/// payloads are decoded through child readers that borrow a sub-slice but
/// keep reporting offsets relative to the outermost buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Absolute offset of `buf[0]`.
    base: usize,
    depth: u32,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader {
            buf,
            pos: 0,
            base: 0,
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Absolute offset of the next unread byte.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Number of enclosing messages this reader is nested in.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline(always)]
    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.offset())
    }

    /// Consumes exactly `len` bytes.
    #[inline]
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(self.error(DecodeErrorKind::Truncated));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let rest = &self.buf[self.pos..];
        if let Some(&b) = rest.first() {
            if likely(b < 0x80) {
                self.pos += 1;
                return Ok(u64::from(b));
            }
        }
        let (value, len) = u64::decode_leb128(rest).map_err(|kind| self.error(kind))?;
        self.pos += len;
        Ok(value)
    }

    #[inline]
    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_u32_le())
    }

    #[inline]
    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_u64_le())
    }

    /// Reads and validates a field key.
    #[inline]
    pub fn read_key(&mut self) -> Result<ProtoKey, DecodeError> {
        let start = self.offset();
        let raw = self.read_varint()?;
        ProtoKey::try_from_raw(raw).map_err(|kind| DecodeError::new(kind, start))
    }

    /// Reads the length prefix of a length-delimited value and checks that
    /// the payload fits in what remains.
    #[inline]
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let start = self.offset();
        let len = self.read_varint()?;
        match usize::try_from(len) {
            Ok(len) if len <= self.remaining() => Ok(len),
            _ => Err(DecodeError::new(
                DecodeErrorKind::LengthOutOfRange {
                    len,
                    remaining: self.remaining(),
                },
                start,
            )),
        }
    }

    /// Reads a length-delimited payload as raw bytes.
    #[inline]
    pub fn read_bytes_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Reads a length-delimited payload and returns a reader over it at the
    /// same nesting depth. Used for packed blocks and map entries.
    #[inline]
    pub fn read_delimited(&mut self) -> Result<Reader<'a>, DecodeError> {
        let len = self.read_len()?;
        let base = self.offset();
        let buf = self.take(len)?;
        Ok(Reader {
            buf,
            pos: 0,
            base,
            depth: self.depth,
        })
    }

    /// Like [`Reader::read_delimited`], but for an embedded message: the child
    /// is one level deeper and the call fails past [`RECURSION_LIMIT`].
    #[inline]
    pub fn read_nested(&mut self) -> Result<Reader<'a>, DecodeError> {
        if self.depth >= RECURSION_LIMIT {
            return Err(self.error(DecodeErrorKind::RecursionLimitExceeded(RECURSION_LIMIT)));
        }
        let mut nested = self.read_delimited()?;
        nested.depth += 1;
        Ok(nested)
    }

    /// Skips over a field value based on its wire type.
    ///
    /// Protobuf supports backwards and forwards compatibility by skipping
    /// fields we don't know about.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::I64 => {
                self.take(8)?;
            }
            WireType::Len => {
                self.read_bytes_delimited()?;
            }
            WireType::I32 => {
                self.take(4)?;
            }
            WireType::SGroup | WireType::EGroup => {
                return Err(self.error(DecodeErrorKind::UnsupportedGroup));
            }
        }
        Ok(())
    }
}
