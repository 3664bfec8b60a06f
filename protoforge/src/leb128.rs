//! LEB128 variable-length integer encoding/decoding.

use crate::error::DecodeErrorKind;
use crate::util::likely;

/// Types that can be encoded as a LEB128 (protobuf "varint") integer.
pub trait LebCodec: Sized + Copy {
    /// The most bytes an encoding of `Self` may occupy.
    const MAX_LEB_BYTES: usize;

    /// Decode a LEB128 variable length integer from the front of `data`.
    ///
    /// Returns a tuple of the decoded value and the number of bytes read to
    /// decode said value.
    ///
    /// Fails with [`DecodeErrorKind::Truncated`] when `data` ends before the
    /// terminating byte, and with [`DecodeErrorKind::MalformedVarint`] when
    /// the final permitted byte still has its continuation bit set or carries
    /// bits that do not fit in `Self`.
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind>;

    /// Encode `self` as a LEB128 variable length integer into the provided
    /// buffer, returning the number of bytes written.
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize;

    /// The number of bytes required to encode this integer.
    fn encoded_leb128_len(self) -> usize;
}

impl LebCodec for u64 {
    const MAX_LEB_BYTES: usize = 10;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind> {
        // Single byte values dominate real traffic (keys, small ints, lengths).
        if let Some(&b) = data.first() {
            if likely(b < 0x80) {
                return Ok((u64::from(b), 1));
            }
        }

        let mut value = 0u64;
        for (i, &b) in data.iter().take(Self::MAX_LEB_BYTES).enumerate() {
            if i == Self::MAX_LEB_BYTES - 1 {
                // The tenth byte holds only bit 63.
                if b > 0x01 {
                    return Err(DecodeErrorKind::MalformedVarint);
                }
                return Ok((value | (u64::from(b) << 63), Self::MAX_LEB_BYTES));
            }
            value |= u64::from(b & 0x7f) << (7 * i);
            if b < 0x80 {
                return Ok((value, i + 1));
            }
        }
        Err(DecodeErrorKind::Truncated)
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        let mut value = self;
        let mut written = 1;
        while value >= 0x80 {
            buf.put_u8((value & 0x7f) as u8 | 0x80);
            value >>= 7;
            written += 1;
        }
        buf.put_u8(value as u8);
        written
    }

    /// Compute the LEB128 encoded length using leading_zeros.
    ///
    /// bytes = ceil((64 - lz) / 7), with a minimum of one byte for zero.
    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 65] = [
            10,                                         // 0:     64 bits -> 10 bytes
            9, 9, 9, 9, 9, 9, 9,                        // 1-7:   63-57 bits -> 9 bytes
            8, 8, 8, 8, 8, 8, 8,                        // 8-14:  56-50 bits -> 8 bytes
            7, 7, 7, 7, 7, 7, 7,                        // 15-21: 49-43 bits -> 7 bytes
            6, 6, 6, 6, 6, 6, 6,                        // 22-28: 42-36 bits -> 6 bytes
            5, 5, 5, 5, 5, 5, 5,                        // 29-35: 35-29 bits -> 5 bytes
            4, 4, 4, 4, 4, 4, 4,                        // 36-42: 28-22 bits -> 4 bytes
            3, 3, 3, 3, 3, 3, 3,                        // 43-49: 21-15 bits -> 3 bytes
            2, 2, 2, 2, 2, 2, 2,                        // 50-56: 14-8 bits  -> 2 bytes
            1, 1, 1, 1, 1, 1, 1, 1,                     // 57-64: 7-0 bits   -> 1 byte
        ];

        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}

impl LebCodec for u32 {
    const MAX_LEB_BYTES: usize = 5;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind> {
        let mut value = 0u32;
        for (i, &b) in data.iter().take(Self::MAX_LEB_BYTES).enumerate() {
            if i == Self::MAX_LEB_BYTES - 1 {
                // The fifth byte holds bits 28..32.
                if b > 0x0f {
                    return Err(DecodeErrorKind::MalformedVarint);
                }
                return Ok((value | (u32::from(b) << 28), Self::MAX_LEB_BYTES));
            }
            value |= u32::from(b & 0x7f) << (7 * i);
            if b < 0x80 {
                return Ok((value, i + 1));
            }
        }
        Err(DecodeErrorKind::Truncated)
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        u64::from(self).encode_leb128(buf)
    }

    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 33] = [
            5, 5, 5, 5,                         // 0-3:   32-29 bits -> 5 bytes
            4, 4, 4, 4, 4, 4, 4,                // 4-10:  28-22 bits -> 4 bytes
            3, 3, 3, 3, 3, 3, 3,                // 11-17: 21-15 bits -> 3 bytes
            2, 2, 2, 2, 2, 2, 2,                // 18-24: 14-8 bits  -> 2 bytes
            1, 1, 1, 1, 1, 1, 1, 1,             // 25-32: 7-0 bits   -> 1 byte
        ];

        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}
