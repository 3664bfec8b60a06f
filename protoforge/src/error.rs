use thiserror::Error;

/// The reason a decode call failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("malformed varint")]
    MalformedVarint,
    #[error("unexpected end of buffer")]
    Truncated,
    #[error("length prefix {len} exceeds the {remaining} bytes remaining")]
    LengthOutOfRange { len: u64, remaining: usize },
    #[error("invalid 'wire type' value: {0}")]
    InvalidWireType(u8),
    #[error("invalid field number: {0}")]
    InvalidFieldNumber(u64),
    #[error("group encoding is not supported")]
    UnsupportedGroup,
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
    #[error("message nesting exceeds the recursion limit of {0}")]
    RecursionLimitExceeded(u32),
}

/// A fatal decode failure, with the absolute byte offset of the element that
/// could not be read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte offset {offset}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    offset: usize,
}

impl DecodeError {
    pub const fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        DecodeError { kind, offset }
    }

    pub const fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// Offset from the start of the outermost buffer handed to the decoder.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}
