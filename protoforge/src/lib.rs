//! Runtime support for protobuf messages generated by `protoforge-build`.
//!
//! The crate has three layers:
//!
//! * [`leb128`] and [`wire`]: schema-agnostic wire primitives (varints,
//!   zigzag, fixed-width values, keys, length-delimited framing).
//! * [`Reader`]: a forward-only decode cursor that reports byte offsets.
//! * [`codec`] and [`kind`]: the traits generated code implements and the
//!   per-field helpers it calls.
//!
//! Generated code only ever refers to this crate through absolute
//! `::protoforge::` paths.

#![cfg_attr(not(feature = "std"), no_std)]

#[doc(hidden)]
pub extern crate alloc;

pub mod codec;
pub mod error;
pub mod leb128;
pub mod reader;
pub mod wire;

mod util;

pub use bytes;

pub use codec::{ProtoEnum, ProtoMessage};
pub use error::{DecodeError, DecodeErrorKind};
pub use reader::Reader;

/// Marker types for every protobuf field kind.
///
/// Each marker binds a Rust value type to a wire type and a primitive codec,
/// e.g. `kind::Sint32` decodes zigzag varints into `i32`.
pub mod kind {
    pub use crate::codec::delimited::{Bytes, Str};
    pub use crate::codec::enumeration::Enum;
    pub use crate::codec::message::Message;
    pub use crate::codec::scalar::{
        Bool, Double, Fixed32, Fixed64, Float, Int32, Int64, Sfixed32, Sfixed64, Sint32, Sint64,
        Uint32, Uint64,
    };
}
