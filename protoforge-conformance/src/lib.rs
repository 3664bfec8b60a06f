//! Conformance suite for code generated by `protoforge-build`.
//!
//! `build.rs` generates the `conformance` (proto3) and `conformance.legacy`
//! (proto2) packages; the tests under `tests/` exercise the generated
//! codecs.

#[allow(clippy::all)]
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/mod.rs"));
}

pub use proto::conformance;
