//! `protoforge-build` compiles `.proto` files into Rust code for use with the
//! protoforge runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! // In build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     protoforge_build::compile_protos(&["src/messages.proto"], &["src/"])?;
//!     Ok(())
//! }
//! ```
//!
//! ```rust,ignore
//! // In src/lib.rs
//! pub mod proto {
//!     include!(concat!(env!("OUT_DIR"), "/mod.rs"));
//! }
//! ```
//!
//! # Generated Code
//!
//! Every message becomes a struct implementing [`protoforge::ProtoMessage`]
//! with hand-rolled decode, encode and size routines. Every enum becomes a
//! Rust enum implementing [`protoforge::ProtoEnum`] with an extra
//! `Unrecognized(i32)` variant for numbers the schema does not declare.
//!
//! | protobuf | Rust |
//! |---|---|
//! | `int32`, `sint32`, `sfixed32` | `i32` |
//! | `int64`, `sint64`, `sfixed64` | `i64` |
//! | `uint32`, `fixed32` / `uint64`, `fixed64` | `u32` / `u64` |
//! | `float` / `double` / `bool` | `f32` / `f64` / `bool` |
//! | `string` / `bytes` | `String` / `bytes::Bytes` |
//! | `optional T`, proto2 `T`, message `T` | `Option<T>` |
//! | `repeated T` | `Vec<T>` |
//! | `map<K, V>` | `BTreeMap<K, V>` (or `HashMap`, see [`Config::hash_map`]) |
//! | `oneof o { .. }` | `message::O` enum with an `Unset` variant |
//!
//! Nested messages, enums and oneofs live in a module named after the
//! snake_case parent message, and each package is a module of its own.
//!
//! # Automatic Boxing of Recursive Types
//!
//! Recursive protobuf types (messages that reference themselves directly or
//! indirectly) are automatically detected and wrapped in `Box<T>` to ensure
//! the generated Rust types have a known size at compile time.
//!
//! ```protobuf
//! message Node {
//!   Node left = 1;            // Generates: Option<Box<Node>>
//!   repeated Node children = 2; // Generates: Vec<Node>, already indirect
//! }
//! ```
//!
//! # Unsupported Constructs
//!
//! Groups, extensions and custom options are rejected with a
//! [`SchemaError`] naming the offending schema path.
//!
//! # Advanced Usage
//!
//! ```rust,no_run
//! fn main() -> Result<(), protoforge_build::Error> {
//!     protoforge_build::Config::new()
//!         .out_dir("src/proto")
//!         .hash_map()
//!         .extern_path(".google.protobuf.Timestamp", "crate::time::Timestamp")
//!         .compile_protos(&["proto/messages.proto"], &["proto/"])?;
//!     Ok(())
//! }
//! ```

mod codegen;
mod config;
mod context;
pub mod descriptor;
mod error;
mod naming;
mod protoc;

pub use codegen::GeneratedFile;
pub use config::{Config, MapType};
pub use error::{Error, SchemaError, SchemaErrorKind};
pub use protoc::find_protoc;

use std::path::Path;

/// Compile `.proto` files into Rust with default settings.
///
/// # Arguments
/// * `protos` - Paths to `.proto` files to compile
/// * `includes` - Include paths for resolving imports
///
/// # Example
///
/// ```rust,no_run
/// fn main() -> Result<(), protoforge_build::Error> {
///     protoforge_build::compile_protos(&["proto/messages.proto"], &["proto/"])?;
///     Ok(())
/// }
/// ```
pub fn compile_protos(
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
) -> Result<(), Error> {
    Config::new().compile_protos(protos, includes)
}
