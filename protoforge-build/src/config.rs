//! Configuration for protobuf code generation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::codegen::GeneratedFile;
use crate::descriptor::FileDescriptorSet;
use crate::Error;

/// Container used for `map<K, V>` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapType {
    /// `alloc::collections::BTreeMap`, deterministic iteration order.
    #[default]
    BTreeMap,
    /// `std::collections::HashMap`.
    HashMap,
}

/// Configuration for protobuf code generation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Output directory for generated files. Defaults to `$OUT_DIR`.
    pub(crate) out_dir: Option<PathBuf>,

    /// Path to the protoc executable.
    pub(crate) protoc_path: Option<PathBuf>,

    /// Additional arguments for protoc.
    pub(crate) protoc_args: Vec<String>,

    /// Skip running protoc, use pre-existing FileDescriptorSet.
    pub(crate) skip_protoc: bool,

    /// Path to read/write FileDescriptorSet.
    pub(crate) file_descriptor_set_path: Option<PathBuf>,

    /// Extern paths for types defined elsewhere.
    /// Maps proto path -> Rust path (e.g., ".google.protobuf.Timestamp" -> "crate::time::Timestamp")
    pub(crate) extern_paths: HashMap<String, String>,

    pub(crate) map_type: MapType,

    /// Disable formatting with prettyplease.
    pub(crate) skip_format: bool,
}

impl Config {
    /// Create a new Config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory for generated Rust files.
    pub fn out_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set path to the protoc executable.
    pub fn protoc_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.protoc_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add an argument to pass to protoc.
    pub fn protoc_arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.protoc_args.push(arg.into());
        self
    }

    /// Skip running protoc; read the FileDescriptorSet from
    /// [`Config::file_descriptor_set_path`] instead.
    pub fn skip_protoc_run(&mut self) -> &mut Self {
        self.skip_protoc = true;
        self
    }

    /// Path to write (after running protoc) or read (with
    /// [`Config::skip_protoc_run`]) the encoded FileDescriptorSet.
    pub fn file_descriptor_set_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.file_descriptor_set_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Declare an externally provided protobuf type.
    ///
    /// When a field references a type matching `proto_path`, the generated code
    /// will use `rust_path` instead of generating the type. The Rust type must
    /// implement `protoforge::ProtoMessage` (or `ProtoEnum` for enums).
    ///
    /// # Example
    /// ```ignore
    /// config.extern_path(".google.protobuf.Timestamp", "crate::time::Timestamp");
    /// ```
    pub fn extern_path(
        &mut self,
        proto_path: impl Into<String>,
        rust_path: impl Into<String>,
    ) -> &mut Self {
        let mut proto_path = proto_path.into();
        if !proto_path.starts_with('.') {
            proto_path.insert(0, '.');
        }
        self.extern_paths.insert(proto_path, rust_path.into());
        self
    }

    /// Generate map fields as `BTreeMap` (the default).
    pub fn btree_map(&mut self) -> &mut Self {
        self.map_type = MapType::BTreeMap;
        self
    }

    /// Generate map fields as `std::collections::HashMap`.
    pub fn hash_map(&mut self) -> &mut Self {
        self.map_type = MapType::HashMap;
        self
    }

    /// Skip formatting with prettyplease.
    pub fn skip_format(&mut self) -> &mut Self {
        self.skip_format = true;
        self
    }

    /// Compile `.proto` files into Rust files.
    pub fn compile_protos(
        &self,
        protos: &[impl AsRef<Path>],
        includes: &[impl AsRef<Path>],
    ) -> Result<(), Error> {
        crate::codegen::compile(self, protos, includes)
    }

    /// Compile from an existing FileDescriptorSet and write the result to
    /// the output directory.
    pub fn compile_fds(&self, fds: FileDescriptorSet) -> Result<(), Error> {
        crate::codegen::compile_fds(self, fds)
    }

    /// Generate Rust sources for `fds` without touching the filesystem.
    ///
    /// Returns one file per package followed by `mod.rs`.
    pub fn generate(&self, fds: &FileDescriptorSet) -> Result<Vec<GeneratedFile>, Error> {
        crate::codegen::generate(self, fds)
    }
}
