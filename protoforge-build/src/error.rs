//! Error types for protoforge-build.

use std::io;

use thiserror::Error;

use crate::descriptor::Type;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (reading/writing files).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// protoc was not found.
    #[error("protoc not found. Set PROTOC env var or install protoc.")]
    ProtocNotFound,
    /// protoc invocation failed with the given output.
    #[error("protoc failed: {}", truncate_output(.0))]
    ProtocFailed(String),
    /// The FileDescriptorSet could not be decoded.
    #[error("failed to decode FileDescriptorSet: {0}")]
    Descriptor(#[from] protoforge::DecodeError),
    /// OUT_DIR environment variable not set.
    #[error("OUT_DIR not set. Run from build.rs or set out_dir().")]
    MissingOutDir,
    /// file_descriptor_set_path required when skip_protoc is set.
    #[error("file_descriptor_set_path required when skip_protoc is set")]
    MissingDescriptorPath,
    /// The schema uses a construct that cannot be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Generated code (or an extern path) did not parse as Rust.
    #[error("failed to parse generated code: {0}")]
    SynParse(String),
}

/// Truncate protoc output to avoid extremely long error messages.
fn truncate_output(output: &str) -> String {
    const MAX_LEN: usize = 2000;
    let trimmed = output.trim();
    if trimmed.len() <= MAX_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &trimmed[..end])
}

/// A schema construct that cannot be compiled, with the fully-qualified path
/// of the element that uses it (e.g. `my.pkg.Message.field`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct SchemaError {
    pub path: String,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub(crate) fn new(path: impl Into<String>, kind: SchemaErrorKind) -> Self {
        let path = path.into();
        let path = path.strip_prefix('.').map(str::to_string).unwrap_or(path);
        SchemaError { path, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    #[error("missing name")]
    MissingName,
    #[error("missing field number")]
    MissingFieldNumber,
    #[error("field number {0} is outside 1..=536870911 or in the reserved range 19000..=19999")]
    InvalidFieldNumber(i32),
    #[error("invalid field type {0} (expected 1-18)")]
    InvalidFieldType(i32),
    #[error("invalid field label {0} (expected 1-3)")]
    InvalidLabel(i32),
    #[error("group fields are not supported")]
    UnsupportedGroup,
    #[error("extensions are not supported")]
    UnsupportedExtension,
    #[error("custom option (field {0}) is not supported")]
    UnsupportedOption(u32),
    #[error("syntax \"{0}\" is not supported")]
    UnsupportedSyntax(String),
    #[error("{0:?} is not a valid map key type")]
    InvalidMapKey(Type),
    #[error("{0:?} is not a supported map value type")]
    UnsupportedMapValue(Type),
    #[error("only repeated scalar and enum fields can be packed")]
    InvalidPacked,
    #[error("unresolved type `{0}`")]
    UnresolvedType(String),
    #[error("oneof index {0} does not name a declared oneof")]
    InvalidOneofIndex(i32),
    #[error("enum declares no values")]
    EmptyEnum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_path() {
        let err = SchemaError::new(".pkg.Msg.field", SchemaErrorKind::UnsupportedGroup);
        assert_eq!(err.path, "pkg.Msg.field");
        assert_eq!(
            Error::from(err).to_string(),
            "pkg.Msg.field: group fields are not supported"
        );
    }

    #[test]
    fn protoc_output_is_truncated() {
        let long = "x".repeat(5000);
        let msg = Error::ProtocFailed(long).to_string();
        assert!(msg.ends_with("... [truncated]"));
        assert!(msg.len() < 2100);
    }
}
