//! Locating and running protoc.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::Error;

/// Find the protoc executable.
///
/// The `PROTOC` environment variable wins over a `protoc` found on `PATH`.
pub fn find_protoc() -> Result<PathBuf, Error> {
    if let Some(path) = std::env::var_os("PROTOC").map(PathBuf::from) {
        if path.is_file() {
            return Ok(path);
        }
        tracing::warn!(path = %path.display(), "PROTOC is not a file, searching PATH");
    }
    which::which("protoc").map_err(|_| Error::ProtocNotFound)
}

/// Run protoc over `protos` and return the encoded FileDescriptorSet.
pub(crate) fn invoke_protoc(
    protoc: &Path,
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
    extra_args: &[String],
) -> Result<Vec<u8>, Error> {
    let scratch = tempfile::tempdir()?;
    let descriptor_set = scratch.path().join("descriptor_set.bin");

    let args = protoc_args(&descriptor_set, protos, includes, extra_args);
    tracing::debug!(protoc = %protoc.display(), ?args, "invoking protoc");
    let output = Command::new(protoc).args(&args).output()?;
    if !output.status.success() {
        return Err(Error::ProtocFailed(failure_output(&output)));
    }

    Ok(std::fs::read(&descriptor_set)?)
}

fn protoc_args(
    descriptor_set: &Path,
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
    extra_args: &[String],
) -> Vec<OsString> {
    let mut args = Vec::with_capacity(2 * includes.len() + protos.len() + extra_args.len() + 4);
    for include in includes {
        args.push(OsString::from("-I"));
        args.push(include.as_ref().into());
    }
    args.push("--descriptor_set_out".into());
    args.push(descriptor_set.into());
    // Dependencies must be in the set to resolve imported type names.
    args.push("--include_imports".into());
    // SourceCodeInfo carries the comments used for doc comments.
    args.push("--include_source_info".into());
    args.extend(extra_args.iter().map(OsString::from));
    args.extend(protos.iter().map(|proto| proto.as_ref().into()));
    args
}

/// stdout and stderr of a failed run, whichever are non-empty.
fn failure_output(output: &Output) -> String {
    [&output.stdout, &output.stderr]
        .into_iter()
        .map(|stream| String::from_utf8_lossy(stream).trim_end().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
