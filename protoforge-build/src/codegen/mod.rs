//! Code generation from protobuf descriptors.

mod codec;
mod comments;
mod enumeration;
mod field;
mod message;
mod module;
mod oneof;
mod recursion;
mod types;

pub use recursion::{find_boxed_fields, BoxedField};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;

use crate::config::Config;
use crate::context::{package_module, package_prefix, GenerationContext};
use crate::descriptor::{decode_file_descriptor_set, FileDescriptorProto, FileDescriptorSet};
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::protoc;

use comments::{CommentMap, DescriptorPath};
use module::IncludeStyle;

/// A generated Rust source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory, e.g. `my.package.rs`.
    pub name: String,
    pub content: String,
}

/// Per-file state shared by the generators of its messages and enums.
pub struct FileScope<'a> {
    pub file: &'a FileDescriptorProto,
    pub is_proto3: bool,
    pub comments: CommentMap,
}

/// Main entry point for code generation.
pub fn compile(
    config: &Config,
    protos: &[impl AsRef<Path>],
    includes: &[impl AsRef<Path>],
) -> Result<(), Error> {
    let bytes = if config.skip_protoc {
        let path = config
            .file_descriptor_set_path
            .as_ref()
            .ok_or(Error::MissingDescriptorPath)?;
        std::fs::read(path)?
    } else {
        let protoc_path = match &config.protoc_path {
            Some(path) => path.clone(),
            None => protoc::find_protoc()?,
        };
        let bytes = protoc::invoke_protoc(&protoc_path, protos, includes, &config.protoc_args)?;
        if let Some(path) = &config.file_descriptor_set_path {
            std::fs::write(path, &bytes)?;
        }
        bytes
    };

    compile_fds(config, decode_file_descriptor_set(&bytes)?)
}

/// Compile from a FileDescriptorSet and write the output files.
pub fn compile_fds(config: &Config, fds: FileDescriptorSet) -> Result<(), Error> {
    let out_dir = output_dir(config)?;
    let files = generate(config, &fds)?;

    std::fs::create_dir_all(&out_dir)?;
    for file in &files {
        let path = out_dir.join(&file.name);
        // Unchanged output keeps its mtime so dependents are not rebuilt.
        if std::fs::read_to_string(&path).is_ok_and(|existing| existing == file.content) {
            tracing::debug!(path = %path.display(), "output unchanged");
            continue;
        }
        std::fs::write(&path, &file.content)?;
        tracing::info!(path = %path.display(), "wrote generated file");
    }
    Ok(())
}

fn output_dir(config: &Config) -> Result<PathBuf, Error> {
    config
        .out_dir
        .clone()
        .or_else(|| std::env::var_os("OUT_DIR").map(PathBuf::from))
        .ok_or(Error::MissingOutDir)
}

/// Generate one file per package plus `mod.rs`.
pub fn generate(config: &Config, fds: &FileDescriptorSet) -> Result<Vec<GeneratedFile>, Error> {
    let ctx = GenerationContext::new(config, fds);

    // Files sharing a package share an output file.
    let mut packages: BTreeMap<String, TokenStream> = BTreeMap::new();
    for file in &fds.file {
        let package = file.package.clone().unwrap_or_default();
        let code = generate_file(&ctx, file)?;
        packages.entry(package).or_default().extend(code);
    }

    let include = if config.out_dir.is_some() {
        IncludeStyle::Relative
    } else {
        IncludeStyle::OutDir
    };
    module::render_files(packages, config.skip_format, include)
}

/// Generate code for a single .proto file.
fn generate_file(ctx: &GenerationContext, file: &FileDescriptorProto) -> Result<TokenStream, Error> {
    let file_name = file.name.as_deref().unwrap_or("<file>");
    let package = file.package.as_deref().unwrap_or("");
    tracing::debug!(file = file_name, package, "generating file");
    // File-level constructs are reported against the package.
    let file_path = if package.is_empty() { file_name } else { package };

    match file.syntax.as_deref() {
        None | Some("") | Some("proto2") | Some("proto3") => {}
        Some(other) => {
            return Err(SchemaError::new(
                file_path,
                SchemaErrorKind::UnsupportedSyntax(other.to_string()),
            )
            .into())
        }
    }
    if let Some(extension) = file.extension.first() {
        let name = extension.name.as_deref().unwrap_or("<extension>");
        let path = if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        };
        return Err(SchemaError::new(path, SchemaErrorKind::UnsupportedExtension).into());
    }
    if let Some(option) = file
        .options
        .as_ref()
        .and_then(|options| options.custom_options.first())
    {
        return Err(SchemaError::new(file_path, SchemaErrorKind::UnsupportedOption(*option)).into());
    }

    let scope = FileScope {
        file,
        is_proto3: file.is_proto3(),
        comments: CommentMap::from_file(file),
    };
    let module = package_module(package);
    let prefix = package_prefix(package);

    let mut tokens = TokenStream::new();
    for (index, enum_type) in file.enum_type.iter().enumerate() {
        let fqn = format!("{prefix}{}", enum_type.name.as_deref().unwrap_or_default());
        if ctx.is_extern(&fqn) {
            continue;
        }
        tokens.extend(enumeration::generate_enum(
            &fqn,
            enum_type,
            &scope.comments,
            &DescriptorPath::top_level_enum(index),
        )?);
    }
    for (index, message) in file.message_type.iter().enumerate() {
        tokens.extend(message::generate_message(
            ctx,
            &scope,
            &module,
            &prefix,
            message,
            &DescriptorPath::message(index),
        )?);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
        FieldOptions, Label, MessageOptions, OneofDescriptorProto, Options, Type,
    };

    fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            type_name: Some(type_name.to_string()),
            ..field(name, number, ty)
        }
    }

    fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
        field.label = Some(Label::Repeated as i32);
        field
    }

    fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            ..Default::default()
        }
    }

    fn file(syntax: &str, messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("test.proto".to_string()),
            package: Some("pkg".to_string()),
            message_type: messages,
            syntax: Some(syntax.to_string()),
            ..Default::default()
        }
    }

    /// The `pkg` file as raw token text, free of formatter line breaks.
    fn generate_one(config: &Config, file: FileDescriptorProto) -> Result<String, Error> {
        let mut config = config.clone();
        config.skip_format();
        let files = generate(&config, &FileDescriptorSet { file: vec![file] })?;
        let package = files
            .into_iter()
            .find(|file| file.name == "pkg.rs")
            .expect("package file");
        Ok(package.content)
    }

    fn squash(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Whitespace-insensitive `contains`.
    #[track_caller]
    fn assert_has(code: &str, needle: &str) {
        assert!(squash(code).contains(&squash(needle)), "missing `{needle}` in:\n{code}");
    }

    #[track_caller]
    fn assert_lacks(code: &str, needle: &str) {
        assert!(!squash(code).contains(&squash(needle)), "unexpected `{needle}` in:\n{code}");
    }

    fn schema_error(result: Result<String, Error>) -> SchemaError {
        match result {
            Err(Error::Schema(err)) => err,
            other => panic!("expected a schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_generates_package_file_and_mod() {
        let fds = FileDescriptorSet {
            file: vec![file("proto3", vec![message("Empty", vec![])])],
        };
        let files = generate(&Config::new(), &fds).unwrap();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, ["pkg.rs", "mod.rs"]);
        assert!(files[0].content.starts_with("// @generated by protoforge-build"));
        assert_has(&files[0].content, "pub struct Empty");
        assert_has(&files[0].content, "impl ::protoforge::ProtoMessage for Empty");
        assert_has(&files[1].content, "pub mod pkg");
    }

    #[test]
    fn test_files_of_one_package_are_merged() {
        let mut other = file("proto3", vec![message("Second", vec![])]);
        other.name = Some("other.proto".to_string());
        let fds = FileDescriptorSet {
            file: vec![file("proto3", vec![message("First", vec![])]), other],
        };
        let files = generate(&Config::new(), &fds).unwrap();
        assert_eq!(files.len(), 2);
        assert_has(&files[0].content, "pub struct First");
        assert_has(&files[0].content, "pub struct Second");
    }

    #[test]
    fn test_presence_shapes() {
        let mut optional = field("maybe", 2, Type::Int32);
        optional.proto3_optional = Some(true);
        optional.oneof_index = Some(0);

        let mut msg = message(
            "Shapes",
            vec![
                field("plain", 1, Type::Int32),
                optional,
                repeated(field("values", 3, Type::Int32)),
                repeated(field("names", 4, Type::String)),
            ],
        );
        msg.oneof_decl = vec![OneofDescriptorProto {
            name: Some("_maybe".to_string()),
            ..Default::default()
        }];

        let code = generate_one(&Config::new(), file("proto3", vec![msg])).unwrap();
        assert_has(&code, "pub plain: i32");
        assert_has(&code, "pub maybe: ::core::option::Option<i32>");
        assert_has(&code, "pub values: ::protoforge::alloc::vec::Vec<i32>");
        assert_has(&code, "encode_packed::<::protoforge::kind::Int32, B>");
        assert_has(&code, "encode_repeated::<::protoforge::kind::Str, B>");
        assert_has(&code, "is_default::<::protoforge::kind::Int32>");
        // The synthetic oneof of a proto3 optional field has no enum.
        assert_lacks(&code, "pub enum Maybe");
    }

    #[test]
    fn test_proto2_packing_is_opt_in() {
        let mut packed = repeated(field("packed", 2, Type::Sint32));
        packed.options = Some(FieldOptions {
            packed: Some(true),
            ..Default::default()
        });
        let msg = message(
            "Legacy",
            vec![repeated(field("unpacked", 1, Type::Int32)), packed],
        );
        let code = generate_one(&Config::new(), file("proto2", vec![msg])).unwrap();
        assert_has(&code, "encode_repeated::<::protoforge::kind::Int32, B>");
        assert_has(&code, "encode_packed::<::protoforge::kind::Sint32, B>");
        assert_has(&code, "pub unpacked: ::protoforge::alloc::vec::Vec<i32>");
    }

    #[test]
    fn test_recursive_field_is_boxed() {
        let msg = message(
            "Node",
            vec![
                field("value", 1, Type::Int32),
                typed("next", 2, Type::Message, ".pkg.Node"),
                repeated(typed("children", 3, Type::Message, ".pkg.Node")),
            ],
        );
        let code = generate_one(&Config::new(), file("proto3", vec![msg])).unwrap();
        assert_has(
            &code,
            "pub next: ::core::option::Option<::protoforge::alloc::boxed::Box<Node>>",
        );
        assert_has(&code, "pub children: ::protoforge::alloc::vec::Vec<Node>");
        assert_has(&code, "::protoforge::alloc::boxed::Box::new(value)");
    }

    #[test]
    fn test_unlinked_recursive_field_is_boxed() {
        let mut next = typed("next", 1, Type::Message, ".pkg.Node");
        next.r#type = None;
        let code = generate_one(&Config::new(), file("proto3", vec![message("Node", vec![next])]))
            .unwrap();
        assert_has(
            &code,
            "pub next: ::core::option::Option<::protoforge::alloc::boxed::Box<Node>>",
        );
    }

    #[test]
    fn test_map_container_follows_config() {
        let entry = DescriptorProto {
            name: Some("CountsEntry".to_string()),
            field: vec![field("key", 1, Type::String), field("value", 2, Type::Int64)],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut msg = message(
            "Tally",
            vec![repeated(typed(
                "counts",
                1,
                Type::Message,
                ".pkg.Tally.CountsEntry",
            ))],
        );
        msg.nested_type = vec![entry];

        let schema = file("proto3", vec![msg]);
        let code = generate_one(&Config::new(), schema.clone()).unwrap();
        assert_has(
            &code,
            "pub counts: ::protoforge::alloc::collections::BTreeMap<::protoforge::alloc::string::String, i64",
        );
        assert_has(&code, "encode_map::<::protoforge::kind::Str, ::protoforge::kind::Int64, _, B>");
        // Map entry messages are not generated.
        assert_lacks(&code, "pub struct CountsEntry");

        let code = generate_one(Config::new().hash_map(), schema).unwrap();
        assert_has(&code, "::std::collections::HashMap<");
        assert_lacks(&code, "BTreeMap");
    }

    #[test]
    fn test_enum_generation() {
        let value = |name: &str, number: i32| EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            ..Default::default()
        };
        let mut schema = file(
            "proto3",
            vec![message(
                "Paint",
                vec![typed("color", 1, Type::Enum, ".pkg.Color")],
            )],
        );
        schema.enum_type = vec![EnumDescriptorProto {
            name: Some("Color".to_string()),
            value: vec![
                value("COLOR_UNSPECIFIED", 0),
                value("COLOR_RED", 1),
                value("COLOR_CRIMSON", 1),
                value("COLOR_INFRARED", -1),
            ],
            ..Default::default()
        }];

        let code = generate_one(&Config::new(), schema).unwrap();
        assert_has(&code, "pub enum Color");
        assert_has(&code, "#[default]\n    Unspecified,");
        assert_has(&code, "Red,");
        assert_has(&code, "Unrecognized(i32),");
        assert_has(&code, "pub const Crimson: Self = Self::Red;");
        assert_has(&code, "-1 => Self::Infrared");
        assert_has(&code, "\"COLOR_CRIMSON\" =>");
        assert_has(&code, "impl ::protoforge::ProtoEnum for Color");
        assert_has(&code, "pub color: Color");
        assert_has(&code, "::protoforge::kind::Enum<Color>");
    }

    #[test]
    fn test_enum_prefix_kept_on_collision() {
        let value = |name: &str, number: i32| EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            ..Default::default()
        };
        let mut schema = file("proto3", vec![]);
        schema.enum_type = vec![EnumDescriptorProto {
            name: Some("Mode".to_string()),
            value: vec![value("MODE_FAST", 0), value("FAST", 1)],
            ..Default::default()
        }];
        let code = generate_one(&Config::new(), schema).unwrap();
        assert_has(&code, "ModeFast, Fast,");
    }

    #[test]
    fn test_oneof_generation() {
        let mut name = field("name", 1, Type::String);
        name.oneof_index = Some(0);
        let mut id = field("id", 2, Type::Uint64);
        id.oneof_index = Some(0);
        let mut msg = message("Lookup", vec![name, id, field("limit", 3, Type::Uint32)]);
        msg.oneof_decl = vec![OneofDescriptorProto {
            name: Some("key".to_string()),
            ..Default::default()
        }];

        let code = generate_one(&Config::new(), file("proto3", vec![msg])).unwrap();
        assert_has(&code, "pub key: lookup::Key");
        assert_has(&code, "pub mod lookup");
        assert_has(&code, "pub enum Key");
        assert_has(&code, "#[default]\n        Unset,");
        assert_has(&code, "Name(::protoforge::alloc::string::String)");
        assert_has(&code, "Id(u64)");
        assert_has(&code, "lookup::Key::Unset => {}");
        // The oneof field comes first, at the position of `name`.
        let code = squash(&code);
        assert!(code.find("pubkey:").unwrap() < code.find("publimit:").unwrap());
    }

    #[test]
    fn test_extern_types_are_referenced_not_generated() {
        let msg = message(
            "Event",
            vec![typed("at", 1, Type::Message, ".google.protobuf.Timestamp")],
        );
        let mut config = Config::new();
        config.extern_path(".google.protobuf", "::wkt");
        let code = generate_one(&config, file("proto3", vec![msg])).unwrap();
        assert_has(&code, "pub at: ::core::option::Option<::wkt::Timestamp>");
    }

    #[test]
    fn test_unformatted_output() {
        let code = generate_one(
            Config::new().skip_format(),
            file("proto3", vec![message("Empty", vec![])]),
        )
        .unwrap();
        assert_has(&code, "pub struct Empty");
        assert_has(&code, "impl :: protoforge :: ProtoMessage for Empty");
    }

    #[test]
    fn test_group_is_rejected() {
        let msg = message("Old", vec![field("grp", 1, Type::Group)]);
        let err = schema_error(generate_one(&Config::new(), file("proto2", vec![msg])));
        assert_eq!(err.kind, SchemaErrorKind::UnsupportedGroup);
        assert_eq!(err.path, "pkg.Old.grp");
    }

    #[test]
    fn test_extension_is_rejected() {
        let mut schema = file("proto2", vec![message("Base", vec![])]);
        schema.extension = vec![typed("ext", 100, Type::Int32, ".pkg.Base")];
        let err = schema_error(generate_one(&Config::new(), schema));
        assert_eq!(err.kind, SchemaErrorKind::UnsupportedExtension);
        assert_eq!(err.path, "pkg.ext");

        let mut msg = message("Holder", vec![]);
        msg.extension = vec![typed("ext", 100, Type::Int32, ".pkg.Base")];
        let err = schema_error(generate_one(&Config::new(), file("proto2", vec![msg])));
        assert_eq!(err.kind, SchemaErrorKind::UnsupportedExtension);
        assert_eq!(err.path, "pkg.Holder");
    }

    #[test]
    fn test_custom_option_is_rejected() {
        let mut flagged = field("flagged", 1, Type::Int32);
        flagged.options = Some(FieldOptions {
            custom_options: vec![50001],
            ..Default::default()
        });
        let schema = file("proto3", vec![message("Opts", vec![flagged])]);
        let err = schema_error(generate_one(&Config::new(), schema));
        assert_eq!(err.kind, SchemaErrorKind::UnsupportedOption(50001));
    }

    #[test]
    fn test_unknown_syntax_is_rejected() {
        let err = schema_error(generate_one(&Config::new(), file("editions", vec![])));
        assert_eq!(
            err.kind,
            SchemaErrorKind::UnsupportedSyntax("editions".to_string())
        );
        assert_eq!(err.path, "pkg");

        let mut unnamed = file("editions", vec![]);
        unnamed.package = None;
        let err = schema_error(generate_one(&Config::new(), unnamed));
        assert_eq!(err.path, "test.proto");
    }

    #[test]
    fn test_file_option_is_reported_against_package() {
        let mut schema = file("proto3", vec![]);
        schema.options = Some(Options {
            custom_options: vec![60001],
        });
        let err = schema_error(generate_one(&Config::new(), schema));
        assert_eq!(err.kind, SchemaErrorKind::UnsupportedOption(60001));
        assert_eq!(err.path, "pkg");
    }

    #[test]
    fn test_invalid_field_number_is_rejected() {
        let schema = file("proto3", vec![message("Bad", vec![field("x", 19_000, Type::Int32)])]);
        let err = schema_error(generate_one(&Config::new(), schema));
        assert_eq!(err.kind, SchemaErrorKind::InvalidFieldNumber(19_000));
        assert_eq!(err.path, "pkg.Bad.x");
    }

    #[test]
    fn test_unresolved_type_is_rejected() {
        let schema = file(
            "proto3",
            vec![message("Dangling", vec![typed("m", 1, Type::Message, ".pkg.Missing")])],
        );
        let err = schema_error(generate_one(&Config::new(), schema));
        assert_eq!(
            err.kind,
            SchemaErrorKind::UnresolvedType(".pkg.Missing".to_string())
        );
    }

    fn status_enum() -> EnumDescriptorProto {
        let value = |name: &str, number: i32| EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            ..Default::default()
        };
        EnumDescriptorProto {
            name: Some("Status".to_string()),
            value: vec![
                value("STATUS_UNKNOWN", 0),
                value("STATUS_ACTIVE", 1),
                value("STATUS_RETIRED", 2),
                value("STATUS_LIVE", 1),
            ],
            ..Default::default()
        }
    }

    fn conformance_file(messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("conformance.proto".to_string()),
            package: Some("conformance".to_string()),
            enum_type: vec![status_enum()],
            ..file("proto3", messages)
        }
    }

    fn legacy_file() -> FileDescriptorProto {
        let mut id = field("id", 1, Type::Int32);
        id.label = Some(Label::Required as i32);
        let mut packed = repeated(field("packed", 5, Type::Int32));
        packed.options = Some(FieldOptions {
            packed: Some(true),
            ..Default::default()
        });
        let mut status = typed("status", 6, Type::Enum, ".conformance.Status");
        status.label = Some(Label::Required as i32);

        FileDescriptorProto {
            name: Some("legacy.proto".to_string()),
            package: Some("conformance.legacy".to_string()),
            dependency: vec!["conformance.proto".to_string()],
            ..file(
                "proto2",
                vec![message(
                    "Record",
                    vec![
                        id,
                        field("name", 2, Type::String),
                        field("count", 3, Type::Int32),
                        repeated(field("plain", 4, Type::Int32)),
                        packed,
                        status,
                        typed("scalars", 7, Type::Message, ".conformance.Scalars"),
                    ],
                )],
            )
        }
    }

    /// Formatted output of `fds`, by file name.
    fn formatted(fds: &FileDescriptorSet) -> BTreeMap<String, String> {
        generate(&Config::new(), fds)
            .unwrap()
            .into_iter()
            .map(|file| (file.name, file.content))
            .collect()
    }

    #[test]
    fn test_enum_snapshot() {
        let files = formatted(&FileDescriptorSet {
            file: vec![conformance_file(vec![])],
        });
        let enums = &files["conformance.rs"];
        insta::assert_snapshot!("status_enum", enums);
    }

    #[test]
    fn test_proto2_package_snapshot() {
        let files = formatted(&FileDescriptorSet {
            file: vec![
                conformance_file(vec![message("Scalars", vec![])]),
                legacy_file(),
            ],
        });
        let legacy = &files["conformance.legacy.rs"];
        insta::assert_snapshot!("proto2_record", legacy);
        let mod_rs = &files["mod.rs"];
        insta::assert_snapshot!("mod_rs", mod_rs);
    }

    #[test]
    fn test_compile_fds_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let fds = FileDescriptorSet {
            file: vec![file("proto3", vec![message("Empty", vec![])])],
        };
        Config::new().out_dir(dir.path()).compile_fds(fds.clone()).unwrap();

        let package = std::fs::read_to_string(dir.path().join("pkg.rs")).unwrap();
        assert!(package.contains("pub struct Empty"));
        let module = std::fs::read_to_string(dir.path().join("mod.rs")).unwrap();
        assert!(module.contains("include!(\"pkg.rs\")"));

        // A second run with identical output succeeds without rewriting.
        Config::new().out_dir(dir.path()).compile_fds(fds).unwrap();
    }

    #[test]
    fn test_skip_protoc_requires_descriptor_path() {
        let empty: &[&str] = &[];
        let err = Config::new()
            .skip_protoc_run()
            .compile_protos(empty, empty)
            .unwrap_err();
        assert!(matches!(err, Error::MissingDescriptorPath));
    }
}
