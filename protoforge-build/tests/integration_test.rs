//! Integration tests for protoforge-build.

use std::fs;

use protoforge_build::descriptor::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, Label, Type,
};
use protoforge_build::{find_protoc, Config, Error, SchemaErrorKind};
use tempfile::tempdir;

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn two_packages() -> FileDescriptorSet {
    let inner = FileDescriptorProto {
        name: Some("inner.proto".to_string()),
        package: Some("outer.inner".to_string()),
        syntax: Some("proto3".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Leaf".to_string()),
            field: vec![field("weight", 1, Type::Double)],
            ..Default::default()
        }],
        ..Default::default()
    };
    let outer = FileDescriptorProto {
        name: Some("outer.proto".to_string()),
        package: Some("outer".to_string()),
        dependency: vec!["inner.proto".to_string()],
        syntax: Some("proto3".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Tree".to_string()),
            field: vec![FieldDescriptorProto {
                label: Some(Label::Repeated as i32),
                type_name: Some(".outer.inner.Leaf".to_string()),
                ..field("leaves", 1, Type::Message)
            }],
            ..Default::default()
        }],
        ..Default::default()
    };
    FileDescriptorSet {
        file: vec![inner, outer],
    }
}

#[test]
fn test_compile_fds_to_directory() {
    let out_dir = tempdir().expect("Failed to create temp dir");
    Config::new()
        .out_dir(out_dir.path())
        .compile_fds(two_packages())
        .expect("Failed to compile descriptors");

    let outer = fs::read_to_string(out_dir.path().join("outer.rs")).unwrap();
    assert!(outer.contains("pub struct Tree"));
    assert!(outer.contains("inner::Leaf"), "cross-package reference: {outer}");

    let inner = fs::read_to_string(out_dir.path().join("outer.inner.rs")).unwrap();
    assert!(inner.contains("pub struct Leaf"));
    assert!(inner.contains("pub weight: f64"));

    let mod_rs = fs::read_to_string(out_dir.path().join("mod.rs")).unwrap();
    assert!(mod_rs.contains("pub mod outer"));
    assert!(mod_rs.contains("pub mod inner"));
    assert!(mod_rs.contains("include!(\"outer.inner.rs\")"));
}

#[test]
fn test_generate_without_filesystem() {
    let files = Config::new().generate(&two_packages()).unwrap();
    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["outer.rs", "outer.inner.rs", "mod.rs"]);
    assert!(files[2].content.contains("env!(\"OUT_DIR\")"));
}

#[test]
fn test_schema_errors_abort_generation() {
    let mut fds = two_packages();
    fds.file[0].message_type[0]
        .field
        .push(field("legacy", 2, Type::Group));

    let out_dir = tempdir().unwrap();
    let err = Config::new()
        .out_dir(out_dir.path())
        .compile_fds(fds)
        .unwrap_err();
    match err {
        Error::Schema(err) => {
            assert_eq!(err.kind, SchemaErrorKind::UnsupportedGroup);
            assert_eq!(err.path, "outer.inner.Leaf.legacy");
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing is written when generation fails.
    assert!(!out_dir.path().join("mod.rs").exists());
}

#[test]
fn test_compile_protos_with_protoc() {
    if find_protoc().is_err() {
        eprintln!("protoc not found, skipping");
        return;
    }

    let out_dir = tempdir().unwrap();
    let descriptor_path = out_dir.path().join("contacts.bin");
    Config::new()
        .out_dir(out_dir.path())
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["tests/proto/contacts.proto"], &["tests/proto/"])
        .expect("Failed to compile protos");

    let content = fs::read_to_string(out_dir.path().join("contacts.rs")).unwrap();
    assert!(content.contains("pub struct Person"));
    assert!(content.contains("pub struct PhoneNumber"));
    assert!(content.contains("pub enum PhoneType"));
    assert!(content.contains("Mobile"));
    assert!(content.contains("pub enum Contact"));
    assert!(content.contains("A person in the address book."));
    assert!(content.contains("impl ::protoforge::ProtoMessage for AddressBook"));
    assert!(descriptor_path.exists());

    // The saved descriptor set can be reused without protoc.
    let second = tempdir().unwrap();
    Config::new()
        .out_dir(second.path())
        .skip_protoc_run()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["tests/proto/contacts.proto"], &["tests/proto/"])
        .unwrap();
    assert_eq!(
        fs::read_to_string(second.path().join("contacts.rs")).unwrap(),
        content
    );
}
