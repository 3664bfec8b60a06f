//! Generates the conformance schema into `$OUT_DIR`.
//!
//! The schema is built as a FileDescriptorSet directly so the tests do not
//! depend on a protoc installation. It mirrors:
//!
//! ```proto
//! // conformance.proto
//! syntax = "proto3";
//! package conformance;
//!
//! enum Status { STATUS_UNKNOWN = 0; STATUS_ACTIVE = 1; STATUS_RETIRED = 2; STATUS_LIVE = 1; }
//! message Counter { int32 value = 1; }
//! message Delta { sint32 value = 1; }
//! message Scalars { double double_value = 1; ... Status status = 16; }
//! message Optionals { optional int32 count = 1; optional string label = 2;
//!                     optional Status status = 3; optional bool flag = 4; }
//! message Repeated { repeated int32 ints = 1; repeated sint64 deltas = 2;
//!                    repeated string names = 3; repeated Status statuses = 4;
//!                    repeated double weights = 5; repeated int32 unpacked = 6 [packed = false];
//!                    repeated Scalars items = 7; }
//! message Maps { map<string, int32> counts = 1; map<int32, string> names = 2;
//!                map<uint64, Scalars> items = 3; map<bool, Status> flags = 4; }
//! message Choice { oneof value { int32 number = 1; string text = 2; Scalars scalars = 3;
//!                                Status status = 4; } int32 tag = 5; }
//! message Tree { int32 value = 1; Tree left = 2; Tree right = 3; repeated Tree children = 4; }
//! message Outer { message Inner { int32 x = 1; } enum Kind { KIND_A = 0; KIND_B = 1; }
//!                 Inner inner = 1; Kind kind = 2; repeated Inner inners = 3; }
//! message Expr { message Pair { Expr left = 1; Expr right = 2; }
//!                oneof node { int64 literal = 1; Expr negate = 2; Pair add = 3; } }
//!
//! // legacy.proto
//! syntax = "proto2";
//! package conformance.legacy;
//!
//! message Record { required int32 id = 1; optional string name = 2; optional int32 count = 3;
//!                  repeated int32 plain = 4; repeated int32 packed = 5 [packed = true];
//!                  required conformance.Status status = 6;
//!                  optional conformance.Scalars scalars = 7; }
//! ```

use protoforge_build::descriptor::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldOptions, FileDescriptorProto, FileDescriptorSet, Label, MessageOptions,
    OneofDescriptorProto, Type,
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

fn labeled(label: Label, field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(label as i32),
        ..field
    }
}

fn packed(packed: bool, field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        options: Some(FieldOptions {
            packed: Some(packed),
            ..Default::default()
        }),
        ..field
    }
}

fn in_oneof(index: i32, field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(index),
        ..field
    }
}

/// A proto3 `optional` field and the synthetic oneof protoc creates for it.
fn proto3_optional(index: i32, field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        proto3_optional: Some(true),
        ..in_oneof(index, field)
    }
}

fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

fn map_entry(name: &str, key: Type, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message(
            name,
            vec![
                field("key", 1, key),
                FieldDescriptorProto {
                    name: Some("value".to_string()),
                    number: Some(2),
                    ..value
                },
            ],
        )
    }
}

fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_string()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn conformance_file() -> FileDescriptorProto {
    const STATUS: &str = ".conformance.Status";
    const SCALARS: &str = ".conformance.Scalars";

    let scalars = message(
        "Scalars",
        vec![
            field("double_value", 1, Type::Double),
            field("float_value", 2, Type::Float),
            field("int32_value", 3, Type::Int32),
            field("int64_value", 4, Type::Int64),
            field("uint32_value", 5, Type::Uint32),
            field("uint64_value", 6, Type::Uint64),
            field("sint32_value", 7, Type::Sint32),
            field("sint64_value", 8, Type::Sint64),
            field("fixed32_value", 9, Type::Fixed32),
            field("fixed64_value", 10, Type::Fixed64),
            field("sfixed32_value", 11, Type::Sfixed32),
            field("sfixed64_value", 12, Type::Sfixed64),
            field("bool_value", 13, Type::Bool),
            field("string_value", 14, Type::String),
            field("bytes_value", 15, Type::Bytes),
            typed("status", 16, Type::Enum, STATUS),
        ],
    );

    let optionals = DescriptorProto {
        oneof_decl: vec![oneof("_count"), oneof("_label"), oneof("_status"), oneof("_flag")],
        ..message(
            "Optionals",
            vec![
                proto3_optional(0, field("count", 1, Type::Int32)),
                proto3_optional(1, field("label", 2, Type::String)),
                proto3_optional(2, typed("status", 3, Type::Enum, STATUS)),
                proto3_optional(3, field("flag", 4, Type::Bool)),
            ],
        )
    };

    let repeated = message(
        "Repeated",
        vec![
            labeled(Label::Repeated, field("ints", 1, Type::Int32)),
            labeled(Label::Repeated, field("deltas", 2, Type::Sint64)),
            labeled(Label::Repeated, field("names", 3, Type::String)),
            labeled(Label::Repeated, typed("statuses", 4, Type::Enum, STATUS)),
            labeled(Label::Repeated, field("weights", 5, Type::Double)),
            packed(false, labeled(Label::Repeated, field("unpacked", 6, Type::Int32))),
            labeled(Label::Repeated, typed("items", 7, Type::Message, SCALARS)),
        ],
    );

    let maps = DescriptorProto {
        nested_type: vec![
            map_entry("CountsEntry", Type::String, field("value", 2, Type::Int32)),
            map_entry("NamesEntry", Type::Int32, field("value", 2, Type::String)),
            map_entry("ItemsEntry", Type::Uint64, typed("value", 2, Type::Message, SCALARS)),
            map_entry("FlagsEntry", Type::Bool, typed("value", 2, Type::Enum, STATUS)),
        ],
        ..message(
            "Maps",
            vec![
                labeled(
                    Label::Repeated,
                    typed("counts", 1, Type::Message, ".conformance.Maps.CountsEntry"),
                ),
                labeled(
                    Label::Repeated,
                    typed("names", 2, Type::Message, ".conformance.Maps.NamesEntry"),
                ),
                labeled(
                    Label::Repeated,
                    typed("items", 3, Type::Message, ".conformance.Maps.ItemsEntry"),
                ),
                labeled(
                    Label::Repeated,
                    typed("flags", 4, Type::Message, ".conformance.Maps.FlagsEntry"),
                ),
            ],
        )
    };

    let choice = DescriptorProto {
        oneof_decl: vec![oneof("value")],
        ..message(
            "Choice",
            vec![
                in_oneof(0, field("number", 1, Type::Int32)),
                in_oneof(0, field("text", 2, Type::String)),
                in_oneof(0, typed("scalars", 3, Type::Message, SCALARS)),
                in_oneof(0, typed("status", 4, Type::Enum, STATUS)),
                field("tag", 5, Type::Int32),
            ],
        )
    };

    let tree = message(
        "Tree",
        vec![
            field("value", 1, Type::Int32),
            typed("left", 2, Type::Message, ".conformance.Tree"),
            typed("right", 3, Type::Message, ".conformance.Tree"),
            labeled(
                Label::Repeated,
                typed("children", 4, Type::Message, ".conformance.Tree"),
            ),
        ],
    );

    let outer = DescriptorProto {
        nested_type: vec![message("Inner", vec![field("x", 1, Type::Int32)])],
        enum_type: vec![enumeration("Kind", &[("KIND_A", 0), ("KIND_B", 1)])],
        ..message(
            "Outer",
            vec![
                typed("inner", 1, Type::Message, ".conformance.Outer.Inner"),
                typed("kind", 2, Type::Enum, ".conformance.Outer.Kind"),
                labeled(
                    Label::Repeated,
                    typed("inners", 3, Type::Message, ".conformance.Outer.Inner"),
                ),
            ],
        )
    };

    let expr = DescriptorProto {
        nested_type: vec![message(
            "Pair",
            vec![
                typed("left", 1, Type::Message, ".conformance.Expr"),
                typed("right", 2, Type::Message, ".conformance.Expr"),
            ],
        )],
        oneof_decl: vec![oneof("node")],
        ..message(
            "Expr",
            vec![
                in_oneof(0, field("literal", 1, Type::Int64)),
                in_oneof(0, typed("negate", 2, Type::Message, ".conformance.Expr")),
                in_oneof(0, typed("add", 3, Type::Message, ".conformance.Expr.Pair")),
            ],
        )
    };

    FileDescriptorProto {
        name: Some("conformance.proto".to_string()),
        package: Some("conformance".to_string()),
        syntax: Some("proto3".to_string()),
        enum_type: vec![enumeration(
            "Status",
            &[
                ("STATUS_UNKNOWN", 0),
                ("STATUS_ACTIVE", 1),
                ("STATUS_RETIRED", 2),
                ("STATUS_LIVE", 1),
            ],
        )],
        message_type: vec![
            message("Counter", vec![field("value", 1, Type::Int32)]),
            message("Delta", vec![field("value", 1, Type::Sint32)]),
            scalars,
            optionals,
            repeated,
            maps,
            choice,
            tree,
            outer,
            expr,
        ],
        ..Default::default()
    }
}

fn legacy_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("legacy.proto".to_string()),
        package: Some("conformance.legacy".to_string()),
        dependency: vec!["conformance.proto".to_string()],
        syntax: Some("proto2".to_string()),
        message_type: vec![message(
            "Record",
            vec![
                labeled(Label::Required, field("id", 1, Type::Int32)),
                field("name", 2, Type::String),
                field("count", 3, Type::Int32),
                labeled(Label::Repeated, field("plain", 4, Type::Int32)),
                packed(true, labeled(Label::Repeated, field("packed", 5, Type::Int32))),
                labeled(
                    Label::Required,
                    typed("status", 6, Type::Enum, ".conformance.Status"),
                ),
                typed("scalars", 7, Type::Message, ".conformance.Scalars"),
            ],
        )],
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    let fds = FileDescriptorSet {
        file: vec![conformance_file(), legacy_file()],
    };
    protoforge_build::Config::new().compile_fds(fds)?;
    Ok(())
}
