//! Descriptor types for protobuf FileDescriptorSet.
//!
//! These types mirror the parts of google/protobuf/descriptor.proto the
//! generator reads. They are plain data: build them by hand (every type is
//! `Default`) or decode them with [`decode_file_descriptor_set`].

mod decode;

pub use decode::decode_file_descriptor_set;

/// A collection of file descriptors.
/// Corresponds to google.protobuf.FileDescriptorSet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDescriptorSet {
    pub file: Vec<FileDescriptorProto>, // field 1
}

/// Describes a complete .proto file.
/// Corresponds to google.protobuf.FileDescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDescriptorProto {
    /// The file name, relative to root of source tree.
    pub name: Option<String>, // field 1
    pub package: Option<String>, // field 2
    /// Names of files imported by this file.
    pub dependency: Vec<String>, // field 3
    pub message_type: Vec<DescriptorProto>, // field 4
    pub enum_type: Vec<EnumDescriptorProto>, // field 5
    /// Top-level `extend` blocks.
    pub extension: Vec<FieldDescriptorProto>, // field 7
    pub options: Option<Options>, // field 8
    pub source_code_info: Option<SourceCodeInfo>, // field 9
    /// `"proto2"`, `"proto3"`, or unset (proto2).
    pub syntax: Option<String>, // field 12
}

impl FileDescriptorProto {
    pub fn is_proto3(&self) -> bool {
        self.syntax.as_deref() == Some("proto3")
    }
}

/// Describes a message type.
/// Corresponds to google.protobuf.DescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorProto {
    pub name: Option<String>, // field 1
    pub field: Vec<FieldDescriptorProto>, // field 2
    pub nested_type: Vec<DescriptorProto>, // field 3
    pub enum_type: Vec<EnumDescriptorProto>, // field 4
    pub extension: Vec<FieldDescriptorProto>, // field 6
    pub options: Option<MessageOptions>, // field 7
    pub oneof_decl: Vec<OneofDescriptorProto>, // field 8
}

impl DescriptorProto {
    /// Whether protoc synthesized this message for a `map<K, V>` field.
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|options| options.map_entry)
            .unwrap_or(false)
    }
}

/// Describes a field within a message.
/// Corresponds to google.protobuf.FieldDescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDescriptorProto {
    pub name: Option<String>, // field 1
    pub number: Option<i32>, // field 3
    pub label: Option<i32>, // field 4
    pub r#type: Option<i32>, // field 5
    /// For message and enum types, the fully-qualified type name
    /// (`.pkg.Outer.Inner`).
    pub type_name: Option<String>, // field 6
    /// proto2 `[default = ..]`, as text.
    pub default_value: Option<String>, // field 7
    pub options: Option<FieldOptions>, // field 8
    /// If set, this field is part of the oneof at this index.
    pub oneof_index: Option<i32>, // field 9
    pub json_name: Option<String>, // field 10
    /// If true, this is a proto3 `optional` field living in a synthetic oneof.
    pub proto3_optional: Option<bool>, // field 17
}

impl FieldDescriptorProto {
    /// The field label; unset is treated as `Optional`.
    pub fn label(&self) -> Option<Label> {
        match self.label {
            None => Some(Label::Optional),
            Some(label) => Label::from_i32(label),
        }
    }

    pub fn field_type(&self) -> Option<Type> {
        self.r#type.and_then(Type::from_i32)
    }

    pub fn is_proto3_optional(&self) -> bool {
        self.proto3_optional.unwrap_or(false)
    }

    /// The explicit `[packed = ..]` option, if given.
    pub fn packed(&self) -> Option<bool> {
        self.options.as_ref().and_then(|options| options.packed)
    }
}

/// Describes an enum type.
/// Corresponds to google.protobuf.EnumDescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumDescriptorProto {
    pub name: Option<String>, // field 1
    pub value: Vec<EnumValueDescriptorProto>, // field 2
    pub options: Option<Options>, // field 3
}

/// Corresponds to google.protobuf.EnumValueDescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumValueDescriptorProto {
    pub name: Option<String>, // field 1
    pub number: Option<i32>, // field 2
    pub options: Option<Options>, // field 3
}

/// Corresponds to google.protobuf.OneofDescriptorProto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneofDescriptorProto {
    pub name: Option<String>, // field 1
    pub options: Option<Options>, // field 2
}

/// Options the generator does not interpret. Only custom options (field
/// numbers 1000 and up) are recorded so they can be rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub custom_options: Vec<u32>,
}

/// Corresponds to google.protobuf.MessageOptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOptions {
    /// Set true if this message is a map entry type.
    pub map_entry: Option<bool>, // field 7
    pub custom_options: Vec<u32>,
}

/// Corresponds to google.protobuf.FieldOptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    pub packed: Option<bool>, // field 2
    pub custom_options: Vec<u32>,
}

/// Source locations and comments.
/// Corresponds to google.protobuf.SourceCodeInfo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCodeInfo {
    pub location: Vec<Location>, // field 1
}

/// Corresponds to google.protobuf.SourceCodeInfo.Location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Path of field numbers and indices from the FileDescriptorProto root.
    pub path: Vec<i32>, // field 1
    pub leading_comments: Option<String>, // field 3
    pub trailing_comments: Option<String>, // field 4
    pub leading_detached_comments: Vec<String>, // field 6
}

/// Field type enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Type {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl Type {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Double),
            2 => Some(Self::Float),
            3 => Some(Self::Int64),
            4 => Some(Self::Uint64),
            5 => Some(Self::Int32),
            6 => Some(Self::Fixed64),
            7 => Some(Self::Fixed32),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::Group),
            11 => Some(Self::Message),
            12 => Some(Self::Bytes),
            13 => Some(Self::Uint32),
            14 => Some(Self::Enum),
            15 => Some(Self::Sfixed32),
            16 => Some(Self::Sfixed64),
            17 => Some(Self::Sint32),
            18 => Some(Self::Sint64),
            _ => None,
        }
    }
}

/// Field label enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Label {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Label {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Optional),
            2 => Some(Self::Required),
            3 => Some(Self::Repeated),
            _ => None,
        }
    }
}
