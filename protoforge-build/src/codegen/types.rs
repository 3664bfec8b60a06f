//! Type mapping from protobuf types to Rust types.
//!
//! [`FieldKind`] is the closed set of protobuf field kinds. Every kind maps
//! to a Rust value type and to a `protoforge::kind` marker that carries its
//! wire encoding. [`FieldShape`] captures cardinality and presence.

use proc_macro2::TokenStream;
use quote::quote;

use crate::config::MapType;
use crate::context::{GenerationContext, TypeKind};
use crate::descriptor::{FieldDescriptorProto, Label, Type};
use crate::error::{Error, SchemaError, SchemaErrorKind};

/// The kind of a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    /// Fully-qualified enum name.
    Enum(String),
    /// Fully-qualified message name.
    Message(String),
}

impl FieldKind {
    /// Determine the kind of `field`. `path` names the field in errors.
    pub fn from_field(
        ctx: &GenerationContext,
        field: &FieldDescriptorProto,
        path: &str,
    ) -> Result<Self, SchemaError> {
        let named = |kind: fn(String) -> FieldKind| {
            field
                .type_name
                .clone()
                .map(kind)
                .ok_or_else(|| SchemaError::new(path, SchemaErrorKind::UnresolvedType(String::new())))
        };

        let field_type = match (field.r#type, &field.type_name) {
            (Some(raw), _) => Type::from_i32(raw)
                .ok_or_else(|| SchemaError::new(path, SchemaErrorKind::InvalidFieldType(raw)))?,
            // Unlinked descriptors name the type without saying what it is.
            (None, Some(type_name)) => match ctx.type_kind(type_name) {
                Some(TypeKind::Enum) => Type::Enum,
                Some(TypeKind::Message) => Type::Message,
                None if ctx.get_map_entry(type_name).is_some() => Type::Message,
                None => {
                    return Err(SchemaError::new(
                        path,
                        SchemaErrorKind::UnresolvedType(type_name.clone()),
                    ))
                }
            },
            (None, None) => {
                return Err(SchemaError::new(path, SchemaErrorKind::InvalidFieldType(0)))
            }
        };

        Ok(match field_type {
            Type::Double => FieldKind::Double,
            Type::Float => FieldKind::Float,
            Type::Int64 => FieldKind::Int64,
            Type::Uint64 => FieldKind::Uint64,
            Type::Int32 => FieldKind::Int32,
            Type::Fixed64 => FieldKind::Fixed64,
            Type::Fixed32 => FieldKind::Fixed32,
            Type::Bool => FieldKind::Bool,
            Type::String => FieldKind::String,
            Type::Group => return Err(SchemaError::new(path, SchemaErrorKind::UnsupportedGroup)),
            Type::Message => named(FieldKind::Message)?,
            Type::Bytes => FieldKind::Bytes,
            Type::Uint32 => FieldKind::Uint32,
            Type::Enum => named(FieldKind::Enum)?,
            Type::Sfixed32 => FieldKind::Sfixed32,
            Type::Sfixed64 => FieldKind::Sfixed64,
            Type::Sint32 => FieldKind::Sint32,
            Type::Sint64 => FieldKind::Sint64,
        })
    }

    pub fn descriptor_type(&self) -> Type {
        match self {
            FieldKind::Double => Type::Double,
            FieldKind::Float => Type::Float,
            FieldKind::Int32 => Type::Int32,
            FieldKind::Int64 => Type::Int64,
            FieldKind::Uint32 => Type::Uint32,
            FieldKind::Uint64 => Type::Uint64,
            FieldKind::Sint32 => Type::Sint32,
            FieldKind::Sint64 => Type::Sint64,
            FieldKind::Fixed32 => Type::Fixed32,
            FieldKind::Fixed64 => Type::Fixed64,
            FieldKind::Sfixed32 => Type::Sfixed32,
            FieldKind::Sfixed64 => Type::Sfixed64,
            FieldKind::Bool => Type::Bool,
            FieldKind::String => Type::String,
            FieldKind::Bytes => Type::Bytes,
            FieldKind::Enum(_) => Type::Enum,
            FieldKind::Message(_) => Type::Message,
        }
    }

    /// Only varint, fixed32 and fixed64 kinds can be packed.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_)
        )
    }

    /// Integral kinds, bool and string.
    pub fn is_map_key(&self) -> bool {
        !matches!(
            self,
            FieldKind::Double
                | FieldKind::Float
                | FieldKind::Bytes
                | FieldKind::Enum(_)
                | FieldKind::Message(_)
        )
    }

    /// The `::protoforge::kind` marker for this kind, as seen from `from`.
    pub fn marker(
        &self,
        ctx: &GenerationContext,
        from: &[String],
        path: &str,
    ) -> Result<TokenStream, Error> {
        Ok(match self {
            FieldKind::Double => quote!(::protoforge::kind::Double),
            FieldKind::Float => quote!(::protoforge::kind::Float),
            FieldKind::Int32 => quote!(::protoforge::kind::Int32),
            FieldKind::Int64 => quote!(::protoforge::kind::Int64),
            FieldKind::Uint32 => quote!(::protoforge::kind::Uint32),
            FieldKind::Uint64 => quote!(::protoforge::kind::Uint64),
            FieldKind::Sint32 => quote!(::protoforge::kind::Sint32),
            FieldKind::Sint64 => quote!(::protoforge::kind::Sint64),
            FieldKind::Fixed32 => quote!(::protoforge::kind::Fixed32),
            FieldKind::Fixed64 => quote!(::protoforge::kind::Fixed64),
            FieldKind::Sfixed32 => quote!(::protoforge::kind::Sfixed32),
            FieldKind::Sfixed64 => quote!(::protoforge::kind::Sfixed64),
            FieldKind::Bool => quote!(::protoforge::kind::Bool),
            FieldKind::String => quote!(::protoforge::kind::Str),
            FieldKind::Bytes => quote!(::protoforge::kind::Bytes),
            FieldKind::Enum(name) => {
                let ty = ctx.resolve_type(name, from, path)?;
                quote!(::protoforge::kind::Enum<#ty>)
            }
            FieldKind::Message(name) => {
                let ty = ctx.resolve_type(name, from, path)?;
                quote!(::protoforge::kind::Message<#ty>)
            }
        })
    }

    /// The Rust type a value of this kind is stored as.
    pub fn value_type(
        &self,
        ctx: &GenerationContext,
        from: &[String],
        path: &str,
    ) -> Result<TokenStream, Error> {
        Ok(match self {
            FieldKind::Double => quote!(f64),
            FieldKind::Float => quote!(f32),
            FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => quote!(i32),
            FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => quote!(i64),
            FieldKind::Uint32 | FieldKind::Fixed32 => quote!(u32),
            FieldKind::Uint64 | FieldKind::Fixed64 => quote!(u64),
            FieldKind::Bool => quote!(bool),
            FieldKind::String => quote!(::protoforge::alloc::string::String),
            FieldKind::Bytes => quote!(::protoforge::bytes::Bytes),
            FieldKind::Enum(name) | FieldKind::Message(name) => ctx.resolve_type(name, from, path)?,
        })
    }
}

/// Cardinality and presence of a field outside any real oneof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Plain value, not written when it equals the default.
    Implicit,
    /// proto2 `required` scalar: plain value, always written.
    Required,
    /// Explicit presence: `Option<T>`.
    Optional,
    Repeated { packed: bool },
    Map { key: FieldKind, value: FieldKind },
}

impl FieldShape {
    pub fn from_field(
        ctx: &GenerationContext,
        field: &FieldDescriptorProto,
        kind: &FieldKind,
        is_proto3: bool,
        path: &str,
    ) -> Result<Self, SchemaError> {
        let label = field.label().ok_or_else(|| {
            SchemaError::new(path, SchemaErrorKind::InvalidLabel(field.label.unwrap_or(0)))
        })?;
        let packed = field.packed();

        if label == Label::Repeated {
            if let FieldKind::Message(type_name) = kind {
                if let Some(entry) = ctx.get_map_entry(type_name) {
                    if packed == Some(true) {
                        return Err(SchemaError::new(path, SchemaErrorKind::InvalidPacked));
                    }
                    return map_shape(ctx, &entry.key_field, &entry.value_field, path);
                }
            }

            let packed = match packed {
                Some(true) if !kind.is_packable() => {
                    return Err(SchemaError::new(path, SchemaErrorKind::InvalidPacked))
                }
                Some(packed) => packed,
                None => is_proto3 && kind.is_packable(),
            };
            return Ok(FieldShape::Repeated { packed });
        }

        if packed == Some(true) {
            return Err(SchemaError::new(path, SchemaErrorKind::InvalidPacked));
        }

        Ok(match (label, kind) {
            (_, FieldKind::Message(_)) => FieldShape::Optional,
            (Label::Required, _) => FieldShape::Required,
            _ if is_proto3 && !field.is_proto3_optional() => FieldShape::Implicit,
            _ => FieldShape::Optional,
        })
    }
}

fn map_shape(
    ctx: &GenerationContext,
    key_field: &FieldDescriptorProto,
    value_field: &FieldDescriptorProto,
    path: &str,
) -> Result<FieldShape, SchemaError> {
    let key = FieldKind::from_field(ctx, key_field, path)?;
    if !key.is_map_key() {
        return Err(SchemaError::new(
            path,
            SchemaErrorKind::InvalidMapKey(key.descriptor_type()),
        ));
    }
    let value = FieldKind::from_field(ctx, value_field, path).map_err(|err| {
        if err.kind == SchemaErrorKind::UnsupportedGroup {
            SchemaError::new(path, SchemaErrorKind::UnsupportedMapValue(Type::Group))
        } else {
            err
        }
    })?;
    Ok(FieldShape::Map { key, value })
}

/// Wraps `value` (the kind's value type) into the field's storage type.
pub fn storage_type(
    shape: &FieldShape,
    value: TokenStream,
    boxed: bool,
    map_value: Option<TokenStream>,
    map_type: MapType,
) -> TokenStream {
    let inner = if boxed {
        quote!(::protoforge::alloc::boxed::Box<#value>)
    } else {
        value
    };
    match shape {
        FieldShape::Implicit | FieldShape::Required => inner,
        FieldShape::Optional => quote!(::core::option::Option<#inner>),
        FieldShape::Repeated { .. } => quote!(::protoforge::alloc::vec::Vec<#inner>),
        FieldShape::Map { .. } => {
            let map_value = map_value.unwrap_or_default();
            match map_type {
                MapType::BTreeMap => {
                    quote!(::protoforge::alloc::collections::BTreeMap<#inner, #map_value>)
                }
                MapType::HashMap => quote!(::std::collections::HashMap<#inner, #map_value>),
            }
        }
    }
}
