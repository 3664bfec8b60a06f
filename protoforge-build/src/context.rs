//! Generation context for type resolution.

use std::collections::{HashMap, HashSet};

use proc_macro2::TokenStream;
use quote::quote;

use crate::codegen::{find_boxed_fields, BoxedField};
use crate::config::Config;
use crate::descriptor::{DescriptorProto, FieldDescriptorProto, FileDescriptorSet};
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Message,
    Enum,
}

/// Information about a type in the registry.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub kind: TypeKind,
    /// Rust module the type is defined in, relative to the generated root:
    /// the package modules followed by one module per enclosing message.
    pub module: Vec<String>,
    /// Escaped Rust identifier.
    pub name: String,
}

/// Information about a map entry message type.
#[derive(Debug, Clone)]
pub struct MapEntryInfo {
    pub key_field: FieldDescriptorProto,
    pub value_field: FieldDescriptorProto,
}

/// Context for code generation, including type registry.
pub struct GenerationContext<'a> {
    pub config: &'a Config,
    /// Map from fully-qualified proto type name -> type info.
    pub type_registry: HashMap<String, TypeInfo>,
    /// Singular message fields that close a cycle and are stored boxed.
    pub boxed_fields: HashSet<BoxedField>,
    /// Map from fully-qualified map entry type name -> map entry info.
    pub map_entries: HashMap<String, MapEntryInfo>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(config: &'a Config, fds: &FileDescriptorSet) -> Self {
        let mut type_registry = HashMap::new();
        let mut map_entries = HashMap::new();

        for file in &fds.file {
            let package = file.package.as_deref().unwrap_or("");
            let module = package_module(package);
            let prefix = package_prefix(package);

            for message in &file.message_type {
                register_message(&mut type_registry, &mut map_entries, &module, &prefix, message);
            }
            for enum_type in &file.enum_type {
                if let Some(name) = &enum_type.name {
                    type_registry.insert(
                        format!("{prefix}{name}"),
                        TypeInfo {
                            kind: TypeKind::Enum,
                            module: module.clone(),
                            name: naming::type_name(name),
                        },
                    );
                }
            }
        }

        let boxed_fields = find_boxed_fields(fds);

        Self {
            config,
            type_registry,
            boxed_fields,
            map_entries,
        }
    }

    pub fn get_map_entry(&self, type_name: &str) -> Option<&MapEntryInfo> {
        self.map_entries.get(type_name)
    }

    /// Whether `field_name` of `message_fqn` must be stored in a `Box`.
    pub fn is_boxed_field(&self, message_fqn: &str, field_name: &str) -> bool {
        self.boxed_fields.contains(&BoxedField {
            message_fqn: message_fqn.to_string(),
            field_name: field_name.to_string(),
        })
    }

    pub fn type_kind(&self, proto_type_name: &str) -> Option<TypeKind> {
        self.type_registry.get(proto_type_name).map(|info| info.kind)
    }

    /// Whether the type is provided by an extern path and must not be
    /// generated.
    pub fn is_extern(&self, proto_type_name: &str) -> bool {
        let mut prefix = proto_type_name;
        loop {
            if self.config.extern_paths.contains_key(prefix) {
                return true;
            }
            match prefix.rsplit_once('.') {
                Some((head, _)) if !head.is_empty() => prefix = head,
                _ => return false,
            }
        }
    }

    /// Resolve a proto type name to a Rust type path, relative to the module
    /// `from` (the module the referencing code is emitted into).
    ///
    /// `field_path` names the referencing field in errors.
    pub fn resolve_type(
        &self,
        proto_type_name: &str,
        from: &[String],
        field_path: &str,
    ) -> Result<TokenStream, Error> {
        if let Some(path) = self.resolve_extern(proto_type_name)? {
            return Ok(path);
        }

        let info = self.type_registry.get(proto_type_name).ok_or_else(|| {
            SchemaError::new(
                field_path,
                SchemaErrorKind::UnresolvedType(proto_type_name.to_string()),
            )
        })?;
        Ok(relative_path(from, &info.module, &info.name))
    }

    fn resolve_extern(&self, proto_type_name: &str) -> Result<Option<TokenStream>, Error> {
        let mut prefix = proto_type_name;
        let mut rest = Vec::new();
        let rust_path = loop {
            if let Some(rust_path) = self.config.extern_paths.get(prefix) {
                break rust_path;
            }
            match prefix.rsplit_once('.') {
                Some((head, tail)) if !head.is_empty() => {
                    rest.push(tail);
                    prefix = head;
                }
                _ => return Ok(None),
            }
        };

        // Segments below the matched prefix: modules, then the type itself.
        let mut text = rust_path.clone();
        if let Some((last, modules)) = rest.split_first() {
            for module in modules.iter().rev() {
                text.push_str("::");
                text.push_str(&naming::module_name(module));
            }
            text.push_str("::");
            text.push_str(&naming::type_name(last));
        }

        let path: syn::Path =
            syn::parse_str(&text).map_err(|err| Error::SynParse(format!("{text}: {err}")))?;
        Ok(Some(quote!(#path)))
    }
}

/// Builds `super::..::module::Name` from module `from` to `name` in `to`.
pub fn relative_path(from: &[String], to: &[String], name: &str) -> TokenStream {
    let common = from
        .iter()
        .zip(to)
        .take_while(|(a, b)| a == b)
        .count();
    let supers = (common..from.len()).map(|_| quote!(super));
    let modules = to[common..].iter().map(|module| naming::ident(module));
    let name = naming::ident(name);
    quote!(#(#supers::)* #(#modules::)* #name)
}

/// Rust module path of a package: one snake_case module per segment.
pub fn package_module(package: &str) -> Vec<String> {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(naming::module_name)
        .collect()
}

/// Prefix of the fully-qualified names declared in `package`.
pub fn package_prefix(package: &str) -> String {
    if package.is_empty() {
        ".".to_string()
    } else {
        format!(".{}.", package)
    }
}

/// Register a message and its nested types in the registry.
fn register_message(
    registry: &mut HashMap<String, TypeInfo>,
    map_entries: &mut HashMap<String, MapEntryInfo>,
    module: &[String],
    prefix: &str,
    message: &DescriptorProto,
) {
    let Some(name) = &message.name else {
        return;
    };
    let full_name = format!("{}{}", prefix, name);

    if message.is_map_entry() {
        let key_field = message.field.iter().find(|f| f.number == Some(1));
        let value_field = message.field.iter().find(|f| f.number == Some(2));
        if let (Some(key), Some(value)) = (key_field, value_field) {
            map_entries.insert(
                full_name,
                MapEntryInfo {
                    key_field: key.clone(),
                    value_field: value.clone(),
                },
            );
        }
        // Entries are not types of their own.
        return;
    }

    registry.insert(
        full_name.clone(),
        TypeInfo {
            kind: TypeKind::Message,
            module: module.to_vec(),
            name: naming::type_name(name),
        },
    );

    let mut nested_module = module.to_vec();
    nested_module.push(naming::module_name(name));
    let nested_prefix = format!("{}.", full_name);

    for nested in &message.nested_type {
        register_message(registry, map_entries, &nested_module, &nested_prefix, nested);
    }
    for enum_type in &message.enum_type {
        if let Some(enum_name) = &enum_type.name {
            registry.insert(
                format!("{}{}", nested_prefix, enum_name),
                TypeInfo {
                    kind: TypeKind::Enum,
                    module: nested_module.clone(),
                    name: naming::type_name(enum_name),
                },
            );
        }
    }
}
