//! Message struct code generation.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;

use crate::context::{relative_path, GenerationContext};
use crate::descriptor::DescriptorProto;
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::naming;

use super::codec::generate_codec;
use super::comments::{doc_comment, DescriptorPath};
use super::enumeration::generate_enum;
use super::field::{generate_field, Field};
use super::oneof::{collect_oneofs, generate_oneof_enum, Oneof};
use super::types::FieldShape;
use super::FileScope;

/// A struct member: a field, or the single slot of a oneof.
pub enum Member<'a> {
    Field { field: Field<'a>, shape: FieldShape },
    Oneof(Oneof<'a>),
}

/// Generate the Rust struct, codec and nested module for a proto message.
///
/// `module` is the Rust module the struct is emitted into and `prefix` the
/// proto scope it is declared in (`.pkg.` or `.pkg.Outer.`).
pub fn generate_message(
    ctx: &GenerationContext,
    file: &FileScope<'_>,
    module: &[String],
    prefix: &str,
    message: &DescriptorProto,
    path: &DescriptorPath,
) -> Result<TokenStream, Error> {
    let name = message.name.as_deref().ok_or_else(|| {
        SchemaError::new(format!("{prefix}<message>"), SchemaErrorKind::MissingName)
    })?;
    let fqn = format!("{prefix}{name}");
    if ctx.is_extern(&fqn) {
        return Ok(TokenStream::new());
    }
    tracing::trace!(message = %fqn, "generating message");

    if !message.extension.is_empty() {
        return Err(SchemaError::new(&fqn, SchemaErrorKind::UnsupportedExtension).into());
    }
    if let Some(option) = message
        .options
        .as_ref()
        .and_then(|options| options.custom_options.first())
    {
        return Err(SchemaError::new(&fqn, SchemaErrorKind::UnsupportedOption(*option)).into());
    }

    let struct_ident = naming::ident(&naming::type_name(name));
    let module_name = naming::module_name(name);
    let mut nested_module = module.to_vec();
    nested_module.push(module_name.clone());
    let nested_mod_ident = naming::ident(&module_name);

    let nested_messages: Vec<(usize, &DescriptorProto)> = message
        .nested_type
        .iter()
        .enumerate()
        .filter(|(_, nested)| !nested.is_map_entry())
        .collect();
    let taken: HashSet<String> = nested_messages
        .iter()
        .filter_map(|(_, nested)| nested.name.as_deref())
        .chain(message.enum_type.iter().filter_map(|e| e.name.as_deref()))
        .map(naming::type_name)
        .collect();

    let mut oneofs = collect_oneofs(ctx, &fqn, message, &file.comments, path, &taken)?;
    let members = collect_members(ctx, file, &fqn, message, path, &mut oneofs)?;

    let oneof_module = quote!(#nested_mod_ident::);
    let mut fields = Vec::with_capacity(members.len());
    for member in &members {
        fields.push(match member {
            Member::Field { field, shape } => generate_field(ctx, module, field, shape)?,
            Member::Oneof(oneof) => {
                let ident = oneof.field_ident();
                let ty = relative_path(module, &nested_module, &oneof.type_name);
                let docs = oneof.comment.as_deref().map(doc_comment);
                quote! {
                    #docs
                    pub #ident: #ty,
                }
            }
        });
    }

    let codec = generate_codec(ctx, module, &struct_ident, &members, &oneof_module)?;

    // Nested enums, messages and oneof enums.
    let mut nested = TokenStream::new();
    let nested_prefix = format!("{fqn}.");
    for (index, enum_type) in message.enum_type.iter().enumerate() {
        let enum_name = enum_type.name.as_deref().unwrap_or_default();
        let enum_fqn = format!("{nested_prefix}{enum_name}");
        if ctx.is_extern(&enum_fqn) {
            continue;
        }
        nested.extend(generate_enum(
            &enum_fqn,
            enum_type,
            &file.comments,
            &path.nested_enum(index),
        )?);
    }
    for (index, nested_msg) in nested_messages {
        nested.extend(generate_message(
            ctx,
            file,
            &nested_module,
            &nested_prefix,
            nested_msg,
            &path.nested_message(index),
        )?);
    }
    for member in &members {
        if let Member::Oneof(oneof) = member {
            nested.extend(generate_oneof_enum(ctx, &nested_module, oneof)?);
        }
    }

    let nested_mod = if nested.is_empty() {
        quote!()
    } else {
        let docs = format!(" Nested types of [`{}`].", naming::type_name(name).trim_start_matches("r#"));
        quote! {
            #[doc = #docs]
            pub mod #nested_mod_ident {
                #nested
            }
        }
    };

    let docs = file.comments.get(path).map(|comment| doc_comment(&comment));

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct #struct_ident {
            #(#fields)*
        }

        #codec

        #nested_mod
    })
}

/// Fields and oneofs of `message` in declaration order. Each oneof takes
/// the position of its first member.
fn collect_members<'a>(
    ctx: &GenerationContext,
    file: &FileScope<'_>,
    fqn: &str,
    message: &'a DescriptorProto,
    path: &DescriptorPath,
    oneofs: &mut Vec<Oneof<'a>>,
) -> Result<Vec<Member<'a>>, Error> {
    let mut members = Vec::with_capacity(message.field.len());
    for (index, descriptor) in message.field.iter().enumerate() {
        match descriptor.oneof_index {
            Some(oneof_index) if !descriptor.is_proto3_optional() => {
                if let Some(position) = oneofs
                    .iter()
                    .position(|oneof| oneof.index as i32 == oneof_index)
                {
                    members.push(Member::Oneof(oneofs.remove(position)));
                }
            }
            _ => {
                let comment = file.comments.get(&path.field(index));
                let field = Field::new(ctx, fqn, descriptor, comment)?;
                let shape =
                    FieldShape::from_field(ctx, descriptor, &field.kind, file.is_proto3, &field.path)?;
                members.push(Member::Field { field, shape });
            }
        }
    }
    Ok(members)
}
