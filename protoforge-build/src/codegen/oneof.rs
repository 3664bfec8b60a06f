//! Oneof enum code generation.

use std::collections::HashSet;

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::context::GenerationContext;
use crate::descriptor::DescriptorProto;
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::naming;

use super::comments::{doc_comment, CommentMap, DescriptorPath};
use super::field::Field;

const UNSET: &str = "Unset";

/// A member of a oneof and its variant name.
pub struct OneofMember<'a> {
    pub field: Field<'a>,
    pub variant: String,
}

impl OneofMember<'_> {
    pub fn variant_ident(&self) -> Ident {
        naming::ident(&self.variant)
    }
}

/// A real (non-synthetic) oneof of a message.
pub struct Oneof<'a> {
    pub name: &'a str,
    /// Index into the message's `oneof_decl`.
    pub index: usize,
    /// Escaped Rust name of the generated enum.
    pub type_name: String,
    pub members: Vec<OneofMember<'a>>,
    pub comment: Option<String>,
}

impl Oneof<'_> {
    /// The struct field holding the active variant.
    pub fn field_ident(&self) -> Ident {
        naming::ident(&naming::field_name(self.name))
    }

    pub fn type_ident(&self) -> Ident {
        naming::ident(&self.type_name)
    }
}

/// Collect the oneofs of `message`, in declaration order.
///
/// proto3 `optional` fields live in synthetic oneofs; those fields are plain
/// `Option<T>` fields and their oneofs are not collected. `taken` holds the
/// names of the nested types already declared in the message's module.
pub fn collect_oneofs<'a>(
    ctx: &GenerationContext,
    message_fqn: &str,
    message: &'a DescriptorProto,
    comments: &CommentMap,
    path: &DescriptorPath,
    taken: &HashSet<String>,
) -> Result<Vec<Oneof<'a>>, Error> {
    for field in &message.field {
        if let Some(index) = field.oneof_index {
            let declared = usize::try_from(index).is_ok_and(|i| i < message.oneof_decl.len());
            if !declared {
                let name = field.name.as_deref().unwrap_or("<field>");
                return Err(SchemaError::new(
                    format!("{message_fqn}.{name}"),
                    SchemaErrorKind::InvalidOneofIndex(index),
                )
                .into());
            }
        }
    }

    let mut oneofs = Vec::new();
    for (index, decl) in message.oneof_decl.iter().enumerate() {
        let name = decl.name.as_deref().ok_or_else(|| {
            SchemaError::new(format!("{message_fqn}.<oneof>"), SchemaErrorKind::MissingName)
        })?;
        let oneof_path = format!("{message_fqn}.{name}");
        if let Some(option) = decl
            .options
            .as_ref()
            .and_then(|options| options.custom_options.first())
        {
            return Err(SchemaError::new(oneof_path, SchemaErrorKind::UnsupportedOption(*option)).into());
        }

        let mut members = Vec::new();
        for (field_index, field) in message.field.iter().enumerate() {
            if field.oneof_index != Some(index as i32) || field.is_proto3_optional() {
                continue;
            }
            let comment = comments.get(&path.field(field_index));
            let field = Field::new(ctx, message_fqn, field, comment)?;
            let mut variant = naming::type_name(field.name);
            if variant == UNSET {
                variant.push('_');
            }
            members.push(OneofMember { field, variant });
        }
        if members.is_empty() {
            continue;
        }

        let mut type_name = naming::type_name(name);
        if taken.contains(&type_name) {
            type_name.push_str("Oneof");
        }

        oneofs.push(Oneof {
            name,
            index,
            type_name,
            members,
            comment: comments.get(&path.oneof(index)),
        });
    }
    Ok(oneofs)
}

/// Generate a oneof enum type inside the message's module `module`.
pub fn generate_oneof_enum(
    ctx: &GenerationContext,
    module: &[String],
    oneof: &Oneof<'_>,
) -> Result<TokenStream, Error> {
    let enum_ident = oneof.type_ident();
    let docs = oneof.comment.as_deref().map(doc_comment);
    let unset = naming::ident(UNSET);

    let variants = oneof
        .members
        .iter()
        .map(|member| {
            let ident = member.variant_ident();
            let ty = member.field.boxed_value_type(ctx, module)?;
            let docs = member.field.comment.as_deref().map(doc_comment);
            Ok(quote! {
                #docs
                #ident(#ty),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Default)]
        pub enum #enum_ident {
            /// No member of the oneof is set.
            #[default]
            #unset,
            #(#variants)*
        }
    })
}
