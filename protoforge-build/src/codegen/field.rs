//! Field model and struct field generation.

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use protoforge::wire::{MAXIMUM_FIELD_NUMBER, MINIMUM_FIELD_NUMBER, RESERVED_FIELD_NUMBERS};

use crate::context::GenerationContext;
use crate::descriptor::FieldDescriptorProto;
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::naming;

use super::comments::doc_comment;
use super::types::{storage_type, FieldKind, FieldShape};

/// A validated field of a message, shared by plain fields and oneof members.
pub struct Field<'a> {
    pub descriptor: &'a FieldDescriptorProto,
    pub name: &'a str,
    /// Fully-qualified path used in errors (`.pkg.Message.field`).
    pub path: String,
    pub number: u32,
    pub kind: FieldKind,
    /// Stored behind a `Box` to break a recursive cycle.
    pub boxed: bool,
    pub comment: Option<String>,
}

impl<'a> Field<'a> {
    pub fn new(
        ctx: &GenerationContext,
        message_fqn: &str,
        descriptor: &'a FieldDescriptorProto,
        comment: Option<String>,
    ) -> Result<Self, Error> {
        let name = descriptor.name.as_deref().ok_or_else(|| {
            SchemaError::new(format!("{message_fqn}.<field>"), SchemaErrorKind::MissingName)
        })?;
        let path = format!("{message_fqn}.{name}");

        let number = descriptor
            .number
            .ok_or_else(|| SchemaError::new(&path, SchemaErrorKind::MissingFieldNumber))?;
        let number = validate_field_number(number, &path)?;

        if let Some(option) = descriptor
            .options
            .as_ref()
            .and_then(|options| options.custom_options.first())
        {
            return Err(SchemaError::new(&path, SchemaErrorKind::UnsupportedOption(*option)).into());
        }

        let kind = FieldKind::from_field(ctx, descriptor, &path)?;
        let boxed = matches!(kind, FieldKind::Message(_)) && ctx.is_boxed_field(message_fqn, name);

        Ok(Field {
            descriptor,
            name,
            path,
            number,
            kind,
            boxed,
            comment,
        })
    }

    /// The struct field identifier.
    pub fn ident(&self) -> Ident {
        naming::ident(&naming::field_name(self.name))
    }

    /// The type of one value, boxed if needed.
    pub fn boxed_value_type(
        &self,
        ctx: &GenerationContext,
        from: &[String],
    ) -> Result<TokenStream, Error> {
        let value = self.kind.value_type(ctx, from, &self.path)?;
        Ok(if self.boxed {
            quote!(::protoforge::alloc::boxed::Box<#value>)
        } else {
            value
        })
    }
}

/// Checks that a field number is in 1..=2^29-1 and outside 19000..=19999.
pub fn validate_field_number(number: i32, path: &str) -> Result<u32, SchemaError> {
    match u32::try_from(number) {
        Ok(n)
            if (MINIMUM_FIELD_NUMBER..=MAXIMUM_FIELD_NUMBER).contains(&n)
                && !RESERVED_FIELD_NUMBERS.contains(&n) =>
        {
            Ok(n)
        }
        _ => Err(SchemaError::new(path, SchemaErrorKind::InvalidFieldNumber(number))),
    }
}

/// Generate a struct field.
pub fn generate_field(
    ctx: &GenerationContext,
    from: &[String],
    field: &Field<'_>,
    shape: &FieldShape,
) -> Result<TokenStream, Error> {
    let ident = field.ident();
    // A map field's own kind is its entry message, which is never generated.
    let (value, map_value) = match shape {
        FieldShape::Map { key, value } => (
            key.value_type(ctx, from, &field.path)?,
            Some(value.value_type(ctx, from, &field.path)?),
        ),
        _ => (field.kind.value_type(ctx, from, &field.path)?, None),
    };
    let ty = storage_type(shape, value, field.boxed, map_value, ctx.config.map_type);
    let docs = field.comment.as_deref().map(doc_comment);

    Ok(quote! {
        #docs
        pub #ident: #ty,
    })
}
