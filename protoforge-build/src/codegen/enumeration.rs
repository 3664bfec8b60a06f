//! Enum code generation.
//!
//! A proto enum becomes a Rust enum with one unit variant per declared
//! number plus `Unrecognized(i32)`, so numbers unknown to this schema are
//! kept rather than lost. Aliases (a second name for a number) become
//! associated constants of the first variant.
//!
//! Equality, ordering and hashing go through the number, so an
//! `Unrecognized(n)` built for a declared `n` is the same value as that
//! variant.

use std::collections::HashSet;

use proc_macro2::{Literal, TokenStream};
use quote::quote;

use crate::descriptor::EnumDescriptorProto;
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::naming;

use super::comments::{doc_comment, CommentMap, DescriptorPath};

const UNRECOGNIZED: &str = "Unrecognized";

struct Value<'a> {
    proto_name: &'a str,
    variant: String,
    number: i32,
    comment: Option<String>,
}

/// An `i32` as a literal expression or pattern.
pub fn int_literal(value: i32) -> TokenStream {
    let literal = Literal::i64_unsuffixed(i64::from(value).abs());
    if value < 0 {
        quote!(-#literal)
    } else {
        quote!(#literal)
    }
}

/// Variant names with the enum name prefix stripped, unless stripping would
/// make two of them collide.
fn variant_names(enum_name: &str, values: &[&str]) -> Vec<String> {
    let convert = |strip: bool| -> Vec<String> {
        values
            .iter()
            .map(|value| {
                let value = if strip {
                    naming::strip_enum_prefix(enum_name, value)
                } else {
                    value
                };
                let name = naming::type_name(value);
                if name == UNRECOGNIZED {
                    format!("{name}_")
                } else {
                    name
                }
            })
            .collect()
    };

    let stripped = convert(true);
    let unique: HashSet<&String> = stripped.iter().collect();
    if unique.len() == stripped.len() {
        stripped
    } else {
        convert(false)
    }
}

/// Generate the Rust enum for `enum_type`, whose fully-qualified proto name
/// is `fqn`.
pub fn generate_enum(
    fqn: &str,
    enum_type: &EnumDescriptorProto,
    comments: &CommentMap,
    path: &DescriptorPath,
) -> Result<TokenStream, Error> {
    if let Some(option) = enum_type
        .options
        .as_ref()
        .and_then(|options| options.custom_options.first())
    {
        return Err(SchemaError::new(fqn, SchemaErrorKind::UnsupportedOption(*option)).into());
    }
    if enum_type.value.is_empty() {
        return Err(SchemaError::new(fqn, SchemaErrorKind::EmptyEnum).into());
    }
    let name = enum_type
        .name
        .as_deref()
        .ok_or_else(|| SchemaError::new(fqn, SchemaErrorKind::MissingName))?;

    let mut proto_names = Vec::with_capacity(enum_type.value.len());
    for value in &enum_type.value {
        let value_name = value
            .name
            .as_deref()
            .ok_or_else(|| SchemaError::new(fqn, SchemaErrorKind::MissingName))?;
        let value_path = format!("{fqn}.{value_name}");
        if value.number.is_none() {
            return Err(SchemaError::new(value_path, SchemaErrorKind::MissingFieldNumber).into());
        }
        if let Some(option) = value
            .options
            .as_ref()
            .and_then(|options| options.custom_options.first())
        {
            return Err(SchemaError::new(value_path, SchemaErrorKind::UnsupportedOption(*option)).into());
        }
        proto_names.push(value_name);
    }

    let variant_names = variant_names(name, &proto_names);
    let values: Vec<Value<'_>> = enum_type
        .value
        .iter()
        .zip(proto_names)
        .zip(variant_names)
        .enumerate()
        .map(|(index, ((value, proto_name), variant))| Value {
            proto_name,
            variant,
            number: value.number.unwrap_or_default(),
            comment: comments.get(&path.enum_value(index)),
        })
        .collect();

    // The first value for each number is the variant, the rest are aliases.
    let mut seen = HashSet::new();
    let (primary, aliases): (Vec<&Value<'_>>, Vec<&Value<'_>>) =
        values.iter().partition(|value| seen.insert(value.number));

    let enum_ident = naming::ident(&naming::type_name(name));
    let docs = comments.get(path).map(|comment| doc_comment(&comment));

    let variants = primary.iter().enumerate().map(|(index, value)| {
        let ident = naming::ident(&value.variant);
        let docs = value.comment.as_deref().map(doc_comment);
        let default = (index == 0).then(|| quote!(#[default]));
        quote! {
            #docs
            #default
            #ident,
        }
    });

    let to_arms = primary.iter().map(|value| {
        let ident = naming::ident(&value.variant);
        let number = int_literal(value.number);
        quote!(Self::#ident => #number,)
    });
    let from_arms = primary.iter().map(|value| {
        let ident = naming::ident(&value.variant);
        let number = int_literal(value.number);
        quote!(#number => Self::#ident,)
    });
    let as_str_arms = primary.iter().map(|value| {
        let ident = naming::ident(&value.variant);
        let proto_name = value.proto_name;
        quote!(Self::#ident => ::core::option::Option::Some(#proto_name),)
    });
    let from_str_arms = values.iter().map(|value| {
        let proto_name = value.proto_name;
        let number = int_literal(value.number);
        quote!(#proto_name => ::core::option::Option::Some(<Self as ::protoforge::ProtoEnum>::from_i32(#number)),)
    });

    let alias_consts = aliases.iter().filter_map(|alias| {
        let target = primary.iter().find(|value| value.number == alias.number)?;
        let ident = naming::ident(&alias.variant);
        let target = naming::ident(&target.variant);
        let docs = alias.comment.as_deref().map(doc_comment);
        Some(quote! {
            #docs
            #[allow(non_upper_case_globals)]
            pub const #ident: Self = Self::#target;
        })
    });

    let unrecognized = naming::ident(UNRECOGNIZED);

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, Copy, Default)]
        pub enum #enum_ident {
            #(#variants)*
            /// A number not declared by this version of the schema.
            #unrecognized(i32),
        }

        impl #enum_ident {
            #(#alias_consts)*

            /// The name of this value in the proto schema, or `None` for an
            /// unrecognized number.
            pub fn as_str_name(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#as_str_arms)*
                    Self::#unrecognized(_) => ::core::option::Option::None,
                }
            }

            /// Looks up a value by its proto schema name.
            pub fn from_str_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#from_str_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::protoforge::ProtoEnum for #enum_ident {
            fn to_i32(self) -> i32 {
                match self {
                    #(#to_arms)*
                    Self::#unrecognized(number) => number,
                }
            }

            fn from_i32(value: i32) -> Self {
                match value {
                    #(#from_arms)*
                    number => Self::#unrecognized(number),
                }
            }
        }

        impl ::core::convert::From<#enum_ident> for i32 {
            fn from(value: #enum_ident) -> i32 {
                ::protoforge::ProtoEnum::to_i32(value)
            }
        }

        impl ::core::convert::From<i32> for #enum_ident {
            fn from(value: i32) -> Self {
                ::protoforge::ProtoEnum::from_i32(value)
            }
        }

        impl ::core::cmp::PartialEq for #enum_ident {
            fn eq(&self, other: &Self) -> bool {
                i32::from(*self) == i32::from(*other)
            }
        }

        impl ::core::cmp::Eq for #enum_ident {}

        impl ::core::hash::Hash for #enum_ident {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                ::core::hash::Hash::hash(&i32::from(*self), state);
            }
        }

        impl ::core::cmp::PartialOrd for #enum_ident {
            fn partial_cmp(&self, other: &Self) -> ::core::option::Option<::core::cmp::Ordering> {
                ::core::option::Option::Some(::core::cmp::Ord::cmp(self, other))
            }
        }

        impl ::core::cmp::Ord for #enum_ident {
            fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                ::core::cmp::Ord::cmp(&i32::from(*self), &i32::from(*other))
            }
        }
    })
}
