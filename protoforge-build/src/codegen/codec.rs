//! Codec generation: the decode, encode and size routines of a message.
//!
//! All three routines walk the same member list. Encode and size visit the
//! members in declaration order (a oneof sits at its first member) and
//! produce matching output by construction: every encode statement has a
//! size statement built from the same runtime helper pair.

use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;

use crate::context::GenerationContext;
use crate::error::Error;

use super::field::Field;
use super::message::Member;
use super::oneof::Oneof;
use super::types::FieldShape;

/// Generated statements for one member.
struct MemberCodec {
    decode: Vec<TokenStream>,
    encode: TokenStream,
    size: TokenStream,
}

/// Generate `impl ::protoforge::ProtoMessage` for `struct_ident`, emitted in
/// module `module`. `oneof_module` is the path from there to the module
/// holding the message's oneof enums.
pub fn generate_codec(
    ctx: &GenerationContext,
    module: &[String],
    struct_ident: &Ident,
    members: &[Member<'_>],
    oneof_module: &TokenStream,
) -> Result<TokenStream, Error> {
    let mut decode_arms = Vec::new();
    let mut encode = Vec::new();
    let mut size = Vec::new();

    for member in members {
        let codec = match member {
            Member::Field { field, shape } => field_codec(ctx, module, field, shape)?,
            Member::Oneof(oneof) => oneof_codec(ctx, module, oneof, oneof_module)?,
        };
        decode_arms.extend(codec.decode);
        encode.push(codec.encode);
        size.push(codec.size);
    }

    let decode_body = if decode_arms.is_empty() {
        quote! {
            let msg = Self::default();
            while !reader.is_empty() {
                let key = reader.read_key()?;
                reader.skip_field(key.wire_type())?;
            }
            ::core::result::Result::Ok(msg)
        }
    } else {
        quote! {
            let mut msg = Self::default();
            while !reader.is_empty() {
                let key = reader.read_key()?;
                let wire_type = key.wire_type();
                match key.field_number() {
                    #(#decode_arms)*
                    _ => reader.skip_field(wire_type)?,
                }
            }
            ::core::result::Result::Ok(msg)
        }
    };

    let encode_body = if encode.is_empty() {
        quote!(let _ = buf;)
    } else {
        quote!(#(#encode)*)
    };

    let size_body = if size.is_empty() {
        quote!(0)
    } else {
        quote! {
            let mut len = 0;
            #(#size)*
            len
        }
    };

    Ok(quote! {
        impl ::protoforge::ProtoMessage for #struct_ident {
            fn decode_message(
                reader: &mut ::protoforge::Reader<'_>,
            ) -> ::core::result::Result<Self, ::protoforge::DecodeError> {
                #decode_body
            }

            fn encode_message<B: ::protoforge::bytes::BufMut>(&self, buf: &mut B) {
                #encode_body
            }

            fn encoded_message_len(&self) -> usize {
                #size_body
            }
        }
    })
}

/// Wraps a decoded `value` for storage.
fn stored_value(field: &Field<'_>) -> TokenStream {
    if field.boxed {
        quote!(::protoforge::alloc::boxed::Box::new(value))
    } else {
        quote!(value)
    }
}

/// Borrows the stored `value` as the kind's value type.
fn borrowed_value(field: &Field<'_>) -> TokenStream {
    if field.boxed {
        quote!(&**value)
    } else {
        quote!(value)
    }
}

fn field_codec(
    ctx: &GenerationContext,
    module: &[String],
    field: &Field<'_>,
    shape: &FieldShape,
) -> Result<MemberCodec, Error> {
    let ident = field.ident();
    let number = Literal::u32_unsuffixed(field.number);
    // Map fields are coded through their key and value kinds instead.
    let marker = match shape {
        FieldShape::Map { .. } => TokenStream::new(),
        _ => field.kind.marker(ctx, module, &field.path)?,
    };

    let codec = match shape {
        FieldShape::Implicit | FieldShape::Required => {
            let field_encode = quote! {
                ::protoforge::codec::encode_field::<#marker, B>(#number, &self.#ident, buf);
            };
            let field_size = quote! {
                len += ::protoforge::codec::encoded_field_len::<#marker>(#number, &self.#ident);
            };
            let (encode, size) = if *shape == FieldShape::Implicit {
                (
                    quote! {
                        if !::protoforge::codec::is_default::<#marker>(&self.#ident) {
                            #field_encode
                        }
                    },
                    quote! {
                        if !::protoforge::codec::is_default::<#marker>(&self.#ident) {
                            #field_size
                        }
                    },
                )
            } else {
                (field_encode, field_size)
            };
            MemberCodec {
                decode: vec![quote! {
                    #number => {
                        if let ::core::option::Option::Some(value) =
                            ::protoforge::codec::decode_field::<#marker>(wire_type, reader)?
                        {
                            msg.#ident = value;
                        }
                    }
                }],
                encode,
                size,
            }
        }
        FieldShape::Optional => {
            let stored = stored_value(field);
            let borrowed = borrowed_value(field);
            MemberCodec {
                decode: vec![quote! {
                    #number => {
                        if let ::core::option::Option::Some(value) =
                            ::protoforge::codec::decode_field::<#marker>(wire_type, reader)?
                        {
                            msg.#ident = ::core::option::Option::Some(#stored);
                        }
                    }
                }],
                encode: quote! {
                    if let ::core::option::Option::Some(value) = &self.#ident {
                        ::protoforge::codec::encode_field::<#marker, B>(#number, #borrowed, buf);
                    }
                },
                size: quote! {
                    if let ::core::option::Option::Some(value) = &self.#ident {
                        len += ::protoforge::codec::encoded_field_len::<#marker>(#number, #borrowed);
                    }
                },
            }
        }
        FieldShape::Repeated { packed } => {
            let (encode_fn, len_fn) = if *packed {
                (quote!(encode_packed), quote!(encoded_packed_len))
            } else {
                (quote!(encode_repeated), quote!(encoded_repeated_len))
            };
            MemberCodec {
                decode: vec![quote! {
                    #number => ::protoforge::codec::decode_repeated::<#marker>(
                        wire_type,
                        reader,
                        &mut msg.#ident,
                    )?,
                }],
                encode: quote! {
                    ::protoforge::codec::#encode_fn::<#marker, B>(#number, &self.#ident, buf);
                },
                size: quote! {
                    len += ::protoforge::codec::#len_fn::<#marker>(#number, &self.#ident);
                },
            }
        }
        FieldShape::Map { key, value } => {
            let key = key.marker(ctx, module, &field.path)?;
            let value = value.marker(ctx, module, &field.path)?;
            MemberCodec {
                decode: vec![quote! {
                    #number => ::protoforge::codec::decode_map_entry::<#key, #value, _>(
                        wire_type,
                        reader,
                        &mut msg.#ident,
                    )?,
                }],
                encode: quote! {
                    ::protoforge::codec::encode_map::<#key, #value, _, B>(#number, &self.#ident, buf);
                },
                size: quote! {
                    len += ::protoforge::codec::encoded_map_len::<#key, #value, _>(#number, &self.#ident);
                },
            }
        }
    };
    Ok(codec)
}

fn oneof_codec(
    ctx: &GenerationContext,
    module: &[String],
    oneof: &Oneof<'_>,
    oneof_module: &TokenStream,
) -> Result<MemberCodec, Error> {
    let ident = oneof.field_ident();
    let enum_ident = oneof.type_ident();
    let enum_path = quote!(#oneof_module #enum_ident);

    let mut decode = Vec::new();
    let mut encode_arms = Vec::new();
    let mut size_arms = Vec::new();

    for member in &oneof.members {
        let field = &member.field;
        let variant = member.variant_ident();
        let number = Literal::u32_unsuffixed(field.number);
        let marker = field.kind.marker(ctx, module, &field.path)?;
        let stored = stored_value(field);
        let borrowed = borrowed_value(field);

        decode.push(quote! {
            #number => {
                if let ::core::option::Option::Some(value) =
                    ::protoforge::codec::decode_field::<#marker>(wire_type, reader)?
                {
                    msg.#ident = #enum_path::#variant(#stored);
                }
            }
        });
        encode_arms.push(quote! {
            #enum_path::#variant(value) => {
                ::protoforge::codec::encode_field::<#marker, B>(#number, #borrowed, buf)
            }
        });
        size_arms.push(quote! {
            #enum_path::#variant(value) => {
                ::protoforge::codec::encoded_field_len::<#marker>(#number, #borrowed)
            }
        });
    }

    Ok(MemberCodec {
        decode,
        encode: quote! {
            match &self.#ident {
                #(#encode_arms)*
                #enum_path::Unset => {}
            }
        },
        size: quote! {
            len += match &self.#ident {
                #(#size_arms)*
                #enum_path::Unset => 0,
            };
        },
    })
}
