//! Decoder for FileDescriptorSet from protobuf binary format.
//!
//! Written directly against the protoforge runtime: the descriptor messages
//! are decoded with the same `Reader` and field helpers generated code uses.

use protoforge::codec::{decode_field, decode_repeated};
use protoforge::wire::WireType;
use protoforge::{kind, DecodeError, Reader};

use super::*;
use crate::Error;

/// Option fields at or above this number are extensions, i.e. custom options.
const FIRST_CUSTOM_OPTION: u32 = 1000;

/// Decode a FileDescriptorSet from protobuf binary data, e.g. the output of
/// `protoc --descriptor_set_out`.
pub fn decode_file_descriptor_set(data: &[u8]) -> Result<FileDescriptorSet, Error> {
    let mut reader = Reader::new(data);
    let mut fds = FileDescriptorSet::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => {
                if let Some(mut nested) = nested(wire_type, &mut reader)? {
                    fds.file.push(decode_file_descriptor_proto(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(fds)
}

/// Opens a sub-reader for an embedded message, or skips the value if it was
/// not length-delimited.
fn nested<'a>(
    wire_type: WireType,
    reader: &mut Reader<'a>,
) -> Result<Option<Reader<'a>>, DecodeError> {
    if wire_type != WireType::Len {
        reader.skip_field(wire_type)?;
        return Ok(None);
    }
    reader.read_nested().map(Some)
}

fn string(wire_type: WireType, reader: &mut Reader<'_>) -> Result<Option<String>, DecodeError> {
    decode_field::<kind::Str>(wire_type, reader)
}

fn int32(wire_type: WireType, reader: &mut Reader<'_>) -> Result<Option<i32>, DecodeError> {
    decode_field::<kind::Int32>(wire_type, reader)
}

fn boolean(wire_type: WireType, reader: &mut Reader<'_>) -> Result<Option<bool>, DecodeError> {
    decode_field::<kind::Bool>(wire_type, reader)
}

/// Assigns `value` to `slot` if one was decoded; later occurrences win.
fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn decode_file_descriptor_proto(reader: &mut Reader<'_>) -> Result<FileDescriptorProto, DecodeError> {
    let mut fdp = FileDescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut fdp.name, string(wire_type, reader)?),
            2 => set(&mut fdp.package, string(wire_type, reader)?),
            3 => fdp.dependency.extend(string(wire_type, reader)?),
            4 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.message_type.push(decode_descriptor_proto(&mut nested)?);
                }
            }
            5 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.enum_type.push(decode_enum_descriptor_proto(&mut nested)?);
                }
            }
            7 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.extension.push(decode_field_descriptor_proto(&mut nested)?);
                }
            }
            8 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.options = Some(decode_options(&mut nested)?);
                }
            }
            9 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.source_code_info = Some(decode_source_code_info(&mut nested)?);
                }
            }
            12 => set(&mut fdp.syntax, string(wire_type, reader)?),
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(fdp)
}

/// Decode a DescriptorProto (message type).
fn decode_descriptor_proto(reader: &mut Reader<'_>) -> Result<DescriptorProto, DecodeError> {
    let mut dp = DescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut dp.name, string(wire_type, reader)?),
            2 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.field.push(decode_field_descriptor_proto(&mut nested)?);
                }
            }
            3 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.nested_type.push(decode_descriptor_proto(&mut nested)?);
                }
            }
            4 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.enum_type.push(decode_enum_descriptor_proto(&mut nested)?);
                }
            }
            6 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.extension.push(decode_field_descriptor_proto(&mut nested)?);
                }
            }
            7 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.options = Some(decode_message_options(&mut nested)?);
                }
            }
            8 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    dp.oneof_decl.push(decode_oneof_descriptor_proto(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(dp)
}

fn decode_field_descriptor_proto(
    reader: &mut Reader<'_>,
) -> Result<FieldDescriptorProto, DecodeError> {
    let mut fdp = FieldDescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut fdp.name, string(wire_type, reader)?),
            3 => set(&mut fdp.number, int32(wire_type, reader)?),
            4 => set(&mut fdp.label, int32(wire_type, reader)?),
            5 => set(&mut fdp.r#type, int32(wire_type, reader)?),
            6 => set(&mut fdp.type_name, string(wire_type, reader)?),
            7 => set(&mut fdp.default_value, string(wire_type, reader)?),
            8 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    fdp.options = Some(decode_field_options(&mut nested)?);
                }
            }
            9 => set(&mut fdp.oneof_index, int32(wire_type, reader)?),
            10 => set(&mut fdp.json_name, string(wire_type, reader)?),
            17 => set(&mut fdp.proto3_optional, boolean(wire_type, reader)?),
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(fdp)
}

fn decode_enum_descriptor_proto(
    reader: &mut Reader<'_>,
) -> Result<EnumDescriptorProto, DecodeError> {
    let mut edp = EnumDescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut edp.name, string(wire_type, reader)?),
            2 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    edp.value.push(decode_enum_value_descriptor_proto(&mut nested)?);
                }
            }
            3 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    edp.options = Some(decode_options(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(edp)
}

fn decode_enum_value_descriptor_proto(
    reader: &mut Reader<'_>,
) -> Result<EnumValueDescriptorProto, DecodeError> {
    let mut evdp = EnumValueDescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut evdp.name, string(wire_type, reader)?),
            2 => set(&mut evdp.number, int32(wire_type, reader)?),
            3 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    evdp.options = Some(decode_options(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(evdp)
}

fn decode_oneof_descriptor_proto(
    reader: &mut Reader<'_>,
) -> Result<OneofDescriptorProto, DecodeError> {
    let mut odp = OneofDescriptorProto::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => set(&mut odp.name, string(wire_type, reader)?),
            2 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    odp.options = Some(decode_options(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(odp)
}

/// Decode file, enum, enum value or oneof options, keeping only the numbers
/// of custom options.
fn decode_options(reader: &mut Reader<'_>) -> Result<Options, DecodeError> {
    let mut opts = Options::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let number = key.field_number();
        if number >= FIRST_CUSTOM_OPTION {
            opts.custom_options.push(number);
        }
        reader.skip_field(key.wire_type())?;
    }

    Ok(opts)
}

fn decode_message_options(reader: &mut Reader<'_>) -> Result<MessageOptions, DecodeError> {
    let mut mo = MessageOptions::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            7 => set(&mut mo.map_entry, boolean(wire_type, reader)?),
            number => {
                if number >= FIRST_CUSTOM_OPTION {
                    mo.custom_options.push(number);
                }
                reader.skip_field(wire_type)?;
            }
        }
    }

    Ok(mo)
}

fn decode_field_options(reader: &mut Reader<'_>) -> Result<FieldOptions, DecodeError> {
    let mut fo = FieldOptions::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            2 => set(&mut fo.packed, boolean(wire_type, reader)?),
            number => {
                if number >= FIRST_CUSTOM_OPTION {
                    fo.custom_options.push(number);
                }
                reader.skip_field(wire_type)?;
            }
        }
    }

    Ok(fo)
}

fn decode_source_code_info(reader: &mut Reader<'_>) -> Result<SourceCodeInfo, DecodeError> {
    let mut info = SourceCodeInfo::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => {
                if let Some(mut nested) = nested(wire_type, reader)? {
                    info.location.push(decode_location(&mut nested)?);
                }
            }
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(info)
}

fn decode_location(reader: &mut Reader<'_>) -> Result<Location, DecodeError> {
    let mut location = Location::default();

    while !reader.is_empty() {
        let key = reader.read_key()?;
        let wire_type = key.wire_type();
        match key.field_number() {
            1 => decode_repeated::<kind::Int32>(wire_type, reader, &mut location.path)?,
            3 => set(&mut location.leading_comments, string(wire_type, reader)?),
            4 => set(&mut location.trailing_comments, string(wire_type, reader)?),
            6 => location
                .leading_detached_comments
                .extend(string(wire_type, reader)?),
            _ => reader.skip_field(wire_type)?,
        }
    }

    Ok(location)
}
