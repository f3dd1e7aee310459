//! Positional encoder: `discriminator || field1 || field2 || ...`.
//!
//! No length prefixes and no tags. Integers are little-endian at their
//! declared width, booleans one byte, fixed byte arrays zero right-padded,
//! public keys 32 raw bytes.

use crate::discriminator::discriminator_for;
use crate::error::{InterfaceError, InterfaceResult, NameKind};
use crate::schema::{CanonicalSchema, Discriminator, DISCRIMINATOR_LEN, MAX_LAYOUT_LEN};
use crate::types::{FieldSpec, WireType};
use crate::pubkey::PUBKEY_BYTES;
use crate::value::Value;
use crate::wire::WireWriter;

/// Encode instruction data for `name`. `args` must follow declaration order.
///
/// The arity check runs before anything is written.
pub fn encode_instruction(
    schema: &CanonicalSchema,
    name: &str,
    args: &[Value],
) -> InterfaceResult<Vec<u8>> {
    let discriminator = discriminator_for(schema, NameKind::Instruction, name)?;
    let ix = schema.instruction(name).ok_or_else(|| InterfaceError::UnknownName {
        kind: NameKind::Instruction,
        name: name.to_string(),
    })?;
    if args.len() != ix.args.len() {
        return Err(InterfaceError::ArgumentCountMismatch {
            instruction: name.to_string(),
            expected: ix.args.len(),
            actual: args.len(),
        });
    }
    encode_with_prefix(&discriminator, &ix.args, args, ix.args_len())
}

/// Encode full account data (discriminator plus fields) for `name`.
pub fn encode_account(
    schema: &CanonicalSchema,
    name: &str,
    values: &[Value],
) -> InterfaceResult<Vec<u8>> {
    let discriminator = discriminator_for(schema, NameKind::AccountType, name)?;
    let account = schema.account_type(name).ok_or_else(|| InterfaceError::UnknownName {
        kind: NameKind::AccountType,
        name: name.to_string(),
    })?;
    if values.len() != account.fields.len() {
        return Err(InterfaceError::ArgumentCountMismatch {
            instruction: name.to_string(),
            expected: account.fields.len(),
            actual: values.len(),
        });
    }
    encode_with_prefix(&discriminator, &account.fields, values, account.data_len())
}

fn encode_with_prefix(
    discriminator: &Discriminator,
    fields: &[FieldSpec],
    values: &[Value],
    body_len: Option<usize>,
) -> InterfaceResult<Vec<u8>> {
    let capacity = body_len
        .and_then(|n| n.checked_add(DISCRIMINATOR_LEN))
        .unwrap_or(DISCRIMINATOR_LEN)
        .min(MAX_LAYOUT_LEN);
    let mut out = WireWriter::with_capacity(capacity);
    out.put(discriminator);
    for (field, value) in fields.iter().zip(values) {
        encode_value(&mut out, &field.name, &field.wire_type, value)?;
    }
    Ok(out.into_inner())
}

/// Encode a single value at its declared wire type.
pub fn encode_value(
    out: &mut WireWriter,
    field: &str,
    wire_type: &WireType,
    value: &Value,
) -> InterfaceResult<()> {
    match (wire_type, value) {
        (WireType::Text | WireType::Named(_), _) => Err(InterfaceError::UnsupportedType {
            field: field.to_string(),
            type_name: wire_type.to_string(),
        }),
        (WireType::Unsigned(width), Value::Unsigned(v)) => write_unsigned(out, field, *v, *width),
        (WireType::Bool, Value::Bool(b)) => {
            out.put(&[u8::from(*b)]);
            Ok(())
        }
        (WireType::FixedBytes(len), Value::Bytes(_) | Value::Text(_)) => {
            let bytes = value.as_bytes().unwrap_or_default();
            if bytes.len() > *len {
                return Err(InterfaceError::LengthMismatch {
                    field: field.to_string(),
                    expected: *len,
                    actual: bytes.len(),
                });
            }
            out.put_padded(bytes, *len);
            Ok(())
        }
        (WireType::Pubkey, Value::Pubkey(key)) => {
            out.put(key.as_bytes());
            Ok(())
        }
        (WireType::Pubkey, Value::Bytes(bytes)) => {
            if bytes.len() != PUBKEY_BYTES {
                return Err(InterfaceError::LengthMismatch {
                    field: field.to_string(),
                    expected: PUBKEY_BYTES,
                    actual: bytes.len(),
                });
            }
            out.put(bytes);
            Ok(())
        }
        (WireType::Struct { name, fields }, Value::Struct(values)) => {
            if values.len() != fields.len() {
                return Err(InterfaceError::TypeMismatch {
                    field: field.to_string(),
                    expected: format!("{} with {} fields", name, fields.len()),
                    actual: format!("struct with {} fields", values.len()),
                });
            }
            for (spec, (given, v)) in fields.iter().zip(values) {
                let nested = format!("{}.{}", field, spec.name);
                if *given != spec.name {
                    return Err(InterfaceError::TypeMismatch {
                        field: nested,
                        expected: format!("field '{}'", spec.name),
                        actual: format!("field '{}'", given),
                    });
                }
                encode_value(out, &nested, &spec.wire_type, v)?;
            }
            Ok(())
        }
        (expected, actual) => Err(InterfaceError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.kind().to_string(),
        }),
    }
}

fn write_unsigned(out: &mut WireWriter, field: &str, value: u128, width: usize) -> InterfaceResult<()> {
    let out_of_range = || InterfaceError::ValueOutOfRange {
        field: field.to_string(),
        value,
        width,
    };
    match width {
        1 => out.put(&u8::try_from(value).map_err(|_| out_of_range())?.to_le_bytes()),
        2 => out.put(&u16::try_from(value).map_err(|_| out_of_range())?.to_le_bytes()),
        4 => out.put(&u32::try_from(value).map_err(|_| out_of_range())?.to_le_bytes()),
        8 => out.put(&u64::try_from(value).map_err(|_| out_of_range())?.to_le_bytes()),
        16 => out.put(&value.to_le_bytes()),
        _ => {
            return Err(InterfaceError::UnsupportedType {
                field: field.to_string(),
                type_name: format!("u{}", width * 8),
            })
        }
    }
    Ok(())
}
