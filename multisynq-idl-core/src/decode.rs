//! Account and instruction data decoding.
//!
//! Account decoding is a two-stage pipeline:
//!
//! 1. **Schema path**: check the length against the canonical layout, skip
//!    the 8-byte discriminator (not re-validated), and read each field in
//!    declaration order.
//! 2. **Fallback path**: if stage 1 fails on an account type shaped like the
//!    synchronizer, read its stable prefix at fixed offsets
//!    ([`LegacySynchronizerLayout`]). If that also fails, the decode fails.
//!    There is no third stage.

use std::ops::Range;

use crate::discriminator::instruction_for;
use crate::error::{InterfaceError, InterfaceResult, NameKind};
use crate::pubkey::{Pubkey, PUBKEY_BYTES};
use crate::schema::{AccountSchema, CanonicalSchema, DISCRIMINATOR_LEN};
use crate::types::{FieldSpec, WireType};
use crate::value::Value;
use crate::wire::{trim_trailing_zeros, WireReader};

/// Which stage produced a [`DecodedAccount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodePath {
    Schema,
    /// The schema path failed with `cause` and the fixed-offset layout was used.
    Fallback { cause: InterfaceError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAccount {
    pub account_type: String,
    pub fields: Vec<(String, Value)>,
    pub path: DecodePath,
}

impl DecodedAccount {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self.path, DecodePath::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub name: String,
    pub args: Vec<(String, Value)>,
}

/// Decode raw account bytes as `account_type`.
///
/// An unknown account type is reported directly. A failure of the schema
/// path triggers the fallback exactly once, and only for account types whose
/// declared layout begins with the synchronizer prefix. Every other type
/// reports the schema-path error.
pub fn decode_account(
    schema: &CanonicalSchema,
    account_type: &str,
    raw: &[u8],
) -> InterfaceResult<DecodedAccount> {
    let account = schema.account_type(account_type).ok_or_else(|| InterfaceError::UnknownName {
        kind: NameKind::AccountType,
        name: account_type.to_string(),
    })?;

    match decode_with_schema(account, raw) {
        Ok(fields) => Ok(DecodedAccount {
            account_type: account.name.clone(),
            fields,
            path: DecodePath::Schema,
        }),
        Err(cause) if LegacySynchronizerLayout::matches(account) => {
            let fields = LegacySynchronizerLayout::decode(&account.name, raw)?;
            Ok(DecodedAccount {
                account_type: account.name.clone(),
                fields,
                path: DecodePath::Fallback { cause },
            })
        }
        Err(cause) => Err(cause),
    }
}

/// Schema path only: decode `raw` against `account`'s declared fields.
pub fn decode_with_schema(account: &AccountSchema, raw: &[u8]) -> InterfaceResult<Vec<(String, Value)>> {
    let body_len = fixed_len(&account.name, &account.fields)?;
    decode_body(&account.name, &account.fields, body_len, raw)
}

/// Identify instruction data by discriminator and decode its arguments.
pub fn decode_instruction_data(schema: &CanonicalSchema, data: &[u8]) -> InterfaceResult<DecodedInstruction> {
    let ix = instruction_for(schema, data).ok_or_else(|| InterfaceError::UnknownName {
        kind: NameKind::Instruction,
        name: format!("<discriminator {:?}>", data.get(..DISCRIMINATOR_LEN).unwrap_or(data)),
    })?;
    let body_len = fixed_len(&ix.name, &ix.args)?;
    Ok(DecodedInstruction {
        name: ix.name.clone(),
        args: decode_body(&ix.name, &ix.args, body_len, data)?,
    })
}

fn fixed_len(owner: &str, fields: &[FieldSpec]) -> InterfaceResult<usize> {
    fields.iter().try_fold(0usize, |acc, f| {
        let width = f.byte_width.ok_or_else(|| InterfaceError::UnsupportedType {
            field: f.name.clone(),
            type_name: f.wire_type.to_string(),
        })?;
        acc.checked_add(width).ok_or_else(|| width_overflow(owner))
    })
}

fn width_overflow(owner: &str) -> InterfaceError {
    InterfaceError::SchemaConflict {
        name: owner.to_string(),
        reason: "declared field widths overflow the addressable size".to_string(),
    }
}

fn decode_body(
    owner: &str,
    fields: &[FieldSpec],
    body_len: usize,
    raw: &[u8],
) -> InterfaceResult<Vec<(String, Value)>> {
    let required = DISCRIMINATOR_LEN.checked_add(body_len).ok_or_else(|| width_overflow(owner))?;
    if raw.len() < required {
        return Err(InterfaceError::TruncatedAccountData {
            account: owner.to_string(),
            required,
            actual: raw.len(),
        });
    }
    let mut reader = WireReader::new(raw);
    reader.take(DISCRIMINATOR_LEN);
    let mut ctx = DecodeCtx { owner, total: raw.len(), reader };
    let mut out = Vec::with_capacity(fields.len());
    for f in fields {
        out.push((f.name.clone(), ctx.value(&f.name, &f.wire_type)?));
    }
    Ok(out)
}

struct DecodeCtx<'a> {
    owner: &'a str,
    total: usize,
    reader: WireReader<'a>,
}

impl<'a> DecodeCtx<'a> {
    fn truncated(&self, wanted: usize) -> InterfaceError {
        InterfaceError::TruncatedAccountData {
            account: self.owner.to_string(),
            required: self.reader.position() + wanted,
            actual: self.total,
        }
    }

    fn take(&mut self, n: usize) -> InterfaceResult<&'a [u8]> {
        match self.reader.take(n) {
            Some(bytes) => Ok(bytes),
            None => Err(self.truncated(n)),
        }
    }

    fn unsigned(&mut self, field: &str, width: usize) -> InterfaceResult<u128> {
        let value = match width {
            1 => self.reader.read::<u8>(1).map(u128::from),
            2 => self.reader.read::<u16>(2).map(u128::from),
            4 => self.reader.read::<u32>(4).map(u128::from),
            8 => self.reader.read::<u64>(8).map(u128::from),
            16 => self.reader.read::<u128>(16),
            _ => {
                return Err(InterfaceError::UnsupportedType {
                    field: field.to_string(),
                    type_name: format!("u{}", width * 8),
                })
            }
        };
        value.ok_or_else(|| self.truncated(width))
    }

    fn value(&mut self, field: &str, wire_type: &WireType) -> InterfaceResult<Value> {
        Ok(match wire_type {
            WireType::Unsigned(width) => Value::Unsigned(self.unsigned(field, *width)?),
            WireType::Bool => Value::Bool(self.take(1)?[0] != 0),
            WireType::FixedBytes(len) => Value::Bytes(trim_trailing_zeros(self.take(*len)?).to_vec()),
            WireType::Pubkey => {
                let bytes = self.take(PUBKEY_BYTES)?;
                Value::Pubkey(Pubkey::try_from_slice(bytes).ok_or_else(|| self.truncated(PUBKEY_BYTES))?)
            }
            WireType::Struct { fields, .. } => {
                let mut out = Vec::with_capacity(fields.len());
                for spec in fields {
                    let nested = format!("{}.{}", field, spec.name);
                    out.push((spec.name.clone(), self.value(&nested, &spec.wire_type)?));
                }
                Value::Struct(out)
            }
            WireType::Text | WireType::Named(_) => {
                return Err(InterfaceError::UnsupportedType {
                    field: field.to_string(),
                    type_name: wire_type.to_string(),
                })
            }
        })
    }
}

/// Fixed-offset layout of the synchronizer account's stable prefix.
///
/// `[0:8)` discriminator, `[8:40)` owner key, `[40:72)` location text
/// (zero-padded), `[72]` active flag. Anything after byte 72 is scratch
/// space whose shape may change between program versions and is ignored.
#[derive(Debug, Clone, Copy)]
pub struct LegacySynchronizerLayout;

impl LegacySynchronizerLayout {
    pub const OWNER: Range<usize> = 8..40;
    pub const LOCATION: Range<usize> = 40..72;
    pub const IS_ACTIVE: usize = 72;
    pub const MIN_LEN: usize = 73;

    /// Whether `account` declares the synchronizer prefix: `owner: pubkey`,
    /// `location: [u8; 32]`, `is_active: bool`, in that order.
    pub fn matches(account: &AccountSchema) -> bool {
        let expected: [(&str, WireType); 3] = [
            ("owner", WireType::Pubkey),
            ("location", WireType::FixedBytes(Self::LOCATION.end - Self::LOCATION.start)),
            ("is_active", WireType::Bool),
        ];
        account.fields.len() >= expected.len()
            && account
                .fields
                .iter()
                .zip(expected.iter())
                .all(|(f, (name, ty))| f.name == *name && f.wire_type == *ty)
    }

    /// Decode `owner`, `location` and `is_active` at their fixed offsets.
    pub fn decode(account: &str, raw: &[u8]) -> InterfaceResult<Vec<(String, Value)>> {
        if raw.len() < Self::MIN_LEN {
            return Err(InterfaceError::TruncatedAccountData {
                account: account.to_string(),
                required: Self::MIN_LEN,
                actual: raw.len(),
            });
        }
        let owner = Pubkey::try_from_slice(&raw[Self::OWNER]).ok_or_else(|| InterfaceError::TruncatedAccountData {
            account: account.to_string(),
            required: Self::MIN_LEN,
            actual: raw.len(),
        })?;
        Ok(vec![
            ("owner".to_string(), Value::Pubkey(owner)),
            ("location".to_string(), Value::Bytes(trim_trailing_zeros(&raw[Self::LOCATION]).to_vec())),
            ("is_active".to_string(), Value::Bool(raw[Self::IS_ACTIVE] != 0)),
        ])
    }
}
