//! Wire types and the closed alias table that maps IDL type names onto them.

use crate::idl::IdlType;
use crate::pubkey::PUBKEY_BYTES;

/// Canonical binary representation of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    /// Little-endian unsigned integer of the given byte width.
    Unsigned(usize),
    Bool,
    /// Fixed-length byte array, zero right-padded on encode.
    FixedBytes(usize),
    Pubkey,
    /// Variable-length string. Has no positional width.
    Text,
    /// Nested struct resolved by the normalizer.
    Struct { name: String, fields: Vec<FieldSpec> },
    /// A name the alias table does not know and no type definition backs.
    Named(String),
}

/// A resolved, ordered field or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub wire_type: WireType,
    pub byte_width: Option<usize>,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub wire_type: WireType,
    pub byte_width: Option<usize>,
}

impl WireType {
    /// Fixed byte width, if the type has one.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            WireType::Unsigned(w) => Some(*w),
            WireType::Bool => Some(1),
            WireType::FixedBytes(n) => Some(*n),
            WireType::Pubkey => Some(PUBKEY_BYTES),
            WireType::Struct { fields, .. } => total_width(fields),
            WireType::Text | WireType::Named(_) => None,
        }
    }
}

/// Sum of field widths. `None` if any field has no fixed width or the sum
/// overflows `usize`.
pub fn total_width(fields: &[FieldSpec]) -> Option<usize> {
    fields
        .iter()
        .try_fold(0usize, |acc, f| f.byte_width.and_then(|w| acc.checked_add(w)))
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireType::Unsigned(w) => write!(f, "u{}", w * 8),
            WireType::Bool => write!(f, "bool"),
            WireType::FixedBytes(n) => write!(f, "[u8; {}]", n),
            WireType::Pubkey => write!(f, "pubkey"),
            WireType::Text => write!(f, "string"),
            WireType::Struct { name, .. } => write!(f, "{}", name),
            WireType::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Resolve a primitive name through the alias table.
fn resolve_primitive(name: &str) -> WireType {
    match name {
        "u8" => WireType::Unsigned(1),
        "u16" => WireType::Unsigned(2),
        "u32" => WireType::Unsigned(4),
        "u64" => WireType::Unsigned(8),
        "u128" => WireType::Unsigned(16),
        "bool" => WireType::Bool,
        "pubkey" | "publicKey" => WireType::Pubkey,
        "string" | "String" => WireType::Text,
        other => WireType::Named(other.to_string()),
    }
}

/// Map an IDL type onto its wire type and byte width.
///
/// Unknown names come back as [`WireType::Named`] with no width. Named
/// struct references are left for the normalizer to resolve.
pub fn resolve(ty: &IdlType) -> ResolvedType {
    let wire_type = match ty {
        IdlType::Primitive(p) => resolve_primitive(p),
        IdlType::Array { array } => match &*array.0 {
            IdlType::Primitive(p) if p == "u8" => WireType::FixedBytes(array.1),
            _ => WireType::Named(ty.to_string()),
        },
        IdlType::Defined { defined } => WireType::Named(defined.name().to_string()),
        IdlType::Vec { .. } | IdlType::Option { .. } => WireType::Named(ty.to_string()),
    };
    ResolvedType {
        byte_width: wire_type.byte_width(),
        wire_type,
    }
}
