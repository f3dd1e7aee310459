//! Raw interface description (IDL) as emitted by the Anchor toolchain.
//!
//! This is the unprocessed input: type aliases, named struct types and
//! per-instruction account/argument lists exactly as they appear in the
//! JSON document. [`crate::schema::normalize`] turns it into the canonical
//! schema; nothing else in the crate reads these types directly.

use serde::{Deserialize, Serialize};

use crate::error::InterfaceResult;

/// Top-level interface description of a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInterfaceDescription {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IdlMetadata>,
    pub instructions: Vec<IdlInstruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccountDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<IdlTypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IdlErrorCode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdlMetadata {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

/// An instruction in the IDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    pub discriminator: Vec<u8>,
    pub accounts: Vec<IdlAccountItem>,
    pub args: Vec<IdlField>,
}

/// An account expected by an instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountItem {
    pub name: String,
    #[serde(default, alias = "isMut")]
    pub writable: bool,
    #[serde(default, alias = "isSigner")]
    pub signer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pda: Option<IdlPda>,
}

fn is_false(v: &bool) -> bool { !v }

/// How a program-derived account address is formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlPda {
    pub seeds: Vec<IdlSeed>,
    /// Foreign program the address is derived under, if not this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<IdlSeed>,
}

/// A seed component for PDA derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IdlSeed {
    #[serde(rename = "const")]
    Const { value: IdlSeedLiteral },
    #[serde(rename = "account")]
    Account {
        path: String,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        type_: Option<IdlType>,
    },
    #[serde(rename = "arg")]
    Arg {
        path: String,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        type_: Option<IdlType>,
    },
}

/// Literal seed, either raw bytes (`[109, 105, ...]`) or a UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlSeedLiteral {
    Bytes(Vec<u8>),
    Text(String),
}

impl IdlSeedLiteral {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            IdlSeedLiteral::Bytes(b) => b.clone(),
            IdlSeedLiteral::Text(s) => s.as_bytes().to_vec(),
        }
    }
}

/// A named, typed field (instruction argument or struct field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: IdlType,
}

/// Type representation in the IDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    Primitive(String),
    Vec { vec: Box<IdlType> },
    Option { option: Box<IdlType> },
    Defined { defined: IdlDefinedRef },
    Array { array: (Box<IdlType>, usize) },
}

/// Reference to a named type: `"Name"` (legacy) or `{"name": "Name"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlDefinedRef {
    Name(String),
    Struct { name: String },
}

impl IdlDefinedRef {
    pub fn name(&self) -> &str {
        match self {
            IdlDefinedRef::Name(n) => n,
            IdlDefinedRef::Struct { name } => name,
        }
    }
}

impl std::fmt::Display for IdlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdlType::Primitive(s) => write!(f, "{}", s),
            IdlType::Vec { vec } => write!(f, "Vec<{}>", vec),
            IdlType::Option { option } => write!(f, "Option<{}>", option),
            IdlType::Defined { defined } => write!(f, "{}", defined.name()),
            IdlType::Array { array } => write!(f, "[{}; {}]", array.0, array.1),
        }
    }
}

/// Account declaration. Modern descriptions reference a named entry in
/// `types`; legacy ones inline the struct body under `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountDef {
    pub name: String,
    #[serde(default)]
    pub discriminator: Vec<u8>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<IdlTypeBody>,
}

/// Named type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlTypeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: IdlTypeBody,
}

/// Type body (struct or enum).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlTypeBody {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<IdlField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<IdlEnumVariant>,
}

/// An enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlEnumVariant {
    pub name: String,
}

/// Error definition in the IDL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlErrorCode {
    pub code: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl RawInterfaceDescription {
    /// Parse an interface description from its JSON text.
    pub fn from_json(json: &str) -> InterfaceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the description to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
