//! Canonical schema and the normalization step that produces it.
//!
//! [`normalize`] joins account declarations with their backing type
//! definitions, resolves every field and argument through the alias table,
//! and carries PDA seed descriptors through untouched. The result is
//! immutable; encoders and decoders only ever borrow it.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::error::{InterfaceError, InterfaceResult};
use crate::idl::{
    IdlAccountDef, IdlAccountItem, IdlField, IdlInstruction, IdlSeed, IdlTypeBody, IdlTypeDef,
    RawInterfaceDescription,
};
use crate::pubkey::Pubkey;
use crate::types::{self, FieldSpec, WireType};

/// Length of every discriminator in the observed wire format.
pub const DISCRIMINATOR_LEN: usize = 8;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// Largest fixed layout a schema may declare, discriminator included. This
/// is the maximum size of an account's data on the ledger.
pub const MAX_LAYOUT_LEN: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CanonicalSchema {
    pub address: Pubkey,
    pub name: String,
    pub version: String,
    account_types: Vec<AccountSchema>,
    instructions: Vec<InstructionSchema>,
}

/// Ordered field layout of an account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSchema {
    pub name: String,
    pub discriminator: Discriminator,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSchema {
    pub name: String,
    pub discriminator: Discriminator,
    pub args: Vec<FieldSpec>,
    pub accounts: Vec<AccountRef>,
}

/// An account an instruction expects, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub name: String,
    pub is_signer: bool,
    pub is_writable: bool,
    pub optional: bool,
    /// Fixed address, e.g. the system program.
    pub address: Option<Pubkey>,
    pub pda: Option<PdaSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdaSpec {
    pub seeds: Vec<SeedDescriptor>,
    /// Derive under this program instead of the schema's own address.
    pub program: Option<SeedDescriptor>,
}

/// One PDA seed. Resolution and hashing happen when the transaction is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedDescriptor {
    Literal(Vec<u8>),
    Account { path: String, wire_type: Option<WireType> },
    Arg { path: String, wire_type: Option<WireType> },
}

impl AccountSchema {
    /// Sum of field widths, excluding the discriminator.
    pub fn data_len(&self) -> Option<usize> {
        types::total_width(&self.fields)
    }
}

impl InstructionSchema {
    pub fn args_len(&self) -> Option<usize> {
        types::total_width(&self.args)
    }
}

impl CanonicalSchema {
    /// Parse and normalize an interface description in one step.
    pub fn from_json(json: &str) -> InterfaceResult<Self> {
        normalize(&RawInterfaceDescription::from_json(json)?)
    }

    pub fn account_types(&self) -> &[AccountSchema] {
        &self.account_types
    }

    pub fn instructions(&self) -> &[InstructionSchema] {
        &self.instructions
    }

    pub fn account_type(&self, name: &str) -> Option<&AccountSchema> {
        self.account_types.iter().find(|a| a.name == name)
    }

    pub fn instruction(&self, name: &str) -> Option<&InstructionSchema> {
        self.instructions.iter().find(|ix| ix.name == name)
    }
}

/// Named struct definitions available for joins and nested references.
struct TypeTable<'a> {
    defs: HashMap<&'a str, &'a IdlTypeBody>,
}

impl<'a> TypeTable<'a> {
    fn new(types: &'a [IdlTypeDef]) -> InterfaceResult<Self> {
        let mut defs: HashMap<&str, &IdlTypeBody> = HashMap::new();
        for def in types {
            if let Some(existing) = defs.insert(&def.name, &def.type_) {
                if *existing != def.type_ {
                    return Err(InterfaceError::conflict(&def.name, "type is defined twice with different bodies"));
                }
            }
        }
        Ok(Self { defs })
    }

    fn get(&self, name: &str) -> Option<&'a IdlTypeBody> {
        self.defs.get(name).copied()
    }

    fn resolve_fields(&self, fields: &[IdlField], stack: &mut Vec<String>) -> InterfaceResult<Vec<FieldSpec>> {
        fields.iter().map(|f| self.resolve_field(f, stack)).collect()
    }

    fn resolve_field(&self, field: &IdlField, stack: &mut Vec<String>) -> InterfaceResult<FieldSpec> {
        let resolved = types::resolve(&field.type_);
        let wire_type = match resolved.wire_type {
            WireType::Named(name) => match self.get(&name) {
                Some(body) if body.kind == "struct" => {
                    if stack.contains(&name) {
                        return Err(InterfaceError::conflict(&name, "type refers to itself"));
                    }
                    stack.push(name.clone());
                    let fields = self.resolve_fields(&body.fields, stack)?;
                    stack.pop();
                    WireType::Struct { name, fields }
                }
                _ => WireType::Named(name),
            },
            other => other,
        };
        Ok(FieldSpec {
            name: field.name.clone(),
            byte_width: wire_type.byte_width(),
            wire_type,
        })
    }
}

/// Normalize a raw interface description into the canonical schema.
///
/// Fails fast: a structural error anywhere aborts the whole schema.
pub fn normalize(raw: &RawInterfaceDescription) -> InterfaceResult<CanonicalSchema> {
    let address = Pubkey::from_str(&raw.address)?;
    let table = TypeTable::new(&raw.types)?;

    let mut account_types: Vec<AccountSchema> = Vec::with_capacity(raw.accounts.len());
    for account in &raw.accounts {
        let resolved = normalize_account(account, &table)?;
        match account_types.iter().find(|a| a.name == resolved.name) {
            Some(existing) if *existing != resolved => {
                return Err(InterfaceError::conflict(&resolved.name, "account is declared twice with different layouts"));
            }
            Some(_) => {}
            None => account_types.push(resolved),
        }
    }
    ensure_unique(account_types.iter().map(|a| (a.name.as_str(), &a.discriminator)))?;

    let mut instructions: Vec<InstructionSchema> = Vec::with_capacity(raw.instructions.len());
    for ix in &raw.instructions {
        if instructions.iter().any(|i| i.name == ix.name) {
            return Err(InterfaceError::conflict(&ix.name, "instruction is declared twice"));
        }
        instructions.push(normalize_instruction(ix, &table)?);
    }
    ensure_unique(instructions.iter().map(|i| (i.name.as_str(), &i.discriminator)))?;

    let (name, version) = raw
        .metadata
        .as_ref()
        .map(|m| (m.name.clone(), m.version.clone()))
        .unwrap_or_default();

    Ok(CanonicalSchema {
        address,
        name,
        version,
        account_types,
        instructions,
    })
}

fn normalize_account(account: &IdlAccountDef, table: &TypeTable<'_>) -> InterfaceResult<AccountSchema> {
    let body = match (&account.type_, table.get(&account.name)) {
        (Some(inline), Some(named)) if inline != named => {
            return Err(InterfaceError::conflict(&account.name, "inline account layout disagrees with its type definition"));
        }
        (Some(inline), _) => inline,
        (None, Some(named)) => named,
        (None, None) => {
            return Err(InterfaceError::MissingTypeDefinition {
                account: account.name.clone(),
                type_name: account.name.clone(),
            })
        }
    };
    if body.kind != "struct" {
        return Err(InterfaceError::conflict(
            &account.name,
            format!("account layout must be a struct, found kind '{}'", body.kind),
        ));
    }

    let mut stack = vec![account.name.clone()];
    let fields = table.resolve_fields(&body.fields, &mut stack)?;
    check_layout(&account.name, &fields)?;
    Ok(AccountSchema {
        name: account.name.clone(),
        discriminator: to_discriminator(&account.name, &account.discriminator)?,
        fields,
    })
}

fn normalize_instruction(ix: &IdlInstruction, table: &TypeTable<'_>) -> InterfaceResult<InstructionSchema> {
    let args = table.resolve_fields(&ix.args, &mut Vec::new())?;
    check_layout(&ix.name, &args)?;
    Ok(InstructionSchema {
        name: ix.name.clone(),
        discriminator: to_discriminator(&ix.name, &ix.discriminator)?,
        args,
        accounts: ix.accounts.iter().map(normalize_account_ref).collect::<InterfaceResult<_>>()?,
    })
}

fn normalize_account_ref(item: &IdlAccountItem) -> InterfaceResult<AccountRef> {
    let address = item.address.as_deref().map(Pubkey::from_str).transpose()?;
    let pda = item.pda.as_ref().map(|pda| PdaSpec {
        seeds: pda.seeds.iter().map(normalize_seed).collect(),
        program: pda.program.as_ref().map(normalize_seed),
    });
    Ok(AccountRef {
        name: item.name.clone(),
        is_signer: item.signer,
        is_writable: item.writable,
        optional: item.optional,
        address,
        pda,
    })
}

fn normalize_seed(seed: &IdlSeed) -> SeedDescriptor {
    match seed {
        IdlSeed::Const { value } => SeedDescriptor::Literal(value.to_bytes()),
        IdlSeed::Account { path, type_ } => SeedDescriptor::Account {
            path: path.clone(),
            wire_type: type_.as_ref().map(|t| types::resolve(t).wire_type),
        },
        IdlSeed::Arg { path, type_ } => SeedDescriptor::Arg {
            path: path.clone(),
            wire_type: type_.as_ref().map(|t| types::resolve(t).wire_type),
        },
    }
}

/// Reject layouts whose fixed part, discriminator included, would not fit
/// in [`MAX_LAYOUT_LEN`]. Fields without a fixed width are skipped here and
/// reported by the codec.
fn check_layout(name: &str, fields: &[FieldSpec]) -> InterfaceResult<()> {
    let too_large = || InterfaceError::conflict(name, format!("fixed layout exceeds {} bytes", MAX_LAYOUT_LEN));
    let mut total = DISCRIMINATOR_LEN;
    for field in fields {
        if let WireType::Struct { fields: nested, .. } = &field.wire_type {
            check_layout(name, nested)?;
        }
        if let Some(width) = field.byte_width {
            total = total
                .checked_add(width)
                .filter(|t| *t <= MAX_LAYOUT_LEN)
                .ok_or_else(too_large)?;
        }
    }
    Ok(())
}

fn to_discriminator(name: &str, bytes: &[u8]) -> InterfaceResult<Discriminator> {
    Discriminator::try_from(bytes).map_err(|_| InterfaceError::InvalidDiscriminator {
        name: name.to_string(),
        actual: bytes.len(),
    })
}

fn ensure_unique<'a>(entries: impl Iterator<Item = (&'a str, &'a Discriminator)>) -> InterfaceResult<()> {
    let mut seen: HashSet<&Discriminator> = HashSet::new();
    for (name, disc) in entries {
        if !seen.insert(disc) {
            return Err(InterfaceError::conflict(name, format!("discriminator {:?} is already in use", disc)));
        }
    }
    Ok(())
}
