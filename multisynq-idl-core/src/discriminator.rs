//! Discriminator lookups.
//!
//! Discriminators are taken verbatim from the interface description and
//! never recomputed from a hash of the name. A stale description therefore
//! only shows up as a decode or submission failure downstream.

use crate::error::{InterfaceError, InterfaceResult, NameKind};
use crate::schema::{AccountSchema, CanonicalSchema, Discriminator, InstructionSchema, DISCRIMINATOR_LEN};

/// Look up the discriminator of an instruction or account type.
pub fn discriminator_for(
    schema: &CanonicalSchema,
    kind: NameKind,
    name: &str,
) -> InterfaceResult<Discriminator> {
    let found = match kind {
        NameKind::Instruction => schema.instruction(name).map(|ix| ix.discriminator),
        NameKind::AccountType => schema.account_type(name).map(|a| a.discriminator),
    };
    found.ok_or_else(|| InterfaceError::UnknownName {
        kind,
        name: name.to_string(),
    })
}

/// Identify instruction data by its leading 8 bytes.
pub fn instruction_for<'a>(schema: &'a CanonicalSchema, data: &[u8]) -> Option<&'a InstructionSchema> {
    let prefix = data.get(..DISCRIMINATOR_LEN)?;
    schema.instructions().iter().find(|ix| ix.discriminator == prefix)
}

/// Identify account data by its leading 8 bytes.
pub fn account_type_for<'a>(schema: &'a CanonicalSchema, data: &[u8]) -> Option<&'a AccountSchema> {
    let prefix = data.get(..DISCRIMINATOR_LEN)?;
    schema.account_types().iter().find(|a| a.discriminator == prefix)
}
