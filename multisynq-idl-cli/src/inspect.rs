//! Schema and data inspection: print layouts, identify buffers by
//! discriminator, show decoded contents.

use multisynq_idl_core::decode::{decode_account, decode_instruction_data, DecodePath, DecodedAccount, DecodedInstruction};
use multisynq_idl_core::discriminator::{account_type_for, instruction_for};
use multisynq_idl_core::error::InterfaceResult;
use multisynq_idl_core::schema::{CanonicalSchema, SeedDescriptor, DISCRIMINATOR_LEN};
use multisynq_idl_core::types::FieldSpec;

use crate::hex::hex_encode;

/// What a raw buffer turned out to be.
#[derive(Debug)]
pub enum Inspection {
    Instruction(DecodedInstruction),
    Account(DecodedAccount),
}

/// Identify `bytes` by its discriminator and decode it.
///
/// Instruction discriminators are tried first. Returns `Ok(None)` when no
/// discriminator matches.
pub fn inspect_bytes(schema: &CanonicalSchema, bytes: &[u8]) -> InterfaceResult<Option<Inspection>> {
    if instruction_for(schema, bytes).is_some() {
        return decode_instruction_data(schema, bytes).map(|d| Some(Inspection::Instruction(d)));
    }
    match account_type_for(schema, bytes) {
        Some(account) => decode_account(schema, &account.name, bytes).map(|d| Some(Inspection::Account(d))),
        None => Ok(None),
    }
}

/// Print the normalized schema with field offsets.
pub fn print_schema(schema: &CanonicalSchema) {
    println!("📦 {} v{}", schema.name, schema.version);
    println!("   address: {}", schema.address);
    println!();
    println!("ACCOUNT TYPES:");
    for account in schema.account_types() {
        let size = account
            .data_len()
            .map(|n| format!("{} bytes", DISCRIMINATOR_LEN + n))
            .unwrap_or_else(|| "variable".to_string());
        println!("  {} ({}) discriminator 0x{}", account.name, size, hex_encode(&account.discriminator));
        print_fields(&account.fields);
    }
    println!();
    println!("INSTRUCTIONS:");
    for ix in schema.instructions() {
        println!("  {} discriminator 0x{}", ix.name, hex_encode(&ix.discriminator));
        print_fields(&ix.args);
        for acc in &ix.accounts {
            let mut flags = vec![];
            if acc.is_writable { flags.push("mut"); }
            if acc.is_signer { flags.push("signer"); }
            if acc.optional { flags.push("optional"); }
            print!("    account {}", acc.name);
            if !flags.is_empty() {
                print!(" [{}]", flags.join(", "));
            }
            if let Some(address) = acc.address {
                print!(" = {}", address);
            }
            if let Some(pda) = &acc.pda {
                let seeds: Vec<String> = pda.seeds.iter().map(describe_seed).collect();
                print!(" PDA seeds [{}]", seeds.join(", "));
            }
            println!();
        }
    }
}

fn print_fields(fields: &[FieldSpec]) {
    let mut offset = Some(DISCRIMINATOR_LEN);
    for field in fields {
        let at = offset.map(|o| format!("@{:<4}", o)).unwrap_or_else(|| "@?   ".to_string());
        let width = field.byte_width.map(|w| w.to_string()).unwrap_or_else(|| "?".to_string());
        println!("    {} {:<20} {} ({} bytes)", at, field.name, field.wire_type, width);
        offset = offset.zip(field.byte_width).map(|(o, w)| o + w);
    }
}

fn describe_seed(seed: &SeedDescriptor) -> String {
    match seed {
        SeedDescriptor::Literal(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => format!("\"{}\"", s),
            Err(_) => format!("0x{}", hex_encode(bytes)),
        },
        SeedDescriptor::Account { path, .. } => format!("account:{}", path),
        SeedDescriptor::Arg { path, .. } => format!("arg:{}", path),
    }
}

pub fn print_decoded_account(decoded: &DecodedAccount) {
    println!("📦 {}", decoded.account_type);
    for (name, value) in &decoded.fields {
        println!("   {}: {}", name, value);
    }
    if let DecodePath::Fallback { cause } = &decoded.path {
        println!();
        println!("⚠️  Schema decode failed ({}); fixed-offset layout used.", cause);
    }
}

pub fn print_decoded_instruction(decoded: &DecodedInstruction) {
    println!("📋 {}", decoded.name);
    for (name, value) in &decoded.args {
        println!("   {}: {}", name, value);
    }
}
