//! CLI helpers: help text, argument parsing, string utilities.

use std::collections::HashMap;

use multisynq_idl_core::schema::{CanonicalSchema, InstructionSchema};
use multisynq_idl_core::types::WireType;

use crate::tx::account_flag;

/// Print help for all commands derived from the schema.
pub fn print_help(schema: &CanonicalSchema, binary_name: &str) {
    println!("🔧 {} v{} — IDL-driven CLI", display_name(schema), schema.version);
    println!();
    println!("USAGE:");
    println!("  {} [OPTIONS] <COMMAND> [ARGS]", binary_name);
    println!();
    println!("OPTIONS:");
    println!("  -i, --idl <FILE>           IDL JSON file");
    println!("  --ledger <DIR>             Account dump / transaction journal directory");
    println!("  --dry-run                  Print encoded data without submitting");
    println!();
    println!("COMMANDS:");
    println!("  idl                                  Print the normalized schema");
    println!("  decode <ACCOUNT_TYPE> --hex <HEX> | --file <PATH> | --account <KEY>");
    println!("  inspect <HEX>                        Identify instruction/account data by discriminator");
    println!("  discriminator <instruction|account> <NAME>");

    for ix in schema.instructions() {
        println!("  {:<20} {}", snake_to_kebab(&ix.name), instruction_usage(ix));
    }
    println!();
    println!("TYPE FORMATS:");
    println!("  u8, u16, u32, u64, u128  Decimal number");
    println!("  [u8; N]                  Hex string (2*N hex chars), 0x-hex, or UTF-8 string (≤N bytes, right-padded)");
    println!("  pubkey                   Base58 or 64 hex chars");
    println!("  struct                   JSON object with every field");
    println!("  string                   Not accepted: variable-length, so it has no positional encoding");
    println!();
    println!("Auto-generated from IDL. PDA accounts are passed to the ledger as seeds.");
}

fn display_name(schema: &CanonicalSchema) -> String {
    if schema.name.is_empty() {
        schema.address.to_string()
    } else {
        schema.name.clone()
    }
}

fn instruction_usage(ix: &InstructionSchema) -> String {
    let args = ix
        .args
        .iter()
        .map(|a| format!("--{} <{}>", snake_to_kebab(&a.name), wire_type_hint(&a.wire_type)));
    let accounts = ix
        .accounts
        .iter()
        .filter(|a| a.pda.is_none() && a.address.is_none())
        .map(|a| format!("--{} <PUBKEY>", account_flag(&a.name)));
    args.chain(accounts).collect::<Vec<_>>().join(" ")
}

/// Print detailed help for a single instruction.
pub fn print_instruction_help(ix: &InstructionSchema) {
    println!("📋 {} — {} account(s), {} arg(s)", ix.name, ix.accounts.len(), ix.args.len());
    println!();
    println!("ACCOUNTS:");
    for acc in &ix.accounts {
        let mut flags = vec![];
        if acc.is_writable { flags.push("mut"); }
        if acc.is_signer { flags.push("signer"); }
        if acc.optional { flags.push("optional"); }
        let flags_str = if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) };
        let note = if acc.pda.is_some() {
            " (PDA — seeds resolved automatically)".to_string()
        } else if let Some(address) = acc.address {
            format!(" (fixed: {})", address)
        } else {
            format!(" --{} <PUBKEY>", account_flag(&acc.name))
        };
        println!("  {}{}{}", acc.name, flags_str, note);
    }
    println!();
    println!("ARGS:");
    for arg in &ix.args {
        println!("  --{:<25} {} ({}) — format: {}",
            snake_to_kebab(&arg.name), arg.name, arg.wire_type, wire_type_hint(&arg.wire_type));
    }
    if ix.args.iter().any(|a| a.byte_width.is_none()) {
        println!();
        println!("⚠️  {} has an argument with no fixed wire width and cannot be encoded.", ix.name);
    }
}

/// Parse `--key value` pairs. A flag followed by another flag (or nothing)
/// is recorded as `"true"`.
pub fn parse_flags(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        if let Some(key) = args[i].strip_prefix("--") {
            if i + 1 < args.len() && !args[i + 1].starts_with("--") {
                map.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                map.insert(key.to_string(), "true".to_string());
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    map
}

/// Positional arguments, i.e. everything not consumed by `--key value`.
pub fn positionals(args: &[String]) -> Vec<String> {
    let mut out = vec![];
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += if i + 1 < args.len() && !args[i + 1].starts_with("--") { 2 } else { 1 };
        } else {
            out.push(args[i].clone());
            i += 1;
        }
    }
    out
}

// ─── String utilities ────────────────────────────────────────────

pub fn snake_to_kebab(s: &str) -> String {
    s.replace('_', "-")
}

pub fn kebab_to_snake(s: &str) -> String {
    s.replace('-', "_")
}

pub fn wire_type_hint(ty: &WireType) -> String {
    match ty {
        WireType::Unsigned(_) => "NUMBER".to_string(),
        WireType::Bool => "true|false".to_string(),
        WireType::FixedBytes(n) => format!("HEX{}|STR≤{}", n * 2, n),
        WireType::Pubkey => "PUBKEY".to_string(),
        WireType::Struct { name, .. } => format!("JSON:{}", name),
        WireType::Text => "none: variable-length string has no fixed wire width".to_string(),
        WireType::Named(name) => format!("none: '{}' has no fixed wire width", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_and_positionals() {
        let args = strings(&["Synchronizer", "extra", "--hex", "00ff", "--verbose"]);
        let flags = parse_flags(&args);
        assert_eq!(flags["hex"], "00ff");
        assert_eq!(flags["verbose"], "true");
        assert_eq!(positionals(&args), strings(&["Synchronizer", "extra"]));
    }

    #[test]
    fn hint_explains_variable_length_string() {
        let hint = wire_type_hint(&WireType::Text);
        assert!(hint.contains("variable-length"), "{}", hint);
        assert_eq!(wire_type_hint(&WireType::FixedBytes(32)), "HEX64|STR≤32");
    }

    #[test]
    fn case_conversion() {
        assert_eq!(snake_to_kebab("initialize_synchronizer"), "initialize-synchronizer");
        assert_eq!(kebab_to_snake("burn-and-mint"), "burn_and_mint");
    }
}
