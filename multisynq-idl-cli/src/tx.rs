//! Instruction building and submission.

use std::collections::HashMap;

use multisynq_idl_core::decode::{decode_account, DecodedAccount};
use multisynq_idl_core::encode::encode_instruction;
use multisynq_idl_core::pubkey::Pubkey;
use multisynq_idl_core::schema::{CanonicalSchema, InstructionSchema};
use multisynq_idl_core::types::FieldSpec;
use multisynq_idl_core::value::Value;

use crate::cli::snake_to_kebab;
use crate::hex::{hex_encode, parse_pubkey};
use crate::ledger::{AccountMetaRequest, AccountTarget, InstructionRequest, LedgerClient, LedgerError, Signature};
use crate::parse::parse_value;
use crate::pda::resolve_pda;

/// An encoded instruction with the parsed arguments that produced it.
#[derive(Debug, Clone)]
pub struct PreparedInstruction {
    pub name: String,
    pub args: Vec<(String, Value)>,
    pub request: InstructionRequest,
}

/// CLI flag naming an instruction account: `--<kebab-name>-account`.
pub fn account_flag(name: &str) -> String {
    format!("{}-account", snake_to_kebab(name))
}

/// Parse args and accounts for `ix` from CLI flags and encode the data.
///
/// Collects every problem instead of stopping at the first one.
pub fn prepare_instruction(
    schema: &CanonicalSchema,
    ix: &InstructionSchema,
    flags: &HashMap<String, String>,
) -> Result<PreparedInstruction, Vec<String>> {
    let mut errors = vec![];

    let mut missing = vec![];
    for arg in &ix.args {
        let key = snake_to_kebab(&arg.name);
        if !flags.contains_key(&key) {
            missing.push(format!("--{}", key));
        }
    }
    for acc in &ix.accounts {
        if acc.pda.is_none() && acc.address.is_none() && !acc.optional {
            let key = account_flag(&acc.name);
            if !flags.contains_key(&key) {
                missing.push(format!("--{}", key));
            }
        }
    }
    if !missing.is_empty() {
        return Err(vec![format!("Missing required arguments: {}", missing.join(", "))]);
    }

    let mut values: Vec<Value> = Vec::with_capacity(ix.args.len());
    for arg in &ix.args {
        let key = snake_to_kebab(&arg.name);
        match parse_value(&flags[&key], &arg.wire_type) {
            Ok(v) => values.push(v),
            Err(e) => errors.push(format!("--{}: {}", key, e)),
        }
    }

    // Explicit keys first; PDA seeds may reference them.
    let mut keys: HashMap<String, Pubkey> = HashMap::new();
    for acc in &ix.accounts {
        if let Some(address) = acc.address {
            keys.insert(acc.name.clone(), address);
        }
        if let Some(raw) = flags.get(&account_flag(&acc.name)) {
            match parse_pubkey(raw) {
                Ok(key) => {
                    keys.insert(acc.name.clone(), key);
                }
                Err(e) => errors.push(format!("--{}: {}", account_flag(&acc.name), e)),
            }
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let data = encode_instruction(schema, &ix.name, &values).map_err(|e| vec![e.to_string()])?;

    let arg_map: HashMap<String, (&FieldSpec, &Value)> = ix
        .args
        .iter()
        .zip(&values)
        .map(|(spec, value)| (spec.name.clone(), (spec, value)))
        .collect();

    let mut accounts = Vec::with_capacity(ix.accounts.len());
    for acc in &ix.accounts {
        let target = match (&acc.pda, keys.get(&acc.name)) {
            (_, Some(key)) => AccountTarget::Key(*key),
            (Some(pda), None) => match resolve_pda(pda, &schema.address, &keys, &arg_map) {
                Ok(resolved) => AccountTarget::Derived {
                    seeds: resolved.seeds,
                    program: resolved.program,
                },
                Err(e) => {
                    errors.push(format!("Failed to resolve PDA seeds for '{}': {}", acc.name, e));
                    continue;
                }
            },
            // Optional account left out: the program id stands in for it.
            (None, None) => AccountTarget::Key(schema.address),
        };
        accounts.push(AccountMetaRequest {
            name: acc.name.clone(),
            target,
            is_signer: acc.is_signer,
            is_writable: acc.is_writable,
        });
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(PreparedInstruction {
        name: ix.name.clone(),
        args: ix.args.iter().map(|a| a.name.clone()).zip(values).collect(),
        request: InstructionRequest {
            program_id: schema.address,
            accounts,
            data,
        },
    })
}

/// Print a prepared instruction the way `--dry-run` shows it.
pub fn print_prepared(prepared: &PreparedInstruction) {
    println!("📋 Instruction: {}", prepared.name);
    println!();
    println!("Accounts:");
    for acc in &prepared.request.accounts {
        let mut flags = vec![];
        if acc.is_writable { flags.push("mut"); }
        if acc.is_signer { flags.push("signer"); }
        let flags_str = if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) };
        match &acc.target {
            AccountTarget::Key(key) => println!("  📦 {}{} → {}", acc.name, flags_str, key),
            AccountTarget::Derived { seeds, program } => {
                let seed_strs: Vec<String> = seeds.iter().map(|s| format!("0x{}", hex_encode(s))).collect();
                println!("  📦 {}{} → PDA of {} seeds [{}]", acc.name, flags_str, program, seed_strs.join(", "));
            }
        }
    }
    println!();
    println!("Arguments (parsed):");
    for (name, val) in &prepared.args {
        println!("  {} = {}", name, val);
    }
    println!();
    println!("🔧 Instruction data ({} bytes):", prepared.request.data.len());
    println!("    {}", hex_encode(&prepared.request.data));
    println!();
}

/// Submit a prepared instruction and wait for confirmation.
pub async fn execute_instruction<C: LedgerClient>(
    client: &C,
    prepared: &PreparedInstruction,
) -> Result<Signature, LedgerError> {
    let signature = client
        .submit_transaction(std::slice::from_ref(&prepared.request))
        .await?;
    client.confirm(&signature).await?;
    Ok(signature)
}

/// Fetch an account through the collaborator and decode it.
pub async fn fetch_account<C: LedgerClient>(
    client: &C,
    schema: &CanonicalSchema,
    account_type: &str,
    address: &Pubkey,
) -> Result<DecodedAccount, LedgerError> {
    let raw = client
        .get_account_bytes(address)
        .await?
        .ok_or(LedgerError::AccountNotFound(*address))?;
    Ok(decode_account(schema, account_type, &raw)?)
}
