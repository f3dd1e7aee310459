//! Seed resolution for program-derived addresses.
//!
//! Turns the schema's seed descriptors into concrete byte sequences. The
//! address itself is derived by the ledger client, which owns the hashing.

use std::collections::HashMap;

use multisynq_idl_core::encode::encode_value;
use multisynq_idl_core::pubkey::Pubkey;
use multisynq_idl_core::schema::{PdaSpec, SeedDescriptor};
use multisynq_idl_core::types::FieldSpec;
use multisynq_idl_core::value::Value;
use multisynq_idl_core::wire::WireWriter;

/// Seeds ready for derivation, plus the program to derive under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPda {
    pub seeds: Vec<Vec<u8>>,
    pub program: Pubkey,
}

/// Resolve every seed of `pda` in order.
///
/// `accounts` holds the keys already known for this instruction; `args`
/// the parsed arguments with their declared specs.
pub fn resolve_pda(
    pda: &PdaSpec,
    program_id: &Pubkey,
    accounts: &HashMap<String, Pubkey>,
    args: &HashMap<String, (&FieldSpec, &Value)>,
) -> Result<ResolvedPda, String> {
    let seeds = pda
        .seeds
        .iter()
        .map(|s| resolve_seed(s, accounts, args))
        .collect::<Result<Vec<_>, _>>()?;
    let program = match &pda.program {
        None => *program_id,
        Some(seed) => {
            let bytes = resolve_seed(seed, accounts, args)?;
            Pubkey::try_from_slice(&bytes)
                .ok_or_else(|| format!("PDA program seed resolved to {} bytes, expected 32", bytes.len()))?
        }
    };
    Ok(ResolvedPda { seeds, program })
}

fn resolve_seed(
    seed: &SeedDescriptor,
    accounts: &HashMap<String, Pubkey>,
    args: &HashMap<String, (&FieldSpec, &Value)>,
) -> Result<Vec<u8>, String> {
    match seed {
        SeedDescriptor::Literal(bytes) => Ok(bytes.clone()),
        SeedDescriptor::Account { path, .. } => accounts
            .get(path)
            .map(|key| key.to_bytes().to_vec())
            .ok_or_else(|| format!("PDA seed references account '{}' which hasn't been resolved yet", path)),
        SeedDescriptor::Arg { path, wire_type } => {
            let (spec, value) = args
                .get(path)
                .ok_or_else(|| format!("PDA seed references unknown argument '{}'", path))?;
            let ty = wire_type.as_ref().unwrap_or(&spec.wire_type);
            let mut out = WireWriter::default();
            encode_value(&mut out, path, ty, value).map_err(|e| e.to_string())?;
            Ok(out.into_inner())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisynq_idl_core::types::WireType;

    #[test]
    fn literal_account_and_arg_seeds() {
        let owner = Pubkey::new([4u8; 32]);
        let program = Pubkey::new([9u8; 32]);
        let spec = FieldSpec { name: "index".into(), wire_type: WireType::Unsigned(2), byte_width: Some(2) };
        let value = Value::Unsigned(258);

        let accounts = HashMap::from([("owner".to_string(), owner)]);
        let args = HashMap::from([("index".to_string(), (&spec, &value))]);
        let pda = PdaSpec {
            seeds: vec![
                SeedDescriptor::Literal(b"vault".to_vec()),
                SeedDescriptor::Account { path: "owner".into(), wire_type: None },
                SeedDescriptor::Arg { path: "index".into(), wire_type: None },
            ],
            program: None,
        };

        let resolved = resolve_pda(&pda, &program, &accounts, &args).unwrap();
        assert_eq!(resolved.program, program);
        assert_eq!(resolved.seeds, vec![b"vault".to_vec(), vec![4u8; 32], vec![2, 1]]);
    }

    #[test]
    fn unresolved_account_seed_fails() {
        let pda = PdaSpec {
            seeds: vec![SeedDescriptor::Account { path: "owner".into(), wire_type: None }],
            program: None,
        };
        let err = resolve_pda(&pda, &Pubkey::default(), &HashMap::new(), &HashMap::new()).unwrap_err();
        assert!(err.contains("owner"));
    }

    #[test]
    fn foreign_program_seed() {
        let foreign = Pubkey::new([3u8; 32]);
        let pda = PdaSpec {
            seeds: vec![SeedDescriptor::Literal(b"x".to_vec())],
            program: Some(SeedDescriptor::Literal(foreign.to_bytes().to_vec())),
        };
        let resolved = resolve_pda(&pda, &Pubkey::default(), &HashMap::new(), &HashMap::new()).unwrap();
        assert_eq!(resolved.program, foreign);
    }
}
