//! `multisynq-cli`: IDL-driven command line for the Multisynq program.

use std::fs;
use std::process;

use multisynq_idl_core::decode::decode_account;
use multisynq_idl_core::discriminator::discriminator_for;
use multisynq_idl_core::error::NameKind;
use multisynq_idl_core::schema::{CanonicalSchema, InstructionSchema};
use multisynq_idl_cli::cli::{kebab_to_snake, parse_flags, positionals, print_help, print_instruction_help};
use multisynq_idl_cli::hex::{hex_decode, hex_encode, parse_pubkey};
use multisynq_idl_cli::inspect::{inspect_bytes, print_decoded_account, print_decoded_instruction, print_schema, Inspection};
use multisynq_idl_cli::ledger::DirectoryLedger;
use multisynq_idl_cli::tx::{execute_instruction, fetch_account, prepare_instruction, print_prepared};

struct GlobalOptions {
    idl_path: Option<String>,
    ledger: Option<String>,
    dry_run: bool,
    rest: Vec<String>,
}

fn parse_global(args: &[String]) -> GlobalOptions {
    let mut opts = GlobalOptions { idl_path: None, ledger: None, dry_run: false, rest: vec![] };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-i" | "--idl" => opts.idl_path = iter.next().cloned(),
            "--ledger" => opts.ledger = iter.next().cloned(),
            "--dry-run" => opts.dry_run = true,
            _ => opts.rest.push(arg.clone()),
        }
    }
    opts
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", message);
    process::exit(1);
}

fn load_schema(path: &str) -> CanonicalSchema {
    let json = fs::read_to_string(path).unwrap_or_else(|e| fail(format!("Failed to read IDL '{}': {}", path, e)));
    CanonicalSchema::from_json(&json).unwrap_or_else(|e| fail(format!("Invalid IDL '{}': {}", path, e)))
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let binary_name = args.first().cloned().unwrap_or_else(|| "multisynq-cli".to_string());
    let opts = parse_global(args.get(1..).unwrap_or_default());

    let idl_path = opts.idl_path.clone().unwrap_or_else(|| {
        eprintln!("Usage: {} --idl <FILE> <COMMAND> [ARGS]", binary_name);
        process::exit(1);
    });
    let schema = load_schema(&idl_path);

    let Some(command) = opts.rest.first() else {
        print_help(&schema, &binary_name);
        return;
    };
    let cmd_args = &opts.rest[1..];

    match command.as_str() {
        "help" | "-h" | "--help" => print_help(&schema, &binary_name),
        "idl" => print_schema(&schema),
        "decode" => run_decode(&schema, cmd_args, opts.ledger.as_deref()).await,
        "inspect" => run_inspect(&schema, cmd_args),
        "discriminator" => run_discriminator(&schema, cmd_args),
        other => match schema.instruction(&kebab_to_snake(other)) {
            Some(ix) => run_instruction(&schema, ix, cmd_args, opts.ledger.as_deref(), opts.dry_run).await,
            None => fail(format!("Unknown command '{}'. Run '{} --idl {} help'.", other, binary_name, idl_path)),
        },
    }
}

async fn run_instruction(
    schema: &CanonicalSchema,
    ix: &InstructionSchema,
    args: &[String],
    ledger: Option<&str>,
    dry_run: bool,
) {
    let flags = parse_flags(args);
    if flags.contains_key("help") {
        print_instruction_help(ix);
        return;
    }

    let prepared = prepare_instruction(schema, ix, &flags).unwrap_or_else(|errors| {
        for e in errors {
            eprintln!("❌ {}", e);
        }
        process::exit(1);
    });
    print_prepared(&prepared);

    let dir = match (ledger, dry_run) {
        (Some(dir), false) => dir,
        _ => {
            println!("⚠️  Dry run — pass --ledger <DIR> without --dry-run to submit.");
            return;
        }
    };

    println!("📤 Submitting transaction...");
    let client = DirectoryLedger::new(dir);
    match execute_instruction(&client, &prepared).await {
        Ok(signature) => {
            println!("   signature: {}", signature);
            println!("✅ Transaction confirmed.");
        }
        Err(e) => fail(format!("Transaction failed: {}", e)),
    }
}

async fn run_decode(schema: &CanonicalSchema, args: &[String], ledger: Option<&str>) {
    let flags = parse_flags(args);
    let Some(account_type) = positionals(args).into_iter().next() else {
        fail("Usage: decode <ACCOUNT_TYPE> --hex <HEX> | --file <PATH> | --account <KEY>");
    };

    if let Some(key) = flags.get("account") {
        let address = parse_pubkey(key).unwrap_or_else(|e| fail(format!("--account: {}", e)));
        let dir = ledger.unwrap_or_else(|| fail("--account needs --ledger <DIR>"));
        let client = DirectoryLedger::new(dir);
        match fetch_account(&client, schema, &account_type, &address).await {
            Ok(decoded) => print_decoded_account(&decoded),
            Err(e) => fail(e),
        }
        return;
    }

    let raw = if let Some(hex) = flags.get("hex") {
        hex_decode(hex).unwrap_or_else(|e| fail(format!("--hex: {}", e)))
    } else if let Some(path) = flags.get("file") {
        fs::read(path).unwrap_or_else(|e| fail(format!("{}: {}", path, e)))
    } else {
        fail("decode needs one of --hex, --file or --account");
    };
    match decode_account(schema, &account_type, &raw) {
        Ok(decoded) => print_decoded_account(&decoded),
        Err(e) => fail(format!("Decode failed: {}", e)),
    }
}

fn run_inspect(schema: &CanonicalSchema, args: &[String]) {
    let Some(hex) = args.first() else {
        fail("Usage: inspect <HEX>");
    };
    let bytes = hex_decode(hex).unwrap_or_else(|e| fail(e));
    match inspect_bytes(schema, &bytes) {
        Ok(Some(Inspection::Instruction(ix))) => print_decoded_instruction(&ix),
        Ok(Some(Inspection::Account(account))) => print_decoded_account(&account),
        Ok(None) => fail(format!(
            "No instruction or account discriminator matches 0x{}",
            hex_encode(bytes.get(..8).unwrap_or(&bytes))
        )),
        Err(e) => fail(format!("Decode failed: {}", e)),
    }
}

fn run_discriminator(schema: &CanonicalSchema, args: &[String]) {
    let (kind, name) = match args {
        [kind, name, ..] => (kind.as_str(), name.as_str()),
        _ => fail("Usage: discriminator <instruction|account> <NAME>"),
    };
    let kind = match kind {
        "instruction" | "ix" => NameKind::Instruction,
        "account" => NameKind::AccountType,
        other => fail(format!("Unknown kind '{}': expected instruction or account", other)),
    };
    match discriminator_for(schema, kind, name) {
        Ok(disc) => {
            let decimal: Vec<String> = disc.iter().map(|b| b.to_string()).collect();
            println!("0x{}", hex_encode(&disc));
            println!("[{}]", decimal.join(", "));
        }
        Err(e) => fail(e),
    }
}
