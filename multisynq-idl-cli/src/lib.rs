//! Generic IDL-driven CLI library for the Multisynq program.
//!
//! Provides:
//! - wire-type-aware argument parsing
//! - instruction preparation with PDA seed resolution
//! - the ledger collaborator seam (submit, fetch, confirm)
//! - schema and data inspection
//!
//! Encoding and decoding themselves live in `multisynq-idl-core`.

pub mod hex;
pub mod parse;
pub mod pda;
pub mod ledger;
pub mod tx;
pub mod inspect;
pub mod cli;
