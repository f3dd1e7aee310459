//! The ledger collaborator: submit transactions, fetch account bytes,
//! confirm signatures.
//!
//! Network transport lives behind [`LedgerClient`]. This crate ships two
//! offline implementations: [`MemoryLedger`] for tests and dry runs, and
//! [`DirectoryLedger`] which serves account dumps from disk and journals
//! submitted transactions as JSON.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base58::ToBase58;
use multisynq_idl_core::error::InterfaceError;
use multisynq_idl_core::pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SIGNATURE_BYTES: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_BYTES]);

impl Signature {
    /// Deterministic signature for the `n`th locally journaled transaction.
    pub fn from_sequence(n: u64) -> Self {
        let mut bytes = [0u8; SIGNATURE_BYTES];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Signature(bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_base58())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// Where an instruction account comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTarget {
    Key(Pubkey),
    /// Program-derived: the client hashes `seeds` under `program`.
    Derived { seeds: Vec<Vec<u8>>, program: Pubkey },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetaRequest {
    pub name: String,
    pub target: AccountTarget,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A fully-formed instruction handed to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRequest {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMetaRequest>,
    pub data: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Transaction {signature} not confirmed: {reason}")]
    NotConfirmed { signature: String, reason: String },

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Failed to encode transaction journal: {0}")]
    Journal(String),

    #[error(transparent)]
    Interface(#[from] InterfaceError),
}

impl LedgerError {
    fn io(path: &Path, e: std::io::Error) -> Self {
        LedgerError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    }
}

/// External collaborator boundary.
pub trait LedgerClient {
    fn submit_transaction(
        &self,
        instructions: &[InstructionRequest],
    ) -> impl Future<Output = Result<Signature, LedgerError>> + Send;

    fn get_account_bytes(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, LedgerError>> + Send;

    fn confirm(&self, signature: &Signature) -> impl Future<Output = Result<(), LedgerError>> + Send;
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Pubkey, Vec<u8>>,
    submitted: Vec<(Signature, Vec<InstructionRequest>)>,
}

/// In-process ledger: serves seeded accounts and records submissions.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        self.lock().accounts.insert(address, data);
    }

    /// All transactions submitted so far, in order.
    pub fn submitted(&self) -> Vec<(Signature, Vec<InstructionRequest>)> {
        self.lock().submitted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerClient for MemoryLedger {
    async fn submit_transaction(&self, instructions: &[InstructionRequest]) -> Result<Signature, LedgerError> {
        let mut state = self.lock();
        let signature = Signature::from_sequence(state.submitted.len() as u64);
        state.submitted.push((signature, instructions.to_vec()));
        Ok(signature)
    }

    async fn get_account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.lock().accounts.get(address).cloned())
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        if self.lock().submitted.iter().any(|(s, _)| s == signature) {
            Ok(())
        } else {
            Err(LedgerError::NotConfirmed {
                signature: signature.to_string(),
                reason: "unknown signature".to_string(),
            })
        }
    }
}

/// Account dumps under `<root>/<base58>.bin`; submissions journaled under
/// `<root>/submitted/<signature>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLedger {
    root: PathBuf,
}

impl DirectoryLedger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn account_path(&self, address: &Pubkey) -> PathBuf {
        self.root.join(format!("{}.bin", address))
    }

    fn journal_dir(&self) -> PathBuf {
        self.root.join("submitted")
    }

    fn journal_path(&self, signature: &Signature) -> PathBuf {
        self.journal_dir().join(format!("{}.json", signature))
    }

    /// First unused journal slot at or after the current entry count.
    ///
    /// The slot is claimed with `create_new`, so concurrent submitters and
    /// stray files in the journal directory never share a signature.
    async fn claim_journal_slot(&self) -> Result<(Signature, PathBuf), LedgerError> {
        let dir = self.journal_dir();
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| LedgerError::io(&dir, e))?;
        let mut sequence = 0u64;
        while entries.next_entry().await.map_err(|e| LedgerError::io(&dir, e))?.is_some() {
            sequence += 1;
        }
        loop {
            let signature = Signature::from_sequence(sequence);
            let path = self.journal_path(&signature);
            match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(_) => return Ok((signature, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => sequence += 1,
                Err(e) => return Err(LedgerError::io(&path, e)),
            }
        }
    }
}

impl LedgerClient for DirectoryLedger {
    async fn submit_transaction(&self, instructions: &[InstructionRequest]) -> Result<Signature, LedgerError> {
        let dir = self.journal_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| LedgerError::io(&dir, e))?;
        let json = serde_json::to_string_pretty(instructions).map_err(|e| LedgerError::Journal(e.to_string()))?;
        let (signature, path) = self.claim_journal_slot().await?;
        tokio::fs::write(&path, json).await.map_err(|e| LedgerError::io(&path, e))?;
        Ok(signature)
    }

    async fn get_account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let path = self.account_path(address);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::io(&path, e)),
        }
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        let path = self.journal_path(signature);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(LedgerError::NotConfirmed {
                signature: signature.to_string(),
                reason: "no journal entry".to_string(),
            }),
            Err(e) => Err(LedgerError::io(&path, e)),
        }
    }
}
