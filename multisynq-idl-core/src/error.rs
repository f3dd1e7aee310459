//! Structured error types for schema normalization and the wire codec.
//!
//! Every error here is structural: a malformed interface description, a
//! value that does not fit its declared wire type, or account bytes that do
//! not match the layout. None of them are transient, so nothing in this
//! crate retries.

use thiserror::Error;

/// Result type alias for interface operations.
pub type InterfaceResult<T> = Result<T, InterfaceError>;

/// Which discriminator namespace a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Instruction,
    AccountType,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Instruction => write!(f, "instruction"),
            NameKind::AccountType => write!(f, "account type"),
        }
    }
}

/// Structured error type for the interface layer.
///
/// # Example
/// ```rust
/// use multisynq_idl_core::error::InterfaceError;
///
/// fn check_arity(expected: usize, actual: usize) -> Result<(), InterfaceError> {
///     if expected != actual {
///         return Err(InterfaceError::ArgumentCountMismatch {
///             instruction: "initialize_synchronizer".to_string(),
///             expected,
///             actual,
///         });
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    /// An account references a type that the description never defines
    #[error("Account '{account}' references undefined type '{type_name}'")]
    MissingTypeDefinition {
        account: String,
        type_name: String,
    },

    /// Two definitions of the same thing disagree
    #[error("Schema conflict for '{name}': {reason}")]
    SchemaConflict {
        name: String,
        reason: String,
    },

    /// The resolved wire type has no fixed byte width
    #[error("Field '{field}' has type '{type_name}' with no fixed wire width")]
    UnsupportedType {
        field: String,
        type_name: String,
    },

    /// Lookup of an instruction or account type that does not exist
    #[error("Unknown {kind} '{name}'")]
    UnknownName {
        kind: NameKind,
        name: String,
    },

    /// Discriminator that is not exactly 8 bytes
    #[error("Discriminator for '{name}' must be 8 bytes, got {actual}")]
    InvalidDiscriminator {
        name: String,
        actual: usize,
    },

    /// Wrong number of arguments for an instruction
    #[error("Instruction '{instruction}' expects {expected} args, got {actual}")]
    ArgumentCountMismatch {
        instruction: String,
        expected: usize,
        actual: usize,
    },

    /// Unsigned value does not fit the declared width
    #[error("Value {value} for '{field}' does not fit in {width} byte(s)")]
    ValueOutOfRange {
        field: String,
        value: u128,
        width: usize,
    },

    /// Byte source is longer than the fixed field (or not 32 bytes for a key)
    #[error("Field '{field}' expects {expected} bytes, got {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Value kind does not match the declared wire type
    #[error("Field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Account data shorter than the layout requires
    #[error("Account data for '{account}' needs {required} bytes, got {actual}")]
    TruncatedAccountData {
        account: String,
        required: usize,
        actual: usize,
    },

    /// Public key text that is not 32 bytes of base58 or hex
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress {
        input: String,
        reason: String,
    },

    /// Interface description is not valid JSON for the model
    #[error("Failed to parse interface description: {message}")]
    Parse {
        message: String,
    },
}

impl InterfaceError {
    /// Get a numeric error code for client-side handling.
    pub fn error_code(&self) -> u32 {
        match self {
            InterfaceError::MissingTypeDefinition { .. } => 1000,
            InterfaceError::SchemaConflict { .. } => 1001,
            InterfaceError::InvalidDiscriminator { .. } => 1002,
            InterfaceError::Parse { .. } => 1003,
            InterfaceError::InvalidAddress { .. } => 1004,
            InterfaceError::UnknownName { .. } => 1005,
            InterfaceError::UnsupportedType { .. } => 2000,
            InterfaceError::ArgumentCountMismatch { .. } => 2001,
            InterfaceError::ValueOutOfRange { .. } => 2002,
            InterfaceError::LengthMismatch { .. } => 2003,
            InterfaceError::TypeMismatch { .. } => 2004,
            InterfaceError::TruncatedAccountData { .. } => 3000,
        }
    }

    pub(crate) fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        InterfaceError::SchemaConflict {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for InterfaceError {
    fn from(e: serde_json::Error) -> Self {
        InterfaceError::Parse { message: e.to_string() }
    }
}
