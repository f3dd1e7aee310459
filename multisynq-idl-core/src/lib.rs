//! # Multisynq IDL Core
//!
//! Binary interface layer for the Multisynq program: normalize an Anchor
//! interface description into a canonical schema, look up discriminators,
//! encode instruction data and decode account data.

pub mod error;
pub mod pubkey;
pub mod idl;
pub mod types;
pub mod schema;
pub mod discriminator;
pub mod value;
pub mod wire;
pub mod encode;
pub mod decode;

pub mod prelude {
    pub use crate::error::{InterfaceError, InterfaceResult, NameKind};
    pub use crate::pubkey::Pubkey;
    pub use crate::idl::RawInterfaceDescription;
    pub use crate::schema::{normalize, AccountRef, AccountSchema, CanonicalSchema, InstructionSchema, SeedDescriptor};
    pub use crate::types::{FieldSpec, WireType};
    pub use crate::discriminator::{account_type_for, discriminator_for, instruction_for};
    pub use crate::value::Value;
    pub use crate::encode::{encode_account, encode_instruction};
    pub use crate::decode::{decode_account, decode_instruction_data, DecodePath, DecodedAccount};
}
