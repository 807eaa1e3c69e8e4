//! anchor-idl-codec - Derive Borsh codecs and discriminators from Anchor IDLs
//!
//! This library parses Anchor IDL documents (0.30+ format), validates them
//! as a whole, and derives the wire encoding of every account, event,
//! instruction and type they describe. It can be used standalone or via
//! the `idl-codec` CLI.
//!
//! # Quick Start
//!
//! ```ignore
//! use idl_codec::{Program, Value};
//!
//! let program = Program::from_json(&std::fs::read_to_string("target/idl/pool.json")?)?;
//!
//! // Decode account data fetched from the chain
//! let vault = program.decode_account("Vault", &account_data)?;
//! println!("{}", vault.to_json());
//!
//! // Build instruction data
//! let data = program.encode_instruction("deposit", &[("amount".into(), Value::U64(42))])?;
//! ```
//!
//! # Pipeline
//!
//! ```ignore
//! use idl_codec::idl::{parse_idl, validate};
//! use idl_codec::codec::{derive_codecs, TypeRegistry};
//!
//! let idl = parse_idl(json)?;          // legacy check + trial decoding
//! validate(&idl)?;                     // every problem in one pass
//! let codecs = derive_codecs(&TypeRegistry::from_idl(&idl))?;
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod discriminator;
pub mod display;
pub mod error;
pub mod idl;
pub mod program;

// Public re-exports for library users
pub use codec::{Codec, CodecSet, TypeLayout, Value};
pub use discriminator::{Discriminator, DiscriminatorKind};
pub use error::{
    CodecError, DerivationError, IdlCodecError, IdlCodecResult, ParseError, ValidationErrors,
};
pub use idl::{
    // Loading functions
    idl_address,
    idl_from_account_data,
    load_idl_from_file,
    parse_idl,
    // Core types
    Idl,
    IdlType,
    IdlTypeDef,
};
pub use program::{DispatchEntry, Identified, InstructionEntry, Program};
