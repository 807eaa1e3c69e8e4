//! Anchor IDL type definitions (0.30+ format)
//!
//! These types represent the structure of an Anchor IDL JSON file. Product
//! types derive `Deserialize`; every sum type is decoded by ordered trial
//! parsing (see [`super::decode`]).

use serde::Deserialize;

/// Root IDL structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Idl {
    /// Program address (base58)
    #[serde(default)]
    pub address: Option<String>,

    /// IDL metadata
    pub metadata: IdlMetadata,

    #[serde(default)]
    pub docs: Vec<String>,

    /// Program instructions
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,

    /// Account discriminators (references to types)
    #[serde(default)]
    pub accounts: Vec<IdlAccount>,

    /// Event discriminators (references to types)
    #[serde(default)]
    pub events: Vec<IdlEvent>,

    /// Error codes defined by the program
    #[serde(default)]
    pub errors: Vec<IdlErrorCode>,

    /// Custom types defined by the program
    #[serde(default)]
    pub types: Vec<IdlTypeDef>,

    /// Program constants
    #[serde(default)]
    pub constants: Vec<IdlConst>,
}

/// IDL metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlMetadata {
    /// Program name
    pub name: String,

    /// Program version
    pub version: String,

    /// IDL spec version
    pub spec: String,

    /// Program description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<IdlDependency>,

    #[serde(default)]
    pub contact: Option<String>,

    #[serde(default)]
    pub deployments: Option<IdlDeployments>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlDependency {
    pub name: String,
    pub version: String,
}

/// Known deployment addresses per cluster
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlDeployments {
    #[serde(default)]
    pub mainnet: Option<String>,
    #[serde(default)]
    pub testnet: Option<String>,
    #[serde(default)]
    pub devnet: Option<String>,
    #[serde(default)]
    pub localnet: Option<String>,
}

/// Instruction definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlInstruction {
    /// Instruction name
    pub name: String,

    #[serde(default)]
    pub docs: Vec<String>,

    /// Discriminator bytes (empty when the document does not supply one)
    #[serde(default)]
    pub discriminator: Vec<u8>,

    /// Accounts required by this instruction
    #[serde(default)]
    pub accounts: Vec<IdlInstructionAccountItem>,

    /// Arguments to this instruction
    #[serde(default)]
    pub args: Vec<IdlField>,

    /// Return data type, if the instruction sets one
    #[serde(default)]
    pub returns: Option<IdlType>,
}

/// Account item (can be a single account or nested group)
#[derive(Debug, Clone, PartialEq)]
pub enum IdlInstructionAccountItem {
    /// Nested group of accounts
    Composite(IdlInstructionAccounts),
    /// Single account
    Single(IdlInstructionAccount),
}

/// Single account in an instruction
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlInstructionAccount {
    /// Account name
    pub name: String,

    #[serde(default)]
    pub docs: Vec<String>,

    /// Whether this account is writable
    #[serde(default)]
    pub writable: bool,

    /// Whether this account must sign
    #[serde(default)]
    pub signer: bool,

    /// Whether this account is optional
    #[serde(default)]
    pub optional: bool,

    /// Account address (for known accounts like system program)
    #[serde(default)]
    pub address: Option<String>,

    /// PDA seeds if this is a PDA
    #[serde(default)]
    pub pda: Option<IdlPda>,

    #[serde(default)]
    pub relations: Vec<String>,
}

/// Group of accounts (nested)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlInstructionAccounts {
    /// Group name
    pub name: String,

    /// Accounts in this group
    pub accounts: Vec<IdlInstructionAccountItem>,
}

/// PDA definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlPda {
    /// PDA seeds
    pub seeds: Vec<IdlSeed>,

    /// Program the PDA is derived from, when not the current program
    #[serde(default)]
    pub program: Option<IdlSeed>,
}

/// PDA seed
#[derive(Debug, Clone, PartialEq)]
pub enum IdlSeed {
    /// Constant seed (literal bytes)
    Const { value: Vec<u8> },
    /// Argument seed (value from instruction args)
    Arg { path: String },
    /// Account seed (pubkey or field of another account)
    Account {
        path: String,
        account: Option<String>,
    },
}

/// Account reference (root-level accounts array)
/// Just a discriminator reference - actual type is in `types`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlAccount {
    /// Account type name
    pub name: String,

    /// Account discriminator bytes
    #[serde(default)]
    pub discriminator: Vec<u8>,
}

/// Event reference (root-level events array)
/// Just a discriminator reference - actual type is in `types`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlEvent {
    /// Event type name
    pub name: String,

    /// Event discriminator bytes
    #[serde(default)]
    pub discriminator: Vec<u8>,
}

/// Program constant; `value` is the source literal, typed by `ty`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlConst {
    pub name: String,

    #[serde(default)]
    pub docs: Vec<String>,

    #[serde(rename = "type")]
    pub ty: IdlType,

    pub value: String,
}

/// Error definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlErrorCode {
    /// Error code
    pub code: u32,

    /// Error name
    pub name: String,

    /// Error message
    #[serde(default)]
    pub msg: Option<String>,
}

/// Field definition (for args and struct fields)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlField {
    /// Field name
    pub name: String,

    #[serde(default)]
    pub docs: Vec<String>,

    /// Field type
    #[serde(rename = "type")]
    pub ty: IdlType,
}

/// Type definition (struct, enum or alias)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlTypeDef {
    /// Type name
    pub name: String,

    #[serde(default)]
    pub docs: Vec<String>,

    #[serde(default)]
    pub serialization: IdlSerialization,

    #[serde(default)]
    pub repr: Option<IdlRepr>,

    #[serde(default)]
    pub generics: Vec<IdlTypeDefGeneric>,

    /// Type definition body
    #[serde(rename = "type")]
    pub ty: IdlTypeDefTy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdlSerialization {
    #[default]
    Borsh,
    Bytemuck,
    BytemuckUnsafe,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlRepr {
    Rust(IdlReprModifier),
    C(IdlReprModifier),
    Transparent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdlReprModifier {
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub align: Option<usize>,
}

/// Generic parameter declared by a type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlTypeDefGeneric {
    Type { name: String },
    Const { name: String, ty: String },
}

impl IdlTypeDefGeneric {
    pub fn name(&self) -> &str {
        match self {
            IdlTypeDefGeneric::Type { name } | IdlTypeDefGeneric::Const { name, .. } => name,
        }
    }
}

/// Type definition body
#[derive(Debug, Clone, PartialEq)]
pub enum IdlTypeDefTy {
    /// Struct type
    Struct { fields: Option<IdlDefinedFields> },
    /// Enum type
    Enum { variants: Vec<IdlEnumVariant> },
    /// Alias of another type
    Type { alias: IdlType },
}

impl IdlTypeDefTy {
    /// True for an enum with at least one payload-carrying variant
    pub fn is_complex_enum(&self) -> bool {
        match self {
            IdlTypeDefTy::Enum { variants } => variants.iter().any(|v| !v.is_simple()),
            _ => false,
        }
    }
}

/// Enum variant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdlEnumVariant {
    /// Variant name
    pub name: String,

    /// Variant fields (if tuple or struct variant)
    #[serde(default)]
    pub fields: Option<IdlDefinedFields>,
}

impl IdlEnumVariant {
    /// A variant without a payload
    pub fn is_simple(&self) -> bool {
        self.fields.is_none()
    }
}

/// Struct or variant fields - tuple-style (unnamed) or struct-style (named)
#[derive(Debug, Clone, PartialEq)]
pub enum IdlDefinedFields {
    /// Struct variant: fields have names and types (e.g., [{"name": "x", "type": "u64"}])
    Named(Vec<IdlField>),
    /// Tuple variant: fields are just types (e.g., ["u64", "pubkey"])
    Tuple(Vec<IdlType>),
}

impl IdlDefinedFields {
    pub fn len(&self) -> usize {
        match self {
            IdlDefinedFields::Named(fields) => fields.len(),
            IdlDefinedFields::Tuple(types) => types.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field names paired with types; tuple fields are named `v0, v1, ...`
    pub fn named(&self) -> Vec<(String, &IdlType)> {
        match self {
            IdlDefinedFields::Named(fields) => {
                fields.iter().map(|f| (f.name.clone(), &f.ty)).collect()
            }
            IdlDefinedFields::Tuple(types) => types
                .iter()
                .enumerate()
                .map(|(i, ty)| (format!("v{}", i), ty))
                .collect(),
        }
    }
}

/// Array length: a concrete value or a const generic name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlArrayLen {
    Generic(String),
    Value(usize),
}

/// Argument supplied to a generic type definition
#[derive(Debug, Clone, PartialEq)]
pub enum IdlGenericArg {
    Type { ty: IdlType },
    Const { value: String },
}

/// Nested type slot of a wrapper; `None` when the document holds `null`
pub type IdlTypeSlot = Option<Box<IdlType>>;

/// IDL type (primitives and composites)
#[derive(Debug, Clone, PartialEq)]
pub enum IdlType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
    U128,
    I128,
    U256,
    I256,
    Bytes,
    String,
    Pubkey,
    /// Option<T>
    Option(IdlTypeSlot),
    /// C-style optional slot
    COption(IdlTypeSlot),
    /// Vec<T>
    Vec(IdlTypeSlot),
    /// [T; N]
    Array(IdlTypeSlot, IdlArrayLen),
    /// Reference to a defined type
    Defined {
        name: String,
        generics: Vec<IdlGenericArg>,
    },
    /// Generic parameter of the enclosing type definition
    Generic(String),
}

impl IdlType {
    /// Reference to a non-generic defined type
    pub fn defined(name: impl Into<String>) -> Self {
        IdlType::Defined {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    /// Wrap a type in an `Option`
    pub fn option(inner: IdlType) -> Self {
        IdlType::Option(Some(Box::new(inner)))
    }

    /// Wrap a type in a `Vec`
    pub fn vec(inner: IdlType) -> Self {
        IdlType::Vec(Some(Box::new(inner)))
    }

    /// Fixed-length array of a type
    pub fn array(inner: IdlType, len: usize) -> Self {
        IdlType::Array(Some(Box::new(inner)), IdlArrayLen::Value(len))
    }

    /// Keyword used for the type in IDL JSON, for primitives
    pub fn primitive_name(&self) -> Option<&'static str> {
        let name = match self {
            IdlType::Bool => "bool",
            IdlType::U8 => "u8",
            IdlType::I8 => "i8",
            IdlType::U16 => "u16",
            IdlType::I16 => "i16",
            IdlType::U32 => "u32",
            IdlType::I32 => "i32",
            IdlType::F32 => "f32",
            IdlType::U64 => "u64",
            IdlType::I64 => "i64",
            IdlType::F64 => "f64",
            IdlType::U128 => "u128",
            IdlType::I128 => "i128",
            IdlType::U256 => "u256",
            IdlType::I256 => "i256",
            IdlType::Bytes => "bytes",
            IdlType::String => "string",
            IdlType::Pubkey => "pubkey",
            _ => return None,
        };
        Some(name)
    }
}
