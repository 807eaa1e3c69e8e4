//! Error types for the IDL codec pipeline

use std::fmt;

use thiserror::Error;

/// Top-level error type for IDL codec operations
#[derive(Debug, Error)]
pub enum IdlCodecError {
    #[error("IDL uses the legacy (pre-0.30) format ({marker}); convert it with `anchor idl convert` first")]
    LegacyFormat { marker: &'static str },

    #[error("Failed to parse IDL: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to parse IDL JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IDL validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Codec derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to decompress IDL data: {0}")]
    Decompression(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid program ID: {0}")]
    InvalidProgramId(String),
}

/// Result type alias for IDL codec operations
pub type IdlCodecResult<T> = Result<T, IdlCodecError>;

/// A JSON shape that no decoder for the target type accepts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unresolved {target}: no variant accepts {payload} (tried {})", attempts.join("; "))]
    UnresolvedType {
        target: &'static str,
        payload: String,
        attempts: Vec<String>,
    },

    #[error("unknown document shape: {payload}")]
    UnknownShape { payload: String },

    #[error("expected {expected}, found {payload}")]
    Mismatch {
        expected: &'static str,
        payload: String,
    },

    #[error("missing key `{key}` in {payload}")]
    MissingKey { key: &'static str, payload: String },

    #[error("invalid {target}: {reason}")]
    Invalid { target: &'static str, reason: String },
}

/// A malformed discriminator found during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorIssue {
    pub kind: &'static str,
    pub name: String,
    pub len: usize,
}

impl fmt::Display for DiscriminatorIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` has a {}-byte discriminator (expected 8)",
            self.kind, self.name, self.len
        )
    }
}

/// Every problem found by a single validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Names referenced by `defined` types, accounts or events with no type definition
    pub not_resolved_types: Vec<String>,

    /// Type definition names that appear more than once
    pub duplicate_defined_type_names: Vec<String>,

    /// Type definition names outside `[A-Za-z0-9_:]+`
    pub invalid_type_names: Vec<String>,

    /// Account, event or instruction discriminators that are not 8 bytes
    pub invalid_discriminators: Vec<DiscriminatorIssue>,

    /// Instruction names that collide raw or after case normalization
    pub duplicate_instruction_names: Vec<String>,

    /// Paths of type positions whose type is absent (`null`)
    pub missing_types: Vec<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.not_resolved_types.is_empty()
            && self.duplicate_defined_type_names.is_empty()
            && self.invalid_type_names.is_empty()
            && self.invalid_discriminators.is_empty()
            && self.duplicate_instruction_names.is_empty()
            && self.missing_types.is_empty()
    }

    /// Total number of individual problems
    pub fn len(&self) -> usize {
        self.not_resolved_types.len()
            + self.duplicate_defined_type_names.len()
            + self.invalid_type_names.len()
            + self.invalid_discriminators.len()
            + self.duplicate_instruction_names.len()
            + self.missing_types.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections: [(&str, Vec<String>); 6] = [
            ("not resolved types", self.not_resolved_types.clone()),
            (
                "duplicate defined type names",
                self.duplicate_defined_type_names.clone(),
            ),
            ("invalid type names", self.invalid_type_names.clone()),
            (
                "invalid discriminators",
                self.invalid_discriminators.iter().map(ToString::to_string).collect(),
            ),
            (
                "duplicate instruction names",
                self.duplicate_instruction_names.clone(),
            ),
            ("missing types", self.missing_types.clone()),
        ];

        let mut first = true;
        for (label, entries) in sections.iter().filter(|(_, e)| !e.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "  {}: {}", label, entries.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A schema node that cannot be turned into a codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("unresolved type at {path}")]
    UnresolvedType { path: String },

    #[error("type `{name}` referenced at {path} is not defined")]
    UndefinedType { name: String, path: String },

    #[error("array length `{name}` at {path} is generic; a concrete length is required")]
    GenericArrayLength { name: String, path: String },

    #[error("generic `{name}` at {path} is not bound")]
    UnboundGeneric { name: String, path: String },

    #[error("type `{name}` expects {expected} generic argument(s), got {actual}")]
    GenericArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("generic argument for `{param}` of `{name}` has the wrong kind")]
    GenericMismatch { name: String, param: String },

    #[error("enum `{name}` has {count} variants; at most 256 fit a one-byte index")]
    TooManyVariants { name: String, count: usize },

    #[error("type `{name}` contains itself without indirection")]
    RecursiveType { name: String },

    #[error("generic type `{name}` expands past {limit} nested instantiations")]
    GenericExpansion { name: String, limit: usize },

    #[error("{kind} `{name}` refers to a generic type definition and has no layout")]
    GenericEntity { kind: &'static str, name: String },

    #[error("type `{name}` uses custom serialization `{serialization}`")]
    UnsupportedSerialization { name: String, serialization: String },

    #[error("{kind} `{name}` has a {len}-byte discriminator (expected 8)")]
    DiscriminatorLength {
        kind: &'static str,
        name: String,
        len: usize,
    },

    #[error("constant `{name}` has invalid value `{value}` for its type")]
    InvalidConstant { name: String, value: String },
}

/// A per-value failure while encoding or decoding wire bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of data: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid bool byte {0}")]
    InvalidBool(u8),

    #[error("invalid option tag {0}")]
    InvalidOptionTag(u32),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("discriminator mismatch: expected {}, got {}", hex(expected), hex(actual))]
    DiscriminatorMismatch { expected: [u8; 8], actual: [u8; 8] },

    #[error("unknown enum index {index} for `{name}` ({variants} variants)")]
    UnknownEnumIndex {
        name: String,
        index: u8,
        variants: usize,
    },

    #[error("unknown variant `{variant}` for enum `{name}`")]
    UnknownVariant { name: String, variant: String },

    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("array length mismatch: expected {expected}, found {actual}")]
    ArrayLength { expected: usize, actual: usize },

    #[error("length {0} does not fit a u32 prefix")]
    LengthOverflow(usize),

    #[error("value nesting exceeds {0} levels")]
    DepthLimit(usize),

    #[error("{count} element(s) of zero-sized `{codec}` cannot be encoded")]
    ZeroSizedElements { codec: String, count: usize },

    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),

    #[error("unknown {kind} `{name}`")]
    UnknownEntity { kind: &'static str, name: String },

    #[error("no {kind} matches discriminator {}", hex(discriminator))]
    UnknownDiscriminator {
        kind: &'static str,
        discriminator: [u8; 8],
    },

    #[error("no codec derived for `{0}`")]
    MissingLayout(String),
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
