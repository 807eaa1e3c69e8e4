//! A validated IDL together with its derived codecs and dispatch tables
//!
//! `Program::new` runs the whole pipeline once: validation, codec
//! derivation and discriminator resolution. Every later encode or decode
//! is a per-value operation whose failure leaves the program untouched.

use std::str::FromStr;

use log::{debug, info};
use solana_sdk::pubkey::Pubkey;

use crate::codec::{ByteReader, Codec, CodecSet, Deriver, FieldCodec, TypeRegistry, Value};
use crate::discriminator::{self, Discriminator, DiscriminatorKind};
use crate::error::{CodecError, DerivationError, IdlCodecResult};
use crate::idl::{self, Idl, IdlArrayLen, IdlConst, IdlType};

/// An account or event: discriminator plus the codec of its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    pub name: String,
    pub discriminator: Discriminator,
    pub codec: Codec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionEntry {
    pub name: String,
    pub discriminator: Discriminator,
    pub args: Vec<FieldCodec>,
    pub returns: Option<Codec>,
}

/// What a blob was identified as by its leading discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identified<'p> {
    Account(&'p DispatchEntry),
    Event(&'p DispatchEntry),
    Instruction(&'p InstructionEntry),
}

impl Identified<'_> {
    pub fn kind(&self) -> DiscriminatorKind {
        match self {
            Identified::Account(_) => DiscriminatorKind::Account,
            Identified::Event(_) => DiscriminatorKind::Event,
            Identified::Instruction(_) => DiscriminatorKind::Instruction,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Identified::Account(entry) | Identified::Event(entry) => &entry.name,
            Identified::Instruction(entry) => &entry.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    idl: Idl,
    codecs: CodecSet,
    accounts: Vec<DispatchEntry>,
    events: Vec<DispatchEntry>,
    instructions: Vec<InstructionEntry>,
}

impl Program {
    /// Validate `idl`, derive every codec and resolve every discriminator
    pub fn new(idl: Idl) -> IdlCodecResult<Self> {
        idl::validate(&idl)?;

        let (codecs, instructions) = derive(&idl)?;

        let accounts = idl
            .accounts
            .iter()
            .map(|a| {
                dispatch_entry(&codecs, DiscriminatorKind::Account, &a.name, &a.discriminator)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let events = idl
            .events
            .iter()
            .map(|e| dispatch_entry(&codecs, DiscriminatorKind::Event, &e.name, &e.discriminator))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Loaded program `{}`: {} instruction(s), {} account(s), {} event(s), {} layout(s)",
            idl.metadata.name,
            instructions.len(),
            accounts.len(),
            events.len(),
            codecs.len()
        );

        Ok(Self {
            idl,
            codecs,
            accounts,
            events,
            instructions,
        })
    }

    /// Parse, validate and derive in one step
    pub fn from_json(json: &str) -> IdlCodecResult<Self> {
        Self::new(idl::parse_idl(json)?)
    }

    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    pub fn codecs(&self) -> &CodecSet {
        &self.codecs
    }

    pub fn accounts(&self) -> &[DispatchEntry] {
        &self.accounts
    }

    pub fn events(&self) -> &[DispatchEntry] {
        &self.events
    }

    pub fn instructions(&self) -> &[InstructionEntry] {
        &self.instructions
    }

    pub fn account(&self, name: &str) -> Result<&DispatchEntry, CodecError> {
        find(&self.accounts, "account", name, |e| &e.name)
    }

    pub fn event(&self, name: &str) -> Result<&DispatchEntry, CodecError> {
        find(&self.events, "event", name, |e| &e.name)
    }

    pub fn instruction(&self, name: &str) -> Result<&InstructionEntry, CodecError> {
        find(&self.instructions, "instruction", name, |e| &e.name)
    }

    pub fn encode_account(&self, name: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        let entry = self.account(name)?;
        self.codecs
            .encode_prefixed(&entry.discriminator, &entry.codec, value)
    }

    /// Decode account data; bytes after the value (allocation padding) are ignored
    pub fn decode_account(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        let entry = self.account(name)?;
        self.codecs
            .decode_prefixed(&entry.discriminator, &entry.codec, data, false)
    }

    pub fn encode_event(&self, name: &str, value: &Value) -> Result<Vec<u8>, CodecError> {
        let entry = self.event(name)?;
        self.codecs
            .encode_prefixed(&entry.discriminator, &entry.codec, value)
    }

    pub fn decode_event(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        let entry = self.event(name)?;
        self.codecs
            .decode_prefixed(&entry.discriminator, &entry.codec, data, false)
    }

    /// Instruction data: discriminator followed by the args in order
    pub fn encode_instruction(
        &self,
        name: &str,
        args: &[(String, Value)],
    ) -> Result<Vec<u8>, CodecError> {
        let entry = self.instruction(name)?;
        let mut out = entry.discriminator.to_vec();
        self.codecs.encode_fields(&entry.args, args, &mut out)?;
        Ok(out)
    }

    /// Decode instruction data; the args must span the rest of the data
    pub fn decode_instruction(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        let entry = self.instruction(name)?;
        self.decode_instruction_entry(entry, data)
    }

    fn decode_instruction_entry(
        &self,
        entry: &InstructionEntry,
        data: &[u8],
    ) -> Result<Value, CodecError> {
        let mut reader = ByteReader::new(data);
        crate::codec::check_discriminator(&entry.discriminator, &mut reader)?;
        let args = self.codecs.decode_fields(&entry.args, &mut reader)?;
        if !reader.is_empty() {
            return Err(CodecError::TrailingBytes(reader.remaining()));
        }
        Ok(Value::Struct(args))
    }

    /// Decode the return data of an instruction (no discriminator)
    pub fn decode_return(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        let entry = self.instruction(name)?;
        let codec = entry.returns.as_ref().ok_or_else(|| CodecError::TypeMismatch {
            expected: format!("return type of `{}`", name),
            found: "no return type".to_string(),
        })?;
        self.codecs.decode(codec, data)
    }

    /// Find what the leading 8 bytes identify: accounts, then events, then instructions
    pub fn identify(&self, data: &[u8]) -> Result<Identified<'_>, CodecError> {
        let prefix: Discriminator = ByteReader::new(data).read_array()?;

        if let Some(entry) = self.accounts.iter().find(|e| e.discriminator == prefix) {
            return Ok(Identified::Account(entry));
        }
        if let Some(entry) = self.events.iter().find(|e| e.discriminator == prefix) {
            return Ok(Identified::Event(entry));
        }
        if let Some(entry) = self.instructions.iter().find(|e| e.discriminator == prefix) {
            return Ok(Identified::Instruction(entry));
        }

        Err(CodecError::UnknownDiscriminator {
            kind: "account, event or instruction",
            discriminator: prefix,
        })
    }

    /// Identify a blob by discriminator and decode it
    pub fn decode_any(&self, data: &[u8]) -> Result<(Identified<'_>, Value), CodecError> {
        let identified = self.identify(data)?;
        debug!(
            "Identified {} `{}`",
            identified.kind().label(),
            identified.name()
        );
        let value = match identified {
            Identified::Account(entry) | Identified::Event(entry) => self
                .codecs
                .decode_prefixed(&entry.discriminator, &entry.codec, data, false)?,
            Identified::Instruction(entry) => self.decode_instruction_entry(entry, data)?,
        };
        Ok((identified, value))
    }

    /// Parse the literal of a declared constant
    pub fn constant(&self, name: &str) -> IdlCodecResult<Value> {
        let constant = self
            .idl
            .constants
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CodecError::UnknownEntity {
                kind: "constant",
                name: name.to_string(),
            })?;
        Ok(parse_constant(constant)?)
    }
}

/// Layouts for every type plus the codecs of each instruction
fn derive(idl: &Idl) -> Result<(CodecSet, Vec<InstructionEntry>), DerivationError> {
    let registry = TypeRegistry::from_idl(idl);
    let mut deriver = Deriver::new(&registry);
    deriver.derive_definitions()?;

    let mut instructions = Vec::with_capacity(idl.instructions.len());
    for ix in &idl.instructions {
        let path = format!("instructions.{}", ix.name);
        let args = deriver.fields(&ix.args, &path)?;
        let returns = match &ix.returns {
            Some(ty) => Some(deriver.codec(Some(ty), &format!("{}.returns", path))?),
            None => None,
        };
        instructions.push(InstructionEntry {
            name: ix.name.clone(),
            discriminator: discriminator::resolve(
                DiscriminatorKind::Instruction,
                &ix.name,
                &ix.discriminator,
            )?,
            args,
            returns,
        });
    }

    Ok((deriver.finish()?, instructions))
}

/// Accounts and events name their type definition; generic ones have no
/// layout of their own and are refused here rather than at decode time
fn dispatch_entry(
    codecs: &CodecSet,
    kind: DiscriminatorKind,
    name: &str,
    supplied: &[u8],
) -> Result<DispatchEntry, DerivationError> {
    if !codecs.contains(name) {
        return Err(DerivationError::GenericEntity {
            kind: kind.label(),
            name: name.to_string(),
        });
    }

    Ok(DispatchEntry {
        name: name.to_string(),
        discriminator: discriminator::resolve(kind, name, supplied)?,
        codec: Codec::Defined(name.to_string()),
    })
}

fn find<'e, T>(
    entries: &'e [T],
    kind: &'static str,
    name: &str,
    key: impl Fn(&T) -> &String,
) -> Result<&'e T, CodecError> {
    entries
        .iter()
        .find(|e| key(e) == name)
        .ok_or_else(|| CodecError::UnknownEntity {
            kind,
            name: name.to_string(),
        })
}

/// Parse a constant's textual literal according to its declared type.
///
/// Integer literals may carry `_` separators and a type suffix (`1_000u64`).
/// Strings may be quoted. Byte constants accept `[1, 2, 3]` or `b"text"`.
pub fn parse_constant(constant: &IdlConst) -> Result<Value, DerivationError> {
    let invalid = || DerivationError::InvalidConstant {
        name: constant.name.clone(),
        value: constant.value.clone(),
    };
    let raw = constant.value.trim();

    macro_rules! number {
        ($variant:ident, $ty:ty, $suffix:literal) => {{
            let cleaned: String = raw.strip_suffix($suffix).unwrap_or(raw).replace('_', "");
            Value::$variant(cleaned.parse::<$ty>().map_err(|_| invalid())?)
        }};
    }

    let value = match &constant.ty {
        IdlType::Bool => Value::Bool(raw.parse().map_err(|_| invalid())?),
        IdlType::U8 => number!(U8, u8, "u8"),
        IdlType::I8 => number!(I8, i8, "i8"),
        IdlType::U16 => number!(U16, u16, "u16"),
        IdlType::I16 => number!(I16, i16, "i16"),
        IdlType::U32 => number!(U32, u32, "u32"),
        IdlType::I32 => number!(I32, i32, "i32"),
        IdlType::F32 => number!(F32, f32, "f32"),
        IdlType::U64 => number!(U64, u64, "u64"),
        IdlType::I64 => number!(I64, i64, "i64"),
        IdlType::F64 => number!(F64, f64, "f64"),
        IdlType::U128 => number!(U128, u128, "u128"),
        IdlType::I128 => number!(I128, i128, "i128"),
        IdlType::String => Value::String(unquote(raw).ok_or_else(invalid)?),
        IdlType::Pubkey => {
            let text = unquote(raw).ok_or_else(invalid)?;
            Value::Pubkey(Pubkey::from_str(&text).map_err(|_| invalid())?)
        }
        IdlType::Bytes => Value::Bytes(parse_bytes(raw).ok_or_else(invalid)?),
        IdlType::Vec(Some(inner)) if **inner == IdlType::U8 => Value::Vec(
            parse_bytes(raw)
                .ok_or_else(invalid)?
                .into_iter()
                .map(Value::U8)
                .collect(),
        ),
        IdlType::Array(Some(inner), IdlArrayLen::Value(len)) if **inner == IdlType::U8 => {
            let bytes = parse_bytes(raw).ok_or_else(invalid)?;
            if bytes.len() != *len {
                return Err(invalid());
            }
            Value::Array(bytes.into_iter().map(Value::U8).collect())
        }
        _ => return Err(invalid()),
    };

    Ok(value)
}

fn unquote(raw: &str) -> Option<String> {
    if raw.starts_with('"') {
        serde_json::from_str(raw).ok()
    } else {
        Some(raw.to_string())
    }
}

fn parse_bytes(raw: &str) -> Option<Vec<u8>> {
    if let Some(literal) = raw.strip_prefix('b') {
        return unquote(literal).map(String::into_bytes);
    }
    serde_json::from_str(raw).ok()
}
