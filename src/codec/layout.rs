//! Codec derivation
//!
//! Every reachable type definition is turned into a `TypeLayout` keyed by
//! its instantiated name (`Pool` or `Wrapper<u64, 4>`). Nested references
//! are stored as `Codec::Defined(key)`, which lets recursive types point at
//! a layout that is still being built.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use log::{debug, trace};

use super::registry::TypeRegistry;
use crate::error::DerivationError;
use crate::idl::{
    IdlArrayLen, IdlDefinedFields, IdlField, IdlGenericArg, IdlSerialization, IdlType,
    IdlTypeDef, IdlTypeDefGeneric, IdlTypeDefTy,
};

/// Wire codec for a single type position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codec {
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
    Option(Box<Codec>),
    COption(Box<Codec>),
    Vec(Box<Codec>),
    Array(Box<Codec>, usize),
    /// Layout stored in the `CodecSet` under this key
    Defined(String),
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Bool => write!(f, "bool"),
            Codec::U8 => write!(f, "u8"),
            Codec::I8 => write!(f, "i8"),
            Codec::U16 => write!(f, "u16"),
            Codec::I16 => write!(f, "i16"),
            Codec::U32 => write!(f, "u32"),
            Codec::I32 => write!(f, "i32"),
            Codec::F32 => write!(f, "f32"),
            Codec::U64 => write!(f, "u64"),
            Codec::I64 => write!(f, "i64"),
            Codec::F64 => write!(f, "f64"),
            Codec::U128 => write!(f, "u128"),
            Codec::I128 => write!(f, "i128"),
            Codec::U256 => write!(f, "u256"),
            Codec::I256 => write!(f, "i256"),
            Codec::Bytes => write!(f, "bytes"),
            Codec::String => write!(f, "string"),
            Codec::Pubkey => write!(f, "pubkey"),
            Codec::Option(inner) => write!(f, "Option<{}>", inner),
            Codec::COption(inner) => write!(f, "COption<{}>", inner),
            Codec::Vec(inner) => write!(f, "Vec<{}>", inner),
            Codec::Array(inner, len) => write!(f, "[{}; {}]", inner, len),
            Codec::Defined(key) => write!(f, "{}", key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCodec {
    pub name: String,
    pub codec: Codec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCodec {
    pub name: String,
    /// `None` for a variant without payload
    pub fields: Option<Vec<FieldCodec>>,
}

/// Derived layout of one type definition instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLayout {
    Struct(Vec<FieldCodec>),
    /// One-byte ordinal, variant names in declaration order
    SimpleEnum(Vec<String>),
    /// One-byte ordinal followed by the variant payload
    ComplexEnum(Vec<VariantCodec>),
    Alias(Codec),
}

/// All layouts derived from one IDL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecSet {
    layouts: BTreeMap<String, TypeLayout>,
}

impl CodecSet {
    pub fn get(&self, key: &str) -> Option<&TypeLayout> {
        self.layouts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.layouts.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeLayout)> {
        self.layouts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Encoded size when it does not depend on the value
    pub fn fixed_size(&self, codec: &Codec) -> Option<usize> {
        match codec {
            Codec::Bool | Codec::U8 | Codec::I8 => Some(1),
            Codec::U16 | Codec::I16 => Some(2),
            Codec::U32 | Codec::I32 | Codec::F32 => Some(4),
            Codec::U64 | Codec::I64 | Codec::F64 => Some(8),
            Codec::U128 | Codec::I128 => Some(16),
            Codec::U256 | Codec::I256 | Codec::Pubkey => Some(32),
            Codec::Bytes
            | Codec::String
            | Codec::Option(_)
            | Codec::COption(_)
            | Codec::Vec(_) => None,
            Codec::Array(inner, len) => self.fixed_size(inner)?.checked_mul(*len),
            Codec::Defined(key) => match self.get(key)? {
                TypeLayout::Struct(fields) => self.fields_size(fields),
                TypeLayout::SimpleEnum(_) => Some(1),
                TypeLayout::ComplexEnum(variants) => {
                    let mut sizes = variants.iter().map(|v| match &v.fields {
                        Some(fields) => self.fields_size(fields),
                        None => Some(0),
                    });
                    let first = sizes.next()??;
                    for size in sizes {
                        if size? != first {
                            return None;
                        }
                    }
                    first.checked_add(1)
                }
                TypeLayout::Alias(inner) => self.fixed_size(inner),
            },
        }
    }

    /// `None` when a field is variable-sized or the total overflows
    fn fields_size(&self, fields: &[FieldCodec]) -> Option<usize> {
        fields
            .iter()
            .try_fold(0usize, |total, f| total.checked_add(self.fixed_size(&f.codec)?))
    }

    /// Fewest bytes any value of `codec` can occupy, saturating at `usize::MAX`
    pub(crate) fn min_size(&self, codec: &Codec) -> usize {
        match codec {
            Codec::Bytes | Codec::String | Codec::Vec(_) | Codec::COption(_) => 4,
            Codec::Option(_) => 1,
            Codec::Array(inner, len) => self.min_size(inner).saturating_mul(*len),
            Codec::Defined(key) => match self.get(key) {
                Some(TypeLayout::Struct(fields)) => fields
                    .iter()
                    .map(|f| self.min_size(&f.codec))
                    .fold(0, usize::saturating_add),
                Some(TypeLayout::SimpleEnum(_)) | Some(TypeLayout::ComplexEnum(_)) => 1,
                Some(TypeLayout::Alias(inner)) => self.min_size(inner),
                // Decoding fails on the missing layout itself
                None => 1,
            },
            other => self.fixed_size(other).unwrap_or(0),
        }
    }
}

/// Generic bindings in scope while deriving one instantiation
#[derive(Debug, Clone, Default)]
struct Bindings {
    types: HashMap<String, Codec>,
    consts: HashMap<String, String>,
}

/// Most instantiations of one generic definition that may be under
/// derivation at the same time
pub const MAX_GENERIC_EXPANSION: usize = 32;

/// Derives layouts from a registry of type definitions
pub struct Deriver<'r, 'a> {
    registry: &'r TypeRegistry<'a>,
    set: CodecSet,
    in_progress: HashSet<String>,
    /// Open instantiations per generic definition name
    expanding: HashMap<String, usize>,
}

impl<'r, 'a> Deriver<'r, 'a> {
    pub fn new(registry: &'r TypeRegistry<'a>) -> Self {
        Self {
            registry,
            set: CodecSet::default(),
            in_progress: HashSet::new(),
            expanding: HashMap::new(),
        }
    }

    /// Derive every non-generic type definition
    pub fn derive_definitions(&mut self) -> Result<(), DerivationError> {
        for def in self.registry.iter() {
            if def.generics.is_empty() {
                self.instantiate(&def.name, &[], &Bindings::default(), &def.name)?;
            }
        }
        Ok(())
    }

    /// Codec for a free-standing type position (instruction arg, return, constant)
    pub fn codec(&mut self, ty: Option<&IdlType>, path: &str) -> Result<Codec, DerivationError> {
        self.codec_for(ty, &Bindings::default(), path)
    }

    /// Codecs for a list of named fields outside any type definition
    pub fn fields(
        &mut self,
        fields: &[IdlField],
        path: &str,
    ) -> Result<Vec<FieldCodec>, DerivationError> {
        self.field_codecs(
            &IdlDefinedFields::Named(fields.to_vec()),
            &Bindings::default(),
            path,
        )
    }

    /// Finish derivation, rejecting types that contain themselves directly
    pub fn finish(self) -> Result<CodecSet, DerivationError> {
        check_recursion(&self.set)?;
        debug!("Derived {} layout(s)", self.set.len());
        Ok(self.set)
    }

    fn codec_for(
        &mut self,
        ty: Option<&IdlType>,
        env: &Bindings,
        path: &str,
    ) -> Result<Codec, DerivationError> {
        let ty = ty.ok_or_else(|| DerivationError::UnresolvedType {
            path: path.to_string(),
        })?;

        let codec = match ty {
            IdlType::Bool => Codec::Bool,
            IdlType::U8 => Codec::U8,
            IdlType::I8 => Codec::I8,
            IdlType::U16 => Codec::U16,
            IdlType::I16 => Codec::I16,
            IdlType::U32 => Codec::U32,
            IdlType::I32 => Codec::I32,
            IdlType::F32 => Codec::F32,
            IdlType::U64 => Codec::U64,
            IdlType::I64 => Codec::I64,
            IdlType::F64 => Codec::F64,
            IdlType::U128 => Codec::U128,
            IdlType::I128 => Codec::I128,
            IdlType::U256 => Codec::U256,
            IdlType::I256 => Codec::I256,
            IdlType::Bytes => Codec::Bytes,
            IdlType::String => Codec::String,
            IdlType::Pubkey => Codec::Pubkey,
            IdlType::Option(inner) => {
                Codec::Option(Box::new(self.codec_for(inner.as_deref(), env, path)?))
            }
            IdlType::COption(inner) => {
                Codec::COption(Box::new(self.codec_for(inner.as_deref(), env, path)?))
            }
            IdlType::Vec(inner) => {
                Codec::Vec(Box::new(self.codec_for(inner.as_deref(), env, path)?))
            }
            IdlType::Array(inner, len) => {
                let len = array_len(len, env, path)?;
                Codec::Array(Box::new(self.codec_for(inner.as_deref(), env, path)?), len)
            }
            IdlType::Defined { name, generics } => self.instantiate(name, generics, env, path)?,
            IdlType::Generic(name) => {
                env.types
                    .get(name)
                    .cloned()
                    .ok_or_else(|| DerivationError::UnboundGeneric {
                        name: name.clone(),
                        path: path.to_string(),
                    })?
            }
        };

        Ok(codec)
    }

    fn instantiate(
        &mut self,
        name: &str,
        args: &[IdlGenericArg],
        env: &Bindings,
        path: &str,
    ) -> Result<Codec, DerivationError> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| DerivationError::UndefinedType {
                name: name.to_string(),
                path: path.to_string(),
            })?;

        if def.generics.len() != args.len() {
            return Err(DerivationError::GenericArity {
                name: name.to_string(),
                expected: def.generics.len(),
                actual: args.len(),
            });
        }

        let mut bindings = Bindings::default();
        let mut labels = Vec::with_capacity(args.len());
        for (param, arg) in def.generics.iter().zip(args) {
            match (param, arg) {
                (IdlTypeDefGeneric::Type { name: param }, IdlGenericArg::Type { ty }) => {
                    let codec = self.codec_for(Some(ty), env, path)?;
                    labels.push(codec.to_string());
                    bindings.types.insert(param.clone(), codec);
                }
                (IdlTypeDefGeneric::Const { name: param, .. }, IdlGenericArg::Const { value }) => {
                    // A const argument may itself name a const generic of the caller
                    let value = env.consts.get(value).cloned().unwrap_or_else(|| value.clone());
                    labels.push(value.clone());
                    bindings.consts.insert(param.clone(), value);
                }
                (param, _) => {
                    return Err(DerivationError::GenericMismatch {
                        name: name.to_string(),
                        param: param.name().to_string(),
                    })
                }
            }
        }

        let key = if labels.is_empty() {
            name.to_string()
        } else {
            format!("{}<{}>", name, labels.join(", "))
        };

        if self.set.contains(&key) || self.in_progress.contains(&key) {
            return Ok(Codec::Defined(key));
        }

        // A generic reaching a new instantiation of itself, as in
        // `Nest<T> { next: Option<Nest<Vec<T>>> }`, never closes
        let open = self.expanding.entry(name.to_string()).or_default();
        if *open >= MAX_GENERIC_EXPANSION {
            return Err(DerivationError::GenericExpansion {
                name: name.to_string(),
                limit: MAX_GENERIC_EXPANSION,
            });
        }
        *open += 1;

        trace!("Deriving layout for `{}`", key);
        self.in_progress.insert(key.clone());
        let layout = self.layout(def, &bindings, &key);
        self.in_progress.remove(&key);
        if let Some(open) = self.expanding.get_mut(name) {
            *open -= 1;
        }
        self.set.layouts.insert(key.clone(), layout?);

        Ok(Codec::Defined(key))
    }

    fn layout(
        &mut self,
        def: &IdlTypeDef,
        env: &Bindings,
        key: &str,
    ) -> Result<TypeLayout, DerivationError> {
        if let IdlSerialization::Custom(serialization) = &def.serialization {
            return Err(DerivationError::UnsupportedSerialization {
                name: def.name.clone(),
                serialization: serialization.clone(),
            });
        }

        match &def.ty {
            IdlTypeDefTy::Struct { fields: None } => Ok(TypeLayout::Struct(Vec::new())),
            IdlTypeDefTy::Struct {
                fields: Some(fields),
            } => Ok(TypeLayout::Struct(self.field_codecs(fields, env, key)?)),
            IdlTypeDefTy::Enum { variants } => {
                if variants.len() > usize::from(u8::MAX) + 1 {
                    return Err(DerivationError::TooManyVariants {
                        name: def.name.clone(),
                        count: variants.len(),
                    });
                }

                if !self.registry.is_complex_enum(&def.name) {
                    return Ok(TypeLayout::SimpleEnum(
                        variants.iter().map(|v| v.name.clone()).collect(),
                    ));
                }

                let mut out = Vec::with_capacity(variants.len());
                for variant in variants {
                    let fields = match &variant.fields {
                        Some(fields) => {
                            let path = format!("{}::{}", key, variant.name);
                            Some(self.field_codecs(fields, env, &path)?)
                        }
                        None => None,
                    };
                    out.push(VariantCodec {
                        name: variant.name.clone(),
                        fields,
                    });
                }
                Ok(TypeLayout::ComplexEnum(out))
            }
            IdlTypeDefTy::Type { alias } => {
                Ok(TypeLayout::Alias(self.codec_for(Some(alias), env, key)?))
            }
        }
    }

    fn field_codecs(
        &mut self,
        fields: &IdlDefinedFields,
        env: &Bindings,
        path: &str,
    ) -> Result<Vec<FieldCodec>, DerivationError> {
        fields
            .named()
            .into_iter()
            .map(|(name, ty)| {
                let codec = self.codec_for(Some(ty), env, &format!("{}.{}", path, name))?;
                Ok(FieldCodec { name, codec })
            })
            .collect()
    }
}

fn array_len(len: &IdlArrayLen, env: &Bindings, path: &str) -> Result<usize, DerivationError> {
    match len {
        IdlArrayLen::Value(n) => Ok(*n),
        IdlArrayLen::Generic(name) => env
            .consts
            .get(name)
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| DerivationError::GenericArrayLength {
                name: name.clone(),
                path: path.to_string(),
            }),
    }
}

/// Derive layouts for every non-generic type definition in `registry`
pub fn derive_codecs(registry: &TypeRegistry<'_>) -> Result<CodecSet, DerivationError> {
    let mut deriver = Deriver::new(registry);
    deriver.derive_definitions()?;
    deriver.finish()
}

/// Reject layouts that reach themselves through struct fields, enum
/// payloads, aliases or arrays without passing an `Option`, `COption`
/// or `Vec`.
fn check_recursion(set: &CodecSet) -> Result<(), DerivationError> {
    fn direct_refs<'c>(codec: &'c Codec, out: &mut Vec<&'c str>) {
        match codec {
            Codec::Defined(key) => out.push(key),
            Codec::Array(inner, _) => direct_refs(inner, out),
            _ => {}
        }
    }

    fn visit<'c>(
        set: &'c CodecSet,
        key: &'c str,
        stack: &mut Vec<&'c str>,
        done: &mut HashSet<&'c str>,
    ) -> Result<(), DerivationError> {
        if done.contains(key) {
            return Ok(());
        }
        if stack.contains(&key) {
            return Err(DerivationError::RecursiveType {
                name: key.to_string(),
            });
        }

        let mut refs = Vec::new();
        match set.get(key) {
            Some(TypeLayout::Struct(fields)) => {
                fields.iter().for_each(|f| direct_refs(&f.codec, &mut refs))
            }
            Some(TypeLayout::ComplexEnum(variants)) => variants
                .iter()
                .flat_map(|v| v.fields.iter().flatten())
                .for_each(|f| direct_refs(&f.codec, &mut refs)),
            Some(TypeLayout::Alias(codec)) => direct_refs(codec, &mut refs),
            Some(TypeLayout::SimpleEnum(_)) | None => {}
        }

        stack.push(key);
        for next in refs {
            visit(set, next, stack, done)?;
        }
        stack.pop();
        done.insert(key);
        Ok(())
    }

    let mut done = HashSet::new();
    for (key, _) in set.iter() {
        visit(set, key, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{parse_idl, Idl};

    fn idl(types: &str) -> Idl {
        parse_idl(&format!(
            r#"{{
                "metadata": {{"name": "l", "version": "0.1.0", "spec": "0.1.0"}},
                "types": {types}
            }}"#
        ))
        .unwrap()
    }

    fn derive(idl: &Idl) -> Result<CodecSet, DerivationError> {
        derive_codecs(&TypeRegistry::from_idl(idl))
    }

    #[test]
    fn test_struct_layout() {
        let idl = idl(
            r#"[{"name": "Pool", "type": {"kind": "struct", "fields": [
                {"name": "authority", "type": "pubkey"},
                {"name": "fees", "type": {"array": ["u16", 4]}},
                {"name": "memo", "type": {"option": "string"}}
            ]}}]"#,
        );
        let set = derive(&idl).unwrap();

        assert_eq!(
            set.get("Pool"),
            Some(&TypeLayout::Struct(vec![
                FieldCodec {
                    name: "authority".into(),
                    codec: Codec::Pubkey
                },
                FieldCodec {
                    name: "fees".into(),
                    codec: Codec::Array(Box::new(Codec::U16), 4)
                },
                FieldCodec {
                    name: "memo".into(),
                    codec: Codec::Option(Box::new(Codec::String))
                },
            ]))
        );
        assert_eq!(set.fixed_size(&Codec::Defined("Pool".into())), None);
    }

    #[test]
    fn test_enum_kinds() {
        let idl = idl(
            r#"[
                {"name": "Side", "type": {"kind": "enum", "variants": [{"name": "Bid"}, {"name": "Ask"}]}},
                {"name": "Action", "type": {"kind": "enum", "variants": [
                    {"name": "Noop"},
                    {"name": "Move", "fields": ["i8", "i8"]},
                    {"name": "Say", "fields": [{"name": "text", "type": "string"}]}
                ]}}
            ]"#,
        );
        let set = derive(&idl).unwrap();

        assert_eq!(
            set.get("Side"),
            Some(&TypeLayout::SimpleEnum(vec!["Bid".into(), "Ask".into()]))
        );
        match set.get("Action") {
            Some(TypeLayout::ComplexEnum(variants)) => {
                assert_eq!(variants.len(), 3);
                assert_eq!(variants[0].fields, None);
                let moves = variants[1].fields.as_ref().unwrap();
                assert_eq!(moves[0].name, "v0");
                assert_eq!(moves[1].codec, Codec::I8);
                assert_eq!(variants[2].fields.as_ref().unwrap()[0].name, "text");
            }
            other => panic!("unexpected layout {:?}", other),
        }
        assert_eq!(set.fixed_size(&Codec::Defined("Side".into())), Some(1));
    }

    #[test]
    fn test_generic_array_length_is_an_error() {
        let idl = idl(
            r#"[{"name": "Buf", "type": {"kind": "struct", "fields": [
                {"name": "data", "type": {"array": ["u8", {"generic": "N"}]}}
            ]}}]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::GenericArrayLength {
                name: "N".into(),
                path: "Buf.data".into(),
            })
        );
    }

    #[test]
    fn test_generic_instantiation() {
        let idl = idl(
            r#"[
                {"name": "Wrapper", "generics": [
                    {"kind": "type", "name": "T"},
                    {"kind": "const", "name": "N", "type": "usize"}
                ], "type": {"kind": "struct", "fields": [
                    {"name": "items", "type": {"array": [{"generic": "T"}, {"generic": "N"}]}}
                ]}},
                {"name": "Holder", "type": {"kind": "struct", "fields": [
                    {"name": "w", "type": {"defined": {"name": "Wrapper", "generics": [
                        {"kind": "type", "type": "u64"},
                        {"kind": "const", "value": "3"}
                    ]}}}
                ]}}
            ]"#,
        );
        let set = derive(&idl).unwrap();

        assert!(!set.contains("Wrapper"));
        assert_eq!(
            set.get("Wrapper<u64, 3>"),
            Some(&TypeLayout::Struct(vec![FieldCodec {
                name: "items".into(),
                codec: Codec::Array(Box::new(Codec::U64), 3)
            }]))
        );
        assert_eq!(set.fixed_size(&Codec::Defined("Holder".into())), Some(24));
    }

    #[test]
    fn test_generic_arity() {
        let idl = idl(
            r#"[
                {"name": "Wrapper", "generics": [{"kind": "type", "name": "T"}],
                 "type": {"kind": "struct", "fields": [{"name": "v", "type": {"generic": "T"}}]}},
                {"name": "Bad", "type": {"kind": "struct", "fields": [
                    {"name": "w", "type": {"defined": {"name": "Wrapper"}}}
                ]}}
            ]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::GenericArity {
                name: "Wrapper".into(),
                expected: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_recursion_through_option_is_allowed() {
        let idl = idl(
            r#"[{"name": "Node", "type": {"kind": "struct", "fields": [
                {"name": "value", "type": "u32"},
                {"name": "next", "type": {"option": {"defined": {"name": "Node"}}}}
            ]}}]"#,
        );
        let set = derive(&idl).unwrap();
        match set.get("Node") {
            Some(TypeLayout::Struct(fields)) => assert_eq!(
                fields[1].codec,
                Codec::Option(Box::new(Codec::Defined("Node".into())))
            ),
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[test]
    fn test_direct_recursion_is_rejected() {
        let idl = idl(
            r#"[
                {"name": "A", "type": {"kind": "struct", "fields": [{"name": "b", "type": {"defined": {"name": "B"}}}]}},
                {"name": "B", "type": {"kind": "struct", "fields": [{"name": "a", "type": {"array": [{"defined": {"name": "A"}}, 2]}}]}}
            ]"#,
        );
        assert!(matches!(
            derive(&idl),
            Err(DerivationError::RecursiveType { .. })
        ));
    }

    #[test]
    fn test_unresolved_slot() {
        let idl = idl(
            r#"[{"name": "Holey", "type": {"kind": "struct", "fields": [{"name": "v", "type": {"vec": null}}]}}]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::UnresolvedType {
                path: "Holey.v".into()
            })
        );
    }

    #[test]
    fn test_serialization_modes() {
        let idl = idl(
            r#"[
                {"name": "Packed", "serialization": "bytemuck", "repr": {"kind": "c"},
                 "type": {"kind": "struct", "fields": [{"name": "x", "type": "u64"}]}},
                {"name": "Odd", "serialization": {"custom": "myformat"},
                 "type": {"kind": "struct", "fields": []}}
            ]"#,
        );
        let err = derive(&idl).unwrap_err();
        assert_eq!(
            err,
            DerivationError::UnsupportedSerialization {
                name: "Odd".into(),
                serialization: "myformat".into(),
            }
        );
    }

    #[test]
    fn test_alias() {
        let idl = idl(r#"[{"name": "Lamports", "type": {"kind": "type", "alias": "u64"}}]"#);
        let set = derive(&idl).unwrap();
        assert_eq!(set.get("Lamports"), Some(&TypeLayout::Alias(Codec::U64)));
        assert_eq!(set.fixed_size(&Codec::Defined("Lamports".into())), Some(8));
    }

    #[test]
    fn test_codec_display() {
        let codec = Codec::Vec(Box::new(Codec::Option(Box::new(Codec::Array(
            Box::new(Codec::Defined("Pool".into())),
            2,
        )))));
        assert_eq!(codec.to_string(), "Vec<Option<[Pool; 2]>>");
    }

    #[test]
    fn test_too_many_variants() {
        let variants: Vec<String> = (0..257).map(|i| format!(r#"{{"name": "V{}"}}"#, i)).collect();
        let idl = idl(&format!(
            r#"[{{"name": "Wide", "type": {{"kind": "enum", "variants": [{}]}}}}]"#,
            variants.join(", ")
        ));
        assert_eq!(
            derive(&idl),
            Err(DerivationError::TooManyVariants {
                name: "Wide".into(),
                count: 257,
            })
        );
    }

    #[test]
    fn test_unbound_generic() {
        let idl = idl(
            r#"[{"name": "Loose", "type": {"kind": "struct", "fields": [
                {"name": "v", "type": {"generic": "T"}}
            ]}}]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::UnboundGeneric {
                name: "T".into(),
                path: "Loose.v".into(),
            })
        );
    }

    #[test]
    fn test_generic_argument_kind_mismatch() {
        let idl = idl(
            r#"[
                {"name": "Wrapper", "generics": [{"kind": "type", "name": "T"}],
                 "type": {"kind": "struct", "fields": [{"name": "v", "type": {"generic": "T"}}]}},
                {"name": "Bad", "type": {"kind": "struct", "fields": [
                    {"name": "w", "type": {"defined": {"name": "Wrapper", "generics": [
                        {"kind": "const", "value": "3"}
                    ]}}}
                ]}}
            ]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::GenericMismatch {
                name: "Wrapper".into(),
                param: "T".into(),
            })
        );
    }

    #[test]
    fn test_polymorphic_recursion_is_bounded() {
        let idl = idl(
            r#"[
                {"name": "Nest", "generics": [{"kind": "type", "name": "T"}],
                 "type": {"kind": "struct", "fields": [
                    {"name": "next", "type": {"option": {"defined": {"name": "Nest", "generics": [
                        {"kind": "type", "type": {"vec": {"generic": "T"}}}
                    ]}}}}
                 ]}},
                {"name": "Root", "type": {"kind": "struct", "fields": [
                    {"name": "nest", "type": {"defined": {"name": "Nest", "generics": [
                        {"kind": "type", "type": "u8"}
                    ]}}}
                ]}}
            ]"#,
        );
        assert_eq!(
            derive(&idl),
            Err(DerivationError::GenericExpansion {
                name: "Nest".into(),
                limit: MAX_GENERIC_EXPANSION,
            })
        );
    }

    #[test]
    fn test_nested_generic_arguments_are_not_expansion() {
        let idl = idl(
            r#"[
                {"name": "Box1", "generics": [{"kind": "type", "name": "T"}],
                 "type": {"kind": "struct", "fields": [{"name": "v", "type": {"generic": "T"}}]}},
                {"name": "Root", "type": {"kind": "struct", "fields": [
                    {"name": "b", "type": {"defined": {"name": "Box1", "generics": [
                        {"kind": "type", "type": {"defined": {"name": "Box1", "generics": [
                            {"kind": "type", "type": "u8"}
                        ]}}}
                    ]}}}
                ]}}
            ]"#,
        );
        let set = derive(&idl).unwrap();
        assert!(set.contains("Box1<u8>"));
        assert!(set.contains("Box1<Box1<u8>>"));
    }

    #[test]
    fn test_sizes_do_not_overflow() {
        let idl = idl(
            r#"[
                {"name": "Wide", "type": {"kind": "struct", "fields": [
                    {"name": "a", "type": {"array": ["u64", 4611686018427387904]}}
                ]}},
                {"name": "Big", "type": {"kind": "struct", "fields": [
                    {"name": "a", "type": {"array": ["u8", 18446744073709551615]}},
                    {"name": "b", "type": "u8"}
                ]}}
            ]"#,
        );
        let set = derive(&idl).unwrap();

        assert_eq!(set.fixed_size(&Codec::Defined("Wide".into())), None);
        assert_eq!(set.fixed_size(&Codec::Defined("Big".into())), None);
        assert_eq!(set.min_size(&Codec::Defined("Wide".into())), usize::MAX);
        assert_eq!(set.min_size(&Codec::Defined("Big".into())), usize::MAX);
    }
}
