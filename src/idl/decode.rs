//! Strict variant decoders for every IDL sum type
//!
//! Each decoder accepts exactly the JSON shape it owns. The candidate lists
//! fix the trial order: primitives by exact string match first, then the
//! wrapper shapes by required key.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

use super::trial::{
    expect_kind, expect_literal, first_match, from_json, payload, require_key, require_str,
    Candidate, DecodeFn,
};
use super::types::{
    IdlArrayLen, IdlDefinedFields, IdlField, IdlGenericArg, IdlInstructionAccount,
    IdlInstructionAccountItem, IdlInstructionAccounts, IdlRepr, IdlSeed,
    IdlSerialization, IdlType, IdlTypeDefGeneric, IdlTypeDefTy, IdlTypeSlot,
};
use crate::error::ParseError;

/// Decoding from a raw JSON value by ordered trial parsing
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ParseError>;
}

/// Routes serde through the trial decoders so derived structs can hold sum types
macro_rules! deserialize_via_trial {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let value = Value::deserialize(deserializer)?;
                    <$ty as FromValue>::from_value(&value).map_err(de::Error::custom)
                }
            }
        )+
    };
}

deserialize_via_trial!(
    IdlType,
    IdlArrayLen,
    IdlGenericArg,
    IdlDefinedFields,
    IdlTypeDefTy,
    IdlTypeDefGeneric,
    IdlSerialization,
    IdlRepr,
    IdlSeed,
    IdlInstructionAccountItem,
);

// ---------------------------------------------------------------------------
// IdlType
// ---------------------------------------------------------------------------

macro_rules! primitive_decoders {
    ($($fn_name:ident => $literal:literal => $variant:ident),+ $(,)?) => {
        $(
            fn $fn_name(value: &Value) -> Result<IdlType, ParseError> {
                expect_literal(value, $literal).map(|()| IdlType::$variant)
            }
        )+

        const PRIMITIVE_CANDIDATES: &[Candidate<IdlType>] = &[
            $(Candidate::new($literal, $fn_name as DecodeFn<IdlType>),)+
        ];
    };
}

primitive_decoders! {
    decode_bool => "bool" => Bool,
    decode_u8 => "u8" => U8,
    decode_i8 => "i8" => I8,
    decode_u16 => "u16" => U16,
    decode_i16 => "i16" => I16,
    decode_u32 => "u32" => U32,
    decode_i32 => "i32" => I32,
    decode_f32 => "f32" => F32,
    decode_u64 => "u64" => U64,
    decode_i64 => "i64" => I64,
    decode_f64 => "f64" => F64,
    decode_u128 => "u128" => U128,
    decode_i128 => "i128" => I128,
    decode_u256 => "u256" => U256,
    decode_i256 => "i256" => I256,
    decode_bytes => "bytes" => Bytes,
    decode_string => "string" => String,
    decode_pubkey => "pubkey" => Pubkey,
}

const WRAPPER_CANDIDATES: &[Candidate<IdlType>] = &[
    Candidate::new("option", decode_option),
    Candidate::new("coption", decode_coption),
    Candidate::new("vec", decode_vec),
    Candidate::new("array", decode_array),
    Candidate::new("defined", decode_defined),
    Candidate::new("generic", decode_generic),
];

impl FromValue for IdlType {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        let candidates = if value.is_string() {
            PRIMITIVE_CANDIDATES
        } else {
            WRAPPER_CANDIDATES
        };
        first_match("IdlType", value, candidates)
    }
}

/// Decode the nested slot of a wrapper; `null` means "present but empty"
fn decode_slot(inner: &Value) -> Result<IdlTypeSlot, ParseError> {
    if inner.is_null() {
        return Ok(None);
    }
    IdlType::from_value(inner).map(|ty| Some(Box::new(ty)))
}

fn decode_option(value: &Value) -> Result<IdlType, ParseError> {
    decode_slot(require_key(value, "option")?).map(IdlType::Option)
}

fn decode_coption(value: &Value) -> Result<IdlType, ParseError> {
    decode_slot(require_key(value, "coption")?).map(IdlType::COption)
}

fn decode_vec(value: &Value) -> Result<IdlType, ParseError> {
    decode_slot(require_key(value, "vec")?).map(IdlType::Vec)
}

fn decode_array(value: &Value) -> Result<IdlType, ParseError> {
    let inner = require_key(value, "array")?;
    if inner.is_null() {
        return Ok(IdlType::Array(None, IdlArrayLen::Value(0)));
    }

    match inner.as_array().map(Vec::as_slice) {
        Some([ty, len]) => Ok(IdlType::Array(decode_slot(ty)?, IdlArrayLen::from_value(len)?)),
        _ => Err(ParseError::Mismatch {
            expected: "[type, length]",
            payload: payload(inner),
        }),
    }
}

fn decode_defined(value: &Value) -> Result<IdlType, ParseError> {
    let defined = require_key(value, "defined")?;
    let name = require_str(defined, "name")?.to_string();

    let generics = match defined.get("generics") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(args)) => args
            .iter()
            .map(IdlGenericArg::from_value)
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(ParseError::Mismatch {
                expected: "generic argument list",
                payload: payload(other),
            })
        }
    };

    Ok(IdlType::Defined { name, generics })
}

fn decode_generic(value: &Value) -> Result<IdlType, ParseError> {
    let name = require_key(value, "generic")?;
    name.as_str()
        .map(|n| IdlType::Generic(n.to_string()))
        .ok_or_else(|| ParseError::Mismatch {
            expected: "generic name",
            payload: payload(name),
        })
}

// ---------------------------------------------------------------------------
// IdlArrayLen
// ---------------------------------------------------------------------------

impl FromValue for IdlArrayLen {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlArrayLen",
            value,
            &[
                Candidate::new("value", decode_len_value),
                Candidate::new("generic", decode_len_generic),
            ],
        )
    }
}

fn decode_len_value(value: &Value) -> Result<IdlArrayLen, ParseError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .map(IdlArrayLen::Value)
        .ok_or_else(|| ParseError::Mismatch {
            expected: "non-negative integer",
            payload: payload(value),
        })
}

fn decode_len_generic(value: &Value) -> Result<IdlArrayLen, ParseError> {
    require_str(value, "generic").map(|name| IdlArrayLen::Generic(name.to_string()))
}

// ---------------------------------------------------------------------------
// IdlGenericArg
// ---------------------------------------------------------------------------

impl FromValue for IdlGenericArg {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlGenericArg",
            value,
            &[
                Candidate::new("type", decode_generic_arg_type),
                Candidate::new("const", decode_generic_arg_const),
            ],
        )
    }
}

fn decode_generic_arg_type(value: &Value) -> Result<IdlGenericArg, ParseError> {
    expect_kind(value, "type")?;
    let ty = IdlType::from_value(require_key(value, "type")?)?;
    Ok(IdlGenericArg::Type { ty })
}

fn decode_generic_arg_const(value: &Value) -> Result<IdlGenericArg, ParseError> {
    expect_kind(value, "const")?;
    Ok(IdlGenericArg::Const {
        value: require_str(value, "value")?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// IdlDefinedFields
// ---------------------------------------------------------------------------

impl FromValue for IdlDefinedFields {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlDefinedFields",
            value,
            &[
                Candidate::new("named", decode_named_fields),
                Candidate::new("tuple", decode_tuple_fields),
            ],
        )
    }
}

fn expect_list(value: &Value) -> Result<&[Value], ParseError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ParseError::Mismatch {
            expected: "array",
            payload: payload(value),
        })
}

/// Named iff the first element carries a `name` key; an empty list is named
fn decode_named_fields(value: &Value) -> Result<IdlDefinedFields, ParseError> {
    let items = expect_list(value)?;
    if let Some(first) = items.first() {
        if first.get("name").is_none() {
            return Err(ParseError::MissingKey {
                key: "name",
                payload: payload(first),
            });
        }
    }

    items
        .iter()
        .map(|item| from_json::<IdlField>("IdlField", item))
        .collect::<Result<_, _>>()
        .map(IdlDefinedFields::Named)
}

fn decode_tuple_fields(value: &Value) -> Result<IdlDefinedFields, ParseError> {
    let items = expect_list(value)?;
    if items.first().is_some_and(|first| first.get("name").is_some()) {
        return Err(ParseError::Mismatch {
            expected: "unnamed field types",
            payload: payload(value),
        });
    }

    items
        .iter()
        .map(IdlType::from_value)
        .collect::<Result<_, _>>()
        .map(IdlDefinedFields::Tuple)
}

// ---------------------------------------------------------------------------
// IdlTypeDefTy
// ---------------------------------------------------------------------------

impl FromValue for IdlTypeDefTy {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlTypeDefTy",
            value,
            &[
                Candidate::new("struct", decode_struct_ty),
                Candidate::new("enum", decode_enum_ty),
                Candidate::new("type", decode_alias_ty),
            ],
        )
    }
}

fn decode_struct_ty(value: &Value) -> Result<IdlTypeDefTy, ParseError> {
    expect_kind(value, "struct")?;
    let fields = match value.get("fields") {
        None | Some(Value::Null) => None,
        Some(fields) => Some(IdlDefinedFields::from_value(fields)?),
    };
    Ok(IdlTypeDefTy::Struct { fields })
}

fn decode_enum_ty(value: &Value) -> Result<IdlTypeDefTy, ParseError> {
    expect_kind(value, "enum")?;
    let variants = from_json("IdlEnumVariant list", require_key(value, "variants")?)?;
    Ok(IdlTypeDefTy::Enum { variants })
}

fn decode_alias_ty(value: &Value) -> Result<IdlTypeDefTy, ParseError> {
    expect_kind(value, "type")?;
    let alias = IdlType::from_value(require_key(value, "alias")?)?;
    Ok(IdlTypeDefTy::Type { alias })
}

// ---------------------------------------------------------------------------
// IdlTypeDefGeneric
// ---------------------------------------------------------------------------

impl FromValue for IdlTypeDefGeneric {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlTypeDefGeneric",
            value,
            &[
                Candidate::new("type", decode_typedef_generic_type),
                Candidate::new("const", decode_typedef_generic_const),
            ],
        )
    }
}

fn decode_typedef_generic_type(value: &Value) -> Result<IdlTypeDefGeneric, ParseError> {
    expect_kind(value, "type")?;
    Ok(IdlTypeDefGeneric::Type {
        name: require_str(value, "name")?.to_string(),
    })
}

fn decode_typedef_generic_const(value: &Value) -> Result<IdlTypeDefGeneric, ParseError> {
    expect_kind(value, "const")?;
    Ok(IdlTypeDefGeneric::Const {
        name: require_str(value, "name")?.to_string(),
        ty: require_str(value, "type")?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// IdlSerialization
// ---------------------------------------------------------------------------

impl FromValue for IdlSerialization {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlSerialization",
            value,
            &[
                Candidate::new("borsh", |v| {
                    expect_literal(v, "borsh").map(|()| IdlSerialization::Borsh)
                }),
                Candidate::new("bytemuck", |v| {
                    expect_literal(v, "bytemuck").map(|()| IdlSerialization::Bytemuck)
                }),
                Candidate::new("bytemuckunsafe", |v| {
                    expect_literal(v, "bytemuckunsafe").map(|()| IdlSerialization::BytemuckUnsafe)
                }),
                Candidate::new("custom", |v| {
                    require_str(v, "custom").map(|s| IdlSerialization::Custom(s.to_string()))
                }),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// IdlRepr
// ---------------------------------------------------------------------------

impl FromValue for IdlRepr {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlRepr",
            value,
            &[
                Candidate::new("rust", |v| {
                    expect_kind(v, "rust")?;
                    from_json("IdlReprModifier", v).map(IdlRepr::Rust)
                }),
                Candidate::new("c", |v| {
                    expect_kind(v, "c")?;
                    from_json("IdlReprModifier", v).map(IdlRepr::C)
                }),
                Candidate::new("transparent", |v| {
                    expect_kind(v, "transparent").map(|()| IdlRepr::Transparent)
                }),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// IdlSeed
// ---------------------------------------------------------------------------

impl FromValue for IdlSeed {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlSeed",
            value,
            &[
                Candidate::new("const", decode_seed_const),
                Candidate::new("arg", decode_seed_arg),
                Candidate::new("account", decode_seed_account),
            ],
        )
    }
}

fn decode_seed_const(value: &Value) -> Result<IdlSeed, ParseError> {
    expect_kind(value, "const")?;
    let bytes = from_json("seed bytes", require_key(value, "value")?)?;
    Ok(IdlSeed::Const { value: bytes })
}

fn decode_seed_arg(value: &Value) -> Result<IdlSeed, ParseError> {
    expect_kind(value, "arg")?;
    Ok(IdlSeed::Arg {
        path: require_str(value, "path")?.to_string(),
    })
}

fn decode_seed_account(value: &Value) -> Result<IdlSeed, ParseError> {
    expect_kind(value, "account")?;
    let account = match value.get("account") {
        None | Some(Value::Null) => None,
        Some(_) => Some(require_str(value, "account")?.to_string()),
    };
    Ok(IdlSeed::Account {
        path: require_str(value, "path")?.to_string(),
        account,
    })
}

// ---------------------------------------------------------------------------
// IdlInstructionAccountItem
// ---------------------------------------------------------------------------

impl FromValue for IdlInstructionAccountItem {
    fn from_value(value: &Value) -> Result<Self, ParseError> {
        first_match(
            "IdlInstructionAccountItem",
            value,
            &[
                Candidate::new("composite", decode_composite_accounts),
                Candidate::new("single", decode_single_account),
            ],
        )
    }
}

fn decode_composite_accounts(value: &Value) -> Result<IdlInstructionAccountItem, ParseError> {
    require_key(value, "accounts")?;
    from_json::<IdlInstructionAccounts>("IdlInstructionAccounts", value)
        .map(IdlInstructionAccountItem::Composite)
}

fn decode_single_account(value: &Value) -> Result<IdlInstructionAccountItem, ParseError> {
    if value.get("accounts").is_some() {
        return Err(ParseError::Mismatch {
            expected: "single account",
            payload: payload(value),
        });
    }
    from_json::<IdlInstructionAccount>("IdlInstructionAccount", value)
        .map(IdlInstructionAccountItem::Single)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::types::IdlReprModifier;
    use serde_json::json;

    #[test]
    fn test_primitive_strings_decode_exactly() {
        assert_eq!(IdlType::from_value(&json!("u8")).unwrap(), IdlType::U8);
        assert_eq!(IdlType::from_value(&json!("i8")).unwrap(), IdlType::I8);
        assert_eq!(IdlType::from_value(&json!("pubkey")).unwrap(), IdlType::Pubkey);
        assert_eq!(IdlType::from_value(&json!("u256")).unwrap(), IdlType::U256);
        assert!(IdlType::from_value(&json!("u9")).is_err());
        assert!(IdlType::from_value(&json!("publicKey")).is_err());
    }

    #[test]
    fn test_u8_decoder_rejects_other_strings() {
        assert!(decode_u8(&json!("u16")).is_err());
        assert!(decode_u8(&json!("U8")).is_err());
        assert!(decode_u8(&json!(8)).is_err());
        assert_eq!(decode_u8(&json!("u8")).unwrap(), IdlType::U8);
    }

    #[test]
    fn test_wrappers() {
        assert_eq!(
            IdlType::from_value(&json!({"option": "u8"})).unwrap(),
            IdlType::option(IdlType::U8)
        );
        assert_eq!(
            IdlType::from_value(&json!({"coption": "pubkey"})).unwrap(),
            IdlType::COption(Some(Box::new(IdlType::Pubkey)))
        );
        assert_eq!(
            IdlType::from_value(&json!({"vec": {"defined": {"name": "Foo"}}})).unwrap(),
            IdlType::vec(IdlType::defined("Foo"))
        );
        assert_eq!(
            IdlType::from_value(&json!({"array": ["u8", 32]})).unwrap(),
            IdlType::array(IdlType::U8, 32)
        );
        assert_eq!(
            IdlType::from_value(&json!({"array": ["u8", {"generic": "N"}]})).unwrap(),
            IdlType::Array(
                Some(Box::new(IdlType::U8)),
                IdlArrayLen::Generic("N".to_string())
            )
        );
        assert_eq!(
            IdlType::from_value(&json!({"generic": "T"})).unwrap(),
            IdlType::Generic("T".to_string())
        );
    }

    #[test]
    fn test_null_wrapper_is_present_but_empty() {
        assert_eq!(
            IdlType::from_value(&json!({"option": null})).unwrap(),
            IdlType::Option(None)
        );
        assert_eq!(
            IdlType::from_value(&json!({"vec": null})).unwrap(),
            IdlType::Vec(None)
        );
        assert!(matches!(
            IdlType::from_value(&json!({"array": null})).unwrap(),
            IdlType::Array(None, _)
        ));
    }

    #[test]
    fn test_defined_with_generics() {
        let ty = IdlType::from_value(&json!({
            "defined": {
                "name": "Pair",
                "generics": [
                    {"kind": "type", "type": "u64"},
                    {"kind": "const", "value": "4"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(
            ty,
            IdlType::Defined {
                name: "Pair".to_string(),
                generics: vec![
                    IdlGenericArg::Type { ty: IdlType::U64 },
                    IdlGenericArg::Const {
                        value: "4".to_string()
                    },
                ],
            }
        );
    }

    #[test]
    fn test_unknown_shape_reports_payload() {
        let err = IdlType::from_value(&json!({"map": ["u8", "u8"]})).unwrap_err();
        match err {
            ParseError::UnresolvedType {
                target, payload, ..
            } => {
                assert_eq!(target, "IdlType");
                assert!(payload.contains("map"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defined_fields_named_vs_tuple() {
        let named = IdlDefinedFields::from_value(&json!([{"name": "x", "type": "u64"}])).unwrap();
        assert!(matches!(named, IdlDefinedFields::Named(ref f) if f[0].name == "x"));

        let tuple = IdlDefinedFields::from_value(&json!(["u64", "pubkey"])).unwrap();
        assert_eq!(
            tuple,
            IdlDefinedFields::Tuple(vec![IdlType::U64, IdlType::Pubkey])
        );

        let empty = IdlDefinedFields::from_value(&json!([])).unwrap();
        assert_eq!(empty, IdlDefinedFields::Named(vec![]));
    }

    #[test]
    fn test_typedef_kinds() {
        let alias = IdlTypeDefTy::from_value(&json!({"kind": "type", "alias": "u32"})).unwrap();
        assert_eq!(alias, IdlTypeDefTy::Type { alias: IdlType::U32 });

        let unit = IdlTypeDefTy::from_value(&json!({"kind": "struct"})).unwrap();
        assert_eq!(unit, IdlTypeDefTy::Struct { fields: None });

        let en = IdlTypeDefTy::from_value(&json!({
            "kind": "enum",
            "variants": [{"name": "A"}, {"name": "B", "fields": ["u8"]}]
        }))
        .unwrap();
        assert!(en.is_complex_enum());

        assert!(IdlTypeDefTy::from_value(&json!({"kind": "union"})).is_err());
    }

    #[test]
    fn test_serialization_and_repr() {
        assert_eq!(
            IdlSerialization::from_value(&json!("bytemuckunsafe")).unwrap(),
            IdlSerialization::BytemuckUnsafe
        );
        assert_eq!(
            IdlSerialization::from_value(&json!({"custom": "zstd"})).unwrap(),
            IdlSerialization::Custom("zstd".to_string())
        );
        assert_eq!(
            IdlRepr::from_value(&json!({"kind": "c", "packed": true})).unwrap(),
            IdlRepr::C(IdlReprModifier {
                packed: true,
                align: None
            })
        );
        assert_eq!(
            IdlRepr::from_value(&json!({"kind": "transparent"})).unwrap(),
            IdlRepr::Transparent
        );
    }

    #[test]
    fn test_seeds() {
        assert_eq!(
            IdlSeed::from_value(&json!({"kind": "const", "value": [1, 2]})).unwrap(),
            IdlSeed::Const { value: vec![1, 2] }
        );
        assert_eq!(
            IdlSeed::from_value(&json!({"kind": "account", "path": "owner"})).unwrap(),
            IdlSeed::Account {
                path: "owner".to_string(),
                account: None
            }
        );
        assert!(IdlSeed::from_value(&json!({"kind": "const", "value": "abc"})).is_err());
    }

    #[test]
    fn test_account_items() {
        let single = IdlInstructionAccountItem::from_value(&json!({
            "name": "payer", "writable": true, "signer": true
        }))
        .unwrap();
        assert!(matches!(single, IdlInstructionAccountItem::Single(ref a) if a.signer));

        let composite = IdlInstructionAccountItem::from_value(&json!({
            "name": "group",
            "accounts": [{"name": "inner"}]
        }))
        .unwrap();
        assert!(matches!(composite, IdlInstructionAccountItem::Composite(ref g) if g.accounts.len() == 1));
    }

    #[test]
    fn test_serde_integration() {
        let field: IdlField =
            serde_json::from_value(json!({"name": "amount", "type": {"option": "u64"}})).unwrap();
        assert_eq!(field.ty, IdlType::option(IdlType::U64));
    }
}
