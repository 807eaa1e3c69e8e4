//! Dynamic values produced and consumed by the wire codec

use serde_json::{json, Map, Number, Value as Json};
use solana_sdk::pubkey::Pubkey;

/// A decoded value shaped like its `Codec`
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    U64(u64),
    I64(i64),
    F64(f64),
    U128(u128),
    I128(i128),
    /// Little-endian bytes
    U256([u8; 32]),
    /// Little-endian two's complement bytes
    I256([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    Pubkey(Pubkey),
    Option(Option<Box<Value>>),
    COption(Option<Box<Value>>),
    Vec(Vec<Value>),
    Array(Vec<Value>),
    /// Fields in declaration order
    Struct(Vec<(String, Value)>),
    Enum {
        variant: String,
        fields: Option<Vec<(String, Value)>>,
    },
}

impl Value {
    /// Struct value from `(name, value)` pairs
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Enum variant without payload
    pub fn unit(variant: impl Into<String>) -> Self {
        Value::Enum {
            variant: variant.into(),
            fields: None,
        }
    }

    /// Enum variant carrying fields
    pub fn variant<I, K>(variant: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Enum {
            variant: variant.into(),
            fields: Some(fields.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn some(value: Value) -> Self {
        Value::Option(Some(Box::new(value)))
    }

    /// Named field of a struct or enum payload
    pub fn field(&self, name: &str) -> Option<&Value> {
        let fields = match self {
            Value::Struct(fields) => fields,
            Value::Enum {
                fields: Some(fields),
                ..
            } => fields,
            _ => return None,
        };
        fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Short name of the value's shape, used in mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::F32(_) => "f32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::U128(_) => "u128",
            Value::I128(_) => "i128",
            Value::U256(_) => "u256",
            Value::I256(_) => "i256",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Pubkey(_) => "pubkey",
            Value::Option(_) => "option",
            Value::COption(_) => "coption",
            Value::Vec(_) => "vec",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Enum { .. } => "enum",
        }
    }

    /// JSON rendering for display; 128-bit and wider integers become strings
    pub fn to_json(&self) -> Json {
        match self {
            Value::Bool(v) => json!(v),
            Value::U8(v) => json!(v),
            Value::I8(v) => json!(v),
            Value::U16(v) => json!(v),
            Value::I16(v) => json!(v),
            Value::U32(v) => json!(v),
            Value::I32(v) => json!(v),
            Value::U64(v) => json!(v),
            Value::I64(v) => json!(v),
            Value::F32(v) => float(f64::from(*v)),
            Value::F64(v) => float(*v),
            Value::U128(v) => json!(v.to_string()),
            Value::I128(v) => json!(v.to_string()),
            Value::U256(bytes) | Value::I256(bytes) => json!(wide_hex(bytes)),
            Value::Bytes(bytes) => json!(base64::encode(bytes)),
            Value::String(s) => json!(s),
            Value::Pubkey(key) => json!(key.to_string()),
            Value::Option(inner) | Value::COption(inner) => {
                inner.as_ref().map_or(Json::Null, |v| v.to_json())
            }
            Value::Vec(items) | Value::Array(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Struct(fields) => fields_json(fields),
            Value::Enum {
                variant,
                fields: None,
            } => json!(variant),
            Value::Enum {
                variant,
                fields: Some(fields),
            } => {
                let mut map = Map::new();
                map.insert(variant.clone(), fields_json(fields));
                Json::Object(map)
            }
        }
    }
}

fn float(v: f64) -> Json {
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

fn fields_json(fields: &[(String, Value)]) -> Json {
    let map: Map<String, Json> = fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    Json::Object(map)
}

/// `0x`-prefixed big-endian hex of little-endian bytes
fn wide_hex(le: &[u8; 32]) -> String {
    let digits: String = le.iter().rev().map(|b| format!("{:02x}", b)).collect();
    format!("0x{}", digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let value = Value::record([("a", Value::U8(1)), ("b", Value::Bool(true))]);
        assert_eq!(value.field("b"), Some(&Value::Bool(true)));
        assert_eq!(value.field("c"), None);
        assert_eq!(Value::U8(0).field("a"), None);
    }

    #[test]
    fn test_to_json() {
        let key = Pubkey::new_unique();
        let value = Value::record([
            ("owner", Value::Pubkey(key)),
            ("amount", Value::U64(5)),
            ("big", Value::U128(u128::MAX)),
            ("memo", Value::Option(None)),
            ("data", Value::Bytes(vec![1, 2, 3])),
            ("side", Value::unit("Bid")),
            ("action", Value::variant("Move", [("v0", Value::I8(-1))])),
        ]);

        assert_eq!(
            value.to_json(),
            json!({
                "owner": key.to_string(),
                "amount": 5,
                "big": u128::MAX.to_string(),
                "memo": null,
                "data": "AQID",
                "side": "Bid",
                "action": {"Move": {"v0": -1}}
            })
        );
    }

    #[test]
    fn test_wide_hex() {
        let mut le = [0u8; 32];
        le[0] = 0x01;
        le[31] = 0xab;
        let hex = wide_hex(&le);
        assert!(hex.starts_with("0xab00"));
        assert!(hex.ends_with("0001"));
    }
}
