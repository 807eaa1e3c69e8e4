//! Borsh wire encoding driven by derived layouts
//!
//! Integers are little-endian. `bytes`, `string` and `Vec<T>` carry a u32
//! length prefix. `Option<T>` is a one-byte tag (0 or 1) and `COption<T>` a
//! four-byte tag, each followed by the value when present. Enums start with
//! a one-byte variant ordinal.

use log::trace;
use solana_sdk::pubkey::Pubkey;

use super::buffer::ByteReader;
use super::layout::{Codec, CodecSet, FieldCodec, TypeLayout, VariantCodec};
use super::value::Value;
use crate::discriminator::Discriminator;
use crate::error::CodecError;

/// Deepest value nesting accepted while decoding
pub const MAX_DEPTH: usize = 128;

macro_rules! encode_numbers {
    ($codec:expr, $value:expr, $out:expr, $($variant:ident),+ $(,)?) => {
        match ($codec, $value) {
            $((Codec::$variant, Value::$variant(v)) => {
                $out.extend_from_slice(&v.to_le_bytes());
                return Ok(());
            })+
            _ => {}
        }
    };
}

impl CodecSet {
    pub fn encode(&self, codec: &Codec, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_into(codec, value, &mut out)?;
        Ok(out)
    }

    pub fn encode_into(
        &self,
        codec: &Codec,
        value: &Value,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        encode_numbers!(
            codec, value, out, U8, I8, U16, I16, U32, I32, F32, U64, I64, F64, U128, I128
        );

        match (codec, value) {
            (Codec::Bool, Value::Bool(b)) => out.push(u8::from(*b)),
            (Codec::U256, Value::U256(bytes)) | (Codec::I256, Value::I256(bytes)) => {
                out.extend_from_slice(bytes)
            }
            (Codec::Bytes, Value::Bytes(bytes)) => {
                write_len(bytes.len(), out)?;
                out.extend_from_slice(bytes);
            }
            (Codec::String, Value::String(s)) => {
                write_len(s.len(), out)?;
                out.extend_from_slice(s.as_bytes());
            }
            (Codec::Pubkey, Value::Pubkey(key)) => out.extend_from_slice(key.as_ref()),
            (Codec::Option(inner), Value::Option(v)) => match v {
                None => out.push(0),
                Some(v) => {
                    out.push(1);
                    self.encode_into(inner, v, out)?;
                }
            },
            (Codec::COption(inner), Value::COption(v)) => match v {
                None => out.extend_from_slice(&0u32.to_le_bytes()),
                Some(v) => {
                    out.extend_from_slice(&1u32.to_le_bytes());
                    self.encode_into(inner, v, out)?;
                }
            },
            (Codec::Vec(inner), Value::Vec(items)) => {
                self.check_zero_sized(inner, items.len())?;
                write_len(items.len(), out)?;
                for item in items {
                    self.encode_into(inner, item, out)?;
                }
            }
            (Codec::Array(inner, len), Value::Array(items)) => {
                if items.len() != *len {
                    return Err(CodecError::ArrayLength {
                        expected: *len,
                        actual: items.len(),
                    });
                }
                self.check_zero_sized(inner, items.len())?;
                for item in items {
                    self.encode_into(inner, item, out)?;
                }
            }
            (Codec::Defined(key), value) => self.encode_defined(key, value, out)?,
            (codec, value) => return Err(mismatch(codec, value)),
        }

        Ok(())
    }

    fn encode_defined(&self, key: &str, value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let layout = self
            .get(key)
            .ok_or_else(|| CodecError::MissingLayout(key.to_string()))?;

        match (layout, value) {
            (TypeLayout::Struct(fields), Value::Struct(values)) => {
                self.encode_fields(fields, values, out)
            }
            (TypeLayout::SimpleEnum(names), Value::Enum { variant, fields }) => {
                if fields.as_ref().map_or(false, |f| !f.is_empty()) {
                    return Err(CodecError::TypeMismatch {
                        expected: format!("unit variant of {}", key),
                        found: format!("{} with fields", variant),
                    });
                }
                let index = names
                    .iter()
                    .position(|n| n == variant)
                    .ok_or_else(|| unknown_variant(key, variant))?;
                out.push(index as u8);
                Ok(())
            }
            (TypeLayout::ComplexEnum(variants), Value::Enum { variant, fields }) => {
                let index = variants
                    .iter()
                    .position(|v| &v.name == variant)
                    .ok_or_else(|| unknown_variant(key, variant))?;
                out.push(index as u8);

                match (&variants[index].fields, fields) {
                    (Some(codecs), Some(values)) => self.encode_fields(codecs, values, out),
                    (Some(codecs), None) if codecs.is_empty() => Ok(()),
                    (None, None) => Ok(()),
                    (None, Some(values)) if values.is_empty() => Ok(()),
                    (Some(codecs), None) => Err(CodecError::MissingField {
                        field: format!("{}::{}.{}", key, variant, codecs[0].name),
                    }),
                    (None, Some(_)) => Err(CodecError::TypeMismatch {
                        expected: format!("unit variant {}::{}", key, variant),
                        found: "variant with fields".to_string(),
                    }),
                }
            }
            (TypeLayout::Alias(inner), value) => self.encode_into(inner, value, out),
            (_, value) => Err(CodecError::TypeMismatch {
                expected: key.to_string(),
                found: value.kind().to_string(),
            }),
        }
    }

    /// Encode fields in layout order; extra values are ignored
    pub fn encode_fields(
        &self,
        fields: &[FieldCodec],
        values: &[(String, Value)],
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        for field in fields {
            let value = values
                .iter()
                .find(|(name, _)| name == &field.name)
                .map(|(_, v)| v)
                .ok_or_else(|| CodecError::MissingField {
                    field: field.name.clone(),
                })?;
            self.encode_into(&field.codec, value, out)?;
        }
        Ok(())
    }

    /// Decode a value that must span all of `data`
    pub fn decode(&self, codec: &Codec, data: &[u8]) -> Result<Value, CodecError> {
        let mut reader = ByteReader::new(data);
        let value = self.decode_from(codec, &mut reader)?;
        if !reader.is_empty() {
            return Err(CodecError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }

    /// Decode one value, leaving the reader after it
    pub fn decode_from(&self, codec: &Codec, reader: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        self.decode_at(codec, reader, 0)
    }

    pub fn decode_fields(
        &self,
        fields: &[FieldCodec],
        reader: &mut ByteReader<'_>,
    ) -> Result<Vec<(String, Value)>, CodecError> {
        self.decode_fields_at(fields, reader, 0)
    }

    fn decode_at(
        &self,
        codec: &Codec,
        reader: &mut ByteReader<'_>,
        depth: usize,
    ) -> Result<Value, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::DepthLimit(MAX_DEPTH));
        }

        let value = match codec {
            Codec::Bool => Value::Bool(reader.read_bool()?),
            Codec::U8 => Value::U8(reader.read_u8()?),
            Codec::I8 => Value::I8(i8::from_le_bytes(reader.read_array()?)),
            Codec::U16 => Value::U16(u16::from_le_bytes(reader.read_array()?)),
            Codec::I16 => Value::I16(i16::from_le_bytes(reader.read_array()?)),
            Codec::U32 => Value::U32(reader.read_u32()?),
            Codec::I32 => Value::I32(i32::from_le_bytes(reader.read_array()?)),
            Codec::F32 => Value::F32(f32::from_le_bytes(reader.read_array()?)),
            Codec::U64 => Value::U64(u64::from_le_bytes(reader.read_array()?)),
            Codec::I64 => Value::I64(i64::from_le_bytes(reader.read_array()?)),
            Codec::F64 => Value::F64(f64::from_le_bytes(reader.read_array()?)),
            Codec::U128 => Value::U128(u128::from_le_bytes(reader.read_array()?)),
            Codec::I128 => Value::I128(i128::from_le_bytes(reader.read_array()?)),
            Codec::U256 => Value::U256(reader.read_array()?),
            Codec::I256 => Value::I256(reader.read_array()?),
            Codec::Bytes => {
                let len = reader.read_len(1)?;
                Value::Bytes(reader.read_bytes(len)?.to_vec())
            }
            Codec::String => {
                let len = reader.read_len(1)?;
                let bytes = reader.read_bytes(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Value::String(s.to_string())
            }
            Codec::Pubkey => Value::Pubkey(Pubkey::new_from_array(reader.read_array()?)),
            Codec::Option(inner) => match reader.read_u8()? {
                0 => Value::Option(None),
                1 => Value::Option(Some(Box::new(self.decode_at(inner, reader, depth + 1)?))),
                tag => return Err(CodecError::InvalidOptionTag(u32::from(tag))),
            },
            Codec::COption(inner) => match reader.read_u32()? {
                0 => Value::COption(None),
                1 => Value::COption(Some(Box::new(self.decode_at(inner, reader, depth + 1)?))),
                tag => return Err(CodecError::InvalidOptionTag(tag)),
            },
            Codec::Vec(inner) => {
                let len = reader.read_len(self.min_size(inner))?;
                self.check_zero_sized(inner, len)?;
                let mut items = Vec::with_capacity(len.min(reader.remaining()));
                for _ in 0..len {
                    items.push(self.decode_at(inner, reader, depth + 1)?);
                }
                Value::Vec(items)
            }
            Codec::Array(inner, len) => {
                self.check_zero_sized(inner, *len)?;
                reader.ensure(*len, self.min_size(inner))?;
                let mut items = Vec::with_capacity((*len).min(reader.remaining()));
                for _ in 0..*len {
                    items.push(self.decode_at(inner, reader, depth + 1)?);
                }
                Value::Array(items)
            }
            Codec::Defined(key) => self.decode_defined(key, reader, depth)?,
        };

        Ok(value)
    }

    fn decode_defined(
        &self,
        key: &str,
        reader: &mut ByteReader<'_>,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let layout = self
            .get(key)
            .ok_or_else(|| CodecError::MissingLayout(key.to_string()))?;
        trace!("Decoding `{}` at offset {}", key, reader.index());

        match layout {
            TypeLayout::Struct(fields) => Ok(Value::Struct(
                self.decode_fields_at(fields, reader, depth + 1)?,
            )),
            TypeLayout::SimpleEnum(names) => {
                let index = reader.read_u8()?;
                let name = names
                    .get(usize::from(index))
                    .ok_or_else(|| unknown_index(key, index, names.len()))?;
                Ok(Value::unit(name.clone()))
            }
            TypeLayout::ComplexEnum(variants) => {
                let index = reader.read_u8()?;
                let VariantCodec { name, fields } = variants
                    .get(usize::from(index))
                    .ok_or_else(|| unknown_index(key, index, variants.len()))?;
                let fields = match fields {
                    Some(fields) => Some(self.decode_fields_at(fields, reader, depth + 1)?),
                    None => None,
                };
                Ok(Value::Enum {
                    variant: name.clone(),
                    fields,
                })
            }
            TypeLayout::Alias(inner) => self.decode_at(inner, reader, depth + 1),
        }
    }

    fn decode_fields_at(
        &self,
        fields: &[FieldCodec],
        reader: &mut ByteReader<'_>,
        depth: usize,
    ) -> Result<Vec<(String, Value)>, CodecError> {
        fields
            .iter()
            .map(|field| Ok((field.name.clone(), self.decode_at(&field.codec, reader, depth)?)))
            .collect()
    }

    /// Discriminator followed by the encoded value
    pub fn encode_prefixed(
        &self,
        discriminator: &Discriminator,
        codec: &Codec,
        value: &Value,
    ) -> Result<Vec<u8>, CodecError> {
        let mut out = discriminator.to_vec();
        self.encode_into(codec, value, &mut out)?;
        Ok(out)
    }

    /// Check the discriminator prefix, then decode the value after it.
    /// Bytes left after the value are ignored unless `exact` is set.
    pub fn decode_prefixed(
        &self,
        discriminator: &Discriminator,
        codec: &Codec,
        data: &[u8],
        exact: bool,
    ) -> Result<Value, CodecError> {
        let mut reader = ByteReader::new(data);
        check_discriminator(discriminator, &mut reader)?;
        let value = self.decode_from(codec, &mut reader)?;
        if exact && !reader.is_empty() {
            return Err(CodecError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }
}

impl CodecSet {
    /// Elements that occupy no bytes cannot be counted back out of the
    /// data, so collections of them must stay empty
    fn check_zero_sized(&self, inner: &Codec, count: usize) -> Result<(), CodecError> {
        if count > 0 && self.min_size(inner) == 0 {
            return Err(CodecError::ZeroSizedElements {
                codec: inner.to_string(),
                count,
            });
        }
        Ok(())
    }
}

/// Read the 8-byte prefix and compare it before any field is decoded
pub fn check_discriminator(
    expected: &Discriminator,
    reader: &mut ByteReader<'_>,
) -> Result<(), CodecError> {
    let actual: Discriminator = reader.read_array()?;
    if &actual != expected {
        return Err(CodecError::DiscriminatorMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}

fn write_len(len: usize, out: &mut Vec<u8>) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn mismatch(codec: &Codec, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: codec.to_string(),
        found: value.kind().to_string(),
    }
}

fn unknown_variant(key: &str, variant: &str) -> CodecError {
    CodecError::UnknownVariant {
        name: key.to_string(),
        variant: variant.to_string(),
    }
}

fn unknown_index(key: &str, index: u8, variants: usize) -> CodecError {
    CodecError::UnknownEnumIndex {
        name: key.to_string(),
        index,
        variants,
    }
}
