//! Ordered trial decoding
//!
//! IDL JSON mixes tagged objects (`{"vec": ...}`) with bare strings (`"u8"`),
//! so every sum type is decoded by running a fixed list of strict decoders
//! and keeping the first that accepts the value.

use serde_json::Value;

use crate::error::ParseError;

/// Strict decoder for one variant; must reject shapes it does not own
pub type DecodeFn<T> = fn(&Value) -> Result<T, ParseError>;

/// A named candidate variant
pub struct Candidate<T> {
    pub variant: &'static str,
    pub decode: DecodeFn<T>,
}

impl<T> Candidate<T> {
    pub const fn new(variant: &'static str, decode: DecodeFn<T>) -> Self {
        Self { variant, decode }
    }
}

/// Try each candidate in order and return the first success.
///
/// When every candidate rejects the value, the error names the target type,
/// carries the raw payload and lists why each variant refused it.
pub fn first_match<T>(
    target: &'static str,
    value: &Value,
    candidates: &[Candidate<T>],
) -> Result<T, ParseError> {
    let mut attempts = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match (candidate.decode)(value) {
            Ok(decoded) => return Ok(decoded),
            Err(err) => attempts.push(format!("{}: {}", candidate.variant, err)),
        }
    }

    Err(ParseError::UnresolvedType {
        target,
        payload: payload(value),
        attempts,
    })
}

/// Compact rendering of a JSON value for diagnostics
pub fn payload(value: &Value) -> String {
    const MAX: usize = 200;

    let text = value.to_string();
    if text.len() <= MAX {
        return text;
    }

    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Accept only the exact string `literal`
pub fn expect_literal(value: &Value, literal: &'static str) -> Result<(), ParseError> {
    match value.as_str() {
        Some(s) if s == literal => Ok(()),
        _ => Err(ParseError::Mismatch {
            expected: literal,
            payload: payload(value),
        }),
    }
}

/// Fetch a required key from an object value
pub fn require_key<'v>(value: &'v Value, key: &'static str) -> Result<&'v Value, ParseError> {
    let object = value.as_object().ok_or_else(|| ParseError::Mismatch {
        expected: "object",
        payload: payload(value),
    })?;

    object.get(key).ok_or_else(|| ParseError::MissingKey {
        key,
        payload: payload(value),
    })
}

/// Accept an object whose `kind` key equals `kind`
pub fn expect_kind(value: &Value, kind: &'static str) -> Result<(), ParseError> {
    expect_literal(require_key(value, "kind")?, kind)
}

/// Fetch a required string key
pub fn require_str<'v>(value: &'v Value, key: &'static str) -> Result<&'v str, ParseError> {
    let field = require_key(value, key)?;
    field.as_str().ok_or_else(|| ParseError::Mismatch {
        expected: "string",
        payload: payload(field),
    })
}

/// Run a serde decode for a product type, keeping the failure as a `ParseError`
pub fn from_json<T: serde::de::DeserializeOwned>(
    target: &'static str,
    value: &Value,
) -> Result<T, ParseError> {
    T::deserialize(value).map_err(|e| ParseError::Invalid {
        target,
        reason: e.to_string(),
    })
}
