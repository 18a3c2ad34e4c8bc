//! Deterministic CBOR encode/decode.
//!
//! Map entries are ordered by the bytewise lexicographic order of their
//! encoded keys (RFC 8949 §4.2.1); integers and lengths use the shortest form.

use ciborium::Value;
use serde::Serialize;

use crate::error::TokenError;

/// Encode any serializable value as CBOR bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TokenError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| TokenError::CborEncode(format!("{}", e)))?;
    Ok(buf)
}

/// Encode a CBOR value with deterministic map ordering.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>, TokenError> {
    encode(&canonicalize(value)?)
}

/// Decode exactly one CBOR item into a generic value.
///
/// Bytes left over after the item are an error.
pub fn decode_value(data: &[u8]) -> Result<Value, TokenError> {
    let mut rest = data;
    let value: Value =
        ciborium::from_reader(&mut rest).map_err(|e| TokenError::CborDecode(format!("{}", e)))?;
    if !rest.is_empty() {
        return Err(TokenError::CborDecode(format!(
            "{} trailing bytes after item",
            rest.len()
        )));
    }
    Ok(value)
}

/// Convert a JSON value into the equivalent CBOR value.
pub fn json_to_cbor(value: &serde_json::Value) -> Result<Value, TokenError> {
    Value::serialized(value).map_err(|e| TokenError::CborEncode(format!("{}", e)))
}

fn canonicalize(value: &Value) -> Result<Value, TokenError> {
    Ok(match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(canonicalize)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => {
            let mut keyed = entries
                .iter()
                .map(|(k, v)| {
                    let k = canonicalize(k)?;
                    let sort_key = encode(&k)?;
                    Ok((sort_key, k, canonicalize(v)?))
                })
                .collect::<Result<Vec<_>, TokenError>>()?;
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Map(keyed.into_iter().map(|(_, k, v)| (k, v)).collect())
        }
        Value::Tag(tag, inner) => Value::Tag(*tag, Box::new(canonicalize(inner)?)),
        other => other.clone(),
    })
}
