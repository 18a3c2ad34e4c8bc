//! Transport encodings and structural token decoding.
//!
//! Charset choice is independent of algorithm and compression. Transport
//! decode failures and shape errors are reported as `TokenError::Malformed`.

use ciborium::Value;
use qrsig_crypto::{
    base45_decode, base45_encode, base64_decode, base64_encode, base64url_decode,
    base64url_encode,
};
use serde_bytes::Bytes;

use crate::cbor;
use crate::error::TokenError;
use crate::types::TransportEncoding;

/// Number of elements in a COSE_Sign1 array.
pub const COSE_SIGN1_ARITY: usize = 4;

/// Number of dot-separated segments in a compact JWS.
pub const JWS_SEGMENTS: usize = 3;

/// Encode serialized token bytes into a transport string.
pub fn encode_token(token_bytes: &[u8], encoding: TransportEncoding) -> String {
    match encoding {
        TransportEncoding::Base64Url => base64url_encode(token_bytes),
        TransportEncoding::Base64 => base64_encode(token_bytes),
        TransportEncoding::Base45 => base45_encode(token_bytes),
    }
}

/// Decode a transport string back into serialized token bytes.
pub fn decode_token(token: &str, encoding: TransportEncoding) -> Result<Vec<u8>, TokenError> {
    let decoded = match encoding {
        TransportEncoding::Base64Url => base64url_decode(token),
        TransportEncoding::Base64 => base64_decode(token),
        TransportEncoding::Base45 => base45_decode(token),
    };
    decoded.map_err(|e| TokenError::Malformed(format!("{} transport: {}", encoding, e)))
}

/// Components of a decoded COSE_Sign1 structure.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSign1Parts {
    pub protected_header_bytes: Vec<u8>,
    pub unprotected_header: Vec<(Value, Value)>,
    pub payload_bytes: Vec<u8>,
    pub signature_bytes: Vec<u8>,
}

/// Serialize `[protected, {}, payload, signature]`.
///
/// The unprotected header is always the empty map.
pub fn encode_structure(
    protected_header_bytes: &[u8],
    payload_bytes: &[u8],
    signature_bytes: &[u8],
) -> Result<Vec<u8>, TokenError> {
    cbor::encode(&(
        Bytes::new(protected_header_bytes),
        Value::Map(Vec::new()),
        Bytes::new(payload_bytes),
        Bytes::new(signature_bytes),
    ))
}

/// Decode serialized COSE_Sign1 bytes into their four components.
///
/// Anything other than `[bstr, map, bstr, bstr]` is a structural error.
pub fn decode_structure(token_bytes: &[u8]) -> Result<CoseSign1Parts, TokenError> {
    let decoded = cbor::decode_value(token_bytes)
        .map_err(|e| TokenError::Malformed(format!("COSE_Sign1: {}", e)))?;

    let items = match decoded {
        Value::Array(items) => items,
        _ => {
            return Err(TokenError::Malformed(
                "COSE_Sign1: expected an array".to_string(),
            ))
        }
    };
    if items.len() != COSE_SIGN1_ARITY {
        return Err(TokenError::Malformed(format!(
            "COSE_Sign1: expected {} elements, got {}",
            COSE_SIGN1_ARITY,
            items.len()
        )));
    }

    let mut items = items.into_iter();
    let protected_header_bytes = expect_bytes(items.next(), "protected header")?;
    let unprotected_header = match items.next() {
        Some(Value::Map(entries)) => entries,
        _ => {
            return Err(TokenError::Malformed(
                "COSE_Sign1: unprotected header must be a map".to_string(),
            ))
        }
    };
    let payload_bytes = expect_bytes(items.next(), "payload")?;
    let signature_bytes = expect_bytes(items.next(), "signature")?;

    Ok(CoseSign1Parts {
        protected_header_bytes,
        unprotected_header,
        payload_bytes,
        signature_bytes,
    })
}

fn expect_bytes(value: Option<Value>, field: &str) -> Result<Vec<u8>, TokenError> {
    match value {
        Some(Value::Bytes(bytes)) => Ok(bytes),
        _ => Err(TokenError::Malformed(format!(
            "COSE_Sign1: {} must be a byte string",
            field
        ))),
    }
}

/// Encode a compact JWS for transport.
///
/// The compact serialization is already URL-safe, so `Base64Url` carries it
/// unchanged; the other encodings wrap its UTF-8 bytes.
pub fn encode_compact(compact: &str, encoding: TransportEncoding) -> String {
    match encoding {
        TransportEncoding::Base64Url => compact.to_string(),
        other => encode_token(compact.as_bytes(), other),
    }
}

/// Recover the compact JWS from its transport string.
pub fn decode_compact(token: &str, encoding: TransportEncoding) -> Result<String, TokenError> {
    match encoding {
        TransportEncoding::Base64Url => Ok(token.to_string()),
        other => compact_from_bytes(decode_token(token, other)?),
    }
}

/// Interpret serialized JWS bytes as compact text.
pub fn compact_from_bytes(bytes: Vec<u8>) -> Result<String, TokenError> {
    String::from_utf8(bytes).map_err(|e| TokenError::Malformed(format!("JWS: {}", e)))
}

/// The three encoded segments of a compact JWS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactParts<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
}

/// Split a compact JWS into its segments.
pub fn parse_compact(compact: &str) -> Result<CompactParts<'_>, TokenError> {
    let parts: Vec<&str> = compact.split('.').collect();
    if parts.len() != JWS_SEGMENTS {
        return Err(TokenError::Malformed(format!(
            "JWS: expected {} segments, got {}",
            JWS_SEGMENTS,
            parts.len()
        )));
    }
    Ok(CompactParts {
        header: parts[0],
        payload: parts[1],
        signature: parts[2],
    })
}
