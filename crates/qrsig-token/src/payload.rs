//! Payload serialization, raw-DEFLATE compression, and payload recovery.
//!
//! Prepare: Payload → format serializer → [deflate]
//! Recover: [inflate] → structured parse → text → bytes

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use qrsig_crypto::canonical_json;

use crate::cbor;
use crate::error::TokenError;
use crate::types::{Compression, Payload, TokenFormat};

/// Serialized payload bytes and the compression that was applied to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPayload {
    bytes: Vec<u8>,
    compression: Option<Compression>,
}

impl PreparedPayload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn compression(&self) -> Option<Compression> {
        self.compression
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.is_some()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Serialize a payload with the format's native serializer.
///
/// JWS: bytes pass through, text is UTF-8, JSON is canonical (key-sorted).
/// COSE: everything is canonical CBOR (bytes → byte string, text → text string).
pub fn serialize_payload(payload: &Payload, format: TokenFormat) -> Result<Vec<u8>, TokenError> {
    match format {
        TokenFormat::Jws => match payload {
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Text(text) => Ok(text.as_bytes().to_vec()),
            Payload::Json(value) => Ok(canonical_json(value)?.into_bytes()),
            Payload::Cbor(_) => Err(TokenError::UnsupportedOption(
                "a CBOR payload cannot be carried in a JWS".to_string(),
            )),
        },
        TokenFormat::CoseSign1 => match payload {
            Payload::Bytes(bytes) => cbor::encode(serde_bytes::Bytes::new(bytes)),
            Payload::Text(text) => cbor::encode(text),
            Payload::Json(value) => cbor::encode_canonical(&cbor::json_to_cbor(value)?),
            Payload::Cbor(value) => cbor::encode_canonical(value),
        },
    }
}

/// Serialize and optionally compress a payload.
pub fn prepare(
    payload: &Payload,
    format: TokenFormat,
    compress: bool,
) -> Result<PreparedPayload, TokenError> {
    let serialized = serialize_payload(payload, format)?;
    if compress {
        Ok(PreparedPayload {
            bytes: deflate_raw(&serialized)?,
            compression: Some(Compression::Deflate),
        })
    } else {
        Ok(PreparedPayload {
            bytes: serialized,
            compression: None,
        })
    }
}

/// Raw DEFLATE (no zlib/gzip framing) at the default level.
pub fn deflate_raw(data: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| TokenError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| TokenError::Compression(e.to_string()))
}

/// Inflate a raw DEFLATE stream.
pub fn inflate_raw(data: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| TokenError::Compression(e.to_string()))?;
    Ok(out)
}

/// Undo the compression named by the header, if any.
pub fn decompress(data: &[u8], compression: Option<Compression>) -> Result<Vec<u8>, TokenError> {
    match compression {
        Some(Compression::Deflate) => inflate_raw(data),
        None => Ok(data.to_vec()),
    }
}

/// Recover a textual-format payload: JSON, else UTF-8 text, else bytes.
pub fn recover_text_payload(bytes: Vec<u8>) -> Payload {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
        return Payload::Json(value);
    }
    match String::from_utf8(bytes) {
        Ok(text) => Payload::Text(text),
        Err(e) => Payload::Bytes(e.into_bytes()),
    }
}

/// Recover a binary-format payload.
///
/// A decoded byte string goes through the textual recovery chain; a text
/// string is returned as text; any other CBOR value is returned as is.
/// Bytes that are not CBOR at all fall back to the textual chain.
pub fn recover_cbor_payload(bytes: Vec<u8>) -> Payload {
    match cbor::decode_value(&bytes) {
        Ok(ciborium::Value::Bytes(inner)) => recover_text_payload(inner),
        Ok(ciborium::Value::Text(text)) => Payload::Text(text),
        Ok(value) => Payload::Cbor(value),
        Err(_) => recover_text_payload(bytes),
    }
}
