//! JWS compact tokens: `base64url(header).base64url(payload).base64url(signature)`.

use qrsig_crypto::{base64url_decode, base64url_encode, canonical_json, Algorithm, SigningKey, VerificationKey};
use serde_json::{json, Value};

use crate::error::TokenError;
use crate::payload::{inflate_raw, prepare, recover_text_payload};
use crate::signing_input::{assemble, jws_payload_text, jws_signing_input};
use crate::transport::{encode_compact, parse_compact};
use crate::types::{
    Compression, Payload, ProtectedHeader, SignedToken, TokenFormat, TokenOptions, Verification,
    JWS_TYP,
};

/// Serialize a protected header as key-sorted JSON.
pub fn encode_header(header: &ProtectedHeader) -> Result<Vec<u8>, TokenError> {
    let mut value = json!({
        "alg": header.alg().jose_name(),
        "typ": JWS_TYP,
    });
    if let (Some(zip), Some(object)) = (header.zip(), value.as_object_mut()) {
        object.insert("zip".to_string(), Value::from(zip.marker()));
    }
    Ok(canonical_json(&value)?.into_bytes())
}

/// Parse header JSON exactly as received. `typ` and unknown members are ignored.
pub fn decode_header(bytes: &[u8]) -> Result<ProtectedHeader, TokenError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| TokenError::Malformed(format!("JWS header: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| TokenError::Malformed("JWS header is not an object".to_string()))?;

    let alg = object
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| TokenError::Malformed("JWS header has no alg".to_string()))?;
    let alg = Algorithm::from_jose_name(alg).map_err(TokenError::from_algorithm_lookup)?;

    let zip = match object.get("zip") {
        None => None,
        Some(Value::String(marker)) => Some(Compression::from_marker(marker)?),
        Some(_) => return Err(TokenError::Malformed("zip is not a string".to_string())),
    };
    Ok(ProtectedHeader::new(alg, zip))
}

/// Build a compact JWS.
pub fn sign_jws(
    payload: &Payload,
    key: &SigningKey,
    options: &TokenOptions,
) -> Result<SignedToken, TokenError> {
    let prepared = prepare(payload, TokenFormat::Jws, options.compress)?;
    let header = ProtectedHeader::new(key.algorithm(), prepared.compression());
    let protected_header_bytes = encode_header(&header)?;

    let signing_input = assemble(
        TokenFormat::Jws,
        &protected_header_bytes,
        &jws_payload_text(&prepared),
        &options.external_aad,
    )?;
    let signature = qrsig_crypto::sign(key, &signing_input)?;

    let mut compact = String::from_utf8(signing_input)
        .map_err(|e| TokenError::Malformed(format!("JWS signing input: {}", e)))?;
    compact.push('.');
    compact.push_str(&base64url_encode(&signature));
    let token = encode_compact(&compact, options.encoding);

    tracing::debug!(
        alg = %header.alg(),
        compressed = header.is_compressed(),
        payload_bytes = prepared.bytes().len(),
        compact_chars = compact.len(),
        encoding = %options.encoding,
        "jws::sign"
    );

    Ok(SignedToken {
        token,
        token_bytes: compact.into_bytes(),
        header,
        protected_header_bytes,
        payload: prepared.into_bytes(),
        signature,
    })
}

/// Verify a compact JWS and recover the payload.
///
/// The signature is checked over the received segments; the payload segment
/// is only decoded after the signature has been accepted.
pub fn verify_jws_compact(compact: &str, key: &VerificationKey) -> Result<Verification, TokenError> {
    let parts = parse_compact(compact)?;
    let header_bytes = decode_segment(parts.header, "header")?;
    let header = decode_header(&header_bytes)?;

    if header.alg() != key.algorithm() {
        tracing::debug!(header_alg = %header.alg(), key_alg = %key.algorithm(), "jws::verify: algorithm mismatch");
        return Ok(Verification::Invalid {
            header: Some(header),
        });
    }

    let signature = decode_segment(parts.signature, "signature")?;
    let signing_input = jws_signing_input(parts.header, parts.payload);
    if !qrsig_crypto::verify(key, signing_input.as_bytes(), &signature) {
        tracing::debug!(alg = %header.alg(), "jws::verify: signature rejected");
        return Ok(Verification::Invalid {
            header: Some(header),
        });
    }

    let payload_text = decode_segment(parts.payload, "payload")?;
    let serialized = match header.zip() {
        Some(Compression::Deflate) => {
            let inner = String::from_utf8(payload_text)
                .map_err(|e| TokenError::Malformed(format!("JWS compressed payload: {}", e)))?;
            inflate_raw(&decode_segment(&inner, "compressed payload")?)?
        }
        None => payload_text,
    };

    Ok(Verification::Valid {
        header,
        payload: recover_text_payload(serialized),
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, TokenError> {
    base64url_decode(segment).map_err(|e| TokenError::Malformed(format!("JWS {}: {}", name, e)))
}
