//! Signing-input assembly: the exact bytes a signature covers.
//!
//! COSE: CBOR `["Signature1", protected, external_aad, payload]` (RFC 9052 §4.4)
//! JWS:  `base64url(header) "." base64url(payload_text)`
//!
//! Pure byte assembly, no knowledge of algorithms or keys.

use qrsig_crypto::base64url_encode;
use serde_bytes::Bytes;

use crate::cbor;
use crate::error::TokenError;
use crate::payload::PreparedPayload;
use crate::types::TokenFormat;

/// Context string of a COSE_Sign1 signature structure.
pub const SIGNATURE1_CONTEXT: &str = "Signature1";

/// Build the COSE `Sig_structure` for a single-signer token.
///
/// The external AAD is always encoded, as a zero-length byte string when empty.
pub fn cose_sig_structure(
    protected_header_bytes: &[u8],
    external_aad: &[u8],
    payload_bytes: &[u8],
) -> Result<Vec<u8>, TokenError> {
    cbor::encode(&(
        SIGNATURE1_CONTEXT,
        Bytes::new(protected_header_bytes),
        Bytes::new(external_aad),
        Bytes::new(payload_bytes),
    ))
}

/// Join already-encoded JWS segments into the signing input.
pub fn jws_signing_input(encoded_header: &str, encoded_payload: &str) -> String {
    format!("{}.{}", encoded_header, encoded_payload)
}

/// The payload text a JWS signs.
///
/// Uncompressed payloads are signed as-is. Compressed payloads are signed as
/// the base64url text of the raw deflate bytes, so their payload segment ends
/// up base64url-encoded twice. Kept for wire compatibility with existing
/// tokens; new algorithms should not copy this shape.
pub fn jws_payload_text(prepared: &PreparedPayload) -> Vec<u8> {
    if prepared.is_compressed() {
        base64url_encode(prepared.bytes()).into_bytes()
    } else {
        prepared.bytes().to_vec()
    }
}

/// Assemble the signing input for either format.
///
/// For JWS, `protected_header_bytes` is the header JSON and `payload_bytes`
/// is the payload text (see [`jws_payload_text`]). A JWS has no place for
/// external AAD, so a non-empty one is rejected.
pub fn assemble(
    format: TokenFormat,
    protected_header_bytes: &[u8],
    payload_bytes: &[u8],
    external_aad: &[u8],
) -> Result<Vec<u8>, TokenError> {
    match format {
        TokenFormat::CoseSign1 => {
            cose_sig_structure(protected_header_bytes, external_aad, payload_bytes)
        }
        TokenFormat::Jws => {
            if !external_aad.is_empty() {
                return Err(TokenError::UnsupportedOption(
                    "external AAD is not supported by JWS".to_string(),
                ));
            }
            Ok(jws_signing_input(
                &base64url_encode(protected_header_bytes),
                &base64url_encode(payload_bytes),
            )
            .into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::prepare;
    use crate::types::Payload;

    #[test]
    fn sig_structure_layout() {
        let encoded = cose_sig_structure(&[0xa1, 0x01, 0x05], &[], &[0x41, 0x00]).unwrap();
        let expected = [
            "84",                     // array(4)
            "6a5369676e617475726531", // "Signature1"
            "43a10105",               // bstr protected header
            "40",                     // empty external AAD
            "424100",                 // bstr payload
        ]
        .concat();
        assert_eq!(hex::encode(encoded), expected);
    }

    #[test]
    fn external_aad_changes_sig_structure() {
        let without = cose_sig_structure(b"h", b"", b"p").unwrap();
        let with = cose_sig_structure(b"h", b"aad", b"p").unwrap();
        assert_ne!(without, with);
    }

    #[test]
    fn jws_input_is_dot_joined_base64url() {
        let input = assemble(TokenFormat::Jws, br#"{"alg":"HS256"}"#, b"hi", b"").unwrap();
        assert_eq!(input, b"eyJhbGciOiJIUzI1NiJ9.aGk");
    }

    #[test]
    fn jws_rejects_external_aad() {
        assert!(assemble(TokenFormat::Jws, b"{}", b"", b"aad").is_err());
    }

    #[test]
    fn compressed_jws_payload_text_is_base64url_of_deflate() {
        let prepared = prepare(&Payload::from("A".repeat(64)), TokenFormat::Jws, true).unwrap();
        let text = jws_payload_text(&prepared);
        assert_eq!(text, base64url_encode(prepared.bytes()).into_bytes());

        let plain = prepare(&Payload::from("abc"), TokenFormat::Jws, false).unwrap();
        assert_eq!(jws_payload_text(&plain), b"abc");
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assemble(TokenFormat::CoseSign1, b"h", b"p", b"").unwrap();
        let b = assemble(TokenFormat::CoseSign1, b"h", b"p", b"").unwrap();
        assert_eq!(a, b);
    }
}
