//! COSE_Sign1 tokens: `[protected bstr, {} , payload bstr, signature bstr]`.
//!
//! The protected header is the canonical CBOR map `{1: alg[, "zip": "DEF"]}`.

use ciborium::Value;
use qrsig_crypto::{Algorithm, SigningKey, VerificationKey};

use crate::cbor;
use crate::error::TokenError;
use crate::payload::{decompress, prepare, recover_cbor_payload};
use crate::signing_input::cose_sig_structure;
use crate::transport::{decode_structure, encode_structure, encode_token};
use crate::types::{
    Compression, Payload, ProtectedHeader, SignedToken, TokenFormat, TokenOptions, Verification,
    COSE_HEADER_ALG, COSE_HEADER_ZIP,
};

/// Serialize a protected header as a canonical CBOR map.
pub fn encode_protected_header(header: &ProtectedHeader) -> Result<Vec<u8>, TokenError> {
    let mut entries = vec![(
        Value::Integer(COSE_HEADER_ALG.into()),
        Value::Integer(header.alg().cose_id().into()),
    )];
    if let Some(zip) = header.zip() {
        entries.push((
            Value::Text(COSE_HEADER_ZIP.to_string()),
            Value::Text(zip.marker().to_string()),
        ));
    }
    cbor::encode_canonical(&Value::Map(entries))
}

/// Parse protected header bytes exactly as received.
///
/// Labels other than `alg` and `zip` are ignored.
pub fn decode_protected_header(bytes: &[u8]) -> Result<ProtectedHeader, TokenError> {
    let entries = match cbor::decode_value(bytes) {
        Ok(Value::Map(entries)) => entries,
        Ok(_) => {
            return Err(TokenError::Malformed(
                "protected header is not a map".to_string(),
            ))
        }
        Err(e) => return Err(TokenError::Malformed(format!("protected header: {}", e))),
    };

    let mut alg = None;
    let mut zip = None;
    for (label, value) in entries {
        match label {
            Value::Integer(label) if i128::from(label) == i128::from(COSE_HEADER_ALG) => {
                let id = value
                    .as_integer()
                    .and_then(|id| i64::try_from(id).ok())
                    .ok_or_else(|| TokenError::Malformed("alg is not an integer".to_string()))?;
                alg = Some(Algorithm::from_cose_id(id).map_err(TokenError::from_algorithm_lookup)?);
            }
            Value::Text(label) if label == COSE_HEADER_ZIP => {
                let marker = value
                    .as_text()
                    .ok_or_else(|| TokenError::Malformed("zip is not a string".to_string()))?;
                zip = Some(Compression::from_marker(marker)?);
            }
            _ => {}
        }
    }

    let alg = alg.ok_or_else(|| TokenError::Malformed("protected header has no alg".to_string()))?;
    Ok(ProtectedHeader::new(alg, zip))
}

/// Build a COSE_Sign1 token.
pub fn sign_cose(
    payload: &Payload,
    key: &SigningKey,
    options: &TokenOptions,
) -> Result<SignedToken, TokenError> {
    let prepared = prepare(payload, TokenFormat::CoseSign1, options.compress)?;
    let header = ProtectedHeader::new(key.algorithm(), prepared.compression());
    let protected_header_bytes = encode_protected_header(&header)?;

    let signing_input =
        cose_sig_structure(&protected_header_bytes, &options.external_aad, prepared.bytes())?;
    let signature = qrsig_crypto::sign(key, &signing_input)?;

    let token_bytes = encode_structure(&protected_header_bytes, prepared.bytes(), &signature)?;
    let token = encode_token(&token_bytes, options.encoding);

    tracing::debug!(
        alg = %header.alg(),
        compressed = header.is_compressed(),
        payload_bytes = prepared.bytes().len(),
        token_bytes = token_bytes.len(),
        encoding = %options.encoding,
        "cose::sign"
    );

    Ok(SignedToken {
        token,
        token_bytes,
        header,
        protected_header_bytes,
        payload: prepared.into_bytes(),
        signature,
    })
}

/// Verify serialized COSE_Sign1 bytes and recover the payload.
///
/// The signing input is rebuilt from the received header bytes. The payload
/// is only inflated and parsed after the signature has been accepted.
pub fn verify_cose_bytes(
    token_bytes: &[u8],
    key: &VerificationKey,
    external_aad: &[u8],
) -> Result<Verification, TokenError> {
    let parts = decode_structure(token_bytes)?;
    let header = decode_protected_header(&parts.protected_header_bytes)?;

    if header.alg() != key.algorithm() {
        tracing::debug!(header_alg = %header.alg(), key_alg = %key.algorithm(), "cose::verify: algorithm mismatch");
        return Ok(Verification::Invalid {
            header: Some(header),
        });
    }

    let signing_input =
        cose_sig_structure(&parts.protected_header_bytes, external_aad, &parts.payload_bytes)?;
    if !qrsig_crypto::verify(key, &signing_input, &parts.signature_bytes) {
        tracing::debug!(alg = %header.alg(), "cose::verify: signature rejected");
        return Ok(Verification::Invalid {
            header: Some(header),
        });
    }

    let serialized = decompress(&parts.payload_bytes, header.zip())?;
    Ok(Verification::Valid {
        header,
        payload: recover_cbor_payload(serialized),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrsig_crypto::HmacKey;

    fn hmac_key() -> SigningKey {
        SigningKey::from(HmacKey::from("cose-test-secret"))
    }

    #[test]
    fn header_bytes_are_canonical() {
        let plain = encode_protected_header(&ProtectedHeader::new(Algorithm::HmacSha256, None))
            .unwrap();
        assert_eq!(hex::encode(plain), "a10105");

        let es256 = encode_protected_header(&ProtectedHeader::new(
            Algorithm::EcdsaP256Sha256,
            Some(Compression::Deflate),
        ))
        .unwrap();
        // {1: -7, "zip": "DEF"}
        assert_eq!(hex::encode(es256), "a20126637a697063444546");
    }

    #[test]
    fn header_round_trip() {
        let header = ProtectedHeader::new(Algorithm::EcdsaP256Sha256, Some(Compression::Deflate));
        let bytes = encode_protected_header(&header).unwrap();
        assert_eq!(decode_protected_header(&bytes).unwrap(), header);
    }

    #[test]
    fn header_without_alg_is_malformed() {
        // {"zip": "DEF"}
        let bytes = hex::decode("a1637a697063444546").unwrap();
        assert!(decode_protected_header(&bytes).unwrap_err().is_structural());
    }

    #[test]
    fn header_with_trailing_bytes_is_malformed() {
        // {1: 5} followed by 0x00
        let bytes = hex::decode("a1010500").unwrap();
        assert!(decode_protected_header(&bytes).unwrap_err().is_structural());
    }

    #[test]
    fn unknown_alg_is_unsupported() {
        // {1: -35} (ES384)
        let bytes = hex::decode("a1013822").unwrap();
        assert!(matches!(
            decode_protected_header(&bytes),
            Err(TokenError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn sign_then_verify() {
        let key = hmac_key();
        let options = TokenOptions::default();
        let signed = sign_cose(&Payload::from("hello"), &key, &options).unwrap();
        let verification =
            verify_cose_bytes(&signed.token_bytes, &key.verification_key(), b"").unwrap();
        assert_eq!(verification.payload(), Some(&Payload::from("hello")));
    }

    #[test]
    fn external_aad_must_match() {
        let key = hmac_key();
        let mut options = TokenOptions::default();
        options.external_aad = b"context".to_vec();
        let signed = sign_cose(&Payload::from("hello"), &key, &options).unwrap();

        let verifier = key.verification_key();
        assert!(verify_cose_bytes(&signed.token_bytes, &verifier, b"context")
            .unwrap()
            .is_valid());
        assert!(!verify_cose_bytes(&signed.token_bytes, &verifier, b"")
            .unwrap()
            .is_valid());
    }

    #[test]
    fn algorithm_mismatch_is_invalid() {
        let hmac = hmac_key();
        let ec = SigningKey::ecdsa_p256_from_bytes(&[3u8; 32]).unwrap();
        let signed = sign_cose(&Payload::from("x"), &hmac, &TokenOptions::default()).unwrap();
        let verification = verify_cose_bytes(&signed.token_bytes, &ec.verification_key(), b"")
            .unwrap();
        assert!(!verification.is_valid());
        assert_eq!(
            verification.header().map(|h| h.alg()),
            Some(Algorithm::HmacSha256)
        );
    }
}
