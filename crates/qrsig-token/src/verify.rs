//! Verifier / decoder pipeline.
//!
//! transport decode → structure → header (as received) → signature → [inflate] → payload
//!
//! A signature that does not check out is a verdict (`Verification::Invalid`),
//! not an error. Errors are reserved for tokens that cannot be taken apart
//! and for unsupported options.

use qrsig_crypto::VerificationKey;

use crate::cose::verify_cose_bytes;
use crate::error::TokenError;
use crate::jws::verify_jws_compact;
use crate::transport::{compact_from_bytes, decode_compact, decode_token};
use crate::types::{TokenFormat, TokenOptions, Verification};

/// Verify a transport-encoded token.
///
/// `options.compress` is ignored; compression is read from the protected header.
pub fn verify(
    token: &str,
    key: &VerificationKey,
    options: &TokenOptions,
) -> Result<Verification, TokenError> {
    let verification = match options.format {
        TokenFormat::CoseSign1 => {
            let token_bytes = decode_token(token, options.encoding)?;
            verify_cose_bytes(&token_bytes, key, &options.external_aad)?
        }
        TokenFormat::Jws => {
            reject_jws_aad(options)?;
            let compact = decode_compact(token, options.encoding)?;
            verify_jws_compact(&compact, key)?
        }
    };
    tracing::debug!(
        format = %options.format,
        encoding = %options.encoding,
        token_chars = token.len(),
        valid = verification.is_valid(),
        "verify"
    );
    Ok(verification)
}

/// Verify serialized token bytes (CBOR, or compact JWS text) without a
/// transport step. `options.encoding` is ignored.
pub fn verify_bytes(
    token_bytes: &[u8],
    key: &VerificationKey,
    options: &TokenOptions,
) -> Result<Verification, TokenError> {
    match options.format {
        TokenFormat::CoseSign1 => verify_cose_bytes(token_bytes, key, &options.external_aad),
        TokenFormat::Jws => {
            reject_jws_aad(options)?;
            let compact = compact_from_bytes(token_bytes.to_vec())?;
            verify_jws_compact(&compact, key)
        }
    }
}

fn reject_jws_aad(options: &TokenOptions) -> Result<(), TokenError> {
    if options.external_aad.is_empty() {
        Ok(())
    } else {
        Err(TokenError::UnsupportedOption(
            "external AAD is not supported by JWS".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sign;
    use crate::types::{Payload, TransportEncoding};
    use qrsig_crypto::{HmacKey, SigningKey};

    fn key() -> SigningKey {
        SigningKey::from(HmacKey::from("verify-secret"))
    }

    #[test]
    fn transport_and_raw_bytes_agree() {
        let key = key();
        for format in [TokenFormat::CoseSign1, TokenFormat::Jws] {
            let options = TokenOptions::new(format, TransportEncoding::Base45, true);
            let signed = sign(&Payload::from("abc"), &key, &options).unwrap();
            let from_text = verify(&signed.token, &key.verification_key(), &options).unwrap();
            let from_bytes =
                verify_bytes(&signed.token_bytes, &key.verification_key(), &options).unwrap();
            assert!(from_text.is_valid());
            assert_eq!(from_text, from_bytes);
        }
    }

    #[test]
    fn wrong_encoding_is_structural() {
        let key = key();
        let signed = sign(
            &Payload::from("abc"),
            &key,
            &TokenOptions::new(TokenFormat::CoseSign1, TransportEncoding::Base64Url, false),
        )
        .unwrap();
        let options = TokenOptions::new(TokenFormat::CoseSign1, TransportEncoding::Base45, false);
        let err = verify(&signed.token, &key.verification_key(), &options).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn jws_rejects_aad_on_verify() {
        let mut options = TokenOptions::new(TokenFormat::Jws, TransportEncoding::Base64Url, false);
        options.external_aad = vec![1];
        assert!(matches!(
            verify("a.b.c", &key().verification_key(), &options),
            Err(TokenError::UnsupportedOption(_))
        ));
    }
}
