//! Size measurements of a constructed token.

use qrsig_crypto::{base45_encode, base64_encode};
use serde::Serialize;

use crate::types::SignedToken;

/// Sizes of a token's parts and of its raw bytes under each transport alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenMetrics {
    pub header_size_bytes: usize,
    pub payload_size_bytes: usize,
    pub signature_size_bytes: usize,
    /// Length of the transport string actually produced.
    pub transport_size_bytes: usize,
    pub raw_size_bytes: usize,
    pub base64_size_bytes: usize,
    pub base45_size_bytes: usize,
}

impl TokenMetrics {
    pub fn of(token: &SignedToken) -> Self {
        Self {
            header_size_bytes: token.protected_header_bytes.len(),
            payload_size_bytes: token.payload.len(),
            signature_size_bytes: token.signature.len(),
            transport_size_bytes: token.token.len(),
            raw_size_bytes: token.token_bytes.len(),
            base64_size_bytes: base64_encode(&token.token_bytes).len(),
            base45_size_bytes: base45_encode(&token.token_bytes).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sign;
    use crate::types::{Payload, TokenFormat, TokenOptions, TransportEncoding};
    use qrsig_crypto::{HmacKey, SigningKey};

    #[test]
    fn sizes_follow_alphabet_expansion() {
        let key = SigningKey::from(HmacKey::from("metrics"));
        let options = TokenOptions::new(TokenFormat::CoseSign1, TransportEncoding::Base45, false);
        let signed = sign(&Payload::from("a".repeat(40)), &key, &options).unwrap();
        let metrics = TokenMetrics::of(&signed);

        assert_eq!(metrics.signature_size_bytes, 32);
        assert_eq!(metrics.header_size_bytes, 3);
        assert_eq!(metrics.transport_size_bytes, metrics.base45_size_bytes);
        // base64 pads to 4 chars per 3 bytes; base45 spends 3 chars per 2 bytes
        assert_eq!(metrics.base64_size_bytes, metrics.raw_size_bytes.div_ceil(3) * 4);
        let n = metrics.raw_size_bytes;
        assert_eq!(metrics.base45_size_bytes, n / 2 * 3 + (n % 2) * 2);
    }

    #[test]
    fn serializes_as_plain_record() {
        let key = SigningKey::from(HmacKey::from("metrics"));
        let options = TokenOptions::new(TokenFormat::Jws, TransportEncoding::Base64Url, true);
        let signed = sign(&Payload::from("x"), &key, &options).unwrap();
        let record = serde_json::to_value(TokenMetrics::of(&signed)).unwrap();
        assert_eq!(
            record["transport_size_bytes"].as_u64(),
            Some(signed.token.len() as u64)
        );
    }
}
