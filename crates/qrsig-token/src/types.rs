use std::fmt;
use std::str::FromStr;

use qrsig_crypto::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Header marker value for raw-DEFLATE payloads (`"zip": "DEF"`).
pub const ZIP_DEFLATE: &str = "DEF";

/// JOSE `typ` emitted in every JWS header.
pub const JWS_TYP: &str = "JWT";

/// COSE header label for the algorithm.
pub const COSE_HEADER_ALG: i64 = 1;

/// COSE header label for the compression marker.
pub const COSE_HEADER_ZIP: &str = "zip";

/// Token serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenFormat {
    /// Binary CBOR structure (COSE_Sign1).
    #[default]
    #[serde(rename = "cose1")]
    CoseSign1,
    /// Textual JWS compact serialization.
    #[serde(rename = "jws")]
    Jws,
}

impl TokenFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoseSign1 => "cose1",
            Self::Jws => "jws",
        }
    }
}

impl fmt::Display for TokenFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenFormat {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cose1" | "cose" => Ok(Self::CoseSign1),
            "jws" => Ok(Self::Jws),
            other => Err(TokenError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Character set a token is carried in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportEncoding {
    /// URL-safe base64 without padding.
    #[default]
    #[serde(rename = "base64url")]
    Base64Url,
    /// Standard base64 with padding.
    #[serde(rename = "base64")]
    Base64,
    /// RFC 9285 base45.
    #[serde(rename = "base45")]
    Base45,
}

impl TransportEncoding {
    pub const ALL: [TransportEncoding; 3] = [Self::Base64Url, Self::Base64, Self::Base45];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64Url => "base64url",
            Self::Base64 => "base64",
            Self::Base45 => "base45",
        }
    }
}

impl fmt::Display for TransportEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportEncoding {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64url" => Ok(Self::Base64Url),
            "base64" => Ok(Self::Base64),
            "base45" => Ok(Self::Base45),
            other => Err(TokenError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Payload compression named by the protected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compression {
    /// Raw DEFLATE (RFC 1951), no zlib or gzip framing.
    #[serde(rename = "DEF")]
    Deflate,
}

impl Compression {
    pub fn from_marker(marker: &str) -> Result<Self, TokenError> {
        match marker {
            ZIP_DEFLATE => Ok(Self::Deflate),
            other => Err(TokenError::UnsupportedOption(format!(
                "zip marker {:?}",
                other
            ))),
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Self::Deflate => ZIP_DEFLATE,
        }
    }
}

/// Metadata covered by the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectedHeader {
    alg: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<Compression>,
}

impl ProtectedHeader {
    pub fn new(alg: Algorithm, zip: Option<Compression>) -> Self {
        Self { alg, zip }
    }

    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    pub fn zip(&self) -> Option<Compression> {
        self.zip
    }

    pub fn is_compressed(&self) -> bool {
        self.zip.is_some()
    }
}

/// A value carried by a token, or recovered from one.
///
/// Recovery is a two-step strategy: a structured parse is attempted first,
/// then the bytes are returned as text, then as opaque bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
    Json(serde_json::Value),
    Cbor(ciborium::Value),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_cbor(&self) -> Option<&ciborium::Value> {
        match self {
            Self::Cbor(v) => Some(v),
            _ => None,
        }
    }

    /// JSON view of a structured payload.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Json(v) => Some(v.clone()),
            Self::Cbor(v) => v.deserialized().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ciborium::Value> for Payload {
    fn from(value: ciborium::Value) -> Self {
        Self::Cbor(value)
    }
}

/// Outcome of checking a token's signature.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid {
        header: ProtectedHeader,
        payload: Payload,
    },
    /// The signature did not verify; the payload was never decoded.
    Invalid { header: Option<ProtectedHeader> },
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn header(&self) -> Option<&ProtectedHeader> {
        match self {
            Self::Valid { header, .. } => Some(header),
            Self::Invalid { header } => header.as_ref(),
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Valid { payload, .. } => Some(payload),
            Self::Invalid { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Self::Valid { payload, .. } => Some(payload),
            Self::Invalid { .. } => None,
        }
    }
}

/// Options for producing and checking tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenOptions {
    pub format: TokenFormat,
    pub encoding: TransportEncoding,
    pub compress: bool,
    /// External associated data bound into COSE signatures. Empty by default.
    #[serde(with = "serde_bytes")]
    pub external_aad: Vec<u8>,
}

impl TokenOptions {
    pub fn new(format: TokenFormat, encoding: TransportEncoding, compress: bool) -> Self {
        Self {
            format,
            encoding,
            compress,
            external_aad: Vec::new(),
        }
    }
}

/// A constructed token with its component parts, as produced by the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    /// Transport string.
    pub token: String,
    /// Serialized token before transport encoding (CBOR bytes, or compact JWS text).
    pub token_bytes: Vec<u8>,
    pub header: ProtectedHeader,
    pub protected_header_bytes: Vec<u8>,
    /// Prepared (serialized, optionally compressed) payload bytes.
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodings_parse_from_names() {
        for encoding in TransportEncoding::ALL {
            assert_eq!(
                encoding.as_str().parse::<TransportEncoding>().unwrap(),
                encoding
            );
        }
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = "base32".parse::<TransportEncoding>().unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedEncoding(_)));
        assert!(!err.is_structural());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(matches!(
            "cwt".parse::<TokenFormat>(),
            Err(TokenError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn zip_marker() {
        assert_eq!(Compression::from_marker("DEF").unwrap(), Compression::Deflate);
        assert!(Compression::from_marker("GZIP").is_err());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: TokenOptions =
            serde_json::from_str(r#"{"format":"jws","compress":true}"#).unwrap();
        assert_eq!(options.format, TokenFormat::Jws);
        assert_eq!(options.encoding, TransportEncoding::Base64Url);
        assert!(options.compress);
        assert!(options.external_aad.is_empty());
    }

    #[test]
    fn cbor_payload_has_json_view() {
        let value = ciborium::Value::Map(vec![(
            ciborium::Value::Text("sub".into()),
            ciborium::Value::Integer(7.into()),
        )]);
        assert_eq!(
            Payload::Cbor(value).to_json(),
            Some(serde_json::json!({"sub": 7}))
        );
        assert_eq!(Payload::from("text").to_json(), None);
    }

    #[test]
    fn invalid_verification_has_no_payload() {
        let verification = Verification::Invalid { header: None };
        assert!(!verification.is_valid());
        assert!(verification.payload().is_none());
    }
}
