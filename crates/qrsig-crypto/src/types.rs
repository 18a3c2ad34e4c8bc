use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// HMAC-SHA256 tag length in bytes.
pub const HMAC_SHA256_TAG_LENGTH: usize = 32;

/// ECDSA P-256 signature length in bytes (IEEE P1363, r||s).
pub const P256_SIGNATURE_LENGTH: usize = 64;

/// COSE algorithm identifier for HMAC 256/256 (RFC 9053 §3.1).
pub const COSE_ALG_HMAC_256_256: i64 = 5;

/// COSE algorithm identifier for ES256 (RFC 9053 §2.1).
pub const COSE_ALG_ES256: i64 = -7;

/// Signature algorithms a token may be signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC with SHA-256, symmetric secret.
    #[serde(rename = "HS256")]
    HmacSha256,
    /// ECDSA over P-256 with SHA-256, fixed-length r||s signatures.
    #[serde(rename = "ES256")]
    EcdsaP256Sha256,
}

impl Algorithm {
    /// JOSE `alg` header value.
    pub fn jose_name(&self) -> &'static str {
        match self {
            Self::HmacSha256 => "HS256",
            Self::EcdsaP256Sha256 => "ES256",
        }
    }

    /// COSE `alg` (label 1) header value.
    pub fn cose_id(&self) -> i64 {
        match self {
            Self::HmacSha256 => COSE_ALG_HMAC_256_256,
            Self::EcdsaP256Sha256 => COSE_ALG_ES256,
        }
    }

    pub fn from_jose_name(name: &str) -> Result<Self, CryptoError> {
        match name {
            "HS256" => Ok(Self::HmacSha256),
            "ES256" => Ok(Self::EcdsaP256Sha256),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn from_cose_id(id: i64) -> Result<Self, CryptoError> {
        match id {
            COSE_ALG_HMAC_256_256 => Ok(Self::HmacSha256),
            COSE_ALG_ES256 => Ok(Self::EcdsaP256Sha256),
            other => Err(CryptoError::UnsupportedAlgorithm(format!(
                "COSE algorithm {}",
                other
            ))),
        }
    }

    /// Length of a signature produced under this algorithm.
    pub fn signature_length(&self) -> usize {
        match self {
            Self::HmacSha256 => HMAC_SHA256_TAG_LENGTH,
            Self::EcdsaP256Sha256 => P256_SIGNATURE_LENGTH,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jose_name())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HMAC-SHA256" => Ok(Self::HmacSha256),
            "ECDSA-P256-SHA256" => Ok(Self::EcdsaP256Sha256),
            other => Self::from_jose_name(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_identifiers() {
        assert_eq!(Algorithm::HmacSha256.jose_name(), "HS256");
        assert_eq!(Algorithm::EcdsaP256Sha256.jose_name(), "ES256");
        assert_eq!(Algorithm::HmacSha256.cose_id(), 5);
        assert_eq!(Algorithm::EcdsaP256Sha256.cose_id(), -7);
    }

    #[test]
    fn parses_long_and_jose_names() {
        assert_eq!(
            "HMAC-SHA256".parse::<Algorithm>().unwrap(),
            Algorithm::HmacSha256
        );
        assert_eq!(
            "ES256".parse::<Algorithm>().unwrap(),
            Algorithm::EcdsaP256Sha256
        );
    }

    #[test]
    fn rejects_unknown_algorithms() {
        assert!("RS256".parse::<Algorithm>().is_err());
        assert!(Algorithm::from_cose_id(-8).is_err());
        let err = Algorithm::from_jose_name("none").unwrap_err();
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn serde_uses_jose_names() {
        let json = serde_json::to_string(&Algorithm::EcdsaP256Sha256).unwrap();
        assert_eq!(json, "\"ES256\"");
        let back: Algorithm = serde_json::from_str("\"HS256\"").unwrap();
        assert_eq!(back, Algorithm::HmacSha256);
    }
}
