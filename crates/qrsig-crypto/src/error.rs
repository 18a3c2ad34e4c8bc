use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid HMAC key: {0}")]
    InvalidHmacKey(String),

    #[error("Invalid P-256 key: {0}")]
    InvalidEcKey(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Base64url decode error: {0}")]
    Base64UrlDecode(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("Base45 decode error: {0}")]
    Base45Decode(String),

    #[error("canonicalJSON: non-finite number is not representable in JSON")]
    NonFiniteNumber,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
