use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    /// The token does not have the shape of its format. Never a signature verdict.
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unsupported transport encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported token format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    #[error("CBOR decode error: {0}")]
    CborDecode(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] qrsig_crypto::CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TokenError {
    /// True for errors caused by the shape of the token rather than by options.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Lift an algorithm lookup failure into the token-level variant.
    pub(crate) fn from_algorithm_lookup(err: qrsig_crypto::CryptoError) -> Self {
        match err {
            qrsig_crypto::CryptoError::UnsupportedAlgorithm(name) => Self::UnsupportedAlgorithm(name),
            other => Self::Crypto(other),
        }
    }
}
