use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapacityError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus too small: need {need} chars, have {have}")]
    CorpusTooSmall { need: usize, have: usize },

    #[error("Corpus contains characters outside the base64url alphabet")]
    CorpusAlphabet,

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    #[error("Token error: {0}")]
    Token(#[from] qrsig_token::TokenError),
}
