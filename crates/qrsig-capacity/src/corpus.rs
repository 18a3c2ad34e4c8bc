//! Payload corpus: random base64url-alphabet text the prober slices inputs from.
//!
//! The text is built from fixed-size random chunks; with probability `reuse`
//! an earlier chunk is repeated instead, so the corpus compresses roughly like
//! real-world data rather than like pure noise.

use qrsig_crypto::base64url_encode;
use regex::Regex;

use crate::error::CapacityError;
use crate::types::CorpusOptions;

const BASE64URL_TEXT: &str = "^[A-Za-z0-9_-]*$";

/// An owned corpus of base64url-alphabet characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCorpus {
    text: String,
}

impl PayloadCorpus {
    /// Generate `size_chars` characters of corpus text.
    pub fn generate(size_chars: usize, options: &CorpusOptions) -> Result<Self, CapacityError> {
        options.validate()?;

        let mut chunks: Vec<String> = Vec::new();
        let mut text = String::with_capacity(size_chars + options.chunk_chars);
        let mut reused = 0usize;

        while text.len() < size_chars {
            if !chunks.is_empty() && random_unit()? < options.reuse {
                let index = random_index(chunks.len())?;
                text.push_str(&chunks[index]);
                reused += 1;
            } else {
                let chunk = random_chunk(options.chunk_chars)?;
                text.push_str(&chunk);
                chunks.push(chunk);
            }
        }
        text.truncate(size_chars);

        tracing::debug!(
            size_chars,
            fresh_chunks = chunks.len(),
            reused_chunks = reused,
            "corpus::generate"
        );
        Ok(Self { text })
    }

    /// Wrap existing text, rejecting characters outside the base64url alphabet.
    pub fn from_text(text: impl Into<String>) -> Result<Self, CapacityError> {
        let text = text.into();
        let alphabet =
            Regex::new(BASE64URL_TEXT).map_err(|e| CapacityError::InvalidConfig(e.to_string()))?;
        if !alphabet.is_match(&text) {
            return Err(CapacityError::CorpusAlphabet);
        }
        Ok(Self { text })
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `len` characters starting at `start`.
    pub fn slice(&self, start: usize, len: usize) -> Result<&str, CapacityError> {
        let end = start.checked_add(len).ok_or_else(|| {
            CapacityError::InvalidConfig(format!("slice {}+{} overflows", start, len))
        })?;
        self.text
            .get(start..end)
            .ok_or(CapacityError::CorpusTooSmall {
                need: end,
                have: self.text.len(),
            })
    }

    /// Input generator for the prober: the first `size` characters.
    pub fn sized_input(&self, size: usize) -> Result<String, CapacityError> {
        self.slice(0, size).map(str::to_string)
    }
}

fn random_bytes(buf: &mut [u8]) -> Result<(), CapacityError> {
    getrandom::getrandom(buf).map_err(|e| CapacityError::RngFailed(e.to_string()))
}

/// Uniform float in `[0, 1)`.
fn random_unit() -> Result<f64, CapacityError> {
    let mut bytes = [0u8; 4];
    random_bytes(&mut bytes)?;
    Ok(f64::from(u32::from_be_bytes(bytes)) / 4_294_967_296.0)
}

fn random_index(len: usize) -> Result<usize, CapacityError> {
    let index = (random_unit()? * len as f64) as usize;
    Ok(index.min(len.saturating_sub(1)))
}

fn random_chunk(chunk_chars: usize) -> Result<String, CapacityError> {
    let mut bytes = vec![0u8; (chunk_chars * 3).div_ceil(4)];
    random_bytes(&mut bytes)?;
    let mut chunk = base64url_encode(&bytes);
    chunk.truncate(chunk_chars);
    Ok(chunk)
}
