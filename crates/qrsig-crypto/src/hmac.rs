//! HMAC-SHA256 tags with constant-time verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::HMAC_SHA256_TAG_LENGTH;

type HmacSha256 = Hmac<Sha256>;

/// Symmetric HMAC secret. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HmacKey(Vec<u8>);

impl HmacKey {
    /// Create from raw secret bytes. Any length is accepted (RFC 2104).
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for HmacKey {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacKey(..)")
    }
}

/// Compute HMAC-SHA256 over `message`.
pub fn hmac_sha256(
    key: &HmacKey,
    message: &[u8],
) -> Result<[u8; HMAC_SHA256_TAG_LENGTH], CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::InvalidHmacKey(e.to_string()))?;
    mac.update(message);
    let mut output = [0u8; HMAC_SHA256_TAG_LENGTH];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

/// Verify an HMAC-SHA256 tag.
///
/// A tag of the wrong length is rejected before any MAC is computed or compared.
pub fn verify_hmac_sha256(key: &HmacKey, message: &[u8], tag: &[u8]) -> bool {
    if tag.len() != HMAC_SHA256_TAG_LENGTH {
        return false;
    }
    match hmac_sha256(key, message) {
        Ok(expected) => constant_time_eq(&expected, tag),
        Err(_) => false,
    }
}

/// Constant-time equality over equal-length buffers; unequal lengths are `false`.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
