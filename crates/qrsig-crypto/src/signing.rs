//! Signature engine: HMAC-SHA256 and ECDSA P-256 + SHA-256.
//!
//! ECDSA signatures are IEEE P1363 format (raw r||s, 64 bytes), never DER.
//! Nonces are derived per RFC 6979, so signing is deterministic.

use ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::Signature;

use crate::error::CryptoError;
use crate::hmac::{hmac_sha256, verify_hmac_sha256, HmacKey};
use crate::types::Algorithm;

/// Key material used to produce signatures.
#[derive(Debug, Clone)]
pub enum SigningKey {
    Hmac(HmacKey),
    EcdsaP256(p256::ecdsa::SigningKey),
}

/// Key material used to check signatures.
#[derive(Debug, Clone)]
pub enum VerificationKey {
    Hmac(HmacKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
}

impl SigningKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Hmac(_) => Algorithm::HmacSha256,
            Self::EcdsaP256(_) => Algorithm::EcdsaP256Sha256,
        }
    }

    /// The key a verifier needs for signatures made with this key.
    pub fn verification_key(&self) -> VerificationKey {
        match self {
            Self::Hmac(key) => VerificationKey::Hmac(key.clone()),
            Self::EcdsaP256(key) => VerificationKey::EcdsaP256(key.verifying_key().clone()),
        }
    }

    /// Import a P-256 private scalar (32 bytes, big-endian).
    pub fn ecdsa_p256_from_bytes(scalar: &[u8]) -> Result<Self, CryptoError> {
        if scalar.len() != 32 {
            return Err(CryptoError::InvalidEcKey(format!(
                "expected 32-byte scalar, got {}",
                scalar.len()
            )));
        }
        p256::ecdsa::SigningKey::from_bytes(scalar.into())
            .map(Self::EcdsaP256)
            .map_err(|e| CryptoError::InvalidEcKey(e.to_string()))
    }
}

impl VerificationKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Hmac(_) => Algorithm::HmacSha256,
            Self::EcdsaP256(_) => Algorithm::EcdsaP256Sha256,
        }
    }

    /// Import a P-256 public key from SEC1 bytes (compressed or uncompressed).
    pub fn ecdsa_p256_from_sec1(bytes: &[u8]) -> Result<Self, CryptoError> {
        p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(Self::EcdsaP256)
            .map_err(|e| CryptoError::InvalidEcKey(format!("P-256 point: {}", e)))
    }
}

impl From<HmacKey> for SigningKey {
    fn from(key: HmacKey) -> Self {
        Self::Hmac(key)
    }
}

impl From<p256::ecdsa::SigningKey> for SigningKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::EcdsaP256(key)
    }
}

impl From<HmacKey> for VerificationKey {
    fn from(key: HmacKey) -> Self {
        Self::Hmac(key)
    }
}

impl From<p256::ecdsa::VerifyingKey> for VerificationKey {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        Self::EcdsaP256(key)
    }
}

/// Sign `message` under the key's algorithm.
///
/// # Returns
/// 32-byte HMAC tag, or 64-byte IEEE P1363 signature (r||s)
pub fn sign(key: &SigningKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    match key {
        SigningKey::Hmac(secret) => Ok(hmac_sha256(secret, message)?.to_vec()),
        SigningKey::EcdsaP256(private_key) => {
            let signature: Signature = private_key
                .try_sign(message)
                .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
            Ok(signature.to_bytes().to_vec())
        }
    }
}

/// Verify a signature under the key's algorithm.
///
/// # Returns
/// true if valid, false otherwise (never errors on invalid or malformed signature)
pub fn verify(key: &VerificationKey, message: &[u8], signature_bytes: &[u8]) -> bool {
    match key {
        VerificationKey::Hmac(secret) => verify_hmac_sha256(secret, message, signature_bytes),
        VerificationKey::EcdsaP256(public_key) => Signature::from_slice(signature_bytes)
            .map(|signature| public_key.verify(message, &signature).is_ok())
            .unwrap_or(false),
    }
}
