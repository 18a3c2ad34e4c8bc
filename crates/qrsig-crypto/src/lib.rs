//! Signature and alphabet primitives for compact signed tokens.

pub mod base45;
pub mod base64url;
pub mod canonical;
pub mod error;
pub mod hmac;
pub mod signing;
pub mod types;

pub use base45::{base45_decode, base45_encode};
pub use base64url::{base64_decode, base64_encode, base64url_decode, base64url_encode};
pub use canonical::canonical_json;
pub use error::CryptoError;
pub use hmac::{constant_time_eq, hmac_sha256, verify_hmac_sha256, HmacKey};
pub use signing::{sign, verify, SigningKey, VerificationKey};
pub use types::{
    Algorithm, COSE_ALG_ES256, COSE_ALG_HMAC_256_256, HMAC_SHA256_TAG_LENGTH,
    P256_SIGNATURE_LENGTH,
};
