//! Dual-format signed tokens: COSE_Sign1 and JWS compact serialization,
//! with optional raw-DEFLATE payload compression and base64url/base64/base45
//! transport.

pub mod cbor;
pub mod codec;
pub mod cose;
pub mod error;
pub mod jws;
pub mod metrics;
pub mod payload;
pub mod signing_input;
pub mod transport;
pub mod types;
pub mod verify;

pub use codec::sign;
pub use error::TokenError;
pub use metrics::TokenMetrics;
pub use payload::{prepare, recover_cbor_payload, recover_text_payload, PreparedPayload};
pub use signing_input::assemble;
pub use transport::{decode_structure, decode_token, encode_token, parse_compact, CoseSign1Parts};
pub use types::{
    Compression, Payload, ProtectedHeader, SignedToken, TokenFormat, TokenOptions,
    TransportEncoding, Verification,
};
pub use verify::{verify, verify_bytes};

pub use qrsig_crypto::{Algorithm, HmacKey, SigningKey, VerificationKey};
