//! Token construction entry point, dispatched on the token format.

use qrsig_crypto::SigningKey;

use crate::cose::sign_cose;
use crate::error::TokenError;
use crate::jws::sign_jws;
use crate::types::{Payload, SignedToken, TokenFormat, TokenOptions};

/// Sign `payload` and encode the token for transport.
///
/// The algorithm is the one carried by `key`. Signing is deterministic: equal
/// inputs always produce byte-identical tokens.
pub fn sign(
    payload: &Payload,
    key: &SigningKey,
    options: &TokenOptions,
) -> Result<SignedToken, TokenError> {
    match options.format {
        TokenFormat::CoseSign1 => sign_cose(payload, key, options),
        TokenFormat::Jws => sign_jws(payload, key, options),
    }
}
