//! Matching claim sets for the two token formats.
//!
//! JWS carries JWT-style named claims; COSE carries CWT-style integer-keyed
//! claims (RFC 8392) plus a private label for the probed data.

use ciborium::Value;
use qrsig_token::{Payload, TokenFormat};
use serde_json::json;
use uuid::Uuid;

pub const ISSUER: &str = "asphalesqr.com";
pub const SUBJECT: &str = "user:123";
pub const AUDIENCE: &str = "asphalesqr-web";
pub const ISSUED_AT: i64 = 1_739_616_000;
pub const EXPIRES_AT: i64 = 1_739_619_600;
pub const TOKEN_ID: Uuid = Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440000);

/// CWT claim keys.
pub const CWT_ISS: i64 = 1;
pub const CWT_SUB: i64 = 2;
pub const CWT_AUD: i64 = 3;
pub const CWT_EXP: i64 = 4;
pub const CWT_IAT: i64 = 6;
pub const CWT_CTI: i64 = 7;
/// Private-use label carrying the probed input.
pub const CWT_DATA: i64 = 1000;

/// The same claims, shaped for each format.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalentClaims {
    pub jws: serde_json::Value,
    pub cose: Value,
}

impl EquivalentClaims {
    /// The claim set for `format`, as a token payload.
    pub fn payload_for(&self, format: TokenFormat) -> Payload {
        match format {
            TokenFormat::Jws => Payload::Json(self.jws.clone()),
            TokenFormat::CoseSign1 => Payload::Cbor(self.cose.clone()),
        }
    }
}

/// Build both claim sets around `data`. The other claims are fixed.
pub fn equivalent_claims(data: &str) -> EquivalentClaims {
    let jws = json!({
        "iss": ISSUER,
        "sub": SUBJECT,
        "aud": AUDIENCE,
        "iat": ISSUED_AT,
        "exp": EXPIRES_AT,
        "jti": TOKEN_ID.to_string(),
        "data": data,
    });

    let cose = Value::Map(vec![
        (Value::Integer(CWT_ISS.into()), Value::Text(ISSUER.to_string())),
        (Value::Integer(CWT_SUB.into()), Value::Text(SUBJECT.to_string())),
        (Value::Integer(CWT_AUD.into()), Value::Text(AUDIENCE.to_string())),
        (Value::Integer(CWT_IAT.into()), Value::Integer(ISSUED_AT.into())),
        (Value::Integer(CWT_EXP.into()), Value::Integer(EXPIRES_AT.into())),
        (Value::Integer(CWT_CTI.into()), Value::Bytes(TOKEN_ID.as_bytes().to_vec())),
        (Value::Integer(CWT_DATA.into()), Value::Text(data.to_string())),
    ]);

    EquivalentClaims { jws, cose }
}
