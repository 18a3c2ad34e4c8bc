//! Named token profiles and the capacity sweep across them.

use std::io::Write;

use flate2::write::ZlibEncoder;
use qrsig_token::{encode_token, sign, SigningKey, TokenFormat, TokenOptions, TransportEncoding};
use serde::{Deserialize, Serialize};

use crate::claims::equivalent_claims;
use crate::corpus::PayloadCorpus;
use crate::error::CapacityError;
use crate::prober::{find_max_capacity, CapacityResult};
use crate::symbol::{FeasibilityOracle, SymbolBudget};
use crate::types::ProbeConfig;

/// A way of turning claims into a token string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenProfile {
    pub name: String,
    pub format: TokenFormat,
    pub encoding: TransportEncoding,
    /// Compress the payload and mark it in the protected header.
    #[serde(default)]
    pub compress: bool,
    /// Zlib-compress the whole serialized token before transport encoding.
    #[serde(default)]
    pub deflate_structure: bool,
}

impl TokenProfile {
    pub fn new(
        name: impl Into<String>,
        format: TokenFormat,
        encoding: TransportEncoding,
        compress: bool,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            encoding,
            compress,
            deflate_structure: false,
        }
    }

    /// Compress the serialized token as a whole instead of its payload.
    pub fn with_deflated_structure(mut self) -> Self {
        self.compress = false;
        self.deflate_structure = true;
        self
    }

    pub fn options(&self) -> TokenOptions {
        TokenOptions::new(self.format, self.encoding, self.compress)
    }

    /// Sign the claims built around `input` and return the transport string.
    pub fn build_token_text(&self, key: &SigningKey, input: &str) -> Result<String, CapacityError> {
        let payload = equivalent_claims(input).payload_for(self.format);
        let signed = sign(&payload, key, &self.options())?;
        if !self.deflate_structure {
            return Ok(signed.token);
        }
        let deflated = zlib(&signed.token_bytes)?;
        Ok(encode_token(&deflated, self.encoding))
    }
}

fn zlib(data: &[u8]) -> Result<Vec<u8>, CapacityError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| CapacityError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CapacityError::Compression(e.to_string()))
}

/// The profiles compared by default.
///
/// COSE tokens here compress only their payload, marked by `zip` in the
/// protected header.
pub fn default_profiles() -> Vec<TokenProfile> {
    vec![
        TokenProfile::new(
            "cose1_zip_base45",
            TokenFormat::CoseSign1,
            TransportEncoding::Base45,
            true,
        ),
        TokenProfile::new(
            "cose1_zip_base64url",
            TokenFormat::CoseSign1,
            TransportEncoding::Base64Url,
            true,
        ),
        TokenProfile::new("jws_base64url", TokenFormat::Jws, TransportEncoding::Base64Url, false),
    ]
}

/// COSE profiles that zlib-compress the whole serialized `COSE_Sign1` and
/// leave the protected header as `{1: alg}`.
///
/// The result is no longer a bare COSE_Sign1 after transport decoding; it
/// has to be inflated first.
pub fn deflated_structure_profiles() -> Vec<TokenProfile> {
    [TransportEncoding::Base45, TransportEncoding::Base64Url]
        .into_iter()
        .map(|encoding| {
            TokenProfile::new(
                format!("cose1_{}", encoding),
                TokenFormat::CoseSign1,
                encoding,
                false,
            )
            .with_deflated_structure()
        })
        .collect()
}

/// Capacity of one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCapacity {
    pub profile: String,
    pub result: CapacityResult,
}

/// Run the capacity search for every profile, in order.
///
/// Inputs are prefixes of `corpus`, so the corpus must be at least
/// `config.ceiling_chars` long for the search to reach its ceiling.
pub fn measure_profiles<O: FeasibilityOracle>(
    profiles: &[TokenProfile],
    key: &SigningKey,
    corpus: &PayloadCorpus,
    budget: &SymbolBudget<O>,
    config: &ProbeConfig,
) -> Result<Vec<ProfileCapacity>, CapacityError> {
    profiles
        .iter()
        .map(|profile| {
            tracing::debug!(
                profile = %profile.name,
                target_version = budget.target_version(),
                "profile::measure"
            );
            let result = find_max_capacity(
                |size| corpus.sized_input(size),
                |input| profile.build_token_text(key, input),
                |text| budget.judge(text),
                config,
            )?;
            tracing::info!(
                profile = %profile.name,
                max_input_chars = ?result.max_input_chars,
                "profile capacity"
            );
            Ok(ProfileCapacity {
                profile: profile.name.clone(),
                result,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use crate::symbol::QrOracle;
    use flate2::read::ZlibDecoder;
    use qrsig_token::{decode_structure, decode_token, verify, verify_bytes, HmacKey, Verification};

    fn ec_key() -> SigningKey {
        SigningKey::ecdsa_p256_from_bytes(&[42u8; 32]).unwrap()
    }

    #[test]
    fn default_profile_names() {
        let names: Vec<String> = default_profiles().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["cose1_zip_base45", "cose1_zip_base64url", "jws_base64url"]);

        let names: Vec<String> = deflated_structure_profiles()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["cose1_base45", "cose1_base64url"]);
    }

    #[test]
    fn deflated_structure_tokens_inflate_to_cose_sign1() {
        let key = ec_key();
        for profile in deflated_structure_profiles() {
            let token = profile.build_token_text(&key, "abc").unwrap();
            let deflated = decode_token(&token, profile.encoding).unwrap();
            let mut token_bytes = Vec::new();
            ZlibDecoder::new(deflated.as_slice())
                .read_to_end(&mut token_bytes)
                .unwrap();

            // {1: -7}, no zip marker
            let parts = decode_structure(&token_bytes).unwrap();
            assert_eq!(parts.protected_header_bytes, vec![0xa1, 0x01, 0x26]);

            let verification =
                verify_bytes(&token_bytes, &key.verification_key(), &profile.options()).unwrap();
            assert!(verification.is_valid(), "{}", profile.name);
        }
    }

    #[test]
    fn profile_tokens_verify() {
        let key = ec_key();
        for profile in default_profiles() {
            let token = profile.build_token_text(&key, "abc").unwrap();
            let verification = verify(&token, &key.verification_key(), &profile.options()).unwrap();
            assert!(
                matches!(verification, Verification::Valid { .. }),
                "{}",
                profile.name
            );
        }
    }

    #[test]
    fn base45_profile_uses_alphanumeric_text() {
        let token = default_profiles()[0]
            .build_token_text(&ec_key(), "data")
            .unwrap();
        assert!(token
            .chars()
            .all(|c| "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:".contains(c)));
    }

    #[test]
    fn profiles_deserialize_from_config() {
        let profile: TokenProfile = serde_json::from_str(
            r#"{"name":"jws_base45","format":"jws","encoding":"base45"}"#,
        )
        .unwrap();
        assert_eq!(profile.format, TokenFormat::Jws);
        assert_eq!(profile.encoding, TransportEncoding::Base45);
        assert!(!profile.compress);
        assert!(!profile.deflate_structure);
    }

    #[test]
    fn sweep_reports_every_profile() {
        let key = SigningKey::from(HmacKey::from("sweep"));
        let corpus = PayloadCorpus::generate(2048, &Default::default()).unwrap();
        let budget = SymbolBudget::new(QrOracle::default(), 15).unwrap();
        let config = ProbeConfig {
            start_chars: 64,
            ceiling_chars: 2048,
        };
        let mut profiles = default_profiles();
        profiles.extend(deflated_structure_profiles());
        let results = measure_profiles(&profiles, &key, &corpus, &budget, &config).unwrap();
        assert_eq!(results.len(), 5);
        for capacity in &results {
            let at_max = capacity.result.at_max.as_ref().unwrap();
            assert!(at_max.symbol_version.unwrap() <= 15);
            let fail = capacity.result.first_failing.as_ref().unwrap();
            assert_eq!(fail.size_chars, at_max.size_chars + 1);
            assert!(!capacity.result.reached_search_ceiling);
        }
    }
}
