//! Capacity search: how much input a signed token can carry and still fit a
//! QR symbol of a given version.

pub mod claims;
pub mod corpus;
pub mod error;
pub mod profile;
pub mod prober;
pub mod symbol;
pub mod types;

pub use claims::{equivalent_claims, EquivalentClaims};
pub use corpus::PayloadCorpus;
pub use error::CapacityError;
pub use profile::{
    default_profiles, deflated_structure_profiles, measure_profiles, ProfileCapacity, TokenProfile,
};
pub use prober::{find_max_capacity, CapacityResult, Probe};
pub use symbol::{FeasibilityOracle, QrOracle, SymbolBudget, Verdict};
pub use types::{
    CorpusOptions, EccLevel, ProbeConfig, QrOptions, DEFAULT_TARGET_VERSION, MAX_SYMBOL_VERSION,
};
