use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CapacityError;

/// Largest QR symbol version.
pub const MAX_SYMBOL_VERSION: u8 = 40;

/// Symbol version a token has to fit unless configured otherwise.
pub const DEFAULT_TARGET_VERSION: u8 = MAX_SYMBOL_VERSION;

/// First non-zero probe size of the exponential phase.
pub const DEFAULT_START_CHARS: usize = 64;

/// Largest input size the prober will try.
pub const DEFAULT_CEILING_CHARS: usize = 1 << 16;

pub const DEFAULT_CHUNK_CHARS: usize = 24;

/// Probability that the corpus generator re-uses an earlier chunk.
pub const DEFAULT_REUSE: f64 = 0.25;

/// QR error-correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EccLevel {
    /// ~7% recovery.
    #[default]
    L,
    /// ~15% recovery.
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

impl EccLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

impl fmt::Display for EccLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EccLevel {
    type Err = CapacityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(Self::L),
            "M" | "m" => Ok(Self::M),
            "Q" | "q" => Ok(Self::Q),
            "H" | "h" => Ok(Self::H),
            other => Err(CapacityError::InvalidConfig(format!(
                "unknown error-correction level {:?}",
                other
            ))),
        }
    }
}

/// QR encoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
    pub ecc: EccLevel,
}

/// Search bounds for the capacity prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub start_chars: usize,
    pub ceiling_chars: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            start_chars: DEFAULT_START_CHARS,
            ceiling_chars: DEFAULT_CEILING_CHARS,
        }
    }
}

/// Shape of generated corpus text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusOptions {
    /// Characters per chunk. Must be positive.
    pub chunk_chars: usize,
    /// Probability in `[0, 1]` of re-using an earlier chunk.
    pub reuse: f64,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            chunk_chars: DEFAULT_CHUNK_CHARS,
            reuse: DEFAULT_REUSE,
        }
    }
}

impl CorpusOptions {
    pub fn validate(&self) -> Result<(), CapacityError> {
        if self.chunk_chars == 0 {
            return Err(CapacityError::InvalidConfig(
                "chunk_chars must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reuse) {
            return Err(CapacityError::InvalidConfig(format!(
                "reuse must be in [0, 1], got {}",
                self.reuse
            )));
        }
        Ok(())
    }
}
