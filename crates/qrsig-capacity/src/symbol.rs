//! QR symbol-version feasibility.
//!
//! A text fits a version when mode header + character-count indicator + data
//! bits do not exceed the version's data-codeword capacity (ISO/IEC 18004
//! Table 7). Mode selection:
//! - numeric when every character is a digit
//! - alphanumeric when every character is in the 45-character QR set
//! - byte otherwise, over UTF-8, preceded by a UTF-8 ECI designator

use serde::Serialize;

use crate::error::CapacityError;
use crate::types::{EccLevel, QrOptions, MAX_SYMBOL_VERSION};

const ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

const MODE_INDICATOR_BITS: usize = 4;

/// ECI mode indicator (4) + one-byte assignment number (8).
const ECI_HEADER_BITS: usize = 12;

/// Data codewords per version, indexed `[version - 1][L, M, Q, H]`.
const DATA_CODEWORDS: [[u16; 4]; 40] = [
    [19, 16, 13, 9],
    [34, 28, 22, 16],
    [55, 44, 34, 26],
    [80, 64, 48, 36],
    [108, 86, 62, 46],
    [136, 108, 76, 60],
    [156, 124, 88, 66],
    [194, 154, 110, 86],
    [232, 182, 132, 100],
    [274, 216, 154, 122],
    [324, 254, 180, 140],
    [370, 290, 206, 158],
    [428, 334, 244, 180],
    [461, 365, 261, 197],
    [523, 415, 295, 223],
    [589, 453, 325, 253],
    [647, 507, 367, 283],
    [721, 563, 397, 313],
    [795, 627, 445, 341],
    [861, 669, 485, 385],
    [932, 714, 512, 406],
    [1006, 782, 568, 442],
    [1094, 860, 614, 464],
    [1174, 914, 664, 514],
    [1276, 1000, 718, 538],
    [1370, 1062, 754, 596],
    [1468, 1128, 808, 628],
    [1531, 1193, 871, 661],
    [1631, 1267, 911, 701],
    [1735, 1373, 985, 745],
    [1843, 1455, 1033, 793],
    [1955, 1541, 1115, 845],
    [2071, 1631, 1171, 901],
    [2191, 1725, 1231, 961],
    [2306, 1812, 1286, 986],
    [2434, 1914, 1354, 1054],
    [2566, 1992, 1426, 1096],
    [2702, 2102, 1502, 1142],
    [2812, 2216, 1582, 1222],
    [2956, 2334, 1666, 1276],
];

/// Something that can tell the smallest symbol a text fits into.
pub trait FeasibilityOracle {
    /// Smallest version (1..=40) that holds `text`, or `None` if none does.
    fn min_symbol_version(&self, text: &str) -> Option<u8>;
}

/// QR segment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl Mode {
    /// Pick the most compact mode that can represent every character.
    pub fn choose(text: &str) -> Self {
        let mut has_alphanumeric = false;
        for c in text.chars() {
            if c.is_ascii_digit() {
                continue;
            }
            if ALPHANUMERIC.contains(c) {
                has_alphanumeric = true;
            } else {
                return Self::Byte;
            }
        }
        if has_alphanumeric {
            Self::Alphanumeric
        } else if text.is_empty() {
            Self::Byte
        } else {
            Self::Numeric
        }
    }

    /// Width of the character-count indicator at `version`.
    pub fn count_bits(&self, version: u8) -> usize {
        let band = match version {
            0..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Self::Numeric => [10, 12, 14][band],
            Self::Alphanumeric => [9, 11, 13][band],
            Self::Byte => [8, 16, 16][band],
        }
    }

    /// Header bits before the character count.
    fn header_bits(&self) -> usize {
        match self {
            Self::Byte => ECI_HEADER_BITS + MODE_INDICATOR_BITS,
            _ => MODE_INDICATOR_BITS,
        }
    }
}

fn ecc_column(ecc: EccLevel) -> usize {
    match ecc {
        EccLevel::L => 0,
        EccLevel::M => 1,
        EccLevel::Q => 2,
        EccLevel::H => 3,
    }
}

/// Data capacity of a version in bits, or `None` for versions outside 1..=40.
pub fn data_capacity_bits(version: u8, ecc: EccLevel) -> Option<usize> {
    let row = DATA_CODEWORDS.get(usize::from(version).checked_sub(1)?)?;
    Some(usize::from(row[ecc_column(ecc)]) * 8)
}

/// Encoded segment of a text, independent of version except for the count field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub mode: Mode,
    /// Characters (numeric/alphanumeric) or bytes (byte mode) to count.
    pub count: usize,
    pub data_bits: usize,
}

impl Segment {
    pub fn of(text: &str) -> Self {
        let mode = Mode::choose(text);
        let (count, data_bits) = match mode {
            Mode::Numeric => {
                let n = text.len();
                (n, 10 * (n / 3) + [0, 4, 7][n % 3])
            }
            Mode::Alphanumeric => {
                let n = text.len();
                (n, 11 * (n / 2) + 6 * (n % 2))
            }
            Mode::Byte => (text.len(), 8 * text.len()),
        };
        Self {
            mode,
            count,
            data_bits,
        }
    }

    /// Total bits needed at `version`, or `None` if the count overflows the field.
    pub fn bits_needed(&self, version: u8) -> Option<usize> {
        let count_bits = self.mode.count_bits(version);
        if self.count >= 1 << count_bits {
            return None;
        }
        Some(self.mode.header_bits() + count_bits + self.data_bits)
    }

    pub fn fits(&self, version: u8, ecc: EccLevel) -> bool {
        match (self.bits_needed(version), data_capacity_bits(version, ecc)) {
            (Some(needed), Some(capacity)) => needed <= capacity,
            _ => false,
        }
    }
}

/// Table-driven QR oracle at a fixed error-correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QrOracle {
    ecc: EccLevel,
}

impl QrOracle {
    pub fn new(options: QrOptions) -> Self {
        Self { ecc: options.ecc }
    }

    pub fn ecc(&self) -> EccLevel {
        self.ecc
    }
}

impl FeasibilityOracle for QrOracle {
    fn min_symbol_version(&self, text: &str) -> Option<u8> {
        let segment = Segment::of(text);
        (1..=MAX_SYMBOL_VERSION).find(|&version| segment.fits(version, self.ecc))
    }
}

/// Oracle verdict for one token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub fits: bool,
    pub symbol_version: Option<u8>,
}

/// A symbol-version budget: a text is feasible when its minimum version is
/// at most `target_version`.
#[derive(Debug, Clone)]
pub struct SymbolBudget<O> {
    oracle: O,
    target_version: u8,
}

impl<O: FeasibilityOracle> SymbolBudget<O> {
    pub fn new(oracle: O, target_version: u8) -> Result<Self, CapacityError> {
        if !(1..=MAX_SYMBOL_VERSION).contains(&target_version) {
            return Err(CapacityError::InvalidConfig(format!(
                "target version must be in 1..={}, got {}",
                MAX_SYMBOL_VERSION, target_version
            )));
        }
        Ok(Self {
            oracle,
            target_version,
        })
    }

    pub fn target_version(&self) -> u8 {
        self.target_version
    }

    pub fn judge(&self, text: &str) -> Verdict {
        let symbol_version = self.oracle.min_symbol_version(text);
        Verdict {
            fits: symbol_version.is_some_and(|v| v <= self.target_version),
            symbol_version,
        }
    }

    pub fn feasible(&self, text: &str) -> bool {
        self.judge(text).fits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(ecc: EccLevel) -> QrOracle {
        QrOracle::new(QrOptions { ecc })
    }

    /// Byte capacity of a version for a plain byte segment (no ECI).
    fn plain_byte_capacity(version: u8, ecc: EccLevel) -> usize {
        let bits = data_capacity_bits(version, ecc).unwrap();
        (bits - MODE_INDICATOR_BITS - Mode::Byte.count_bits(version)) / 8
    }

    #[test]
    fn mode_selection() {
        assert_eq!(Mode::choose("0123"), Mode::Numeric);
        assert_eq!(Mode::choose("AB-12 %"), Mode::Alphanumeric);
        assert_eq!(Mode::choose("abc"), Mode::Byte);
        assert_eq!(Mode::choose("é"), Mode::Byte);
        assert_eq!(Mode::choose(""), Mode::Byte);
    }

    #[test]
    fn known_byte_capacities() {
        assert_eq!(plain_byte_capacity(1, EccLevel::L), 17);
        assert_eq!(plain_byte_capacity(1, EccLevel::H), 7);
        assert_eq!(plain_byte_capacity(10, EccLevel::M), 213);
        assert_eq!(plain_byte_capacity(40, EccLevel::L), 2953);
        assert_eq!(plain_byte_capacity(40, EccLevel::H), 1273);
    }

    #[test]
    fn byte_mode_includes_eci_header() {
        let qr = oracle(EccLevel::L);
        assert_eq!(qr.min_symbol_version(&"a".repeat(16)), Some(1));
        assert_eq!(qr.min_symbol_version(&"a".repeat(17)), Some(2));
        assert_eq!(qr.min_symbol_version(&"a".repeat(2952)), Some(40));
        assert_eq!(qr.min_symbol_version(&"a".repeat(2953)), None);
    }

    #[test]
    fn numeric_and_alphanumeric_boundaries() {
        let qr = oracle(EccLevel::L);
        assert_eq!(qr.min_symbol_version(&"7".repeat(41)), Some(1));
        assert_eq!(qr.min_symbol_version(&"7".repeat(42)), Some(2));
        assert_eq!(qr.min_symbol_version(&"A".repeat(25)), Some(1));
        assert_eq!(qr.min_symbol_version(&"A".repeat(26)), Some(2));
        assert_eq!(qr.min_symbol_version(&"7".repeat(7089)), Some(40));
        assert_eq!(qr.min_symbol_version(&"A".repeat(4296)), Some(40));
        assert_eq!(qr.min_symbol_version(&"A".repeat(4297)), None);
    }

    #[test]
    fn higher_ecc_needs_larger_symbols() {
        let text = "a".repeat(100);
        let low = oracle(EccLevel::L).min_symbol_version(&text).unwrap();
        let high = oracle(EccLevel::H).min_symbol_version(&text).unwrap();
        assert!(high > low);
    }

    #[test]
    fn min_version_is_monotonic_in_length() {
        let qr = oracle(EccLevel::M);
        let mut previous = 1;
        for n in (0..2400).step_by(37) {
            match qr.min_symbol_version(&"x".repeat(n)) {
                Some(version) => {
                    assert!(version >= previous);
                    previous = version;
                }
                None => previous = MAX_SYMBOL_VERSION + 1,
            }
        }
    }

    #[test]
    fn budget_judges_against_target() {
        let budget = SymbolBudget::new(oracle(EccLevel::L), 1).unwrap();
        assert_eq!(
            budget.judge(&"a".repeat(16)),
            Verdict {
                fits: true,
                symbol_version: Some(1)
            }
        );
        let verdict = budget.judge(&"a".repeat(17));
        assert!(!verdict.fits);
        assert_eq!(verdict.symbol_version, Some(2));
    }

    #[test]
    fn budget_rejects_out_of_range_targets() {
        assert!(SymbolBudget::new(QrOracle::default(), 0).is_err());
        assert!(SymbolBudget::new(QrOracle::default(), 41).is_err());
    }
}
