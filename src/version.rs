//! Symbol versions, error correction levels and the ISO/IEC 18004 capacity tables.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::segment::Mode;

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The smallest symbol, 21×21 modules.
    pub const MIN: Version = Version(1);

    /// The largest symbol, 177×177 modules.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use
    /// [`Version::try_new`] for numbers coming from callers.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    pub fn try_new(ver: u8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(Error::InvalidVersion(i64::from(ver)))
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the symbol in modules: `4 * version + 17`.
    pub const fn size(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// Iterates every version from `self` up to and including `last`.
    pub fn range_to(self, last: Version) -> impl Iterator<Item = Version> {
        (self.0..=last.0).map(Version)
    }

    /// Number of modules available for data and EC codewords, remainder bits included.
    pub(crate) fn raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    /// Total number of codewords (data plus error correction) in the symbol.
    pub fn total_codewords(self) -> usize {
        self.raw_data_modules() / 8
    }

    /// Number of EC codewords in each block.
    pub fn ec_codewords_per_block(self, ecl: EcLevel) -> usize {
        table_get(&ECC_CODEWORDS_PER_BLOCK, self, ecl)
    }

    pub fn num_blocks(self, ecl: EcLevel) -> usize {
        table_get(&NUM_ERROR_CORRECTION_BLOCKS, self, ecl)
    }

    /// Number of data codewords at the given level.
    pub fn data_codewords(self, ecl: EcLevel) -> usize {
        self.total_codewords() - self.ec_codewords_per_block(ecl) * self.num_blocks(ecl)
    }

    /// Number of data bits at the given level.
    pub fn data_bits(self, ecl: EcLevel) -> usize {
        self.data_codewords(ecl) * 8
    }

    /// How many characters of a single segment in `mode` fit in this version.
    ///
    /// Byte capacity counts UTF-8 bytes, not characters.
    pub fn capacity(self, ecl: EcLevel, mode: Mode) -> usize {
        let header = 4 + usize::from(mode.num_char_count_bits(self));
        let bits = self.data_bits(ecl).saturating_sub(header);
        let chars = match mode {
            Mode::Numeric => bits * 3 / 10,
            Mode::Alphanumeric => bits * 2 / 11,
            Mode::Byte => bits / 8,
            Mode::Kanji => bits / 13,
        };
        chars.min((1usize << mode.num_char_count_bits(self)) - 1)
    }

    /// Alignment pattern centre coordinates along one axis, ascending.
    pub(crate) fn alignment_pattern_positions(self) -> Vec<usize> {
        let ver = usize::from(self.0);
        if ver == 1 {
            return Vec::new();
        }
        let numalign: usize = ver / 7 + 2;
        let step: usize = if ver == 32 {
            26
        } else {
            (ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
        };
        let mut result: Vec<usize> = (0..numalign - 1)
            .map(|i| self.size() - 7 - i * step)
            .collect();
        result.push(6);
        result.reverse();
        result
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error correction level of a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub enum EcLevel {
    /// Tolerates ~7% erroneous codewords.
    #[serde(rename = "L", alias = "l", alias = "low", alias = "Low")]
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    #[serde(rename = "M", alias = "m", alias = "medium", alias = "Medium")]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    #[serde(rename = "Q", alias = "q", alias = "quartile", alias = "Quartile")]
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    #[serde(rename = "H", alias = "h", alias = "high", alias = "High")]
    High,
}

impl EcLevel {
    pub const ALL: [EcLevel; 4] = [EcLevel::Low, EcLevel::Medium, EcLevel::Quartile, EcLevel::High];

    /// Index into the capacity tables.
    fn ordinal(self) -> usize {
        use EcLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// The 2-bit value stored in the format information.
    pub(crate) fn format_bits(self) -> u8 {
        use EcLevel::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_format_bits(bits: u8) -> Self {
        use EcLevel::*;
        [Medium, Low, High, Quartile][usize::from(bits & 3)]
    }
}

impl FromStr for EcLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(EcLevel::Low),
            "m" | "medium" => Ok(EcLevel::Medium),
            "q" | "quartile" => Ok(EcLevel::Quartile),
            "h" | "high" => Ok(EcLevel::High),
            _ => Err(Error::InvalidInput(format!("unknown EC level: {s}"))),
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            EcLevel::Low => "L",
            EcLevel::Medium => "M",
            EcLevel::Quartile => "Q",
            EcLevel::High => "H",
        };
        f.write_str(c)
    }
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: EcLevel) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];
