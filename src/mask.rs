//! The eight data mask patterns and the penalty rules used to choose between them.

use core::fmt;

use crate::error::{Error, Result};
use crate::matrix::BitMatrix;

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    pub const ALL: [Mask; 8] =
        [Mask(0), Mask(1), Mask(2), Mask(3), Mask(4), Mask(5), Mask(6), Mask(7)];

    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    pub fn try_new(mask: u8) -> Result<Self> {
        if mask <= 7 {
            Ok(Self(mask))
        } else {
            Err(Error::InvalidMaskPattern(i64::from(mask)))
        }
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether the module at column `x`, row `y` is inverted by this mask.
    pub fn inverts(self, x: usize, y: usize) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => (x * y) % 2 + (x * y) % 3 == 0,
            6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
            7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
            _ => unreachable!(),
        }
    }

    /// XORs the mask over every unreserved module. Applying it twice restores the matrix.
    pub fn apply(self, matrix: &mut BitMatrix) {
        let size = matrix.size();
        for y in 0..size {
            for x in 0..size {
                if !matrix.is_reserved(x, y) {
                    matrix.xor(x, y, self.inverts(x, y));
                }
            }
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total penalty of a finished or trial matrix: N1 + N2 + N3 + N4.
pub fn penalty_score(matrix: &BitMatrix) -> i32 {
    let mut result: i32 = 0;
    let size = matrix.size();

    // Adjacent modules in a row or column having the same colour, and finder-like patterns
    for y in 0..size {
        result += line_penalty(size, (0..size).map(|x| matrix.get(x, y)));
    }
    for x in 0..size {
        result += line_penalty(size, (0..size).map(|y| matrix.get(x, y)));
    }

    // 2*2 blocks of modules having the same colour
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = matrix.get(x, y);
            if color == matrix.get(x + 1, y)
                && color == matrix.get(x, y + 1)
                && color == matrix.get(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    result += balance_penalty(matrix.dark_count() as i32, (size * size) as i32);
    result
}

/// N4: 10 points for each started 5% step the dark share sits outside 45%..=55%.
fn balance_penalty(dark: i32, total: i32) -> i32 {
    // Smallest k >= 0 such that (45-5k)% <= dark/total <= (55+5k)%
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    k.max(0) * PENALTY_N4
}

/// N1 and N3 contributions of one row or column.
fn line_penalty(size: usize, line: impl Iterator<Item = bool>) -> i32 {
    let mut result: i32 = 0;
    let mut runcolor = false;
    let mut runlen: i32 = 0;
    let mut runhistory = FinderPenalty::new(size);
    for color in line {
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            runhistory.add_history(runlen);
            if !runcolor {
                result += runhistory.count_patterns() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3
}

/// Sliding window over the last seven run lengths of a line, used to spot
/// dark-light-dark-dark-dark-light-dark runs (1:1:3:1:1) with 4 light
/// modules on either side. The quiet zone counts as light.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            // Add light border to initial run
            currentrunlength += self.qr_size;
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    // Can only be called immediately after a light run is added.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            // Terminate dark run
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        // Add light border to final run
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&str]) -> BitMatrix {
        let mut m = BitMatrix::new(rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                m.set(x, y, c == '#', false);
            }
        }
        m
    }

    #[test]
    fn test_try_new() {
        assert_eq!(Mask::try_new(7).unwrap().value(), 7);
        assert!(matches!(Mask::try_new(8), Err(Error::InvalidMaskPattern(8))));
    }

    #[test]
    fn test_formulas() {
        assert!(Mask::new(0).inverts(0, 0));
        assert!(!Mask::new(0).inverts(1, 0));
        assert!(Mask::new(1).inverts(5, 2));
        assert!(!Mask::new(1).inverts(2, 5));
        assert!(Mask::new(2).inverts(3, 1));
        assert!(Mask::new(4).inverts(2, 1));
        assert!(!Mask::new(4).inverts(3, 0));
        assert!(Mask::new(5).inverts(0, 7));
        assert!(!Mask::new(5).inverts(1, 1));
    }

    #[test]
    fn test_apply_skips_reserved_and_is_self_inverse() {
        let mut m = BitMatrix::new(6);
        m.set(0, 0, false, true);
        let before = m.clone();
        Mask::new(0).apply(&mut m);
        assert!(!m.get(0, 0), "reserved module untouched");
        assert!(m.get(2, 0));
        assert!(!m.get(1, 0));
        Mask::new(0).apply(&mut m);
        assert_eq!(m, before);
    }

    #[test]
    fn test_run_penalty() {
        // One row of 7 dark modules: 3 + 2 for the row.
        let line = [true; 7];
        assert_eq!(line_penalty(7, line.iter().copied()), 3 + 2);
        let short = [true, true, true, true, false, false, false];
        assert_eq!(line_penalty(7, short.iter().copied()), 0);
    }

    #[test]
    fn test_finder_like_pattern_penalty() {
        // light x4, dark, light, dark x3, light, dark, light x4: counted once per light side
        let line: Vec<bool> = "....#.###.#....".chars().map(|c| c == '#').collect();
        assert_eq!(line_penalty(line.len(), line.iter().copied()), 2 * PENALTY_N3);
    }

    #[test]
    fn test_checkerboard_has_only_balance_penalty() {
        let rows: Vec<String> = (0..5)
            .map(|y| (0..5).map(|x| if (x + y) % 2 == 0 { '#' } else { '.' }).collect())
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let m = from_rows(&refs);
        // 13 of 25 dark: 52%, within the first 5% band.
        assert_eq!(penalty_score(&m), 0);
    }

    #[test]
    fn test_balance_penalty_bands() {
        assert_eq!(balance_penalty(50, 100), 0);
        assert_eq!(balance_penalty(55, 100), 0);
        assert_eq!(balance_penalty(56, 100), PENALTY_N4);
        // Exactly 60% is still the first band past 55%.
        assert_eq!(balance_penalty(60, 100), PENALTY_N4);
        assert_eq!(balance_penalty(61, 100), 2 * PENALTY_N4);
        assert_eq!(balance_penalty(40, 100), PENALTY_N4);
        assert_eq!(balance_penalty(0, 100), 9 * PENALTY_N4);
    }

    #[test]
    fn test_all_dark_penalty() {
        let m = from_rows(&["#####"; 5]);
        // N1: 10 lines * 3, N2: 16 blocks * 3, N4: 100% dark -> k = 9
        assert_eq!(penalty_score(&m), 30 + 48 + 90);
    }
}
