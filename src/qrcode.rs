//! QR code encoding functionality.
//!
//! This module turns text into a finished QR Code Model 2 symbol: it segments the
//! text, picks the smallest version that fits, assembles the data bit stream,
//! adds Reed-Solomon error correction, lays out every function pattern, places
//! the codewords and finally selects and applies the best data mask.

use core::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::bits::BitBuffer;
use crate::ecc;
use crate::error::{Error, Result};
use crate::mask::{self, Mask};
use crate::matrix::BitMatrix;
use crate::segment::{Segment, SjisFn};
use crate::version::{EcLevel, Version};

/// Versions sharing the same character count indicator widths.
const VERSION_CLASSES: [(u8, u8); 3] = [(1, 9), (10, 26), (27, 40)];

/// Encoding parameters.
///
/// Every field is optional: the level defaults to [`EcLevel::Medium`], the
/// version to the smallest that fits, and the mask to the one with the
/// lowest penalty. Deserializes from `{"errorCorrectionLevel": "Q",
/// "version": 3, "maskPattern": 2}`; the Shift-JIS mapping can only be set
/// in code.
///
/// # Example
///
/// ```rust
/// use pairqr::{EcLevel, QrCode, QrOptions};
///
/// let options = QrOptions::new().ec_level(EcLevel::Quartile).mask_pattern(3);
/// let qr = QrCode::create("wc:8a5e5bdc@2?relay-protocol=irn", &options).unwrap();
/// assert_eq!(qr.mask().value(), 3);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrOptions {
    pub error_correction_level: EcLevel,
    pub version: Option<u8>,
    pub mask_pattern: Option<u8>,
    #[serde(skip)]
    sjis: Option<Arc<SjisFn>>,
}

impl QrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ec_level(mut self, ecl: EcLevel) -> Self {
        self.error_correction_level = ecl;
        self
    }

    /// Pins the symbol version instead of choosing the smallest that fits.
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn mask_pattern(mut self, mask: u8) -> Self {
        self.mask_pattern = Some(mask);
        self
    }

    /// Enables kanji mode, using `f` to map characters to Shift-JIS.
    ///
    /// Characters that `f` cannot map are encoded in byte mode instead.
    pub fn sjis<F>(mut self, f: F) -> Self
    where
        F: Fn(char) -> Option<u16> + Send + Sync + 'static,
    {
        self.sjis = Some(Arc::new(f));
        self
    }

    pub fn kanji_enabled(&self) -> bool {
        self.sjis.is_some()
    }
}

impl fmt::Debug for QrOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("QrOptions")
            .field("error_correction_level", &self.error_correction_level)
            .field("version", &self.version)
            .field("mask_pattern", &self.mask_pattern)
            .field("kanji_enabled", &self.kanji_enabled())
            .finish()
    }
}

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use pairqr::{QrCode, QrOptions};
///
/// let qr = QrCode::create("HELLO WORLD", &QrOptions::default()).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,
    ecl: EcLevel,
    mask: Mask,
    modules: BitMatrix,
    segments: Vec<Segment>,
}

impl QrCode {
    /// Encodes a text string into a QR code.
    ///
    /// The text is split into the cheapest mix of numeric, alphanumeric, byte
    /// (and, with a Shift-JIS mapping, kanji) segments.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] if `text` is empty.
    /// * [`Error::InvalidVersion`] / [`Error::InvalidMaskPattern`] for out-of-range options.
    /// * [`Error::DataTooLarge`] if the data does not fit the pinned version, or any version.
    pub fn create(text: &str, options: &QrOptions) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidInput("no input text".into()));
        }
        let ecl = options.error_correction_level;
        let mask = options.mask_pattern.map(Mask::try_new).transpose()?;
        let sjis = options.sjis.as_deref();

        let (version, segments) = match options.version {
            Some(v) => {
                let version = Version::try_new(v)?;
                let segments = Segment::optimal(text, version, sjis)?;
                check_fits(&segments, version, ecl)?;
                (version, segments)
            }
            None => select_version(text, ecl, sjis)?,
        };
        Ok(Self::encode_segments(segments, version, ecl, mask))
    }

    /// Encodes caller-built segments, choosing the smallest fitting version
    /// unless `options` pins one.
    pub fn from_segments(segments: Vec<Segment>, options: &QrOptions) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::InvalidInput("no segments".into()));
        }
        let ecl = options.error_correction_level;
        let mask = options.mask_pattern.map(Mask::try_new).transpose()?;
        let version = match options.version {
            Some(v) => {
                let version = Version::try_new(v)?;
                check_fits(&segments, version, ecl)?;
                version
            }
            None => Version::MIN
                .range_to(Version::MAX)
                .find(|&v| fits(&segments, v, ecl))
                .ok_or_else(|| too_large(&segments, Version::MAX, ecl))?,
        };
        Ok(Self::encode_segments(segments, version, ecl, mask))
    }

    /// Builds the symbol for segments already known to fit `version`.
    fn encode_segments(
        segments: Vec<Segment>,
        version: Version,
        ecl: EcLevel,
        mask: Option<Mask>,
    ) -> Self {
        let datacodewords = data_codewords(&segments, version, ecl);
        let allcodewords = ecc::add_ecc_and_interleave(&datacodewords, version, ecl);

        let mut modules = BitMatrix::new(version.size());
        draw_function_patterns(&mut modules, version, ecl);
        draw_codewords(&mut modules, &allcodewords);

        let mask = mask.unwrap_or_else(|| best_mask(&mut modules, ecl));
        mask.apply(&mut modules);
        draw_format_bits(&mut modules, ecl, mask);

        debug!(
            version = version.value(),
            ecl = %ecl,
            mask = mask.value(),
            segments = segments.len(),
            "encoded QR code"
        );
        Self {
            version,
            ecl,
            mask,
            modules,
            segments,
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> usize {
        self.modules.size()
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> EcLevel {
        self.ecl
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// The segments the text was encoded as.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn modules(&self) -> &BitMatrix {
        &self.modules
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`, which lets renderers treat the quiet zone uniformly.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size() as i32;
        range.contains(&x) && range.contains(&y) && self.modules.get(x as usize, y as usize)
    }

    /// Penalty score of the final symbol.
    pub fn penalty_score(&self) -> i32 {
        mask::penalty_score(&self.modules)
    }
}

fn fits(segments: &[Segment], version: Version, ecl: EcLevel) -> bool {
    Segment::total_bits(segments, version).is_some_and(|n| n <= version.data_bits(ecl))
}

fn too_large(segments: &[Segment], version: Version, ecl: EcLevel) -> Error {
    let needed = segments
        .iter()
        .map(|s| 4 + usize::from(s.mode().num_char_count_bits(version)) + s.bit_len())
        .sum();
    Error::DataTooLarge {
        needed,
        capacity: version.data_bits(ecl),
    }
}

fn check_fits(segments: &[Segment], version: Version, ecl: EcLevel) -> Result<()> {
    if fits(segments, version, ecl) {
        Ok(())
    } else {
        Err(too_large(segments, version, ecl))
    }
}

/// Finds the smallest version holding `text`, segmenting it optimally for each
/// class of character count indicator widths in turn.
fn select_version(
    text: &str,
    ecl: EcLevel,
    sjis: Option<&SjisFn>,
) -> Result<(Version, Vec<Segment>)> {
    let mut last: Option<Vec<Segment>> = None;
    for (lo, hi) in VERSION_CLASSES {
        let first = Version::new(lo);
        let segments = Segment::optimal(text, first, sjis)?;
        if let Some(version) = first.range_to(Version::new(hi)).find(|&v| fits(&segments, v, ecl)) {
            return Ok((version, segments));
        }
        last = Some(segments);
    }
    let segments = last.unwrap_or_default();
    Err(too_large(&segments, Version::MAX, ecl))
}

/// Concatenates the segments and pads them to the data capacity of `version`.
fn data_codewords(segments: &[Segment], version: Version, ecl: EcLevel) -> Vec<u8> {
    let datacapacitybits: usize = version.data_bits(ecl);
    let mut bb = BitBuffer::with_capacity(datacapacitybits);
    for seg in segments {
        seg.write(&mut bb, version);
    }
    debug_assert!(bb.len_bits() <= datacapacitybits);

    // Add terminator and pad up to a byte if applicable
    let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len_bits());
    bb.put(0, numzerobits as u8);
    let numzerobits: usize = bb.len_bits().wrapping_neg() & 7;
    bb.put(0, numzerobits as u8);
    debug_assert_eq!(bb.len_bits() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len_bits() >= datacapacitybits {
            break;
        }
        bb.put(padbyte, 8);
    }
    bb.into_bytes()
}

/// Draws finder, timing and alignment patterns and reserves the format and
/// version areas.
fn draw_function_patterns(modules: &mut BitMatrix, version: Version, ecl: EcLevel) {
    let size = modules.size() as i32;

    // Finder patterns with their separators
    for (cx, cy) in [(3, 3), (size - 4, 3), (3, size - 4)] {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let (x, y) = (cx + dx, cy + dy);
                if (0..size).contains(&x) && (0..size).contains(&y) {
                    let dist: i32 = dx.abs().max(dy.abs());
                    modules.set(x as usize, y as usize, dist != 2 && dist != 4, true);
                }
            }
        }
    }

    // Timing patterns between the finders
    let size = modules.size();
    for i in 8..size - 8 {
        modules.set(6, i, i % 2 == 0, true);
        modules.set(i, 6, i % 2 == 0, true);
    }

    // Alignment patterns, except where they would overlap a finder
    let alignpatpos = version.alignment_pattern_positions();
    let numalign = alignpatpos.len();
    for (i, &x) in alignpatpos.iter().enumerate() {
        for (j, &y) in alignpatpos.iter().enumerate() {
            if (i == 0 && j == 0)
                || (i == 0 && j == numalign - 1)
                || (i == numalign - 1 && j == 0)
            {
                continue;
            }
            for dy in -2i32..=2 {
                for dx in -2i32..=2 {
                    let dist = dx.abs().max(dy.abs());
                    modules.set(
                        (x as i32 + dx) as usize,
                        (y as i32 + dy) as usize,
                        dist != 1,
                        true,
                    );
                }
            }
        }
    }

    // Placeholder format bits; overwritten once the mask is chosen
    draw_format_bits(modules, ecl, Mask::new(0));
    draw_version(modules, version);
}

/// The 15-bit format information: level and mask, BCH(15,5) protected and XOR-masked.
pub(crate) fn format_bits(ecl: EcLevel, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// The 18-bit version information, BCH(18,6) protected.
pub(crate) fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    (ver << 12) | rem
}

fn draw_format_bits(modules: &mut BitMatrix, ecl: EcLevel, mask: Mask) {
    let bits = format_bits(ecl, mask);
    let size = modules.size();

    // First copy, around the top-left finder
    for i in 0..6 {
        modules.set(8, i, get_bit(bits, i), true);
    }
    modules.set(8, 7, get_bit(bits, 6), true);
    modules.set(8, 8, get_bit(bits, 7), true);
    modules.set(7, 8, get_bit(bits, 8), true);
    for i in 9..15 {
        modules.set(14 - i, 8, get_bit(bits, i), true);
    }

    // Second copy, split between the other two finders
    for i in 0..8 {
        modules.set(size - 1 - i, 8, get_bit(bits, i), true);
    }
    for i in 8..15 {
        modules.set(8, size - 15 + i, get_bit(bits, i), true);
    }
    // Always dark
    modules.set(8, size - 8, true, true);
}

fn draw_version(modules: &mut BitMatrix, version: Version) {
    if version.value() < 7 {
        return;
    }
    let bits = version_bits(version);
    let size = modules.size();
    for i in 0..18 {
        let bit: bool = get_bit(bits, i);
        let a: usize = size - 11 + i % 3;
        let b: usize = i / 3;
        modules.set(a, b, bit, true);
        modules.set(b, a, bit, true);
    }
}

/// Places codeword bits in the zigzag order: column pairs from the right,
/// alternating upward and downward, skipping the vertical timing column.
fn draw_codewords(modules: &mut BitMatrix, data: &[u8]) {
    let size = modules.size();
    let totalbits = data.len() * 8;
    let mut i: usize = 0;
    let mut right: usize = size - 1;
    loop {
        if right == 6 {
            right = 5;
        }
        let upward: bool = (right + 1) & 2 == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let x = right - j;
                if !modules.is_reserved(x, y) && i < totalbits {
                    let bit = (data[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                    modules.set(x, y, bit, false);
                    i += 1;
                }
            }
        }
        if right < 3 {
            break;
        }
        right -= 2;
    }
    debug_assert_eq!(i, totalbits);
}

/// Tries every mask in turn, scoring each and reverting it, and returns the
/// lowest-penalty one. Ties keep the lower id.
fn best_mask(modules: &mut BitMatrix, ecl: EcLevel) -> Mask {
    let mut best = Mask::new(0);
    let mut minpenalty = i32::MAX;
    for candidate in Mask::ALL {
        candidate.apply(modules);
        draw_format_bits(modules, ecl, candidate);
        let penalty: i32 = mask::penalty_score(modules);
        trace!(mask = candidate.value(), penalty, "scored mask");
        if penalty < minpenalty {
            best = candidate;
            minpenalty = penalty;
        }
        candidate.apply(modules); // Undoes the mask due to XOR
    }
    best
}

fn get_bit(x: u32, i: usize) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::tests::tiny_sjis;
    use crate::segment::Mode;
    use crate::testutil::decode;

    fn create(text: &str, ecl: EcLevel) -> QrCode {
        QrCode::create(text, &QrOptions::new().ec_level(ecl)).unwrap()
    }

    #[test]
    fn test_hello_world_is_alphanumeric_version_1() {
        let qr = create("HELLO WORLD", EcLevel::Medium);
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.segments().len(), 1);
        assert_eq!(qr.segments()[0].mode(), Mode::Alphanumeric);
    }

    #[test]
    fn test_hello_world_data_codewords() {
        let segs = [Segment::make_alphanumeric("HELLO WORLD").unwrap()];
        let data = data_codewords(&segs, Version::new(1), EcLevel::Medium);
        assert_eq!(
            data,
            vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17]
        );
    }

    #[test]
    fn test_numeric_bit_length() {
        let qr = create("12345", EcLevel::Low);
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.segments().len(), 1);
        assert_eq!(qr.segments()[0].mode(), Mode::Numeric);
        assert_eq!(qr.segments()[0].bit_len(), 17);
    }

    #[test]
    fn test_empty_text_is_invalid_input() {
        assert!(matches!(
            QrCode::create("", &QrOptions::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_pinned_version_too_small() {
        let text = "x".repeat(40);
        let result = QrCode::create(&text, &QrOptions::new().ec_level(EcLevel::High).version(1));
        assert!(matches!(result, Err(Error::DataTooLarge { capacity: 72, .. })));
    }

    #[test]
    fn test_out_of_range_options() {
        assert!(matches!(
            QrCode::create("A", &QrOptions::new().version(41)),
            Err(Error::InvalidVersion(41))
        ));
        assert!(matches!(
            QrCode::create("A", &QrOptions::new().version(0)),
            Err(Error::InvalidVersion(0))
        ));
        assert!(matches!(
            QrCode::create("A", &QrOptions::new().mask_pattern(8)),
            Err(Error::InvalidMaskPattern(8))
        ));
    }

    #[test]
    fn test_too_large_for_any_version() {
        let text = "a".repeat(2954);
        assert!(matches!(
            QrCode::create(&text, &QrOptions::new().ec_level(EcLevel::Low)),
            Err(Error::DataTooLarge { .. })
        ));
        let qr = create(&"a".repeat(2953), EcLevel::Low);
        assert_eq!(qr.version(), Version::MAX);
    }

    #[test]
    fn test_size_matches_version_for_all_levels() {
        let long = "Z9".repeat(120);
        for text in ["1", "HELLO WORLD", "wc:8a5e5bdc-a8a4@2?relay-protocol=irn", &long] {
            for ecl in EcLevel::ALL {
                let qr = create(text, ecl);
                assert_eq!(qr.size(), usize::from(qr.version().value()) * 4 + 17);
                assert_eq!(qr.modules().size(), qr.size());
            }
        }
    }

    #[test]
    fn test_capacity_boundary_selects_exact_version() {
        // 1-L holds 152 data bits: 41 digits use 4 + 10 + 137 = 151, 42 digits need 154.
        let qr = create(&"7".repeat(41), EcLevel::Low);
        assert_eq!(qr.version().value(), 1);
        let qr = create(&"7".repeat(42), EcLevel::Low);
        assert_eq!(qr.version().value(), 2);

        // 2-M holds 28 data codewords = 224 bits; 4 + 8 + 26 * 8 = 220, 27 bytes = 228.
        let qr = create(&"q".repeat(26), EcLevel::Medium);
        assert_eq!(qr.version().value(), 2);
        let qr = create(&"q".repeat(27), EcLevel::Medium);
        assert_eq!(qr.version().value(), 3);
    }

    #[test]
    fn test_exact_fill_selects_version() {
        // 1-H: 72 data bits. Alphanumeric header 13 bits leaves 59: 10 chars = 55 bits, 11 = 61.
        let qr = create("ABCDEFGHIJ", EcLevel::High);
        assert_eq!(qr.version().value(), 1);
        let qr = create("ABCDEFGHIJK", EcLevel::High);
        assert_eq!(qr.version().value(), 2);
        // 40-L byte: 4 + 16 + 2953 * 8 = 23644 of 23648 bits.
        assert!(matches!(
            QrCode::create(&"b".repeat(2954), &QrOptions::new().ec_level(EcLevel::Low)),
            Err(Error::DataTooLarge { needed: 23652, capacity: 23648 })
        ));
    }

    #[test]
    fn test_idempotent_with_explicit_mask() {
        let options = QrOptions::new().ec_level(EcLevel::Quartile).mask_pattern(5);
        let a = QrCode::create("wc:pairing-topic@2?symKey=abc", &options).unwrap();
        let b = QrCode::create("wc:pairing-topic@2?symKey=abc", &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mask().value(), 5);
    }

    #[test]
    fn test_auto_mask_has_minimal_penalty() {
        let uri = "wc:8a5e5bdc-a8a4-4f5a-b3d2-2f6bd63e9a7f@2?relay-protocol=irn";
        for text in ["HELLO WORLD", uri] {
            let auto = create(text, EcLevel::Medium);
            let best = auto.penalty_score();
            for m in 0..8 {
                let forced = QrCode::create(text, &QrOptions::new().mask_pattern(m)).unwrap();
                assert!(best <= forced.penalty_score(), "mask {m} beats auto mask {}", auto.mask());
                if forced.penalty_score() == best {
                    assert!(auto.mask().value() <= m, "ties keep the lowest id");
                }
            }
        }
    }

    #[test]
    fn test_function_patterns() {
        let qr = create("HELLO WORLD", EcLevel::Medium);
        let m = qr.modules();
        // Finder centre, ring and separator
        assert!(m.get(3, 3));
        assert!(m.get(2, 4));
        assert!(!m.get(1, 3));
        assert!(m.get(0, 6));
        assert!(!m.get(7, 0));
        assert!(!m.get(20 - 7, 3));
        // Timing
        assert!(m.get(8, 6));
        assert!(!m.get(9, 6));
        assert!(m.get(6, 10));
        // Dark module
        assert!(m.get(8, 13));
    }

    #[test]
    fn test_known_bch_codes() {
        assert_eq!(format_bits(EcLevel::Medium, Mask::new(0)), 0b101010000010010);
        assert_eq!(format_bits(EcLevel::Low, Mask::new(4)), 0b110011000101111);
        assert_eq!(version_bits(Version::new(7)), 0b000111110010010100);
    }

    #[test]
    fn test_round_trip_auto_version() {
        let texts = [
            "HELLO WORLD",
            "12345",
            "wc:8a5e5bdc-a8a4-4f5a-b3d2-2f6bd63e9a7f@2?relay-protocol=irn&symKey=587d5484ce2a2a6ee3ba1962fdd7e8588e06200c46823bd18fbd67def96ad303",
            "Grüße, 世界! 🚀",
            "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ abcdefghijklmnopqrstuvwxyz",
        ];
        for text in texts {
            for ecl in EcLevel::ALL {
                let qr = create(text, ecl);
                let decoded = decode(qr.modules());
                assert_eq!(decoded.version, qr.version());
                assert_eq!(decoded.ecl, ecl);
                assert_eq!(decoded.mask, qr.mask());
                assert_eq!(decoded.text, text, "{ecl} v{}", qr.version());
            }
        }
    }

    #[test]
    fn test_round_trip_pinned_versions() {
        let text = "wc:7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU@2";
        for ver in [7u8, 10, 14, 27, 40] {
            for ecl in EcLevel::ALL {
                let options = QrOptions::new().ec_level(ecl).version(ver);
                let qr = QrCode::create(text, &options).unwrap();
                assert_eq!(qr.version().value(), ver);
                let decoded = decode(qr.modules());
                assert_eq!(decoded.version.value(), ver);
                assert_eq!(decoded.text, text);
            }
        }
    }

    #[test]
    fn test_large_payload_round_trip() {
        let text: String = (0..1800).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let qr = create(&text, EcLevel::Low);
        assert!(qr.version().value() >= 27);
        assert_eq!(decode(qr.modules()).text, text);
    }

    #[test]
    fn test_kanji_requires_mapping() {
        let with = QrCode::create("点茗", &QrOptions::new().sjis(tiny_sjis)).unwrap();
        assert_eq!(with.segments()[0].mode(), Mode::Kanji);
        let without = QrCode::create("点茗", &QrOptions::new()).unwrap();
        assert_eq!(without.segments()[0].mode(), Mode::Byte);
        assert_eq!(decode(without.modules()).text, "点茗");
        let decoded = decode(with.modules());
        assert_eq!(decoded.kanji, vec![0x935F, 0xE4AA]);
    }

    #[test]
    fn test_from_segments() {
        let segs = vec![
            Segment::make_bytes("wc:"),
            Segment::make_numeric("0123456789").unwrap(),
        ];
        let qr = QrCode::from_segments(segs, &QrOptions::new().ec_level(EcLevel::Low)).unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(decode(qr.modules()).text, "wc:0123456789");
        assert!(matches!(
            QrCode::from_segments(Vec::new(), &QrOptions::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_options_from_json() {
        let options: QrOptions =
            serde_json::from_str(r#"{"errorCorrectionLevel": "q", "version": 3, "maskPattern": 2}"#)
                .unwrap();
        assert_eq!(options.error_correction_level, EcLevel::Quartile);
        assert_eq!(options.version, Some(3));
        assert_eq!(options.mask_pattern, Some(2));
        assert!(!options.kanji_enabled());
        let empty: QrOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.error_correction_level, EcLevel::Medium);
    }

    #[test]
    fn test_get_module_out_of_bounds_is_light() {
        let qr = create("A", EcLevel::Low);
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, 21));
        assert!(qr.get_module(0, 0));
    }
}
