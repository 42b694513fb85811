//! Data segments and the text classifier.
//!
//! A text is first split greedily into maximal runs of one character class
//! ([`Segment::raw_split`]). [`Segment::optimal`] then chooses, for every run,
//! which mode to encode it in so that the total bit length (mode indicators
//! and character count indicators included) is minimal for a given version.

use core::fmt;

use crate::bits::BitBuffer;
use crate::error::{Error, Result};
use crate::version::Version;

/// Maps a character to its double-byte Shift-JIS code, if it has one.
pub type SjisFn = dyn Fn(char) -> Option<u16> + Send + Sync;

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Encoding mode of a segment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl Mode {
    /// The 4-bit mode indicator.
    pub(crate) fn mode_bits(self) -> u32 {
        use Mode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_mode_bits(bits: u32) -> Option<Self> {
        use Mode::*;
        match bits {
            0x1 => Some(Numeric),
            0x2 => Some(Alphanumeric),
            0x4 => Some(Byte),
            0x8 => Some(Kanji),
            _ => None,
        }
    }

    /// Width of the character count indicator at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use Mode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
        })[usize::from((ver.value() + 7) / 17)]
    }

    /// Payload length in bits of `count` characters (bytes for [`Mode::Byte`]).
    pub fn payload_bits(self, count: usize) -> usize {
        use Mode::*;
        match self {
            Numeric => 10 * (count / 3) + [0, 4, 7][count % 3],
            Alphanumeric => 11 * (count / 2) + 6 * (count % 2),
            Byte => 8 * count,
            Kanji => 13 * count,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mode::Numeric => "Numeric",
            Mode::Alphanumeric => "Alphanumeric",
            Mode::Byte => "Byte",
            Mode::Kanji => "Kanji",
        };
        f.write_str(name)
    }
}

/// A run of input text tagged with the mode it is encoded in.
///
/// The payload bits are computed once, at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    text: String,
    numchars: usize,
    data: BitBuffer,
}

impl Segment {
    /// Creates a numeric segment from a string of decimal digits.
    pub fn make_numeric(text: &str) -> Result<Self> {
        let mut bb = BitBuffer::with_capacity(Mode::Numeric.payload_bits(text.len()));
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let digit = c.to_digit(10).ok_or_else(|| {
                Error::InvalidInput(format!("{c:?} cannot be encoded in numeric mode"))
            })?;
            accumdata = accumdata * 10 + digit;
            accumcount += 1;
            if accumcount == 3 {
                bb.put(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.put(accumdata, accumcount * 3 + 1);
        }
        Ok(Self::new(Mode::Numeric, text, text.len(), bb))
    }

    /// Creates an alphanumeric segment.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    pub fn make_alphanumeric(text: &str) -> Result<Self> {
        let mut bb = BitBuffer::new();
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        let mut numchars = 0;
        for c in text.chars() {
            let i = ALPHANUMERIC_CHARSET.find(c).ok_or_else(|| {
                Error::InvalidInput(format!("{c:?} cannot be encoded in alphanumeric mode"))
            })?;
            accumdata = accumdata * 45 + i as u32;
            accumcount += 1;
            numchars += 1;
            if accumcount == 2 {
                bb.put(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.put(accumdata, 6);
        }
        Ok(Self::new(Mode::Alphanumeric, text, numchars, bb))
    }

    /// Creates a byte segment holding the UTF-8 encoding of `text`.
    pub fn make_bytes(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut bb = BitBuffer::with_capacity(bytes.len() * 8);
        for &b in bytes {
            bb.put(u32::from(b), 8);
        }
        Self::new(Mode::Byte, text, bytes.len(), bb)
    }

    /// Creates a kanji segment, mapping each character through `sjis`.
    ///
    /// Fails with [`Error::UnsupportedCharacter`] if a character has no
    /// Shift-JIS code in the two kanji-mode ranges.
    pub fn make_kanji(text: &str, sjis: &SjisFn) -> Result<Self> {
        let mut bb = BitBuffer::new();
        let mut numchars = 0;
        for c in text.chars() {
            let packed = sjis(c).and_then(kanji_value).ok_or(Error::UnsupportedCharacter(c))?;
            bb.put(u32::from(packed), 13);
            numchars += 1;
        }
        Ok(Self::new(Mode::Kanji, text, numchars, bb))
    }

    /// Creates a segment in the given mode, validating the text against it.
    pub fn with_mode(text: &str, mode: Mode, sjis: Option<&SjisFn>) -> Result<Self> {
        match mode {
            Mode::Numeric => Self::make_numeric(text),
            Mode::Alphanumeric => Self::make_alphanumeric(text),
            Mode::Byte => Ok(Self::make_bytes(text)),
            Mode::Kanji => match sjis {
                Some(f) => Self::make_kanji(text, f),
                None => Ok(Self::make_bytes(text)),
            },
        }
    }

    fn new(mode: Mode, text: &str, numchars: usize, data: BitBuffer) -> Self {
        Self {
            mode,
            text: text.to_owned(),
            numchars,
            data,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value written to the character count indicator.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Length of the payload in bits, excluding the segment header.
    pub fn bit_len(&self) -> usize {
        self.data.len_bits()
    }

    /// Appends mode indicator, character count and payload to `bb`.
    pub(crate) fn write(&self, bb: &mut BitBuffer, version: Version) {
        bb.put(self.mode.mode_bits(), 4);
        bb.put(self.numchars as u32, self.mode.num_char_count_bits(version));
        for i in 0..self.data.len_bits() {
            bb.put_bit(self.data.get(i));
        }
    }

    /// Total encoded length of `segs` at `version`, headers included.
    ///
    /// Returns `None` if a segment has more characters than its count
    /// indicator can express.
    pub fn total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if seg.numchars >= 1usize << ccbits {
                return None;
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len_bits())?;
        }
        Some(result)
    }

    /// Splits `text` into maximal runs of one character class.
    ///
    /// Kanji runs are only produced when `sjis` maps the characters into a
    /// kanji-mode range; otherwise those characters join byte runs.
    pub fn raw_split(text: &str, sjis: Option<&SjisFn>) -> Result<Vec<Self>> {
        runs(text, sjis)?
            .into_iter()
            .map(|(mode, run)| Self::with_mode(run, mode, sjis))
            .collect()
    }

    /// Splits `text` into the segment list with the smallest encoded size at `version`.
    pub fn optimal(text: &str, version: Version, sjis: Option<&SjisFn>) -> Result<Vec<Self>> {
        let runs = runs(text, sjis)?;
        let modes = cheapest_modes(&runs, version);

        let mut merged: Vec<(Mode, String)> = Vec::new();
        for (&(_, run), mode) in runs.iter().zip(modes) {
            match merged.last_mut() {
                Some((last, buf)) if *last == mode => buf.push_str(run),
                _ => merged.push((mode, run.to_owned())),
            }
        }
        merged
            .iter()
            .map(|(mode, run)| Self::with_mode(run, *mode, sjis))
            .collect()
    }

    /// Whether every character of `text` can be encoded in numeric mode.
    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(is_numeric_char)
    }

    /// Whether every character of `text` can be encoded in alphanumeric mode.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(is_alphanumeric_char)
    }
}

/// Packs a Shift-JIS code into its 13-bit kanji-mode value.
fn kanji_value(code: u16) -> Option<u16> {
    let offset = match code {
        0x8140..=0x9FFC => code - 0x8140,
        0xE040..=0xEBBF => code - 0xC140,
        _ => return None,
    };
    Some((offset >> 8) * 0xC0 + (offset & 0xFF))
}

/// Characters in the Unicode blocks that Shift-JIS double-byte codes cover.
fn is_kanji_range(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0xFF00..=0xFFEF
        | 0x4E00..=0x9FAF
        | 0x2605..=0x2606
        | 0x2190..=0x2195
        | 0x203B
        | 0x2010 | 0x2015 | 0x2018 | 0x2019 | 0x2025 | 0x2026 | 0x201C | 0x201D | 0x2225 | 0x2260
        | 0x0391..=0x0451
        | 0x00A7 | 0x00A8 | 0x00B1 | 0x00B4 | 0x00D7 | 0x00F7)
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_alphanumeric_char(c: char) -> bool {
    ALPHANUMERIC_CHARSET.contains(c)
}

fn classify(c: char, sjis: Option<&SjisFn>) -> Mode {
    if is_numeric_char(c) {
        Mode::Numeric
    } else if is_alphanumeric_char(c) {
        Mode::Alphanumeric
    } else if sjis.is_some_and(|f| is_kanji_range(c) && f(c).and_then(kanji_value).is_some()) {
        Mode::Kanji
    } else {
        Mode::Byte
    }
}

fn runs<'t>(text: &'t str, sjis: Option<&SjisFn>) -> Result<Vec<(Mode, &'t str)>> {
    if text.is_empty() {
        return Err(Error::InvalidInput("no input text".into()));
    }
    let mut result: Vec<(Mode, &str)> = Vec::new();
    let mut start = 0;
    let mut current: Option<Mode> = None;
    for (i, c) in text.char_indices() {
        let mode = classify(c, sjis);
        match current {
            Some(m) if m == mode => {}
            Some(m) => {
                result.push((m, &text[start..i]));
                start = i;
                current = Some(mode);
            }
            None => current = Some(mode),
        }
    }
    if let Some(m) = current {
        result.push((m, &text[start..]));
    }
    Ok(result)
}

/// Modes a run of the given class may be encoded in.
fn alternatives(class: Mode) -> &'static [Mode] {
    match class {
        Mode::Numeric => &[Mode::Numeric, Mode::Alphanumeric, Mode::Byte],
        Mode::Alphanumeric => &[Mode::Alphanumeric, Mode::Byte],
        Mode::Kanji => &[Mode::Kanji, Mode::Byte],
        Mode::Byte => &[Mode::Byte],
    }
}

fn run_len(run: &str, mode: Mode) -> usize {
    match mode {
        Mode::Byte => run.len(),
        _ => run.chars().count(),
    }
}

#[derive(Clone, Copy)]
struct PathState {
    mode: Mode,
    // Characters in the open segment, modulo 6. Enough to price the next
    // numeric (groups of 3) or alphanumeric (pairs) extension exactly.
    residue: usize,
    cost: usize,
    prev: usize,
}

/// Shortest path over the layered graph of per-run mode choices.
fn cheapest_modes(runs: &[(Mode, &str)], version: Version) -> Vec<Mode> {
    let mut layers: Vec<Vec<PathState>> = Vec::with_capacity(runs.len());
    for (layer, &(class, run)) in runs.iter().enumerate() {
        let mut next: Vec<PathState> = Vec::new();
        for &mode in alternatives(class) {
            let len = run_len(run, mode);
            let fresh = 4 + usize::from(mode.num_char_count_bits(version)) + mode.payload_bits(len);
            let mut candidates: Vec<PathState> = Vec::new();
            if layer == 0 {
                candidates.push(PathState { mode, residue: len % 6, cost: fresh, prev: 0 });
            } else {
                for (i, prev) in layers[layer - 1].iter().enumerate() {
                    let state = if prev.mode == mode {
                        let extra = mode.payload_bits(prev.residue + len)
                            - mode.payload_bits(prev.residue);
                        PathState {
                            mode,
                            residue: (prev.residue + len) % 6,
                            cost: prev.cost + extra,
                            prev: i,
                        }
                    } else {
                        PathState { mode, residue: len % 6, cost: prev.cost + fresh, prev: i }
                    };
                    candidates.push(state);
                }
            }
            for mut cand in candidates {
                if matches!(mode, Mode::Byte | Mode::Kanji) {
                    cand.residue = 0;
                }
                match next.iter_mut().find(|s| s.mode == cand.mode && s.residue == cand.residue) {
                    Some(s) if cand.cost < s.cost => *s = cand,
                    Some(_) => {}
                    None => next.push(cand),
                }
            }
        }
        layers.push(next);
    }

    let mut result: Vec<Mode> = Vec::with_capacity(runs.len());
    let Some(last) = layers.last() else {
        return result;
    };
    let mut index = last
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.cost)
        .map_or(0, |(i, _)| i);
    for layer in layers.iter().rev() {
        let state = layer[index];
        result.push(state.mode);
        index = state.prev;
    }
    result.reverse();
    result
}
