//! A small reader for the symbols this crate produces, so tests can check
//! that what was drawn decodes back to the input.

use crate::ecc::ReedSolomonEncoder;
use crate::mask::Mask;
use crate::matrix::BitMatrix;
use crate::qrcode::{format_bits, version_bits};
use crate::segment::Mode;
use crate::version::{EcLevel, Version};

static ALPHANUMERIC_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Debug)]
pub(crate) struct Decoded {
    pub version: Version,
    pub ecl: EcLevel,
    pub mask: Mask,
    pub text: String,
    /// Shift-JIS codes of kanji-mode characters, in order.
    pub kanji: Vec<u16>,
}

/// Reads a symbol, panicking on anything malformed.
pub(crate) fn decode(m: &BitMatrix) -> Decoded {
    let size = m.size();
    assert_eq!((size - 17) % 4, 0, "bad size {size}");
    let version = Version::new(((size - 17) / 4) as u8);

    let (ecl, mask) = read_format(m);
    if version.value() >= 7 {
        let mut bits = 0u32;
        for i in 0..18 {
            if m.get(size - 11 + i % 3, i / 3) {
                bits |= 1 << i;
            }
            assert_eq!(m.get(size - 11 + i % 3, i / 3), m.get(i / 3, size - 11 + i % 3));
        }
        assert_eq!(bits, version_bits(version), "version information");
    }

    let reserved = function_map(version);
    for y in 0..size {
        for x in 0..size {
            assert_eq!(reserved.get(x, y), m.is_reserved(x, y), "reserved map at ({x}, {y})");
        }
    }

    let codewords = read_codewords(m, &reserved, mask, version);
    let data = deinterleave(&codewords, version, ecl);
    let (text, kanji) = parse_segments(&data, version);
    Decoded {
        version,
        ecl,
        mask,
        text,
        kanji,
    }
}

fn read_format(m: &BitMatrix) -> (EcLevel, Mask) {
    let size = m.size();
    let mut first = 0u32;
    let mut second = 0u32;
    fn put(bits: &mut u32, i: usize, dark: bool) {
        if dark {
            *bits |= 1 << i;
        }
    }
    for i in 0..6 {
        put(&mut first, i, m.get(8, i));
    }
    put(&mut first, 6, m.get(8, 7));
    put(&mut first, 7, m.get(8, 8));
    put(&mut first, 8, m.get(7, 8));
    for i in 9..15 {
        put(&mut first, i, m.get(14 - i, 8));
    }
    for i in 0..8 {
        put(&mut second, i, m.get(size - 1 - i, 8));
    }
    for i in 8..15 {
        put(&mut second, i, m.get(8, size - 15 + i));
    }
    assert_eq!(first, second, "format copies differ");
    assert!(m.get(8, size - 8), "dark module");

    let data = (first ^ 0x5412) >> 10;
    let ecl = EcLevel::from_format_bits((data >> 3) as u8);
    let mask = Mask::new((data & 7) as u8);
    assert_eq!(first, format_bits(ecl, mask), "format BCH");
    (ecl, mask)
}

/// Function modules laid out from the standard's region table.
fn function_map(version: Version) -> BitMatrix {
    let size = version.size();
    let mut map = BitMatrix::new(size);
    for y in 0..size {
        for x in 0..size {
            let finder = (x < 9 && y < 9) || (x >= size - 8 && y < 9) || (x < 9 && y >= size - 8);
            let timing = x == 6 || y == 6;
            let version_area = version.value() >= 7
                && ((x >= size - 11 && x < size - 8 && y < 6)
                    || (y >= size - 11 && y < size - 8 && x < 6));
            if finder || timing || version_area {
                map.set(x, y, true, false);
            }
        }
    }
    let pos = version.alignment_pattern_positions();
    for &cx in &pos {
        for &cy in &pos {
            let corner = |a: usize, b: usize| {
                a == 6 && b == 6 || a == 6 && b == size - 7 || a == size - 7 && b == 6
            };
            if corner(cx, cy) {
                continue;
            }
            for y in cy - 2..=cy + 2 {
                for x in cx - 2..=cx + 2 {
                    map.set(x, y, true, false);
                }
            }
        }
    }
    map
}

fn read_codewords(m: &BitMatrix, reserved: &BitMatrix, mask: Mask, version: Version) -> Vec<u8> {
    let size = m.size();
    let mut bits: Vec<bool> = Vec::new();
    let mut right = size as isize - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let col = right as usize;
        let upward = (col + 1) & 2 == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for x in [col, col - 1] {
                if !reserved.get(x, y) {
                    bits.push(m.get(x, y) ^ mask.inverts(x, y));
                }
            }
        }
        right -= 2;
    }
    let total = version.total_codewords();
    assert!(bits.len() >= total * 8);
    assert!(bits[total * 8..].iter().all(|&b| !b), "remainder bits are light");
    bits[..total * 8]
        .chunks(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
        .collect()
}

fn deinterleave(codewords: &[u8], version: Version, ecl: EcLevel) -> Vec<u8> {
    let numblocks = version.num_blocks(ecl);
    let ecclen = version.ec_codewords_per_block(ecl);
    let raw = version.total_codewords();
    let numshort = numblocks - raw % numblocks;
    let shortdatalen = raw / numblocks - ecclen;

    let mut blocks: Vec<Vec<u8>> = vec![Vec::new(); numblocks];
    let mut it = codewords.iter().copied();
    for i in 0..=shortdatalen {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < shortdatalen || b >= numshort {
                block.push(it.next().unwrap());
            }
        }
    }
    let mut eccs: Vec<Vec<u8>> = vec![Vec::new(); numblocks];
    for _ in 0..ecclen {
        for ecc in eccs.iter_mut() {
            ecc.push(it.next().unwrap());
        }
    }
    assert!(it.next().is_none());

    let rs = ReedSolomonEncoder::new(ecclen);
    for (block, ecc) in blocks.iter().zip(&eccs) {
        assert_eq!(&rs.encode(block), ecc, "EC codewords");
    }
    blocks.concat()
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl BitReader<'_> {
    fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    fn read(&mut self, width: u8) -> u32 {
        let mut v = 0u32;
        for _ in 0..width {
            let bit = (self.data[self.pos >> 3] >> (7 - (self.pos & 7))) & 1;
            v = (v << 1) | u32::from(bit);
            self.pos += 1;
        }
        v
    }
}

fn parse_segments(data: &[u8], version: Version) -> (String, Vec<u16>) {
    let mut r = BitReader { data, pos: 0 };
    let mut bytes: Vec<u8> = Vec::new();
    let mut kanji: Vec<u16> = Vec::new();
    while r.remaining() >= 4 {
        let bits = r.read(4);
        if bits == 0 {
            break;
        }
        let mode = Mode::from_mode_bits(bits).unwrap_or_else(|| panic!("unknown mode {bits:#x}"));
        let count = r.read(mode.num_char_count_bits(version)) as usize;
        match mode {
            Mode::Numeric => {
                let mut left = count;
                while left > 0 {
                    let take = left.min(3);
                    let v = r.read([0, 4, 7, 10][take]);
                    bytes.extend(format!("{v:0take$}").bytes());
                    left -= take;
                }
            }
            Mode::Alphanumeric => {
                for _ in 0..count / 2 {
                    let v = r.read(11) as usize;
                    bytes.push(ALPHANUMERIC_CHARSET[v / 45]);
                    bytes.push(ALPHANUMERIC_CHARSET[v % 45]);
                }
                if count % 2 == 1 {
                    bytes.push(ALPHANUMERIC_CHARSET[r.read(6) as usize]);
                }
            }
            Mode::Byte => {
                for _ in 0..count {
                    bytes.push(r.read(8) as u8);
                }
            }
            Mode::Kanji => {
                for _ in 0..count {
                    let v = r.read(13) as u16;
                    let packed = ((v / 0xC0) << 8) | (v % 0xC0);
                    let code = if packed < 0x1F00 { packed + 0x8140 } else { packed + 0xC140 };
                    kanji.push(code);
                    bytes.extend("\u{FFFD}".bytes());
                }
            }
        }
    }

    // Whatever follows the terminator is padding.
    let pad_start = r.pos.div_ceil(8);
    for (i, &b) in data[pad_start.min(data.len())..].iter().enumerate() {
        assert_eq!(b, if i % 2 == 0 { 0xEC } else { 0x11 }, "pad codeword {i}");
    }
    (String::from_utf8(bytes).expect("decoded text is UTF-8"), kanji)
}
