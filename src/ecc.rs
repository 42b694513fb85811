//! Reed-Solomon error correction over GF(256) and codeword interleaving.

use crate::version::{EcLevel, Version};

/// Reducing polynomial x^8 + x^4 + x^3 + x^2 + 1.
const PRIMITIVE: u16 = 0x11D;

/// Antilog table, doubled so that `EXP[LOG[a] + LOG[b]]` needs no reduction.
static EXP: [u8; 512] = build_exp();
static LOG: [u8; 256] = build_log();

const fn build_exp() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    while i < 512 {
        table[i] = table[i - 255];
        i += 1;
    }
    table
}

const fn build_log() -> [u8; 256] {
    let exp = build_exp();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Product of two field elements.
pub(crate) fn multiply(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        0
    } else {
        EXP[usize::from(LOG[usize::from(x)]) + usize::from(LOG[usize::from(y)])]
    }
}

/// Computes EC codewords for data blocks with a fixed generator polynomial.
#[derive(Clone, Debug)]
pub struct ReedSolomonEncoder {
    // Generator coefficients, highest power first, leading 1 omitted.
    divisor: Vec<u8>,
}

impl ReedSolomonEncoder {
    /// Builds the generator (x - α^0)(x - α^1)...(x - α^(degree-1)).
    pub fn new(degree: usize) -> Self {
        let mut divisor = vec![0u8; degree];
        if let Some(last) = divisor.last_mut() {
            *last = 1;
        }
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = multiply(root, 0x02);
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Remainder of `data * x^degree` divided by the generator.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        if result.is_empty() {
            return result;
        }
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            if let Some(last) = result.last_mut() {
                *last = 0;
            }
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= multiply(y, factor);
            }
        }
        result
    }
}

/// Splits data codewords into blocks, appends EC codewords and interleaves.
///
/// Blocks come in two sizes: the first `numshortblocks` hold one data
/// codeword fewer than the rest. Data codewords are read out column-wise
/// across blocks (skipping the missing column in short blocks), followed
/// by EC codewords column-wise.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: EcLevel) -> Vec<u8> {
    assert_eq!(data.len(), ver.data_codewords(ecl), "Illegal argument");
    let numblocks: usize = ver.num_blocks(ecl);
    let blockecclen: usize = ver.ec_codewords_per_block(ecl);
    let rawcodewords: usize = ver.total_codewords();
    let numshortblocks: usize = numblocks - rawcodewords % numblocks;
    let shortblocklen: usize = rawcodewords / numblocks;
    let shortblockdatalen: usize = shortblocklen - blockecclen;

    let rs = ReedSolomonEncoder::new(blockecclen);
    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(numblocks);
    let mut rest: &[u8] = data;
    for i in 0..numblocks {
        let datlen: usize = shortblockdatalen + usize::from(i >= numshortblocks);
        let (dat, tail) = rest.split_at(datlen);
        blocks.push((dat, rs.encode(dat)));
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    let mut result: Vec<u8> = Vec::with_capacity(rawcodewords);
    for i in 0..=shortblockdatalen {
        for (dat, _) in &blocks {
            if let Some(&b) = dat.get(i) {
                result.push(b);
            }
        }
    }
    for i in 0..blockecclen {
        for (_, ecc) in &blocks {
            result.push(ecc[i]);
        }
    }
    debug_assert_eq!(result.len(), rawcodewords);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow_multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }

    #[test]
    fn test_tables_agree_with_bitwise_multiply() {
        for x in 0..=255u8 {
            for y in [0u8, 1, 2, 3, 0x1d, 0x53, 0x80, 0xca, 0xff] {
                assert_eq!(multiply(x, y), slow_multiply(x, y), "{x} * {y}");
            }
        }
    }

    #[test]
    fn test_hello_world_1m_ecc() {
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17];
        let rs = ReedSolomonEncoder::new(10);
        assert_eq!(rs.encode(&data), vec![196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn test_degree_zero_is_empty() {
        let rs = ReedSolomonEncoder::new(0);
        assert_eq!(rs.degree(), 0);
        assert!(rs.encode(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_codeword_is_divisible_by_generator() {
        // data || ecc is a multiple of the generator, so re-encoding it leaves no remainder.
        let rs = ReedSolomonEncoder::new(18);
        let data: Vec<u8> = (0..40u8).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();
        let mut codeword = data.clone();
        codeword.extend(rs.encode(&data));
        let mut rem = vec![0u8; 18];
        for &b in &codeword {
            let factor = b ^ rem[0];
            rem.rotate_left(1);
            rem[17] = 0;
            for (x, &y) in rem.iter_mut().zip(rs.divisor.iter()) {
                *x ^= multiply(y, factor);
            }
        }
        assert!(rem.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_interleave_orders_short_blocks_first() {
        // 5-Q: 2 blocks of 15 data codewords, then 2 blocks of 16.
        let ver = Version::new(5);
        let ecl = EcLevel::Quartile;
        let data: Vec<u8> = (0..62u8).collect();
        let out = add_ecc_and_interleave(&data, ver, ecl);
        assert_eq!(out.len(), 134);
        assert_eq!(&out[..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        // Column 15 only exists in the two long blocks.
        assert_eq!(&out[60..62], &[45, 61]);
        let rs = ReedSolomonEncoder::new(18);
        let first_ecc = rs.encode(&data[..15]);
        assert_eq!(out[62], first_ecc[0]);
        assert_eq!(out[66], first_ecc[1]);
    }

    #[test]
    fn test_single_block_is_data_then_ecc() {
        let ver = Version::new(1);
        let data: Vec<u8> =
            vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17];
        let out = add_ecc_and_interleave(&data, ver, EcLevel::Medium);
        assert_eq!(&out[..16], &data[..]);
        assert_eq!(&out[16..], &[196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }
}
