/// An append-only sequence of bits, packed MSB-first into bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    /// Number of bits written so far.
    pub fn len_bits(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `width` bits of `value`, most significant first.
    ///
    /// Bits of `value` above `width` are ignored.
    pub fn put(&mut self, value: u32, width: u8) {
        debug_assert!(width <= 32);
        for i in (0..width).rev() {
            self.put_bit((value >> i) & 1 != 0);
        }
    }

    pub fn put_bit(&mut self, bit: bool) {
        let index: usize = self.length >> 3;
        if index == self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[index] |= 0x80 >> (self.length & 7);
        }
        self.length += 1;
    }

    /// Returns the bit at position `i`.
    pub fn get(&self, i: usize) -> bool {
        i < self.length && (self.data[i >> 3] >> (7 - (i & 7))) & 1 != 0
    }

    /// The backing bytes; a trailing partial byte is zero-padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
