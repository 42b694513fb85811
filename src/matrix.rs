/// A square grid of modules plus a parallel bitmap of reserved (function) modules.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row, origin top-left.
/// Masking only ever touches modules that are not reserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    modules: Vec<bool>,
    reserved: Vec<bool>,
}

impl BitMatrix {
    /// Creates an all-light matrix with nothing reserved.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "BitMatrix size must be greater than 0");
        Self {
            size,
            modules: vec![false; size * size],
            reserved: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` for a dark module.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[self.index(x, y)]
    }

    /// Sets a module; `reserve` additionally marks it as a function module.
    pub fn set(&mut self, x: usize, y: usize, dark: bool, reserve: bool) {
        let i = self.index(x, y);
        self.modules[i] = dark;
        if reserve {
            self.reserved[i] = true;
        }
    }

    pub fn xor(&mut self, x: usize, y: usize, invert: bool) {
        let i = self.index(x, y);
        self.modules[i] ^= invert;
    }

    pub fn is_reserved(&self, x: usize, y: usize) -> bool {
        self.reserved[self.index(x, y)]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Module rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.size && y < self.size, "module ({x}, {y}) out of range");
        y * self.size + x
    }
}
