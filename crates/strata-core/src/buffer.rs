//! Flat cell storage.
//!
//! [`DenseBuffer`] stores one value per cell. [`BitBuffer`] packs
//! booleans 64 to a word; its length is tracked in bits so the unused
//! tail of the last word never leaks into counts or comparisons.

use std::fmt;

/// Fixed-length storage for `len` cells of type `T`.
pub trait CellBuffer<T>: Clone + fmt::Debug + PartialEq + Send + Sync {
    /// Allocate `len` cells, all set to `value`.
    fn filled(len: usize, value: T) -> Self;

    /// Number of cells.
    fn len(&self) -> usize;

    /// Whether the buffer holds no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read cell `index`. Panics when out of range.
    fn get(&self, index: usize) -> T;

    /// Write cell `index`. Panics when out of range.
    fn set(&mut self, index: usize, value: T);

    /// Overwrite every cell.
    fn fill(&mut self, value: T);
}

/// One value per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseBuffer<T>(Vec<T>);

impl<T> DenseBuffer<T> {
    /// Cells as a slice, row-major.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> CellBuffer<T> for DenseBuffer<T>
where
    T: Copy + fmt::Debug + PartialEq + Send + Sync,
{
    fn filled(len: usize, value: T) -> Self {
        Self(vec![value; len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> T {
        self.0[index]
    }

    fn set(&mut self, index: usize, value: T) {
        self.0[index] = value;
    }

    fn fill(&mut self, value: T) {
        self.0.fill(value);
    }
}

/// Bit-packed boolean storage, `ceil(len / 64)` words.
#[derive(Clone, PartialEq, Eq)]
pub struct BitBuffer {
    words: Vec<u64>,
    len: usize,
}

impl BitBuffer {
    const WORD_BITS: usize = 64;

    fn word_count(len: usize) -> usize {
        len.div_ceil(Self::WORD_BITS)
    }

    /// Mask of the valid bits in the last word.
    fn tail_mask(&self) -> u64 {
        match self.len % Self::WORD_BITS {
            0 => u64::MAX,
            bits => (1u64 << bits) - 1,
        }
    }

    fn clear_tail(&mut self) {
        let mask = self.tail_mask();
        if let Some(last) = self.words.last_mut() {
            *last &= mask;
        }
    }

    /// Number of `true` cells.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Flip every cell.
    pub fn invert(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
        self.clear_tail();
    }

    /// Backing words, least significant bit first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitBuffer")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .finish()
    }
}

impl CellBuffer<bool> for BitBuffer {
    fn filled(len: usize, value: bool) -> Self {
        let word = if value { u64::MAX } else { 0 };
        let mut buf = Self {
            words: vec![word; Self::word_count(len)],
            len,
        };
        buf.clear_tail();
        buf
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        (self.words[index / Self::WORD_BITS] >> (index % Self::WORD_BITS)) & 1 == 1
    }

    fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        let word = &mut self.words[index / Self::WORD_BITS];
        let bit = 1u64 << (index % Self::WORD_BITS);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    fn fill(&mut self, value: bool) {
        let word = if value { u64::MAX } else { 0 };
        self.words.fill(word);
        self.clear_tail();
    }
}
