//! Fixed-width presence bitmap.
//!
//! A [BitSet] records one bit per declared field of a record. Bits are stored in [u8]
//! blocks, least significant bit first. Any bits in the last block that are beyond the
//! width of the set are always 0.
//!
//! # Format
//!
//! On the wire a bitset of width `n` occupies `ceil(n / 8)` bytes with the blocks in
//! reverse order: bit `i` lives in byte `len - 1 - i / 8` at position `i % 8`.
//!
//! ```text
//! width = 10, bits {0, 3, 9} set
//!
//! +----------+----------+
//! | 00000010 | 00001001 |
//! +----------+----------+
//!   bits 9-8   bits 7-0
//! ```

use core::fmt::{self, Formatter};

/// Type alias for the underlying block type.
type Block = u8;

/// Number of bits in a [Block].
const BITS_PER_BLOCK: usize = Block::BITS as usize;

/// Empty block of bits (all bits set to 0).
const EMPTY_BLOCK: Block = 0;

/// A fixed-width set of bits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// The underlying storage for the bits.
    storage: Vec<Block>,
    /// The total number of bits.
    num_bits: usize,
}

impl BitSet {
    /// Creates a new `BitSet` with `size` bits, all initialized to zero.
    #[inline]
    pub fn zeroes(size: usize) -> Self {
        Self {
            storage: vec![EMPTY_BLOCK; Self::num_blocks(size)],
            num_bits: size,
        }
    }

    /// Returns the number of bits in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_bits
    }

    /// Returns true if the set has a width of zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Returns the value of the bit at `index`.
    ///
    /// Bits beyond the width of the set are reported as 0.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.num_bits {
            return false;
        }
        self.storage[Self::block_index(index)] & Self::bit_mask(index) != 0
    }

    /// Sets the bit at `index` to 1.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.assert_index(index);
        self.storage[Self::block_index(index)] |= Self::bit_mask(index);
    }

    /// Sets the bit at `index` to 0.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.assert_index(index);
        self.storage[Self::block_index(index)] &= !Self::bit_mask(index);
    }

    /// Returns the number of bits set to 1.
    pub fn count_ones(&self) -> usize {
        self.storage.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Returns an iterator over the indices of all bits set to 1.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_bits).filter(move |&i| self.get(i))
    }

    /// Number of bytes occupied by a set of `size` bits on the wire.
    #[inline]
    pub fn encoded_len(size: usize) -> usize {
        Self::num_blocks(size)
    }

    /// Returns the wire representation of the set.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.storage.iter().rev().copied().collect()
    }

    /// Builds a set of width `size` from its wire representation.
    ///
    /// `bytes` must hold exactly [`BitSet::encoded_len`] bytes. Bits beyond `size` in the
    /// most significant byte are ignored, since a peer with a wider record may set them.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` has the wrong length.
    pub fn from_bytes(bytes: &[u8], size: usize) -> Self {
        assert_eq!(
            bytes.len(),
            Self::num_blocks(size),
            "bitset of {size} bits needs {} bytes",
            Self::num_blocks(size)
        );
        let mut result = Self {
            storage: bytes.iter().rev().copied().collect(),
            num_bits: size,
        };
        result.clear_trailing_bits();
        result
    }

    // ---------- Helper Functions ----------

    /// Clears any bits in storage beyond the last valid bit.
    fn clear_trailing_bits(&mut self) {
        let bit_offset = self.num_bits % BITS_PER_BLOCK;
        if bit_offset == 0 {
            return;
        }
        if let Some(last) = self.storage.last_mut() {
            *last &= (1 << bit_offset) - 1;
        }
    }

    #[inline]
    fn num_blocks(num_bits: usize) -> usize {
        num_bits.div_ceil(BITS_PER_BLOCK)
    }

    #[inline]
    fn block_index(index: usize) -> usize {
        index / BITS_PER_BLOCK
    }

    #[inline]
    fn bit_mask(index: usize) -> Block {
        1 << (index % BITS_PER_BLOCK)
    }

    #[inline]
    fn assert_index(&self, index: usize) {
        assert!(
            index < self.num_bits,
            "index {index} out of bounds for bitset of {} bits",
            self.num_bits
        );
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet[")?;
        for i in 0..self.num_bits {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        write!(f, "]")
    }
}
