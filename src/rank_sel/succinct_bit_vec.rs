/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::BitVec;
use crate::error::{BuildError, SerdeError};
use crate::traits::serdes::*;
use crate::traits::*;
use crate::utils::select_in_word;
use log::debug;
use mem_dbg::*;
use std::io::{Read, Write};

/**

An immutable bit vector with constant-time ranking and logarithmic-time
selection.

The bits are divided into blocks of 256 bits (four words). For each block we
store a single `u64` of counts:

- the lower 40 bits contain the number of ones before the block;
- the three upper bytes contain the number of ones in the first one, two and
  three words of the block, respectively.

Ranking thus needs one access to the counts and one to the bits. For
selection, two sampling tables (one for ones and one for zeros) record, for
each multiple of [`SuccinctBitVec::SELECT_SAMPLE`], the block containing the
bit of that rank. Selection searches for the block by binary search within
the blocks bracketed by the sampling table, then finds the word scanning the
intra-block counts, and finally completes the search with
[`select_in_word`].

Since the number of ones before a block is stored in 40 bits, the maximum
length is [`SuccinctBitVec::MAX_LEN`].

```rust
use sufi::prelude::*;

let bits = SuccinctBitVec::new(bit_vec![0, 1, 1, 0, 1]).unwrap();
assert_eq!(bits.rank(3), 2);
assert_eq!(bits.rank_zero(3), 1);
assert_eq!(bits.select(2), Some(4));
assert_eq!(bits.select_zero(1), Some(3));
assert_eq!(bits.select(3), None);
```

*/
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct SuccinctBitVec {
    /// The bits, padded with zeros to a multiple of the block size.
    bits: Vec<u64>,
    /// The packed counts, one per block.
    counts: Vec<u64>,
    len: usize,
    num_ones: usize,
    /// For each multiple of `SELECT_SAMPLE`, the block containing the one of that rank.
    select_ones: Vec<u32>,
    /// For each multiple of `SELECT_SAMPLE`, the block containing the zero of that rank.
    select_zeros: Vec<u32>,
}

const WORD_BITS: usize = u64::BITS as usize;
const RANK_MASK: u64 = (1 << 40) - 1;

impl SuccinctBitVec {
    pub const WORDS_PER_BLOCK: usize = 4;
    pub const BLOCK_BITS: usize = Self::WORDS_PER_BLOCK * WORD_BITS;
    pub const SELECT_SAMPLE: usize = 1024;
    /// The maximum number of bits.
    pub const MAX_LEN: usize = 1 << 40;

    /// Create a new rank/select structure from a bit vector.
    pub fn new(bits: BitVec) -> Result<Self, BuildError> {
        let (mut data, len) = bits.into_raw_parts();
        if len > Self::MAX_LEN {
            return Err(BuildError::TooManyBits(len));
        }

        let num_blocks = len.div_ceil(Self::BLOCK_BITS);
        data.resize(num_blocks * Self::WORDS_PER_BLOCK, 0);

        let mut counts = Vec::with_capacity(num_blocks);
        let mut num_ones = 0_u64;
        for block in data.chunks_exact(Self::WORDS_PER_BLOCK) {
            let mut packed = num_ones;
            let mut ones_in_block = 0_u64;
            for (k, word) in block.iter().enumerate() {
                if k != 0 {
                    packed |= ones_in_block << (32 + 8 * k);
                }
                ones_in_block += word.count_ones() as u64;
            }
            counts.push(packed);
            num_ones += ones_in_block;
        }

        let mut result = Self {
            bits: data,
            counts,
            len,
            num_ones: num_ones as usize,
            select_ones: vec![],
            select_zeros: vec![],
        };
        result.build_select_samples();

        debug!(
            "Built rank/select structure on {} bits ({} ones, {} blocks, {}+{} select samples)",
            len,
            result.num_ones,
            num_blocks,
            result.select_ones.len(),
            result.select_zeros.len()
        );

        Ok(result)
    }

    fn build_select_samples(&mut self) {
        let mut select_ones = Vec::with_capacity(self.num_ones.div_ceil(Self::SELECT_SAMPLE));
        let mut select_zeros =
            Vec::with_capacity((self.len - self.num_ones).div_ceil(Self::SELECT_SAMPLE));
        let mut next_one = 0;
        let mut next_zero = 0;
        for block in 0..self.counts.len() {
            let ones_before = self.ones_before(block);
            let zeros_before = block * Self::BLOCK_BITS - ones_before;
            let block_len = Self::BLOCK_BITS.min(self.len - block * Self::BLOCK_BITS);
            let ones = self.ones_before(block + 1) - ones_before;
            let zeros = block_len - ones;

            while next_one < ones_before + ones {
                select_ones.push(block as u32);
                next_one += Self::SELECT_SAMPLE;
            }
            while next_zero < zeros_before + zeros {
                select_zeros.push(block as u32);
                next_zero += Self::SELECT_SAMPLE;
            }
        }
        self.select_ones = select_ones;
        self.select_zeros = select_zeros;
    }

    /// Return the number of ones before the given block (which might be
    /// the number of blocks).
    #[inline(always)]
    fn ones_before(&self, block: usize) -> usize {
        if block == self.counts.len() {
            self.num_ones
        } else {
            (self.counts[block] & RANK_MASK) as usize
        }
    }

    /// Return the number of ones in the first `k` words of the given block.
    #[inline(always)]
    fn ones_in_words(&self, block: usize, k: usize) -> usize {
        if k == 0 {
            0
        } else {
            ((self.counts[block] >> (32 + 8 * k)) & 0xFF) as usize
        }
    }

    /// Return the number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.counts.len()
    }

    /// Return a copy of the underlying bits as a [`BitVec`].
    pub fn to_bit_vec(&self) -> BitVec {
        BitVec::from_raw_parts(self.bits.clone(), self.len)
    }

    /// Consume this structure and return the underlying [`BitVec`].
    pub fn into_bit_vec(self) -> BitVec {
        BitVec::from_raw_parts(self.bits, self.len)
    }

    /// Find the block containing the bit of given rank, given the sampling
    /// table for the bit value and a function returning the number of such
    /// bits before a block.
    #[inline(always)]
    fn find_block(&self, rank: usize, samples: &[u32], before: impl Fn(usize) -> usize) -> usize {
        let k = rank / Self::SELECT_SAMPLE;
        let mut lo = samples[k] as usize;
        let mut hi = match samples.get(k + 1) {
            Some(&block) => block as usize,
            None => self.counts.len() - 1,
        };
        // Invariant: before(lo) <= rank, and the block we look for is in [lo..=hi]
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if before(mid) <= rank {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }
}

impl TryFrom<BitVec> for SuccinctBitVec {
    type Error = BuildError;

    fn try_from(bits: BitVec) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl BitLength for SuccinctBitVec {
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl BitCount for SuccinctBitVec {
    #[inline(always)]
    fn count_ones(&self) -> usize {
        self.num_ones
    }
}

impl BitAccess for SuccinctBitVec {
    #[inline(always)]
    unsafe fn get_unchecked(&self, pos: usize) -> bool {
        (self.bits.get_unchecked(pos / WORD_BITS) >> (pos % WORD_BITS)) & 1 != 0
    }
}

impl Rank for SuccinctBitVec {
    #[inline(always)]
    unsafe fn rank_unchecked(&self, pos: usize) -> usize {
        if pos >= self.len {
            return self.num_ones;
        }
        let block = pos / Self::BLOCK_BITS;
        let word = pos / WORD_BITS;
        let offset = pos % WORD_BITS;
        let word_rank = (self.bits.get_unchecked(word) & ((1 << offset) - 1)).count_ones();
        self.ones_before(block)
            + self.ones_in_words(block, word % Self::WORDS_PER_BLOCK)
            + word_rank as usize
    }
}

impl RankZero for SuccinctBitVec {}

impl Select for SuccinctBitVec {
    unsafe fn select_unchecked(&self, rank: usize) -> usize {
        let block = self.find_block(rank, &self.select_ones, |b| self.ones_before(b));
        let mut residual = rank - self.ones_before(block);
        let mut k = 0;
        while k < Self::WORDS_PER_BLOCK - 1 && self.ones_in_words(block, k + 1) <= residual {
            k += 1;
        }
        residual -= self.ones_in_words(block, k);
        let word = block * Self::WORDS_PER_BLOCK + k;
        word * WORD_BITS + select_in_word(*self.bits.get_unchecked(word), residual)
    }
}

impl SelectZero for SuccinctBitVec {
    unsafe fn select_zero_unchecked(&self, rank: usize) -> usize {
        let zeros_before = |b: usize| b * Self::BLOCK_BITS - self.ones_before(b);
        let block = self.find_block(rank, &self.select_zeros, zeros_before);
        let mut residual = rank - zeros_before(block);
        let zeros_in_words = |k: usize| k * WORD_BITS - self.ones_in_words(block, k);
        let mut k = 0;
        while k < Self::WORDS_PER_BLOCK - 1 && zeros_in_words(k + 1) <= residual {
            k += 1;
        }
        residual -= zeros_in_words(k);
        let word = block * Self::WORDS_PER_BLOCK + k;
        word * WORD_BITS + select_in_word(!*self.bits.get_unchecked(word), residual)
    }
}

/// Layout: `len`, `num_zeros`, `num_ones` and the number of blocks as `u64`,
/// followed by one record per block made of the four words of the block and
/// the packed counts. Selection samples are rebuilt when deserializing.
impl Serialize for SuccinctBitVec {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.len as u64)?;
        written += write_word(backend, (self.len - self.num_ones) as u64)?;
        written += write_word(backend, self.num_ones as u64)?;
        written += write_word(backend, self.counts.len() as u64)?;
        for (block, &count) in self.bits.chunks_exact(Self::WORDS_PER_BLOCK).zip(&self.counts) {
            for &word in block {
                written += write_word(backend, word)?;
            }
            written += write_word(backend, count)?;
        }
        Ok(written)
    }
}

impl Deserialize for SuccinctBitVec {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let len = read_len(backend)?;
        let num_zeros = read_len(backend)?;
        let num_ones = read_len(backend)?;
        let num_blocks = read_len(backend)?;
        ensure(len <= Self::MAX_LEN, || format!("Too many bits: {}", len))?;
        ensure(num_zeros.checked_add(num_ones) == Some(len), || {
            format!("{} zeros and {} ones do not add up to {} bits", num_zeros, num_ones, len)
        })?;
        ensure(num_blocks == len.div_ceil(Self::BLOCK_BITS), || {
            format!("{} blocks cannot contain {} bits", num_blocks, len)
        })?;

        let mut bits = Vec::with_capacity(num_blocks.min(1 << 16) * Self::WORDS_PER_BLOCK);
        let mut counts = Vec::with_capacity(num_blocks.min(1 << 16));
        for _ in 0..num_blocks {
            for _ in 0..Self::WORDS_PER_BLOCK {
                bits.push(read_word::<u64>(backend)?);
            }
            counts.push(read_word::<u64>(backend)?);
        }

        // Padding must be zero, so that rebuilding gives back the same counts
        let padding_start = len.div_ceil(WORD_BITS);
        ensure(
            BitVec::from_raw_parts(bits.clone(), len).as_ref() == &bits[..padding_start]
                && bits[padding_start..].iter().all(|&w| w == 0),
            || "Nonzero padding bits".to_string(),
        )?;

        let result = Self::new(BitVec::from_raw_parts(bits, len))
            .map_err(|e| SerdeError::Malformed(e.to_string()))?;
        ensure(result.counts == counts && result.num_ones == num_ones, || {
            "Rank counts do not match the bits".to_string()
        })?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_counts() {
        let mut bits = BitVec::new(600);
        for i in [0, 1, 64, 65, 66, 128, 255, 256, 599] {
            bits.set(i, true);
        }
        let sbv = SuccinctBitVec::new(bits).unwrap();
        assert_eq!(sbv.num_blocks(), 3);
        assert_eq!(sbv.ones_before(0), 0);
        assert_eq!(sbv.ones_in_words(0, 1), 2);
        assert_eq!(sbv.ones_in_words(0, 2), 5);
        assert_eq!(sbv.ones_in_words(0, 3), 6);
        assert_eq!(sbv.ones_before(1), 7);
        assert_eq!(sbv.ones_before(2), 8);
        assert_eq!(sbv.ones_before(3), 9);
    }

    #[test]
    fn test_zeros_in_last_block() {
        // Padding zeros must not be sampled nor selected
        let sbv = SuccinctBitVec::new(BitVec::with_value(300, true)).unwrap();
        assert_eq!(sbv.count_zeros(), 0);
        assert!(sbv.select_zeros.is_empty());
        assert_eq!(sbv.select_zero(0), None);
        assert_eq!(sbv.select(299), Some(299));
    }

    #[test]
    fn test_select_samples() {
        let sbv = SuccinctBitVec::new(BitVec::with_value(5000, true)).unwrap();
        assert_eq!(sbv.select_ones, vec![0, 4, 8, 12, 16]);
    }
}
