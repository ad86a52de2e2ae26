/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bits::BitVec;
use crate::error::{BuildError, SerdeError};
use crate::rank_sel::SuccinctBitVec;
use crate::traits::serdes::*;
use crate::traits::*;
use derivative::Derivative;
use derive_setters::*;
use log::debug;
use mem_dbg::*;
use std::io::{Read, Write};

/**

A wavelet matrix over a sequence of symbols of at most
[`WaveletMatrix::MAX_BIT_WIDTH`] bits.

The matrix contains one bit vector per bit of the symbols, starting from the
most significant one. The first level contains the most significant bits of
the sequence; the sequence is then stably partitioned by that bit (zeros
first) and the next level contains the next bit of the partitioned sequence,
and so on. At each level we record the number of zeros, which is the
position at which the elements with a one start in the next level.

Following a position through the levels (_descending_) maps it to a
position in the final arrangement, in which all occurrences of a symbol are
contiguous. For each symbol `s` we precompute the descent of position zero
and the number of zeros skipped by it at the levels where `s` has a one, so
that [`rank`](WaveletMatrix::rank) and [`rank_lt`](WaveletMatrix::rank_lt)
need a single descent.

The type parameter `B` is the bit-vector backend, which must support
[access](BitAccess) and [ranking](Rank). If the backend supports also
[selection](Select) and [zero selection](SelectZero), the matrix provides
[`select_upwards`](WaveletMatrix::select_upwards).

```rust
use sufi::prelude::*;

let wm = WaveletMatrix::<SuccinctBitVec>::new(&[3, 1, 4, 1, 5, 2, 6]).unwrap();
assert_eq!(wm.get(2), 4);
assert_eq!(wm.rank(1, 4), 2);
assert_eq!(wm.rank_lt(4, 7), 4);
assert_eq!(wm.select(1, 1), Some(3));
assert_eq!(wm.select_upwards(5, 0), Some(4));
```

*/
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct WaveletMatrix<B = SuccinctBitVec> {
    /// One bit vector per level, most significant bit first.
    levels: Vec<B>,
    /// The number of zeros of each level.
    zero_counts: Vec<u32>,
    /// For each symbol, the descent of position zero.
    from_rank: Vec<u32>,
    /// For each symbol, the number of zeros before the descent of position
    /// zero, summed over the levels at which the symbol has a one.
    from_rank_lt: Vec<u32>,
    /// The positions of the occurrences of rank multiple of
    /// [`WaveletMatrix::SELECT_SAMPLE`] of each symbol, concatenated.
    select_samples: Vec<u32>,
    /// For each symbol, the start of its samples in `select_samples`, plus a
    /// final sentinel; empty if select samples are disabled.
    sample_offsets: Vec<u32>,
    bit_width: u32,
    max_symbol: u32,
    len: usize,
}

/// A builder for [`WaveletMatrix`].
///
/// ```rust
/// use sufi::prelude::*;
///
/// let wm: WaveletMatrix = WaveletMatrixBuilder::default()
///     .bit_width(8)
///     .select_samples(true)
///     .build(&[1, 200, 1, 3])
///     .unwrap();
/// assert_eq!(wm.bit_width(), 8);
/// assert_eq!(wm.select(1, 1), Some(2));
/// ```
#[derive(Setters, Debug, Clone, Derivative)]
#[derivative(Default)]
#[setters(generate = false)]
pub struct WaveletMatrixBuilder {
    /// The number of bits per symbol. If not set, the minimum width
    /// representing the largest symbol is used.
    #[setters(generate = true, strip_option)]
    #[derivative(Default(value = "None"))]
    bit_width: Option<u32>,

    /// Store the position of every [`WaveletMatrix::SELECT_SAMPLE`]-th
    /// occurrence of each symbol to speed up [`WaveletMatrix::select`].
    #[setters(generate = true)]
    select_samples: bool,
}

impl WaveletMatrixBuilder {
    /// Build a wavelet matrix on a sequence of symbols.
    pub fn build<B: TryFrom<BitVec, Error = BuildError> + BitAccess + Rank>(
        &self,
        symbols: &[u32],
    ) -> Result<WaveletMatrix<B>, BuildError> {
        let len = symbols.len();
        if len > u32::MAX as usize {
            return Err(BuildError::InputTooLarge(len));
        }
        let max_symbol = symbols.iter().copied().max().unwrap_or(0);
        let bit_width = match self.bit_width {
            Some(bit_width) => {
                if bit_width == 0 || bit_width > WaveletMatrix::<B>::MAX_BIT_WIDTH {
                    return Err(BuildError::BitWidth(bit_width));
                }
                if max_symbol >> bit_width != 0 {
                    return Err(BuildError::SymbolTooLarge {
                        symbol: max_symbol,
                        bit_width,
                    });
                }
                bit_width
            }
            None => {
                let bit_width = (u32::BITS - max_symbol.leading_zeros()).max(1);
                if bit_width > WaveletMatrix::<B>::MAX_BIT_WIDTH {
                    return Err(BuildError::BitWidth(bit_width));
                }
                bit_width
            }
        };

        let mut levels = Vec::with_capacity(bit_width as usize);
        let mut zero_counts = Vec::with_capacity(bit_width as usize);
        let mut current = symbols.to_vec();
        let mut ones = Vec::with_capacity(len);
        for level in 0..bit_width {
            let shift = bit_width - 1 - level;
            let mut bits = BitVec::new(len);
            let mut zeros = Vec::with_capacity(len);
            ones.clear();
            for (i, &symbol) in current.iter().enumerate() {
                if (symbol >> shift) & 1 != 0 {
                    bits.set(i, true);
                    ones.push(symbol);
                } else {
                    zeros.push(symbol);
                }
            }
            zero_counts.push(zeros.len() as u32);
            levels.push(B::try_from(bits)?);
            zeros.extend_from_slice(&ones);
            current = zeros;
        }

        let mut result = WaveletMatrix {
            levels,
            zero_counts,
            from_rank: vec![],
            from_rank_lt: vec![],
            select_samples: vec![],
            sample_offsets: vec![],
            bit_width,
            max_symbol,
            len,
        };
        (result.from_rank, result.from_rank_lt) = result.compute_from_ranks();

        if self.select_samples {
            let num_symbols = max_symbol as usize + 1;
            let mut counts = vec![0_u32; num_symbols];
            for &symbol in symbols {
                counts[symbol as usize] += 1;
            }
            let mut sample_offsets = Vec::with_capacity(num_symbols + 1);
            let mut offset = 0;
            for &count in &counts {
                sample_offsets.push(offset);
                offset += count.div_ceil(WaveletMatrix::<B>::SELECT_SAMPLE as u32);
            }
            sample_offsets.push(offset);

            let mut select_samples = vec![0; offset as usize];
            counts.iter_mut().for_each(|c| *c = 0);
            for (pos, &symbol) in symbols.iter().enumerate() {
                let s = symbol as usize;
                if counts[s] as usize % WaveletMatrix::<B>::SELECT_SAMPLE == 0 {
                    let k = counts[s] as usize / WaveletMatrix::<B>::SELECT_SAMPLE;
                    select_samples[sample_offsets[s] as usize + k] = pos as u32;
                }
                counts[s] += 1;
            }
            result.select_samples = select_samples;
            result.sample_offsets = sample_offsets;
        }

        debug!(
            "Built wavelet matrix on {} symbols ({} bits per symbol, largest symbol {}, {} select samples)",
            len,
            bit_width,
            max_symbol,
            result.select_samples.len()
        );

        Ok(result)
    }
}

impl<B: TryFrom<BitVec, Error = BuildError> + BitAccess + Rank> WaveletMatrix<B> {
    /// Build a wavelet matrix using the minimum bit width representing the
    /// largest symbol and no select samples.
    pub fn new(symbols: &[u32]) -> Result<Self, BuildError> {
        WaveletMatrixBuilder::default().build(symbols)
    }
}

impl<B> WaveletMatrix<B> {
    /// The maximum number of bits per symbol.
    pub const MAX_BIT_WIDTH: u32 = 24;
    /// The sampling rate of the optional select samples.
    pub const SELECT_SAMPLE: usize = 64;

    /// Return the number of symbols.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the number of bits per symbol (i.e., the number of levels).
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Return the largest symbol in the sequence (zero if the sequence is empty).
    pub fn max_symbol(&self) -> u32 {
        self.max_symbol
    }

    /// Return the bit vectors of the levels, most significant bit first.
    pub fn levels(&self) -> &[B] {
        &self.levels
    }

    /// Return the positions of the select samples of `symbol`, if select
    /// samples are present.
    fn samples(&self, symbol: u32) -> Option<&[u32]> {
        if self.sample_offsets.is_empty() {
            return None;
        }
        let s = symbol as usize;
        Some(
            &self.select_samples
                [self.sample_offsets[s] as usize..self.sample_offsets[s + 1] as usize],
        )
    }
}

impl<B: BitAccess + Rank> WaveletMatrix<B> {
    /// Map a position at the given level to the next level, following the
    /// given bit.
    #[inline(always)]
    fn step(&self, level: usize, pos: usize, bit: bool) -> usize {
        let ones = self.levels[level].rank(pos);
        if bit {
            self.zero_counts[level] as usize + ones
        } else {
            pos - ones
        }
    }

    /// Compute the descent of position zero of each symbol, and the sum of
    /// the zeros before it at the levels where the symbol has a one.
    fn compute_from_ranks(&self) -> (Vec<u32>, Vec<u32>) {
        let num_symbols = self.max_symbol as usize + 1;
        let mut from_rank = vec![0; num_symbols];
        let mut from_rank_lt = vec![0; num_symbols];
        self.fold_from_ranks(0, 0, 0, 0, &mut from_rank, &mut from_rank_lt);
        (from_rank, from_rank_lt)
    }

    fn fold_from_ranks(
        &self,
        level: u32,
        prefix: u32,
        pos: usize,
        lt: usize,
        from_rank: &mut [u32],
        from_rank_lt: &mut [u32],
    ) {
        if level == self.bit_width {
            from_rank[prefix as usize] = pos as u32;
            from_rank_lt[prefix as usize] = lt as u32;
            return;
        }
        let remaining = self.bit_width - level - 1;
        let zeros = pos - self.levels[level as usize].rank(pos);
        for bit in [false, true] {
            let child = (prefix << 1) | bit as u32;
            // The smallest symbol with this prefix
            if (child << remaining) > self.max_symbol {
                break;
            }
            let next = self.step(level as usize, pos, bit);
            let lt = if bit { lt + zeros } else { lt };
            self.fold_from_ranks(level + 1, child, next, lt, from_rank, from_rank_lt);
        }
    }

    /// Return the symbol at the given position.
    ///
    /// # Panics
    ///
    /// If `pos` is not smaller than the length.
    pub fn get(&self, pos: usize) -> u32 {
        if pos >= self.len {
            panic!("Index out of bounds: {} >= {}", pos, self.len);
        }
        let mut pos = pos;
        let mut symbol = 0;
        for level in 0..self.levels.len() {
            let bit = self.levels[level].get(pos);
            symbol = (symbol << 1) | bit as u32;
            pos = self.step(level, pos, bit);
        }
        symbol
    }

    /// Return the number of occurrences of `symbol` before `pos`.
    ///
    /// Positions past the end are clamped to the length, and symbols larger
    /// than the [largest symbol](WaveletMatrix::max_symbol) have rank zero.
    pub fn rank(&self, symbol: u32, pos: usize) -> usize {
        if symbol > self.max_symbol {
            return 0;
        }
        let mut pos = pos.min(self.len);
        for level in 0..self.levels.len() {
            let bit = (symbol >> (self.bit_width as usize - 1 - level)) & 1 != 0;
            pos = self.step(level, pos, bit);
        }
        pos - self.from_rank[symbol as usize] as usize
    }

    /// Return the number of symbols smaller than `symbol` before `pos`.
    pub fn rank_lt(&self, symbol: u32, pos: usize) -> usize {
        let mut pos = pos.min(self.len);
        if symbol > self.max_symbol {
            return pos;
        }
        let mut zeros = 0;
        for level in 0..self.levels.len() {
            let bit = (symbol >> (self.bit_width as usize - 1 - level)) & 1 != 0;
            let ones = self.levels[level].rank(pos);
            if bit {
                zeros += pos - ones;
                pos = self.zero_counts[level] as usize + ones;
            } else {
                pos -= ones;
            }
        }
        zeros - self.from_rank_lt[symbol as usize] as usize
    }

    /// Return the number of occurrences of `symbol`.
    pub fn count(&self, symbol: u32) -> usize {
        self.rank(symbol, self.len)
    }

    /// Return the position of the occurrence of given rank of `symbol`, or
    /// `None` if `rank` is not smaller than the number of occurrences.
    ///
    /// The position is found by a binary search on
    /// [`rank`](WaveletMatrix::rank), bracketed by select samples if present.
    pub fn select(&self, symbol: u32, rank: usize) -> Option<usize> {
        if rank >= self.count(symbol) {
            return None;
        }
        let (mut lo, mut hi) = match self.samples(symbol) {
            Some(samples) => {
                let k = rank / Self::SELECT_SAMPLE;
                (
                    samples[k] as usize,
                    samples.get(k + 1).map_or(self.len - 1, |&p| p as usize),
                )
            }
            None => (0, self.len - 1),
        };
        // The position we look for is the smallest one in [lo..=hi] with
        // more than `rank` occurrences up to it
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.rank(symbol, mid + 1) > rank {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Some(lo)
    }

    /// Return an iterator over the symbols.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(|pos| self.get(pos))
    }
}

impl<B: BitAccess + Rank + Select + SelectZero> WaveletMatrix<B> {
    /// Return the position of the occurrence of given rank of `symbol`, or
    /// `None` if `rank` is not smaller than the number of occurrences.
    ///
    /// This method walks back from the final arrangement to the first level
    /// using selection on the levels, and it is thus available only for
    /// backends supporting selection.
    pub fn select_upwards(&self, symbol: u32, rank: usize) -> Option<usize> {
        if rank >= self.count(symbol) {
            return None;
        }
        let mut pos = self.from_rank[symbol as usize] as usize + rank;
        for level in (0..self.levels.len()).rev() {
            let bit = (symbol >> (self.bit_width as usize - 1 - level)) & 1 != 0;
            pos = if bit {
                self.levels[level].select(pos - self.zero_counts[level] as usize)?
            } else {
                self.levels[level].select_zero(pos)?
            };
        }
        Some(pos)
    }
}

/// Layout: `max_symbol`, `bit_width` and `len` as `u64`, the `bit_width`
/// levels, the length-prefixed zero counts, `from_rank` and `from_rank_lt`
/// tables as `u32`, the number of symbols with select samples as `u64` (zero
/// if select samples are disabled) and, for each such symbol, the
/// length-prefixed sample positions as `u32`.
impl<B: Serialize> Serialize for WaveletMatrix<B> {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.max_symbol as u64)?;
        written += write_word(backend, self.bit_width as u64)?;
        written += write_word(backend, self.len as u64)?;
        for level in &self.levels {
            written += level.serialize(backend)?;
        }
        written += write_slice(backend, &self.zero_counts)?;
        written += write_slice(backend, &self.from_rank)?;
        written += write_slice(backend, &self.from_rank_lt)?;
        let num_sampled_symbols = self.sample_offsets.len().saturating_sub(1);
        written += write_word(backend, num_sampled_symbols as u64)?;
        for window in self.sample_offsets.windows(2) {
            written += write_slice(
                backend,
                &self.select_samples[window[0] as usize..window[1] as usize],
            )?;
        }
        Ok(written)
    }
}

impl<B: Deserialize + BitAccess + BitCount + Rank> Deserialize for WaveletMatrix<B> {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let max_symbol = read_word::<u64>(backend)?;
        let bit_width = read_word::<u64>(backend)?;
        let len = read_len(backend)?;
        ensure(bit_width >= 1 && bit_width <= Self::MAX_BIT_WIDTH as u64, || {
            format!("Invalid bit width {}", bit_width)
        })?;
        ensure(max_symbol >> bit_width == 0, || {
            format!("Symbol {} does not fit in {} bits", max_symbol, bit_width)
        })?;
        ensure(len <= u32::MAX as usize, || format!("Too many symbols: {}", len))?;
        let (max_symbol, bit_width) = (max_symbol as u32, bit_width as u32);

        let mut levels = Vec::with_capacity(bit_width as usize);
        for level in 0..bit_width {
            let bits = B::deserialize(backend)?;
            ensure(bits.len() == len, || {
                format!("Level {} has {} bits instead of {}", level, bits.len(), len)
            })?;
            levels.push(bits);
        }
        let zero_counts = read_vec::<u32>(backend)?;
        ensure(
            zero_counts.len() == bit_width as usize
                && zero_counts
                    .iter()
                    .zip(&levels)
                    .all(|(&z, level)| z as usize == level.count_zeros()),
            || "Zero counts do not match the levels".to_string(),
        )?;
        let from_rank = read_vec::<u32>(backend)?;
        let from_rank_lt = read_vec::<u32>(backend)?;

        let num_sampled_symbols = read_len(backend)?;
        ensure(
            num_sampled_symbols == 0 || num_sampled_symbols == max_symbol as usize + 1,
            || format!("Select samples for {} symbols", num_sampled_symbols),
        )?;
        let mut select_samples = vec![];
        let mut sample_offsets = vec![];
        for _ in 0..num_sampled_symbols {
            sample_offsets.push(select_samples.len() as u32);
            let samples = read_vec::<u32>(backend)?;
            ensure(
                samples.windows(2).all(|w| w[0] < w[1])
                    && samples.iter().all(|&p| (p as usize) < len),
                || "Invalid select samples".to_string(),
            )?;
            select_samples.extend(samples);
        }
        if num_sampled_symbols != 0 {
            sample_offsets.push(select_samples.len() as u32);
        }

        let mut result = Self {
            levels,
            zero_counts,
            from_rank: vec![],
            from_rank_lt: vec![],
            select_samples,
            sample_offsets,
            bit_width,
            max_symbol,
            len,
        };
        let (expected_from_rank, expected_from_rank_lt) = result.compute_from_ranks();
        ensure(
            from_rank == expected_from_rank && from_rank_lt == expected_from_rank_lt,
            || "Rank tables do not match the levels".to_string(),
        )?;
        result.from_rank = from_rank;
        result.from_rank_lt = from_rank_lt;
        for symbol in 0..num_sampled_symbols as u32 {
            let samples = result.samples(symbol).unwrap_or(&[]);
            ensure(
                samples.len() == result.count(symbol).div_ceil(Self::SELECT_SAMPLE),
                || format!("Wrong number of select samples for symbol {}", symbol),
            )?;
            // The k-th sample is the occurrence of rank k * SELECT_SAMPLE
            ensure(
                samples.iter().enumerate().all(|(k, &p)| {
                    result.get(p as usize) == symbol
                        && result.rank(symbol, p as usize) == k * Self::SELECT_SAMPLE
                }),
                || format!("Wrong select samples for symbol {}", symbol),
            )?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        // 5 = 101, 2 = 010, 7 = 111, 0 = 000
        let wm = WaveletMatrix::<SuccinctBitVec>::new(&[5, 2, 7, 0]).unwrap();
        assert_eq!(wm.bit_width(), 3);
        assert_eq!(wm.zero_counts, vec![2, 2, 2]);
        // Second level: [2, 0, 5, 7] -> 1, 0, 0, 1
        assert_eq!(wm.levels[1].to_bit_vec(), crate::bit_vec![1, 0, 0, 1]);
        // Third level: [0, 5, 2, 7] -> 0, 1, 0, 1
        assert_eq!(wm.levels[2].to_bit_vec(), crate::bit_vec![0, 1, 0, 1]);
        // Final arrangement: [0, 2, 5, 7]
        assert_eq!(wm.from_rank[0], 0);
        assert_eq!(wm.from_rank[2], 1);
        assert_eq!(wm.from_rank[5], 2);
        assert_eq!(wm.from_rank[7], 3);
    }

    #[test]
    fn test_bit_width_errors() {
        let builder = WaveletMatrixBuilder::default();
        assert_eq!(
            builder.clone().bit_width(2).build::<SuccinctBitVec>(&[4]),
            Err(BuildError::SymbolTooLarge {
                symbol: 4,
                bit_width: 2
            })
        );
        assert_eq!(
            builder.clone().bit_width(0).build::<SuccinctBitVec>(&[0]),
            Err(BuildError::BitWidth(0))
        );
        assert_eq!(
            builder.build::<SuccinctBitVec>(&[1 << 24]),
            Err(BuildError::BitWidth(25))
        );
    }

    #[test]
    fn test_empty() {
        let wm = WaveletMatrix::<SuccinctBitVec>::new(&[]).unwrap();
        assert!(wm.is_empty());
        assert_eq!(wm.bit_width(), 1);
        assert_eq!(wm.rank(0, 10), 0);
        assert_eq!(wm.rank_lt(1, 10), 0);
        assert_eq!(wm.select(0, 0), None);
    }

    #[test]
    fn test_sample_offsets() {
        let symbols = (0..1000).map(|i| (i % 3 == 0) as u32 * 2).collect::<Vec<_>>();
        let wm: WaveletMatrix = WaveletMatrixBuilder::default()
            .select_samples(true)
            .build(&symbols)
            .unwrap();
        // 334 twos, 666 zeros, no ones
        assert_eq!(wm.sample_offsets, vec![0, 11, 11, 17]);
        assert_eq!(wm.samples(2).unwrap()[1], 3 * 64);
    }
}
