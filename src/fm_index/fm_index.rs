/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::sais::suffix_array;
use super::{Frequency, Symbol};
use crate::bits::BitVec;
use crate::error::{BuildError, SerdeError};
use crate::rank_sel::SuccinctBitVec;
use crate::traits::serdes::*;
use crate::traits::*;
use crate::utils::bit_width_for;
use crate::wavelet::{WaveletMatrix, WaveletMatrixBuilder};
use derivative::Derivative;
use derive_setters::*;
use dsi_progress_logger::*;
use log::info;
use mem_dbg::*;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::ops::Range;

/**

An FM-index over a sequence of [symbols](Symbol).

Symbols are mapped to dense codes starting from one, either by adding one
to their value or by a [frequency table](Frequency), and a terminator with
code zero is appended, obtaining the _augmented_ sequence. The index stores
the Burrows–Wheeler transform of the augmented sequence in a [wavelet
matrix](WaveletMatrix), the cumulative code frequencies, and the values of
the suffix array that are multiples of a sampling rate (the _skip_).

The rows of the Burrows–Wheeler transform are the sorted suffixes of the
augmented sequence: row zero is always the suffix made of the terminator
alone, which starts at position [`text_len`](FmIndex::text_len).

```rust
use sufi::prelude::*;

let text = b"abracatabra";
let fm = FmIndex::<u8>::new(text).unwrap();
assert_eq!(fm.count(b"abra"), 2);
assert_eq!(fm.locate_pattern(b"abra"), vec![0, 7]);
assert_eq!(fm.count(b"zzz"), 0);
assert_eq!(fm.get_prev_string(0, fm.text_len()), text.to_vec());
assert_eq!(fm.extract(4, 3), b"cat".to_vec());
```

*/
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct FmIndex<T: Symbol, B = SuccinctBitVec> {
    /// `cf[c]` is the number of codes smaller than `c` in the augmented
    /// sequence; the last element is its length.
    cf: Vec<u32>,
    bwt: WaveletMatrix<B>,
    /// The sampled suffix-array values, in row order.
    sampled_sa: Vec<u32>,
    /// The rows containing a sampled suffix-array value.
    sampled_positions: SuccinctBitVec,
    /// The row of each sampled position, indexed by position divided by skip.
    sampled_isa: Vec<u32>,
    skip: u32,
    /// Present if and only if the alphabet has been remapped.
    frequency: Option<Frequency>,
    _marker: PhantomData<T>,
}

/// A builder for [`FmIndex`].
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sufi::prelude::*;
/// use dsi_progress_logger::no_logging;
///
/// let fm: FmIndex<u16> = FmIndexBuilder::default()
///     .skip(4)
///     .remap(false)
///     .build(&[1000, 3, 1000, 3, 7], no_logging![])?;
/// assert_eq!(fm.locate_pattern(&[1000, 3]), vec![0, 2]);
/// assert!(fm.frequency().is_none());
/// #     Ok(())
/// # }
/// ```
#[derive(Setters, Debug, Clone, Derivative)]
#[derivative(Default)]
#[setters(generate = false)]
pub struct FmIndexBuilder {
    /// The sampling rate of the suffix array. Smaller values make
    /// [locating](FmIndex::locate) faster at the cost of more space. The
    /// default is 32.
    #[setters(generate = true)]
    #[derivative(Default(value = "32"))]
    skip: u32,

    /// Whether to remap the alphabet to dense codes by decreasing frequency.
    /// If not set, alphabets of byte symbols are not remapped, and all
    /// others are.
    #[setters(generate = true, strip_option)]
    #[derivative(Default(value = "None"))]
    remap: Option<bool>,

    /// Add [select samples](WaveletMatrixBuilder::select_samples) to the
    /// wavelet matrix.
    #[setters(generate = true)]
    select_samples: bool,
}

impl FmIndexBuilder {
    /// Build an FM-index on a sequence of symbols.
    pub fn build<T: Symbol, B: TryFrom<BitVec, Error = BuildError> + BitAccess + Rank>(
        &self,
        sequence: &[T],
        pl: &mut impl ProgressLog,
    ) -> Result<FmIndex<T, B>, BuildError> {
        if self.skip == 0 {
            return Err(BuildError::InvalidSkip);
        }
        let n = sequence.len() + 1;
        if n >= u32::MAX as usize {
            return Err(BuildError::InputTooLarge(n));
        }

        let remap = self.remap.unwrap_or(T::REMAP);
        let (mut augmented, frequency, alphabet_size) = if remap {
            let frequency = Frequency::new(sequence.iter().map(|s| s.to_u32()));
            let augmented = sequence
                .iter()
                .map(|s| frequency.index(s.to_u32()).unwrap_or(0))
                .collect::<Vec<_>>();
            let alphabet_size = frequency.len() as u64 + 1;
            (augmented, Some(frequency), alphabet_size)
        } else {
            let max = sequence.iter().map(|s| s.to_u32()).max();
            let alphabet_size = max.map_or(1, |m| m as u64 + 2);
            let bit_width = bit_width_for(alphabet_size);
            if bit_width > WaveletMatrix::<B>::MAX_BIT_WIDTH {
                return Err(BuildError::BitWidth(bit_width));
            }
            let augmented = sequence
                .iter()
                .map(|s| s.to_u32() + 1)
                .collect::<Vec<_>>();
            (augmented, None, alphabet_size)
        };
        augmented.push(0);
        let bit_width = bit_width_for(alphabet_size);
        let alphabet_size = alphabet_size as usize;

        pl.item_name("symbol");
        pl.expected_updates(Some(n));
        pl.start(format!(
            "Computing the suffix array of {} symbols (alphabet size {})...",
            n, alphabet_size
        ));
        let sa = suffix_array(&augmented, alphabet_size)?;
        pl.done_with_count(n);

        pl.start("Computing the Burrows–Wheeler transform...");
        let bwt = sa
            .iter()
            .map(|&p| {
                if p == 0 {
                    augmented[n - 1]
                } else {
                    augmented[p as usize - 1]
                }
            })
            .collect::<Vec<_>>();

        let mut cf = vec![0_u32; alphabet_size + 1];
        for &c in &augmented {
            cf[c as usize + 1] += 1;
        }
        for c in 1..cf.len() {
            cf[c] += cf[c - 1];
        }
        pl.done_with_count(n);

        pl.start("Building the wavelet matrix...");
        let wm = WaveletMatrixBuilder::default()
            .bit_width(bit_width)
            .select_samples(self.select_samples)
            .build::<B>(&bwt)?;
        drop(bwt);
        pl.done_with_count(n);

        pl.start("Sampling the suffix array...");
        let skip = self.skip as usize;
        let mut positions = BitVec::new(n);
        let mut sampled_sa = Vec::with_capacity((n - 1) / skip + 1);
        let mut sampled_isa = vec![0; (n - 1) / skip + 1];
        for (row, &p) in sa.iter().enumerate() {
            if p as usize % skip == 0 {
                positions.set(row, true);
                sampled_sa.push(p);
                sampled_isa[p as usize / skip] = row as u32;
            }
        }
        let sampled_positions = SuccinctBitVec::new(positions)?;
        pl.done_with_count(n);

        let result = FmIndex {
            cf,
            bwt: wm,
            sampled_sa,
            sampled_positions,
            sampled_isa,
            skip: self.skip,
            frequency,
            _marker: PhantomData,
        };

        info!(
            "Built FM-index on {} symbols: alphabet size {}, {} bits per symbol, {} suffix-array samples",
            n - 1,
            alphabet_size,
            bit_width,
            result.sampled_sa.len()
        );

        Ok(result)
    }
}

/// Compute the rows of the sampled positions, indexed by position divided
/// by `skip`, or `None` if some multiple of `skip` smaller than `n` has no
/// sample or more than one.
///
/// The `k`-th sample is in the row of the `k`-th one of `sampled_positions`.
fn inverse_samples(
    sampled_sa: &[u32],
    sampled_positions: &SuccinctBitVec,
    skip: u32,
    n: usize,
) -> Option<Vec<u32>> {
    let skip = skip as usize;
    let num_samples = (n - 1) / skip + 1;
    if sampled_sa.len() != num_samples {
        return None;
    }
    let mut sampled_isa = vec![u32::MAX; num_samples];
    for (k, &p) in sampled_sa.iter().enumerate() {
        let p = p as usize;
        if p >= n || p % skip != 0 || sampled_isa[p / skip] != u32::MAX {
            return None;
        }
        sampled_isa[p / skip] = sampled_positions.select(k)? as u32;
    }
    Some(sampled_isa)
}

impl<T: Symbol, B: TryFrom<BitVec, Error = BuildError> + BitAccess + Rank> FmIndex<T, B> {
    /// Build an FM-index with default [parameters](FmIndexBuilder) and no
    /// logging.
    pub fn new(sequence: &[T]) -> Result<Self, BuildError> {
        FmIndexBuilder::default().build(sequence, no_logging![])
    }
}

impl<T: Symbol, B> FmIndex<T, B> {
    /// Return the length of the augmented sequence, which is also the
    /// number of rows.
    pub fn len(&self) -> usize {
        self.bwt.len()
    }

    /// Return whether the indexed sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.text_len() == 0
    }

    /// Return the length of the indexed sequence.
    pub fn text_len(&self) -> usize {
        self.bwt.len() - 1
    }

    /// Return the size of the alphabet of codes, including the terminator.
    pub fn alphabet_size(&self) -> usize {
        self.cf.len() - 1
    }

    /// Return the suffix-array sampling rate.
    pub fn skip(&self) -> u32 {
        self.skip
    }

    /// Return the frequency table, if the alphabet has been remapped.
    pub fn frequency(&self) -> Option<&Frequency> {
        self.frequency.as_ref()
    }

    /// Return the wavelet matrix containing the Burrows–Wheeler transform.
    pub fn bwt(&self) -> &WaveletMatrix<B> {
        &self.bwt
    }

    /// Return the code of a symbol, or `None` if the symbol does not appear.
    fn encode(&self, symbol: T) -> Option<u32> {
        let code = match &self.frequency {
            Some(frequency) => frequency.index(symbol.to_u32())?,
            None => symbol.to_u32().checked_add(1)?,
        };
        let c = code as usize;
        (c < self.alphabet_size() && self.cf[c] < self.cf[c + 1]).then_some(code)
    }

    fn decode(&self, code: u32) -> T {
        match &self.frequency {
            // Codes come from the wavelet matrix, so they have an index
            Some(frequency) => T::from_u32(frequency.symbol(code).unwrap_or(0)),
            None => T::from_u32(code - 1),
        }
    }
}

impl<T: Symbol, B: BitAccess + Rank> FmIndex<T, B> {
    /// Map a row to the row of the preceding text position, returning also
    /// the code in the row.
    #[inline(always)]
    fn lf(&self, row: usize) -> (u32, usize) {
        let c = self.bwt.get(row);
        (c, self.cf[c as usize] as usize + self.bwt.rank(c, row))
    }

    /// Return the range of rows whose suffixes start with `pattern`, or
    /// `None` if there are no such rows.
    ///
    /// The empty pattern matches all rows.
    pub fn get_range(&self, pattern: &[T]) -> Option<Range<usize>> {
        let mut begin = 0;
        let mut end = self.len();
        for &symbol in pattern.iter().rev() {
            let c = self.encode(symbol)?;
            let base = self.cf[c as usize] as usize;
            begin = base + self.bwt.rank(c, begin);
            end = base + self.bwt.rank(c, end);
            if begin >= end {
                return None;
            }
        }
        Some(begin..end)
    }

    /// Same as [`get_range`](FmIndex::get_range).
    #[inline(always)]
    pub fn search(&self, pattern: &[T]) -> Option<Range<usize>> {
        self.get_range(pattern)
    }

    /// Return the number of occurrences of `pattern`.
    pub fn count(&self, pattern: &[T]) -> usize {
        self.get_range(pattern).map_or(0, |range| range.len())
    }

    /// Return the position in the augmented sequence of the suffix of given row.
    ///
    /// # Panics
    ///
    /// If `row` is not smaller than the [number of rows](FmIndex::len).
    pub fn convert_position(&self, row: usize) -> usize {
        let mut row = row;
        let mut steps = 0;
        while !self.sampled_positions.get(row) {
            row = self.lf(row).1;
            steps += 1;
        }
        self.sampled_sa[self.sampled_positions.rank(row)] as usize + steps
    }

    /// Return an iterator over the positions of the suffixes in a range of rows.
    pub fn locate(&self, rows: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        rows.map(|row| self.convert_position(row))
    }

    /// Return the sorted positions of the occurrences of `pattern`.
    pub fn locate_pattern(&self, pattern: &[T]) -> Vec<usize> {
        let mut positions = match self.get_range(pattern) {
            Some(range) => self.locate(range).collect::<Vec<_>>(),
            None => vec![],
        };
        positions.sort_unstable();
        positions
    }

    /// Return the (at most) `len` symbols preceding the suffix of given row.
    ///
    /// The result is shorter than `len` if the start of the sequence is
    /// reached. In particular, `get_prev_string(0, text_len())` returns the
    /// indexed sequence.
    ///
    /// # Panics
    ///
    /// If `row` is not smaller than the [number of rows](FmIndex::len).
    pub fn get_prev_string(&self, row: usize, len: usize) -> Vec<T> {
        if row >= self.len() {
            panic!("Row out of bounds: {} >= {}", row, self.len());
        }
        let mut result = Vec::with_capacity(len.min(self.text_len()));
        let mut row = row;
        for _ in 0..len {
            let (c, next) = self.lf(row);
            if c == 0 {
                break;
            }
            result.push(self.decode(c));
            row = next;
        }
        result.reverse();
        result
    }

    /// Return the (at most) `len` symbols of the indexed sequence starting
    /// at `position`.
    ///
    /// Extraction starts from the row of the first sampled position
    /// following the requested range, so it needs at most `len` + `skip`
    /// steps.
    pub fn extract(&self, position: usize, len: usize) -> Vec<T> {
        let text_len = self.text_len();
        if position >= text_len || len == 0 {
            return vec![];
        }
        let end = position.saturating_add(len).min(text_len);
        let skip = self.skip as usize;
        let sampled = end.div_ceil(skip) * skip;
        let (start, row) = if sampled >= text_len {
            (text_len, 0)
        } else {
            (sampled, self.sampled_isa[sampled / skip] as usize)
        };
        let mut result = self.get_prev_string(row, start - position);
        result.truncate(end - position);
        result
    }

    /// Return the indexed sequence.
    pub fn text(&self) -> Vec<T> {
        self.get_prev_string(0, self.text_len())
    }
}

/// Layout: `skip` as an `i32`, the length-prefixed `cf` array as `u32`, the
/// wavelet matrix, the length-prefixed suffix-array samples as `u32`, the
/// sampled rows, a `u8` that is one if the alphabet has been remapped, and
/// in that case the frequency table.
///
/// Deserialization follows the LF mapping from row zero through the whole
/// sequence, so a transform that is not the Burrows–Wheeler transform of
/// some sequence, or samples that disagree with it, are rejected in linear
/// time.
impl<T: Symbol, B: Serialize> Serialize for FmIndex<T, B> {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.skip as i32)?;
        written += write_slice(backend, &self.cf)?;
        written += self.bwt.serialize(backend)?;
        written += write_slice(backend, &self.sampled_sa)?;
        written += self.sampled_positions.serialize(backend)?;
        written += write_word(backend, self.frequency.is_some() as u8)?;
        if let Some(frequency) = &self.frequency {
            written += frequency.serialize(backend)?;
        }
        Ok(written)
    }
}

impl<T: Symbol, B: Deserialize + BitAccess + BitCount + Rank> Deserialize for FmIndex<T, B> {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let skip = read_word::<i32>(backend)?;
        ensure(skip > 0, || format!("Invalid skip {}", skip))?;
        let skip = skip as u32;
        let cf = read_vec::<u32>(backend)?;
        let bwt = WaveletMatrix::<B>::deserialize(backend)?;
        let sampled_sa = read_vec::<u32>(backend)?;
        let sampled_positions = SuccinctBitVec::deserialize(backend)?;
        let remapped = read_word::<u8>(backend)?;
        ensure(remapped <= 1, || format!("Invalid remapping flag {}", remapped))?;
        let frequency = if remapped == 1 {
            Some(Frequency::deserialize(backend)?)
        } else {
            None
        };

        let n = bwt.len();
        ensure(n >= 1, || "Empty Burrows–Wheeler transform".to_string())?;
        ensure(cf.len() >= 2 && cf[0] == 0 && cf[cf.len() - 1] as usize == n, || {
            "Invalid cumulative frequencies".to_string()
        })?;
        let alphabet_size = cf.len() - 1;
        ensure(
            (bwt.max_symbol() as usize) < alphabet_size
                && (0..alphabet_size)
                    .all(|c| cf[c] <= cf[c + 1] && (cf[c + 1] - cf[c]) as usize == bwt.count(c as u32)),
            || "Cumulative frequencies do not match the Burrows–Wheeler transform".to_string(),
        )?;
        ensure(cf[1] == 1, || "The terminator must appear exactly once".to_string())?;
        match &frequency {
            Some(frequency) => ensure(
                frequency.len() + 1 == alphabet_size
                    && frequency.iter().all(|(s, _)| s <= T::MAX),
                || "Frequency table does not match the alphabet".to_string(),
            )?,
            None => ensure(alphabet_size - 1 <= T::MAX as usize + 1, || {
                format!("Alphabet of size {} too large for the symbol type", alphabet_size)
            })?,
        }

        ensure(
            sampled_positions.len() == n && sampled_positions.count_ones() == sampled_sa.len(),
            || "Suffix-array samples do not match the sampled rows".to_string(),
        )?;
        let sampled_isa = inverse_samples(&sampled_sa, &sampled_positions, skip, n)
            .ok_or_else(|| SerdeError::Malformed("Invalid suffix-array samples".to_string()))?;

        let result = Self {
            cf,
            bwt,
            sampled_sa,
            sampled_positions,
            sampled_isa,
            skip,
            frequency,
            _marker: PhantomData,
        };
        result.check_lf_cycle()?;
        Ok(result)
    }
}

impl<T: Symbol, B: BitAccess + Rank> FmIndex<T, B> {
    /// Check that the LF mapping visits all rows in a single cycle starting
    /// from row zero, meeting the terminator only at position zero, and that
    /// every sampled row contains the position reached there.
    fn check_lf_cycle(&self) -> Result<(), SerdeError> {
        let n = self.len();
        let mut visited = BitVec::new(n);
        let mut row = 0;
        for position in (0..n).rev() {
            ensure(!visited.get(row), || {
                format!("Row {} is reached twice by the LF mapping", row)
            })?;
            visited.set(row, true);
            if self.sampled_positions.get(row) {
                let sample = self.sampled_sa[self.sampled_positions.rank(row)];
                ensure(sample as usize == position, || {
                    format!(
                        "Row {} is sampled with position {} instead of {}",
                        row, sample, position
                    )
                })?;
            }
            let (c, next) = self.lf(row);
            ensure((c == 0) == (position == 0), || {
                format!("Misplaced terminator at position {}", position)
            })?;
            row = next;
        }
        Ok(())
    }
}
