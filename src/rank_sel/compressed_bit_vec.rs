/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{Code, Dictionary};
use crate::bits::BitVec;
use crate::error::{BuildError, SerdeError};
use crate::traits::serdes::*;
use crate::traits::*;
use log::debug;
use mem_dbg::*;
use std::io::{Read, Write};

/**

An immutable, compressed bit vector supporting access and ranking.

The bit vector is encoded greedily as a sequence of byte-sized code indices
into a [`Dictionary`]: at each position, the longest code matching the
following bits is emitted. Every [`CompressedBitVec::BLOCK_CODES`] codes we
record the position of the first bit of the next code and the number of ones
before it, so that access and ranking need a binary search on the block
positions and a scan of at most [`CompressedBitVec::BLOCK_CODES`] codes.

This structure does not support selection, and it is thus usable as a
backend of a [wavelet matrix](crate::wavelet::WaveletMatrix) only for
counting and locating, but not for selection.

```rust
use sufi::prelude::*;

let mut bits = BitVec::new(10_000);
bits.set(5000, true);
let cbv = CompressedBitVec::new(bits).unwrap();
assert!(cbv.get(5000));
assert_eq!(cbv.rank(5000), 0);
assert_eq!(cbv.rank(5001), 1);
assert!(cbv.num_codes() < 20);
```

*/
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct CompressedBitVec {
    dictionary: Dictionary,
    codes: Vec<u8>,
    /// The position of the first bit of each block of codes.
    positions: Vec<u64>,
    /// The number of ones before each block of codes.
    ranks: Vec<u64>,
    len: usize,
    num_ones: usize,
}

impl CompressedBitVec {
    pub const BLOCK_CODES: usize = 128;

    /// Compress a bit vector using the [default dictionary](Dictionary::default).
    pub fn new(bits: BitVec) -> Result<Self, BuildError> {
        Self::with_dictionary(&bits, Dictionary::default())
    }

    /// Compress a bit vector using a given dictionary.
    pub fn with_dictionary(bits: &BitVec, dictionary: Dictionary) -> Result<Self, BuildError> {
        let codes = dictionary.encode(bits);
        let (positions, ranks, len, num_ones) = Self::index(&dictionary, &codes);
        debug_assert_eq!(len, bits.len());
        debug!(
            "Compressed {} bits into {} codes ({} blocks)",
            len,
            codes.len(),
            positions.len()
        );
        Ok(Self {
            dictionary,
            codes,
            positions,
            ranks,
            len,
            num_ones,
        })
    }

    /// Compute block positions, block ranks, length and number of ones.
    fn index(dictionary: &Dictionary, codes: &[u8]) -> (Vec<u64>, Vec<u64>, usize, usize) {
        let mut positions = Vec::with_capacity(codes.len().div_ceil(Self::BLOCK_CODES));
        let mut ranks = Vec::with_capacity(positions.capacity());
        let mut pos = 0;
        let mut rank = 0;
        for (i, &index) in codes.iter().enumerate() {
            if i % Self::BLOCK_CODES == 0 {
                positions.push(pos as u64);
                ranks.push(rank as u64);
            }
            let code = dictionary.code(index as usize);
            pos += code.len as usize;
            rank += code.ones() as usize;
        }
        (positions, ranks, pos, rank)
    }

    /// Return the dictionary used by this bit vector.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Return the number of codes of the encoding.
    pub fn num_codes(&self) -> usize {
        self.codes.len()
    }

    /// Return the code containing `pos`, the position of its first bit and
    /// the number of ones before it.
    ///
    /// `pos` must be smaller than the length.
    #[inline]
    fn find_code(&self, pos: usize) -> (Code, usize, usize) {
        let block = self.positions.partition_point(|&p| p as usize <= pos) - 1;
        let mut start = self.positions[block] as usize;
        let mut rank = self.ranks[block] as usize;
        for &index in &self.codes[block * Self::BLOCK_CODES..] {
            let code = self.dictionary.code(index as usize);
            let end = start + code.len as usize;
            if pos < end {
                return (code, start, rank);
            }
            start = end;
            rank += code.ones() as usize;
        }
        unreachable!("position {} is within the encoded length {}", pos, self.len)
    }
}

impl TryFrom<BitVec> for CompressedBitVec {
    type Error = BuildError;

    fn try_from(bits: BitVec) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl BitLength for CompressedBitVec {
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl BitCount for CompressedBitVec {
    #[inline(always)]
    fn count_ones(&self) -> usize {
        self.num_ones
    }
}

impl BitAccess for CompressedBitVec {
    unsafe fn get_unchecked(&self, pos: usize) -> bool {
        let (code, start, _) = self.find_code(pos);
        code.get((pos - start) as u32)
    }
}

impl Rank for CompressedBitVec {
    unsafe fn rank_unchecked(&self, pos: usize) -> usize {
        if pos >= self.len {
            return self.num_ones;
        }
        let (code, start, rank) = self.find_code(pos);
        rank + code.ones_prefix((pos - start) as u32) as usize
    }
}

impl RankZero for CompressedBitVec {}

/// Layout: `len` and `num_ones` as `u64`, the dictionary, the
/// length-prefixed code indices as `u8`, and the length-prefixed block
/// positions and block ranks as `u64`.
impl Serialize for CompressedBitVec {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.len as u64)?;
        written += write_word(backend, self.num_ones as u64)?;
        written += self.dictionary.serialize(backend)?;
        written += write_slice(backend, &self.codes)?;
        written += write_slice(backend, &self.positions)?;
        written += write_slice(backend, &self.ranks)?;
        Ok(written)
    }
}

impl Deserialize for CompressedBitVec {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let len = read_len(backend)?;
        let num_ones = read_len(backend)?;
        let dictionary = Dictionary::deserialize(backend)?;
        let codes = read_vec::<u8>(backend)?;
        let positions = read_vec::<u64>(backend)?;
        let ranks = read_vec::<u64>(backend)?;

        ensure(
            codes.iter().all(|&c| (c as usize) < dictionary.len()),
            || "Code index out of range".to_string(),
        )?;
        let index = Self::index(&dictionary, &codes);
        ensure(index == (positions, ranks, len, num_ones), || {
            "Block index does not match the codes".to_string()
        })?;
        let (positions, ranks, len, num_ones) = index;

        Ok(Self {
            dictionary,
            codes,
            positions,
            ranks,
            len,
            num_ones,
        })
    }
}
