/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Code dictionaries for [`CompressedBitVec`](super::CompressedBitVec).

A [`Dictionary`] contains at most [`Dictionary::MAX_CODES`] codes, so that a
code index fits in a byte. Each code is either a literal bit pattern of at
most 64 bits, or a run of zeros or ones of at most [`Dictionary::MAX_RUN`]
bits.

The [base dictionary](Dictionary::base) is built from the constant table
[`BASE_CODES`], which contains all literals of one to six bits and runs of 2³
to 2¹⁵ bits of both values. Larger dictionaries are obtained by
[training](Dictionary::train), which repeatedly merges the most frequent
pair of adjacent codes in the encoding of a sample.

The [default dictionary](Dictionary::default) has [`Dictionary::MAX_CODES`]
codes: the base codes followed by [`TRAINED_CODES`], which were obtained by
training on the levels of the wavelet matrix of the Burrows–Wheeler
transform of English text.

*/

use crate::bits::BitVec;
use crate::error::{BuildError, SerdeError};
use crate::traits::serdes::*;
use log::debug;
use mem_dbg::*;
use std::io::{Read, Write};

/// A code of a [`Dictionary`].
///
/// For literals, `pattern` contains the bits of the code, first bit in the
/// lowest position. For runs, `pattern` is the value of the run (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    pub pattern: u64,
    pub len: u32,
    pub run: bool,
}

impl Code {
    pub const fn literal(pattern: u64, len: u32) -> Self {
        Self {
            pattern,
            len,
            run: false,
        }
    }

    pub const fn run(value: bool, len: u32) -> Self {
        Self {
            pattern: value as u64,
            len,
            run: true,
        }
    }

    /// Return the number of ones among the first `k` bits of the code.
    #[inline(always)]
    pub fn ones_prefix(&self, k: u32) -> u32 {
        debug_assert!(k <= self.len);
        if self.run {
            self.pattern as u32 * k
        } else if k == 64 {
            self.pattern.count_ones()
        } else {
            (self.pattern & ((1 << k) - 1)).count_ones()
        }
    }

    /// Return the number of ones in the code.
    #[inline(always)]
    pub fn ones(&self) -> u32 {
        self.ones_prefix(self.len)
    }

    /// Return the bit at position `k` of the code.
    #[inline(always)]
    pub fn get(&self, k: u32) -> bool {
        debug_assert!(k < self.len);
        if self.run {
            self.pattern != 0
        } else {
            (self.pattern >> k) & 1 != 0
        }
    }

    /// Return the bits of the code as a literal pattern, if it is
    /// at most 64 bits long.
    fn expand(&self) -> Option<u64> {
        match (self.run, self.len) {
            (false, _) => Some(self.pattern),
            (true, 64) => Some(if self.pattern != 0 { !0 } else { 0 }),
            (true, len) if len < 64 => Some(if self.pattern != 0 { (1 << len) - 1 } else { 0 }),
            _ => None,
        }
    }

    /// Return whether the two codes represent the same bits.
    fn same_bits(&self, other: &Code) -> bool {
        self.len == other.len
            && match (self.expand(), other.expand()) {
                (Some(a), Some(b)) => a == b,
                _ => self.pattern == other.pattern,
            }
    }

    /// Return the concatenation of the two codes, if it can be represented.
    fn merge(&self, other: &Code) -> Option<Code> {
        let len = self.len + other.len;
        if self.run && other.run && self.pattern == other.pattern {
            return (len <= Dictionary::MAX_RUN).then(|| Code::run(self.pattern != 0, len));
        }
        if len > 64 {
            return None;
        }
        let pattern = self.expand()? | (other.expand()? << self.len);
        Some(Code::literal(pattern, len))
    }
}

const NUM_BASE_CODES: usize = 126 + 26;

/// The codes of the default dictionary: all literals of one to six bits,
/// followed by runs of 2³ to 2¹⁵ zeros and ones.
pub const BASE_CODES: [Code; NUM_BASE_CODES] = build_base_codes();

const fn build_base_codes() -> [Code; NUM_BASE_CODES] {
    let mut codes = [Code::literal(0, 1); NUM_BASE_CODES];
    let mut i = 0;
    let mut len = 1;
    while len <= 6 {
        let mut pattern = 0;
        while pattern < 1 << len {
            codes[i] = Code::literal(pattern, len);
            i += 1;
            pattern += 1;
        }
        len += 1;
    }
    let mut log2_len = 3;
    while log2_len <= 15 {
        codes[i] = Code::run(false, 1 << log2_len);
        codes[i + 1] = Code::run(true, 1 << log2_len);
        i += 2;
        log2_len += 1;
    }
    codes
}

const NUM_TRAINED_CODES: usize = Dictionary::MAX_CODES - NUM_BASE_CODES;

/// The codes added to [`BASE_CODES`] by training, in order of addition.
pub const TRAINED_CODES: [Code; NUM_TRAINED_CODES] = [
    Code::run(true, 24),
    Code::run(false, 24),
    Code::literal(0x3fff, 14),
    Code::literal(0x0, 14),
    Code::literal(0x1fff, 14),
    Code::literal(0x3fffff, 22),
    Code::literal(0x80, 12),
    Code::literal(0x3fffffff, 30),
    Code::literal(0x40, 12),
    Code::literal(0x2000, 14),
    Code::literal(0xf80, 12),
    Code::literal(0x3000, 14),
    Code::run(false, 48),
    Code::literal(0x3ffe, 14),
    Code::literal(0x1000, 14),
    Code::literal(0xfff, 14),
    Code::run(true, 48),
    Code::literal(0x1, 22),
    Code::literal(0x3ffd, 14),
    Code::literal(0x3ffc, 14),
    Code::literal(0x1, 14),
    Code::literal(0x7ff, 14),
    Code::literal(0x3fffffffff, 38),
    Code::run(false, 40),
    Code::literal(0x800, 14),
    Code::literal(0xffe, 12),
    Code::literal(0x200000, 22),
    Code::literal(0x7, 14),
    Code::literal(0x200, 14),
    Code::literal(0x37ff, 14),
    Code::literal(0x2fff, 14),
    Code::literal(0x1fffff, 22),
    Code::run(true, 56),
    Code::literal(0x1, 12),
    Code::literal(0x3800, 14),
    Code::literal(0x801, 12),
    Code::literal(0x7fe, 12),
    Code::literal(0xfff7f, 20),
    Code::literal(0x3fffffffffff, 46),
    Code::literal(0x803, 12),
    Code::literal(0x400, 14),
    Code::run(false, 192),
    Code::literal(0xffc, 12),
    Code::literal(0x1fffffff, 30),
    Code::literal(0xc0, 12),
    Code::literal(0x3ff0, 14),
    Code::literal(0x3ffb, 14),
    Code::literal(0xe7f, 12),
    Code::literal(0xf7f, 12),
    Code::literal(0x3ff, 14),
    Code::literal(0x2000000000, 38),
    Code::literal(0x180, 12),
    Code::literal(0x880, 12),
    Code::literal(0x3fc, 12),
    Code::literal(0xfbf, 12),
    Code::literal(0x4000000000, 44),
    Code::literal(0x3ffffe, 22),
    Code::literal(0x2fffff, 22),
    Code::literal(0x6, 14),
    Code::literal(0xf, 30),
    Code::literal(0x3ffc00, 22),
    Code::run(true, 88),
    Code::literal(0x10000000, 30),
    Code::literal(0x20000000, 30),
    Code::literal(0x401, 12),
    Code::literal(0xe01, 12),
    Code::literal(0x3e00, 14),
    Code::literal(0x1ff, 14),
    Code::literal(0x27ff, 14),
    Code::literal(0x380000, 22),
    Code::literal(0x0, 30),
    Code::literal(0x1c0, 12),
    Code::literal(0x840, 12),
    Code::literal(0x81, 12),
    Code::literal(0x2, 14),
    Code::literal(0x804, 12),
    Code::literal(0x4, 22),
    Code::literal(0x6, 12),
    Code::literal(0x807, 12),
    Code::literal(0x7e0, 12),
    Code::literal(0x7f7, 12),
    Code::literal(0xff7, 12),
    Code::literal(0x23ff, 14),
    Code::literal(0x7fb, 12),
    Code::literal(0x780, 12),
    Code::literal(0x3, 22),
    Code::literal(0xff8, 12),
    Code::literal(0x1f, 22),
    Code::literal(0x3dff, 14),
    Code::literal(0x7, 30),
    Code::literal(0x1800, 14),
    Code::literal(0xff0, 12),
    Code::literal(0x3fd, 12),
    Code::literal(0xfffff, 22),
    Code::literal(0x3fffffffffffff, 54),
    Code::literal(0xd80, 12),
    Code::literal(0x301, 12),
    Code::literal(0x2, 12),
    Code::literal(0x404, 12),
    Code::literal(0x810, 12),
    Code::literal(0x7ef, 12),
    Code::literal(0xbfc, 12),
    Code::literal(0xbfd, 12),
    Code::literal(0x3fe, 12),
];

/// A dictionary of codes.
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct Dictionary {
    patterns: Vec<u64>,
    lens: Vec<u32>,
    runs: Vec<bool>,
    /// Code indices by decreasing length, for greedy matching.
    by_len: Vec<u8>,
}

impl Default for Dictionary {
    fn default() -> Self {
        let codes = BASE_CODES.iter().chain(TRAINED_CODES.iter()).copied().collect();
        Self::new(codes).expect("the trained codes form a valid dictionary")
    }
}

impl Dictionary {
    pub const MAX_CODES: usize = 256;
    pub const MAX_RUN: u32 = 1 << 15;

    /// Create a dictionary from a list of codes.
    ///
    /// The list must contain at most [`Dictionary::MAX_CODES`] valid codes,
    /// including the two one-bit literals, so that every bit vector can be
    /// encoded.
    pub fn new(codes: Vec<Code>) -> Result<Self, BuildError> {
        if codes.len() > Self::MAX_CODES {
            return Err(BuildError::Dictionary(format!(
                "{} codes (the maximum is {})",
                codes.len(),
                Self::MAX_CODES
            )));
        }
        for code in &codes {
            let valid = if code.run {
                code.pattern <= 1 && code.len >= 1 && code.len <= Self::MAX_RUN
            } else {
                code.len >= 1
                    && code.len <= 64
                    && (code.len == 64 || code.pattern >> code.len == 0)
            };
            if !valid {
                return Err(BuildError::Dictionary(format!("Invalid code {:?}", code)));
            }
        }
        for bit in [0, 1] {
            if !codes.iter().any(|c| c.same_bits(&Code::literal(bit, 1))) {
                return Err(BuildError::Dictionary(format!(
                    "Missing one-bit code for {}",
                    bit
                )));
            }
        }

        let mut by_len = (0..codes.len() as u16).map(|i| i as u8).collect::<Vec<_>>();
        // Stable, so among codes of the same length the first one wins
        by_len.sort_by_key(|&i| std::cmp::Reverse(codes[i as usize].len));

        Ok(Self {
            patterns: codes.iter().map(|c| c.pattern).collect(),
            lens: codes.iter().map(|c| c.len).collect(),
            runs: codes.iter().map(|c| c.run).collect(),
            by_len,
        })
    }

    /// Return the dictionary made of the [base codes](BASE_CODES).
    pub fn base() -> Self {
        Self::new(BASE_CODES.to_vec()).expect("the base codes form a valid dictionary")
    }

    /// Return the number of codes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.lens.len()
    }

    /// Return the code of given index.
    #[inline(always)]
    pub fn code(&self, index: usize) -> Code {
        Code {
            pattern: self.patterns[index],
            len: self.lens[index],
            run: self.runs[index],
        }
    }

    /// Return an iterator over the codes.
    pub fn codes(&self) -> impl Iterator<Item = Code> + '_ {
        (0..self.len()).map(|i| self.code(i))
    }

    /// Return the index of the longest code matching `bits` at `pos`.
    ///
    /// `pos` must be smaller than the length of `bits`.
    pub(crate) fn longest_match(&self, bits: &BitVec, pos: usize) -> usize {
        let remaining = bits.len() - pos;
        let window = bits.get_word(pos);
        let value = window & 1 != 0;
        let run_len = run_length(bits, pos, value, Self::MAX_RUN as usize);

        for &index in &self.by_len {
            let code = self.code(index as usize);
            let len = code.len as usize;
            if len > remaining {
                continue;
            }
            let matches = if code.run {
                (code.pattern != 0) == value && run_len >= len
            } else if len == 64 {
                window == code.pattern
            } else {
                window & ((1 << len) - 1) == code.pattern
            };
            if matches {
                return index as usize;
            }
        }
        unreachable!("dictionaries always contain both one-bit codes")
    }

    /// Encode `bits` greedily, returning the sequence of code indices.
    pub fn encode(&self, bits: &BitVec) -> Vec<u8> {
        let mut encoded = vec![];
        let mut pos = 0;
        while pos < bits.len() {
            let index = self.longest_match(bits, pos);
            encoded.push(index as u8);
            pos += self.lens[index] as usize;
        }
        encoded
    }

    /// Train a dictionary of `size` codes on a sample.
    ///
    /// Starting from the [base dictionary](Dictionary::base), the sample
    /// is repeatedly encoded and the most frequent pair of adjacent codes
    /// whose concatenation is representable and not already present is added
    /// as a new code. Ties are broken in favor of the pair with smaller
    /// indices.
    ///
    /// An error is returned if no such pair exists before reaching the
    /// requested size.
    pub fn train(sample: &BitVec, size: usize) -> Result<Self, BuildError> {
        let mut codes = BASE_CODES.to_vec();
        if size < codes.len() || size > Self::MAX_CODES {
            return Err(BuildError::Dictionary(format!(
                "Cannot train a dictionary of {} codes (the range is [{}..{}])",
                size,
                codes.len(),
                Self::MAX_CODES
            )));
        }

        let mut dict = Self::new(codes.clone())?;
        let mut pair_counts = vec![0_usize; Self::MAX_CODES * Self::MAX_CODES];
        while codes.len() < size {
            let encoded = dict.encode(sample);
            pair_counts.iter_mut().for_each(|c| *c = 0);
            for pair in encoded.windows(2) {
                pair_counts[pair[0] as usize * Self::MAX_CODES + pair[1] as usize] += 1;
            }

            let mut candidates = pair_counts
                .iter()
                .enumerate()
                .filter(|(_, &count)| count > 0)
                .map(|(pair, &count)| (count, pair))
                .collect::<Vec<_>>();
            candidates.sort_by_key(|&(count, pair)| (std::cmp::Reverse(count), pair));

            let merged = candidates.into_iter().find_map(|(_, pair)| {
                let a = codes[pair / Self::MAX_CODES];
                let b = codes[pair % Self::MAX_CODES];
                a.merge(&b)
                    .filter(|merged| !codes.iter().any(|c| c.same_bits(merged)))
            });

            match merged {
                Some(code) => {
                    codes.push(code);
                    dict = Self::new(codes.clone())?;
                }
                None => {
                    return Err(BuildError::Dictionary(format!(
                        "No mergeable pair of codes after {} codes",
                        codes.len()
                    )))
                }
            }
        }

        debug!("Trained a dictionary of {} codes", dict.len());
        Ok(dict)
    }
}

/// Return the length of the run of `value` bits starting at `pos`, up to `max`.
fn run_length(bits: &BitVec, pos: usize, value: bool, max: usize) -> usize {
    let mut len = 0;
    while len < max && pos + len < bits.len() {
        let word = bits.get_word(pos + len);
        let word = if value { !word } else { word };
        let available = (bits.len() - pos - len).min(64);
        let same = word.trailing_zeros() as usize;
        if same >= available {
            len += available;
        } else {
            len += same;
            break;
        }
    }
    len.min(max)
}

/// Layout: the number of codes as a `u64`, followed, for each code, by
/// its kind as a `u8` (0 for literals, 1 for runs), its length as a `u32`
/// and its pattern as a `u64`.
impl Serialize for Dictionary {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.len() as u64)?;
        for code in self.codes() {
            written += write_word(backend, code.run as u8)?;
            written += write_word(backend, code.len)?;
            written += write_word(backend, code.pattern)?;
        }
        Ok(written)
    }
}

impl Deserialize for Dictionary {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let len = read_len(backend)?;
        ensure(len <= Self::MAX_CODES, || format!("Too many codes: {}", len))?;
        let mut codes = Vec::with_capacity(len);
        for _ in 0..len {
            let kind = read_word::<u8>(backend)?;
            ensure(kind <= 1, || format!("Unknown code kind {}", kind))?;
            let len = read_word::<u32>(backend)?;
            let pattern = read_word::<u64>(backend)?;
            codes.push(Code {
                pattern,
                len,
                run: kind == 1,
            });
        }
        Self::new(codes).map_err(|e| SerdeError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_codes() {
        assert_eq!(BASE_CODES[0], Code::literal(0, 1));
        assert_eq!(BASE_CODES[1], Code::literal(1, 1));
        assert_eq!(BASE_CODES[125], Code::literal(63, 6));
        assert_eq!(BASE_CODES[126], Code::run(false, 8));
        assert_eq!(BASE_CODES[151], Code::run(true, 1 << 15));
    }

    #[test]
    fn test_default() {
        let dict = Dictionary::default();
        assert_eq!(dict.len(), Dictionary::MAX_CODES);
        assert!(dict.codes().zip(BASE_CODES).all(|(a, b)| a == b));
        let codes = dict.codes().collect::<Vec<_>>();
        for (i, a) in codes.iter().enumerate() {
            assert!(codes[..i].iter().all(|b| !a.same_bits(b)), "{:?}", a);
        }

        // The trained codes shorten the encoding of long runs
        let bits = BitVec::with_value(1000, true);
        assert!(dict.encode(&bits).len() < Dictionary::base().encode(&bits).len());
    }

    #[test]
    fn test_merge() {
        let a = Code::literal(0b01, 2);
        let b = Code::literal(0b1, 1);
        assert_eq!(a.merge(&b), Some(Code::literal(0b101, 3)));
        let r = Code::run(true, 8);
        assert_eq!(r.merge(&r), Some(Code::run(true, 16)));
        assert_eq!(r.merge(&b), Some(Code::literal(0x1FF, 9)));
        let big = Code::run(false, 1 << 15);
        assert_eq!(big.merge(&big), None);
        assert_eq!(big.merge(&b), None);
    }

    #[test]
    fn test_same_bits() {
        assert!(Code::run(false, 8).same_bits(&Code::literal(0, 8)));
        assert!(Code::run(true, 8).same_bits(&Code::literal(0xFF, 8)));
        assert!(!Code::run(true, 8).same_bits(&Code::literal(0x7F, 8)));
        assert!(!Code::run(true, 8).same_bits(&Code::run(true, 16)));
    }

    #[test]
    fn test_longest_match() {
        let dict = Dictionary::base();
        let mut bits = BitVec::new(100);
        bits.set(99, true);
        // 99 zeros: the longest run is 64
        let code = dict.code(dict.longest_match(&bits, 0));
        assert_eq!(code, Code::run(false, 64));
        let code = dict.code(dict.longest_match(&bits, 64));
        // 35 zeros and a one: a run of 32 zeros beats the 6-bit literals
        assert_eq!(code, Code::run(false, 32));
        let code = dict.code(dict.longest_match(&bits, 96));
        assert_eq!(code, Code::literal(0b1000, 4));
    }

    #[test]
    fn test_invalid_dictionary() {
        assert!(Dictionary::new(vec![Code::literal(0, 1)]).is_err());
        assert!(Dictionary::new(vec![Code::literal(0, 1), Code::literal(1, 1)]).is_ok());
        assert!(Dictionary::new(vec![Code::literal(0, 1), Code::literal(3, 1)]).is_err());
        let mut codes = vec![Code::literal(0, 1); 300];
        codes.push(Code::literal(1, 1));
        assert!(Dictionary::new(codes).is_err());
    }

    #[test]
    fn test_train() {
        let bits = (0..10_000).map(|i| i % 7 == 0 || i % 11 == 0).collect::<BitVec>();
        let dict = Dictionary::train(&bits, 170).unwrap();
        assert_eq!(dict.len(), 170);
        let encoded_len: usize = dict
            .encode(&bits)
            .iter()
            .map(|&i| dict.code(i as usize).len as usize)
            .sum();
        assert_eq!(encoded_len, bits.len());
        assert!(Dictionary::train(&bits, 100).is_err());
    }

    #[test]
    fn test_train_failure() {
        // A single code has no pairs to merge
        let bits = BitVec::new(1);
        assert!(matches!(
            Dictionary::train(&bits, 200),
            Err(BuildError::Dictionary(_))
        ));
    }
}
