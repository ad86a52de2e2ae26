/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

A mutable, growable bit vector.

[`BitVec`] is the raw input of the succinct structures of this crate: it is
filled during construction, and then handed over to a structure such as
[`SuccinctBitVec`](crate::rank_sel::SuccinctBitVec), which adds rank and
select indices and never mutates it again.

Bits are stored in `u64` words, bit `i` being bit `i % 64` of word `i / 64`.
Bits beyond the length in the last word are always zero.

 */
use crate::traits::*;
use mem_dbg::*;
use std::ops::Index;

/// A mutable bit vector backed by a `Vec<u64>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub struct BitVec {
    data: Vec<u64>,
    len: usize,
}

/// Convenient, [`vec!`]-like macro to initialize a bit vector.
///
/// ```rust
/// use sufi::prelude::*;
///
/// let b = bit_vec![0, 1, 0, 1, 1];
/// assert_eq!(b.len(), 5);
/// assert!(b.get(3));
///
/// let b = bit_vec![false; 10];
/// assert_eq!(b.count_ones(), 0);
/// ```
#[macro_export]
macro_rules! bit_vec {
    () => {
        $crate::bits::BitVec::new(0)
    };
    (false; $n:expr) => {
        $crate::bits::BitVec::new($n)
    };
    (0; $n:expr) => {
        $crate::bits::BitVec::new($n)
    };
    (true; $n:expr) => {
        $crate::bits::BitVec::with_value($n, true)
    };
    (1; $n:expr) => {
        $crate::bits::BitVec::with_value($n, true)
    };
    ($($x:expr),+ $(,)?) => {
        {
            let mut b = $crate::bits::BitVec::with_capacity([$($x),+].len());
            $( b.push($x != 0); )*
            b
        }
    };
}

macro_rules! panic_if_out_of_bounds {
    ($index: expr, $len: expr) => {
        if $index >= $len {
            panic!("Bit index out of bounds: {} >= {}", $index, $len)
        }
    };
}

const BITS: usize = u64::BITS as usize;

impl BitVec {
    /// Create a new bit vector of length `len` filled with zeros.
    pub fn new(len: usize) -> Self {
        Self::with_value(len, false)
    }

    /// Create a new bit vector of length `len` filled with `value`.
    pub fn with_value(len: usize, value: bool) -> Self {
        let n_of_words = len.div_ceil(BITS);
        let fill = if value { !0 } else { 0 };
        let mut bit_vec = Self {
            data: vec![fill; n_of_words],
            len,
        };
        bit_vec.clear_tail();
        bit_vec
    }

    /// Create a new empty bit vector with space for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.div_ceil(BITS)),
            len: 0,
        }
    }

    /// Create a bit vector from a vector of words and a length.
    ///
    /// # Panics
    ///
    /// If `data` contains less than `len` bits. Excess words are dropped,
    /// and bits beyond `len` in the last word are cleared.
    pub fn from_raw_parts(mut data: Vec<u64>, len: usize) -> Self {
        let n_of_words = len.div_ceil(BITS);
        assert!(
            data.len() >= n_of_words,
            "{} words cannot hold {} bits",
            data.len(),
            len
        );
        data.truncate(n_of_words);
        let mut bit_vec = Self { data, len };
        bit_vec.clear_tail();
        bit_vec
    }

    #[inline(always)]
    pub fn into_raw_parts(self) -> (Vec<u64>, usize) {
        (self.data, self.len)
    }

    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    /// Return the number of bits in this bit vector.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the bit at position `index`.
    #[inline(always)]
    pub fn get(&self, index: usize) -> bool {
        panic_if_out_of_bounds!(index, self.len);
        (self.data[index / BITS] >> (index % BITS)) & 1 != 0
    }

    /// Set the bit at position `index` to `value`.
    #[inline(always)]
    pub fn set(&mut self, index: usize, value: bool) {
        panic_if_out_of_bounds!(index, self.len);
        let word_index = index / BITS;
        let bit_index = index % BITS;
        // For constant values, this should be inlined with no test.
        if value {
            self.data[word_index] |= 1 << bit_index;
        } else {
            self.data[word_index] &= !(1 << bit_index);
        }
    }

    /// Append a bit.
    pub fn push(&mut self, value: bool) {
        let bit_index = self.len % BITS;
        if bit_index == 0 {
            self.data.push(0);
        }
        if value {
            let last = self.data.len() - 1;
            self.data[last] |= 1 << bit_index;
        }
        self.len += 1;
    }

    /// Append the lowest `width` bits of `word`, least significant bit first.
    pub fn append_bits(&mut self, word: u64, width: usize) {
        debug_assert!(width <= BITS);
        if width == 0 {
            return;
        }
        let word = if width == BITS {
            word
        } else {
            word & ((1 << width) - 1)
        };
        let bit_index = self.len % BITS;
        if bit_index == 0 {
            self.data.push(word);
        } else {
            let last = self.data.len() - 1;
            self.data[last] |= word << bit_index;
            if bit_index + width > BITS {
                self.data.push(word >> (BITS - bit_index));
            }
        }
        self.len += width;
    }

    /// Resize the bit vector, filling new positions with `value`.
    pub fn resize(&mut self, new_len: usize, value: bool) {
        if new_len <= self.len {
            self.len = new_len;
            self.data.truncate(new_len.div_ceil(BITS));
            self.clear_tail();
        } else {
            // TODO: fill whole words at once
            for _ in self.len..new_len {
                self.push(value);
            }
        }
    }

    /// Return the number of bits set to 1 in this bit vector.
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|x| x.count_ones() as usize).sum()
    }

    /// Return the 64 bits starting at `pos`, padding with zeros past the end.
    pub fn get_word(&self, pos: usize) -> u64 {
        if pos >= self.len {
            return 0;
        }
        let word_index = pos / BITS;
        let bit_index = pos % BITS;
        let low = self.data[word_index] >> bit_index;
        if bit_index == 0 || word_index + 1 >= self.data.len() {
            low
        } else {
            low | (self.data[word_index + 1] << (BITS - bit_index))
        }
    }

    /// Return an iterator over the bits of this bit vector.
    pub fn iter(&self) -> BitIterator<'_> {
        BitIterator {
            bits: self,
            next: 0,
        }
    }

    fn clear_tail(&mut self) {
        let bit_index = self.len % BITS;
        if bit_index != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1 << bit_index) - 1;
            }
        }
    }
}

impl BitLength for BitVec {
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl BitCount for BitVec {
    #[inline(always)]
    fn count_ones(&self) -> usize {
        BitVec::count_ones(self)
    }
}

impl BitAccess for BitVec {
    #[inline(always)]
    unsafe fn get_unchecked(&self, pos: usize) -> bool {
        (self.data.get_unchecked(pos / BITS) >> (pos % BITS)) & 1 != 0
    }
}

impl AsRef<[u64]> for BitVec {
    #[inline(always)]
    fn as_ref(&self) -> &[u64] {
        &self.data
    }
}

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            false => &false,
            true => &true,
        }
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut bit_vec = BitVec::with_capacity(iter.size_hint().0);
        for bit in iter {
            bit_vec.push(bit);
        }
        bit_vec
    }
}

impl Extend<bool> for BitVec {
    fn extend<T: IntoIterator<Item = bool>>(&mut self, iter: T) {
        for bit in iter {
            self.push(bit);
        }
    }
}

/// An iterator over the bits of a [`BitVec`].
pub struct BitIterator<'a> {
    bits: &'a BitVec,
    next: usize,
}

impl Iterator for BitIterator<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.next == self.bits.len {
            return None;
        }
        let res = self.bits.get(self.next);
        self.next += 1;
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.bits.len - self.next;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for BitIterator<'_> {}

impl<'a> IntoIterator for &'a BitVec {
    type Item = bool;
    type IntoIter = BitIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
