/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Basic traits for succinct operations on bit vectors, including [`Rank`] and [`Select`].

Bit-vector backends used by [wavelet matrices](crate::wavelet::WaveletMatrix)
and [FM-indices](crate::fm_index::FmIndex) must implement [`BitAccess`] and
[`Rank`]; selection is an optional capability, and methods that need it
(e.g., [`WaveletMatrix::select_upwards`](crate::wavelet::WaveletMatrix::select_upwards))
are available only for backends implementing [`Select`] and [`SelectZero`].

*/

use impl_tools::autoimpl;

/// A trait for succinct data structures that expose the
/// length of the underlying bit vector.
#[allow(clippy::len_without_is_empty)]
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait BitLength {
    /// Return the length in bits of the underlying bit vector.
    fn len(&self) -> usize;
}

/// A trait for succinct data structures that expose the
/// number of ones of the underlying bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait BitCount: BitLength {
    /// Return the number of ones in the underlying bit vector.
    fn count_ones(&self) -> usize;

    /// Return the number of zeros in the underlying bit vector.
    #[inline(always)]
    fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Return the number of bits set to `value`.
    #[inline(always)]
    fn count_bits(&self, value: bool) -> usize {
        if value {
            self.count_ones()
        } else {
            self.count_zeros()
        }
    }
}

/// Random access to the bits of a bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait BitAccess: BitLength {
    /// Return the bit at the specified position.
    ///
    /// # Panics
    ///
    /// If `pos` is not smaller than the [length](BitLength::len).
    fn get(&self, pos: usize) -> bool {
        if pos >= self.len() {
            panic!("Bit index out of bounds: {} >= {}", pos, self.len());
        }
        unsafe { self.get_unchecked(pos) }
    }

    /// Return the bit at the specified position.
    ///
    /// # Safety
    /// `pos` must be between 0 (included) and the [length of the underlying bit
    /// vector](`BitLength::len`) (excluded).
    unsafe fn get_unchecked(&self, pos: usize) -> bool;
}

/// Rank over a bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait Rank: BitLength {
    /// Return the number of ones preceding the specified position.
    ///
    /// Positions past the end of the bit vector are clamped to its length.
    fn rank(&self, pos: usize) -> usize {
        unsafe { self.rank_unchecked(pos.min(self.len())) }
    }

    /// Return the number of ones preceding the specified position.
    ///
    /// # Safety
    /// `pos` must be between 0 (included) and the [length of the underlying bit
    /// vector](`BitLength::len`) (included).
    unsafe fn rank_unchecked(&self, pos: usize) -> usize;
}

/// Rank zeros over a bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait RankZero: Rank {
    /// Return the number of zeros preceding the specified position.
    fn rank_zero(&self, pos: usize) -> usize {
        let pos = pos.min(self.len());
        pos - unsafe { self.rank_unchecked(pos) }
    }
    /// Return the number of zeros preceding the specified position.
    ///
    /// # Safety
    /// `pos` must be between 0 and the [length of the underlying bit
    /// vector](`BitLength::len`) (included).
    unsafe fn rank_zero_unchecked(&self, pos: usize) -> usize {
        pos - self.rank_unchecked(pos)
    }

    /// Return the number of bits equal to `value` preceding the specified position.
    #[inline(always)]
    fn rank_bit(&self, value: bool, pos: usize) -> usize {
        if value {
            self.rank(pos)
        } else {
            self.rank_zero(pos)
        }
    }
}

/// Select over a bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait Select: BitCount {
    /// Return the position of the one of given rank, or `None` if no such
    /// bit exist.
    fn select(&self, rank: usize) -> Option<usize> {
        if rank >= self.count_ones() {
            None
        } else {
            Some(unsafe { self.select_unchecked(rank) })
        }
    }

    /// Return the position of the one of given rank.
    ///
    /// # Safety
    /// `rank` must be between zero (included) and the number of ones in the
    /// underlying bit vector (excluded).
    unsafe fn select_unchecked(&self, rank: usize) -> usize;
}

/// Select zeros over a bit vector.
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>)]
pub trait SelectZero: BitCount {
    /// Return the position of the zero of given rank, or `None` if no such
    /// bit exist.
    fn select_zero(&self, rank: usize) -> Option<usize> {
        if rank >= self.count_zeros() {
            None
        } else {
            Some(unsafe { self.select_zero_unchecked(rank) })
        }
    }

    /// Return the position of the zero of given rank.
    ///
    /// # Safety
    /// `rank` must be between zero (included) and the number of zeros in the
    /// underlying bit vector (excluded).
    unsafe fn select_zero_unchecked(&self, rank: usize) -> usize;
}

/// Select bits of either value.
///
/// This trait is implemented automatically for all types implementing
/// both [`Select`] and [`SelectZero`].
pub trait SelectBit: Select + SelectZero {
    /// Return the position of the bit equal to `value` of given rank, or `None`
    /// if no such bit exist.
    #[inline(always)]
    fn select_bit(&self, value: bool, rank: usize) -> Option<usize> {
        if value {
            self.select(rank)
        } else {
            self.select_zero(rank)
        }
    }
}

impl<T: Select + SelectZero + ?Sized> SelectBit for T {}
