/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Compressed full-text indices based on the Burrows–Wheeler transform.

An [`FmIndex`] is built from a sequence of [symbols](Symbol) by computing
its [suffix array](sais::suffix_array), deriving the Burrows–Wheeler
transform, and storing the latter in a [wavelet
matrix](crate::wavelet::WaveletMatrix), together with cumulative symbol
frequencies and a sample of the suffix array.

*/

use std::fmt::Debug;
use std::hash::Hash;

pub mod sais;

mod frequency;
pub use frequency::*;

#[allow(clippy::module_inception)]
mod fm_index;
pub use fm_index::*;

/// Symbol types that can be indexed.
///
/// Symbols are converted to `u32` for indexing. Alphabets of byte symbols
/// are used as they are by default, whereas larger alphabets are
/// [remapped](Frequency) to dense indices (see [`FmIndexBuilder::remap`]).
pub trait Symbol: Copy + Ord + Debug + Hash + Send + Sync + 'static {
    /// The largest symbol value.
    const MAX: u32;
    /// Whether alphabets of this type are remapped by default.
    const REMAP: bool;

    fn to_u32(self) -> u32;

    /// Convert back a value returned by [`Symbol::to_u32`].
    fn from_u32(value: u32) -> Self;
}

macro_rules! impl_symbol {
    ($($ty:ty => $remap:expr),*) => {$(
        impl Symbol for $ty {
            const MAX: u32 = <$ty>::MAX as u32;
            const REMAP: bool = $remap;

            #[inline(always)]
            fn to_u32(self) -> u32 {
                self as u32
            }

            #[inline(always)]
            fn from_u32(value: u32) -> Self {
                debug_assert!(value <= <Self as Symbol>::MAX);
                value as $ty
            }
        }
    )*};
}

impl_symbol!(u8 => false, u16 => true, u32 => true);
