/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Immutable bit vectors supporting rank and select operations.

## Design

[`SuccinctBitVec`] is the default backend of [wavelet
matrices](crate::wavelet::WaveletMatrix): it supports access, ranking and
selection of both ones and zeros with a space overhead of 25% for ranking
and a few additional bits per thousand for selection.

[`CompressedBitVec`] trades speed for space on highly compressible bit
vectors (e.g., the levels of a wavelet matrix built on the Burrows–Wheeler
transform of a repetitive text): it encodes the bits as a sequence of codes
from a [`Dictionary`] (by default, one trained on such levels), and it
supports access and ranking only.

Both structures are built from a [`BitVec`](crate::bits::BitVec) using
[`TryFrom`], which is the construction interface required by wavelet
matrices.

The ranking structure of [`SuccinctBitVec`] follows the ideas described by
Sebastiano Vigna in “<a href="https://link.springer.com/chapter/10.1007/978-3-540-68552-4_12">Broadword
Implementation of Rank/Select Queries</a>”, _Proc. of the 7th International Workshop
on Experimental Algorithms, WEA 2008_, volume 5038 of Lecture Notes in Computer Science, pages
154–168. Springer, 2008.

*/

mod succinct_bit_vec;
pub use succinct_bit_vec::*;

mod dictionary;
pub use dictionary::*;

mod compressed_bit_vec;
pub use compressed_bit_vec::*;
