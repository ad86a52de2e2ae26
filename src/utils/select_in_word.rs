/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Selection of a one inside a single word.

[`select_in_word`] peels the word by halves (32, 16 and 8 bits) using
population counts, and then completes the search in the remaining byte with
the [`SELECT_IN_BYTE`] lookup table. [`select_in_word_ctz`] is the
alternative based on clearing the lowest ones and counting trailing zeros,
which is faster on words with few ones.

*/

/// `SELECT_IN_BYTE[b][r]` is the position of the one of rank `r` in the byte
/// `b`, or 8 if `b` has at most `r` ones.
pub const SELECT_IN_BYTE: [[u8; 8]; 256] = build_select_in_byte();

const fn build_select_in_byte() -> [[u8; 8]; 256] {
    let mut table = [[8_u8; 8]; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut rank = 0;
        let mut bit = 0;
        while bit < 8 {
            if (byte >> bit) & 1 != 0 {
                table[byte][rank] = bit as u8;
                rank += 1;
            }
            bit += 1;
        }
        byte += 1;
    }
    table
}

/// Return the position of the one of rank `rank` (starting from zero) in `word`.
///
/// The result is unspecified if `word` contains at most `rank` ones.
#[inline(always)]
pub fn select_in_word(word: u64, rank: usize) -> usize {
    debug_assert!(rank < word.count_ones() as usize);
    let mut word = word;
    let mut rank = rank as u32;
    let mut shift = 0;

    let ones = (word as u32).count_ones();
    if rank >= ones {
        rank -= ones;
        word >>= 32;
        shift += 32;
    }
    let ones = (word as u16).count_ones();
    if rank >= ones {
        rank -= ones;
        word >>= 16;
        shift += 16;
    }
    let ones = (word as u8).count_ones();
    if rank >= ones {
        rank -= ones;
        word >>= 8;
        shift += 8;
    }

    shift + SELECT_IN_BYTE[(word & 0xFF) as usize][(rank & 7) as usize] as usize
}

/// Return the position of the one of rank `rank` (starting from zero) in `word`
/// by clearing the lowest `rank` ones.
///
/// The result is unspecified if `word` contains at most `rank` ones.
#[inline(always)]
pub fn select_in_word_ctz(word: u64, rank: usize) -> usize {
    debug_assert!(rank < word.count_ones() as usize);
    let mut word = word;
    for _ in 0..rank {
        word &= word.wrapping_sub(1);
    }
    word.trailing_zeros() as usize
}
