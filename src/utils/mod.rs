/*
 *
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Utility functions for broadword operations.

*/

pub mod select_in_word;
pub use select_in_word::*;

/// Return the number of bits necessary to represent values in `0..n`,
/// that is, ⌈log₂ `n`⌉, but at least one.
#[inline(always)]
pub fn bit_width_for(n: u64) -> u32 {
    if n <= 2 {
        1
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width_for() {
        assert_eq!(bit_width_for(0), 1);
        assert_eq!(bit_width_for(1), 1);
        assert_eq!(bit_width_for(2), 1);
        assert_eq!(bit_width_for(3), 2);
        assert_eq!(bit_width_for(4), 2);
        assert_eq!(bit_width_for(5), 3);
        assert_eq!(bit_width_for(256), 8);
        assert_eq!(bit_width_for(257), 9);
    }
}
