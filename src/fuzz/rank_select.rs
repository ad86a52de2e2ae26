/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use crate::prelude::*;
use arbitrary::Arbitrary;
use std::collections::BTreeSet;

#[derive(Arbitrary, Debug)]
pub struct Data {
    /// (the positions of the bits to set to 1) % len
    ones: Vec<usize>,
    /// the length of the bitvec
    len: usize,
}

/// get random data and check that rank and select agree on both backends
pub fn harness(mut data: Data) {
    data.len %= 1 << 20; // avoid out of memory, 1MB should be enough to find errors
    data.len += 1; // avoid zero length
    let ones = data
        .ones
        .iter()
        .map(|value| value % data.len)
        .collect::<BTreeSet<_>>();

    let mut bit_vec = BitVec::new(data.len);
    ones.iter().for_each(|&value| bit_vec.set(value, true));

    let succinct = SuccinctBitVec::new(bit_vec.clone()).unwrap();
    let compressed = CompressedBitVec::new(bit_vec).unwrap();
    assert_eq!(succinct.count_ones(), ones.len());
    assert_eq!(compressed.count_ones(), ones.len());

    for (i, &v) in ones.iter().enumerate() {
        assert_eq!(succinct.select(i), Some(v), "select is wrong at idx {}", i);
        assert_eq!(succinct.rank(v), i, "rank is wrong at pos {}", v);
        assert_eq!(compressed.rank(v), i, "compressed rank is wrong at pos {}", v);
        assert!(compressed.get(v));
    }
    assert_eq!(succinct.select(ones.len()), None);

    let mut zeros = 0;
    for pos in (0..data.len).filter(|pos| !ones.contains(pos)) {
        assert_eq!(succinct.select_zero(zeros), Some(pos), "select_zero is wrong at idx {}", zeros);
        zeros += 1;
    }
    assert_eq!(succinct.select_zero(zeros), None);
}
