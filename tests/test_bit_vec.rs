/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sufi::prelude::*;

#[test]
fn test() {
    let n = 50;
    let n2 = 100;
    let u = 1000;

    let mut rng = SmallRng::seed_from_u64(0);

    let bm = BitVec::with_value(u, true);

    assert_eq!(bm.len(), u);
    assert_eq!(bm.count_ones(), u);

    // Dirty vector
    let ones = vec![u64::MAX; 2];
    assert_eq!(BitVec::from_raw_parts(ones.clone(), 0).count_ones(), 0);
    assert_eq!(BitVec::from_raw_parts(ones.clone(), 1).count_ones(), 1);
    assert_eq!(BitVec::from_raw_parts(ones, 70).count_ones(), 70);

    for i in 0..u {
        assert!(bm[i]);
    }

    let mut bm = BitVec::new(u);

    for _ in 0..10 {
        let mut values = (0..u).collect::<Vec<_>>();
        let (indices, _) = values.partial_shuffle(&mut rng, n2);

        for i in indices[..n].iter().copied() {
            bm.set(i, true);
        }

        for i in 0..u {
            assert_eq!(bm.get(i), indices[..n].contains(&i));
            assert_eq!(bm[i], indices[..n].contains(&i));
        }

        for i in indices[n..].iter().copied() {
            bm.set(i, true);
        }

        for i in 0..u {
            assert_eq!(bm.get(i), indices.contains(&i));
        }

        for i in indices.iter().copied() {
            bm.set(i, false);
        }

        assert_eq!(bm.count_ones(), 0);
    }
}

#[test]
fn test_push_and_iter() {
    let mut rng = SmallRng::seed_from_u64(0);
    let bits = (0..1000).map(|_| rng.random_bool(0.3)).collect::<Vec<_>>();
    let mut bm = BitVec::new(0);
    for &bit in &bits {
        bm.push(bit);
    }
    assert_eq!(bm.len(), bits.len());
    assert_eq!(bm.iter().len(), bits.len());
    assert_eq!(bm.iter().collect::<Vec<_>>(), bits);
    assert_eq!(
        bm.count_ones(),
        bits.iter().filter(|&&b| b).count()
    );
    assert_eq!(bm, bits.iter().copied().collect::<BitVec>());
}

#[test]
fn test_append_bits() {
    let mut bm = BitVec::new(0);
    bm.append_bits(0b101, 3);
    bm.append_bits(u64::MAX, 64);
    bm.append_bits(0b10, 2);
    assert_eq!(bm.len(), 69);
    assert!(bm.get(0));
    assert!(!bm.get(1));
    assert!(bm.get(2));
    assert!((3..67).all(|i| bm.get(i)));
    assert!(!bm.get(67));
    assert!(bm.get(68));
    assert_eq!(bm.count_ones(), 67);
}

#[test]
fn test_get_word() {
    let mut rng = SmallRng::seed_from_u64(0);
    let bm = (0..300).map(|_| rng.random_bool(0.5)).collect::<BitVec>();
    for pos in 0..300 {
        let word = bm.get_word(pos);
        for k in 0..64 {
            let expected = pos + k < bm.len() && bm.get(pos + k);
            assert_eq!((word >> k) & 1 != 0, expected, "pos {} bit {}", pos, k);
        }
    }
    assert_eq!(bm.get_word(300), 0);
}

#[test]
fn test_resize() {
    let mut bm = BitVec::with_value(100, true);
    bm.resize(70, false);
    assert_eq!(bm.len(), 70);
    assert_eq!(bm.count_ones(), 70);
    bm.resize(200, false);
    assert_eq!(bm.len(), 200);
    assert_eq!(bm.count_ones(), 70);
    bm.resize(250, true);
    assert_eq!(bm.count_ones(), 120);
}

#[test]
fn test_macro() {
    let bm = bit_vec![0, 1, 1, 0, 1];
    assert_eq!(bm.len(), 5);
    assert_eq!(bm.count_ones(), 3);
    assert_eq!(bit_vec![true; 70].count_ones(), 70);
    assert_eq!(bit_vec![false; 70].count_ones(), 0);
    assert!(bit_vec![].is_empty());
}

#[test]
#[should_panic]
fn test_out_of_bounds() {
    let bm = BitVec::new(10);
    bm.get(10);
}
