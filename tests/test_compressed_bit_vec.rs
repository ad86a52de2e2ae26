/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::io::Cursor;
use sufi::prelude::*;

/// Bits with runs of geometric length alternating with random bits.
fn clustered_bits(len: usize, rng: &mut SmallRng) -> BitVec {
    let mut bits = BitVec::new(0);
    while bits.len() < len {
        if rng.random_bool(0.5) {
            let value = rng.random_bool(0.5);
            let run = rng.random_range(1..5000);
            bits.extend(std::iter::repeat(value).take(run));
        } else {
            for _ in 0..rng.random_range(1..200) {
                bits.push(rng.random_bool(0.5));
            }
        }
    }
    bits.resize(len, false);
    bits
}

fn check(cbv: &CompressedBitVec, bits: &BitVec) {
    assert_eq!(cbv.len(), bits.len());
    assert_eq!(cbv.count_ones(), bits.count_ones());
    let mut ones = 0;
    for (i, bit) in bits.iter().enumerate() {
        assert_eq!(cbv.get(i), bit, "get({})", i);
        assert_eq!(cbv.rank(i), ones, "rank({})", i);
        assert_eq!(cbv.rank_zero(i), i - ones);
        ones += bit as usize;
    }
    assert_eq!(cbv.rank(bits.len()), ones);
    assert_eq!(cbv.rank(bits.len() + 100), ones);
}

#[test]
fn test_random() {
    let mut rng = SmallRng::seed_from_u64(0);
    for len in [1, 2, 63, 64, 65, 1000, 10_000] {
        for density in [0.0, 0.05, 0.5, 0.95, 1.0] {
            let bits = (0..len).map(|_| rng.random_bool(density)).collect::<BitVec>();
            let cbv = CompressedBitVec::new(bits.clone()).unwrap();
            check(&cbv, &bits);
        }
    }
}

#[test]
fn test_clustered() {
    let mut rng = SmallRng::seed_from_u64(0);
    let bits = clustered_bits(500_000, &mut rng);
    let cbv = CompressedBitVec::new(bits.clone()).unwrap();
    check(&cbv, &bits);
    // Long runs are encoded by few codes
    assert!(cbv.num_codes() * 8 < bits.len() / 4);
}

#[test]
fn test_same_answers_as_succinct() {
    let mut rng = SmallRng::seed_from_u64(1);
    let bits = clustered_bits(100_000, &mut rng);
    let cbv = CompressedBitVec::new(bits.clone()).unwrap();
    let sbv = SuccinctBitVec::new(bits).unwrap();
    for _ in 0..10_000 {
        let pos = rng.random_range(0..=sbv.len());
        assert_eq!(cbv.rank(pos), sbv.rank(pos));
        if pos < sbv.len() {
            assert_eq!(cbv.get(pos), sbv.get(pos));
        }
    }
}

#[test]
fn test_trained_dictionary() {
    // A periodic pattern that the base dictionary encodes poorly
    let pattern = 0x1A5B_u32;
    let bits = (0..50_000).map(|i| pattern >> (i % 13) & 1 != 0).collect::<BitVec>();
    let sample = (0..2_000).map(|i| pattern >> (i % 13) & 1 != 0).collect::<BitVec>();

    let dictionary = Dictionary::train(&sample, 160).unwrap();
    assert_eq!(dictionary.len(), 160);
    let trained = CompressedBitVec::with_dictionary(&bits, dictionary).unwrap();
    check(&trained, &bits);
    let base = CompressedBitVec::with_dictionary(&bits, Dictionary::base()).unwrap();
    assert_eq!(base.num_codes(), 50_000_usize.div_ceil(6));
    assert!(trained.num_codes() * 2 < base.num_codes());

    // The merges run out before reaching a full dictionary
    assert!(matches!(
        Dictionary::train(&sample, 200),
        Err(BuildError::Dictionary(_))
    ));
}

#[test]
fn test_default_dictionary() {
    let mut rng = SmallRng::seed_from_u64(3);
    let bits = clustered_bits(100_000, &mut rng);
    let cbv = CompressedBitVec::new(bits.clone()).unwrap();
    assert_eq!(cbv.dictionary(), &Dictionary::default());
    assert_eq!(cbv.dictionary().len(), Dictionary::MAX_CODES);
    check(&cbv, &bits);
}

#[test]
fn test_train_errors() {
    // Too small, too large, and a sample without pairs of codes
    let sample = BitVec::with_value(1000, true);
    assert!(matches!(
        Dictionary::train(&sample, 10),
        Err(BuildError::Dictionary(_))
    ));
    assert!(matches!(
        Dictionary::train(&sample, 257),
        Err(BuildError::Dictionary(_))
    ));
    assert!(matches!(
        Dictionary::train(&BitVec::new(3), 160),
        Err(BuildError::Dictionary(_))
    ));
}

#[test]
fn test_serdes() -> anyhow::Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    let bits = clustered_bits(100_000, &mut rng);
    let sample = clustered_bits(10_000, &mut rng);
    for cbv in [
        CompressedBitVec::new(bits.clone())?,
        CompressedBitVec::with_dictionary(&bits, Dictionary::train(&sample, 180)?)?,
    ] {
        let mut buf = vec![];
        let written = cbv.serialize(&mut buf)?;
        assert_eq!(written, buf.len());
        let loaded = CompressedBitVec::deserialize(&mut Cursor::new(&buf))?;
        assert_eq!(loaded, cbv);

        let res = CompressedBitVec::deserialize(&mut Cursor::new(&buf[..buf.len() - 3]));
        assert!(matches!(res, Err(SerdeError::Io(_))));
    }
    Ok(())
}

#[test]
fn test_serdes_corrupted() -> anyhow::Result<()> {
    let cbv = CompressedBitVec::new(BitVec::with_value(1000, true))?;
    let mut buf = vec![];
    cbv.serialize(&mut buf)?;
    // Wrong length
    buf[0] ^= 1;
    let res = CompressedBitVec::deserialize(&mut Cursor::new(&buf));
    assert!(matches!(res, Err(SerdeError::Malformed(_))));
    Ok(())
}
