/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::io::Cursor;
use sufi::prelude::*;

fn random_symbols(len: usize, max: u32, rng: &mut SmallRng) -> Vec<u32> {
    (0..len).map(|_| rng.random_range(0..=max)).collect()
}

/// Check all queries against naive scans.
fn check<B: BitAccess + Rank>(wm: &WaveletMatrix<B>, symbols: &[u32]) {
    assert_eq!(wm.len(), symbols.len());
    let max = symbols.iter().copied().max().unwrap_or(0);
    for (pos, &symbol) in symbols.iter().enumerate() {
        assert_eq!(wm.get(pos), symbol);
    }
    for symbol in 0..=max + 1 {
        let mut rank = 0;
        let mut rank_lt = 0;
        for pos in 0..=symbols.len() {
            assert_eq!(wm.rank(symbol, pos), rank, "rank({}, {})", symbol, pos);
            assert_eq!(wm.rank_lt(symbol, pos), rank_lt, "rank_lt({}, {})", symbol, pos);
            if pos < symbols.len() {
                if symbols[pos] == symbol {
                    assert_eq!(wm.select(symbol, rank), Some(pos));
                    rank += 1;
                }
                if symbols[pos] < symbol {
                    rank_lt += 1;
                }
            }
        }
        assert_eq!(wm.count(symbol), rank);
        assert_eq!(wm.select(symbol, rank), None);
        assert_eq!(wm.rank(symbol, symbols.len() + 10), rank);
    }
}

#[test]
fn test_random() {
    let mut rng = SmallRng::seed_from_u64(0);
    for len in [1, 2, 10, 100, 1000] {
        for max in [0, 1, 2, 3, 7, 13, 100, 255] {
            let symbols = random_symbols(len, max, &mut rng);
            let wm = WaveletMatrix::<SuccinctBitVec>::new(&symbols).unwrap();
            check(&wm, &symbols);
        }
    }
}

#[test]
fn test_select_samples() {
    let mut rng = SmallRng::seed_from_u64(1);
    // Skewed distribution, so that some symbols have many samples
    let symbols = (0..20_000)
        .map(|_| rng.random_range(0..64_u32).trailing_zeros().min(6))
        .collect::<Vec<_>>();
    let wm: WaveletMatrix = WaveletMatrixBuilder::default()
        .select_samples(true)
        .build(&symbols)
        .unwrap();
    let plain = WaveletMatrix::<SuccinctBitVec>::new(&symbols).unwrap();
    for symbol in 0..=7 {
        let count = symbols.iter().filter(|&&s| s == symbol).count();
        for rank in 0..count {
            let expected = plain.select(symbol, rank);
            assert_eq!(wm.select(symbol, rank), expected);
            assert_eq!(wm.select_upwards(symbol, rank), expected);
        }
        assert_eq!(wm.select(symbol, count), None);
    }
}

#[test]
fn test_select_upwards() {
    let mut rng = SmallRng::seed_from_u64(2);
    let symbols = random_symbols(5000, 1000, &mut rng);
    let wm = WaveletMatrix::<SuccinctBitVec>::new(&symbols).unwrap();
    let mut counts = vec![0; 1002];
    for (pos, &symbol) in symbols.iter().enumerate() {
        assert_eq!(wm.select_upwards(symbol, counts[symbol as usize]), Some(pos));
        counts[symbol as usize] += 1;
    }
    for symbol in 0..1002 {
        assert_eq!(wm.select_upwards(symbol, counts[symbol as usize]), None);
    }
}

#[test]
fn test_compressed_backend() {
    let mut rng = SmallRng::seed_from_u64(3);
    // Runs of symbols compress well
    let mut symbols = vec![];
    while symbols.len() < 2000 {
        let symbol = rng.random_range(0..20);
        symbols.extend(std::iter::repeat(symbol).take(rng.random_range(1..100)));
    }
    let wm = WaveletMatrix::<CompressedBitVec>::new(&symbols).unwrap();
    check(&wm, &symbols);
}

#[test]
fn test_explicit_bit_width() {
    let symbols = [1, 0, 3, 3, 2];
    let wm: WaveletMatrix = WaveletMatrixBuilder::default()
        .bit_width(20)
        .build(&symbols)
        .unwrap();
    assert_eq!(wm.bit_width(), 20);
    assert_eq!(wm.levels().len(), 20);
    assert_eq!(wm.max_symbol(), 3);
    check(&wm, &symbols);
    assert_eq!(wm.rank(1 << 19, 5), 0);
    assert_eq!(wm.rank_lt(1 << 19, 5), 5);
}

#[test]
fn test_single_symbol() {
    let symbols = vec![5; 300];
    let wm = WaveletMatrix::<SuccinctBitVec>::new(&symbols).unwrap();
    check(&wm, &symbols);
    assert_eq!(wm.iter().collect::<Vec<_>>(), symbols);
}

#[test]
fn test_serdes() -> anyhow::Result<()> {
    let mut rng = SmallRng::seed_from_u64(4);
    let symbols = random_symbols(3000, 50, &mut rng);
    for select_samples in [false, true] {
        let wm: WaveletMatrix = WaveletMatrixBuilder::default()
            .select_samples(select_samples)
            .build(&symbols)?;
        let mut buf = vec![];
        let written = wm.serialize(&mut buf)?;
        assert_eq!(written, buf.len());
        let loaded = WaveletMatrix::<SuccinctBitVec>::deserialize(&mut Cursor::new(&buf))?;
        assert_eq!(loaded, wm);

        // The bit width is the second word
        let mut bad = buf.clone();
        bad[8] = 30;
        let res = WaveletMatrix::<SuccinctBitVec>::deserialize(&mut Cursor::new(&bad));
        assert!(matches!(res, Err(SerdeError::Malformed(_))));

        let res = WaveletMatrix::<SuccinctBitVec>::deserialize(&mut Cursor::new(&buf[..100]));
        assert!(res.is_err());
    }

    let wm = WaveletMatrix::<CompressedBitVec>::new(&symbols)?;
    let mut buf = vec![];
    wm.serialize(&mut buf)?;
    let loaded = WaveletMatrix::<CompressedBitVec>::deserialize(&mut Cursor::new(&buf))?;
    assert_eq!(loaded, wm);
    Ok(())
}

#[test]
fn test_serdes_wrong_select_samples() -> anyhow::Result<()> {
    // Symbol 6 occurs 142 times, so it has three samples
    let symbols = (0..1000).map(|i| i % 7).collect::<Vec<u32>>();
    let wm: WaveletMatrix = WaveletMatrixBuilder::default()
        .select_samples(true)
        .build(&symbols)?;
    let mut buf = vec![];
    wm.serialize(&mut buf)?;
    let loaded = WaveletMatrix::<SuccinctBitVec>::deserialize(&mut Cursor::new(&buf))?;
    assert_eq!(loaded.select(6, 128), Some(128 * 7 + 6));

    // The last sample of the last symbol closes the stream; moving it
    // keeps the samples sorted and in bounds
    let last = buf.len() - 4;
    let sample = u32::from_le_bytes(buf[last..].try_into()?);
    assert_eq!(sample, 128 * 7 + 6);
    for moved in [sample - 1, sample + 1] {
        let mut bad = buf.clone();
        bad[last..].copy_from_slice(&moved.to_le_bytes());
        let res = WaveletMatrix::<SuccinctBitVec>::deserialize(&mut Cursor::new(&bad));
        assert!(matches!(res, Err(SerdeError::Malformed(_))));
    }
    Ok(())
}
