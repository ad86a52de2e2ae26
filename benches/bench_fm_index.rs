use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use dsi_progress_logger::no_logging;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sufi::prelude::*;

const LENS: [usize; 3] = [1 << 16, 1 << 20, 1 << 22];

pub fn bench_rank_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("succinct_bit_vec");
    let mut rng = SmallRng::seed_from_u64(0);
    for len in LENS {
        for density in [0.25, 0.5, 0.75] {
            let bits = (0..len).map(|_| rng.random_bool(density)).collect::<BitVec>();
            let sbv = SuccinctBitVec::new(bits).unwrap();
            let num_ones = sbv.count_ones();
            group.bench_with_input(
                BenchmarkId::new("rank", format!("{}_{}", len, density)),
                &len,
                |b, _| b.iter(|| black_box(sbv.rank(rng.random_range(0..len)))),
            );
            group.bench_with_input(
                BenchmarkId::new("select", format!("{}_{}", len, density)),
                &len,
                |b, _| b.iter(|| black_box(sbv.select(rng.random_range(0..num_ones)))),
            );
        }
    }
    group.finish();
}

/// A text over a small alphabet with some repetitions.
fn text(len: usize, rng: &mut SmallRng) -> Vec<u8> {
    let mut text = Vec::with_capacity(len);
    while text.len() < len {
        if text.len() > 100 && rng.random_bool(0.3) {
            let start = rng.random_range(0..text.len() - 100);
            text.extend_from_within(start..start + 100);
        } else {
            text.extend((0..100).map(|_| b'a' + rng.random_range(0..8_u8)));
        }
    }
    text.truncate(len);
    text
}

pub fn bench_fm_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm_index");
    let mut rng = SmallRng::seed_from_u64(0);
    for len in LENS {
        let text = text(len, &mut rng);
        let fm: FmIndex<u8> = FmIndexBuilder::default()
            .build(&text, no_logging![])
            .unwrap();
        let compressed: FmIndex<u8, CompressedBitVec> = FmIndexBuilder::default()
            .build(&text, no_logging![])
            .unwrap();
        let patterns = (0..1000)
            .map(|_| {
                let start = rng.random_range(0..len - 8);
                text[start..start + 8].to_vec()
            })
            .collect::<Vec<_>>();

        group.bench_with_input(BenchmarkId::new("count", len), &len, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % patterns.len();
                black_box(fm.count(&patterns[i]))
            })
        });
        group.bench_with_input(BenchmarkId::new("count_compressed", len), &len, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % patterns.len();
                black_box(compressed.count(&patterns[i]))
            })
        });
        group.bench_with_input(BenchmarkId::new("locate", len), &len, |b, _| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % patterns.len();
                black_box(fm.locate_pattern(&patterns[i]))
            })
        });
        group.bench_with_input(BenchmarkId::new("extract", len), &len, |b, _| {
            b.iter(|| black_box(fm.extract(rng.random_range(0..len), 64)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rank_select, bench_fm_index);
criterion_main!(benches);
