/*
 *
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dsi_progress_logger::*;
use log::info;
use mem_dbg::*;
use sufi::prelude::*;

#[derive(Parser, Debug)]
#[command(about = "Build and query FM-indices over byte sequences", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an FM-index on the bytes of a file and serialize it.
    Build {
        /// The file to index.
        source: PathBuf,
        /// The file where the index will be stored.
        dest: PathBuf,
        /// The suffix-array sampling rate.
        #[arg(short, long, default_value_t = 32)]
        skip: u32,
        /// Remap bytes to dense codes by decreasing frequency.
        #[arg(short, long)]
        remap: bool,
        /// Add select samples to the wavelet matrix.
        #[arg(long)]
        select_samples: bool,
        /// Use compressed bit vectors in the wavelet matrix.
        #[arg(short, long)]
        compressed: bool,
    },
    /// Print the number of occurrences and the positions of patterns.
    Search {
        /// A serialized index.
        index: PathBuf,
        /// The patterns to search for.
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Print at most this number of positions per pattern.
        #[arg(short, long, default_value_t = 10)]
        max_positions: usize,
        /// The index uses compressed bit vectors.
        #[arg(short, long)]
        compressed: bool,
    },
    /// Print a substring of the indexed file.
    Extract {
        /// A serialized index.
        index: PathBuf,
        /// The starting position.
        pos: usize,
        /// The number of bytes to extract.
        len: usize,
        /// The index uses compressed bit vectors.
        #[arg(short, long)]
        compressed: bool,
    },
    /// Print the memory usage of an index.
    Stats {
        /// A serialized index.
        index: PathBuf,
        /// The index uses compressed bit vectors.
        #[arg(short, long)]
        compressed: bool,
    },
}

fn load_index<B: Deserialize + BitAccess + BitCount + Rank>(path: &Path) -> Result<FmIndex<u8, B>> {
    load(path).with_context(|| format!("Cannot load index from {}", path.display()))
}

fn build<B: TryFrom<BitVec, Error = BuildError> + BitAccess + Rank + Serialize>(
    builder: FmIndexBuilder,
    text: &[u8],
    dest: &Path,
    pl: &mut impl ProgressLog,
) -> Result<()> {
    let fm: FmIndex<u8, B> = builder.build(text, pl)?;
    let written = store(&fm, dest)
        .with_context(|| format!("Cannot store index to {}", dest.display()))?;
    info!(
        "Stored {} bytes ({:.3} bits per symbol)",
        written,
        written as f64 * 8.0 / text.len().max(1) as f64
    );
    Ok(())
}

fn search<B: BitAccess + Rank>(fm: &FmIndex<u8, B>, patterns: &[String], max_positions: usize) {
    for pattern in patterns {
        match fm.get_range(pattern.as_bytes()) {
            Some(range) => {
                let mut positions = fm.locate(range.clone()).take(max_positions).collect::<Vec<_>>();
                positions.sort_unstable();
                println!("{}\t{}\t{:?}", pattern, range.len(), positions);
            }
            None => println!("{}\t0\t[]", pattern),
        }
    }
}

fn stats<B: MemDbg + MemSize>(fm: &FmIndex<u8, B>) -> Result<()> {
    println!(
        "{} symbols, alphabet size {}, skip {}",
        fm.text_len(),
        fm.alphabet_size(),
        fm.skip()
    );
    fm.mem_dbg(DbgFlags::default())?;
    Ok(())
}

fn main() -> Result<()> {
    sufi::init_env_logger()?;

    let args = Args::parse();

    match args.command {
        Command::Build {
            source,
            dest,
            skip,
            remap,
            select_samples,
            compressed,
        } => {
            let text = std::fs::read(&source)
                .with_context(|| format!("Cannot read {}", source.display()))?;
            let builder = FmIndexBuilder::default()
                .skip(skip)
                .remap(remap)
                .select_samples(select_samples);
            let mut pl = ProgressLogger::default();
            pl.display_memory(true);
            if compressed {
                build::<CompressedBitVec>(builder, &text, &dest, &mut pl)?;
            } else {
                build::<SuccinctBitVec>(builder, &text, &dest, &mut pl)?;
            }
        }
        Command::Search {
            index,
            patterns,
            max_positions,
            compressed,
        } => {
            if compressed {
                search(&load_index::<CompressedBitVec>(&index)?, &patterns, max_positions);
            } else {
                search(&load_index::<SuccinctBitVec>(&index)?, &patterns, max_positions);
            }
        }
        Command::Extract {
            index,
            pos,
            len,
            compressed,
        } => {
            let bytes = if compressed {
                load_index::<CompressedBitVec>(&index)?.extract(pos, len)
            } else {
                load_index::<SuccinctBitVec>(&index)?.extract(pos, len)
            };
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Stats { index, compressed } => {
            if compressed {
                stats(&load_index::<CompressedBitVec>(&index)?)?;
            } else {
                stats(&load_index::<SuccinctBitVec>(&index)?)?;
            }
        }
    }

    Ok(())
}
