/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Error types.
//!
//! Construction errors are always fatal to the build call: no partially
//! built structure is ever returned. Queries never fail: absence is reported
//! with [`None`], and out-of-bounds accesses panic.

/// Fatal build errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Too many bits: {0} > {max}", max = crate::rank_sel::SuccinctBitVec::MAX_LEN)]
    /// The bit vector exceeds the maximum representable length.
    TooManyBits(usize),
    #[error("Input too large: {0} elements (the maximum is {max})", max = u32::MAX - 1)]
    /// The (augmented) input sequence does not fit in 32-bit positions.
    InputTooLarge(usize),
    #[error("The sampling rate must be positive")]
    /// A zero suffix-array sampling rate was requested.
    InvalidSkip,
    #[error("Unsupported symbol bit width: {0}")]
    /// The alphabet needs more bits than a wavelet matrix supports.
    BitWidth(u32),
    #[error("Symbol {symbol} does not fit in {bit_width} bits")]
    /// A symbol does not fit in the requested bit width.
    SymbolTooLarge { symbol: u32, bit_width: u32 },
    #[error("Suffix-array construction failed: {0}")]
    /// The suffix-array construction rejected its input.
    SuffixArray(String),
    #[error("Dictionary construction failed: {0}")]
    /// No mergeable bigram was found while training a dictionary.
    Dictionary(String),
}

/// Errors happening while reading a serialized structure.
#[derive(thiserror::Error, Debug)]
pub enum SerdeError {
    #[error("I/O error: {0}")]
    /// The underlying reader or writer failed, or the stream is truncated.
    Io(#[from] std::io::Error),
    #[error("Malformed data: {0}")]
    /// The stream is well-formed at the byte level but inconsistent.
    Malformed(String),
}
