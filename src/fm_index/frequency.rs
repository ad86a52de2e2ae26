/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::error::SerdeError;
use crate::traits::serdes::*;
use mem_dbg::*;
use std::io::{Read, Write};

/**

A bijection between the distinct symbols of a sequence and dense indices
starting from one, assigned by decreasing frequency.

Index one is assigned to the most frequent symbol; symbols with the same
frequency are ordered by value. Index zero is never assigned, so that it
can be used as a terminator.

```rust
use sufi::fm_index::Frequency;

let freq = Frequency::new([7, 3, 7, 9, 3, 7]);
assert_eq!(freq.len(), 3);
assert_eq!(freq.index(7), Some(1));
assert_eq!(freq.index(3), Some(2));
assert_eq!(freq.index(9), Some(3));
assert_eq!(freq.index(4), None);
assert_eq!(freq.symbol(2), Some(3));
assert_eq!(freq.count(7), 3);
```

*/
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct Frequency {
    /// The symbol of index `i + 1`.
    symbols: Vec<u32>,
    /// The frequency of the symbol of index `i + 1`.
    counts: Vec<u32>,
    /// Indices sorted by symbol.
    by_symbol: Vec<u32>,
}

impl Frequency {
    /// Compute the frequency table of a sequence of symbols.
    pub fn new(symbols: impl IntoIterator<Item = u32>) -> Self {
        let mut sorted = symbols.into_iter().collect::<Vec<_>>();
        sorted.sort_unstable();
        let mut pairs = Vec::<(u32, u32)>::new();
        for symbol in sorted {
            match pairs.last_mut() {
                Some((last, count)) if *last == symbol => *count += 1,
                _ => pairs.push((symbol, 1)),
            }
        }
        pairs.sort_by_key(|&(symbol, count)| (std::cmp::Reverse(count), symbol));
        Self::from_pairs(pairs)
    }

    /// Build the table from (symbol, frequency) pairs already in index order.
    fn from_pairs(pairs: Vec<(u32, u32)>) -> Self {
        let symbols = pairs.iter().map(|&(s, _)| s).collect::<Vec<_>>();
        let counts = pairs.iter().map(|&(_, c)| c).collect();
        let mut by_symbol = (1..=symbols.len() as u32).collect::<Vec<_>>();
        by_symbol.sort_unstable_by_key(|&i| symbols[i as usize - 1]);
        Self {
            symbols,
            counts,
            by_symbol,
        }
    }

    /// Return the number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Return the index of `symbol`, or `None` if it does not appear.
    pub fn index(&self, symbol: u32) -> Option<u32> {
        self.by_symbol
            .binary_search_by_key(&symbol, |&i| self.symbols[i as usize - 1])
            .ok()
            .map(|k| self.by_symbol[k])
    }

    /// Return the symbol of given index, or `None` if the index is zero or
    /// too large.
    pub fn symbol(&self, index: u32) -> Option<u32> {
        index
            .checked_sub(1)
            .and_then(|i| self.symbols.get(i as usize).copied())
    }

    /// Return the number of occurrences of `symbol`.
    pub fn count(&self, symbol: u32) -> usize {
        self.index(symbol)
            .map_or(0, |i| self.counts[i as usize - 1] as usize)
    }

    /// Return an iterator over (symbol, frequency) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.symbols
            .iter()
            .zip(&self.counts)
            .map(|(&s, &c)| (s, c as usize))
    }
}

/// Layout: the number of symbols as a `u64`, followed by the symbol and
/// its frequency as `u32` for each index.
impl Serialize for Frequency {
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError> {
        let mut written = write_word(backend, self.len() as u64)?;
        for (&symbol, &count) in self.symbols.iter().zip(&self.counts) {
            written += write_word(backend, symbol)?;
            written += write_word(backend, count)?;
        }
        Ok(written)
    }
}

impl Deserialize for Frequency {
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError> {
        let len = read_len(backend)?;
        let mut pairs = Vec::with_capacity(len.min(1 << 16));
        for _ in 0..len {
            let symbol = read_word::<u32>(backend)?;
            let count = read_word::<u32>(backend)?;
            pairs.push((symbol, count));
        }
        ensure(pairs.iter().all(|&(_, c)| c > 0), || {
            "Zero frequency".to_string()
        })?;
        // Strictly increasing keys imply distinct symbols with the same frequency
        ensure(
            pairs.windows(2).all(|w| {
                (std::cmp::Reverse(w[0].1), w[0].0) < (std::cmp::Reverse(w[1].1), w[1].0)
            }),
            || "Frequency table not in index order".to_string(),
        )?;
        let result = Self::from_pairs(pairs);
        ensure(
            result
                .by_symbol
                .windows(2)
                .all(|w| result.symbols[w[0] as usize - 1] < result.symbols[w[1] as usize - 1]),
            || "Duplicate symbols".to_string(),
        )?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties() {
        let freq = Frequency::new([5, 1, 5, 1, 3]);
        assert_eq!(
            freq.iter().collect::<Vec<_>>(),
            vec![(1, 2), (5, 2), (3, 1)]
        );
        assert_eq!(freq.symbol(0), None);
        assert_eq!(freq.symbol(4), None);
        assert_eq!(freq.count(2), 0);
    }

    #[test]
    fn test_empty() {
        let freq = Frequency::new(std::iter::empty());
        assert!(freq.is_empty());
        assert_eq!(freq.index(0), None);
    }
}
