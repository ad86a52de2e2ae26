/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Linear-time suffix-array construction by induced sorting (SA-IS).

The algorithm has been described by Ge Nong, Sen Zhang and Wai Hong Chan in
“Two Efficient Algorithms for Linear Time Suffix Array Construction”,
_IEEE Transactions on Computers_, 60(10):1471–1484, 2011.

Suffixes are classified as _S_ (smaller than the following suffix) or _L_
(larger). Leftmost S suffixes (_LMS_) are placed at the end of their
buckets, and the order of all other suffixes is induced from them by a
left-to-right scan (L suffixes) and a right-to-left scan (S suffixes).
After the first induction, LMS substrings are sorted; if their names are not
unique, the suffix array of the string of names is computed recursively,
and a final induction from the correctly sorted LMS suffixes gives the
suffix array.

*/

use crate::error::BuildError;

const EMPTY: u32 = u32::MAX;

/// Compute the suffix array of `text`.
///
/// The text must end with a zero, which must not appear elsewhere, and all
/// symbols must be smaller than `alphabet_size`. The length of the text must
/// be smaller than `u32::MAX`.
///
/// ```rust
/// use sufi::fm_index::sais::suffix_array;
///
/// // "banana" followed by the terminator
/// let text = [2, 1, 3, 1, 3, 1, 0];
/// assert_eq!(suffix_array(&text, 4).unwrap(), vec![6, 5, 3, 1, 0, 4, 2]);
/// ```
pub fn suffix_array(text: &[u32], alphabet_size: usize) -> Result<Vec<u32>, BuildError> {
    let n = text.len();
    if n >= EMPTY as usize {
        return Err(BuildError::SuffixArray(format!(
            "Text too long: {} symbols",
            n
        )));
    }
    if text.last() != Some(&0) {
        return Err(BuildError::SuffixArray(
            "The text must end with a zero".to_string(),
        ));
    }
    if let Some(pos) = text[..n - 1].iter().position(|&c| c == 0) {
        return Err(BuildError::SuffixArray(format!(
            "Zero at position {} before the end of the text",
            pos
        )));
    }
    if let Some(&c) = text.iter().find(|&&c| c as usize >= alphabet_size) {
        return Err(BuildError::SuffixArray(format!(
            "Symbol {} out of alphabet of size {}",
            c, alphabet_size
        )));
    }

    let mut sa = vec![EMPTY; n];
    sais(text, &mut sa, alphabet_size);
    Ok(sa)
}

/// Return, for each position, whether the suffix starting there is of type S.
fn classify(s: &[u32]) -> Vec<bool> {
    let n = s.len();
    let mut is_s = vec![false; n];
    is_s[n - 1] = true;
    for i in (0..n - 1).rev() {
        is_s[i] = s[i] < s[i + 1] || (s[i] == s[i + 1] && is_s[i + 1]);
    }
    is_s
}

#[inline(always)]
fn is_lms(is_s: &[bool], i: usize) -> bool {
    i > 0 && is_s[i] && !is_s[i - 1]
}

/// Return the start of each bucket (`tails == false`) or the position of
/// its last element (`tails == true`).
///
/// The last position of an empty bucket starting at zero wraps around; such
/// buckets are never written.
fn buckets(bucket_sizes: &[usize], tails: bool) -> Vec<usize> {
    let mut sum = 0_usize;
    bucket_sizes
        .iter()
        .map(|&size| {
            sum += size;
            if tails {
                sum.wrapping_sub(1)
            } else {
                sum - size
            }
        })
        .collect()
}

fn induce_l(s: &[u32], sa: &mut [u32], is_s: &[bool], bucket_sizes: &[usize]) {
    let mut heads = buckets(bucket_sizes, false);
    for i in 0..s.len() {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let p = j as usize - 1;
        if !is_s[p] {
            let c = s[p] as usize;
            sa[heads[c]] = p as u32;
            heads[c] += 1;
        }
    }
}

fn induce_s(s: &[u32], sa: &mut [u32], is_s: &[bool], bucket_sizes: &[usize]) {
    let mut tails = buckets(bucket_sizes, true);
    for i in (0..s.len()).rev() {
        let j = sa[i];
        if j == EMPTY || j == 0 {
            continue;
        }
        let p = j as usize - 1;
        if is_s[p] {
            let c = s[p] as usize;
            sa[tails[c]] = p as u32;
            tails[c] = tails[c].wrapping_sub(1);
        }
    }
}

/// Return whether the LMS substrings starting at `i` and `j` are equal,
/// comparing both symbols and types up to the next LMS position.
fn lms_substrings_equal(s: &[u32], is_s: &[bool], i: usize, j: usize) -> bool {
    let n = s.len();
    let mut k = 0;
    loop {
        if i + k >= n || j + k >= n {
            return false;
        }
        if s[i + k] != s[j + k] || is_s[i + k] != is_s[j + k] {
            return false;
        }
        if k > 0 {
            let end_i = is_lms(is_s, i + k);
            let end_j = is_lms(is_s, j + k);
            if end_i || end_j {
                return end_i && end_j;
            }
        }
        k += 1;
    }
}

/// Place the given LMS positions at the end of their buckets, preserving
/// their relative order.
fn place_lms(
    s: &[u32],
    sa: &mut [u32],
    lms: impl DoubleEndedIterator<Item = usize>,
    bucket_sizes: &[usize],
) {
    let mut tails = buckets(bucket_sizes, true);
    sa.fill(EMPTY);
    for pos in lms.rev() {
        let c = s[pos] as usize;
        sa[tails[c]] = pos as u32;
        tails[c] = tails[c].wrapping_sub(1);
    }
}

fn sais(s: &[u32], sa: &mut [u32], alphabet_size: usize) {
    let n = s.len();
    if n == 1 {
        sa[0] = 0;
        return;
    }

    let is_s = classify(s);
    let mut bucket_sizes = vec![0_usize; alphabet_size];
    for &c in s {
        bucket_sizes[c as usize] += 1;
    }

    // Text order is fine here: only LMS substrings are sorted by this pass
    let lms_positions = (1..n).filter(|&i| is_lms(&is_s, i)).collect::<Vec<_>>();
    place_lms(s, sa, lms_positions.iter().copied(), &bucket_sizes);
    induce_l(s, sa, &is_s, &bucket_sizes);
    induce_s(s, sa, &is_s, &bucket_sizes);

    // Name the sorted LMS substrings
    let mut names = vec![EMPTY; n];
    let mut num_names = 0_u32;
    let mut prev: Option<usize> = None;
    for &pos in sa.iter() {
        let pos = pos as usize;
        if pos == EMPTY as usize || !is_lms(&is_s, pos) {
            continue;
        }
        if let Some(prev) = prev {
            if !lms_substrings_equal(s, &is_s, prev, pos) {
                num_names += 1;
            }
        }
        names[pos] = num_names;
        prev = Some(pos);
    }
    let num_names = num_names as usize + 1;

    let reduced = lms_positions
        .iter()
        .map(|&pos| names[pos])
        .collect::<Vec<_>>();
    let mut reduced_sa = vec![EMPTY; reduced.len()];
    if num_names < reduced.len() {
        sais(&reduced, &mut reduced_sa, num_names);
    } else {
        for (i, &name) in reduced.iter().enumerate() {
            reduced_sa[name as usize] = i as u32;
        }
    }

    place_lms(
        s,
        sa,
        reduced_sa.iter().map(|&i| lms_positions[i as usize]),
        &bucket_sizes,
    );
    induce_l(s, sa, &is_s, &bucket_sizes);
    induce_s(s, sa, &is_s, &bucket_sizes);
}
