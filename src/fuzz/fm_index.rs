/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use crate::prelude::*;
use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
pub struct Data {
    text: Vec<u8>,
    pattern: Vec<u8>,
    skip: u8,
}

/// build an index on arbitrary text and check it against a naive scan
pub fn harness(mut data: Data) {
    data.text.truncate(1 << 16);
    // A small alphabet makes matches likely
    data.text.iter_mut().for_each(|c| *c %= 4);
    data.pattern.iter_mut().for_each(|c| *c %= 4);
    let skip = data.skip as u32 % 16 + 1;

    let fm: FmIndex<u8> = FmIndexBuilder::default()
        .skip(skip)
        .build(&data.text, dsi_progress_logger::no_logging![])
        .unwrap();
    assert_eq!(fm.text(), data.text);

    if data.pattern.is_empty() || data.pattern.len() > data.text.len() {
        return;
    }
    let expected = data
        .text
        .windows(data.pattern.len())
        .enumerate()
        .filter(|(_, w)| *w == &data.pattern[..])
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    assert_eq!(fm.locate_pattern(&data.pattern), expected);
    for &pos in &expected {
        assert_eq!(fm.extract(pos, data.pattern.len()), data.pattern);
    }
}
