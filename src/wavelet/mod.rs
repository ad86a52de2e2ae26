/*
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Wavelet matrices over sequences of bounded-width symbols.

pub mod wavelet_matrix;
pub use wavelet_matrix::*;
