/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Mutable [bit vectors](`mod@bit_vec`) used as raw input of succinct structures.

pub mod bit_vec;
pub use bit_vec::*;
