/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Main traits for succinct data structures.

*/

pub mod rank_sel;
pub use rank_sel::*;

pub mod serdes;
pub use serdes::{load, store, Deserialize, Serialize};
