/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]

pub mod bits;
pub mod error;
pub mod fm_index;
pub mod rank_sel;
pub mod traits;
pub mod utils;
pub mod wavelet;

#[cfg(feature = "fuzz")]
pub mod fuzz;

pub mod prelude {
    pub use crate::bit_vec;
    pub use crate::bits::*;
    pub use crate::error::*;
    pub use crate::fm_index::*;
    pub use crate::rank_sel::*;
    pub use crate::traits::*;
    pub use crate::wavelet::*;
}

/// Initializes the `env_logger` logger at level `info`, unless
/// overridden by the `RUST_LOG` environment variable.
pub fn init_env_logger() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}
