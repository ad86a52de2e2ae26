/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Flat binary serialization.

All structures of this crate are serialized as a sequence of little-endian
fixed-width integers; arrays are prefixed by their length as a `u64`. The
layout of each structure is documented in its implementation of [`Serialize`].

[`store`] and [`load`] are convenience functions writing to and reading from
files.

*/

use crate::error::SerdeError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

/// Serialization to a flat byte stream.
pub trait Serialize {
    /// Write this structure to `backend`, returning the number of bytes written.
    fn serialize(&self, backend: &mut impl Write) -> Result<usize, SerdeError>;
}

/// Deserialization from a flat byte stream.
pub trait Deserialize: Sized {
    /// Read a structure previously written by [`Serialize::serialize`].
    ///
    /// Truncated or inconsistent streams cause an error; no attempt is made
    /// to recover partial data.
    fn deserialize(backend: &mut impl Read) -> Result<Self, SerdeError>;
}

/// Serialize a structure to a file.
pub fn store<S: Serialize>(s: &S, path: impl AsRef<Path>) -> Result<usize, SerdeError> {
    let mut file = BufWriter::new(File::create(path)?);
    let written = s.serialize(&mut file)?;
    file.flush()?;
    Ok(written)
}

/// Deserialize a structure from a file.
pub fn load<S: Deserialize>(path: impl AsRef<Path>) -> Result<S, SerdeError> {
    let mut file = BufReader::new(File::open(path)?);
    S::deserialize(&mut file)
}

/// Words that can be written and read with a fixed width.
pub(crate) trait Word: Sized + Copy {
    const BYTES: usize;
    fn write_to(self, backend: &mut impl Write) -> std::io::Result<()>;
    fn read_from(backend: &mut impl Read) -> std::io::Result<Self>;
}

macro_rules! impl_word {
    ($( ($ty:ty, $write:ident, $read:ident) ),*) => {$(
        impl Word for $ty {
            const BYTES: usize = std::mem::size_of::<$ty>();
            #[inline(always)]
            fn write_to(self, backend: &mut impl Write) -> std::io::Result<()> {
                backend.$write::<LittleEndian>(self)
            }
            #[inline(always)]
            fn read_from(backend: &mut impl Read) -> std::io::Result<Self> {
                backend.$read::<LittleEndian>()
            }
        }
    )*};
}

impl_word!(
    (u32, write_u32, read_u32),
    (u64, write_u64, read_u64),
    (i32, write_i32, read_i32)
);

impl Word for u8 {
    const BYTES: usize = 1;
    #[inline(always)]
    fn write_to(self, backend: &mut impl Write) -> std::io::Result<()> {
        backend.write_u8(self)
    }
    #[inline(always)]
    fn read_from(backend: &mut impl Read) -> std::io::Result<Self> {
        backend.read_u8()
    }
}

#[inline(always)]
pub(crate) fn write_word<W: Word>(backend: &mut impl Write, word: W) -> Result<usize, SerdeError> {
    word.write_to(backend)?;
    Ok(W::BYTES)
}

#[inline(always)]
pub(crate) fn read_word<W: Word>(backend: &mut impl Read) -> Result<W, SerdeError> {
    Ok(W::read_from(backend)?)
}

/// Read a `u64` that must fit a `usize`.
pub(crate) fn read_len(backend: &mut impl Read) -> Result<usize, SerdeError> {
    let len = read_word::<u64>(backend)?;
    usize::try_from(len).map_err(|_| SerdeError::Malformed(format!("Length {} too large", len)))
}

/// Write a length-prefixed slice.
pub(crate) fn write_slice<W: Word>(backend: &mut impl Write, slice: &[W]) -> Result<usize, SerdeError> {
    let mut written = write_word(backend, slice.len() as u64)?;
    for &word in slice {
        written += write_word(backend, word)?;
    }
    Ok(written)
}

/// Read a length-prefixed slice.
///
/// The length is not trusted for preallocation, so that a corrupted prefix
/// results in an I/O error rather than in a huge allocation.
pub(crate) fn read_vec<W: Word>(backend: &mut impl Read) -> Result<Vec<W>, SerdeError> {
    let len = read_len(backend)?;
    let mut v = Vec::with_capacity(len.min(1 << 16));
    for _ in 0..len {
        v.push(read_word(backend)?);
    }
    Ok(v)
}

/// Return an error with the given message unless `cond` holds.
#[inline(always)]
pub(crate) fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<(), SerdeError> {
    if cond {
        Ok(())
    } else {
        Err(SerdeError::Malformed(msg()))
    }
}
