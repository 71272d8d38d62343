//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Fxics.
//
// Fxics is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Fxics is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Fxics. If not, see <http://www.gnu.org/licenses/>.

use std::io;

use thiserror::Error;

/// Every way decoding a stream can fail.
///
/// All the stream variants are fatal: the decoder never recovers from a
/// malformed stream, it only reports where it stopped making sense.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Read of {wanted} bytes at offset {offset} overruns stream of {len} bytes"
    )]
    Bounds {
        offset: usize,
        wanted: usize,
        len: usize,
    },
    #[error("Expected marker {expected:#010X} at offset {offset}, found {found:#010X}")]
    MarkerMismatch {
        expected: u32,
        found: u32,
        offset: usize,
    },
    #[error("No alternative of {production} matches at offset {offset}")]
    Grammar {
        production: &'static str,
        offset: usize,
    },
    #[error("Unrecognised property type {ty:#06X} at offset {offset}")]
    UnknownPropType { ty: u16, offset: usize },
    #[error(
        "Expected property tag {expected:#010X} at offset {offset}, found {found:#010X}"
    )]
    PropTagMismatch {
        expected: u32,
        found: u32,
        offset: usize,
    },
    #[error("Malformed {0}")]
    Malformed(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
