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

//! Decoding of FastTransfer streams.
//!
//! `FxStream` is the cursor; `syntax` holds one type per grammar production;
//! the remaining modules interpret binary blobs carried inside properties.

pub mod derived;
pub mod group_info;
pub mod idset;
pub mod marker;
pub mod progress;
pub mod prop;
pub mod replica_info;
pub mod stream;
pub mod syntax;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub mod test_stream;
