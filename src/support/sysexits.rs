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

//! Exit codes from `sysexits.h`, as used by the `fxics` tool.

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

/// Bad command line.
pub const EX_USAGE: Sysexit = Sysexit(64);
/// The input file is not a well-formed stream of the requested kind.
pub const EX_DATAERR: Sysexit = Sysexit(65);
/// The input file could not be read.
pub const EX_NOINPUT: Sysexit = Sysexit(66);
/// Writing the output failed.
pub const EX_IOERR: Sysexit = Sysexit(74);
/// The configuration or logging configuration is unusable.
pub const EX_CONFIG: Sysexit = Sysexit(78);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }
}
