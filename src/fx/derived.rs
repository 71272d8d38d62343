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

//! Queries over decoded trees which look at more than one node.

use super::syntax::ics::FolderChange;

/// Whether `bytes` consists only of zeroes.
///
/// A source key of all zeroes stands for "no object", most importantly the
/// parent of folders directly under the synchronisation root. An empty slice
/// counts.
pub fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| 0 == b)
}

/// Find the first folder change whose parent is neither the
/// synchronisation root nor a folder changed earlier in `changes`.
///
/// Hierarchy synchronisation must send parents before their children so a
/// client can apply the changes in order.
pub fn first_orphan(changes: &[FolderChange]) -> Option<usize> {
    changes.iter().enumerate().position(|(ix, change)| {
        let parent = match change.parent_source_key() {
            None => return false,
            Some(parent) if is_all_zero(parent) => return false,
            Some(parent) => parent,
        };

        !changes[..ix]
            .iter()
            .any(|earlier| Some(parent) == earlier.source_key())
    })
}

pub fn parent_before_children(changes: &[FolderChange]) -> bool {
    first_orphan(changes).is_none()
}
