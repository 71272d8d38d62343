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

//! The `FolderReplicaInfo` blob carried by `NewFXFolder`.
//!
//! `NewFXFolder` marks a public folder whose content lives on a different
//! server, so instead of the folder's messages the stream carries where to
//! find them.

use super::stream::{FxStream, Guid};
use crate::support::error::Error;

/// A LongTermID: the replica GUID and GLOBCNT identifying an object
/// independent of any one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongTermId {
    pub database_guid: Guid,
    pub globcnt: [u8; 6],
}

impl LongTermId {
    fn parse(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let database_guid = stream.read_guid()?;
        let mut globcnt = [0u8; 6];
        globcnt.copy_from_slice(&stream.read_bytes(6)?);
        // Padding
        stream.read_u16()?;
        Ok(LongTermId {
            database_guid,
            globcnt,
        })
    }

    pub fn globcnt_value(&self) -> u64 {
        self.globcnt
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderReplicaInfo {
    pub flags: u32,
    pub depth: u32,
    pub folder_long_term_id: LongTermId,
    /// The number of leading entries of `server_dns` which are as cheap to
    /// reach as each other.
    pub cheap_server_dn_count: u32,
    pub server_dns: Vec<String>,
}

impl FolderReplicaInfo {
    pub fn parse(blob: &[u8]) -> Result<Self, Error> {
        let mut stream = FxStream::new(blob);
        let flags = stream.read_u32()?;
        let depth = stream.read_u32()?;
        let folder_long_term_id = LongTermId::parse(&mut stream)?;
        let server_dn_count = stream.read_u32()?;
        let cheap_server_dn_count = stream.read_u32()?;
        if cheap_server_dn_count > server_dn_count {
            return Err(Error::Malformed("FolderReplicaInfo cheap DN count"));
        }

        let mut server_dns = Vec::new();
        for _ in 0..server_dn_count {
            server_dns.push(read_ascii_z(&mut stream)?);
        }

        if !stream.is_end_of_stream() {
            return Err(Error::Malformed("FolderReplicaInfo trailing data"));
        }

        Ok(FolderReplicaInfo {
            flags,
            depth,
            folder_long_term_id,
            cheap_server_dn_count,
            server_dns,
        })
    }

    pub fn cheap_server_dns(&self) -> &[String] {
        &self.server_dns[..self.cheap_server_dn_count as usize]
    }
}

fn read_ascii_z(stream: &mut FxStream<'_>) -> Result<String, Error> {
    let rest = stream.rest();
    let end = memchr::memchr(0, rest)
        .ok_or(Error::Malformed("FolderReplicaInfo unterminated DN"))?;
    if !rest[..end].is_ascii() {
        return Err(Error::Malformed("FolderReplicaInfo non-ASCII DN"));
    }

    let dn = String::from_utf8_lossy(&rest[..end]).into_owned();
    stream.read_bytes(end + 1)?;
    Ok(dn)
}
