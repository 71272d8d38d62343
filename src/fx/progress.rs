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

//! The `ProgressInformation` blob carried by `IncrSyncProgressMode`.

use super::stream::FxStream;
use crate::support::error::Error;

pub const PROGRESS_INFORMATION_LEN: usize = 32;

/// Totals for a whole contents synchronisation, split by whether messages
/// are folder-associated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressInformation {
    pub version: u16,
    pub fai_message_count: u32,
    pub fai_message_total_size: u64,
    pub normal_message_count: u32,
    pub normal_message_total_size: u64,
}

impl ProgressInformation {
    pub fn parse(blob: &[u8]) -> Result<Self, Error> {
        if PROGRESS_INFORMATION_LEN != blob.len() {
            return Err(Error::Malformed("ProgressInformation size"));
        }

        let mut stream = FxStream::new(blob);
        let version = stream.read_u16()?;
        stream.read_u16()?;
        let fai_message_count = stream.read_u32()?;
        let fai_message_total_size = stream.read_u64()?;
        let normal_message_count = stream.read_u32()?;
        stream.read_u32()?;
        let normal_message_total_size = stream.read_u64()?;

        Ok(ProgressInformation {
            version,
            fai_message_count,
            fai_message_total_size,
            normal_message_count,
            normal_message_total_size,
        })
    }

    pub fn total_count(&self) -> u64 {
        u64::from(self.fai_message_count) + u64::from(self.normal_message_count)
    }

    pub fn total_size(&self) -> u64 {
        self.fai_message_total_size
            .saturating_add(self.normal_message_total_size)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fx::test_stream::StreamBuilder;

    #[test]
    fn parse_progress() {
        let blob = StreamBuilder::new()
            .u16(0)
            .u16(0)
            .u32(2)
            .u64(300)
            .u32(5)
            .u32(0)
            .u64(10_000)
            .build();
        let info = ProgressInformation::parse(&blob).unwrap();
        assert_eq!(2, info.fai_message_count);
        assert_eq!(300, info.fai_message_total_size);
        assert_eq!(5, info.normal_message_count);
        assert_eq!(10_000, info.normal_message_total_size);
        assert_eq!(7, info.total_count());
        assert_eq!(10_300, info.total_size());

        assert_matches!(
            Err(Error::Malformed("ProgressInformation size")),
            ProgressInformation::parse(&blob[1..])
        );
    }
}
