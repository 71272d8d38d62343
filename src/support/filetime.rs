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

//! Conversion of Windows FILETIME values.

use std::convert::TryFrom;

use chrono::prelude::*;

/// Number of 100ns intervals between 1601-01-01 and 1970-01-01.
pub const UNIX_EPOCH_FILETIME: u64 = 116_444_736_000_000_000;

const TICKS_PER_SECOND: u64 = 10_000_000;

/// Convert a FILETIME to a UTC timestamp.
///
/// Returns `None` for values before the Unix epoch and for values chrono
/// cannot represent. In practice the former only happens for the zero
/// "never" value.
pub fn to_utc(filetime: u64) -> Option<DateTime<Utc>> {
    let since_epoch = filetime.checked_sub(UNIX_EPOCH_FILETIME)?;
    let secs = since_epoch / TICKS_PER_SECOND;
    let nanos = (since_epoch % TICKS_PER_SECOND) * 100;
    if secs > i64::MAX as u64 {
        return None;
    }

    Utc.timestamp_opt(secs as i64, nanos as u32).single()
}

/// Convert a UTC timestamp back to a FILETIME.
pub fn from_utc(dt: DateTime<Utc>) -> Option<u64> {
    let secs = u64::try_from(dt.timestamp()).ok()?;
    secs.checked_mul(TICKS_PER_SECOND)?
        .checked_add(u64::from(dt.timestamp_subsec_nanos()) / 100)?
        .checked_add(UNIX_EPOCH_FILETIME)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn epoch_boundaries() {
        assert_eq!(None, to_utc(0));
        assert_eq!(
            Utc.timestamp_opt(0, 0).single(),
            to_utc(UNIX_EPOCH_FILETIME)
        );
    }

    #[test]
    fn sub_second_precision() {
        let dt = to_utc(132_223_104_000_000_001).unwrap();
        assert_eq!(100, dt.timestamp_subsec_nanos());
        assert_eq!(Some(132_223_104_000_000_001), from_utc(dt));
    }

    #[test]
    fn known_date() {
        assert_eq!(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single(),
            to_utc(132_223_104_000_000_000)
        );
    }
}
