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

//! The catalog of 4-byte tags which are not ordinary properties.
//!
//! Markers delimit the elements of the grammar. Meta-properties look like
//! property tags and are followed by a value like one, but they change the
//! meaning of what follows instead of describing the object itself.

use std::fmt;

/// Every recognised marker and meta-property.
///
/// The discriminant is the little-endian `u32` that appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Marker {
    StartTopFld = 0x4009_0003,
    StartSubFld = 0x400A_0003,
    EndFolder = 0x400B_0003,
    StartMessage = 0x400C_0003,
    StartFAIMsg = 0x4010_0003,
    EndMessage = 0x400D_0003,
    StartEmbed = 0x4001_0003,
    EndEmbed = 0x4002_0003,
    StartRecip = 0x4003_0003,
    EndToRecip = 0x4004_0003,
    NewAttach = 0x4000_0003,
    EndAttach = 0x400E_0003,
    IncrSyncChg = 0x4012_0003,
    IncrSyncChgPartial = 0x407D_0003,
    IncrSyncDel = 0x4013_0003,
    IncrSyncEnd = 0x4014_0003,
    IncrSyncMessage = 0x4015_0003,
    IncrSyncRead = 0x402F_0003,
    IncrSyncStateBegin = 0x403A_0003,
    IncrSyncStateEnd = 0x403B_0003,
    IncrSyncProgressMode = 0x4074_000B,
    IncrSyncProgressPerMsg = 0x4075_000B,
    IncrSyncGroupInfo = 0x407B_0102,
    FXErrorInfo = 0x4018_0003,

    // Meta-properties
    FXDelProp = 0x4016_0003,
    EcWarning = 0x400F_0003,
    NewFXFolder = 0x4011_0102,
    IncrSyncGroupId = 0x407C_0003,
    IncrementalSyncMessagePartial = 0x407A_0003,
}

const ALL: [Marker; 29] = [
    Marker::StartTopFld,
    Marker::StartSubFld,
    Marker::EndFolder,
    Marker::StartMessage,
    Marker::StartFAIMsg,
    Marker::EndMessage,
    Marker::StartEmbed,
    Marker::EndEmbed,
    Marker::StartRecip,
    Marker::EndToRecip,
    Marker::NewAttach,
    Marker::EndAttach,
    Marker::IncrSyncChg,
    Marker::IncrSyncChgPartial,
    Marker::IncrSyncDel,
    Marker::IncrSyncEnd,
    Marker::IncrSyncMessage,
    Marker::IncrSyncRead,
    Marker::IncrSyncStateBegin,
    Marker::IncrSyncStateEnd,
    Marker::IncrSyncProgressMode,
    Marker::IncrSyncProgressPerMsg,
    Marker::IncrSyncGroupInfo,
    Marker::FXErrorInfo,
    Marker::FXDelProp,
    Marker::EcWarning,
    Marker::NewFXFolder,
    Marker::IncrSyncGroupId,
    Marker::IncrementalSyncMessagePartial,
];

impl Marker {
    pub fn from_u32(raw: u32) -> Option<Self> {
        ALL.iter().copied().find(|&m| m as u32 == raw)
    }

    pub fn all() -> &'static [Marker] {
        &ALL
    }

    /// Whether this is a meta-property rather than an element boundary.
    pub fn is_meta(self) -> bool {
        matches!(
            self,
            Marker::FXDelProp
                | Marker::EcWarning
                | Marker::NewFXFolder
                | Marker::IncrSyncGroupId
                | Marker::IncrementalSyncMessagePartial
        )
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        (self as u32).to_le_bytes()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({:#010X})", self, *self as u32)
    }
}

/// Whether `raw` is any recognised marker or meta-property.
pub fn is_marker_or_meta(raw: u32) -> bool {
    Marker::from_u32(raw).is_some()
}

/// Whether `raw` ends a run of properties.
///
/// Every marker and meta-property does except `EcWarning`, which carries an
/// inline error code of its own.
pub fn is_end_marker_except_warning(raw: u32) -> bool {
    match Marker::from_u32(raw) {
        Some(Marker::EcWarning) | None => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_round_trips_raw_values() {
        for &m in Marker::all() {
            assert_eq!(Some(m), Marker::from_u32(m as u32));
        }
        assert_eq!(None, Marker::from_u32(0x0037_001F));
    }

    #[test]
    fn catalog_values_are_unique() {
        let mut raw = Marker::all()
            .iter()
            .map(|&m| m as u32)
            .collect::<Vec<_>>();
        raw.sort_unstable();
        raw.dedup();
        assert_eq!(Marker::all().len(), raw.len());
    }

    #[test]
    fn classification() {
        assert!(Marker::FXDelProp.is_meta());
        assert!(Marker::EcWarning.is_meta());
        assert!(!Marker::StartMessage.is_meta());
        assert!(!Marker::IncrSyncGroupInfo.is_meta());

        assert!(is_end_marker_except_warning(Marker::EndMessage as u32));
        assert!(is_end_marker_except_warning(Marker::FXDelProp as u32));
        assert!(!is_end_marker_except_warning(Marker::EcWarning as u32));
        assert!(!is_end_marker_except_warning(0x0037_001F));

        assert!(is_marker_or_meta(Marker::EcWarning as u32));
        assert!(!is_marker_or_meta(0x0E21_0003));
    }

    #[test]
    fn wire_bytes_are_little_endian() {
        assert_eq!([0x03, 0x00, 0x0C, 0x40], Marker::StartMessage.to_le_bytes());
    }
}
