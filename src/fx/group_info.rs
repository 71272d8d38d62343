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

//! The property-group mapping carried by `IncrSyncGroupInfo`.
//!
//! Partial message changes say which property groups changed by index; this
//! is what the indices refer to. Layout, all integers little-endian `u32`:
//!
//! ```text
//! GroupId Reserved GroupCount
//!   { PropertyCount { PropTag [GUID Kind (LID | NameSize Name)] }* }*
//! ```
//!
//! Named tags (id `>= 0x8000`) are followed by the GUID and name. Unlike the
//! names in the property stream itself, the kind and name size are 32 bits
//! and the name is sized rather than null-terminated.

use std::slice;

use super::prop::tag::PropTag;
use super::prop::value::{NameKind, PropertyName};
use super::stream::FxStream;
use crate::support::codepage;
use crate::support::error::Error;

/// One property within a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupProperty {
    pub tag: PropTag,
    pub name: Option<PropertyName>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyGroupInfo {
    pub group_id: u32,
    pub reserved: u32,
    groups: Vec<Vec<GroupProperty>>,
}

impl PropertyGroupInfo {
    pub fn parse(blob: &[u8]) -> Result<Self, Error> {
        let mut stream = FxStream::new(blob);
        let group_id = stream.read_u32()?;
        let reserved = stream.read_u32()?;
        let group_count = stream.read_u32()?;

        // Every group is at least 4 bytes, which bounds how much a bogus
        // count can make us allocate.
        let mut groups =
            Vec::with_capacity((group_count as usize).min(blob.len() / 4));
        for _ in 0..group_count {
            let property_count = stream.read_u32()?;
            let mut properties = Vec::with_capacity(
                (property_count as usize).min(stream.remaining() / 4),
            );
            for _ in 0..property_count {
                properties.push(GroupProperty::parse(&mut stream)?);
            }
            groups.push(properties);
        }

        if !stream.is_end_of_stream() {
            return Err(Error::Malformed("PropertyGroupInfo trailing data"));
        }

        Ok(PropertyGroupInfo {
            group_id,
            reserved,
            groups,
        })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: u32) -> Option<&[GroupProperty]> {
        self.groups.get(index as usize).map(Vec::as_slice)
    }

    pub fn groups(&self) -> slice::Iter<'_, Vec<GroupProperty>> {
        self.groups.iter()
    }

    /// The index of the group holding `tag`, if any.
    pub fn group_of(&self, tag: PropTag) -> Option<u32> {
        self.groups
            .iter()
            .position(|g| g.iter().any(|p| p.tag == tag))
            .map(|ix| ix as u32)
    }
}

impl GroupProperty {
    fn parse(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let tag = PropTag(stream.read_u32()?);
        let name = if tag.is_named() {
            let guid = stream.read_guid()?;
            let kind = match stream.read_u32()? {
                0 => NameKind::Lid(stream.read_u32()?),
                1 => {
                    let size = stream.read_u32()? as usize;
                    let raw = stream.read_bytes(size)?;
                    NameKind::Name(codepage::decode_utf16le(&raw))
                }
                _ => {
                    return Err(Error::Malformed(
                        "PropertyGroupInfo name kind",
                    ))
                }
            };
            Some(PropertyName { guid, kind })
        } else {
            None
        };

        Ok(GroupProperty { tag, name })
    }
}
