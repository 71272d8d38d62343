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

use std::fmt;

/// A property type code.
///
/// The high bit marks a string in an explicit code page, in which case the
/// remaining bits are the code page number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropType(pub u16);

/// How values of a property type are laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    /// Exactly this many bytes.
    Fixed(usize),
    /// A length prefix followed by that many bytes.
    Variable,
    /// A count followed by that many fixed slots of this width.
    MultiFixed(usize),
    /// A count followed by that many length-prefixed values.
    MultiVariable,
}

impl PropType {
    pub const INT16: Self = PropType(0x0002);
    pub const INT32: Self = PropType(0x0003);
    pub const FLOAT32: Self = PropType(0x0004);
    pub const FLOAT64: Self = PropType(0x0005);
    pub const CURRENCY: Self = PropType(0x0006);
    pub const FLOATING_TIME: Self = PropType(0x0007);
    pub const ERROR_CODE: Self = PropType(0x000A);
    pub const BOOLEAN: Self = PropType(0x000B);
    pub const OBJECT: Self = PropType(0x000D);
    pub const INT64: Self = PropType(0x0014);
    pub const STRING8: Self = PropType(0x001E);
    pub const STRING: Self = PropType(0x001F);
    pub const TIME: Self = PropType(0x0040);
    pub const GUID: Self = PropType(0x0048);
    pub const SERVER_ID: Self = PropType(0x00FB);
    pub const BINARY: Self = PropType(0x0102);
    pub const MULTIPLE_INT16: Self = PropType(0x1002);
    pub const MULTIPLE_INT32: Self = PropType(0x1003);
    pub const MULTIPLE_FLOAT32: Self = PropType(0x1004);
    pub const MULTIPLE_FLOAT64: Self = PropType(0x1005);
    pub const MULTIPLE_CURRENCY: Self = PropType(0x1006);
    pub const MULTIPLE_FLOATING_TIME: Self = PropType(0x1007);
    pub const MULTIPLE_INT64: Self = PropType(0x1014);
    pub const MULTIPLE_STRING8: Self = PropType(0x101E);
    pub const MULTIPLE_STRING: Self = PropType(0x101F);
    pub const MULTIPLE_TIME: Self = PropType(0x1040);
    pub const MULTIPLE_GUID: Self = PropType(0x1048);
    pub const MULTIPLE_BINARY: Self = PropType(0x1102);

    const MULTIPLE: u16 = 0x1000;
    const CODEPAGE: u16 = 0x8000;

    /// Return the wire layout of this type, or `None` if it isn't one the
    /// stream can carry.
    pub fn class(self) -> Option<TypeClass> {
        if self.codepage().is_some() {
            return Some(TypeClass::Variable);
        }

        if let Some(width) = self.fixed_width() {
            return Some(TypeClass::Fixed(width));
        }

        match self {
            PropType::STRING8
            | PropType::STRING
            | PropType::BINARY
            | PropType::SERVER_ID
            | PropType::OBJECT => Some(TypeClass::Variable),

            PropType::MULTIPLE_STRING8
            | PropType::MULTIPLE_STRING
            | PropType::MULTIPLE_BINARY => Some(TypeClass::MultiVariable),

            PropType(raw) if raw & PropType::MULTIPLE != 0 => {
                PropType(raw & !PropType::MULTIPLE)
                    .fixed_width()
                    .filter(|_| self.is_multi_fixed())
                    .map(TypeClass::MultiFixed)
            }

            _ => None,
        }
    }

    fn is_multi_fixed(self) -> bool {
        matches!(
            self,
            PropType::MULTIPLE_INT16
                | PropType::MULTIPLE_INT32
                | PropType::MULTIPLE_FLOAT32
                | PropType::MULTIPLE_FLOAT64
                | PropType::MULTIPLE_CURRENCY
                | PropType::MULTIPLE_FLOATING_TIME
                | PropType::MULTIPLE_INT64
                | PropType::MULTIPLE_TIME
                | PropType::MULTIPLE_GUID
        )
    }

    pub fn fixed_width(self) -> Option<usize> {
        match self {
            PropType::INT16 | PropType::BOOLEAN => Some(2),
            PropType::INT32 | PropType::FLOAT32 | PropType::ERROR_CODE => {
                Some(4)
            }
            PropType::FLOAT64
            | PropType::CURRENCY
            | PropType::FLOATING_TIME
            | PropType::INT64
            | PropType::TIME => Some(8),
            PropType::GUID => Some(16),
            _ => None,
        }
    }

    /// The element type of a multi-valued type.
    pub fn element(self) -> Self {
        if self.codepage().is_some() {
            self
        } else {
            PropType(self.0 & !PropType::MULTIPLE)
        }
    }

    /// If this is a string type with an explicit code page, that code page.
    pub fn codepage(self) -> Option<u16> {
        if self.0 & PropType::CODEPAGE != 0 {
            Some(self.0 & !PropType::CODEPAGE)
        } else {
            None
        }
    }

    /// Whether values of this type are strings not in UTF-16.
    pub fn is_non_unicode_string(self) -> bool {
        self.codepage().is_some()
            || PropType::STRING8 == self
            || PropType::MULTIPLE_STRING8 == self
    }
}

impl fmt::Debug for PropType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PropType({:#06X})", self.0)
    }
}

/// A property tag: the property id in the high 16 bits and its type in the
/// low 16 bits.
///
/// On the wire this is a little-endian `u32`, so the type comes first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropTag(pub u32);

impl PropTag {
    pub const fn new(id: u16, ty: PropType) -> Self {
        PropTag(((id as u32) << 16) | ty.0 as u32)
    }

    pub fn id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn ty(self) -> PropType {
        PropType(self.0 as u16)
    }

    /// Named properties have ids in the upper half of the id space and are
    /// followed on the wire by their name.
    pub fn is_named(self) -> bool {
        self.id() >= 0x8000
    }
}

impl fmt::Debug for PropTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PropTag({:#010X})", self.0)
    }
}

impl From<u32> for PropTag {
    fn from(raw: u32) -> Self {
        PropTag(raw)
    }
}

/// Well-known property tags the decoders and extractors look for.
pub mod pid {
    use super::{PropTag, PropType};

    pub const ATTACH_NUMBER: PropTag = PropTag::new(0x0E21, PropType::INT32);
    pub const MESSAGE_FLAGS: PropTag = PropTag::new(0x0E07, PropType::INT32);
    pub const MESSAGE_SIZE: PropTag = PropTag::new(0x0E08, PropType::INT32);
    pub const MESSAGE_RECIPIENTS: PropTag =
        PropTag::new(0x0E12, PropType::OBJECT);
    pub const MESSAGE_ATTACHMENTS: PropTag =
        PropTag::new(0x0E13, PropType::OBJECT);
    pub const CONTAINER_HIERARCHY: PropTag =
        PropTag::new(0x360E, PropType::OBJECT);
    pub const CONTAINER_CONTENTS: PropTag =
        PropTag::new(0x360F, PropType::OBJECT);
    pub const FOLDER_ASSOCIATED_CONTENTS: PropTag =
        PropTag::new(0x3610, PropType::OBJECT);
    pub const DISPLAY_NAME: PropTag = PropTag::new(0x3001, PropType::STRING);
    pub const BODY: PropTag = PropTag::new(0x1000, PropType::STRING);
    pub const RTF_COMPRESSED: PropTag = PropTag::new(0x1009, PropType::BINARY);
    pub const LAST_MODIFICATION_TIME: PropTag =
        PropTag::new(0x3008, PropType::TIME);
    pub const SOURCE_KEY: PropTag = PropTag::new(0x65E0, PropType::BINARY);
    pub const PARENT_SOURCE_KEY: PropTag =
        PropTag::new(0x65E1, PropType::BINARY);
    pub const CHANGE_KEY: PropTag = PropTag::new(0x65E2, PropType::BINARY);
    pub const PREDECESSOR_CHANGE_LIST: PropTag =
        PropTag::new(0x65E3, PropType::BINARY);
    pub const CHANGE_NUMBER: PropTag = PropTag::new(0x67A4, PropType::INT64);
    pub const ASSOCIATED: PropTag = PropTag::new(0x67AA, PropType::BOOLEAN);
    pub const MID: PropTag = PropTag::new(0x674A, PropType::INT64);
    pub const FOLDER_ID: PropTag = PropTag::new(0x6748, PropType::INT64);

    /// Tagged as `Int32` on the wire, but the value is binary.
    pub const IDSET_GIVEN: PropTag = PropTag::new(0x4017, PropType::INT32);
    pub const IDSET_GIVEN_BINARY: PropTag =
        PropTag::new(0x4017, PropType::BINARY);
    pub const CNSET_SEEN: PropTag = PropTag::new(0x6796, PropType::BINARY);
    pub const CNSET_SEEN_FAI: PropTag = PropTag::new(0x67DA, PropType::BINARY);
    pub const CNSET_READ: PropTag = PropTag::new(0x67D2, PropType::BINARY);
    pub const IDSET_DELETED: PropTag = PropTag::new(0x67E5, PropType::BINARY);
    pub const IDSET_SOFT_DELETED: PropTag =
        PropTag::new(0x4021, PropType::BINARY);
    pub const IDSET_EXPIRED: PropTag = PropTag::new(0x6793, PropType::BINARY);
    pub const IDSET_READ: PropTag = PropTag::new(0x402D, PropType::BINARY);
    pub const IDSET_UNREAD: PropTag = PropTag::new(0x402E, PropType::BINARY);
}
