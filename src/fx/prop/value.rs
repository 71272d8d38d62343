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

//! Decoding of a single tagged property value.
//!
//! A property value on the wire is:
//!
//! - `u32`: the property tag
//! - if the id is `>= 0x8000`, the property name: a 16-byte GUID, a kind byte,
//!   and either a `u32` LID (kind 0) or a null-terminated UTF-16LE name
//!   (kind 1)
//! - the value, laid out according to the type's `TypeClass`
//!
//! String and binary payloads are kept as raw bytes. Interpreting character
//! sets is left to whoever asks for the value.

use chrono::prelude::*;

use super::tag::{pid, PropTag, PropType, TypeClass};
use crate::fx::marker;
use crate::fx::stream::{FxStream, Guid};
use crate::support::codepage;
use crate::support::error::Error;
use crate::support::filetime;

/// The name of a named property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyName {
    pub guid: Guid,
    pub kind: NameKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameKind {
    Lid(u32),
    Name(String),
}

impl PropertyName {
    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let guid = stream.read_guid()?;
        let kind = match stream.read_u8()? {
            0 => NameKind::Lid(stream.read_u32()?),
            1 => NameKind::Name(stream.read_utf16z()?),
            _ => return Err(Error::Malformed("property name kind")),
        };

        Ok(PropertyName { guid, kind })
    }
}

/// A scalar of one of the fixed-width types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FixedValue {
    Int16(i16),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Currency(i64),
    FloatingTime(f64),
    ErrorCode(u32),
    Boolean(bool),
    Int64(i64),
    /// A FILETIME: 100ns intervals since 1601-01-01.
    Time(u64),
    Guid(Guid),
}

impl FixedValue {
    fn decode(stream: &mut FxStream<'_>, ty: PropType) -> Result<Self, Error> {
        let offset = stream.position();
        Ok(match ty {
            PropType::INT16 => FixedValue::Int16(stream.read_i16()?),
            PropType::INT32 => FixedValue::Int32(stream.read_i32()?),
            PropType::FLOAT32 => FixedValue::Float32(stream.read_f32()?),
            PropType::FLOAT64 => FixedValue::Float64(stream.read_f64()?),
            PropType::CURRENCY => FixedValue::Currency(stream.read_i64()?),
            PropType::FLOATING_TIME => {
                FixedValue::FloatingTime(stream.read_f64()?)
            }
            PropType::ERROR_CODE => FixedValue::ErrorCode(stream.read_u32()?),
            PropType::BOOLEAN => FixedValue::Boolean(0 != stream.read_u16()?),
            PropType::INT64 => FixedValue::Int64(stream.read_i64()?),
            PropType::TIME => FixedValue::Time(stream.read_u64()?),
            PropType::GUID => FixedValue::Guid(stream.read_guid()?),
            PropType(ty) => return Err(Error::UnknownPropType { ty, offset }),
        })
    }
}

/// The payload of a property value, keyed by the class of its type.
#[derive(Clone, Debug, PartialEq)]
pub enum PropData {
    Fixed(FixedValue),
    Variable(Vec<u8>),
    MultiFixed(Vec<FixedValue>),
    MultiVariable(Vec<Vec<u8>>),
}

/// One decoded property: its tag, its name if it is a named property, and
/// its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PropValue {
    tag: PropTag,
    name: Option<PropertyName>,
    data: PropData,
}

impl PropValue {
    pub fn new(tag: PropTag, data: PropData) -> Self {
        PropValue {
            tag,
            name: None,
            data,
        }
    }

    /// Whether the stream is positioned at something that could be a
    /// property value.
    ///
    /// That is, at least a tag's worth of bytes remain, the tag's type is
    /// one the stream can carry, and the tag is not a marker or
    /// meta-property.
    pub fn verify(stream: &FxStream<'_>) -> bool {
        match stream.peek_u32() {
            None => false,
            Some(raw) => {
                !marker::is_marker_or_meta(raw)
                    && PropTag(raw).ty().class().is_some()
            }
        }
    }

    pub fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let start = stream.position();
        let result = Self::decode_inner(stream);
        if result.is_err() {
            stream.set_position(start);
        }
        result
    }

    fn decode_inner(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let offset = stream.position();
        let tag = PropTag(stream.read_tag()?);
        let name = if tag.is_named() {
            Some(PropertyName::decode(stream)?)
        } else {
            None
        };

        let class = if pid::IDSET_GIVEN == tag {
            TypeClass::Variable
        } else {
            tag.ty().class().ok_or(Error::UnknownPropType {
                ty: tag.ty().0,
                offset,
            })?
        };

        let data = match class {
            TypeClass::Fixed(_) => {
                PropData::Fixed(FixedValue::decode(stream, tag.ty())?)
            }
            TypeClass::Variable => {
                PropData::Variable(stream.read_length_block()?)
            }
            TypeClass::MultiFixed(_) => {
                let count = stream.read_length()?;
                let element = tag.ty().element();
                let mut values = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    values.push(FixedValue::decode(stream, element)?);
                }
                PropData::MultiFixed(values)
            }
            TypeClass::MultiVariable => {
                let count = stream.read_length()?;
                let mut values = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    values.push(stream.read_length_block()?);
                }
                PropData::MultiVariable(values)
            }
        };

        Ok(PropValue { tag, name, data })
    }

    pub fn tag(&self) -> PropTag {
        self.tag
    }

    pub fn name(&self) -> Option<&PropertyName> {
        self.name.as_ref()
    }

    pub fn data(&self) -> &PropData {
        &self.data
    }

    pub fn as_fixed(&self) -> Option<FixedValue> {
        match self.data {
            PropData::Fixed(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self.as_fixed()? {
            FixedValue::Int16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.as_fixed()? {
            FixedValue::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.as_fixed()? {
            FixedValue::Int64(v) | FixedValue::Currency(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_fixed()? {
            FixedValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Guid> {
        match self.as_fixed()? {
            FixedValue::Guid(v) => Some(v),
            _ => None,
        }
    }

    /// Interpret a `Time` value as a UTC timestamp.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self.as_fixed()? {
            FixedValue::Time(v) => filetime::to_utc(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.data {
            PropData::Variable(ref v) => Some(v),
            _ => None,
        }
    }

    /// Interpret the value as text.
    ///
    /// UTF-16 strings are decoded as such; 8-bit strings use the code page
    /// in the type if there is one and `default_codepage` otherwise. A
    /// trailing NUL is dropped.
    pub fn as_string(&self, default_codepage: u16) -> Option<String> {
        let bytes = self.as_bytes()?;
        let ty = self.tag.ty();
        if PropType::STRING == ty {
            Some(codepage::decode_utf16le(bytes))
        } else if ty.is_non_unicode_string() {
            Some(codepage::decode(
                ty.codepage().unwrap_or(default_codepage),
                bytes,
            ))
        } else {
            None
        }
    }
}
