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

//! Runs of property values.

use std::slice;

use log::trace;

use super::tag::{PropTag, PropType};
use super::value::{PropData, PropValue};
use crate::fx::marker;
use crate::fx::stream::FxStream;
use crate::support::error::Error;

/// Receives every property list as it finishes decoding.
///
/// Install one on a stream with `FxStream::with_sink()`.
pub trait CaptureSink {
    fn capture(&mut self, list: &PropList);
}

impl CaptureSink for Vec<PropList> {
    fn capture(&mut self, list: &PropList) {
        self.push(list.clone());
    }
}

/// An ordered sequence of property values.
///
/// Lookups return the first match; the stream does not promise tags are
/// unique within a list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropList {
    values: Vec<PropValue>,
}

impl PropList {
    /// Decode properties until the stream is at something other than a
    /// property value.
    ///
    /// The terminator, which is normally a marker, is left unconsumed. An
    /// empty list is valid.
    pub fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let start = stream.position();
        let mut values = Vec::new();
        while Self::continues(stream) {
            values.push(PropValue::decode(stream)?);
        }

        let list = PropList { values };
        trace!(
            "{} properties at {}..{}",
            list.len(),
            start,
            stream.position()
        );
        stream.capture(&list);
        Ok(list)
    }

    fn continues(stream: &FxStream<'_>) -> bool {
        PropValue::verify(stream)
            && !stream
                .peek_u32()
                .map_or(true, marker::is_end_marker_except_warning)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, PropValue> {
        self.values.iter()
    }

    /// The value at `index` in stream order.
    pub fn nth(&self, index: usize) -> Option<&PropValue> {
        self.values.get(index)
    }

    pub fn has_tag(&self, tag: PropTag) -> bool {
        self.get_value(tag).is_some()
    }

    pub fn has_type(&self, ty: PropType) -> bool {
        self.iter().any(|v| v.tag().ty() == ty)
    }

    pub fn has_id(&self, id: u16) -> bool {
        self.iter().any(|v| v.tag().id() == id)
    }

    pub fn get_value(&self, tag: PropTag) -> Option<&PropValue> {
        self.iter().find(|v| v.tag() == tag)
    }

    pub fn get(&self, tag: PropTag) -> Option<&PropData> {
        self.get_value(tag).map(PropValue::data)
    }

    /// Whether any string property is in an 8-bit code page rather than
    /// UTF-16.
    pub fn has_codepage_strings(&self) -> bool {
        self.iter().any(|v| v.tag().ty().is_non_unicode_string())
    }
}

impl From<Vec<PropValue>> for PropList {
    fn from(values: Vec<PropValue>) -> Self {
        PropList { values }
    }
}

impl<'a> IntoIterator for &'a PropList {
    type Item = &'a PropValue;
    type IntoIter = slice::Iter<'a, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
