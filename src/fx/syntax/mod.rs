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

//! One type per production of the FastTransfer grammar.
//!
//! Each type knows how to recognise where it starts (`verify`, which never
//! moves the cursor) and how to decode itself (`decode`). Repetition and
//! optional elements are driven by `verify`; a required element that is not
//! there is a fatal error.
//!
//! Start markers are only consumed once they have been seen to match, so a
//! failed `decode` of a delimited element leaves the cursor where it was
//! unless the element itself was malformed.

use log::trace;

use super::marker::Marker;
use super::prop::tag::PropTag;
use super::stream::FxStream;
use crate::support::error::Error;

pub mod folder;
pub mod ics;
pub mod message;

pub use self::folder::*;
pub use self::ics::*;
pub use self::message::*;

/// A production of the grammar.
pub trait Element: Sized {
    /// A short name for diagnostics.
    const NAME: &'static str;

    /// Whether the stream is positioned where this element could start.
    fn verify(stream: &FxStream<'_>) -> bool;

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error>;
}

/// `[X]`
pub fn decode_optional<T: Element>(
    stream: &mut FxStream<'_>,
) -> Result<Option<T>, Error> {
    if T::verify(stream) {
        T::decode(stream).map(Some)
    } else {
        Ok(None)
    }
}

/// `*X`
pub fn decode_repeated<T: Element>(
    stream: &mut FxStream<'_>,
) -> Result<Vec<T>, Error> {
    let mut elements = Vec::new();
    while T::verify(stream) {
        let start = stream.position();
        elements.push(T::decode(stream)?);
        // An element that consumes nothing would repeat forever
        if stream.position() == start {
            return Err(Error::Grammar {
                production: T::NAME,
                offset: start,
            });
        }
    }
    Ok(elements)
}

/// An element which must be present.
///
/// Unlike calling `T::decode` directly, this fails with `Error::Grammar`
/// naming `T` when the lookahead does not match, rather than with whatever
/// `T` would trip over first.
pub fn decode_required<T: Element>(
    stream: &mut FxStream<'_>,
) -> Result<T, Error> {
    if T::verify(stream) {
        T::decode(stream)
    } else {
        Err(Error::Grammar {
            production: T::NAME,
            offset: stream.position(),
        })
    }
}

/// Decode a top-level element which must span the whole stream.
pub fn decode_complete<T: Element>(
    stream: &mut FxStream<'_>,
) -> Result<T, Error> {
    trace!("Decoding {} from {} bytes", T::NAME, stream.remaining());
    let element = T::decode(stream)?;
    if !stream.is_end_of_stream() {
        return Err(Error::Grammar {
            production: "end of stream",
            offset: stream.position(),
        });
    }
    Ok(element)
}

/// `FXDelProp u32`: a meta-property saying the following property of the
/// parent object is to be replaced wholesale rather than merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelProp(pub PropTag);

impl DelProp {
    /// The tag carried by a `DelProp` at the current position, if there is
    /// one.
    pub fn peek(stream: &FxStream<'_>) -> Option<PropTag> {
        if stream.verify_marker(Marker::FXDelProp) {
            stream.peek_u32_at(4).map(PropTag)
        } else {
            None
        }
    }

    pub fn tag(self) -> PropTag {
        self.0
    }
}

impl Element for DelProp {
    const NAME: &'static str = "delProp";

    fn verify(stream: &FxStream<'_>) -> bool {
        Self::peek(stream).is_some()
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let start = stream.position();
        stream.expect_marker(Marker::FXDelProp)?;
        match stream.read_u32() {
            Ok(raw) => Ok(DelProp(PropTag(raw))),
            Err(e) => {
                stream.set_position(start);
                Err(e)
            }
        }
    }
}

/// Read `marker` followed by a `u32`, as for `EcWarning` and the group
/// meta-properties.
pub(crate) fn decode_meta_u32(
    stream: &mut FxStream<'_>,
    marker: Marker,
) -> Result<u32, Error> {
    let start = stream.position();
    stream.expect_marker(marker)?;
    stream.read_u32().map_err(|e| {
        stream.set_position(start);
        e
    })
}

/// Whether `marker` followed by a full `u32` is at the current position.
pub(crate) fn verify_meta_u32(stream: &FxStream<'_>, marker: Marker) -> bool {
    stream.verify_marker(marker) && stream.peek_u32_at(4).is_some()
}
