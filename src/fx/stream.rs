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

//! The byte cursor every decoder reads through.
//!
//! The whole stream is resident in memory before decoding starts. `FxStream`
//! only borrows it; nothing here copies the buffer except for the payloads
//! that end up owned by the parse tree.
//!
//! All multi-byte values are little-endian. Reads either return exactly what
//! was asked for or fail with `Error::Bounds`; the position is not advanced
//! by a failed read.

use byteorder::{ByteOrder, LittleEndian};

use super::marker::Marker;
use super::prop::list::{CaptureSink, PropList};
use crate::support::decode_config::{DecodeOptions, LengthPrefix};
use crate::support::error::Error;

pub type Guid = [u8; 16];

/// A seekable reader over a FastTransfer stream.
pub struct FxStream<'a> {
    buf: &'a [u8],
    pos: usize,
    options: DecodeOptions,
    sink: Option<&'a mut dyn CaptureSink>,
}

impl<'a> FxStream<'a> {
    /// Create a stream over `buf` with the default options.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecodeOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecodeOptions) -> Self {
        FxStream {
            buf,
            pos: 0,
            options,
            sink: None,
        }
    }

    /// Install `sink` to receive every property list decoded from this
    /// stream, in the order they complete.
    pub fn with_sink(mut self, sink: &'a mut dyn CaptureSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Start over on a new buffer. The options and sink are kept.
    pub fn reset(&mut self, buf: &'a [u8]) {
        self.buf = buf;
        self.pos = 0;
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute position. Positions past the end are clamped to
    /// the end.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Everything from the current position to the end, without consuming
    /// it.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub(crate) fn capture(&mut self, list: &PropList) {
        if let Some(sink) = self.sink.as_mut() {
            sink.capture(list);
        }
    }

    /// Run `f`, restoring the position afterwards unless it produced a
    /// value.
    ///
    /// This is the only way decoders give back bytes they have consumed. It
    /// is used where the grammar has a prefix that can belong to either of two
    /// productions and the only way to tell is to read past it.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, Error>,
    ) -> Result<Option<T>, Error> {
        let saved = self.pos;
        let result = f(self);
        if !matches!(result, Ok(Some(_))) {
            self.pos = saved;
        }
        result
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let bytes = self.peek_bytes(0, n)?;
        self.pos += n;
        Ok(bytes)
    }

    fn peek_bytes(&self, offset: usize, n: usize) -> Result<&'a [u8], Error> {
        let start = self.pos.checked_add(offset);
        match start.and_then(|s| s.checked_add(n).map(|e| (s, e))) {
            Some((start, end)) if end <= self.buf.len() => {
                Ok(&self.buf[start..end])
            }
            _ => Err(Error::Bounds {
                offset: self.pos + offset,
                wanted: n,
                len: self.buf.len(),
            }),
        }
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.take(n).map(<[u8]>::to_vec)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.take(2).map(LittleEndian::read_i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.take(8).map(LittleEndian::read_u64)
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.take(8).map(LittleEndian::read_i64)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.take(4).map(LittleEndian::read_f32)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.take(8).map(LittleEndian::read_f64)
    }

    pub fn read_guid(&mut self) -> Result<Guid, Error> {
        let mut guid = [0u8; 16];
        guid.copy_from_slice(self.take(16)?);
        Ok(guid)
    }

    /// Read a length prefix or multi-value count, whose width depends on the
    /// options.
    pub fn read_length(&mut self) -> Result<usize, Error> {
        match self.options.length_prefix {
            LengthPrefix::U16 => self.read_u16().map(usize::from),
            LengthPrefix::U32 => self.read_u32().map(|n| n as usize),
        }
    }

    /// Read a length-prefixed block of bytes.
    pub fn read_length_block(&mut self) -> Result<Vec<u8>, Error> {
        let saved = self.pos;
        let len = self.read_length()?;
        self.read_bytes(len).map_err(|e| {
            self.pos = saved;
            e
        })
    }

    /// Read a null-terminated UTF-16LE string, consuming the terminator.
    pub fn read_utf16z(&mut self) -> Result<String, Error> {
        let saved = self.pos;
        let mut units = Vec::new();
        loop {
            match self.read_u16() {
                Ok(0) => break,
                Ok(unit) => units.push(unit),
                Err(e) => {
                    self.pos = saved;
                    return Err(e);
                }
            }
        }

        String::from_utf16(&units).map_err(|_| {
            self.pos = saved;
            Error::Malformed("UTF-16 string")
        })
    }

    pub fn peek_u32(&self) -> Option<u32> {
        self.peek_u32_at(0)
    }

    /// Look at the `u32` starting `offset` bytes past the current position.
    ///
    /// Returns `None` rather than failing when that would read past the end,
    /// so that lookahead near the end of the stream is always safe.
    pub fn peek_u32_at(&self, offset: usize) -> Option<u32> {
        self.peek_bytes(offset, 4).ok().map(LittleEndian::read_u32)
    }

    pub fn peek_marker(&self) -> Option<Marker> {
        self.peek_u32().and_then(Marker::from_u32)
    }

    /// Read a raw 4-byte tag.
    pub fn read_tag(&mut self) -> Result<u32, Error> {
        self.read_u32()
    }

    /// Read a 4-byte tag as a marker, or `None` if it is an ordinary
    /// property tag.
    ///
    /// The tag is consumed either way.
    pub fn read_marker(&mut self) -> Result<Option<Marker>, Error> {
        self.read_tag().map(Marker::from_u32)
    }

    /// Read a 4-byte tag and report whether it is `marker`.
    ///
    /// The tag is consumed either way.
    pub fn read_marker_is(&mut self, marker: Marker) -> Result<bool, Error> {
        Ok(marker as u32 == self.read_tag()?)
    }

    /// Consume `marker`, failing without consuming anything if something else
    /// is there.
    pub fn expect_marker(&mut self, marker: Marker) -> Result<(), Error> {
        match self.peek_u32() {
            Some(raw) if raw == marker as u32 => {
                self.pos += 4;
                Ok(())
            }
            Some(raw) => Err(Error::MarkerMismatch {
                expected: marker as u32,
                found: raw,
                offset: self.pos,
            }),
            None => Err(Error::Bounds {
                offset: self.pos,
                wanted: 4,
                len: self.buf.len(),
            }),
        }
    }

    /// Whether `marker` is at the current position.
    pub fn verify_marker(&self, marker: Marker) -> bool {
        self.verify_marker_at(marker, 0)
    }

    /// Whether `marker` is `offset` bytes past the current position.
    ///
    /// This never reads outside the buffer; anything that would is simply
    /// not a match.
    pub fn verify_marker_at(&self, marker: Marker, offset: usize) -> bool {
        Some(marker as u32) == self.peek_u32_at(offset)
    }

    /// Whether the last four bytes of the whole stream are `marker`, and
    /// they lie at or after the current position.
    pub fn ends_with_marker(&self, marker: Marker) -> bool {
        self.remaining() >= 4
            && self.verify_marker_at(marker, self.remaining() - 4)
    }
}
