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

//! Hand-construction of stream fixtures for tests.

use byteorder::{LittleEndian, WriteBytesExt};

use super::marker::Marker;
use super::prop::tag::PropTag;
use crate::support::decode_config::{DecodeOptions, LengthPrefix};

#[derive(Clone, Debug, Default)]
pub struct StreamBuilder {
    data: Vec<u8>,
    options: DecodeOptions,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        StreamBuilder {
            data: Vec::new(),
            options,
        }
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.data.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.data.write_u16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.data.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.data.write_u64::<LittleEndian>(v).unwrap();
        self
    }

    /// A length prefix or multi-value count of the configured width.
    pub fn length(self, n: usize) -> Self {
        match self.options.length_prefix {
            LengthPrefix::U16 => self.u16(n as u16),
            LengthPrefix::U32 => self.u32(n as u32),
        }
    }

    pub fn utf16z(mut self, s: &str) -> Self {
        for unit in s.encode_utf16().chain(Some(0)) {
            self.data.write_u16::<LittleEndian>(unit).unwrap();
        }
        self
    }

    pub fn marker(self, marker: Marker) -> Self {
        self.u32(marker as u32)
    }

    pub fn tag(self, tag: PropTag) -> Self {
        self.u32(tag.0)
    }

    pub fn int32(self, tag: PropTag, v: i32) -> Self {
        self.tag(tag).u32(v as u32)
    }

    pub fn int64(self, tag: PropTag, v: i64) -> Self {
        self.tag(tag).u64(v as u64)
    }

    pub fn boolean(self, tag: PropTag, v: bool) -> Self {
        self.tag(tag).u16(v as u16)
    }

    pub fn time(self, tag: PropTag, filetime: u64) -> Self {
        self.tag(tag).u64(filetime)
    }

    /// A fixed-width value whose bytes are given verbatim.
    pub fn fixed(self, tag: PropTag, bytes: &[u8]) -> Self {
        self.tag(tag).bytes(bytes)
    }

    pub fn variable(self, tag: PropTag, bytes: &[u8]) -> Self {
        self.tag(tag).length(bytes.len()).bytes(bytes)
    }

    /// A UTF-16LE string value, including its terminator.
    pub fn unicode(self, tag: PropTag, s: &str) -> Self {
        let payload = StreamBuilder::new().utf16z(s).build();
        self.variable(tag, &payload)
    }

    pub fn multi_fixed<B: AsRef<[u8]>>(self, tag: PropTag, values: &[B]) -> Self {
        let mut this = self.tag(tag).length(values.len());
        for v in values {
            this = this.bytes(v.as_ref());
        }
        this
    }

    pub fn multi_variable<B: AsRef<[u8]>>(
        self,
        tag: PropTag,
        values: &[B],
    ) -> Self {
        let mut this = self.tag(tag).length(values.len());
        for v in values {
            let v = v.as_ref();
            this = this.length(v.len()).bytes(v);
        }
        this
    }

    pub fn del_prop(self, tag: PropTag) -> Self {
        self.marker(Marker::FXDelProp).u32(tag.0)
    }

    pub fn warning(self, code: u32) -> Self {
        self.marker(Marker::EcWarning).u32(code)
    }

    /// A marker followed by a length-prefixed binary blob, as used by
    /// `NewFXFolder` and `IncrSyncGroupInfo`.
    pub fn marker_blob(self, marker: Marker, blob: &[u8]) -> Self {
        self.marker(marker).length(blob.len()).bytes(blob)
    }
}
