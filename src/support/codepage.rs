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

//! Interpretation of 8-bit strings tagged with a Windows code page.
//!
//! The stream carries string payloads as raw bytes. Only callers who want
//! text go through here.

use encoding_rs::Encoding;

/// Map a Windows code page number to the encoding that decodes it.
///
/// Code pages `encoding_rs` has no encoder for return `None`.
pub fn encoding_for(codepage: u16) -> Option<&'static Encoding> {
    Some(match codepage {
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1200 => encoding_rs::UTF_16LE,
        1201 => encoding_rs::UTF_16BE,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        // US-ASCII and Latin-1 are both subsets of 1252 as far as the
        // WHATWG encodings are concerned
        1252 | 20127 | 28591 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        28592 => encoding_rs::ISO_8859_2,
        28595 => encoding_rs::ISO_8859_5,
        28597 => encoding_rs::ISO_8859_7,
        50220 => encoding_rs::ISO_2022_JP,
        51932 => encoding_rs::EUC_JP,
        54936 => encoding_rs::GB18030,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    })
}

fn strip_nul(s: &str) -> &str {
    s.trim_end_matches('\0')
}

/// Decode `bytes` as text in `codepage`.
///
/// Unknown code pages fall back to windows-1252, which never fails.
/// Trailing NULs are removed.
pub fn decode(codepage: u16, bytes: &[u8]) -> String {
    let encoding =
        encoding_for(codepage).unwrap_or(encoding_rs::WINDOWS_1252);
    let (text, _, _) = encoding.decode(bytes);
    strip_nul(&text).to_owned()
}

/// Decode a UTF-16LE string payload, dropping the terminator.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
    strip_nul(&text).to_owned()
}
