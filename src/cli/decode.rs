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

//! Selection of the top-level production to decode a file as.

use std::fmt;

use crate::fx::prop::list::PropList;
use crate::fx::stream::FxStream;
use crate::fx::syntax::*;
use crate::support::decode_config::DecodeOptions;
use crate::support::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    HierarchySync,
    ContentsSync,
    TopFolder,
    FolderContent,
    MessageContent,
    MessageList,
    AttachmentContent,
    State,
}

const ALL_KINDS: [StreamKind; 8] = [
    StreamKind::HierarchySync,
    StreamKind::ContentsSync,
    StreamKind::TopFolder,
    StreamKind::FolderContent,
    StreamKind::MessageContent,
    StreamKind::MessageList,
    StreamKind::AttachmentContent,
    StreamKind::State,
];

impl StreamKind {
    pub fn all() -> &'static [StreamKind] {
        &ALL_KINDS
    }

    pub fn name(self) -> &'static str {
        match self {
            StreamKind::HierarchySync => "hierarchy-sync",
            StreamKind::ContentsSync => "contents-sync",
            StreamKind::TopFolder => "top-folder",
            StreamKind::FolderContent => "folder-content",
            StreamKind::MessageContent => "message-content",
            StreamKind::MessageList => "message-list",
            StreamKind::AttachmentContent => "attachment-content",
            StreamKind::State => "state",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded top-level element of any kind.
#[derive(Clone, Debug)]
pub enum Decoded {
    HierarchySync(HierarchySync),
    ContentsSync(ContentsSync),
    TopFolder(TopFolder),
    FolderContent(FolderContent),
    MessageContent(MessageContent),
    MessageList(MessageList),
    AttachmentContent(AttachmentContent),
    State(State),
}

/// Decode all of `data` as `kind`.
///
/// If the options ask for it, also returns every property list in the order
/// they were decoded.
pub fn decode(
    kind: StreamKind,
    data: &[u8],
    options: DecodeOptions,
) -> Result<(Decoded, Option<Vec<PropList>>), Error> {
    let mut captured = Vec::new();
    let decoded = {
        let mut stream = FxStream::with_options(data, options);
        if options.capture_prop_lists {
            stream = stream.with_sink(&mut captured);
        }
        decode_kind(kind, &mut stream)?
    };

    Ok((
        decoded,
        Some(captured).filter(|_| options.capture_prop_lists),
    ))
}

fn decode_kind(
    kind: StreamKind,
    stream: &mut FxStream<'_>,
) -> Result<Decoded, Error> {
    Ok(match kind {
        StreamKind::HierarchySync => {
            Decoded::HierarchySync(decode_complete(stream)?)
        }
        StreamKind::ContentsSync => {
            Decoded::ContentsSync(decode_complete(stream)?)
        }
        StreamKind::TopFolder => Decoded::TopFolder(decode_complete(stream)?),
        StreamKind::FolderContent => {
            Decoded::FolderContent(decode_complete(stream)?)
        }
        StreamKind::MessageContent => {
            Decoded::MessageContent(decode_complete(stream)?)
        }
        StreamKind::MessageList => {
            Decoded::MessageList(decode_complete(stream)?)
        }
        StreamKind::AttachmentContent => {
            Decoded::AttachmentContent(decode_complete(stream)?)
        }
        StreamKind::State => Decoded::State(decode_complete(stream)?),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fx::marker::Marker;
    use crate::fx::prop::tag::pid;
    use crate::fx::test_stream::StreamBuilder;

    #[test]
    fn kind_names_parse_back() {
        for &kind in StreamKind::all() {
            assert_eq!(Ok(kind), kind.name().parse::<StreamKind>());
        }
        assert!("folder".parse::<StreamKind>().is_err());
    }

    #[test]
    fn decode_with_capture() {
        let data = StreamBuilder::new()
            .marker(Marker::IncrSyncStateBegin)
            .int32(pid::MESSAGE_SIZE, 1)
            .marker(Marker::IncrSyncStateEnd)
            .build();

        let (decoded, captured) =
            decode(StreamKind::State, &data, DecodeOptions::default())
                .unwrap();
        assert_matches!(Decoded::State(_), decoded);
        assert!(captured.is_none());

        let options = DecodeOptions {
            capture_prop_lists: true,
            ..DecodeOptions::default()
        };
        let (_, captured) = decode(StreamKind::State, &data, options).unwrap();
        assert_eq!(1, captured.unwrap().len());

        assert_matches!(
            Err(Error::MarkerMismatch { .. }),
            decode(StreamKind::TopFolder, &data, options)
        );
    }
}
