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

//! Folders, as produced by `RopFastTransferSourceCopyFolder` and friends.
//!
//! ```text
//! topFolder      = StartTopFld folderContent EndFolder
//! subFolder      = StartSubFld folderContent EndFolder
//! folderContent  = propList [EcWarning u32]
//!                  ( *( *delProp NewFXFolder binary ) / folderMessages )
//!                  [ *delProp *subFolder ]
//! folderMessages = *2( delProp messageList )
//! ```
//!
//! The grammar is ambiguous after the warning: a run of delete-property
//! meta-properties may lead into a `NewFXFolder`, into the message lists, or
//! into the sub-folders. The `NewFXFolder` alternative is tried first and
//! rewound if it does not pan out. The message lists are then recognised by
//! the tag being deleted, which is always one of the two contents tables;
//! anything else (normally the hierarchy table) introduces sub-folders.

use log::{trace, warn};

use super::message::{Message, MessageList};
use super::{
    decode_meta_u32, decode_repeated, verify_meta_u32, DelProp, Element,
};
use crate::fx::marker::Marker;
use crate::fx::prop::list::PropList;
use crate::fx::prop::tag::{pid, PropTag};
use crate::fx::prop::value::PropValue;
use crate::fx::replica_info::FolderReplicaInfo;
use crate::fx::stream::FxStream;
use crate::support::error::Error;

/// `folderMessages` never has more than this many lists: one for normal
/// messages and one for FAI messages.
pub const MAX_FOLDER_MESSAGE_LISTS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct TopFolder {
    content: FolderContent,
}

impl TopFolder {
    pub fn content(&self) -> &FolderContent {
        &self.content
    }
}

impl Element for TopFolder {
    const NAME: &'static str = "topFolder";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::StartTopFld)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::StartTopFld)?;
        let content = FolderContent::decode(stream)?;
        stream.expect_marker(Marker::EndFolder)?;
        Ok(TopFolder { content })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubFolder {
    content: FolderContent,
}

impl SubFolder {
    pub fn content(&self) -> &FolderContent {
        &self.content
    }
}

impl Element for SubFolder {
    const NAME: &'static str = "subFolder";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::StartSubFld)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let start = stream.position();
        stream.expect_marker(Marker::StartSubFld)?;
        trace!("Sub-folder at {}", start);
        let content = FolderContent::decode(stream)?;
        stream.expect_marker(Marker::EndFolder)?;
        Ok(SubFolder { content })
    }
}

/// A `NewFXFolder` meta-property and the delete-properties before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFxFolder {
    del_props: Vec<DelProp>,
    raw: Vec<u8>,
}

impl NewFxFolder {
    pub fn del_props(&self) -> impl Iterator<Item = PropTag> + '_ {
        self.del_props.iter().map(|d| d.tag())
    }

    /// The undecoded `FolderReplicaInfo`.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn replica_info(&self) -> Result<FolderReplicaInfo, Error> {
        FolderReplicaInfo::parse(&self.raw)
    }

    /// `*delProp NewFXFolder binary`, or `None` with an unspecified position
    /// if the delete-properties are not followed by `NewFXFolder`.
    ///
    /// Run through `FxStream::attempt` so that the position is restored.
    fn try_decode(stream: &mut FxStream<'_>) -> Result<Option<Self>, Error> {
        let del_props = decode_repeated::<DelProp>(stream)?;
        if !stream.verify_marker(Marker::NewFXFolder) {
            return Ok(None);
        }

        stream.expect_marker(Marker::NewFXFolder)?;
        let raw = stream.read_length_block()?;
        Ok(Some(NewFxFolder { del_props, raw }))
    }
}

/// Up to two message lists, each introduced by the delete of the contents
/// table it replaces.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderMessages {
    lists: Vec<(DelProp, MessageList)>,
}

impl FolderMessages {
    fn at_list(stream: &FxStream<'_>) -> bool {
        match DelProp::peek(stream) {
            Some(tag) => {
                pid::CONTAINER_CONTENTS == tag
                    || pid::FOLDER_ASSOCIATED_CONTENTS == tag
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// The lists with the tag of the table each replaces.
    pub fn lists(&self) -> impl Iterator<Item = (PropTag, &MessageList)> + '_ {
        self.lists.iter().map(|&(d, ref l)| (d.tag(), l))
    }

    pub fn del_props(&self) -> impl Iterator<Item = PropTag> + '_ {
        self.lists.iter().map(|&(d, _)| d.tag())
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.lists.iter().flat_map(|(_, l)| l.messages())
    }
}

impl Element for FolderMessages {
    const NAME: &'static str = "folderMessages";

    fn verify(stream: &FxStream<'_>) -> bool {
        Self::at_list(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let mut lists = Vec::with_capacity(MAX_FOLDER_MESSAGE_LISTS);
        while lists.len() < MAX_FOLDER_MESSAGE_LISTS && Self::at_list(stream) {
            let del_prop = DelProp::decode(stream)?;
            let list = MessageList::decode(stream)?;
            lists.push((del_prop, list));
        }
        Ok(FolderMessages { lists })
    }
}

/// The properties and children of a folder.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderContent {
    props: PropList,
    warning: Option<u32>,
    new_fx_folders: Vec<NewFxFolder>,
    folder_messages: Option<FolderMessages>,
    subfolder_del_props: Vec<DelProp>,
    subfolders: Vec<SubFolder>,
}

impl FolderContent {
    pub fn props(&self) -> &PropList {
        &self.props
    }

    /// The `EcWarning` code following the properties, if any.
    pub fn warning(&self) -> Option<u32> {
        self.warning
    }

    pub fn has_new_fx_folder(&self) -> bool {
        !self.new_fx_folders.is_empty()
    }

    pub fn new_fx_folders(&self) -> &[NewFxFolder] {
        &self.new_fx_folders
    }

    pub fn folder_messages(&self) -> Option<&FolderMessages> {
        self.folder_messages.as_ref()
    }

    /// Every message directly in this folder, normal and FAI.
    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.folder_messages.iter().flat_map(FolderMessages::messages)
    }

    pub fn subfolder_del_props(&self) -> impl Iterator<Item = PropTag> + '_ {
        self.subfolder_del_props.iter().map(|d| d.tag())
    }

    pub fn subfolders(&self) -> &[SubFolder] {
        &self.subfolders
    }

    /// Every delete-property of this folder, in stream order.
    pub fn all_del_props(&self) -> Vec<PropTag> {
        self.new_fx_folders
            .iter()
            .flat_map(NewFxFolder::del_props)
            .chain(
                self.folder_messages
                    .iter()
                    .flat_map(FolderMessages::del_props),
            )
            .chain(self.subfolder_del_props())
            .collect()
    }

    pub fn display_name(&self) -> Option<String> {
        self.props
            .get_value(pid::DISPLAY_NAME)
            .and_then(|v| v.as_string(1252))
    }
}

impl Element for FolderContent {
    const NAME: &'static str = "folderContent";

    fn verify(stream: &FxStream<'_>) -> bool {
        PropValue::verify(stream)
            || verify_meta_u32(stream, Marker::EcWarning)
            || DelProp::verify(stream)
            || stream.verify_marker(Marker::NewFXFolder)
            || SubFolder::verify(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let props = PropList::decode(stream)?;

        let warning = if verify_meta_u32(stream, Marker::EcWarning) {
            let code = decode_meta_u32(stream, Marker::EcWarning)?;
            warn!(
                "Folder carries warning {:#010X} at {}",
                code,
                stream.position() - 8
            );
            Some(code)
        } else {
            None
        };

        let mut new_fx_folders = Vec::new();
        while let Some(folder) = stream.attempt(NewFxFolder::try_decode)? {
            new_fx_folders.push(folder);
        }

        let folder_messages =
            if new_fx_folders.is_empty() && FolderMessages::verify(stream) {
                Some(FolderMessages::decode(stream)?)
            } else {
                None
            };

        let subfolder_del_props = decode_repeated(stream)?;
        let subfolders = decode_repeated(stream)?;

        Ok(FolderContent {
            props,
            warning,
            new_fx_folders,
            folder_messages,
            subfolder_del_props,
            subfolders,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fx::test_stream::StreamBuilder;

    fn message(b: StreamBuilder, start: Marker, size: i32) -> StreamBuilder {
        b.marker(start)
            .int32(pid::MESSAGE_SIZE, size)
            .marker(Marker::EndMessage)
    }

    fn replica_info_blob() -> Vec<u8> {
        StreamBuilder::new()
            .u32(0)
            .u32(1)
            .bytes(&[0x22; 16])
            .bytes(&[0, 0, 0, 0, 0, 9])
            .u16(0)
            .u32(1)
            .u32(1)
            .bytes(b"/o=Org/cn=Server\0")
            .build()
    }

    #[test]
    fn folder_with_messages_and_subfolders() {
        let mut b = StreamBuilder::new()
            .marker(Marker::StartTopFld)
            .unicode(pid::DISPLAY_NAME, "Inbox")
            .del_prop(pid::CONTAINER_CONTENTS);
        b = message(b, Marker::StartMessage, 10);
        b = message(b, Marker::StartMessage, 20);
        b = b.del_prop(pid::FOLDER_ASSOCIATED_CONTENTS);
        b = message(b, Marker::StartFAIMsg, 30);
        let data = b
            .del_prop(pid::CONTAINER_HIERARCHY)
            .marker(Marker::StartSubFld)
            .unicode(pid::DISPLAY_NAME, "Child")
            .marker(Marker::EndFolder)
            .marker(Marker::StartSubFld)
            .marker(Marker::EndFolder)
            .marker(Marker::EndFolder)
            .build();

        let mut s = FxStream::new(&data);
        assert!(TopFolder::verify(&s));
        let folder = TopFolder::decode(&mut s).unwrap();
        assert!(s.is_end_of_stream());

        let content = folder.content();
        assert_eq!(Some("Inbox".to_owned()), content.display_name());
        assert_eq!(None, content.warning());
        assert!(!content.has_new_fx_folder());

        let messages = content.folder_messages().unwrap();
        assert_eq!(2, messages.len());
        assert_eq!(3, content.messages().count());
        assert_eq!(1, content.messages().filter(|m| m.is_fai()).count());

        assert_eq!(
            vec![
                pid::CONTAINER_CONTENTS,
                pid::FOLDER_ASSOCIATED_CONTENTS,
                pid::CONTAINER_HIERARCHY
            ],
            content.all_del_props()
        );
        assert_eq!(2, content.subfolders().len());
        assert_eq!(
            Some("Child".to_owned()),
            content.subfolders()[0].content().display_name()
        );
    }

    #[test]
    fn folder_messages_stop_after_two_lists() {
        let mut b = StreamBuilder::new();
        for _ in 0..3 {
            b = b.del_prop(pid::CONTAINER_CONTENTS);
            b = message(b, Marker::StartMessage, 1);
        }
        let data = b.build();
        let third = data.len() / 3;

        let mut s = FxStream::new(&data);
        let messages = FolderMessages::decode(&mut s).unwrap();
        assert_eq!(MAX_FOLDER_MESSAGE_LISTS, messages.len());
        assert_eq!(2 * third, s.position());
        assert!(FolderMessages::verify(&s));
    }

    #[test]
    fn new_fx_folder_takes_preceding_del_props() {
        let blob = replica_info_blob();
        let data = StreamBuilder::new()
            .marker(Marker::StartSubFld)
            .unicode(pid::DISPLAY_NAME, "Public")
            .del_prop(pid::CONTAINER_CONTENTS)
            .del_prop(pid::FOLDER_ASSOCIATED_CONTENTS)
            .marker_blob(Marker::NewFXFolder, &blob)
            .marker_blob(Marker::NewFXFolder, &blob)
            .marker(Marker::EndFolder)
            .build();

        let mut s = FxStream::new(&data);
        let folder = SubFolder::decode(&mut s).unwrap();
        assert!(s.is_end_of_stream());

        let content = folder.content();
        assert!(content.has_new_fx_folder());
        assert!(content.folder_messages().is_none());
        assert_eq!(2, content.new_fx_folders().len());
        assert_eq!(2, content.new_fx_folders()[0].del_props().count());
        assert_eq!(0, content.new_fx_folders()[1].del_props().count());

        let info = content.new_fx_folders()[0].replica_info().unwrap();
        assert_eq!(1, info.depth);
        assert_eq!(vec!["/o=Org/cn=Server".to_owned()], info.server_dns);
    }

    #[test]
    fn del_props_without_new_fx_folder_are_rewound() {
        let data = StreamBuilder::new()
            .marker(Marker::StartTopFld)
            .del_prop(pid::CONTAINER_HIERARCHY)
            .marker(Marker::StartSubFld)
            .marker(Marker::EndFolder)
            .marker(Marker::EndFolder)
            .build();

        let folder = TopFolder::decode(&mut FxStream::new(&data)).unwrap();
        let content = folder.content();
        assert!(!content.has_new_fx_folder());
        assert!(content.folder_messages().is_none());
        assert_eq!(
            vec![pid::CONTAINER_HIERARCHY],
            content.subfolder_del_props().collect::<Vec<_>>()
        );
        assert_eq!(1, content.subfolders().len());
    }

    #[test]
    fn warning_after_properties() {
        let data = StreamBuilder::new()
            .marker(Marker::StartTopFld)
            .int64(pid::FOLDER_ID, 1)
            .warning(0x0004_0380)
            .marker(Marker::EndFolder)
            .build();

        let folder = TopFolder::decode(&mut FxStream::new(&data)).unwrap();
        assert_eq!(Some(0x0004_0380), folder.content().warning());
        assert_eq!(1, folder.content().props().len());
    }

    #[test]
    fn unterminated_folder_is_fatal() {
        let data = StreamBuilder::new()
            .marker(Marker::StartTopFld)
            .unicode(pid::DISPLAY_NAME, "Inbox")
            .build();
        assert_matches!(
            Err(Error::Bounds { .. }),
            TopFolder::decode(&mut FxStream::new(&data))
        );

        let data = StreamBuilder::new()
            .marker(Marker::StartTopFld)
            .marker(Marker::EndMessage)
            .build();
        assert_matches!(
            Err(Error::MarkerMismatch { offset: 4, .. }),
            TopFolder::decode(&mut FxStream::new(&data))
        );
    }

    #[test]
    fn verify_does_not_move() {
        let data = StreamBuilder::new()
            .del_prop(pid::CONTAINER_CONTENTS)
            .marker(Marker::StartMessage)
            .marker(Marker::EndMessage)
            .build();
        let s = FxStream::new(&data);
        assert!(FolderMessages::verify(&s));
        assert!(FolderContent::verify(&s));
        assert!(!TopFolder::verify(&s));
        assert!(!SubFolder::verify(&s));
        assert_eq!(0, s.position());
    }
}
