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

//! Incremental change synchronisation download streams.
//!
//! ```text
//! hierarchySync        = *folderChange [deletions] state IncrSyncEnd
//! contentsSync         = [progressTotal]
//!                        *( [progressPerMessage] messageChange )
//!                        [deletions] [readStateChanges] state IncrSyncEnd
//! folderChange         = IncrSyncChg propList
//! messageChange        = messageChangeFull / messageChangePartial
//! messageChangeFull    = IncrSyncChg messageChangeHeader
//!                        IncrSyncMessage propList messageChildren
//! messageChangePartial = [groupInfo] [IncrSyncGroupId u32]
//!                        IncrSyncChgPartial messageChangeHeader
//!                        *( IncrementalSyncMessagePartial u32 propList )
//!                        messageChildren
//! groupInfo            = IncrSyncGroupInfo binary
//! deletions            = IncrSyncDel propList
//! readStateChanges     = IncrSyncRead propList
//! progressTotal        = IncrSyncProgressMode propList
//! progressPerMessage   = IncrSyncProgressPerMsg propList
//! state                = IncrSyncStateBegin propList IncrSyncStateEnd
//! ```

use chrono::prelude::*;
use log::{debug, trace, warn};

use super::message::MessageChildren;
use super::{
    decode_meta_u32, decode_optional, decode_repeated, decode_required,
    verify_meta_u32, Element,
};
use crate::fx::derived;
use crate::fx::group_info::{GroupProperty, PropertyGroupInfo};
use crate::fx::idset::IdSet;
use crate::fx::marker::Marker;
use crate::fx::progress::ProgressInformation;
use crate::fx::prop::list::PropList;
use crate::fx::prop::tag::{pid, PropTag};
use crate::fx::prop::value::PropValue;
use crate::fx::stream::FxStream;
use crate::support::error::Error;

fn bytes_of(props: &PropList, tag: PropTag) -> Option<&[u8]> {
    props.get_value(tag).and_then(PropValue::as_bytes)
}

fn replid_idset(
    props: &PropList,
    tag: PropTag,
) -> Result<Option<IdSet>, Error> {
    bytes_of(props, tag).map(IdSet::decode_replid).transpose()
}

fn replguid_idset(
    props: &PropList,
    tag: PropTag,
) -> Result<Option<IdSet>, Error> {
    bytes_of(props, tag).map(IdSet::decode_replguid).transpose()
}

/// Defines an element which is just a marker followed by a property list.
macro_rules! marked_prop_list {
    ($(#[$meta:meta])* $name:ident, $production:expr, $marker:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            props: PropList,
        }

        impl $name {
            pub fn props(&self) -> &PropList {
                &self.props
            }
        }

        impl Element for $name {
            const NAME: &'static str = $production;

            fn verify(stream: &FxStream<'_>) -> bool {
                stream.verify_marker(Marker::$marker)
            }

            fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
                stream.expect_marker(Marker::$marker)?;
                Ok($name {
                    props: PropList::decode(stream)?,
                })
            }
        }
    };
}

marked_prop_list!(
    /// A new or changed folder in a hierarchy synchronisation.
    FolderChange,
    "folderChange",
    IncrSyncChg
);

marked_prop_list!(
    /// Ids of objects deleted since the last synchronisation.
    Deletions,
    "deletions",
    IncrSyncDel
);

marked_prop_list!(
    /// Ids of messages whose read state changed.
    ReadStateChanges,
    "readStateChanges",
    IncrSyncRead
);

marked_prop_list!(
    /// Totals for the whole synchronisation.
    ProgressTotal,
    "progressTotal",
    IncrSyncProgressMode
);

marked_prop_list!(
    /// The size and kind of the message change that follows.
    ProgressPerMessage,
    "progressPerMessage",
    IncrSyncProgressPerMsg
);

impl FolderChange {
    pub fn source_key(&self) -> Option<&[u8]> {
        bytes_of(&self.props, pid::SOURCE_KEY)
    }

    /// The source key of the parent folder. All zeroes or empty if the parent
    /// is the folder being synchronised.
    pub fn parent_source_key(&self) -> Option<&[u8]> {
        bytes_of(&self.props, pid::PARENT_SOURCE_KEY)
    }

    /// Whether the parent is the folder being synchronised.
    pub fn is_root_child(&self) -> bool {
        self.parent_source_key().map_or(true, derived::is_all_zero)
    }

    pub fn display_name(&self) -> Option<String> {
        self.props
            .get_value(pid::DISPLAY_NAME)
            .and_then(|v| v.as_string(1252))
    }
}

impl Deletions {
    pub fn idset_deleted(&self) -> Result<Option<IdSet>, Error> {
        replid_idset(&self.props, pid::IDSET_DELETED)
    }

    pub fn idset_soft_deleted(&self) -> Result<Option<IdSet>, Error> {
        replid_idset(&self.props, pid::IDSET_SOFT_DELETED)
    }

    pub fn idset_expired(&self) -> Result<Option<IdSet>, Error> {
        replid_idset(&self.props, pid::IDSET_EXPIRED)
    }
}

impl ReadStateChanges {
    pub fn idset_read(&self) -> Result<Option<IdSet>, Error> {
        replid_idset(&self.props, pid::IDSET_READ)
    }

    pub fn idset_unread(&self) -> Result<Option<IdSet>, Error> {
        replid_idset(&self.props, pid::IDSET_UNREAD)
    }
}

impl ProgressTotal {
    /// The `ProgressInformation` carried as the list's binary value.
    pub fn progress_information(
        &self,
    ) -> Result<Option<ProgressInformation>, Error> {
        self.props
            .iter()
            .find_map(PropValue::as_bytes)
            .map(ProgressInformation::parse)
            .transpose()
    }
}

impl ProgressPerMessage {
    /// The first value of the list.
    pub fn message_size(&self) -> Option<i32> {
        self.props.nth(0).and_then(PropValue::as_i32)
    }

    /// The second value of the list.
    pub fn is_fai(&self) -> Option<bool> {
        self.props.nth(1).and_then(PropValue::as_bool)
    }
}

/// The synchronisation state to save for the next synchronisation.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    props: PropList,
}

impl State {
    pub fn props(&self) -> &PropList {
        &self.props
    }

    pub fn idset_given(&self) -> Result<Option<IdSet>, Error> {
        match replguid_idset(&self.props, pid::IDSET_GIVEN)? {
            Some(idset) => Ok(Some(idset)),
            None => replguid_idset(&self.props, pid::IDSET_GIVEN_BINARY),
        }
    }

    pub fn cnset_seen(&self) -> Result<Option<IdSet>, Error> {
        replguid_idset(&self.props, pid::CNSET_SEEN)
    }

    pub fn cnset_seen_fai(&self) -> Result<Option<IdSet>, Error> {
        replguid_idset(&self.props, pid::CNSET_SEEN_FAI)
    }

    pub fn cnset_read(&self) -> Result<Option<IdSet>, Error> {
        replguid_idset(&self.props, pid::CNSET_READ)
    }
}

impl Element for State {
    const NAME: &'static str = "state";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::IncrSyncStateBegin)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::IncrSyncStateBegin)?;
        let props = PropList::decode(stream)?;
        stream.expect_marker(Marker::IncrSyncStateEnd)?;
        Ok(State { props })
    }
}

/// `IncrSyncGroupInfo` and the property-group mapping it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupInfo(pub PropertyGroupInfo);

impl Element for GroupInfo {
    const NAME: &'static str = "groupInfo";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::IncrSyncGroupInfo)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::IncrSyncGroupInfo)?;
        let blob = stream.read_length_block()?;
        PropertyGroupInfo::parse(&blob).map(GroupInfo)
    }
}

/// A whole message sent because it is new or changed.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageChangeFull {
    header: PropList,
    props: PropList,
    children: MessageChildren,
}

impl MessageChangeFull {
    pub fn props(&self) -> &PropList {
        &self.props
    }
}

impl Element for MessageChangeFull {
    const NAME: &'static str = "messageChangeFull";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::IncrSyncChg)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::IncrSyncChg)?;
        let header = PropList::decode(stream)?;
        stream.expect_marker(Marker::IncrSyncMessage)?;
        let props = PropList::decode(stream)?;
        let children = MessageChildren::decode(stream)?;
        Ok(MessageChangeFull {
            header,
            props,
            children,
        })
    }
}

/// The properties of one changed property group.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialGroup {
    /// Index into the groups of the governing `PropertyGroupInfo`.
    pub index: u32,
    pub props: PropList,
}

/// A message change which only carries the property groups that changed.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageChangePartial {
    group_info: Option<PropertyGroupInfo>,
    group_id: Option<u32>,
    header: PropList,
    groups: Vec<PartialGroup>,
    children: MessageChildren,
}

impl MessageChangePartial {
    /// The group mapping, if this change introduced a new one.
    pub fn group_info(&self) -> Option<&PropertyGroupInfo> {
        self.group_info.as_ref()
    }

    pub fn group_id(&self) -> Option<u32> {
        self.group_id
    }

    pub fn groups(&self) -> &[PartialGroup] {
        &self.groups
    }

    /// Resolve the changed group indices against `info`.
    ///
    /// Indices `info` does not have are skipped.
    pub fn changed_properties<'i>(
        &self,
        info: &'i PropertyGroupInfo,
    ) -> Vec<&'i GroupProperty> {
        let mut properties = Vec::new();
        for group in &self.groups {
            match info.group(group.index) {
                Some(g) => properties.extend(g),
                None => warn!(
                    "Partial change names group {} of {}",
                    group.index,
                    info.len()
                ),
            }
        }
        properties
    }

    /// The tags of `changed_properties()`.
    pub fn changed_tags(&self, info: &PropertyGroupInfo) -> Vec<PropTag> {
        self.changed_properties(info)
            .into_iter()
            .map(|p| p.tag)
            .collect()
    }
}

impl Element for MessageChangePartial {
    const NAME: &'static str = "messageChangePartial";

    fn verify(stream: &FxStream<'_>) -> bool {
        GroupInfo::verify(stream)
            || verify_meta_u32(stream, Marker::IncrSyncGroupId)
            || stream.verify_marker(Marker::IncrSyncChgPartial)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let group_info =
            decode_optional::<GroupInfo>(stream)?.map(|GroupInfo(g)| g);
        let group_id = if verify_meta_u32(stream, Marker::IncrSyncGroupId) {
            Some(decode_meta_u32(stream, Marker::IncrSyncGroupId)?)
        } else {
            None
        };

        stream.expect_marker(Marker::IncrSyncChgPartial)?;
        let header = PropList::decode(stream)?;

        let mut groups = Vec::new();
        while verify_meta_u32(stream, Marker::IncrementalSyncMessagePartial) {
            let index = decode_meta_u32(
                stream,
                Marker::IncrementalSyncMessagePartial,
            )?;
            let props = PropList::decode(stream)?;
            groups.push(PartialGroup { index, props });
        }

        let children = MessageChildren::decode(stream)?;
        Ok(MessageChangePartial {
            group_info,
            group_id,
            header,
            groups,
            children,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageChange {
    Full(MessageChangeFull),
    Partial(MessageChangePartial),
}

impl MessageChange {
    pub fn is_partial(&self) -> bool {
        matches!(*self, MessageChange::Partial(..))
    }

    /// The `messageChangeHeader` property list.
    pub fn header(&self) -> &PropList {
        match *self {
            MessageChange::Full(ref c) => &c.header,
            MessageChange::Partial(ref c) => &c.header,
        }
    }

    pub fn children(&self) -> &MessageChildren {
        match *self {
            MessageChange::Full(ref c) => &c.children,
            MessageChange::Partial(ref c) => &c.children,
        }
    }

    pub fn source_key(&self) -> Option<&[u8]> {
        bytes_of(self.header(), pid::SOURCE_KEY)
    }

    pub fn change_key(&self) -> Option<&[u8]> {
        bytes_of(self.header(), pid::CHANGE_KEY)
    }

    pub fn predecessor_change_list(&self) -> Option<&[u8]> {
        bytes_of(self.header(), pid::PREDECESSOR_CHANGE_LIST)
    }

    pub fn change_number(&self) -> Option<i64> {
        self.header()
            .get_value(pid::CHANGE_NUMBER)
            .and_then(PropValue::as_i64)
    }

    pub fn mid(&self) -> Option<i64> {
        self.header().get_value(pid::MID).and_then(PropValue::as_i64)
    }

    pub fn message_size(&self) -> Option<i32> {
        self.header()
            .get_value(pid::MESSAGE_SIZE)
            .and_then(PropValue::as_i32)
    }

    pub fn last_modification_time(&self) -> Option<DateTime<Utc>> {
        self.header()
            .get_value(pid::LAST_MODIFICATION_TIME)
            .and_then(PropValue::as_time)
    }

    /// Whether this is a folder-associated message. Absent means no.
    pub fn is_associated(&self) -> bool {
        self.header()
            .get_value(pid::ASSOCIATED)
            .and_then(PropValue::as_bool)
            .unwrap_or(false)
    }
}

impl Element for MessageChange {
    const NAME: &'static str = "messageChange";

    fn verify(stream: &FxStream<'_>) -> bool {
        MessageChangeFull::verify(stream) || MessageChangePartial::verify(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        if MessageChangeFull::verify(stream) {
            MessageChangeFull::decode(stream).map(MessageChange::Full)
        } else if MessageChangePartial::verify(stream) {
            MessageChangePartial::decode(stream).map(MessageChange::Partial)
        } else {
            Err(Error::Grammar {
                production: Self::NAME,
                offset: stream.position(),
            })
        }
    }
}

/// The result of a hierarchy synchronisation download.
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchySync {
    folder_changes: Vec<FolderChange>,
    deletions: Option<Deletions>,
    state: State,
}

impl HierarchySync {
    pub fn folder_changes(&self) -> &[FolderChange] {
        &self.folder_changes
    }

    pub fn deletions(&self) -> Option<&Deletions> {
        self.deletions.as_ref()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Whether every folder change comes after the change for its parent,
    /// unless the parent is the synchronisation root.
    pub fn parent_before_children(&self) -> bool {
        derived::parent_before_children(&self.folder_changes)
    }

    /// The index of the first folder change whose parent has not been seen
    /// by then.
    pub fn first_orphan(&self) -> Option<usize> {
        derived::first_orphan(&self.folder_changes)
    }
}

impl Element for HierarchySync {
    const NAME: &'static str = "hierarchySync";

    fn verify(stream: &FxStream<'_>) -> bool {
        (FolderChange::verify(stream)
            || Deletions::verify(stream)
            || State::verify(stream))
            && stream.ends_with_marker(Marker::IncrSyncEnd)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        debug!("Decoding hierarchy sync at {}", stream.position());
        let folder_changes = decode_repeated(stream)?;
        let deletions = decode_optional(stream)?;
        let state = decode_required(stream)?;
        stream.expect_marker(Marker::IncrSyncEnd)?;

        let sync = HierarchySync {
            folder_changes,
            deletions,
            state,
        };
        debug!(
            "Hierarchy sync has {} folder changes, deletions: {}",
            sync.folder_changes.len(),
            sync.deletions.is_some()
        );
        Ok(sync)
    }
}

/// One entry of a contents synchronisation.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentsChange {
    pub progress: Option<ProgressPerMessage>,
    pub change: MessageChange,
}

/// The result of a contents synchronisation download.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentsSync {
    progress_total: Option<ProgressTotal>,
    changes: Vec<ContentsChange>,
    deletions: Option<Deletions>,
    read_state_changes: Option<ReadStateChanges>,
    state: State,
}

impl ContentsSync {
    pub fn progress_total(&self) -> Option<&ProgressTotal> {
        self.progress_total.as_ref()
    }

    pub fn changes(&self) -> &[ContentsChange] {
        &self.changes
    }

    pub fn deletions(&self) -> Option<&Deletions> {
        self.deletions.as_ref()
    }

    pub fn read_state_changes(&self) -> Option<&ReadStateChanges> {
        self.read_state_changes.as_ref()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The group mapping in force for the change at `index`: the most recent
    /// one introduced at or before it.
    pub fn group_info_for(&self, index: usize) -> Option<&PropertyGroupInfo> {
        self.changes
            .get(..=index)?
            .iter()
            .rev()
            .find_map(|c| match c.change {
                MessageChange::Partial(ref p) => p.group_info(),
                MessageChange::Full(_) => None,
            })
    }

    /// The most recent group mapping in the stream.
    pub fn last_group_info(&self) -> Option<&PropertyGroupInfo> {
        self.changes
            .len()
            .checked_sub(1)
            .and_then(|last| self.group_info_for(last))
    }

    /// The properties changed by the partial change at `index`, resolved
    /// against the group mapping in force for it.
    pub fn changed_properties(
        &self,
        index: usize,
    ) -> Option<Vec<&GroupProperty>> {
        match self.changes.get(index)?.change {
            MessageChange::Partial(ref p) => {
                Some(p.changed_properties(self.group_info_for(index)?))
            }
            MessageChange::Full(_) => None,
        }
    }
}

impl Element for ContentsSync {
    const NAME: &'static str = "contentsSync";

    fn verify(stream: &FxStream<'_>) -> bool {
        (ProgressTotal::verify(stream)
            || ProgressPerMessage::verify(stream)
            || MessageChange::verify(stream)
            || Deletions::verify(stream)
            || ReadStateChanges::verify(stream)
            || State::verify(stream))
            && stream.ends_with_marker(Marker::IncrSyncEnd)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        debug!("Decoding contents sync at {}", stream.position());
        let progress_total = decode_optional(stream)?;

        let mut changes = Vec::new();
        let mut current_group: Option<u32> = None;
        loop {
            let progress = decode_optional::<ProgressPerMessage>(stream)?;
            if progress.is_none() && !MessageChange::verify(stream) {
                break;
            }

            let offset = stream.position();
            let change = decode_required::<MessageChange>(stream)?;
            if let MessageChange::Partial(ref partial) = change {
                if let Some(info) = partial.group_info() {
                    current_group = Some(info.group_id);
                }

                match (partial.group_id(), current_group) {
                    (_, None) => warn!(
                        "Partial change at {} precedes any group info",
                        offset
                    ),
                    (Some(id), Some(current)) if id != current => warn!(
                        "Partial change at {} names group {} but {} is \
                         in force",
                        offset, id, current
                    ),
                    _ => (),
                }
            }
            trace!("Message change at {}", offset);
            changes.push(ContentsChange { progress, change });
        }

        let deletions = decode_optional(stream)?;
        let read_state_changes = decode_optional(stream)?;
        let state = decode_required(stream)?;
        stream.expect_marker(Marker::IncrSyncEnd)?;

        debug!("Contents sync has {} message changes", changes.len());
        Ok(ContentsSync {
            progress_total,
            changes,
            deletions,
            read_state_changes,
            state,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fx::prop::tag::PropType;
    use crate::fx::syntax::decode_complete;
    use crate::fx::test_stream::StreamBuilder;

    const IDSET_100_101_205: &[u8] = &[
        0x01, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x52, 0x64, 0x65,
        0x01, 0xCD, 0x50, 0x00,
    ];

    fn replguid_idset_blob() -> Vec<u8> {
        let mut blob = vec![0x5A; 16];
        blob.extend_from_slice(&[0x05, 0, 0, 0, 0, 0, 0x52, 0x01, 0x10, 0x00]);
        blob
    }

    fn state(b: StreamBuilder) -> StreamBuilder {
        b.marker(Marker::IncrSyncStateBegin)
            .variable(pid::IDSET_GIVEN, &replguid_idset_blob())
            .variable(pid::CNSET_SEEN, &replguid_idset_blob())
            .marker(Marker::IncrSyncStateEnd)
    }

    fn group_info_blob() -> Vec<u8> {
        StreamBuilder::new()
            .u32(42)
            .u32(0)
            .u32(2)
            .u32(1)
            .tag(pid::BODY)
            .u32(2)
            .tag(pid::DISPLAY_NAME)
            .tag(pid::MESSAGE_FLAGS)
            .build()
    }

    fn header(b: StreamBuilder, mid: i64) -> StreamBuilder {
        b.variable(pid::SOURCE_KEY, &[0xAB; 22])
            .time(pid::LAST_MODIFICATION_TIME, 132_223_104_000_000_000)
            .variable(pid::CHANGE_KEY, &[0xCD; 20])
            .variable(pid::PREDECESSOR_CHANGE_LIST, &[0xEF; 23])
            .boolean(pid::ASSOCIATED, false)
            .int64(pid::MID, mid)
            .int32(pid::MESSAGE_SIZE, 512)
            .int64(pid::CHANGE_NUMBER, mid + 1000)
    }

    fn progress_info_blob() -> Vec<u8> {
        StreamBuilder::new()
            .u16(0)
            .u16(0)
            .u32(0)
            .u64(0)
            .u32(2)
            .u32(0)
            .u64(1024)
            .build()
    }

    fn contents_sync_stream() -> Vec<u8> {
        let progress_tag = PropTag::new(0x0000, PropType::BINARY);
        let mut b = StreamBuilder::new()
            .marker(Marker::IncrSyncProgressMode)
            .variable(progress_tag, &progress_info_blob())
            .marker(Marker::IncrSyncProgressPerMsg)
            .int32(PropTag::new(0x0000, PropType::INT32), 512)
            .boolean(PropTag::new(0x0000, PropType::BOOLEAN), false)
            .marker(Marker::IncrSyncChg);
        b = header(b, 1);
        b = b
            .marker(Marker::IncrSyncMessage)
            .unicode(pid::DISPLAY_NAME, "full")
            .marker_blob(Marker::IncrSyncGroupInfo, &group_info_blob())
            .marker(Marker::IncrSyncGroupId)
            .u32(42)
            .marker(Marker::IncrSyncChgPartial);
        b = header(b, 2);
        b = b
            .marker(Marker::IncrementalSyncMessagePartial)
            .u32(1)
            .unicode(pid::DISPLAY_NAME, "renamed")
            .int32(pid::MESSAGE_FLAGS, 1)
            .marker(Marker::IncrSyncChgPartial);
        b = header(b, 3);
        b = b
            .marker(Marker::IncrementalSyncMessagePartial)
            .u32(0)
            .unicode(pid::BODY, "new body")
            .marker(Marker::IncrSyncDel)
            .variable(pid::IDSET_DELETED, IDSET_100_101_205)
            .marker(Marker::IncrSyncRead)
            .variable(pid::IDSET_READ, IDSET_100_101_205);
        state(b).marker(Marker::IncrSyncEnd).build()
    }

    #[test]
    fn contents_sync() {
        let data = contents_sync_stream();
        let mut s = FxStream::new(&data);
        assert!(ContentsSync::verify(&s));
        let sync = decode_complete::<ContentsSync>(&mut s).unwrap();

        let info = sync
            .progress_total()
            .unwrap()
            .progress_information()
            .unwrap()
            .unwrap();
        assert_eq!(2, info.normal_message_count);
        assert_eq!(1024, info.normal_message_total_size);

        assert_eq!(3, sync.changes().len());
        let first = &sync.changes()[0];
        let progress = first.progress.as_ref().unwrap();
        assert_eq!(Some(512), progress.message_size());
        assert_eq!(Some(false), progress.is_fai());

        assert!(!first.change.is_partial());
        assert_eq!(Some(&[0xAB; 22][..]), first.change.source_key());
        assert_eq!(Some(&[0xCD; 20][..]), first.change.change_key());
        assert_eq!(
            Some(&[0xEF; 23][..]),
            first.change.predecessor_change_list()
        );
        assert_eq!(Some(1), first.change.mid());
        assert_eq!(Some(1001), first.change.change_number());
        assert_eq!(Some(512), first.change.message_size());
        assert!(!first.change.is_associated());
        assert_eq!(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single(),
            first.change.last_modification_time()
        );
        match first.change {
            MessageChange::Full(ref full) => {
                assert!(full.props().has_tag(pid::DISPLAY_NAME))
            }
            MessageChange::Partial(_) => panic!("Expected full change"),
        }

        assert!(sync.group_info_for(0).is_none());
        assert_eq!(Some(42), sync.group_info_for(1).map(|g| g.group_id));
        assert_eq!(Some(42), sync.group_info_for(2).map(|g| g.group_id));
        assert_eq!(Some(42), sync.last_group_info().map(|g| g.group_id));

        match sync.changes()[1].change {
            MessageChange::Partial(ref partial) => {
                assert!(partial.group_info().is_some());
                assert_eq!(Some(42), partial.group_id());
                assert_eq!(1, partial.groups().len());
                assert_eq!(2, partial.groups()[0].props.len());
            }
            MessageChange::Full(_) => panic!("Expected partial change"),
        }
        assert_eq!(
            vec![pid::DISPLAY_NAME, pid::MESSAGE_FLAGS],
            sync.changed_properties(1)
                .unwrap()
                .into_iter()
                .map(|p| p.tag)
                .collect::<Vec<_>>()
        );
        assert_eq!(
            vec![pid::BODY],
            sync.changed_properties(2)
                .unwrap()
                .into_iter()
                .map(|p| p.tag)
                .collect::<Vec<_>>()
        );
        assert!(sync.changed_properties(0).is_none());

        let deleted = sync.deletions().unwrap().idset_deleted().unwrap();
        assert_eq!(
            vec![100u64, 101, 205],
            deleted.unwrap().ids().into_iter().collect::<Vec<_>>()
        );
        assert!(sync
            .deletions()
            .unwrap()
            .idset_soft_deleted()
            .unwrap()
            .is_none());
        assert_eq!(
            3,
            sync.read_state_changes()
                .unwrap()
                .idset_read()
                .unwrap()
                .unwrap()
                .ids()
                .len()
        );

        let given = sync.state().idset_given().unwrap().unwrap();
        assert_eq!(
            vec![1u64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            given.ids().into_iter().collect::<Vec<_>>()
        );
        assert!(sync.state().cnset_seen().unwrap().is_some());
        assert!(sync.state().cnset_read().unwrap().is_none());
    }

    #[test]
    fn unresolvable_group_index_is_skipped() {
        let info = PropertyGroupInfo::parse(&group_info_blob()).unwrap();
        let data = StreamBuilder::new()
            .marker(Marker::IncrSyncChgPartial)
            .marker(Marker::IncrementalSyncMessagePartial)
            .u32(9)
            .marker(Marker::IncrementalSyncMessagePartial)
            .u32(0)
            .build();
        let partial =
            MessageChangePartial::decode(&mut FxStream::new(&data)).unwrap();
        assert!(partial.group_info().is_none());
        assert_eq!(
            vec![9, 0],
            partial.groups().iter().map(|g| g.index).collect::<Vec<_>>()
        );
        assert_eq!(vec![pid::BODY], partial.changed_tags(&info));
    }

    #[test]
    fn sync_verify_needs_end_marker() {
        let data = state(StreamBuilder::new()).build();
        let s = FxStream::new(&data);
        assert!(State::verify(&s));
        assert!(!HierarchySync::verify(&s));
        assert!(!ContentsSync::verify(&s));

        let data = state(StreamBuilder::new())
            .marker(Marker::IncrSyncEnd)
            .build();
        let s = FxStream::new(&data);
        assert!(HierarchySync::verify(&s));
        assert!(ContentsSync::verify(&s));
        assert_eq!(0, s.position());
    }

    #[test]
    fn missing_state_is_fatal() {
        let data = StreamBuilder::new()
            .marker(Marker::IncrSyncChg)
            .variable(pid::SOURCE_KEY, &[1; 22])
            .marker(Marker::IncrSyncEnd)
            .build();
        assert_matches!(
            Err(Error::Grammar {
                production: "state",
                ..
            }),
            HierarchySync::decode(&mut FxStream::new(&data))
        );
    }

    #[test]
    fn progress_without_change_is_fatal() {
        let data = state(
            StreamBuilder::new()
                .marker(Marker::IncrSyncProgressPerMsg)
                .int32(PropTag::new(0x0000, PropType::INT32), 1),
        )
        .marker(Marker::IncrSyncEnd)
        .build();
        assert_matches!(
            Err(Error::Grammar {
                production: "messageChange",
                offset: 12,
            }),
            ContentsSync::decode(&mut FxStream::new(&data))
        );
    }

    #[test]
    fn hierarchy_folder_changes() {
        let data = StreamBuilder::new()
            .marker(Marker::IncrSyncChg)
            .variable(pid::PARENT_SOURCE_KEY, &[0; 22])
            .variable(pid::SOURCE_KEY, &[1; 22])
            .unicode(pid::DISPLAY_NAME, "Top")
            .marker(Marker::IncrSyncChg)
            .variable(pid::PARENT_SOURCE_KEY, &[1; 22])
            .variable(pid::SOURCE_KEY, &[2; 22])
            .marker(Marker::IncrSyncDel)
            .variable(pid::IDSET_DELETED, IDSET_100_101_205)
            .marker(Marker::IncrSyncStateBegin)
            .marker(Marker::IncrSyncStateEnd)
            .marker(Marker::IncrSyncEnd)
            .build();

        let sync = HierarchySync::decode(&mut FxStream::new(&data)).unwrap();
        let changes = sync.folder_changes();
        assert_eq!(2, changes.len());
        assert!(changes[0].is_root_child());
        assert!(!changes[1].is_root_child());
        assert_eq!(Some("Top".to_owned()), changes[0].display_name());
        assert_eq!(Some(&[2u8; 22][..]), changes[1].source_key());
        assert!(sync.parent_before_children());
        assert_eq!(None, sync.first_orphan());
        assert!(sync.deletions().is_some());
        assert!(sync.state().props().is_empty());
        assert!(sync.state().idset_given().unwrap().is_none());
    }
}
