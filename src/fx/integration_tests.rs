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

//! Whole-stream scenarios cutting across the productions.

use proptest::prelude::*;
use rayon::prelude::*;

use super::marker::Marker;
use super::prop::list::PropList;
use super::prop::tag::{pid, PropTag, PropType};
use super::stream::FxStream;
use super::syntax::*;
use super::test_stream::StreamBuilder;
use crate::support::decode_config::{DecodeOptions, LengthPrefix};
use crate::support::error::Error;

fn minimal_hierarchy_sync() -> Vec<u8> {
    StreamBuilder::new()
        .marker(Marker::IncrSyncChg)
        .int64(pid::FOLDER_ID, 0x0001_0000_0000_002A)
        .marker(Marker::IncrSyncStateBegin)
        .marker(Marker::IncrSyncStateEnd)
        .marker(Marker::IncrSyncEnd)
        .build()
}

#[test]
fn minimal_hierarchy_sync_end_to_end() {
    crate::init_test_log();

    let data = minimal_hierarchy_sync();
    let mut s = FxStream::new(&data);
    assert!(HierarchySync::verify(&s));

    let sync = decode_complete::<HierarchySync>(&mut s).unwrap();
    assert_eq!(1, sync.folder_changes().len());
    assert_eq!(1, sync.folder_changes()[0].props().len());
    assert!(sync.deletions().is_none());
    assert!(sync.state().props().is_empty());
}

#[test]
fn truncated_hierarchy_sync_is_fatal() {
    let data = minimal_hierarchy_sync();
    let truncated = &data[..data.len() - 2];
    let s = FxStream::new(truncated);
    assert!(!HierarchySync::verify(&s));
    assert_matches!(
        Err(Error::Bounds { .. }),
        HierarchySync::decode(&mut FxStream::new(truncated))
    );
}

fn folder_stream(options: DecodeOptions) -> Vec<u8> {
    StreamBuilder::with_options(options)
        .marker(Marker::StartTopFld)
        .unicode(pid::DISPLAY_NAME, "Root")
        .del_prop(pid::CONTAINER_CONTENTS)
        .marker(Marker::StartMessage)
        .unicode(pid::DISPLAY_NAME, "Hello")
        .marker(Marker::StartRecip)
        .unicode(pid::DISPLAY_NAME, "Someone")
        .marker(Marker::EndToRecip)
        .marker(Marker::NewAttach)
        .int32(pid::ATTACH_NUMBER, 0)
        .multi_variable(
            PropTag::new(0x3712, PropType::MULTIPLE_BINARY),
            &[&b"x"[..], &b"yz"[..]],
        )
        .marker(Marker::EndAttach)
        .marker(Marker::EndMessage)
        .del_prop(pid::CONTAINER_HIERARCHY)
        .marker(Marker::StartSubFld)
        .unicode(pid::DISPLAY_NAME, "Child")
        .marker(Marker::EndFolder)
        .marker(Marker::EndFolder)
        .build()
}

#[test]
fn folder_decodes_with_either_prefix_width() {
    for &width in &[LengthPrefix::U16, LengthPrefix::U32] {
        let options = DecodeOptions {
            length_prefix: width,
            ..DecodeOptions::default()
        };
        let data = folder_stream(options);
        let mut s = FxStream::with_options(&data, options);
        let folder = decode_complete::<TopFolder>(&mut s).unwrap();

        let content = folder.content();
        assert_eq!(Some("Root".to_owned()), content.display_name());
        let message = content.messages().next().unwrap();
        assert_eq!(1, message.content().children().recipients().len());
        assert_eq!(1, message.content().children().attachments().len());
        assert_eq!(1, content.subfolders().len());
    }
}

#[test]
fn capture_sink_sees_lists_in_completion_order() {
    crate::init_test_log();

    let data = folder_stream(DecodeOptions::default());
    let mut captured: Vec<PropList> = Vec::new();
    {
        let mut s = FxStream::new(&data).with_sink(&mut captured);
        TopFolder::decode(&mut s).unwrap();
    }

    let names = captured
        .iter()
        .filter_map(|l| l.get_value(pid::DISPLAY_NAME))
        .filter_map(|v| v.as_string(1252))
        .collect::<Vec<_>>();
    assert_eq!(vec!["Root", "Hello", "Someone", "Child"], names);
    // Folder, message, recipient, attachment, sub-folder
    assert_eq!(5, captured.len());
}

#[test]
fn independent_streams_decode_concurrently() {
    let buffers = (0..64)
        .map(|i| {
            StreamBuilder::new()
                .marker(Marker::IncrSyncChg)
                .int64(pid::FOLDER_ID, i)
                .marker(Marker::IncrSyncStateBegin)
                .marker(Marker::IncrSyncStateEnd)
                .marker(Marker::IncrSyncEnd)
                .build()
        })
        .collect::<Vec<_>>();

    let ids = buffers
        .par_iter()
        .map(|data| {
            let sync =
                decode_complete::<HierarchySync>(&mut FxStream::new(data))
                    .unwrap();
            sync.folder_changes()[0]
                .props()
                .get_value(pid::FOLDER_ID)
                .and_then(|v| v.as_i64())
                .unwrap()
        })
        .collect::<Vec<_>>();

    assert_eq!((0..64).collect::<Vec<i64>>(), ids);
}

fn verify_all(s: &FxStream<'_>) {
    let _ = TopFolder::verify(s);
    let _ = SubFolder::verify(s);
    let _ = FolderContent::verify(s);
    let _ = FolderMessages::verify(s);
    let _ = MessageList::verify(s);
    let _ = Message::verify(s);
    let _ = MessageContent::verify(s);
    let _ = MessageChildren::verify(s);
    let _ = Recipient::verify(s);
    let _ = Attachment::verify(s);
    let _ = AttachmentContent::verify(s);
    let _ = EmbeddedMessage::verify(s);
    let _ = ErrorInfo::verify(s);
    let _ = DelProp::verify(s);
    let _ = HierarchySync::verify(s);
    let _ = ContentsSync::verify(s);
    let _ = FolderChange::verify(s);
    let _ = MessageChange::verify(s);
    let _ = MessageChangeFull::verify(s);
    let _ = MessageChangePartial::verify(s);
    let _ = GroupInfo::verify(s);
    let _ = Deletions::verify(s);
    let _ = ReadStateChanges::verify(s);
    let _ = ProgressTotal::verify(s);
    let _ = ProgressPerMessage::verify(s);
    let _ = State::verify(s);
}

fn marker_soup() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            (0usize..29).prop_map(|ix| Marker::all()[ix].to_le_bytes().to_vec()),
            prop::collection::vec(any::<u8>(), 0..6),
        ],
        0..12,
    )
    .prop_map(|chunks| chunks.concat())
}

proptest! {
    #[test]
    fn verify_never_moves(data in marker_soup(), start in 0usize..64) {
        let mut s = FxStream::new(&data);
        s.set_position(start);
        let before = s.position();
        verify_all(&s);
        prop_assert_eq!(before, s.position());
    }

    #[test]
    fn decoding_garbage_never_panics(data in marker_soup()) {
        let _ = HierarchySync::decode(&mut FxStream::new(&data));
        let _ = ContentsSync::decode(&mut FxStream::new(&data));
        let _ = TopFolder::decode(&mut FxStream::new(&data));
        let _ = MessageContent::decode(&mut FxStream::new(&data));
    }
}
