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

//! Indented text rendering of decoded trees.

use std::fmt;
use std::io::{self, Write};

use super::decode::Decoded;
use super::PrintError;
use crate::fx::idset::IdSet;
use crate::fx::prop::list::PropList;
use crate::fx::prop::tag::PropType;
use crate::fx::prop::value::{FixedValue, NameKind, PropData, PropValue};
use crate::fx::syntax::*;
use crate::support::codepage;
use crate::support::filetime;

/// Code page assumed for 8-bit strings whose type does not name one.
const DEFAULT_CODEPAGE: u16 = 1252;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

fn format_fixed(v: FixedValue) -> String {
    match v {
        FixedValue::Int16(v) => v.to_string(),
        FixedValue::Int32(v) => v.to_string(),
        FixedValue::Int64(v) | FixedValue::Currency(v) => v.to_string(),
        FixedValue::Float32(v) => v.to_string(),
        FixedValue::Float64(v) | FixedValue::FloatingTime(v) => v.to_string(),
        FixedValue::ErrorCode(v) => format!("{:#010X}", v),
        FixedValue::Boolean(v) => v.to_string(),
        FixedValue::Time(v) => match filetime::to_utc(v) {
            Some(dt) => dt.to_rfc3339(),
            None => format!("FILETIME {}", v),
        },
        FixedValue::Guid(ref g) => hex(g),
    }
}

fn format_bytes(ty: PropType, bytes: &[u8]) -> String {
    if PropType::STRING == ty {
        format!("{:?}", codepage::decode_utf16le(bytes))
    } else if ty.is_non_unicode_string() {
        format!(
            "{:?}",
            codepage::decode(ty.codepage().unwrap_or(DEFAULT_CODEPAGE), bytes)
        )
    } else {
        format!("<{} bytes> {}", bytes.len(), base64::encode(bytes))
    }
}

/// Render one property value as `tag [name] = value`.
pub fn format_value(v: &PropValue) -> String {
    let name = match v.name() {
        None => String::new(),
        Some(name) => match name.kind {
            NameKind::Lid(lid) => {
                format!(" [{}/{:#06X}]", hex(&name.guid), lid)
            }
            NameKind::Name(ref s) => format!(" [{}/{:?}]", hex(&name.guid), s),
        },
    };

    let ty = v.tag().ty();
    let value = match *v.data() {
        PropData::Fixed(f) => format_fixed(f),
        PropData::Variable(ref bytes) => format_bytes(ty, bytes),
        PropData::MultiFixed(ref values) => format!(
            "[{}]",
            values
                .iter()
                .map(|&f| format_fixed(f))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        PropData::MultiVariable(ref values) => format!(
            "[{}]",
            values
                .iter()
                .map(|b| format_bytes(ty.element(), b))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    format!("{:#010X}{} = {}", v.tag().0, name, value)
}

pub struct Dumper<W> {
    out: W,
    depth: usize,
}

impl<W: Write> Dumper<W> {
    pub fn new(out: W) -> Self {
        Dumper { out, depth: 0 }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.out, "{:indent$}{}", "", args, indent = 2 * self.depth)
    }

    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), PrintError>,
    ) -> Result<(), PrintError> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub fn decoded(&mut self, decoded: &Decoded) -> Result<(), PrintError> {
        match *decoded {
            Decoded::HierarchySync(ref e) => self.hierarchy_sync(e),
            Decoded::ContentsSync(ref e) => self.contents_sync(e),
            Decoded::TopFolder(ref e) => {
                self.line(format_args!("topFolder"))?;
                self.nested(|d| d.folder_content(e.content()))
            }
            Decoded::FolderContent(ref e) => self.folder_content(e),
            Decoded::MessageContent(ref e) => self.message_content(e),
            Decoded::MessageList(ref e) => self.message_list(e),
            Decoded::AttachmentContent(ref e) => self.attachment_content(e),
            Decoded::State(ref e) => self.state(e),
        }
    }

    fn props(&mut self, props: &PropList) -> Result<(), PrintError> {
        for v in props {
            self.line(format_args!("{}", format_value(v)))?;
        }
        Ok(())
    }

    fn labelled_props(
        &mut self,
        label: &str,
        props: &PropList,
    ) -> Result<(), PrintError> {
        self.line(format_args!("{}", label))?;
        self.nested(|d| d.props(props))
    }

    pub fn idset(&mut self, idset: &IdSet) -> Result<(), PrintError> {
        for replica in idset.replicas() {
            let ranges = replica
                .globset
                .flatten_ranges()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            self.line(format_args!(
                "replica {}: {}",
                replica.replica,
                ranges.join(", ")
            ))?;
        }
        Ok(())
    }

    fn labelled_idset(
        &mut self,
        label: &str,
        idset: Option<IdSet>,
    ) -> Result<(), PrintError> {
        if let Some(idset) = idset {
            self.line(format_args!("{}", label))?;
            self.nested(|d| d.idset(&idset))?;
        }
        Ok(())
    }

    fn folder_content(
        &mut self,
        content: &FolderContent,
    ) -> Result<(), PrintError> {
        self.props(content.props())?;
        if let Some(code) = content.warning() {
            self.line(format_args!("EcWarning {:#010X}", code))?;
        }

        for folder in content.new_fx_folders() {
            for tag in folder.del_props() {
                self.line(format_args!("delProp {:#010X}", tag.0))?;
            }
            let info = folder.replica_info()?;
            self.line(format_args!(
                "NewFXFolder depth={} servers={:?}",
                info.depth, info.server_dns
            ))?;
        }

        if let Some(messages) = content.folder_messages() {
            for (tag, list) in messages.lists() {
                self.line(format_args!("delProp {:#010X}", tag.0))?;
                self.message_list(list)?;
            }
        }

        for tag in content.subfolder_del_props() {
            self.line(format_args!("delProp {:#010X}", tag.0))?;
        }
        for sub in content.subfolders() {
            self.line(format_args!("subFolder"))?;
            self.nested(|d| d.folder_content(sub.content()))?;
        }
        Ok(())
    }

    fn message_list(&mut self, list: &MessageList) -> Result<(), PrintError> {
        for entry in list.entries() {
            match *entry {
                MessageListEntry::Message(ref m) => {
                    self.line(format_args!(
                        "{}",
                        if m.is_fai() { "FAI message" } else { "message" }
                    ))?;
                    self.nested(|d| d.message_content(m.content()))?;
                }
                MessageListEntry::Warning(code) => {
                    self.line(format_args!("EcWarning {:#010X}", code))?;
                }
                MessageListEntry::ErrorInfo(ref e) => {
                    self.labelled_props("errorInfo", e.props())?;
                }
            }
        }
        Ok(())
    }

    fn message_content(
        &mut self,
        content: &MessageContent,
    ) -> Result<(), PrintError> {
        self.props(content.props())?;
        self.children(content.children())
    }

    fn children(
        &mut self,
        children: &MessageChildren,
    ) -> Result<(), PrintError> {
        if let Some(tag) = children.recipient_del_prop() {
            self.line(format_args!("delProp {:#010X}", tag.0))?;
        }
        for r in children.recipients() {
            self.labelled_props("recipient", r.props())?;
        }
        if let Some(tag) = children.attachment_del_prop() {
            self.line(format_args!("delProp {:#010X}", tag.0))?;
        }
        for a in children.attachments() {
            self.line(format_args!("attachment {}", a.number()))?;
            self.nested(|d| d.attachment_content(a.content()))?;
        }
        Ok(())
    }

    fn attachment_content(
        &mut self,
        content: &AttachmentContent,
    ) -> Result<(), PrintError> {
        self.props(content.props())?;
        if let Some(embedded) = content.embedded() {
            self.line(format_args!("embeddedMessage"))?;
            self.nested(|d| d.message_content(embedded))?;
        }
        Ok(())
    }

    fn deletions(&mut self, deletions: &Deletions) -> Result<(), PrintError> {
        self.labelled_props("deletions", deletions.props())?;
        self.nested(|d| {
            d.labelled_idset("deleted", deletions.idset_deleted()?)?;
            d.labelled_idset("soft deleted", deletions.idset_soft_deleted()?)?;
            d.labelled_idset("expired", deletions.idset_expired()?)
        })
    }

    fn state(&mut self, state: &State) -> Result<(), PrintError> {
        self.labelled_props("state", state.props())?;
        self.nested(|d| {
            d.labelled_idset("given", state.idset_given()?)?;
            d.labelled_idset("seen", state.cnset_seen()?)?;
            d.labelled_idset("seen FAI", state.cnset_seen_fai()?)?;
            d.labelled_idset("read", state.cnset_read()?)
        })
    }

    fn hierarchy_sync(&mut self, sync: &HierarchySync) -> Result<(), PrintError> {
        self.line(format_args!("hierarchySync"))?;
        self.nested(|d| {
            for change in sync.folder_changes() {
                d.labelled_props("folderChange", change.props())?;
            }
            if let Some(deletions) = sync.deletions() {
                d.deletions(deletions)?;
            }
            d.state(sync.state())
        })
    }

    fn contents_sync(&mut self, sync: &ContentsSync) -> Result<(), PrintError> {
        self.line(format_args!("contentsSync"))?;
        self.nested(|d| {
            if let Some(total) = sync.progress_total() {
                d.labelled_props("progressTotal", total.props())?;
            }

            for c in sync.changes() {
                if let Some(ref progress) = c.progress {
                    d.labelled_props("progressPerMessage", progress.props())?;
                }

                match c.change {
                    MessageChange::Full(ref full) => {
                        d.labelled_props("messageChangeFull", c.change.header())?;
                        d.nested(|d| {
                            d.labelled_props("message", full.props())?;
                            d.children(c.change.children())
                        })?;
                    }
                    MessageChange::Partial(ref partial) => {
                        if let Some(info) = partial.group_info() {
                            d.line(format_args!(
                                "groupInfo {} with {} groups",
                                info.group_id,
                                info.len()
                            ))?;
                        }
                        if let Some(id) = partial.group_id() {
                            d.line(format_args!("IncrSyncGroupId {}", id))?;
                        }
                        d.labelled_props(
                            "messageChangePartial",
                            c.change.header(),
                        )?;
                        d.nested(|d| {
                            for group in partial.groups() {
                                d.labelled_props(
                                    &format!("group {}", group.index),
                                    &group.props,
                                )?;
                            }
                            d.children(c.change.children())
                        })?;
                    }
                }
            }

            if let Some(deletions) = sync.deletions() {
                d.deletions(deletions)?;
            }
            if let Some(read) = sync.read_state_changes() {
                d.labelled_props("readStateChanges", read.props())?;
                d.nested(|d| {
                    d.labelled_idset("read", read.idset_read()?)?;
                    d.labelled_idset("unread", read.idset_unread()?)
                })?;
            }
            d.state(sync.state())
        })
    }
}
