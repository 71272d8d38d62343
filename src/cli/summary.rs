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

//! One-screen statistics about a decoded stream.

use std::io::Write;

use super::decode::Decoded;
use super::PrintError;
use crate::fx::idset::IdSet;
use crate::fx::syntax::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FolderStats {
    folders: usize,
    messages: usize,
    fai_messages: usize,
    attachments: usize,
    recipients: usize,
}

impl FolderStats {
    fn folder(&mut self, content: &FolderContent) {
        self.folders += 1;
        for message in content.messages() {
            if message.is_fai() {
                self.fai_messages += 1;
            } else {
                self.messages += 1;
            }
            self.message(message.content());
        }
        for sub in content.subfolders() {
            self.folder(sub.content());
        }
    }

    fn message(&mut self, content: &MessageContent) {
        self.children(content.children());
    }

    fn children(&mut self, children: &MessageChildren) {
        self.recipients += children.recipients().len();
        for a in children.attachments() {
            self.attachments += 1;
            if let Some(embedded) = a.content().embedded() {
                self.message(embedded);
            }
        }
    }
}

fn idset_line(
    out: &mut impl Write,
    label: &str,
    idset: Option<IdSet>,
) -> Result<(), PrintError> {
    match idset {
        None => writeln!(out, "{}: absent", label)?,
        Some(idset) => writeln!(
            out,
            "{}: {} ids in {} replicas",
            label,
            idset.len(),
            idset.replicas().len()
        )?,
    }
    Ok(())
}

fn state(out: &mut impl Write, state: &State) -> Result<(), PrintError> {
    idset_line(out, "given", state.idset_given()?)?;
    idset_line(out, "seen", state.cnset_seen()?)?;
    idset_line(out, "seen FAI", state.cnset_seen_fai()?)?;
    idset_line(out, "read", state.cnset_read()?)?;
    Ok(())
}

fn deletions(
    out: &mut impl Write,
    deletions: Option<&Deletions>,
) -> Result<(), PrintError> {
    if let Some(d) = deletions {
        idset_line(out, "deleted", d.idset_deleted()?)?;
        idset_line(out, "soft deleted", d.idset_soft_deleted()?)?;
        idset_line(out, "expired", d.idset_expired()?)?;
    }
    Ok(())
}

fn folder_stats(
    out: &mut impl Write,
    stats: FolderStats,
) -> Result<(), PrintError> {
    writeln!(out, "folders: {}", stats.folders)?;
    writeln!(
        out,
        "messages: {} normal, {} FAI",
        stats.messages, stats.fai_messages
    )?;
    writeln!(out, "recipients: {}", stats.recipients)?;
    writeln!(out, "attachments: {}", stats.attachments)?;
    Ok(())
}

fn hierarchy_sync(
    out: &mut impl Write,
    sync: &HierarchySync,
) -> Result<(), PrintError> {
    writeln!(out, "folder changes: {}", sync.folder_changes().len())?;
    match sync.first_orphan() {
        None => writeln!(out, "ordering: parents precede children")?,
        Some(ix) => writeln!(
            out,
            "ordering: change {} ({}) has no earlier parent",
            ix,
            sync.folder_changes()[ix]
                .display_name()
                .unwrap_or_else(|| "unnamed".to_owned())
        )?,
    }
    deletions(out, sync.deletions())?;
    state(out, sync.state())
}

fn contents_sync(
    out: &mut impl Write,
    sync: &ContentsSync,
) -> Result<(), PrintError> {
    if let Some(info) = sync
        .progress_total()
        .map(ProgressTotal::progress_information)
        .transpose()?
        .flatten()
    {
        writeln!(
            out,
            "announced: {} normal ({} bytes), {} FAI ({} bytes)",
            info.normal_message_count,
            info.normal_message_total_size,
            info.fai_message_count,
            info.fai_message_total_size
        )?;
    }

    let partial = sync
        .changes()
        .iter()
        .filter(|c| c.change.is_partial())
        .count();
    writeln!(
        out,
        "message changes: {} full, {} partial",
        sync.changes().len() - partial,
        partial
    )?;

    let mut stats = FolderStats::default();
    for c in sync.changes() {
        stats.children(c.change.children());
    }
    writeln!(out, "recipients: {}", stats.recipients)?;
    writeln!(out, "attachments: {}", stats.attachments)?;

    for (ix, c) in sync.changes().iter().enumerate() {
        if let MessageChange::Partial(ref p) = c.change {
            if let Some(info) = p.group_info() {
                writeln!(
                    out,
                    "group info {} at change {}: {} groups",
                    info.group_id,
                    ix,
                    info.len()
                )?;
            }
        }
    }

    deletions(out, sync.deletions())?;
    if let Some(read) = sync.read_state_changes() {
        idset_line(out, "marked read", read.idset_read()?)?;
        idset_line(out, "marked unread", read.idset_unread()?)?;
    }
    state(out, sync.state())
}

pub fn print<W: Write>(
    out: &mut W,
    decoded: &Decoded,
) -> Result<(), PrintError> {
    match *decoded {
        Decoded::HierarchySync(ref e) => hierarchy_sync(out, e),
        Decoded::ContentsSync(ref e) => contents_sync(out, e),
        Decoded::TopFolder(ref e) => {
            let mut stats = FolderStats::default();
            stats.folder(e.content());
            folder_stats(out, stats)
        }
        Decoded::FolderContent(ref e) => {
            let mut stats = FolderStats::default();
            stats.folder(e);
            folder_stats(out, stats)
        }
        Decoded::MessageContent(ref e) => {
            let mut stats = FolderStats::default();
            stats.message(e);
            writeln!(out, "properties: {}", e.props().len())?;
            writeln!(out, "recipients: {}", stats.recipients)?;
            writeln!(out, "attachments: {}", stats.attachments)?;
            writeln!(out, "RTF body: {}", e.is_rtf_body())?;
            Ok(())
        }
        Decoded::MessageList(ref e) => {
            let mut stats = FolderStats::default();
            for message in e.messages() {
                if message.is_fai() {
                    stats.fai_messages += 1;
                } else {
                    stats.messages += 1;
                }
                stats.message(message.content());
            }
            writeln!(
                out,
                "messages: {} normal, {} FAI",
                stats.messages, stats.fai_messages
            )?;
            writeln!(out, "warnings: {}", e.warnings().count())?;
            Ok(())
        }
        Decoded::AttachmentContent(ref e) => {
            writeln!(out, "properties: {}", e.props().len())?;
            writeln!(out, "embedded message: {}", e.embedded().is_some())?;
            Ok(())
        }
        Decoded::State(ref e) => state(out, e),
    }
}
