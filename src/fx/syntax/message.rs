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

//! Messages and their children.
//!
//! ```text
//! messageList       = 1*( EcWarning u32 / errorInfo / message )
//! message           = (StartMessage / StartFAIMsg) messageContent EndMessage
//! messageContent    = propList messageChildren
//! messageChildren   = [delProp] *recipient [delProp] *attachment
//! recipient         = StartRecip propList EndToRecip
//! attachment        = NewAttach PidTagAttachNumber attachmentContent
//!                     EndAttach
//! attachmentContent = propList [embeddedMessage]
//! embeddedMessage   = StartEmbed messageContent EndEmbed
//! errorInfo         = FXErrorInfo propList
//! ```

use bitflags::bitflags;
use log::{trace, warn};

use super::{
    decode_meta_u32, decode_optional, decode_repeated, verify_meta_u32,
    DelProp, Element,
};
use crate::fx::marker::Marker;
use crate::fx::prop::list::PropList;
use crate::fx::prop::tag::{pid, PropTag};
use crate::fx::prop::value::PropValue;
use crate::fx::stream::FxStream;
use crate::support::error::Error;

bitflags! {
    /// The bits of `PidTagMessageFlags`.
    pub struct MessageFlags: u32 {
        const READ = 0x0001;
        const UNMODIFIED = 0x0002;
        const SUBMITTED = 0x0004;
        const UNSENT = 0x0008;
        const HAS_ATTACH = 0x0010;
        const FROM_ME = 0x0020;
        const ASSOCIATED = 0x0040;
        const RESEND = 0x0080;
        const NOTIFY_READ = 0x0100;
        const NOTIFY_UNREAD = 0x0200;
        const EVER_READ = 0x0400;
        const ORIGIN_X400 = 0x1000;
        const ORIGIN_INTERNET = 0x2000;
        const ORIGIN_MISC_EXT = 0x8000;
    }
}

/// A complete message, normal or folder-associated.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    fai: bool,
    content: MessageContent,
}

impl Message {
    /// Whether this is a folder-associated information message.
    pub fn is_fai(&self) -> bool {
        self.fai
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }
}

impl Element for Message {
    const NAME: &'static str = "message";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::StartMessage)
            || stream.verify_marker(Marker::StartFAIMsg)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let fai = if stream.verify_marker(Marker::StartFAIMsg) {
            stream.expect_marker(Marker::StartFAIMsg)?;
            true
        } else {
            // Fails without consuming anything if neither start marker is
            // present
            stream.expect_marker(Marker::StartMessage)?;
            false
        };

        trace!(
            "{} message at {}",
            if fai { "FAI" } else { "Normal" },
            stream.position() - 4
        );
        let content = MessageContent::decode(stream)?;
        stream.expect_marker(Marker::EndMessage)?;
        Ok(Message { fai, content })
    }
}

/// `errorInfo`: a message the server could not copy.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorInfo {
    props: PropList,
}

impl ErrorInfo {
    pub fn props(&self) -> &PropList {
        &self.props
    }
}

impl Element for ErrorInfo {
    const NAME: &'static str = "errorInfo";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::FXErrorInfo)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::FXErrorInfo)?;
        Ok(ErrorInfo {
            props: PropList::decode(stream)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageListEntry {
    Message(Message),
    /// An `EcWarning` code in place of a message which could not be sent.
    Warning(u32),
    ErrorInfo(ErrorInfo),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MessageList {
    entries: Vec<MessageListEntry>,
}

impl MessageList {
    pub fn entries(&self) -> &[MessageListEntry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.entries.iter().filter_map(|e| match *e {
            MessageListEntry::Message(ref m) => Some(m),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().filter_map(|e| match *e {
            MessageListEntry::Warning(code) => Some(code),
            _ => None,
        })
    }
}

impl Element for MessageList {
    const NAME: &'static str = "messageList";

    fn verify(stream: &FxStream<'_>) -> bool {
        Message::verify(stream)
            || ErrorInfo::verify(stream)
            || verify_meta_u32(stream, Marker::EcWarning)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let start = stream.position();
        let mut entries = Vec::new();
        loop {
            if Message::verify(stream) {
                entries.push(MessageListEntry::Message(Message::decode(
                    stream,
                )?));
            } else if ErrorInfo::verify(stream) {
                entries.push(MessageListEntry::ErrorInfo(ErrorInfo::decode(
                    stream,
                )?));
            } else if verify_meta_u32(stream, Marker::EcWarning) {
                let code = decode_meta_u32(stream, Marker::EcWarning)?;
                warn!(
                    "Message list carries warning {:#010X} at {}",
                    code,
                    stream.position() - 8
                );
                entries.push(MessageListEntry::Warning(code));
            } else {
                break;
            }
        }

        if entries.is_empty() {
            return Err(Error::Grammar {
                production: Self::NAME,
                offset: start,
            });
        }

        Ok(MessageList { entries })
    }
}

/// The body of a message: its own properties and its children.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageContent {
    props: PropList,
    children: MessageChildren,
}

impl MessageContent {
    pub fn props(&self) -> &PropList {
        &self.props
    }

    pub fn children(&self) -> &MessageChildren {
        &self.children
    }

    /// Whether the body is carried as compressed RTF.
    pub fn is_rtf_body(&self) -> bool {
        self.props.has_tag(pid::RTF_COMPRESSED)
    }

    /// Whether any string property of the message or its recipients is in
    /// an 8-bit code page.
    pub fn has_codepage_strings(&self) -> bool {
        self.props.has_codepage_strings()
            || self
                .children
                .recipients()
                .iter()
                .any(|r| r.props().has_codepage_strings())
    }

    pub fn message_flags(&self) -> Option<MessageFlags> {
        self.props
            .get_value(pid::MESSAGE_FLAGS)
            .and_then(PropValue::as_i32)
            .map(|f| MessageFlags::from_bits_truncate(f as u32))
    }
}

impl Element for MessageContent {
    const NAME: &'static str = "messageContent";

    fn verify(stream: &FxStream<'_>) -> bool {
        PropValue::verify(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let props = PropList::decode(stream)?;
        let children = MessageChildren::decode(stream)?;
        Ok(MessageContent { props, children })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageChildren {
    recipient_del_prop: Option<DelProp>,
    recipients: Vec<Recipient>,
    attachment_del_prop: Option<DelProp>,
    attachments: Vec<Attachment>,
}

impl MessageChildren {
    pub fn recipient_del_prop(&self) -> Option<PropTag> {
        self.recipient_del_prop.map(DelProp::tag)
    }

    pub fn attachment_del_prop(&self) -> Option<PropTag> {
        self.attachment_del_prop.map(DelProp::tag)
    }

    /// Both delete-property slots, in stream order.
    pub fn all_del_props(&self) -> Vec<PropTag> {
        self.recipient_del_prop
            .into_iter()
            .chain(self.attachment_del_prop)
            .map(DelProp::tag)
            .collect()
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Element for MessageChildren {
    const NAME: &'static str = "messageChildren";

    fn verify(stream: &FxStream<'_>) -> bool {
        DelProp::verify(stream)
            || Recipient::verify(stream)
            || Attachment::verify(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        // The first slot gates recipients. A delete of the attachment table
        // with no recipient delete before it belongs to the second slot.
        let recipient_del_prop = match DelProp::peek(stream) {
            Some(tag) if pid::MESSAGE_ATTACHMENTS != tag => {
                Some(DelProp::decode(stream)?)
            }
            _ => None,
        };
        let recipients = decode_repeated(stream)?;
        let attachment_del_prop = decode_optional(stream)?;
        let attachments = decode_repeated(stream)?;

        Ok(MessageChildren {
            recipient_del_prop,
            recipients,
            attachment_del_prop,
            attachments,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recipient {
    props: PropList,
}

impl Recipient {
    pub fn props(&self) -> &PropList {
        &self.props
    }
}

impl Element for Recipient {
    const NAME: &'static str = "recipient";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::StartRecip)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::StartRecip)?;
        let props = PropList::decode(stream)?;
        stream.expect_marker(Marker::EndToRecip)?;
        Ok(Recipient { props })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    number: u32,
    content: AttachmentContent,
}

impl Attachment {
    /// The value of `PidTagAttachNumber`.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn content(&self) -> &AttachmentContent {
        &self.content
    }
}

impl Element for Attachment {
    const NAME: &'static str = "attachment";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::NewAttach)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::NewAttach)?;

        let offset = stream.position();
        let number = PropValue::decode(stream)?;
        if pid::ATTACH_NUMBER != number.tag() {
            return Err(Error::PropTagMismatch {
                expected: pid::ATTACH_NUMBER.0,
                found: number.tag().0,
                offset,
            });
        }
        let number = number.as_i32().unwrap_or_default() as u32;

        let content = AttachmentContent::decode(stream)?;
        stream.expect_marker(Marker::EndAttach)?;
        Ok(Attachment { number, content })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentContent {
    props: PropList,
    embedded: Option<EmbeddedMessage>,
}

impl AttachmentContent {
    pub fn props(&self) -> &PropList {
        &self.props
    }

    pub fn embedded(&self) -> Option<&MessageContent> {
        self.embedded.as_ref().map(|e| &e.content)
    }
}

impl Element for AttachmentContent {
    const NAME: &'static str = "attachmentContent";

    fn verify(stream: &FxStream<'_>) -> bool {
        PropValue::verify(stream) || EmbeddedMessage::verify(stream)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        let props = PropList::decode(stream)?;
        let embedded = decode_optional(stream)?;
        Ok(AttachmentContent { props, embedded })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedMessage {
    content: MessageContent,
}

impl Element for EmbeddedMessage {
    const NAME: &'static str = "embeddedMessage";

    fn verify(stream: &FxStream<'_>) -> bool {
        stream.verify_marker(Marker::StartEmbed)
    }

    fn decode(stream: &mut FxStream<'_>) -> Result<Self, Error> {
        stream.expect_marker(Marker::StartEmbed)?;
        let content = MessageContent::decode(stream)?;
        stream.expect_marker(Marker::EndEmbed)?;
        Ok(EmbeddedMessage { content })
    }
}
