//! Envelope `type` tags.
//!
//! Both directions share the same two tags: a join and every departure
//! travel as `userevent`, content updates as `contentchange`.

use std::fmt;

use collab_core::{InboundMessage, OutboundMessage};

/// The `type` tag of an envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireKind {
    UserEvent,
    ContentChange,
}

impl WireKind {
    pub const USER_EVENT_TAG: &'static str = "userevent";
    pub const CONTENT_CHANGE_TAG: &'static str = "contentchange";

    pub fn as_tag(self) -> &'static str {
        match self {
            WireKind::UserEvent => Self::USER_EVENT_TAG,
            WireKind::ContentChange => Self::CONTENT_CHANGE_TAG,
        }
    }

    /// Exact, case-sensitive match on the tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::USER_EVENT_TAG => Some(WireKind::UserEvent),
            Self::CONTENT_CHANGE_TAG => Some(WireKind::ContentChange),
            _ => None,
        }
    }

    pub fn of_inbound(msg: &InboundMessage) -> Self {
        match msg {
            InboundMessage::PresenceJoin(_) => WireKind::UserEvent,
            InboundMessage::ContentChange(_) => WireKind::ContentChange,
        }
    }

    pub fn of_outbound(msg: &OutboundMessage) -> Self {
        match msg {
            OutboundMessage::Presence(_) => WireKind::UserEvent,
            OutboundMessage::Content(_) => WireKind::ContentChange,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
