//! Message types used by the collaboration core.
//!
//! These are **transport-agnostic** logical messages:
//! - [`InboundMessage`]: what the router consumes.
//! - [`OutboundMessage`]: what the router produces for broadcast.
//!
//! Every outbound message is a full snapshot (never a delta): the whole
//! activity log plus either the whole presence map or the whole document.
//!
//! Note: the JSON envelope (`type` tag, `data` body) lives in the
//! `collab-protocol` crate; this module is purely logical.

use indexmap::IndexMap;
use serde::Serialize;

use crate::connection_id::ConnectionId;
use crate::profile::UserProfile;

/// A request into the router, already parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// A client announces who it is.
    PresenceJoin(PresenceJoin),

    /// A client replaces the document content.
    ContentChange(ContentChange),
}

/// Join event (input).
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceJoin {
    pub profile: UserProfile,
}

/// Content change event (input). Carries the full new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub content: String,
}

impl InboundMessage {
    pub fn join(profile: UserProfile) -> Self {
        InboundMessage::PresenceJoin(PresenceJoin { profile })
    }

    pub fn content_change(content: impl Into<String>) -> Self {
        InboundMessage::ContentChange(ContentChange {
            content: content.into(),
        })
    }
}

/// An event emitted by the router, broadcast to every connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Presence changed (join or departure).
    Presence(PresenceSnapshot),

    /// Document content changed.
    Content(ContentSnapshot),
}

/// Presence snapshot body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    pub users: IndexMap<ConnectionId, UserProfile>,
    pub user_activity: Vec<String>,
}

/// Content snapshot body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    pub editor_content: String,
    pub user_activity: Vec<String>,
}

impl OutboundMessage {
    /// Activity log carried by either variant.
    pub fn user_activity(&self) -> &[String] {
        match self {
            OutboundMessage::Presence(p) => &p.user_activity,
            OutboundMessage::Content(c) => &c.user_activity,
        }
    }
}
