//! Message router: the protocol state machine.
//!
//! Owns the presence store, the document and the activity log, and turns
//! every inbound message (or disconnect) into exactly one outbound
//! snapshot. There is no per-connection state here beyond presence
//! membership; the caller decides who receives the result (always
//! everyone).

use tracing::debug;

use crate::activity::ActivityLog;
use crate::connection_id::ConnectionId;
use crate::document::DocumentState;
use crate::messages::{
    ContentChange,
    ContentSnapshot,
    InboundMessage,
    OutboundMessage,
    PresenceJoin,
    PresenceSnapshot,
};
use crate::presence::PresenceStore;

/// Router over the shared collaboration state.
#[derive(Debug, Default)]
pub struct MessageRouter {
    presence: PresenceStore,
    document: DocumentState,
    activity: ActivityLog,
}

impl MessageRouter {
    /// Create a router with the default activity-log capacity.
    pub fn new() -> Self {
        MessageRouter::default()
    }

    /// Create a router whose activity log keeps at most `capacity` entries.
    pub fn with_activity_capacity(capacity: usize) -> Self {
        MessageRouter {
            activity: ActivityLog::with_capacity(capacity),
            ..MessageRouter::default()
        }
    }

    /// Apply one inbound message from connection `from`.
    pub fn process_message(&mut self, from: ConnectionId, msg: InboundMessage) -> OutboundMessage {
        match msg {
            InboundMessage::PresenceJoin(join) => self.process_join(from, join),
            InboundMessage::ContentChange(change) => self.process_content_change(from, change),
        }
    }

    /// Connection `id` is gone: drop its presence and announce the departure.
    ///
    /// Works for connections that never joined; the raw id stands in for
    /// the username.
    pub fn process_disconnect(&mut self, id: ConnectionId) -> OutboundMessage {
        let name = match self.presence.remove(&id) {
            Some(profile) => profile.username,
            None => id.to_string(),
        };
        debug!(connection = %id, %name, "removing presence");

        self.activity.append(format!("{name} left the document"));
        self.presence_snapshot()
    }

    // -------------------------------------------------------------------------
    // Internal handlers
    // -------------------------------------------------------------------------

    fn process_join(&mut self, from: ConnectionId, join: PresenceJoin) -> OutboundMessage {
        let event = format!("{} joined to edit the document", join.profile.username);
        self.presence.upsert(from, join.profile);
        self.activity.append(event);
        self.presence_snapshot()
    }

    fn process_content_change(&mut self, from: ConnectionId, change: ContentChange) -> OutboundMessage {
        debug!(connection = %from, bytes = change.content.len(), "content change");

        // Edits are not logged as activity, only echoed with the current log.
        self.document.set(change.content);

        OutboundMessage::Content(ContentSnapshot {
            editor_content: self.document.get().to_string(),
            user_activity: self.activity.all(),
        })
    }

    fn presence_snapshot(&self) -> OutboundMessage {
        OutboundMessage::Presence(PresenceSnapshot {
            users: self.presence.snapshot(),
            user_activity: self.activity.all(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn presence(&self) -> &PresenceStore {
        &self.presence
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }
}
