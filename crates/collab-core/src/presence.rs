//! Presence: which connection is which user.

use indexmap::IndexMap;

use crate::connection_id::ConnectionId;
use crate::profile::UserProfile;

/// Tracks the profile of every connection that has sent a join event.
///
/// A connection may be registered for a while before it shows up here;
/// presence only starts once the client announces itself. Iteration
/// order is join order.
#[derive(Debug, Default, Clone)]
pub struct PresenceStore {
    users: IndexMap<ConnectionId, UserProfile>,
}

impl PresenceStore {
    pub fn new() -> Self {
        PresenceStore::default()
    }

    /// Insert or replace the profile for `id`.
    ///
    /// A repeated join keeps the connection's original position.
    pub fn upsert(&mut self, id: ConnectionId, profile: UserProfile) {
        self.users.insert(id, profile);
    }

    /// Remove the profile for `id`, returning it if there was one.
    ///
    /// Absent ids are not an error: callers fall back to the raw id
    /// when they need a display name.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<UserProfile> {
        self.users.shift_remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&UserProfile> {
        self.users.get(id)
    }

    /// Full copy of the current mapping.
    pub fn snapshot(&self) -> IndexMap<ConnectionId, UserProfile> {
        self.users.clone()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
