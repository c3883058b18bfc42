//! User profiles submitted on join.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of a present user.
///
/// The client may send any fields it likes alongside `username`; they are
/// kept verbatim and echoed back in presence snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,

    /// Every other field the client sent with its join event.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Profile with only a username.
    pub fn new(username: impl Into<String>) -> Self {
        UserProfile {
            username: username.into(),
            extra: Map::new(),
        }
    }

    /// Builder-style helper for adding an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
