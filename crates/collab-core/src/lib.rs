//! collab-core
//!
//! Pure collaboration logic:
//! - connection identifiers and user profiles
//! - presence, document and activity-log stores
//! - input/output message types
//! - the message router that mutates the stores

pub mod connection_id;
pub mod profile;
pub mod presence;
pub mod document;
pub mod activity;
pub mod messages;
pub mod router;

pub use connection_id::ConnectionId;
pub use profile::UserProfile;

pub use presence::PresenceStore;
pub use document::DocumentState;
pub use activity::{ActivityLog, DEFAULT_ACTIVITY_CAPACITY};

pub use messages::{
    ContentChange,
    ContentSnapshot,
    InboundMessage,
    OutboundMessage,
    PresenceJoin,
    PresenceSnapshot,
};

pub use router::MessageRouter;
