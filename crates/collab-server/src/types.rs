//! Shared types for the collaboration server.
//!
//! This module defines:
//! - `Frame`: an encoded outbound text frame, shared between connections
//! - channel aliases between sessions and the state task
//! - `StateRequest`: messages flowing from sessions to the state task

use std::sync::Arc;

use collab_core::{ConnectionId, InboundMessage};
use tokio::sync::mpsc;

/// An encoded outbound envelope.
///
/// Serialized once per broadcast; every connection gets a cheap clone.
pub type Frame = Arc<str>;

/// Outbound frames from the state task to a given connection.
pub type OutboundTx = mpsc::UnboundedSender<Frame>;
pub type OutboundRx = mpsc::UnboundedReceiver<Frame>;

/// Message flowing from a session into the central state task.
#[derive(Debug)]
pub enum StateRequest {
    /// A new connection is open; register its outbound handle.
    Connect { id: ConnectionId, outbound: OutboundTx },

    /// A decoded message from an active connection.
    Inbound { id: ConnectionId, msg: InboundMessage },

    /// The connection is gone, for whatever reason.
    Disconnect { id: ConnectionId },
}

/// Channel from sessions → state task.
pub type StateTx = mpsc::UnboundedSender<StateRequest>;
pub type StateRx = mpsc::UnboundedReceiver<StateRequest>;
