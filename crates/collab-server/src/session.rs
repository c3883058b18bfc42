//! Per-connection session loop.
//!
//! Lifecycle: `Connecting → Active → Closing → Removed`.
//!
//! - Connecting → Active: the connection is registered with the state
//!   task. It is now connected but not yet *present*; presence starts
//!   with the client's first join event.
//! - Active: receive a text frame, decode it, forward it.
//! - Active → Closing: the stream ends, a receive fails, the client
//!   sends a frame that breaks the envelope contract, or the outbound
//!   side is gone (the writer stopped, so the registry prunes or has
//!   pruned the connection).
//! - Closing → Removed: a `Disconnect` is sent to the state task, which
//!   unregisters the connection and announces the departure.
//!
//! The last step is tied to a drop guard, so it runs on every exit path,
//! including the session task being aborted or panicking.

use std::fmt;

use collab_core::ConnectionId;
use collab_protocol::{decode_inbound, ProtocolError};
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::types::{OutboundTx, StateRequest, StateTx};

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer closed the connection.
    Closed,

    /// Receiving failed (abrupt close, I/O error). Treated like a close.
    ReceiveError(String),

    /// The peer sent a frame that is not a valid envelope.
    ProtocolViolation(ProtocolError),

    /// Nobody reads the outbound channel any more; the peer can no longer
    /// be reached.
    OutboundClosed,

    /// The state task is gone; the server is shutting down.
    StateClosed,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Closed => f.write_str("closed by peer"),
            SessionEnd::ReceiveError(e) => write!(f, "receive error: {e}"),
            SessionEnd::ProtocolViolation(e) => write!(f, "protocol violation: {e}"),
            SessionEnd::OutboundClosed => f.write_str("outbound channel closed"),
            SessionEnd::StateClosed => f.write_str("state task closed"),
        }
    }
}

/// Sends `Disconnect` for its connection when dropped.
struct DisconnectGuard {
    id: ConnectionId,
    state_tx: StateTx,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        debug!(connection = %self.id, "session closing");
        // Fails only if the state task is already gone, and then there is
        // nothing left to clean up.
        let _ = self.state_tx.send(StateRequest::Disconnect { id: self.id });
    }
}

/// Run the session for connection `id`.
///
/// - `inbound`: text frames from the peer, in order.
/// - `outbound`: handle the state task uses to reach the peer.
/// - `state_tx`: channel into the state task.
pub async fn run_session<S, E>(
    id: ConnectionId,
    inbound: S,
    outbound: OutboundTx,
    state_tx: StateTx,
) -> SessionEnd
where
    S: Stream<Item = Result<String, E>>,
    E: fmt::Display,
{
    // Only used to notice the writer going away; never sent on.
    let outbound_watch = outbound.clone();

    if state_tx
        .send(StateRequest::Connect { id, outbound })
        .is_err()
    {
        return SessionEnd::StateClosed;
    }
    let _guard = DisconnectGuard {
        id,
        state_tx: state_tx.clone(),
    };
    info!(connection = %id, "session active");

    let mut inbound = std::pin::pin!(inbound);

    loop {
        let text = tokio::select! {
            next = inbound.next() => match next {
                None => break SessionEnd::Closed,
                Some(Err(e)) => break SessionEnd::ReceiveError(e.to_string()),
                Some(Ok(text)) => text,
            },
            _ = outbound_watch.closed() => {
                info!(connection = %id, "outbound channel closed, ending session");
                break SessionEnd::OutboundClosed;
            }
        };

        match decode_inbound(&text) {
            Ok(msg) => {
                debug!(connection = %id, ?msg, "inbound message");
                if state_tx.send(StateRequest::Inbound { id, msg }).is_err() {
                    break SessionEnd::StateClosed;
                }
            }
            Err(e) if !e.is_fatal() => {
                warn!(connection = %id, error = %e, "ignoring message");
            }
            Err(e) => {
                warn!(connection = %id, error = %e, "closing connection after malformed message");
                break SessionEnd::ProtocolViolation(e);
            }
        }
    }
}
