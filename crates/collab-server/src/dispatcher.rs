//! Broadcast fan-out.
//!
//! Encodes an `OutboundMessage` once and queues the shared frame on every
//! registered connection. Connections whose handle turned out to be
//! closed are unregistered here and handed back to the caller, which
//! treats them as implicit disconnects.

use collab_core::{ConnectionId, OutboundMessage};
use collab_protocol::encode_outbound;
use tracing::{debug, error, warn};

use crate::registry::ConnectionRegistry;
use crate::types::Frame;

/// Broadcast `msg` to all connections in `registry`.
///
/// Returns the connections that were pruned because their send failed.
pub fn dispatch(registry: &mut ConnectionRegistry, msg: &OutboundMessage) -> Vec<ConnectionId> {
    let frame: Frame = match encode_outbound(msg) {
        Ok(text) => text.into(),
        Err(e) => {
            error!(error = %e, "failed to encode outbound message, dropping it");
            return Vec::new();
        }
    };

    debug!(
        recipients = registry.len(),
        bytes = frame.len(),
        "broadcasting frame"
    );

    let failed = registry.broadcast(&frame);
    for id in &failed {
        warn!(connection = %id, "outbound channel closed, pruning connection");
        // Just reported by broadcast, so it is still registered.
        let _ = registry.unregister(id);
    }
    failed
}
