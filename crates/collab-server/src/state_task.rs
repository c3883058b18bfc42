//! Central state loop.
//!
//! This task owns the `MessageRouter` (presence, document, activity log)
//! and the `ConnectionRegistry`, and processes all `StateRequest`s
//! coming from sessions. Owning everything in one task is what makes each
//! request atomic: no other session can observe a half-applied change.
//!
//! Routing policy: every routed message and every departure produces
//! exactly one snapshot, broadcast to **all** registered connections.
//! Connections found dead during a broadcast are pruned and their
//! departure is broadcast in turn.

use std::collections::VecDeque;

use collab_core::{MessageRouter, OutboundMessage};
use tracing::{debug, error, info};

use crate::dispatcher;
use crate::registry::ConnectionRegistry;
use crate::types::{StateRequest, StateRx};

/// Run the central state processing loop.
///
/// - `state_rx`: receives requests from all sessions.
/// - `router`: the collaboration state to drive.
///
/// Returns the router once every sender is gone, so callers can inspect
/// the final state.
pub async fn run_state_loop(mut state_rx: StateRx, mut router: MessageRouter) -> MessageRouter {
    let mut registry = ConnectionRegistry::new();

    while let Some(req) = state_rx.recv().await {
        handle_request(&mut router, &mut registry, req);
    }

    info!("State loop shutting down (state_rx closed)");
    router
}

fn handle_request(router: &mut MessageRouter, registry: &mut ConnectionRegistry, req: StateRequest) {
    match req {
        StateRequest::Connect { id, outbound } => match registry.register(id, outbound) {
            Ok(()) => info!(connection = %id, connections = registry.len(), "connection registered"),
            Err(e) => error!(error = %e, "rejecting connection"),
        },

        StateRequest::Inbound { id, msg } => {
            // A pruned connection may still have messages in flight.
            if !registry.contains(&id) {
                debug!(connection = %id, "dropping message from unregistered connection");
                return;
            }
            let out = router.process_message(id, msg);
            publish(router, registry, out);
        }

        StateRequest::Disconnect { id } => match registry.unregister(&id) {
            Ok(_) => {
                info!(connection = %id, connections = registry.len(), "connection removed");
                let out = router.process_disconnect(id);
                publish(router, registry, out);
            }
            // Already pruned after a failed send; its departure was announced then.
            Err(e) => debug!(error = %e, "ignoring disconnect"),
        },
    }
}

/// Broadcast `out`, then announce the departure of any connection pruned
/// along the way.
fn publish(router: &mut MessageRouter, registry: &mut ConnectionRegistry, out: OutboundMessage) {
    let mut pending = VecDeque::from([out]);

    while let Some(out) = pending.pop_front() {
        for id in dispatcher::dispatch(registry, &out) {
            pending.push_back(router.process_disconnect(id));
        }
    }
}
