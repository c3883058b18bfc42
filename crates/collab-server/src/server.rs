//! WebSocket listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, up to `max_clients` at once.
//! - Spawns:
//!   - a per-connection task that upgrades to WebSocket and runs a session,
//!   - a single central state task that owns the `MessageRouter` and
//!     the `ConnectionRegistry`.
//!
//! The per-connection logic and the state loop live in `session` /
//! `transport` and `state_task` respectively.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use collab_core::MessageRouter;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::state_task;
use crate::transport;
use crate::types::{StateRx, StateTx};

/// Bind the configured address and run the server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    serve(listener, config).await
}

/// Run the accept loop on an already bound listener.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    // Channel from sessions → state task.
    let (state_tx, state_rx): (StateTx, StateRx) = mpsc::unbounded_channel();

    // Spawn the central state task.
    {
        let router = MessageRouter::with_activity_capacity(config.activity_log_capacity);
        tokio::spawn(async move {
            state_task::run_state_loop(state_rx, router).await;
        });
    }

    // One permit per open connection; held for the connection's lifetime.
    let slots = Arc::new(Semaphore::new(config.max_clients));

    let mut accept_failures: u32 = 0;
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => {
                accept_failures = 0;
                accepted
            }
            Err(e) => {
                // Typically fd exhaustion; retrying at once would spin.
                accept_failures = accept_failures.saturating_add(1);
                let delay = accept_backoff(accept_failures);
                error!(error = %e, retry_in = ?delay, "accept failed");
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        let Ok(permit) = slots.clone().try_acquire_owned() else {
            warn!(
                %peer_addr,
                max_clients = config.max_clients,
                "rejecting connection: max_clients reached"
            );
            // Just drop the stream; the client sees the connection closed.
            continue;
        };

        let state_tx = state_tx.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match transport::serve_connection(stream, peer_addr, state_tx).await {
                Ok(end) => info!(%peer_addr, %end, "connection finished"),
                Err(e) => warn!(%peer_addr, error = %e, "websocket handshake failed"),
            }
        });
    }
}

/// Delay before the next `accept` after `consecutive_failures` failed ones.
fn accept_backoff(consecutive_failures: u32) -> Duration {
    const BASE: Duration = Duration::from_millis(10);
    const MAX: Duration = Duration::from_secs(1);

    let shift = consecutive_failures.saturating_sub(1).min(16);
    BASE.saturating_mul(1 << shift).min(MAX)
}
