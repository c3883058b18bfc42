//! WebSocket adapter between a TCP stream and a session.
//!
//! Upgrades the stream, spawns a writer task that drains the
//! connection's outbound channel into the socket, and feeds data frames
//! into [`run_session`](crate::session::run_session). Text and binary
//! frames both carry envelopes; a binary frame that is not UTF-8 ends
//! the session. Ping and pong frames are ignored; a close frame ends the
//! inbound stream.

use std::future;
use std::net::SocketAddr;
use std::str::Utf8Error;

use collab_core::ConnectionId;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use thiserror::Error;
use tracing::{debug, info};

use crate::session::{run_session, SessionEnd};
use crate::types::{OutboundRx, OutboundTx, StateTx};

/// Serve one accepted TCP connection until its session ends.
pub async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state_tx: StateTx,
) -> Result<SessionEnd, tungstenite::Error> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, ws_receiver) = ws_stream.split();

    let id = ConnectionId::generate();
    info!(connection = %id, %peer_addr, "websocket connection established");

    let (out_tx, mut out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

    // Writer task: runs until every sender (registry and session) is gone or
    // the socket fails. A failed write drops `out_rx`, which ends the session.
    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(frame.to_string().into())).await {
                debug!(connection = %id, error = %e, "write failed, stopping writer");
                return;
            }
        }
        let _ = ws_sender.close().await;
    });

    Ok(run_session(id, inbound_frames(ws_receiver), out_tx, state_tx).await)
}

/// Why an inbound frame could not be handed to the session.
#[derive(Debug, Error)]
enum FrameError {
    #[error(transparent)]
    WebSocket(#[from] tungstenite::Error),

    #[error("binary frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Turn text and binary frames into envelope text, stopping at the first
/// close frame.
fn inbound_frames<S>(ws_receiver: S) -> impl Stream<Item = Result<String, FrameError>>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>,
{
    ws_receiver
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => Some(
                    std::str::from_utf8(&data)
                        .map(str::to_owned)
                        .map_err(FrameError::from),
                ),
                // ping / pong
                Ok(_) => None,
                Err(e) => Some(Err(FrameError::from(e))),
            })
        })
}
