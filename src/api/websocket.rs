//! WebSocket transport for hub sessions.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, warn};

use super::handlers::AppState;
use crate::hub::Hub;
use crate::session::Frame;

/// How long a closing connection may keep flushing queued frames.
const WRITER_GRACE: Duration = Duration::from_secs(1);

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Drive one connection until either side closes or the hub disconnects it.
///
/// Once the hub stops accepting, inbound frames are no longer read but
/// queued frames keep flowing out until the hub disconnects the session.
async fn handle_socket(socket: WebSocket, hub: Hub) {
    let _live = hub.track_connection();
    if hub.is_shutting_down() {
        return;
    }

    let (mut lifecycle, outbound) = match hub.connect() {
        Ok(pair) => pair,
        Err(e) if e.is_fatal() => {
            error!(error = %e, "session registry invariant violated, shutting down");
            hub.abort(&e);
            return;
        }
        Err(e) => {
            warn!(error = %e, "failed to accept connection");
            return;
        }
    };

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(write_frames(sink, outbound));
    let shutdown = hub.shutdown_token();
    let disconnect = hub.disconnect_token();
    let mut draining = false;

    // Pings are answered by the WebSocket layer itself.
    loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => {
                draining = true;
                break;
            }
            msg = stream.next() => msg,
        };

        let result = match msg {
            Some(Ok(Message::Text(text))) => lifecycle.receive(text.as_str().as_bytes()),
            Some(Ok(Message::Binary(data))) => lifecycle.receive(&data),
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
            Some(Ok(_)) => continue,
        };

        if let Err(e) = result {
            warn!(session = %lifecycle.id(), error = %e, "dropping inbound payload");
        }
    }

    if draining {
        disconnect.cancelled().await;
    }

    lifecycle.close();
    drop(lifecycle);

    let abort = writer.abort_handle();
    if tokio::time::timeout(WRITER_GRACE, writer).await.is_err() {
        abort.abort();
    }
}

/// Copy queued frames to the socket until the outbox is dropped.
async fn write_frames<S>(mut sink: S, mut outbound: mpsc::Receiver<Frame>)
where
    S: futures_util::Sink<Message> + Unpin,
{
    while let Some(frame) = outbound.recv().await {
        if sink.send(Message::Text(frame.to_string().into())).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
}
