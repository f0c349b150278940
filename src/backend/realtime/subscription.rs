/**
 * Real-time Subscription Handler
 *
 * This module implements the WebSocket endpoint (`GET /ws`) through which
 * clients receive `ChatEvent`s and send typing indicators.
 *
 * # Authentication
 *
 * The upgrade request carries a JWT, either as `?token=` or as an
 * `Authorization: Bearer` header. A request without a valid token is still
 * upgraded, then closed immediately with code 1008 and no event.
 *
 * # Connection Management
 *
 * Each socket is split into a reader (this task) and a writer task. The
 * writer drains the connection's registry channel plus a local control
 * channel used for pongs. A close frame, a transport error, or the end of
 * the stream closes the session, which releases the registry entry.
 */

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::backend::middleware::authenticate_connection;
use crate::backend::realtime::broadcast::Notifier;
use crate::backend::realtime::session::Session;
use crate::backend::server::state::AppState;
use crate::shared::messaging::UserId;

/// Policy violation
const CLOSE_UNAUTHORIZED: u16 = 1008;

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade (GET /ws)
pub async fn handle_ws_upgrade(
    State(app_state): State<AppState>,
    Query(params): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = authenticate_connection(&app_state.jwt, &headers, params.token.as_deref());
    let notifier = app_state.notifier.clone();

    ws.on_upgrade(move |socket| run_connection(socket, notifier, identity))
}

/// Drive one upgraded socket until it closes
pub async fn run_connection(mut socket: WebSocket, notifier: Notifier, identity: Option<UserId>) {
    let mut session = Session::new(notifier);

    let Some(frames) = session.authenticate(identity) else {
        let close_frame = CloseFrame {
            code: CLOSE_UNAUTHORIZED,
            reason: "Unauthorized".into(),
        };
        let _ = socket.send(Message::Close(Some(close_frame))).await;
        return;
    };

    let user_id = session.user_id();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();
    let writer_handle = tokio::spawn(writer_task(ws_sender, frames, control_rx));

    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    session.handle_frame(text.as_str()).await;
                }
                Message::Ping(data) => {
                    let _ = control_tx.send(Message::Pong(data));
                }
                Message::Pong(_) => {}
                Message::Binary(_) => {
                    tracing::debug!(user_id = ?user_id, "Ignoring binary frame");
                }
                Message::Close(frame) => {
                    tracing::info!(user_id = ?user_id, reason = ?frame, "Client initiated close");
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(user_id = ?user_id, error = %e, "WebSocket receive error");
                break;
            }
            None => {
                tracing::info!(user_id = ?user_id, "WebSocket stream ended");
                break;
            }
        }
    }

    session.close();
    writer_handle.abort();
}

/// Forward queued frames to the socket until either side goes away
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut frames: mpsc::UnboundedReceiver<String>,
    mut control: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            frame = frames.recv() => match frame {
                Some(text) => Message::Text(text.into()),
                None => break,
            },
            Some(message) = control.recv() => message,
        };

        if sink.send(message).await.is_err() {
            break;
        }
    }

    let _ = sink.close().await;
}
