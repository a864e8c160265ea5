//! Realtime channel - one WebSocket session per observer.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use tracing::{debug, warn};

use contracts::{PersistedReading, ReadingStore};

use crate::AppState;

/// Event name carried by every frame, kept from the dashboard protocol.
const NEW_READING_EVENT: &str = "nova_leitura";

/// Wire envelope for one realtime frame.
#[derive(Serialize)]
struct ReadingEvent<'a> {
    event: &'static str,
    data: &'a PersistedReading,
}

/// GET `/ws`
pub async fn realtime_channel<S: ReadingStore + Sync + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
) -> Response {
    ws.on_upgrade(move |socket| observer_session(socket, state))
}

/// Pump hub deliveries into the socket until either side goes away.
///
/// A failed send means a dead connection; the session ends and the
/// subscription is released, so the hub stops queueing for it. Inbound
/// frames are drained only to notice the close handshake.
async fn observer_session<S>(mut socket: WebSocket, state: AppState<S>) {
    let mut observer = state.hub.subscribe();
    let observer_id = observer.id();
    debug!(observer_id, "realtime observer connected");

    loop {
        tokio::select! {
            delivery = observer.recv() => {
                let Some(reading) = delivery else {
                    break;
                };
                let frame = ReadingEvent {
                    event: NEW_READING_EVENT,
                    data: &reading,
                };
                let payload = match serde_json::to_string(&frame) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(observer_id, error = %e, "failed to encode realtime frame");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
                    // Pings are answered by axum; client chatter is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.unsubscribe(observer_id);
    debug!(observer_id, "realtime observer disconnected");
}
