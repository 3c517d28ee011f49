//! Live-session endpoint: a persistent client connection bound to a
//! thread's notification topic, pushing notifications and periodic
//! keepalives.
//!
//! Built on `axum`'s websocket extractor, shaped after SpacetimeDB's
//! `util::websocket` upgrade/ping/message-loop convention
//! (`examples/clockworklabs-SpacetimeDB/crates/client-api/src/util/websocket.rs`),
//! narrowed to the single request/response/keepalive cycle this protocol needs.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::bus::{thread_topic, BusClient};

#[derive(Clone)]
pub struct SessionState {
    pub bus: BusClient,
    pub keepalive_interval: Duration,
}

pub fn router(state: SessionState) -> Router {
    Router::new().route("/live-session", get(upgrade_handler)).with_state(Arc::new(state))
}

async fn upgrade_handler(ws: WebSocketUpgrade, State(state): State<Arc<SessionState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

/// The first frame a client must send.
#[derive(Debug, Deserialize)]
struct OpenFrame {
    client_id: Option<String>,
    thread_id: Option<i64>,
}

#[instrument(skip(socket, state))]
async fn handle_session(mut socket: WebSocket, state: Arc<SessionState>) {
    let open = match socket.recv().await {
        Some(Ok(Message::Text(text))) => serde_json::from_str::<OpenFrame>(&text).ok(),
        _ => None,
    };

    let (client_id, thread_id) = match open.and_then(|f| Some((f.client_id?, f.thread_id?))) {
        Some(pair) => pair,
        None => {
            let _ = socket
                .send(Message::Close(Some(axum::extract::ws::CloseFrame {
                    code: 1008, // RFC 6455 policy violation
                    reason: "Client ID or Thread ID not provided".into(),
                })))
                .await;
            return;
        }
    };

    let topic = thread_topic(thread_id);
    let mut subscription = match state.bus.subscribe(topic.clone(), client_id.clone()).await {
        Ok(sub) => sub,
        Err(err) => {
            warn!(%err, topic, client_id, "failed to subscribe live session");
            let _ = socket
                .send(Message::Close(Some(axum::extract::ws::CloseFrame {
                    code: 1011, // RFC 6455 internal error
                    reason: err.to_string().into(),
                })))
                .await;
            return;
        }
    };

    info!(topic, client_id, "live session subscribed");

    let mut keepalive = tokio::time::interval(state.keepalive_interval);
    keepalive.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!(topic, client_id, "subscription closed, ending live session");
                    break;
                };
                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(%err, "failed to serialize notification event");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            _ = keepalive.tick() => {
                if socket.send(Message::Text("ping".into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    let _ = state.bus.unsubscribe(topic, client_id).await;
}
