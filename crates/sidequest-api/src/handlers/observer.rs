//! WebSocket bridge for observers running in a browser page
//!
//! A page connects to `/observer?id=<tab>` and exchanges [`Frame`]s. The
//! connection becomes an ordinary context on the bus: the Coordinator's
//! requests are forwarded down the socket, the page's requests (bookmark,
//! page info) are answered by the Coordinator, and broadcasts are pushed
//! as they happen.
//!
//! [`Frame`]: sidequest_bus::Frame

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use sidequest_bus::{serve, spawn_context, RemoteEndpoint};
use sidequest_types::Broadcast;
use std::future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ObserverQuery {
    /// Stable id for the tab; a fresh one is generated when absent
    pub id: Option<String>,
}

pub async fn observer_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObserverQuery>,
) -> Response {
    let id = query.id.unwrap_or_else(sidequest_types::new_id);
    info!(observer = %id, "Observer connection request");

    ws.on_upgrade(move |socket| handle_socket(socket, state, id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, id: String) {
    let (mut sender, receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(state.bus.channel_capacity);

    let name = format!("observer:{id}");
    let endpoint = Arc::new(RemoteEndpoint::new(name.clone(), outbound_tx).with_timeout(state.bus.request_timeout));
    let context = spawn_context(name, Arc::clone(&endpoint), &state.bus);
    state.service.observers().attach(id.clone(), context.handle()).await;
    info!(observer = %id, "Observer connected");

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = sender.send(Message::Text(text)).await {
                warn!(observer = %writer_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    let forwarder = tokio::spawn(forward_broadcasts(state.display.subscribe(), Arc::clone(&endpoint)));

    let inbound = receiver
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(text),
                _ => None,
            })
        })
        .boxed();

    serve(Arc::clone(&endpoint), inbound, Some(state.service.handle())).await;

    state.service.observers().detach(&id, &context.handle()).await;
    context.shutdown();
    forwarder.abort();
    writer.abort();
    info!(observer = %id, "Observer disconnected");
}

async fn forward_broadcasts(mut broadcasts: broadcast::Receiver<Broadcast>, endpoint: Arc<RemoteEndpoint>) {
    loop {
        let message = match broadcasts.recv().await {
            Ok(message) => message,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped = skipped, "Observer broadcast forwarder lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if endpoint.send_broadcast(message).await.is_err() {
            break;
        }
    }
}
