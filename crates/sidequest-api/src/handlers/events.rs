use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use sidequest_types::Broadcast;
use std::convert::Infallible;
use std::future;
use std::sync::Arc;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::state::AppState;

/// Stream Coordinator broadcasts to a Display Surface using Server-Sent Events
///
/// Each event is named after the broadcast (`threads-updated`,
/// `preferences-updated`) and carries it as JSON. A subscriber that falls
/// behind gets a single `threads-updated` so it refetches.
pub async fn stream_events(State(state): State<Arc<AppState>>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.display.subscribe()).filter_map(|item| {
        let broadcast = match item {
            Ok(broadcast) => broadcast,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped = skipped, "Event subscriber lagged");
                Broadcast::ThreadsUpdated
            }
        };

        let event = match Event::default().event(event_name(broadcast)).json_data(broadcast) {
            Ok(event) => Some(Ok::<Event, Infallible>(event)),
            Err(e) => {
                tracing::error!("Failed to encode broadcast: {}", e);
                None
            }
        };
        future::ready(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn event_name(broadcast: Broadcast) -> &'static str {
    match broadcast {
        Broadcast::ThreadsUpdated => "threads-updated",
        Broadcast::PreferencesUpdated => "preferences-updated",
    }
}
