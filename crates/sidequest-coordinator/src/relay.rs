use sidequest_bus::Broadcaster;
use sidequest_persist::StoreChange;
use sidequest_types::Broadcast;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Turn every store change into a `threads-updated` broadcast
pub fn spawn_relay(
    mut changes: broadcast::Receiver<StoreChange>,
    broadcaster: Broadcaster,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    tracing::trace!(?change, "Relaying store change");
                    broadcaster.send(Broadcast::ThreadsUpdated);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Relay lagged behind store changes");
                    broadcaster.send(Broadcast::ThreadsUpdated);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
