use sidequest_types::Broadcast;
use tokio::sync::broadcast;

/// Fire-and-forget fan-out to every subscribed Display Surface
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Broadcast>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to current subscribers; returns how many received it
    pub fn send(&self, message: Broadcast) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!(?message, "Broadcast dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
