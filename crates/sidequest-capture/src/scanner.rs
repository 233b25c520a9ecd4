use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::host::ObserverHost;
use crate::observer::Observer;

/// Change notifications from the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Structure under observation changed
    Mutated,
    Scrolled,
    Resized,
    /// Same-document navigation
    UrlChanged,
}

/// Drives an [`Observer`] from host events.
///
/// Mutations are coalesced: the first one opens a window of
/// `CaptureConfig::debounce`, everything arriving inside it folds into a
/// single scan at its end. Scroll and resize reposition immediately.
pub struct Scanner {
    events: mpsc::Sender<HostEvent>,
    task: JoinHandle<()>,
}

impl Scanner {
    /// Scan once, announce the page, then follow events until every sender is dropped
    pub fn spawn<H: ObserverHost>(observer: Observer<H>) -> Self {
        let (events, rx) = mpsc::channel(256);
        let task = tokio::spawn(run(observer, rx));
        Self { events, task }
    }

    pub fn sender(&self) -> mpsc::Sender<HostEvent> {
        self.events.clone()
    }

    pub async fn notify(&self, event: HostEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!(?event, "Scanner stopped, dropping event");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

async fn run<H: ObserverHost>(observer: Observer<H>, mut rx: mpsc::Receiver<HostEvent>) {
    observer.scan().await;
    let response = observer.announce_page_info().await;
    if !response.ok {
        tracing::debug!(error = ?response.error, "Page info not delivered");
    }

    while let Some(event) = rx.recv().await {
        if !handle_immediate(&observer, event).await {
            continue;
        }

        let deadline = Instant::now() + observer.config().debounce;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                next = rx.recv() => match next {
                    Some(event) => {
                        handle_immediate(&observer, event).await;
                    }
                    None => break,
                },
            }
        }

        observer.scan().await;
    }

    tracing::debug!("Scanner stopped");
}

/// Handle the parts of an event that must not wait; returns whether it needs a rescan
async fn handle_immediate<H: ObserverHost>(observer: &Observer<H>, event: HostEvent) -> bool {
    match event {
        HostEvent::Mutated => true,
        HostEvent::Scrolled | HostEvent::Resized => {
            observer.reposition().await;
            false
        }
        HostEvent::UrlChanged => {
            let response = observer.announce_page_info().await;
            if !response.ok {
                tracing::debug!(error = ?response.error, "Page info not delivered");
            }
            true
        }
    }
}
