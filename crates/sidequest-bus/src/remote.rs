//! Contexts across a JSON text transport (WebSocket, pipe, ...).
//!
//! Frames are correlated by id:
//! `{"id":1,"request":{"type":"capture-latest"}}` is answered by
//! `{"id":1,"response":{"ok":true}}`. Broadcasts travel as
//! `{"broadcast":{"type":"threads-updated"}}`.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use sidequest_types::{Broadcast, Request, Response};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::context::ContextHandle;
use crate::error::{BusError, Result};
use crate::handler::Handler;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Frame {
    Request { id: u64, request: Request },
    Response { id: u64, response: Response },
    Broadcast { broadcast: Broadcast },
}

impl Frame {
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Local stand-in for a context living on the other side of a transport.
///
/// Implements [`Handler`], so it can be served with
/// [`spawn_context`](crate::spawn_context) like any in-process context.
pub struct RemoteEndpoint {
    name: String,
    outbound: mpsc::Sender<String>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Response>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    timeout: Duration,
}

impl RemoteEndpoint {
    pub fn new(name: impl Into<String>, outbound: mpsc::Sender<String>) -> Self {
        Self {
            name: name.into(),
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a request frame and wait for the matching response frame
    pub async fn request(&self, request: Request) -> Result<Response> {
        if self.is_closed() {
            return Err(BusError::ChannelClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = Frame::Request { id, request }
            .encode()
            .map_err(|e| BusError::Handler(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            // close() may have run while the frame was encoded
            if self.is_closed() {
                return Err(BusError::ChannelClosed);
            }
            pending.insert(id, tx);
        }

        if self.outbound.send(frame).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(BusError::ChannelClosed);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(BusError::ChannelClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(BusError::Timeout)
            }
        }
    }

    /// Complete a pending request. Returns false for unknown or stale ids.
    pub async fn accept_response(&self, id: u64, response: Response) -> bool {
        match self.pending.lock().await.remove(&id) {
            Some(tx) => tx.send(response).is_ok(),
            None => {
                tracing::debug!(endpoint = %self.name, id, "Dropping response for unknown request");
                false
            }
        }
    }

    /// True once the transport has ended
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail every pending request with `channel-closed`; later requests
    /// fail immediately
    pub async fn close(&self) {
        let mut pending = self.pending.lock().await;
        self.closed.store(true, Ordering::Release);
        if !pending.is_empty() {
            tracing::info!(endpoint = %self.name, pending = pending.len(), "Transport closed with requests in flight");
        }
        pending.clear();
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Push a broadcast frame to the peer
    pub async fn send_broadcast(&self, broadcast: Broadcast) -> Result<()> {
        let frame = Frame::Broadcast { broadcast }
            .encode()
            .map_err(|e| BusError::Handler(e.to_string()))?;
        self.outbound
            .send(frame)
            .await
            .map_err(|_| BusError::ChannelClosed)
    }
}

#[async_trait]
impl Handler for RemoteEndpoint {
    async fn handle(&self, request: Request) -> anyhow::Result<Response> {
        Ok(self.request(request).await?)
    }
}

/// Pump inbound frames from the peer until the transport ends.
///
/// Responses complete the endpoint's pending requests. Requests are answered
/// by `local` (or `no-active-target` without one). Broadcasts from the peer
/// are ignored. When the stream ends every pending request fails.
pub async fn serve<S>(endpoint: Arc<RemoteEndpoint>, mut inbound: S, local: Option<ContextHandle>)
where
    S: Stream<Item = String> + Unpin,
{
    while let Some(text) = inbound.next().await {
        let frame = match Frame::decode(&text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint.name, "Ignoring malformed frame: {}", e);
                continue;
            }
        };

        match frame {
            Frame::Response { id, response } => {
                endpoint.accept_response(id, response).await;
            }
            Frame::Request { id, request } => {
                let local = local.clone();
                let outbound = endpoint.outbound.clone();
                tokio::spawn(async move {
                    let response = match local {
                        Some(handle) => handle.call(request).await,
                        None => BusError::NoActiveTarget.into(),
                    };
                    match (Frame::Response { id, response }).encode() {
                        Ok(text) => {
                            let _ = outbound.send(text).await;
                        }
                        Err(e) => tracing::error!("Failed to encode response frame: {}", e),
                    }
                });
            }
            Frame::Broadcast { broadcast } => {
                tracing::trace!(?broadcast, "Ignoring inbound broadcast");
            }
        }
    }

    endpoint.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_shapes() {
        let frame = Frame::Request { id: 7, request: Request::CaptureLatest };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"id": 7, "request": {"type": "capture-latest"}})
        );

        let decoded = Frame::decode(r#"{"id":7,"response":{"ok":false,"error":"no-bubble"}}"#).unwrap();
        assert_eq!(
            decoded,
            Frame::Response { id: 7, response: Response::failure("no-bubble") }
        );

        let decoded = Frame::decode(r#"{"broadcast":{"type":"threads-updated"}}"#).unwrap();
        assert_eq!(decoded, Frame::Broadcast { broadcast: Broadcast::ThreadsUpdated });
    }

    #[tokio::test]
    async fn test_request_is_answered_by_response_frame() {
        let (tx, mut rx) = mpsc::channel(8);
        let endpoint = Arc::new(RemoteEndpoint::new("peer", tx));

        let peer = Arc::clone(&endpoint);
        let reply = tokio::spawn(async move {
            let text = rx.recv().await.unwrap();
            let Frame::Request { id, .. } = Frame::decode(&text).unwrap() else {
                panic!("expected request frame");
            };
            peer.accept_response(id, Response::ok().with_thread_id("t-1")).await
        });

        let response = endpoint.request(Request::ListThreads).await.unwrap();
        assert!(reply.await.unwrap());
        assert_eq!(response.thread_id.as_deref(), Some("t-1"));
        assert_eq!(endpoint.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_close_fails_pending_requests() {
        let (tx, _rx) = mpsc::channel(8);
        let endpoint = Arc::new(RemoteEndpoint::new("peer", tx));

        let caller = Arc::clone(&endpoint);
        let pending = tokio::spawn(async move { caller.request(Request::SidebarRestore).await });

        while endpoint.pending_count().await == 0 {
            tokio::task::yield_now().await;
        }
        endpoint.close().await;

        assert_eq!(pending.await.unwrap(), Err(BusError::ChannelClosed));
        assert!(endpoint.is_closed());
    }
}
