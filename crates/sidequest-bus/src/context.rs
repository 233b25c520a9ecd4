use sidequest_types::{Request, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::BusConfig;
use crate::error::{BusError, Result};
use crate::handler::{dispatch, Handler};

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Caller side of a context: the only way to reach it.
///
/// Cloning is cheap; every clone talks to the same context.
#[derive(Clone)]
pub struct ContextHandle {
    name: Arc<str>,
    tx: mpsc::Sender<Envelope>,
    timeout: Duration,
}

impl ContextHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the context has stopped accepting requests
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// True when both handles reach the same running context
    pub fn same_context(&self, other: &ContextHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Send a request and wait for its response.
    ///
    /// Never retries. A stopped context is `NoActiveTarget`, a dropped reply
    /// is `ChannelClosed`, and the whole exchange is bounded by the
    /// configured request timeout.
    pub async fn try_call(&self, request: Request) -> Result<Response> {
        let kind = request.kind();
        let (reply, response) = oneshot::channel();

        let exchange = async {
            self.tx
                .send(Envelope { request, reply })
                .await
                .map_err(|_| BusError::NoActiveTarget)?;
            response.await.map_err(|_| BusError::ChannelClosed)
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::debug!(context = %self.name, request = kind, error = %e, "Request failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(
                    context = %self.name,
                    request = kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Request timed out"
                );
                Err(BusError::Timeout)
            }
        }
    }

    /// Like [`try_call`](Self::try_call) but folds bus failures into the response
    pub async fn call(&self, request: Request) -> Response {
        self.try_call(request).await.unwrap_or_else(Response::from)
    }
}

impl std::fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHandle")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A running context: its inbound loop plus a handle to reach it
pub struct Context {
    handle: ContextHandle,
    task: JoinHandle<()>,
}

impl Context {
    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Stop accepting requests. In-flight requests still complete.
    pub fn shutdown(self) {
        tracing::debug!(context = %self.handle.name, "Shutting down context");
        self.task.abort();
    }
}

/// Start a context serving `handler`.
///
/// Each inbound request runs on its own task so a handler may itself call
/// other contexts (including the one that called it) without deadlocking.
/// Handlers that mutate shared state are responsible for serializing it.
pub fn spawn_context<H>(name: impl Into<String>, handler: Arc<H>, config: &BusConfig) -> Context
where
    H: Handler + ?Sized,
{
    let name: Arc<str> = Arc::from(name.into());
    let (tx, mut rx) = mpsc::channel::<Envelope>(config.channel_capacity);

    let loop_name = Arc::clone(&name);
    let task = tokio::spawn(async move {
        tracing::debug!(context = %loop_name, "Context started");
        while let Some(Envelope { request, reply }) = rx.recv().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let response = dispatch(handler.as_ref(), request).await;
                // Err means the caller gave up (timeout) and dropped its receiver
                let _ = reply.send(response);
            });
        }
        tracing::debug!(context = %loop_name, "Context stopped");
    });

    Context {
        handle: ContextHandle {
            name,
            tx,
            timeout: config.request_timeout,
        },
        task,
    }
}
