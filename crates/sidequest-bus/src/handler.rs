use async_trait::async_trait;
use futures::FutureExt;
use sidequest_types::{Request, Response};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Callee side of a context: turns one request into one response.
///
/// Returning `Err` (or panicking) is reported to the caller as
/// `{ok:false, error}` with the error's display string.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> anyhow::Result<Response>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, request: Request) -> anyhow::Result<Response> {
        (**self).handle(request).await
    }
}

/// Run a handler, converting errors and panics into failure responses
pub async fn dispatch<H: Handler + ?Sized>(handler: &H, request: Request) -> Response {
    let kind = request.kind();

    match AssertUnwindSafe(handler.handle(request)).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::debug!(request = kind, error = %e, "Handler returned error");
            Response::failure(e)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(request = kind, "Handler panicked: {}", message);
            Response::failure(message)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
