use sidequest_types::{Request, Response};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::context::ContextHandle;
use crate::error::{BusError, Result};

#[derive(Default)]
struct Targets {
    handles: HashMap<String, ContextHandle>,
    active: Option<String>,
}

/// Observers the Coordinator can forward to, with at most one active.
///
/// The most recently attached Observer becomes active. Detaching the active
/// one leaves no active target until another is attached or activated.
#[derive(Default)]
pub struct ObserverRegistry {
    targets: RwLock<Targets>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, id: impl Into<String>, handle: ContextHandle) {
        let id = id.into();
        let mut targets = self.targets.write().await;
        if targets.handles.insert(id.clone(), handle).is_some() {
            tracing::debug!(observer = %id, "Replaced observer");
        }
        tracing::info!(observer = %id, "Observer attached");
        targets.active = Some(id);
    }

    /// Detach `handle` from `id`.
    ///
    /// A reloaded page reattaches under the same id before the old
    /// connection is torn down, so only the handle that is still registered
    /// is removed. Returns false when `id` now belongs to another context.
    pub async fn detach(&self, id: &str, handle: &ContextHandle) -> bool {
        let mut targets = self.targets.write().await;
        match targets.handles.get(id) {
            Some(current) if current.same_context(handle) => {}
            Some(_) => {
                tracing::debug!(observer = %id, "Ignoring detach of a replaced observer");
                return false;
            }
            None => return false,
        }

        targets.handles.remove(id);
        if targets.active.as_deref() == Some(id) {
            targets.active = None;
        }
        tracing::info!(observer = %id, "Observer detached");
        true
    }

    /// Make a known observer the active one
    pub async fn activate(&self, id: &str) -> bool {
        let mut targets = self.targets.write().await;
        if !targets.handles.contains_key(id) {
            return false;
        }
        targets.active = Some(id.to_string());
        true
    }

    /// Handle of the active observer, if it is still running
    pub async fn active(&self) -> Option<ContextHandle> {
        let targets = self.targets.read().await;
        let id = targets.active.as_ref()?;
        targets
            .handles
            .get(id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    pub async fn active_id(&self) -> Option<String> {
        self.targets.read().await.active.clone()
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.targets.read().await.handles.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn try_call_active(&self, request: Request) -> Result<Response> {
        let handle = self.active().await.ok_or(BusError::NoActiveTarget)?;
        handle.try_call(request).await
    }

    /// Forward to the active observer, or fail with `no-active-target`
    pub async fn call_active(&self, request: Request) -> Response {
        self.try_call_active(request)
            .await
            .unwrap_or_else(Response::from)
    }
}
