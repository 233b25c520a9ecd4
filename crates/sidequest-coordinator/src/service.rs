use sidequest_bus::{spawn_context, Broadcaster, BusConfig, Context, ContextHandle, ObserverRegistry};
use sidequest_persist::PersistClient;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::coordinator::Coordinator;
use crate::display::DisplayClient;
use crate::relay::spawn_relay;

pub const COORDINATOR_CONTEXT: &str = "coordinator";

/// A running Coordinator context plus its store-to-broadcast relay
pub struct CoordinatorService {
    context: Context,
    relay: JoinHandle<()>,
    persist: Arc<PersistClient>,
    observers: Arc<ObserverRegistry>,
    broadcaster: Broadcaster,
}

impl CoordinatorService {
    pub fn spawn(coordinator: Coordinator, config: &BusConfig) -> Self {
        let persist = Arc::clone(coordinator.persist());
        let observers = Arc::clone(coordinator.observers());
        let broadcaster = coordinator.broadcaster().clone();

        let relay = spawn_relay(persist.threads().subscribe(), broadcaster.clone());
        let context = spawn_context(COORDINATOR_CONTEXT, Arc::new(coordinator), config);
        tracing::info!("Coordinator started");

        Self {
            context,
            relay,
            persist,
            observers,
            broadcaster,
        }
    }

    /// Wire a fresh Coordinator over `persist` and start it
    pub fn start(persist: Arc<PersistClient>, config: &BusConfig) -> Self {
        let coordinator = Coordinator::new(
            persist,
            Arc::new(ObserverRegistry::new()),
            Broadcaster::new(config.broadcast_capacity),
        );
        Self::spawn(coordinator, config)
    }

    pub fn handle(&self) -> ContextHandle {
        self.context.handle()
    }

    pub fn display(&self) -> DisplayClient {
        DisplayClient::new(self.handle(), self.broadcaster.clone())
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn persist(&self) -> &Arc<PersistClient> {
        &self.persist
    }

    pub fn shutdown(self) {
        self.relay.abort();
        self.context.shutdown();
    }
}
