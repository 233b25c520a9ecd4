//! High-level builder wiring every context into one in-process runtime

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::bus::{spawn_context, BusConfig, Context, ContextHandle, ObserverRegistry};
use crate::capture::{CaptureConfig, HostEvent, Observer, ObserverHost, Scanner};
use crate::coordinator::{CoordinatorService, DisplayClient};
use crate::persist::{PersistClient, StorageBackend};
use crate::types::Broadcast;

enum Storage {
    Memory,
    File(PathBuf),
    Mongo { uri: String, database: String },
    Custom(Arc<dyn StorageBackend>),
}

/// Builder for a [`SideQuest`] runtime
///
/// # Example
///
/// ```rust,no_run
/// use sidequest::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let sidequest = SideQuestBuilder::new()
///     .file("data/sidequest.json")
///     .request_timeout(std::time::Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SideQuestBuilder {
    storage: Option<Storage>,
    bus: BusConfig,
    capture: CaptureConfig,
}

impl Default for SideQuestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SideQuestBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            bus: BusConfig::default(),
            capture: CaptureConfig::default(),
        }
    }

    /// Keep threads in memory only
    pub fn memory(mut self) -> Self {
        self.storage = Some(Storage::Memory);
        self
    }

    /// Persist threads and preferences to a JSON file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = Some(Storage::File(path.into()));
        self
    }

    /// Persist to MongoDB (needs the `mongodb` feature)
    pub fn mongodb(mut self, uri: impl Into<String>, database: impl Into<String>) -> Self {
        self.storage = Some(Storage::Mongo {
            uri: uri.into(),
            database: database.into(),
        });
        self
    }

    pub fn storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(Storage::Custom(storage));
        self
    }

    pub fn bus_config(mut self, config: BusConfig) -> Self {
        self.bus = config;
        self
    }

    /// Bound on every request/response exchange (default: 5s)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.bus.request_timeout = timeout;
        self
    }

    pub fn capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture = config;
        self
    }

    /// Open storage and start the Coordinator
    ///
    /// # Errors
    ///
    /// Returns an error if no storage was chosen or it cannot be opened.
    pub async fn build(self) -> Result<SideQuest> {
        let storage = self
            .storage
            .context("Storage is required. Call .memory(), .file(path) or .mongodb(uri, db)")?;

        let builder = PersistClient::builder();
        let builder = match storage {
            Storage::Memory => builder.memory(),
            Storage::File(path) => builder.file(path),
            Storage::Mongo { uri, database } => builder.mongodb(uri, database),
            Storage::Custom(storage) => builder.storage(storage),
        };
        let persist = builder
            .build()
            .await
            .context("Failed to open storage")?;

        let coordinator = CoordinatorService::start(Arc::new(persist), &self.bus);

        Ok(SideQuest {
            coordinator,
            bus: self.bus,
            capture: self.capture,
        })
    }
}

/// A running SideQuest: the Coordinator plus any attached Observers
pub struct SideQuest {
    coordinator: CoordinatorService,
    bus: BusConfig,
    capture: CaptureConfig,
}

impl SideQuest {
    pub fn builder() -> SideQuestBuilder {
        SideQuestBuilder::new()
    }

    /// Display Surface client
    pub fn display(&self) -> DisplayClient {
        self.coordinator.display()
    }

    pub fn coordinator(&self) -> ContextHandle {
        self.coordinator.handle()
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        self.coordinator.observers()
    }

    pub fn persist(&self) -> &Arc<PersistClient> {
        self.coordinator.persist()
    }

    pub fn bus_config(&self) -> &BusConfig {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.coordinator.broadcaster().subscribe()
    }

    /// Observer over `host`, configured for this runtime but not yet attached
    pub fn observer_for<H: ObserverHost>(&self, host: H) -> Observer<H> {
        Observer::new(host, self.coordinator.handle()).with_config(self.capture.clone())
    }

    /// Start an observer context for `host`, make it the active one, and
    /// begin scanning
    pub async fn attach_observer<H: ObserverHost>(&self, id: impl Into<String>, host: H) -> ObserverSession<H> {
        let observer = self.observer_for(host);
        self.attach(id, observer).await
    }

    /// Attach a pre-configured observer
    pub async fn attach<H: ObserverHost>(&self, id: impl Into<String>, observer: Observer<H>) -> ObserverSession<H> {
        let id = id.into();
        let context = spawn_context(format!("observer:{id}"), Arc::new(observer.clone()), &self.bus);
        self.observers().attach(id.clone(), context.handle()).await;
        let scanner = Scanner::spawn(observer.clone());

        ObserverSession {
            id,
            observer,
            context,
            scanner,
        }
    }

    /// Stop an observer; requests meant for it now get `no-active-target`
    pub async fn detach<H: ObserverHost>(&self, session: ObserverSession<H>) {
        self.observers().detach(&session.id, &session.context.handle()).await;
        session.scanner.stop();
        session.context.shutdown();
    }

    pub fn shutdown(self) {
        tracing::info!("Shutting down SideQuest");
        self.coordinator.shutdown();
    }
}

/// An attached observer with its context and scanner
pub struct ObserverSession<H: ObserverHost> {
    id: String,
    observer: Observer<H>,
    context: Context,
    scanner: Scanner,
}

impl<H: ObserverHost> ObserverSession<H> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn observer(&self) -> &Observer<H> {
        &self.observer
    }

    pub fn handle(&self) -> ContextHandle {
        self.context.handle()
    }

    /// Forward a host event to the scanner
    pub async fn notify(&self, event: HostEvent) {
        self.scanner.notify(event).await;
    }

    pub fn events(&self) -> mpsc::Sender<HostEvent> {
        self.scanner.sender()
    }
}
