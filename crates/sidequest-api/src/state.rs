use anyhow::Context as _;
use sidequest_bus::BusConfig;
use sidequest_coordinator::{CoordinatorService, DisplayClient};
use sidequest_persist::PersistClient;
use std::sync::Arc;

use crate::config::{Config, StorageKind};

/// Shared application state passed to all handlers
///
/// The Coordinator runs as its own context; handlers talk to it through
/// `display` exactly like any other Display Surface.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<CoordinatorService>,
    pub display: DisplayClient,
    pub bus: BusConfig,
}

impl AppState {
    pub fn new(config: Config, persist: PersistClient) -> Self {
        let bus = config.bus_config();
        let service = CoordinatorService::start(Arc::new(persist), &bus);
        let display = service.display();

        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            display,
            bus,
        }
    }

    /// Open the configured storage and start the Coordinator
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let builder = PersistClient::builder();
        let builder = match config.storage.backend {
            StorageKind::Memory => builder.memory(),
            StorageKind::File => builder.file(&config.storage.path),
            StorageKind::Mongodb => builder.mongodb(&config.mongodb_uri, &config.storage.database),
        };
        let persist = builder
            .build()
            .await
            .with_context(|| format!("Failed to open {:?} storage", config.storage.backend))?;

        Ok(Self::new(config, persist))
    }
}
