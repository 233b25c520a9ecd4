use std::path::PathBuf;
use std::sync::Arc;

use crate::client::PersistClient;
use crate::error::{PersistError, Result};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

enum Backend {
    Memory,
    File(PathBuf),
    #[cfg_attr(not(feature = "mongodb"), allow(dead_code))]
    Mongo { uri: String, database: String },
    Custom(Arc<dyn StorageBackend>),
}

pub struct PersistClientBuilder {
    backend: Option<Backend>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self { backend: None }
    }

    /// Keep everything in memory (lost on restart)
    pub fn memory(mut self) -> Self {
        self.backend = Some(Backend::Memory);
        self
    }

    /// Persist to a JSON file at `path`
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.backend = Some(Backend::File(path.into()));
        self
    }

    /// Persist to MongoDB (requires the `mongodb` feature)
    pub fn mongodb(mut self, uri: impl Into<String>, database: impl Into<String>) -> Self {
        self.backend = Some(Backend::Mongo {
            uri: uri.into(),
            database: database.into(),
        });
        self
    }

    pub fn storage(mut self, storage: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(Backend::Custom(storage));
        self
    }

    pub async fn build(self) -> Result<PersistClient> {
        let backend = self
            .backend
            .ok_or_else(|| PersistError::Internal("a storage backend is required".to_string()))?;

        let storage: Arc<dyn StorageBackend> = match backend {
            Backend::Memory => Arc::new(MemoryStorage::new()),
            Backend::File(path) => Arc::new(FileStorage::open(path).await?),
            Backend::Custom(storage) => storage,
            #[cfg(feature = "mongodb")]
            Backend::Mongo { uri, database } => {
                Arc::new(crate::storage::MongoStorage::connect(&uri, &database).await?)
            }
            #[cfg(not(feature = "mongodb"))]
            Backend::Mongo { .. } => {
                return Err(PersistError::Internal(
                    "MongoDB storage requires the `mongodb` feature".to_string(),
                ))
            }
        };

        Ok(PersistClient::new(storage))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
