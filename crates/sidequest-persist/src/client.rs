use sidequest_types::PageInfo;
use std::sync::Arc;

use crate::builder::PersistClientBuilder;
use crate::error::Result;
use crate::preferences::PreferenceStore;
use crate::storage::StorageBackend;
use crate::store::ThreadStore;

pub const PAGE_INFO_KEY: &str = "sidequest.pageInfo";

/// Entry point to everything SideQuest keeps on disk
pub struct PersistClient {
    storage: Arc<dyn StorageBackend>,
    threads: ThreadStore,
    preferences: PreferenceStore,
}

impl PersistClient {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            threads: ThreadStore::new(Arc::clone(&storage)),
            preferences: PreferenceStore::new(Arc::clone(&storage)),
            storage,
        }
    }

    pub fn builder() -> PersistClientBuilder {
        PersistClientBuilder::new()
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    pub async fn save_page_info(&self, info: &PageInfo) -> Result<()> {
        self.storage.set(PAGE_INFO_KEY, serde_json::to_value(info)?).await
    }

    pub async fn load_page_info(&self) -> Option<PageInfo> {
        let value = self.storage.get(PAGE_INFO_KEY).await.ok().flatten()?;
        serde_json::from_value(value).ok()
    }
}
