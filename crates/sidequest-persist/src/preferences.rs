use serde::de::DeserializeOwned;
use serde_json::Value;
use sidequest_types::{Preferences, Theme};
use std::sync::Arc;

use crate::error::Result;
use crate::storage::StorageBackend;

pub const SIDEBAR_MINIMIZED_KEY: &str = "sidequest.sidebarMinimized";
pub const THEME_KEY: &str = "sidequest.theme";
pub const PANEL_WIDTH_KEY: &str = "sidequest.panelWidth";

/// UI preference flags, one durable key each
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Arc<dyn StorageBackend>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Read every flag, falling back to defaults for missing or unreadable values
    pub async fn load(&self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            sidebar_minimized: self
                .read(SIDEBAR_MINIMIZED_KEY)
                .await
                .unwrap_or(defaults.sidebar_minimized),
            theme: self.read(THEME_KEY).await.unwrap_or(defaults.theme),
            panel_width: self
                .read(PANEL_WIDTH_KEY)
                .await
                .map(Preferences::clamp_panel_width)
                .unwrap_or(defaults.panel_width),
        }
    }

    pub async fn set_sidebar_minimized(&self, minimized: bool) -> Result<()> {
        self.storage.set(SIDEBAR_MINIMIZED_KEY, Value::Bool(minimized)).await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.storage.set(THEME_KEY, serde_json::to_value(theme)?).await
    }

    /// Store the panel width, clamped to the supported range. Returns the stored width.
    pub async fn set_panel_width(&self, width: u32) -> Result<u32> {
        let width = Preferences::clamp_panel_width(width);
        self.storage.set(PANEL_WIDTH_KEY, Value::from(width)).await?;
        Ok(width)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.storage.get(key).await {
            Ok(Some(value)) => serde_json::from_value(value)
                .map_err(|e| tracing::warn!(key, "Ignoring malformed preference: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, "Failed to read preference: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(prefs.load().await, Preferences::default());
    }

    #[tokio::test]
    async fn test_flags_are_independent_keys() {
        let storage = Arc::new(MemoryStorage::new());
        let prefs = PreferenceStore::new(storage.clone());

        prefs.set_sidebar_minimized(true).await.unwrap();
        prefs.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(prefs.set_panel_width(5000).await.unwrap(), 720);

        let loaded = prefs.load().await;
        assert!(loaded.sidebar_minimized);
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.panel_width, 720);
        assert_eq!(
            storage.keys().await.unwrap(),
            vec![PANEL_WIDTH_KEY, SIDEBAR_MINIMIZED_KEY, THEME_KEY]
        );
    }

    #[tokio::test]
    async fn test_malformed_flag_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, Value::from("neon")).await.unwrap();

        let prefs = PreferenceStore::new(storage);
        assert_eq!(prefs.load().await.theme, Theme::System);
    }
}
