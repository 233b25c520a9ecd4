mod file;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStorage;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Trait for durable key/value storage
///
/// The namespace is shared: the thread store, preference flags and any
/// other component keep independent keys side by side.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete `key`; absent keys are ignored
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently stored
    async fn keys(&self) -> Result<Vec<String>>;
}
