pub mod storage;
pub mod store;
pub mod preferences;
pub mod client;
pub mod error;
pub mod builder;

pub use storage::{FileStorage, MemoryStorage, StorageBackend};
#[cfg(feature = "mongodb")]
pub use storage::MongoStorage;
pub use store::{StoreChange, ThreadStore, THREADS_KEY};
pub use preferences::PreferenceStore;
pub use client::PersistClient;
pub use error::PersistError;
pub use builder::PersistClientBuilder;
