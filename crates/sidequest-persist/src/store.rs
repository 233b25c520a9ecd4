use chrono::Utc;
use sidequest_types::{new_id, ExtractedContent, Message, Thread, ThreadCollection, TITLE_MAX_CHARS};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::error::Result;
use crate::storage::StorageBackend;

/// Storage key holding the serialized thread collection
pub const THREADS_KEY: &str = "sidequest.threads";

const DEFAULT_TITLE: &str = "Thread";

/// Change notification emitted after every successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Bookmarked { thread_id: String },
    MessageAppended { thread_id: String },
    Renamed { thread_id: String },
    Deleted { thread_id: String },
    Cleared,
}

/// Durable collection of bookmarked threads.
///
/// Every mutation is a read-modify-write of the whole collection performed
/// under a single write lock, so concurrent callers never lose an update.
pub struct ThreadStore {
    storage: Arc<dyn StorageBackend>,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<StoreChange>,
}

impl ThreadStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            storage,
            write_lock: Mutex::new(()),
            changes,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Current snapshot; empty when storage is uninitialized or unreadable
    pub async fn list(&self) -> ThreadCollection {
        match self.load().await {
            Ok(collection) => collection,
            Err(e) => {
                tracing::warn!("Failed to read thread collection: {}", e);
                ThreadCollection::new()
            }
        }
    }

    pub async fn get(&self, thread_id: &str) -> Option<Thread> {
        self.list().await.threads.remove(thread_id)
    }

    /// Create a thread from extracted content and return its id.
    ///
    /// Returns `None` without touching storage when both question and answer
    /// are empty.
    pub async fn bookmark(&self, content: ExtractedContent) -> Result<Option<String>> {
        if content.is_empty() {
            tracing::debug!("Ignoring bookmark without question or answer");
            return Ok(None);
        }

        let thread = new_thread(content);
        let thread_id = thread.id.clone();

        let id = self
            .transact(move |collection| {
                let change = StoreChange::Bookmarked { thread_id: thread_id.clone() };
                collection.prepend(thread);
                Some((thread_id, change))
            })
            .await?;

        if let Some(id) = &id {
            tracing::info!(thread_id = %id, "Bookmarked thread");
        }
        Ok(id)
    }

    /// Append a message; unknown ids are a silent no-op. Returns whether it applied.
    pub async fn append_message(&self, thread_id: &str, message: Message) -> Result<bool> {
        let applied = self
            .transact(|collection| {
                let thread = collection.get_mut(thread_id)?;
                thread.messages.push(message);
                thread.updated_at = Utc::now().max(thread.updated_at);
                Some((
                    (),
                    StoreChange::MessageAppended { thread_id: thread_id.to_string() },
                ))
            })
            .await?;
        Ok(applied.is_some())
    }

    /// Replace a thread's title; blank titles and unknown ids are ignored
    pub async fn rename(&self, thread_id: &str, title: &str) -> Result<bool> {
        let title = clamp_title(title.trim());
        if title.is_empty() {
            return Ok(false);
        }

        let applied = self
            .transact(|collection| {
                let thread = collection.get_mut(thread_id)?;
                thread.title = title;
                Some(((), StoreChange::Renamed { thread_id: thread_id.to_string() }))
            })
            .await?;
        Ok(applied.is_some())
    }

    pub async fn delete(&self, thread_id: &str) -> Result<bool> {
        let applied = self
            .transact(|collection| {
                collection.remove(thread_id)?;
                Some(((), StoreChange::Deleted { thread_id: thread_id.to_string() }))
            })
            .await?;
        Ok(applied.is_some())
    }

    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save(&ThreadCollection::new()).await?;
        self.notify(StoreChange::Cleared);
        Ok(())
    }

    /// Load, apply `mutate`, and persist if it reported a change
    async fn transact<T, F>(&self, mutate: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut ThreadCollection) -> Option<(T, StoreChange)>,
    {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load().await?;

        let Some((value, change)) = mutate(&mut collection) else {
            return Ok(None);
        };

        self.save(&collection).await?;
        self.notify(change);
        Ok(Some(value))
    }

    async fn load(&self) -> Result<ThreadCollection> {
        let Some(raw) = self.storage.get(THREADS_KEY).await? else {
            return Ok(ThreadCollection::new());
        };

        let mut collection = match serde_json::from_value::<ThreadCollection>(raw) {
            Ok(collection) => collection,
            Err(e) => {
                tracing::warn!("Stored thread collection is malformed, resetting: {}", e);
                return Ok(ThreadCollection::new());
            }
        };

        if !collection.is_consistent() {
            let fixes = collection.repair();
            tracing::warn!(fixes, "Repaired thread ordering");
        }
        Ok(collection)
    }

    async fn save(&self, collection: &ThreadCollection) -> Result<()> {
        let value = serde_json::to_value(collection)?;
        self.storage.set(THREADS_KEY, value).await
    }

    fn notify(&self, change: StoreChange) {
        // Err only means nobody is listening
        let _ = self.changes.send(change);
    }
}

fn new_thread(content: ExtractedContent) -> Thread {
    let now = Utc::now();
    let question = content.question.trim();
    let answer = content.answer.trim();

    let title = if question.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        clamp_title(question)
    };

    let mut messages = Vec::with_capacity(2);
    if !question.is_empty() {
        messages.push(Message { timestamp: now, ..Message::user(question) });
    }
    if !answer.is_empty() {
        messages.push(Message { timestamp: now, ..Message::assistant(answer) });
    }

    Thread {
        id: new_id(),
        title,
        provider: content.provider,
        provider_message_id: content.provider_message_id,
        locator: content.locator,
        created_at: now,
        updated_at: now,
        messages,
    }
}

fn clamp_title(title: &str) -> String {
    title.chars().take(TITLE_MAX_CHARS).collect()
}
