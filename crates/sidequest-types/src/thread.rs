use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::provider::Provider;

/// Maximum length of a thread title, in characters
pub const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a thread. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocatorScheme {
    #[default]
    Dataset,
}

/// Best-effort pointer into a live content tree.
///
/// `stable_id` is the tag written onto the region when it was first observed;
/// `fingerprint` is the hash of its normalized text, used once the tagged node
/// has been rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    #[serde(default)]
    pub scheme: LocatorScheme,
    pub stable_id: String,
    pub fingerprint: String,
}

impl Locator {
    pub fn new(stable_id: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            scheme: LocatorScheme::Dataset,
            stable_id: stable_id.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// A saved question/answer exchange plus its follow-up messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Thread {
    /// Content of the first assistant message, if any
    pub fn answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// Every saved thread, keyed by id, plus display order (most recently bookmarked first)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ThreadCollection {
    #[serde(default)]
    pub threads: HashMap<String, Thread>,
    #[serde(default)]
    pub order: Vec<String>,
}

impl ThreadCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Thread> {
        self.threads.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Thread> {
        self.threads.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.threads.contains_key(id)
    }

    /// Threads in display order
    pub fn ordered(&self) -> impl Iterator<Item = &Thread> {
        self.order.iter().filter_map(|id| self.threads.get(id))
    }

    /// Insert a thread at the front of the display order.
    pub fn prepend(&mut self, thread: Thread) {
        self.order.retain(|id| id != &thread.id);
        self.order.insert(0, thread.id.clone());
        self.threads.insert(thread.id.clone(), thread);
    }

    pub fn remove(&mut self, id: &str) -> Option<Thread> {
        let removed = self.threads.remove(id);
        if removed.is_some() {
            self.order.retain(|other| other != id);
        }
        removed
    }

    /// `order` holds exactly the keys of `threads`, without duplicates.
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.threads.len() {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.order.len());
        self.order
            .iter()
            .all(|id| self.threads.contains_key(id) && seen.insert(id.as_str()))
    }

    /// Restore the ordering invariant after loading a damaged collection.
    ///
    /// Dangling and duplicate ids are dropped; threads missing from `order`
    /// are appended newest first. Returns the number of fixes applied.
    pub fn repair(&mut self) -> usize {
        let mut fixes = 0;
        let mut seen = HashSet::with_capacity(self.order.len());
        let threads = &self.threads;

        self.order.retain(|id| {
            let keep = threads.contains_key(id) && seen.insert(id.clone());
            if !keep {
                fixes += 1;
            }
            keep
        });

        let mut missing: Vec<&Thread> = self
            .threads
            .values()
            .filter(|t| !seen.contains(&t.id))
            .collect();
        missing.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        fixes += missing.len();
        let missing: Vec<String> = missing.into_iter().map(|t| t.id.clone()).collect();
        self.order.extend(missing);

        fixes
    }
}
