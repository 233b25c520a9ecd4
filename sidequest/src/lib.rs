//! # SideQuest - bookmarks for chat answers
//!
//! SideQuest saves question/answer exchanges from a chat page as threads and
//! takes you back to the exact answer later, even after the page has thrown
//! away and rebuilt its content.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sidequest::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let sidequest = SideQuestBuilder::new().memory().build().await?;
//!
//!     let mut page = MemoryPage::new("https://chatgpt.com/c/demo");
//!     page.push_exchange("What is 2+2?", "4");
//!     let _session = sidequest.attach_observer("tab-1", page).await;
//!
//!     let display = sidequest.display();
//!     let thread_id = display.capture_latest().await?.thread_id;
//!     println!("saved {:?}", thread_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Three contexts that share no memory, connected by a message bus:
//!
//! - **sidequest-types**: threads, locators and the wire envelopes
//! - **sidequest-persist**: the durable thread store and preference flags
//! - **sidequest-locator**: tagging and FNV-1a fingerprinting of page regions
//! - **sidequest-bus**: request/response contexts, broadcasts, remote endpoints
//! - **sidequest-capture**: the Observer embedded in the page
//! - **sidequest-coordinator**: the Coordinator that owns the store
//!
//! The HTTP/WebSocket front end lives in `sidequest-api`.
//!
//! ## Features
//!
//! - `mongodb`: MongoDB storage backend

pub use sidequest_types as types;
pub use sidequest_persist as persist;
pub use sidequest_locator as locator;
pub use sidequest_bus as bus;
pub use sidequest_capture as capture;
pub use sidequest_coordinator as coordinator;

pub use sidequest_types::{Broadcast, ExtractedContent, Locator, Message, Provider, Request, Response, Thread, ThreadCollection};
pub use sidequest_persist::PersistClient;
pub use sidequest_bus::{BusConfig, BusError, ContextHandle, Handler};
pub use sidequest_capture::{CaptureConfig, MemoryPage, Observer, ObserverHost};
pub use sidequest_coordinator::{CoordinatorService, DisplayClient};

/// High-level builder for an in-process runtime
pub mod builder;

pub use builder::{ObserverSession, SideQuest, SideQuestBuilder};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::{ObserverSession, SideQuest, SideQuestBuilder};
    pub use crate::bus::{BusConfig, BusError};
    pub use crate::capture::{CaptureConfig, HostEvent, MemoryPage, ObserverHost};
    pub use crate::coordinator::DisplayClient;
    pub use crate::types::{Broadcast, Locator, Message, Provider, Theme, Thread, ThreadCollection};
    pub use anyhow::Result;
}
