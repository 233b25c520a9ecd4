//! Capture pipeline: the Observer context embedded in a chat page.
//!
//! The [`Observer`] tags and decorates answer regions as they appear,
//! bookmarks them through the Coordinator, and jumps back to a bookmarked
//! region by resolving its locator. A [`Scanner`] feeds it debounced host
//! events.

pub mod config;
pub mod host;
pub mod strategy;
pub mod state;
pub mod extract;
pub mod page_info;
pub mod observer;
pub mod scanner;
pub mod memory;

pub use config::CaptureConfig;
pub use host::{FollowUpSink, ObserverHost};
pub use strategy::{HostCandidates, RegionStrategy, StrategySet};
pub use state::{RegionLedger, RegionState};
pub use page_info::clean_title;
pub use observer::{Observer, ScanReport, VIA_BUBBLE, VIA_SELECTION};
pub use scanner::{HostEvent, Scanner};
pub use memory::MemoryPage;
