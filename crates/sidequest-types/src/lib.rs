pub mod provider;
pub mod thread;
pub mod content;
pub mod preferences;
pub mod envelope;

pub use provider::Provider;
pub use thread::{Locator, LocatorScheme, Message, Role, Thread, ThreadCollection, TITLE_MAX_CHARS};
pub use content::{ExtractedContent, PageInfo};
pub use preferences::{Preferences, Theme};
pub use envelope::{Broadcast, Request, Response};

/// Generate a fresh opaque identifier (128 bits of randomness).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
