pub mod coordinator;
pub mod display;
pub mod relay;
pub mod service;

pub use coordinator::Coordinator;
pub use display::DisplayClient;
pub use relay::spawn_relay;
pub use service::{CoordinatorService, COORDINATOR_CONTEXT};
