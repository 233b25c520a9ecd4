//! Cross-context message bus.
//!
//! Contexts share no memory. Each one is a [`Handler`] served behind a
//! [`ContextHandle`]; callers exchange serializable [`Request`]/[`Response`]
//! envelopes with it, and the Coordinator fans [`Broadcast`]s out through a
//! [`Broadcaster`]. Every call resolves: handler errors, panics, stopped
//! contexts and timeouts all come back as `{ok:false, error}`.
//!
//! [`Request`]: sidequest_types::Request
//! [`Response`]: sidequest_types::Response
//! [`Broadcast`]: sidequest_types::Broadcast

pub mod error;
pub mod config;
pub mod handler;
pub mod context;
pub mod broadcast;
pub mod registry;
pub mod remote;

pub use error::{BusError, Result};
pub use config::BusConfig;
pub use handler::{dispatch, Handler};
pub use context::{spawn_context, Context, ContextHandle};
pub use broadcast::Broadcaster;
pub use registry::ObserverRegistry;
pub use remote::{serve, Frame, RemoteEndpoint};
